//! [`TrackPickup`] [`Task`].

use std::{convert::Infallible, error::Error, time::Duration};

use common::{
    define_kind,
    operations::{By, Perform, Start},
};
use serde::Deserialize;
use smart_default::SmartDefault;
use tokio::time::sleep;
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{complete_pickup, CompletePickup},
    domain::{listing, Listing},
    Command, Service,
};

use super::Task;

/// Configuration for [`TrackPickup`] [`Task`]s.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Delay before the courier is reported as being on the way.
    #[default(Duration::from_secs(3))]
    #[serde(with = "humantime_serde")]
    pub en_route_after: Duration,

    /// Delay between the courier heading out and the pickup itself.
    #[default(Duration::from_secs(3))]
    #[serde(with = "humantime_serde")]
    pub picked_up_after: Duration,
}

define_kind! {
    #[doc = "Ephemeral progress step of an accepted pickup."]
    enum Step {
        #[doc = "Request accepted, preparing for pickup."]
        Accepted = 1,

        #[doc = "Courier is on the way to the donor."]
        EnRoute = 2,

        #[doc = "Food has been picked up."]
        PickedUp = 3,
    }
}

/// Progress report of a tracked pickup.
#[derive(Clone, Copy, Debug)]
pub struct Progress {
    /// ID of the tracked [`Listing`].
    pub listing_id: listing::Id,

    /// Reached [`Step`].
    pub step: Step,
}

/// [`Task`] simulating the courier feed of an accepted [`Listing`].
///
/// Advances the [`Step`] progression on the configured schedule, reporting
/// each step on the service's progress channel, and persists the final
/// `Completed` transition once the pickup happens. The steps themselves are
/// never stored on the [`Listing`].
#[derive(Clone, Debug)]
pub struct TrackPickup<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// ID of the tracked [`Listing`].
    listing_id: listing::Id,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<TrackPickup<Self>, listing::Id>>> for Service<Db>
where
    TrackPickup<Service<Db>>: Task<Perform<()>, Ok = (), Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<TrackPickup<Self>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let task = TrackPickup {
            config: self.config().track_pickup,
            listing_id: by.into_inner(),
            service: self.clone(),
        };

        _ = task.execute(Perform(())).await.map_err(|e| {
            log::error!("`task::TrackPickup` failed: {e}");
        });

        Ok(())
    }
}

impl<Db> Task<Perform<()>> for TrackPickup<Service<Db>>
where
    Service<Db>: Command<
        CompletePickup,
        Ok = Listing,
        Err = Traced<complete_pickup::ExecutionError>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.report(Step::Accepted);

        sleep(self.config.en_route_after).await;
        self.report(Step::EnRoute);

        sleep(self.config.picked_up_after).await;
        self.report(Step::PickedUp);

        self.service
            .execute(CompletePickup {
                listing_id: self.listing_id,
            })
            .await
            .map(drop)
    }
}

impl<S> TrackPickup<Service<S>> {
    /// Reports the provided [`Step`] of the tracked [`Listing`].
    fn report(&self, step: Step) {
        self.service.report(Progress {
            listing_id: self.listing_id,
            step,
        });
    }
}

/// Error of [`TrackPickup`] execution.
pub type ExecutionError = Traced<complete_pickup::ExecutionError>;

#[cfg(test)]
mod spec {
    use common::operations::{By, Select, Start};

    use crate::{
        command::{AcceptListing, CreateListing},
        domain::{donor, listing, receiver, Listing},
        infra::{Database as _, Memory},
        Command as _, Config, Service,
    };

    use super::Step;

    async fn accepted_listing(service: &Service<Memory>) -> Listing {
        let listing = service
            .execute(CreateListing {
                donor_id: donor::Id::new("donor1").unwrap(),
                food_name: "Fresh Vegetables".into(),
                quantity: "10 kg".into(),
                scheduled_time: "Today, 6:00 PM".into(),
                contact_phone: "+91 98765 43210".into(),
                address: "123 Green Street, Mumbai".into(),
                photo: None,
                coordinate: None,
            })
            .await
            .unwrap();
        service
            .execute(AcceptListing {
                listing_id: listing.id,
                receiver_id: receiver::Id::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn walks_steps_and_persists_completion() {
        let service = Service::new(Config::default(), Memory::new());
        let listing = accepted_listing(&service).await;
        let mut progress = service.progress();

        service
            .execute(Start(By::new(listing.id)))
            .await
            .unwrap();

        for expected in [Step::Accepted, Step::EnRoute, Step::PickedUp] {
            let report = progress.recv().await.unwrap();
            assert_eq!(report.listing_id, listing.id);
            assert_eq!(report.step, expected);
        }

        let stored: Option<Listing> = service
            .database()
            .execute(Select(By::new(listing.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().status, listing::Status::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn tracking_unaccepted_listing_does_not_complete_it() {
        let service = Service::new(Config::default(), Memory::new());
        let listing = service
            .execute(CreateListing {
                donor_id: donor::Id::new("donor1").unwrap(),
                food_name: "Fresh Vegetables".into(),
                quantity: "10 kg".into(),
                scheduled_time: "Today, 6:00 PM".into(),
                contact_phone: "+91 98765 43210".into(),
                address: "123 Green Street, Mumbai".into(),
                photo: None,
                coordinate: None,
            })
            .await
            .unwrap();

        // The task logs the rejected transition instead of bubbling it up.
        service
            .execute(Start(By::new(listing.id)))
            .await
            .unwrap();

        let stored: Option<Listing> = service
            .database()
            .execute(Select(By::new(listing.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().status, listing::Status::Available);
    }
}
