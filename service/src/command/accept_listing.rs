//! [`Command`] for accepting a [`Listing`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, receiver, Listing},
    infra::{database, Database},
    Notice, Service,
};

use super::Command;

/// [`Command`] for accepting a [`Listing`]: a receiver confirming the
/// pickup.
#[derive(Clone, Copy, Debug)]
pub struct AcceptListing {
    /// ID of the [`Listing`] to be accepted.
    pub listing_id: listing::Id,

    /// ID of the receiver confirming the pickup.
    pub receiver_id: receiver::Id,
}

impl<Db> Command<AcceptListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AcceptListing) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptListing {
            listing_id,
            receiver_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        // Re-checked under the lock: of two racing accepts, the loser
        // observes the winner's `Accepted` status here.
        if !listing.status.allows(listing::Status::Accepted) {
            return Err(tracerr::new!(E::NotAvailable {
                id: listing_id,
                status: listing.status,
            }));
        }

        listing.status = listing::Status::Accepted;
        listing.accepted_by = Some(receiver_id);
        listing.accepted_at = Some(DateTime::now().coerce());

        tx.execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(Notice::success(
            "Pickup Confirmed!",
            "The donor has been notified. Track your pickup status.",
        ));

        Ok(listing)
    }
}

/// Error of [`AcceptListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] is not open for accepting.
    #[display("`Listing(id: {id})` cannot be accepted from `{status}` status")]
    NotAvailable {
        /// ID of the [`Listing`].
        id: listing::Id,

        /// Current [`listing::Status`] of the [`Listing`].
        status: listing::Status,
    },
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::CreateListing,
        domain::{donor, listing, receiver, Listing},
        infra::{Database as _, Memory},
        Command as _, Config, Service,
    };

    use super::{AcceptListing, ExecutionError};

    fn service() -> Service<Memory> {
        Service::new(Config::default(), Memory::new())
    }

    async fn create(service: &Service<Memory>) -> Listing {
        service
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
            .unwrap()
    }

    #[tokio::test]
    async fn marks_available_listing_as_accepted() {
        let service = service();
        let listing = create(&service).await;
        let receiver_id = receiver::Id::new();

        let accepted = service
            .execute(AcceptListing {
                listing_id: listing.id,
                receiver_id,
            })
            .await
            .unwrap();

        assert_eq!(accepted.status, listing::Status::Accepted);
        assert_eq!(accepted.accepted_by, Some(receiver_id));
        assert!(accepted.accepted_at.is_some());
    }

    #[tokio::test]
    async fn second_accept_loses_and_leaves_winner_intact() {
        let service = service();
        let listing = create(&service).await;
        let winner = receiver::Id::new();
        let loser = receiver::Id::new();

        service
            .execute(AcceptListing {
                listing_id: listing.id,
                receiver_id: winner,
            })
            .await
            .unwrap();

        let err = service
            .execute(AcceptListing {
                listing_id: listing.id,
                receiver_id: loser,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotAvailable {
                status: listing::Status::Accepted,
                ..
            },
        ));

        let stored: Option<Listing> = service
            .database()
            .execute(Select(By::new(listing.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().accepted_by, Some(winner));
    }

    #[tokio::test]
    async fn unknown_listing_is_reported() {
        let service = service();

        let err = service
            .execute(AcceptListing {
                listing_id: listing::Id::new(),
                receiver_id: receiver::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
