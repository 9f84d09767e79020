//! [`Command`] for creating a new [`Listing`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::listing::{
    Address, ContactPhone, FoodName, PhotoUrl, Quantity, ScheduledTime,
};
use crate::{
    domain::{donor, geo, listing, Listing},
    infra::{database, Database},
    Notice, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Listing`].
///
/// Carries the raw donor form input: every descriptive field is validated
/// against the domain invariants before anything is stored.
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the donor offering the food.
    pub donor_id: donor::Id,

    /// Raw [`FoodName`] input.
    pub food_name: String,

    /// Raw [`Quantity`] input.
    pub quantity: String,

    /// Raw [`ScheduledTime`] input.
    pub scheduled_time: String,

    /// Raw [`ContactPhone`] input.
    pub contact_phone: String,

    /// Raw [`Address`] input.
    pub address: String,

    /// Photo of the offered food, if the donor uploaded one.
    ///
    /// Replaced with [`PhotoUrl::STOCK`] when absent.
    pub photo: Option<String>,

    /// Pickup [`geo::Coordinate`], if the collaborator captured a real one.
    ///
    /// When absent, the new [`Listing`] is pinned inside the configured
    /// fallback [`Area`] (if any).
    ///
    /// [`Area`]: crate::Area
    pub coordinate: Option<geo::Coordinate>,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateListing) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing {
            donor_id,
            food_name,
            quantity,
            scheduled_time,
            contact_phone,
            address,
            photo,
            coordinate,
        } = cmd;

        let food_name = listing::FoodName::new(food_name)
            .ok_or_else(|| tracerr::new!(E::InvalidFoodName))?;
        let quantity = listing::Quantity::new(quantity)
            .ok_or_else(|| tracerr::new!(E::InvalidQuantity))?;
        let scheduled_time = listing::ScheduledTime::new(scheduled_time)
            .ok_or_else(|| tracerr::new!(E::InvalidScheduledTime))?;
        let contact_phone = listing::ContactPhone::new(contact_phone)
            .ok_or_else(|| tracerr::new!(E::InvalidContactPhone))?;
        let address = listing::Address::new(address)
            .ok_or_else(|| tracerr::new!(E::InvalidAddress))?;
        let photo = photo
            .map(|url| {
                listing::PhotoUrl::new(url)
                    .ok_or_else(|| tracerr::new!(E::InvalidPhoto))
            })
            .transpose()?
            .unwrap_or_default();

        let id = listing::Id::new();
        let coordinate = coordinate.or_else(|| {
            self.config()
                .listing
                .fallback_area
                .map(|area| area.spread(id))
        });

        let listing = Listing {
            id,
            donor_id,
            food_name,
            quantity,
            scheduled_time,
            contact_phone,
            address,
            photo,
            coordinate,
            status: listing::Status::Available,
            accepted_by: None,
            created_at: DateTime::now().coerce(),
            accepted_at: None,
            completed_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(Notice::success(
            "Donation Posted!",
            "Your food donation is now visible to receivers",
        ));

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// `address` input is not a valid [`Address`].
    #[display("`address` is not a valid `Address`")]
    InvalidAddress,

    /// `contact_phone` input is not a valid [`ContactPhone`].
    #[display("`contact_phone` is not a valid `ContactPhone`")]
    InvalidContactPhone,

    /// `food_name` input is not a valid [`FoodName`].
    #[display("`food_name` is not a valid `FoodName`")]
    InvalidFoodName,

    /// `photo` input is not a valid [`PhotoUrl`].
    #[display("`photo` is not a valid `PhotoUrl`")]
    InvalidPhoto,

    /// `quantity` input is not a valid [`Quantity`].
    #[display("`quantity` is not a valid `Quantity`")]
    InvalidQuantity,

    /// `scheduled_time` input is not a valid [`ScheduledTime`].
    #[display("`scheduled_time` is not a valid `ScheduledTime`")]
    InvalidScheduledTime,
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{donor, geo, Listing},
        infra::{Database as _, Memory},
        Command as _, Config, ListingDefaults, Service,
    };

    use super::{CreateListing, ExecutionError};

    fn draft() -> CreateListing {
        CreateListing {
            donor_id: donor::Id::new("current-donor").unwrap(),
            food_name: "Fresh Vegetables".into(),
            quantity: "10 kg".into(),
            scheduled_time: "Today, 6:00 PM".into(),
            contact_phone: "+91 98765 43210".into(),
            address: "123 Green Street, Mumbai".into(),
            photo: None,
            coordinate: None,
        }
    }

    fn service() -> Service<Memory> {
        Service::new(Config::default(), Memory::new())
    }

    #[tokio::test]
    async fn stores_new_listing_as_available() {
        let service = service();

        let listing = service.execute(draft()).await.unwrap();

        assert_eq!(listing.status, crate::domain::listing::Status::Available);
        assert_eq!(listing.accepted_by, None);

        let all: Vec<Listing> = service
            .database()
            .execute(Select(By::new(())))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, listing.id);
    }

    #[tokio::test]
    async fn orders_listings_most_recent_first() {
        let service = service();

        let first = service.execute(draft()).await.unwrap();
        let second = service
            .execute(CreateListing {
                food_name: "Cooked Rice & Dal".into(),
                ..draft()
            })
            .await
            .unwrap();

        let all: Vec<Listing> = service
            .database()
            .execute(Select(By::new(())))
            .await
            .unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn rejects_empty_food_name_leaving_store_unchanged() {
        let service = service();

        let err = service
            .execute(CreateListing {
                food_name: String::new(),
                ..draft()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidFoodName));

        let all: Vec<Listing> = service
            .database()
            .execute(Select(By::new(())))
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn substitutes_stock_photo() {
        let service = service();

        let listing = service.execute(draft()).await.unwrap();

        assert_eq!(
            AsRef::<str>::as_ref(&listing.photo),
            crate::domain::listing::PhotoUrl::STOCK,
        );
    }

    #[tokio::test]
    async fn pins_coordinateless_draft_inside_fallback_area() {
        let service = service();

        let listing = service.execute(draft()).await.unwrap();

        let coordinate = listing.coordinate.unwrap();
        let center = crate::Area::BANGALORE.center;
        assert!(
            (f64::from(coordinate.latitude) - f64::from(center.latitude))
                .abs()
                <= 0.05,
        );
        assert!(
            (f64::from(coordinate.longitude) - f64::from(center.longitude))
                .abs()
                <= 0.05,
        );
    }

    #[tokio::test]
    async fn keeps_captured_coordinate_and_leaves_none_without_fallback() {
        let koramangala = geo::Coordinate::new(12.9352, 77.6245).unwrap();
        let service = Service::new(
            Config {
                listing: ListingDefaults {
                    fallback_area: None,
                },
                ..Config::default()
            },
            Memory::new(),
        );

        let captured = service
            .execute(CreateListing {
                coordinate: Some(koramangala),
                ..draft()
            })
            .await
            .unwrap();
        assert_eq!(captured.coordinate, Some(koramangala));

        let unknown = service.execute(draft()).await.unwrap();
        assert_eq!(unknown.coordinate, None);
    }
}
