//! [`Command`] for completing the pickup of a [`Listing`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    Notice, Service,
};

use super::Command;

/// [`Command`] for completing the pickup of an accepted [`Listing`].
///
/// The only durable outcome of the tracking progression: intermediate steps
/// are never persisted.
#[derive(Clone, Copy, Debug)]
pub struct CompletePickup {
    /// ID of the [`Listing`] whose pickup is completed.
    pub listing_id: listing::Id,
}

impl<Db> Command<CompletePickup> for Service<Db>
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

    async fn execute(
        &self,
        cmd: CompletePickup,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompletePickup { listing_id } = cmd;

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

        if !listing.status.allows(listing::Status::Completed) {
            return Err(tracerr::new!(E::NotAccepted {
                id: listing_id,
                status: listing.status,
            }));
        }

        listing.status = listing::Status::Completed;
        listing.completed_at = Some(DateTime::now().coerce());

        tx.execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(Notice::success(
            "Pickup Complete!",
            "Food has been successfully picked up",
        ));

        Ok(listing)
    }
}

/// Error of [`CompletePickup`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] pickup is not in progress.
    #[display("`Listing(id: {id})` cannot be completed from `{status}` status")]
    NotAccepted {
        /// ID of the [`Listing`].
        id: listing::Id,

        /// Current [`listing::Status`] of the [`Listing`].
        status: listing::Status,
    },
}
