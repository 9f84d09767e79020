//! [`Database`] implementations.

use std::sync::Arc;

use common::operations::{
    By, Commit, Insert, Lock, Select, Subscribe, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{donor, listing, receiver, Listing},
    infra::{database, Database},
};

use super::{tx::Mutation, Changes, Error, Memory, Tx};

impl Database<Transact> for Memory {
    type Ok = Tx;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0.tx_lock).lock_owned().await;
        Ok(Tx {
            db: self.clone(),
            pending: std::sync::Mutex::new(Vec::new()),
            _guard: guard,
        })
    }
}

impl Database<Select<By<Vec<Listing>, ()>>> for Memory {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Listing>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state.read().await.listings.iter().cloned().collect())
    }
}

impl Database<Select<By<Vec<Listing>, donor::Id>>> for Memory {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, donor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let donor_id = by.into_inner();
        Ok(self
            .0
            .state
            .read()
            .await
            .listings
            .iter()
            .filter(|l| l.donor_id == donor_id)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .state
            .read()
            .await
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }
}

impl Database<Select<By<Option<receiver::Profile>, receiver::Id>>> for Memory {
    type Ok = Option<receiver::Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<receiver::Profile>, receiver::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.state.read().await.receivers.get(&id).cloned())
    }
}

impl Database<Subscribe> for Memory {
    type Ok = Changes;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Subscribe) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.changes.subscribe())
    }
}

impl Database<Select<By<Vec<Listing>, ()>>> for Tx {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<Vec<Listing>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Reads observe the committed state, not the buffered mutations.
        self.db.execute(op).await
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Tx {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.db.execute(op).await
    }
}

impl Database<Lock<By<Listing, listing::Id>>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Write transactions are serialized by the database-wide guard, so
        // the per-`Listing` lock is already held transitively.
        Ok(())
    }
}

impl Database<Insert<Listing>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.buffer(Mutation::InsertListing(listing));
        Ok(())
    }
}

impl Database<Update<Listing>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.buffer(Mutation::UpdateListing(listing));
        Ok(())
    }
}

impl Database<Insert<receiver::Profile>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(profile): Insert<receiver::Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        self.buffer(Mutation::InsertReceiver(profile));
        Ok(())
    }
}

impl Database<Commit> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let pending = self.take_buffered();
        if pending.is_empty() {
            return Ok(());
        }

        let mut state = self.db.0.state.write().await;

        // Applied to a scratch copy first, so a failed commit leaves the
        // committed state untouched.
        let mut next = state.clone();
        for mutation in pending {
            match mutation {
                Mutation::InsertListing(listing) => {
                    if next.listings.iter().any(|l| l.id == listing.id) {
                        return Err(tracerr::new!(database::Error::Memory(
                            Error::DuplicateListing(listing.id)
                        )));
                    }
                    next.listings.push_front(listing);
                }
                Mutation::UpdateListing(listing) => {
                    let Some(stored) =
                        next.listings.iter_mut().find(|l| l.id == listing.id)
                    else {
                        return Err(tracerr::new!(database::Error::Memory(
                            Error::UnknownListing(listing.id)
                        )));
                    };
                    *stored = listing;
                }
                Mutation::InsertReceiver(profile) => {
                    if next.receivers.contains_key(&profile.id) {
                        return Err(tracerr::new!(database::Error::Memory(
                            Error::DuplicateReceiver(profile.id)
                        )));
                    }
                    drop(next.receivers.insert(profile.id, profile));
                }
            }
        }

        *state = next;
        drop(state);

        self.db.0.changes.send_modify(|revision| revision.0 += 1);

        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Subscribe, Transact, Update},
        DateTime,
    };

    use crate::{
        domain::{donor, listing, Listing},
        infra::Database as _,
    };

    use super::{Error, Memory};

    fn listing(food_name: &str) -> Listing {
        Listing {
            id: listing::Id::new(),
            donor_id: donor::Id::new("donor1").unwrap(),
            food_name: listing::FoodName::new(food_name).unwrap(),
            quantity: listing::Quantity::new("10 kg").unwrap(),
            scheduled_time: listing::ScheduledTime::new("Today, 6:00 PM")
                .unwrap(),
            contact_phone: listing::ContactPhone::new("+91 98765 43210")
                .unwrap(),
            address: listing::Address::new("123 Green Street, Mumbai")
                .unwrap(),
            photo: listing::PhotoUrl::default(),
            coordinate: None,
            status: listing::Status::Available,
            accepted_by: None,
            created_at: DateTime::now().coerce(),
            accepted_at: None,
            completed_at: None,
        }
    }

    async fn insert(db: &Memory, listing: Listing) {
        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(listing)).await.unwrap();
        tx.execute(Commit).await.unwrap();
    }

    #[tokio::test]
    async fn keeps_listings_most_recent_first() {
        let db = Memory::new();
        insert(&db, listing("Fresh Vegetables")).await;
        insert(&db, listing("Cooked Rice & Dal")).await;

        let all: Vec<Listing> =
            db.execute(Select(By::new(()))).await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(AsRef::<str>::as_ref(&all[0].food_name), "Cooked Rice & Dal");
        assert_eq!(AsRef::<str>::as_ref(&all[1].food_name), "Fresh Vegetables");
    }

    #[tokio::test]
    async fn dropped_transaction_discards_mutations() {
        let db = Memory::new();

        {
            let tx = db.execute(Transact).await.unwrap();
            tx.execute(Insert(listing("Fresh Bread"))).await.unwrap();
            // No commit.
        }

        let all: Vec<Listing> =
            db.execute(Select(By::new(()))).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn commit_bumps_revision_for_subscribers() {
        let db = Memory::new();
        let mut changes = db.execute(Subscribe).await.unwrap();
        let before = *changes.borrow_and_update();

        insert(&db, listing("Fresh Bread")).await;

        assert!(changes.has_changed().unwrap());
        assert!(*changes.borrow_and_update() > before);
    }

    #[tokio::test]
    async fn rejects_duplicate_listing_ids() {
        let db = Memory::new();
        let first = listing("Fresh Bread");
        let mut duplicate = listing("Pastries");
        duplicate.id = first.id;

        insert(&db, first).await;

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(duplicate)).await.unwrap();
        let err = tx.execute(Commit).await.unwrap_err();

        let crate::infra::database::Error::Memory(e) = err.as_ref();
        assert!(matches!(e, Error::DuplicateListing(_)));

        let all: Vec<Listing> =
            db.execute(Select(By::new(()))).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_stored_listing_in_place() {
        let db = Memory::new();
        let stored = listing("Fresh Bread");
        insert(&db, stored.clone()).await;

        let mut updated = stored.clone();
        updated.status = listing::Status::Accepted;

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Update(updated)).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let found: Option<Listing> =
            db.execute(Select(By::new(stored.id))).await.unwrap();
        assert_eq!(found.unwrap().status, listing::Status::Accepted);
    }
}
