//! [`Tx`] client definitions.

use std::sync::{Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use crate::domain::{receiver, Listing};

use super::Memory;

/// Transactional in-memory database client.
///
/// Mutations are buffered and become visible to other clients only once the
/// transaction is committed; dropping an uncommitted [`Tx`] discards them.
/// Write transactions are serialized: a [`Tx`] holds the database-wide write
/// guard for its whole lifetime.
#[derive(Debug)]
pub struct Tx {
    /// [`Memory`] database this transaction belongs to.
    pub(super) db: Memory,

    /// Buffered [`Mutation`]s to apply on commit.
    pub(super) pending: Mutex<Vec<Mutation>>,

    /// Guard serializing write transactions.
    pub(super) _guard: OwnedMutexGuard<()>,
}

impl Tx {
    /// Buffers the provided [`Mutation`] to be applied on commit.
    pub(super) fn buffer(&self, mutation: Mutation) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mutation);
    }

    /// Takes all the buffered [`Mutation`]s out of this [`Tx`].
    pub(super) fn take_buffered(&self) -> Vec<Mutation> {
        std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        )
    }
}

/// Buffered mutation of a [`Tx`].
#[derive(Clone, Debug)]
pub(super) enum Mutation {
    /// Insertion of a new [`Listing`] at the head of the collection.
    InsertListing(Listing),

    /// Replacement of a stored [`Listing`] with its new version.
    UpdateListing(Listing),

    /// Insertion of a new [`receiver::Profile`].
    InsertReceiver(receiver::Profile),
}
