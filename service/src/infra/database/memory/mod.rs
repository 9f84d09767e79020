//! In-memory [`Database`] implementation.

mod impls;
mod tx;

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use derive_more::{Display, Error as StdError, From, Into};
use tokio::sync::{watch, Mutex, RwLock};

use crate::domain::{listing, receiver, Listing};
#[cfg(doc)]
use crate::infra::Database;

pub use self::tx::Tx;

/// In-memory [`Database`] client.
///
/// Cheap to clone; every clone shares the same state.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Inner>);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inner state shared between [`Memory`] clones.
#[derive(Debug)]
struct Inner {
    /// Committed [`State`].
    state: RwLock<State>,

    /// Lock serializing write transactions.
    tx_lock: Arc<Mutex<()>>,

    /// Channel publishing the latest committed [`Revision`].
    changes: watch::Sender<Revision>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: RwLock::default(),
            tx_lock: Arc::default(),
            changes: watch::channel(Revision::default()).0,
        }
    }
}

/// Committed collections of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
struct State {
    /// [`Listing`]s, most recent first.
    listings: VecDeque<Listing>,

    /// [`receiver::Profile`]s by their IDs.
    receivers: HashMap<receiver::Id, receiver::Profile>,
}

/// Number of the mutations committed to a [`Memory`] database so far.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Revision(u64);

/// Feed of committed [`Revision`]s, produced by the [`Subscribe`] operation.
///
/// Holders re-query the [`Memory`] database whenever a new [`Revision`] is
/// observed.
///
/// [`Subscribe`]: common::operations::Subscribe
pub type Changes = watch::Receiver<Revision>;

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Listing`] with the same ID is already stored.
    #[display("`Listing(id: {_0})` is already stored")]
    DuplicateListing(#[error(not(source))] listing::Id),

    /// [`receiver::Profile`] with the same ID is already stored.
    #[display("receiver `Profile(id: {_0})` is already stored")]
    DuplicateReceiver(#[error(not(source))] receiver::Id),

    /// Updated [`Listing`] is not stored.
    #[display("`Listing(id: {_0})` is not stored")]
    UnknownListing(#[error(not(source))] listing::Id),
}
