//! [`Command`] definition.

pub mod accept_listing;
pub mod complete_pickup;
pub mod create_listing;
pub mod register_receiver;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_listing::AcceptListing, complete_pickup::CompletePickup,
    create_listing::CreateListing, register_receiver::RegisterReceiver,
};
