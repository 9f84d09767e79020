//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::By;

use crate::domain::{donor, Listing};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Listing`]s, most recent first.
pub type All = DatabaseQuery<By<Vec<Listing>, ()>>;

/// Queries the [`Listing`]s offered by a single donor, most recent first.
pub type ByDonor = DatabaseQuery<By<Vec<Listing>, donor::Id>>;
