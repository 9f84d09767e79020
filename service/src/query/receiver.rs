//! [`Query`] collection related to a single receiver [`Profile`].

use common::operations::By;

use crate::domain::{receiver, Profile};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a receiver [`Profile`] by its [`receiver::Id`].
pub type ById = DatabaseQuery<By<Option<Profile>, receiver::Id>>;
