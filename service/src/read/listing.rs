//! [`Listing`]-related read definitions.

use crate::domain::Listing;

/// [`Listing`] as seen by a browsing receiver.
///
/// Derived, never stored: recomputed by the discovery [`Query`] on every
/// relevant input change.
///
/// [`Query`]: crate::Query
#[derive(Clone, Debug)]
pub struct Nearby {
    /// The open [`Listing`].
    pub listing: Listing,

    /// Distance from the receiver to the pickup point, in kilometers.
    ///
    /// [`None`] when either side lacks a coordinate. Such listings rank
    /// after every listing with a known distance, and are never excluded by
    /// a distance filter.
    pub distance_km: Option<f64>,
}
