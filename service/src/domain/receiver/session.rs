//! [`Session`] definitions.

use std::collections::HashSet;

use common::define_kind;

#[cfg(doc)]
use crate::domain::Listing;
use crate::domain::{listing, receiver};

/// One browsing interaction of a receiver.
///
/// Scopes the locally declined [`Listing`]s and the selected [`Radius`]
/// filter: both die with the [`Session`], and neither is visible to any
/// other receiver. A re-entered discovery screen starts a fresh [`Session`].
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the receiver this [`Session`] belongs to.
    pub receiver_id: receiver::Id,

    /// [`Listing`]s declined within this [`Session`].
    declined: HashSet<listing::Id>,

    /// Maximum pickup distance selected within this [`Session`].
    radius: Radius,
}

impl Session {
    /// Creates a new [`Session`] of the provided receiver.
    #[must_use]
    pub fn new(receiver_id: receiver::Id) -> Self {
        Self {
            receiver_id,
            declined: HashSet::new(),
            radius: Radius::default(),
        }
    }

    /// Declines the provided [`Listing`] within this [`Session`].
    ///
    /// Returns whether the [`Listing`] was not declined before.
    pub fn decline(&mut self, id: listing::Id) -> bool {
        self.declined.insert(id)
    }

    /// Undoes a previous decline of the provided [`Listing`].
    ///
    /// Returns whether the [`Listing`] was indeed declined.
    pub fn restore(&mut self, id: listing::Id) -> bool {
        self.declined.remove(&id)
    }

    /// Checks whether the provided [`Listing`] is declined within this
    /// [`Session`].
    #[must_use]
    pub fn is_declined(&self, id: listing::Id) -> bool {
        self.declined.contains(&id)
    }

    /// Returns the [`Listing`]s declined within this [`Session`].
    #[must_use]
    pub fn declined(&self) -> &HashSet<listing::Id> {
        &self.declined
    }

    /// Returns the [`Radius`] selected within this [`Session`].
    #[must_use]
    pub fn radius(&self) -> Radius {
        self.radius
    }

    /// Selects the provided [`Radius`] within this [`Session`].
    pub fn set_radius(&mut self, radius: Radius) {
        self.radius = radius;
    }
}

define_kind! {
    #[doc = "Maximum pickup distance a receiver is willing to travel."]
    enum Radius {
        #[doc = "No distance limit."]
        All = 0,

        #[doc = "Within 5 kilometers."]
        Within5 = 5,

        #[doc = "Within 10 kilometers."]
        Within10 = 10,

        #[doc = "Within 25 kilometers."]
        Within25 = 25,

        #[doc = "Within 50 kilometers."]
        Within50 = 50,
    }
}

impl Radius {
    /// Returns the maximum distance in kilometers, or [`None`] for
    /// [`Radius::All`].
    #[must_use]
    pub fn limit_km(self) -> Option<f64> {
        match self {
            Self::All => None,
            Self::Within5 | Self::Within10 | Self::Within25 | Self::Within50 => {
                Some(f64::from(self.u8()))
            }
        }
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self::All
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{listing, receiver};

    use super::{Radius, Session};

    #[test]
    fn decline_is_reversible() {
        let mut session = Session::new(receiver::Id::new());
        let id = listing::Id::new();

        assert!(session.decline(id));
        assert!(session.is_declined(id));
        assert!(!session.decline(id));

        assert!(session.restore(id));
        assert!(!session.is_declined(id));
        assert!(!session.restore(id));
    }

    #[test]
    fn fresh_session_has_no_declines_and_no_limit() {
        let session = Session::new(receiver::Id::new());

        assert!(session.declined().is_empty());
        assert_eq!(session.radius(), Radius::All);
    }

    #[test]
    fn radius_limits_match_their_labels() {
        assert_eq!(Radius::All.limit_km(), None);
        assert_eq!(Radius::Within5.limit_km(), Some(5.0));
        assert_eq!(Radius::Within10.limit_km(), Some(10.0));
        assert_eq!(Radius::Within25.limit_km(), Some(25.0));
        assert_eq!(Radius::Within50.limit_km(), Some(50.0));
    }
}
