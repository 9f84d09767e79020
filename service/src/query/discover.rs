//! [`Query`] producing the receiver-facing discovery feed.

use std::{cmp::Ordering, collections::HashSet};

use common::operations::{By, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{geo, listing, receiver, Listing},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] producing the ranked, distance-annotated feed of [`Listing`]s
/// open for a receiver to accept.
///
/// A pure derivation over the current listing collection: re-run it whenever
/// the collection, the device position, the selected [`Radius`] or the
/// declined set changes.
///
/// [`Radius`]: receiver::session::Radius
#[derive(Clone, Debug, Default)]
pub struct Discover {
    /// Position of the browsing receiver, if acquired.
    ///
    /// Without it the feed keeps the collection's most-recent-first order
    /// and no distances are reported.
    pub coordinate: Option<geo::Coordinate>,

    /// Maximum pickup distance selected by the receiver.
    pub radius: receiver::session::Radius,

    /// [`Listing`]s declined within the receiver's current session.
    pub declined: HashSet<listing::Id>,
}

impl Discover {
    /// Creates a new [`Discover`] query for the provided receiver `session`,
    /// with the provided device `coordinate` (if any has been acquired).
    #[must_use]
    pub fn for_session(
        session: &receiver::Session,
        coordinate: Option<geo::Coordinate>,
    ) -> Self {
        Self {
            coordinate,
            radius: session.radius(),
            declined: session.declined().clone(),
        }
    }
}

impl<Db> Query<Discover> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Listing>, ()>>,
        Ok = Vec<Listing>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::listing::Nearby>;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Discover) -> Result<Self::Ok, Self::Err> {
        let Discover {
            coordinate,
            radius,
            declined,
        } = query;

        let feed = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter(|l| l.status == listing::Status::Available)
            .filter(|l| !declined.contains(&l.id))
            .map(|l| read::listing::Nearby {
                distance_km: coordinate
                    .and_then(|at| l.coordinate.map(|c| at.distance_km(c))),
                listing: l,
            })
            .filter(|n| {
                // Unknown distance is never treated as "too far".
                radius
                    .limit_km()
                    .and_then(|limit| n.distance_km.map(|d| d <= limit))
                    .unwrap_or(true)
            });

        Ok(if coordinate.is_some() {
            feed.sorted_by(|a, b| match (a.distance_km, b.distance_km) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .collect()
        } else {
            feed.collect()
        })
    }
}
