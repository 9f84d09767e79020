//! Service contains the business logic of the application.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::define_kind;
use serde::Deserialize;
use smart_default::SmartDefault;
use tokio::sync::broadcast;

#[cfg(doc)]
use crate::domain::Listing;
use crate::{
    domain::{geo, listing, receiver},
    task::track_pickup::Progress,
};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geolocation acquisition configuration.
    pub locator: infra::locator::Config,

    /// [`task::TrackPickup`] configuration.
    pub track_pickup: task::track_pickup::Config,

    /// Defaults applied to new [`Listing`]s.
    pub listing: ListingDefaults,
}

/// Defaults applied to new [`Listing`]s.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ListingDefaults {
    /// Pickup [`Area`] assigned to drafts lacking a captured coordinate.
    ///
    /// [`None`] leaves such [`Listing`]s without a coordinate, so they rank
    /// as "unknown distance" in discovery.
    #[default(Some(Area::BANGALORE))]
    pub fallback_area: Option<Area>,
}

/// Area around a fixed center, pinning [`Listing`]s lacking a captured
/// pickup coordinate.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Area {
    /// Center of this [`Area`].
    pub center: geo::Coordinate,

    /// Maximum offset from the center along each axis, in degrees.
    pub jitter_degrees: f64,
}

impl Area {
    /// Bangalore city center, with the sample dataset's spread.
    #[expect(unsafe_code, reason = "hardcoded values are valid")]
    pub const BANGALORE: Self = Self {
        center: geo::Coordinate {
            latitude: unsafe { geo::Latitude::new_unchecked(12.9716) },
            longitude: unsafe { geo::Longitude::new_unchecked(77.5946) },
        },
        jitter_degrees: 0.05,
    };

    /// Picks a point inside this [`Area`], spread by the entropy of the
    /// provided [`Listing`] `id`.
    #[must_use]
    pub fn spread(&self, id: listing::Id) -> geo::Coordinate {
        let bytes = uuid::Uuid::from(id).into_bytes();
        let unit = |half: [u8; 4]| {
            f64::from(u32::from_le_bytes(half))
                .mul_add(2.0 / f64::from(u32::MAX), -1.0)
        };

        let latitude = f64::from(self.center.latitude)
            + unit([bytes[0], bytes[1], bytes[2], bytes[3]])
                * self.jitter_degrees;
        let longitude = f64::from(self.center.longitude)
            + unit([bytes[4], bytes[5], bytes[6], bytes[7]])
                * self.jitter_degrees;

        geo::Coordinate::new(latitude, longitude).unwrap_or(self.center)
    }
}

/// User-facing notification emitted after core operations.
///
/// Consumed by the presentation collaborator (as a toast, usually).
/// Delivery is fire-and-forget.
#[derive(Clone, Debug)]
pub struct Notice {
    /// Short title of this [`Notice`].
    pub title: String,

    /// Human-readable description of this [`Notice`].
    pub description: String,

    /// [`Severity`] of this [`Notice`].
    pub severity: Severity,
}

impl Notice {
    /// Creates a new [`Severity::Info`] [`Notice`].
    #[must_use]
    pub fn info(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    /// Creates a new [`Severity::Success`] [`Notice`].
    #[must_use]
    pub fn success(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Success,
        }
    }

    /// Creates a new [`Severity::Error`] [`Notice`].
    #[must_use]
    pub fn error(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }
}

define_kind! {
    #[doc = "Severity of a [`Notice`]."]
    enum Severity {
        #[doc = "Neutral information."]
        Info = 1,

        #[doc = "Successful operation."]
        Success = 2,

        #[doc = "Failed operation."]
        Error = 3,
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    ///
    /// [`Database`]: infra::Database
    database: Db,

    /// Channel fanning [`Notice`]s out to the notification collaborator.
    notices: broadcast::Sender<Notice>,

    /// Channel fanning pickup [`Progress`] reports out to the presentation
    /// collaborator.
    progress: broadcast::Sender<Progress>,
}

impl<Db> Service<Db> {
    /// Capacity of the [`Notice`] and [`Progress`] channels.
    const CHANNEL_CAPACITY: usize = 16;

    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> Self {
        Self {
            config,
            database,
            notices: broadcast::channel(Self::CHANNEL_CAPACITY).0,
            progress: broadcast::channel(Self::CHANNEL_CAPACITY).0,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    ///
    /// [`Database`]: infra::Database
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Subscribes to the [`Notice`]s emitted by this [`Service`].
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Subscribes to the pickup [`Progress`] reports of this [`Service`].
    #[must_use]
    pub fn progress(&self) -> broadcast::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Emits the provided [`Notice`].
    ///
    /// The [`Notice`] is dropped when no collaborator is subscribed.
    pub fn notify(&self, notice: Notice) {
        drop(self.notices.send(notice));
    }

    /// Reports the provided pickup [`Progress`].
    pub(crate) fn report(&self, progress: Progress) {
        drop(self.progress.send(progress));
    }

    /// Declines the provided [`Listing`] within the provided receiver
    /// `session`, hiding it from this session's discovery feed only.
    ///
    /// Other receivers still see the [`Listing`]: its stored state is not
    /// touched, and the decline dies with the `session`.
    ///
    /// Returns whether the [`Listing`] was not declined before.
    pub fn decline_listing(
        &self,
        session: &mut receiver::Session,
        id: listing::Id,
    ) -> bool {
        let declined = session.decline(id);
        if declined {
            self.notify(Notice::info(
                "Listing Declined",
                "This listing has been removed from your view",
            ));
        }
        declined
    }

    /// Undoes a previous decline of the provided [`Listing`] within the
    /// provided receiver `session`.
    ///
    /// Returns whether the [`Listing`] was indeed declined.
    pub fn restore_listing(
        &self,
        session: &mut receiver::Session,
        id: listing::Id,
    ) -> bool {
        let restored = session.restore(id);
        if restored {
            self.notify(Notice::info(
                "Listing Restored",
                "This listing is back in your view",
            ));
        }
        restored
    }
}
