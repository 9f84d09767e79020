//! Geolocation acquisition.

pub mod simulated;

use std::time::Duration;

use derive_more::{Display, Error as StdError};
use serde::Deserialize;
use smart_default::SmartDefault;
use tokio::sync::{broadcast, watch, Mutex};
use tracerr::Traced;
use tracing as log;

use crate::{domain::geo, Notice};

pub use self::simulated::Simulated;

/// Locator operation.
pub use common::Handler as Locator;

/// Operation to acquire the current device position.
#[derive(Clone, Copy, Debug)]
pub struct Locate;

/// [`Locator`] error.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Access to the device position was denied.
    #[display("access to the device position was denied")]
    PermissionDenied,

    /// Device position could not be determined.
    #[display("device position could not be determined")]
    PositionUnavailable,

    /// Acquisition did not finish within the configured bound.
    #[display("position acquisition timed out")]
    Timeout,
}

/// [`Provider`] configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Bound on the duration of a single acquisition attempt.
    #[default(Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Snapshot of the acquisition state, observed via [`Provider::watch`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Fix {
    /// Most recently acquired [`geo::Coordinate`], possibly stale.
    pub coordinate: Option<geo::Coordinate>,

    /// Indicator whether an acquisition is currently in flight.
    pub loading: bool,

    /// [`Error`] of the last acquisition attempt, if it failed.
    ///
    /// Cleared by the next successful acquisition. A failure keeps any
    /// previously acquired [`Fix::coordinate`] in place.
    pub error: Option<Error>,
}

/// Provider of the device position.
///
/// Owns the current-coordinate value and its freshness/error state; every
/// other component observes them through [`Provider::watch`] and never sets
/// them directly.
#[derive(Debug)]
pub struct Provider<L> {
    /// Device backend performing the actual acquisition.
    backend: L,

    /// [`Config`] of this [`Provider`].
    config: Config,

    /// Channel publishing the current [`Fix`].
    state: watch::Sender<Fix>,

    /// Lock suppressing concurrent device queries.
    busy: Mutex<()>,

    /// Channel surfacing acquisition outcomes to the notification
    /// collaborator, if wired.
    notices: Option<broadcast::Sender<Notice>>,
}

impl<L> Provider<L> {
    /// Creates a new [`Provider`] on top of the provided device `backend`.
    #[must_use]
    pub fn new(config: Config, backend: L) -> Self {
        Self {
            backend,
            config,
            state: watch::channel(Fix::default()).0,
            busy: Mutex::new(()),
            notices: None,
        }
    }

    /// Wires this [`Provider`] to the provided [`Notice`] channel.
    #[must_use]
    pub fn with_notices(mut self, notices: broadcast::Sender<Notice>) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Returns a receiver observing the [`Fix`] of this [`Provider`].
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Fix> {
        self.state.subscribe()
    }

    /// Returns the current [`Fix`] of this [`Provider`].
    #[must_use]
    pub fn fix(&self) -> Fix {
        *self.state.borrow()
    }

    /// Emits the provided [`Notice`] if a notification channel is wired.
    fn notify(&self, notice: Notice) {
        if let Some(tx) = &self.notices {
            drop(tx.send(notice));
        }
    }
}

impl<L> Provider<L>
where
    L: Locator<Locate, Ok = geo::Coordinate, Err = Traced<Error>>,
{
    /// Acquires the current device position.
    ///
    /// Resolves to [`None`] without querying the device when another
    /// acquisition is already in flight. There is no automatic retry: a
    /// failed acquisition stays failed until this method is re-invoked.
    pub async fn request(&self) -> Option<Result<geo::Coordinate, Traced<Error>>> {
        let Ok(_busy) = self.busy.try_lock() else {
            return None;
        };

        self.state.send_modify(|fix| {
            fix.loading = true;
        });

        let result = match tokio::time::timeout(
            self.config.timeout,
            self.backend.execute(Locate),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(tracerr::new!(Error::Timeout)),
        };

        match &result {
            Ok(coordinate) => {
                let coordinate = *coordinate;
                self.state.send_modify(|fix| {
                    fix.coordinate = Some(coordinate);
                    fix.error = None;
                    fix.loading = false;
                });
                self.notify(Notice::success(
                    "Location Enabled",
                    "You'll now see donations near you",
                ));
            }
            Err(e) => {
                let kind = *e.as_ref();
                log::warn!("position acquisition failed: {kind}");
                self.state.send_modify(|fix| {
                    fix.error = Some(kind);
                    fix.loading = false;
                });
                let description = match kind {
                    Error::PermissionDenied => {
                        "Location access is mandatory to browse donations"
                    }
                    Error::PositionUnavailable => {
                        "Your position could not be determined"
                    }
                    Error::Timeout => "Locating you took too long, try again",
                };
                self.notify(Notice::error("Location Unavailable", description));
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod spec {
    use std::{
        sync::{
            atomic::{AtomicU32, Ordering},
            Arc,
        },
        time::Duration,
    };

    use tracerr::Traced;

    use crate::domain::geo::Coordinate;

    use super::{Config, Error, Fix, Locate, Locator, Provider, Simulated};

    fn bangalore() -> Coordinate {
        Coordinate::new(12.9716, 77.5946).unwrap()
    }

    /// Backend succeeding on the first acquisition and failing afterwards.
    struct Flaky(AtomicU32);

    impl Locator<Locate> for Flaky {
        type Ok = Coordinate;
        type Err = Traced<Error>;

        async fn execute(&self, _: Locate) -> Result<Self::Ok, Self::Err> {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(bangalore())
            } else {
                Err(tracerr::new!(Error::PositionUnavailable))
            }
        }
    }

    #[tokio::test]
    async fn acquires_and_publishes_coordinate() {
        let provider =
            Provider::new(Config::default(), Simulated::new(bangalore()));

        let acquired = provider.request().await.unwrap().unwrap();

        assert_eq!(acquired, bangalore());
        let Fix {
            coordinate,
            loading,
            error,
        } = provider.fix();
        assert_eq!(coordinate, Some(bangalore()));
        assert_eq!(error, None);
        assert!(!loading);
    }

    #[tokio::test]
    async fn failure_keeps_stale_coordinate() {
        let provider =
            Provider::new(Config::default(), Flaky(AtomicU32::new(0)));

        provider.request().await.unwrap().unwrap();
        let err = provider.request().await.unwrap().unwrap_err();

        assert_eq!(*err.as_ref(), Error::PositionUnavailable);
        let fix = provider.fix();
        assert_eq!(fix.coordinate, Some(bangalore()));
        assert_eq!(fix.error, Some(Error::PositionUnavailable));
        assert!(!fix.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_maps_to_timeout() {
        let provider = Provider::new(
            Config {
                timeout: Duration::from_secs(10),
            },
            Simulated::new(bangalore()).with_delay(Duration::from_secs(15)),
        );

        let err = provider.request().await.unwrap().unwrap_err();

        assert_eq!(*err.as_ref(), Error::Timeout);
        assert_eq!(provider.fix().error, Some(Error::Timeout));
        assert_eq!(provider.fix().coordinate, None);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_request_is_suppressed() {
        let provider = Arc::new(Provider::new(
            Config::default(),
            Simulated::new(bangalore()).with_delay(Duration::from_secs(5)),
        ));

        let first = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.request().await })
        };
        tokio::task::yield_now().await;

        // The first acquisition is still in flight.
        assert!(provider.fix().loading);
        assert!(provider.request().await.is_none());

        let acquired = first.await.unwrap().unwrap().unwrap();
        assert_eq!(acquired, bangalore());
    }

    #[tokio::test]
    async fn scripted_denial_is_reported() {
        let provider = Provider::new(
            Config::default(),
            Simulated::new(bangalore()).failing(Error::PermissionDenied),
        );

        let err = provider.request().await.unwrap().unwrap_err();

        assert_eq!(*err.as_ref(), Error::PermissionDenied);
    }
}
