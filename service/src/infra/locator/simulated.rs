//! [`Simulated`] device backend.

use std::time::Duration;

use tracerr::Traced;

use crate::domain::geo;

use super::{Error, Locate, Locator};

/// Simulated device backend, standing in for real positioning hardware.
///
/// Resolves to a fixed [`geo::Coordinate`] after an artificial delay, or to
/// a scripted [`Error`].
#[derive(Clone, Copy, Debug)]
pub struct Simulated {
    /// Position this backend resolves to.
    coordinate: geo::Coordinate,

    /// Artificial delay of every acquisition.
    delay: Duration,

    /// Scripted failure, reported instead of the position.
    failure: Option<Error>,
}

impl Simulated {
    /// Creates a new [`Simulated`] backend resolving to the provided
    /// `coordinate`.
    #[must_use]
    pub fn new(coordinate: geo::Coordinate) -> Self {
        Self {
            coordinate,
            delay: Duration::ZERO,
            failure: None,
        }
    }

    /// Sets the artificial delay of every acquisition.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Scripts every acquisition to fail with the provided [`Error`].
    #[must_use]
    pub fn failing(mut self, failure: Error) -> Self {
        self.failure = Some(failure);
        self
    }
}

impl Locator<Locate> for Simulated {
    type Ok = geo::Coordinate;
    type Err = Traced<Error>;

    async fn execute(&self, _: Locate) -> Result<Self::Ok, Self::Err> {
        tokio::time::sleep(self.delay).await;

        if let Some(failure) = self.failure {
            return Err(tracerr::new!(failure));
        }
        Ok(self.coordinate)
    }
}
