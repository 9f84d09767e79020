//! Geographic definitions.

use derive_more::{Display, FromStr, Into};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinate.
///
/// Immutable value type: a pickup point of a listing, or the position of a
/// receiver's device.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
    /// [`Latitude`] of this [`Coordinate`].
    pub latitude: Latitude,

    /// [`Longitude`] of this [`Coordinate`].
    pub longitude: Longitude,
}

impl Coordinate {
    /// Creates a new [`Coordinate`] if both components are in their valid
    /// ranges.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        Some(Self {
            latitude: Latitude::new(latitude)?,
            longitude: Longitude::new(longitude)?,
        })
    }

    /// Returns the great-circle distance from this [`Coordinate`] to the
    /// `other` one, in kilometers, computed with the haversine formula.
    ///
    /// Symmetric, and zero (within floating-point tolerance) for equal
    /// coordinates.
    #[must_use]
    pub fn distance_km(self, other: Self) -> f64 {
        let lat1 = f64::from(self.latitude).to_radians();
        let lat2 = f64::from(other.latitude).to_radians();
        let dlat = lat2 - lat1;
        let dlon = (f64::from(other.longitude) - f64::from(self.longitude))
            .to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Latitude of a [`Coordinate`], in degrees.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Into, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(into = "f64", try_from = "f64")]
pub struct Latitude(f64);

impl Latitude {
    /// Creates a new [`Latitude`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `degrees` are in range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(degrees: f64) -> Self {
        Self(degrees)
    }

    /// Creates a new [`Latitude`] if the given `degrees` are valid.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        Self::check(degrees).then_some(Self(degrees))
    }

    /// Checks whether the given `degrees` are a valid [`Latitude`].
    fn check(degrees: f64) -> bool {
        (-90.0..=90.0).contains(&degrees)
    }
}

impl TryFrom<f64> for Latitude {
    type Error = &'static str;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees).ok_or("invalid `Latitude`")
    }
}

impl FromStr for Latitude {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<f64>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Latitude`")
    }
}

/// Longitude of a [`Coordinate`], in degrees.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Into, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(into = "f64", try_from = "f64")]
pub struct Longitude(f64);

impl Longitude {
    /// Creates a new [`Longitude`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `degrees` are in range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(degrees: f64) -> Self {
        Self(degrees)
    }

    /// Creates a new [`Longitude`] if the given `degrees` are valid.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        Self::check(degrees).then_some(Self(degrees))
    }

    /// Checks whether the given `degrees` are a valid [`Longitude`].
    fn check(degrees: f64) -> bool {
        (-180.0..=180.0).contains(&degrees)
    }
}

impl TryFrom<f64> for Longitude {
    type Error = &'static str;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees).ok_or("invalid `Longitude`")
    }
}

impl FromStr for Longitude {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<f64>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Longitude`")
    }
}

#[cfg(test)]
mod spec {
    use super::Coordinate;

    fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn validates_component_ranges() {
        assert!(Coordinate::new(0.0, 0.0).is_some());
        assert!(Coordinate::new(90.0, 180.0).is_some());
        assert!(Coordinate::new(-90.0, -180.0).is_some());

        assert!(Coordinate::new(90.1, 0.0).is_none());
        assert!(Coordinate::new(-90.1, 0.0).is_none());
        assert!(Coordinate::new(0.0, 180.1).is_none());
        assert!(Coordinate::new(0.0, -180.1).is_none());
    }

    #[test]
    fn distance_is_symmetric() {
        let koramangala = coordinate(12.9352, 77.6245);
        let indiranagar = coordinate(12.9784, 77.6408);

        let there = koramangala.distance_km(indiranagar);
        let back = indiranagar.distance_km(koramangala);

        assert!((there - back).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_to_itself_is_zero() {
        let koramangala = coordinate(12.9352, 77.6245);

        assert!(koramangala.distance_km(koramangala) < 1e-9);
    }

    #[test]
    fn measures_city_block_distances() {
        let koramangala = coordinate(12.9352, 77.6245);
        let indiranagar = coordinate(12.9784, 77.6408);

        let km = koramangala.distance_km(indiranagar);

        assert!((km - 4.95).abs() < 0.2, "expected ~4.95 km, got {km}");
    }

    #[test]
    fn measures_intercity_distances() {
        let berlin = coordinate(52.5200, 13.4050);
        let paris = coordinate(48.8566, 2.3522);

        let km = berlin.distance_km(paris);

        assert!((km - 878.0).abs() < 10.0, "expected ~878 km, got {km}");
    }
}
