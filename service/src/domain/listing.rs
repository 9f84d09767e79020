//! [`Listing`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{donor, geo, receiver};

/// Offer of food put up by a donor.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the donor offering the food.
    pub donor_id: donor::Id,

    /// [`FoodName`] of this [`Listing`].
    pub food_name: FoodName,

    /// [`Quantity`] of the offered food.
    pub quantity: Quantity,

    /// [`ScheduledTime`] the food is available for pickup.
    pub scheduled_time: ScheduledTime,

    /// [`ContactPhone`] of the donor.
    pub contact_phone: ContactPhone,

    /// [`Address`] of the pickup point.
    pub address: Address,

    /// [`PhotoUrl`] of the offered food.
    pub photo: PhotoUrl,

    /// Pickup [`geo::Coordinate`] of this [`Listing`], if known.
    ///
    /// A [`Listing`] without one can only be ranked as "unknown distance".
    pub coordinate: Option<geo::Coordinate>,

    /// Lifecycle [`Status`] of this [`Listing`].
    pub status: Status,

    /// ID of the receiver this [`Listing`] was accepted by.
    ///
    /// Set exactly when [`Status`] becomes [`Status::Accepted`] and never
    /// cleared afterwards.
    pub accepted_by: Option<receiver::Id>,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Listing`] was accepted, if it was.
    pub accepted_at: Option<AcceptanceDateTime>,

    /// [`DateTime`] when this [`Listing`] was completed, if it was.
    pub completed_at: Option<CompletionDateTime>,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Listing`]."]
    enum Status {
        #[doc = "Offered, and open for a receiver to accept."]
        Available = 1,

        #[doc = "Claimed by a receiver, pickup in progress."]
        Accepted = 2,

        #[doc = "Picked up, lifecycle finished."]
        Completed = 3,
    }
}

impl Status {
    /// Checks whether this [`Status`] may transition into the `next` one.
    ///
    /// The lifecycle is forward-only: `Available → Accepted → Completed`,
    /// with no path back.
    #[must_use]
    pub fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::Accepted)
                | (Self::Accepted, Self::Completed)
        )
    }
}

/// Name of the food offered by a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct FoodName(String);

impl FoodName {
    /// Creates a new [`FoodName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`FoodName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`FoodName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for FoodName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FoodName`")
    }
}

/// Quantity of the food offered by a [`Listing`], as a free-form description
/// (`10 kg`, `50 servings`, and alike).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Quantity(String);

impl Quantity {
    /// Creates a new [`Quantity`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `quantity` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(quantity: impl Into<String>) -> Self {
        Self(quantity.into())
    }

    /// Creates a new [`Quantity`] if the given `quantity` is valid.
    #[must_use]
    pub fn new(quantity: impl Into<String>) -> Option<Self> {
        let quantity = quantity.into();
        Self::check(&quantity).then_some(Self(quantity))
    }

    /// Checks whether the given `quantity` is a valid [`Quantity`].
    fn check(quantity: impl AsRef<str>) -> bool {
        let quantity = quantity.as_ref();
        quantity.trim() == quantity
            && !quantity.is_empty()
            && quantity.len() <= 512
    }
}

impl FromStr for Quantity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Quantity`")
    }
}

/// Free-form availability window of a [`Listing`] (`Today, 6:00 PM` and
/// alike).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct ScheduledTime(String);

impl ScheduledTime {
    /// Creates a new [`ScheduledTime`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `time` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(time: impl Into<String>) -> Self {
        Self(time.into())
    }

    /// Creates a new [`ScheduledTime`] if the given `time` is valid.
    #[must_use]
    pub fn new(time: impl Into<String>) -> Option<Self> {
        let time = time.into();
        Self::check(&time).then_some(Self(time))
    }

    /// Checks whether the given `time` is a valid [`ScheduledTime`].
    fn check(time: impl AsRef<str>) -> bool {
        let time = time.as_ref();
        time.trim() == time && !time.is_empty() && time.len() <= 512
    }
}

impl FromStr for ScheduledTime {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ScheduledTime`")
    }
}

/// Phone number a receiver reaches the donor of a [`Listing`] at.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct ContactPhone(String);

impl ContactPhone {
    /// Creates a new [`ContactPhone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`ContactPhone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`ContactPhone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`ContactPhone`] invariants:
        /// - Optional leading `+`;
        /// - 8 to 20 digits, optionally grouped with spaces or dashes.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{6,18}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for ContactPhone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ContactPhone`")
    }
}

/// Human-readable address of a [`Listing`] pickup point.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// URL of a [`Listing`] photo.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct PhotoUrl(String);

impl PhotoUrl {
    /// Stock placeholder shown for [`Listing`]s whose donor uploaded no
    /// photo.
    pub const STOCK: &'static str = "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=400&h=300&fit=crop";

    /// Creates a new [`PhotoUrl`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`PhotoUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`PhotoUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        url.trim() == url && !url.is_empty() && url.len() <= 2048
    }
}

impl Default for PhotoUrl {
    fn default() -> Self {
        Self(Self::STOCK.into())
    }
}

impl FromStr for PhotoUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PhotoUrl`")
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// [`DateTime`] when a [`Listing`] was accepted.
pub type AcceptanceDateTime = DateTimeOf<(Listing, unit::Acceptance)>;

/// [`DateTime`] when a [`Listing`] was completed.
pub type CompletionDateTime = DateTimeOf<(Listing, unit::Completion)>;

#[cfg(test)]
mod spec {
    use super::{ContactPhone, FoodName, PhotoUrl, Status};

    #[test]
    fn food_name_rejects_blank_and_padded_input() {
        assert!(FoodName::new("Fresh Vegetables").is_some());

        assert!(FoodName::new("").is_none());
        assert!(FoodName::new("  ").is_none());
        assert!(FoodName::new(" Fresh Vegetables").is_none());
    }

    #[test]
    fn contact_phone_accepts_common_formats() {
        assert!(ContactPhone::new("+91 98765 43210").is_some());
        assert!(ContactPhone::new("987-654-3210").is_some());
        assert!(ContactPhone::new("9876543210").is_some());

        assert!(ContactPhone::new("").is_none());
        assert!(ContactPhone::new("call me").is_none());
    }

    #[test]
    fn photo_defaults_to_stock_placeholder() {
        assert_eq!(AsRef::<str>::as_ref(&PhotoUrl::default()), PhotoUrl::STOCK);
    }

    #[test]
    fn status_only_moves_forward() {
        assert!(Status::Available.allows(Status::Accepted));
        assert!(Status::Accepted.allows(Status::Completed));

        assert!(!Status::Available.allows(Status::Completed));
        assert!(!Status::Accepted.allows(Status::Available));
        assert!(!Status::Completed.allows(Status::Available));
        assert!(!Status::Completed.allows(Status::Accepted));
        assert!(!Status::Available.allows(Status::Available));
    }
}
