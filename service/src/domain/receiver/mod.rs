//! Receiver definitions.

pub mod session;

use std::{collections::HashMap, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::geo;

pub use self::session::Session;

/// Organization receiving food donations.
#[derive(Clone, Debug)]
pub struct Profile {
    /// ID of this [`Profile`].
    pub id: Id,

    /// [`Kind`] of the receiving organization.
    pub kind: Kind,

    /// [`ContactName`] of the person applying on behalf of the organization.
    pub contact_name: ContactName,

    /// [`Phone`] of the applicant.
    pub phone: Phone,

    /// [`RegisteredName`] of the organization.
    pub registered_name: RegisteredName,

    /// [`RegisteredAddress`] of the organization.
    pub registered_address: RegisteredAddress,

    /// Estimated number of people the organization feeds.
    pub beneficiaries: Beneficiaries,

    /// [`Website`] (or social media link) of the organization, if any.
    pub website: Option<Website>,

    /// Verification [`Documents`] uploaded by the applicant.
    pub documents: Documents,

    /// [`geo::Coordinate`] of the organization, if captured.
    pub location: Option<geo::Coordinate>,

    /// Indicator whether the organization has been verified.
    ///
    /// Always `false` right after registration.
    pub verified: bool,

    /// [`DateTime`] when this [`Profile`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a receiver.
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
    #[doc = "Kind of a receiving organization."]
    enum Kind {
        #[doc = "A non-governmental organization."]
        Ngo = 1,

        #[doc = "An orphanage."]
        Orphanage = 2,

        #[doc = "A homeless shelter."]
        Shelter = 3,
    }
}

/// Name of the person applying on behalf of a receiving organization.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct ContactName(String);

impl ContactName {
    /// Creates a new [`ContactName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`ContactName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`ContactName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for ContactName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ContactName`")
    }
}

/// Phone number of a receiver applicant.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] invariants:
        /// - Optional leading `+`;
        /// - 8 to 20 digits, optionally grouped with spaces or dashes.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{6,18}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Registered legal name of a receiving organization.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct RegisteredName(String);

impl RegisteredName {
    /// Creates a new [`RegisteredName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`RegisteredName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`RegisteredName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for RegisteredName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `RegisteredName`")
    }
}

/// Registered address of a receiving organization.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct RegisteredAddress(String);

impl RegisteredAddress {
    /// Creates a new [`RegisteredAddress`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`RegisteredAddress`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`RegisteredAddress`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for RegisteredAddress {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `RegisteredAddress`")
    }
}

/// Estimated number of people a receiving organization feeds.
pub type Beneficiaries = u32;

/// Website or social media link of a receiving organization.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Website(String);

impl Website {
    /// Creates a new [`Website`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`Website`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`Website`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        url.trim() == url && !url.is_empty() && url.len() <= 2048
    }
}

impl FromStr for Website {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Website`")
    }
}

/// Verification documents of a [`Profile`], keyed by the required document
/// kind.
pub type Documents = HashMap<document::Kind, document::FileRef>;

pub mod document {
    //! Verification document definitions.

    use common::define_kind;
    use derive_more::{AsRef, Display, FromStr};

    define_kind! {
        #[doc = "Kind of a verification document."]
        enum Kind {
            #[doc = "Registration certificate of the organization."]
            RegistrationCertificate = 1,

            #[doc = "PAN card."]
            PanCard = 2,

            #[doc = "12A tax exemption form."]
            Form12A = 3,

            #[doc = "80G tax deduction certificate."]
            Certificate80G = 4,

            #[doc = "Audited financial report."]
            AuditedFinancialReport = 5,

            #[doc = "Financial statement."]
            FinancialStatement = 6,

            #[doc = "Local government registration."]
            LocalGovtRegistration = 7,
        }
    }

    /// Reference to an uploaded document file.
    #[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
    #[as_ref(forward)]
    pub struct FileRef(String);

    impl FileRef {
        /// Creates a new [`FileRef`].
        ///
        /// # Safety
        ///
        /// The caller must ensure that the given `file` matches the format.
        #[expect(unsafe_code, reason = "bypass")]
        #[must_use]
        pub unsafe fn new_unchecked(file: impl Into<String>) -> Self {
            Self(file.into())
        }

        /// Creates a new [`FileRef`] if the given `file` is valid.
        #[must_use]
        pub fn new(file: impl Into<String>) -> Option<Self> {
            let file = file.into();
            Self::check(&file).then_some(Self(file))
        }

        /// Checks whether the given `file` is a valid [`FileRef`].
        fn check(file: impl AsRef<str>) -> bool {
            let file = file.as_ref();
            file.trim() == file && !file.is_empty() && file.len() <= 2048
        }
    }

    impl FromStr for FileRef {
        type Err = &'static str;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::new(s).ok_or("invalid `FileRef`")
        }
    }
}

/// [`DateTime`] when a [`Profile`] was created.
pub type CreationDateTime = DateTimeOf<(Profile, unit::Creation)>;
