//! [`Command`] for registering a new receiver [`Profile`].

use std::collections::HashMap;

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::receiver::{
    document, ContactName, Phone, RegisteredAddress, RegisteredName, Website,
};
use crate::{
    domain::{geo, receiver, Profile},
    infra::{database, Database},
    Notice, Service,
};

use super::Command;

/// [`Command`] for registering a new receiver [`Profile`].
///
/// Carries the raw multi-step application input accumulated by the
/// receiver-facing collaborator. The stored [`Profile`] always starts
/// unverified.
#[derive(Clone, Debug)]
pub struct RegisterReceiver {
    /// [`receiver::Kind`] of the organization.
    pub kind: receiver::Kind,

    /// Raw [`ContactName`] input.
    pub contact_name: String,

    /// Raw [`Phone`] input.
    pub phone: String,

    /// Raw [`RegisteredName`] input.
    pub registered_name: String,

    /// Raw [`RegisteredAddress`] input.
    pub registered_address: String,

    /// Estimated number of people the organization feeds.
    pub beneficiaries: receiver::Beneficiaries,

    /// Raw [`Website`] input, if provided.
    pub website: Option<String>,

    /// Raw uploaded verification documents, keyed by the required
    /// [`document::Kind`].
    pub documents: HashMap<receiver::document::Kind, String>,

    /// [`geo::Coordinate`] of the organization, if captured.
    pub location: Option<geo::Coordinate>,
}

impl<Db> Command<RegisterReceiver> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Profile>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Profile;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterReceiver,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterReceiver {
            kind,
            contact_name,
            phone,
            registered_name,
            registered_address,
            beneficiaries,
            website,
            documents,
            location,
        } = cmd;

        let contact_name = receiver::ContactName::new(contact_name)
            .ok_or_else(|| tracerr::new!(E::InvalidContactName))?;
        let phone = receiver::Phone::new(phone)
            .ok_or_else(|| tracerr::new!(E::InvalidPhone))?;
        let registered_name = receiver::RegisteredName::new(registered_name)
            .ok_or_else(|| tracerr::new!(E::InvalidRegisteredName))?;
        let registered_address =
            receiver::RegisteredAddress::new(registered_address)
                .ok_or_else(|| tracerr::new!(E::InvalidRegisteredAddress))?;
        let website = website
            .map(|url| {
                receiver::Website::new(url)
                    .ok_or_else(|| tracerr::new!(E::InvalidWebsite))
            })
            .transpose()?;
        let documents = documents
            .into_iter()
            .map(|(kind, file)| {
                receiver::document::FileRef::new(file)
                    .map(|file| (kind, file))
                    .ok_or_else(|| tracerr::new!(E::InvalidDocument(kind)))
            })
            .collect::<Result<receiver::Documents, _>>()?;

        let profile = Profile {
            id: receiver::Id::new(),
            kind,
            contact_name,
            phone,
            registered_name,
            registered_address,
            beneficiaries,
            website,
            documents,
            location,
            verified: false,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(profile.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(Notice::success(
            "Application Submitted",
            "Your organization will be verified shortly",
        ));

        Ok(profile)
    }
}

/// Error of [`RegisterReceiver`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// `contact_name` input is not a valid [`ContactName`].
    #[display("`contact_name` is not a valid `ContactName`")]
    InvalidContactName,

    /// Uploaded document is not a valid [`document::FileRef`].
    #[display("`{_0}` document is not a valid `FileRef`")]
    InvalidDocument(#[error(not(source))] receiver::document::Kind),

    /// `phone` input is not a valid [`Phone`].
    #[display("`phone` is not a valid `Phone`")]
    InvalidPhone,

    /// `registered_address` input is not a valid [`RegisteredAddress`].
    #[display("`registered_address` is not a valid `RegisteredAddress`")]
    InvalidRegisteredAddress,

    /// `registered_name` input is not a valid [`RegisteredName`].
    #[display("`registered_name` is not a valid `RegisteredName`")]
    InvalidRegisteredName,

    /// `website` input is not a valid [`Website`].
    #[display("`website` is not a valid `Website`")]
    InvalidWebsite,
}

#[cfg(test)]
mod spec {
    use std::collections::HashMap;

    use common::operations::{By, Select};

    use crate::{
        domain::{receiver, Profile},
        infra::{Database as _, Memory},
        Command as _, Config, Service,
    };

    use super::{ExecutionError, RegisterReceiver};

    fn application() -> RegisterReceiver {
        RegisterReceiver {
            kind: receiver::Kind::Ngo,
            contact_name: "Asha Rao".into(),
            phone: "+91 98765 43213".into(),
            registered_name: "Helping Hands Foundation".into(),
            registered_address: "12 MG Road, Bangalore".into(),
            beneficiaries: 250,
            website: Some("https://helpinghands.example".into()),
            documents: HashMap::from([(
                receiver::document::Kind::RegistrationCertificate,
                "uploads/registration.pdf".into(),
            )]),
            location: None,
        }
    }

    #[tokio::test]
    async fn stores_unverified_profile() {
        let service = Service::new(Config::default(), Memory::new());

        let profile = service.execute(application()).await.unwrap();

        assert!(!profile.verified);
        assert_eq!(profile.kind, receiver::Kind::Ngo);

        let stored: Option<Profile> = service
            .database()
            .execute(Select(By::new(profile.id)))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn rejects_blank_registered_name() {
        let service = Service::new(Config::default(), Memory::new());

        let err = service
            .execute(RegisterReceiver {
                registered_name: "  ".into(),
                ..application()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidRegisteredName,
        ));
    }
}
