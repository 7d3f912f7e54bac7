//! Helpers for tests that need real keys and signatures.

use std::str::FromStr;
use chrono::TimeDelta;
use crate::crypto::{PublicKey, PublicKeyFormat, Signer};
use crate::crypto::softsigner::{KeyId, OpenSslSigner};
use crate::uri;
use super::cert::{Cert, KeyUsage, TbsCert};
use super::crl::{Crl, CrlEntry, TbsCertList};
use super::resources::ResourceSet;
use super::sigobj::SignedObjectBuilder;
use super::x509::{Name, Serial, Time, Validity};


pub fn rsync(s: &str) -> uri::Rsync {
    uri::Rsync::from_str(s).unwrap()
}

/// A validity from an hour ago to a year from now.
pub fn validity() -> Validity {
    Validity::new(
        Time::now() - TimeDelta::hours(1),
        Time::now() + TimeDelta::days(365),
    )
}


//------------ TestCa --------------------------------------------------------

/// A CA with its own signer.
pub struct TestCa {
    pub signer: OpenSslSigner,
    pub key: KeyId,
    pub cert: Cert,

    /// The directory the CA publishes into.
    pub repository: uri::Rsync,

    /// Where the CA certificate itself is published.
    pub cert_uri: uri::Rsync,
}

impl TestCa {
    /// Creates a self-signed trust anchor with the given resources.
    pub fn root(resources: &str) -> Self {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let repository = rsync("rsync://example.com/ta/");
        let mut tbs = TbsCert::new(
            Serial::from(1u64),
            Name::from_pub_key(&pubkey),
            validity(),
            None,
            pubkey,
            KeyUsage::ca(),
        );
        tbs.set_basic_ca(Some(true));
        tbs.set_ca_repository(Some(repository.clone()));
        tbs.set_rpki_manifest(Some(repository.join(b"ca.mft").unwrap()));
        tbs.set_resources(&ResourceSet::from_str(resources).unwrap());
        let cert = tbs.into_cert(&signer, &key).unwrap();
        TestCa {
            signer, key, cert, repository,
            cert_uri: rsync("rsync://example.com/ta.cer"),
        }
    }

    /// Creates a child CA.
    ///
    /// If `resources` is `None`, the child inherits all its resources.
    pub fn child(
        &self, name: &str, serial: u64, resources: Option<&str>
    ) -> Self {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let repository = self.repository.join(
            format!("{}/", name).as_bytes()
        ).unwrap();
        let mut tbs = self.child_tbs(serial, pubkey, KeyUsage::ca());
        tbs.set_basic_ca(Some(true));
        tbs.set_ca_repository(Some(repository.clone()));
        tbs.set_rpki_manifest(Some(repository.join(b"ca.mft").unwrap()));
        match resources {
            Some(resources) => {
                tbs.set_resources(&ResourceSet::from_str(resources).unwrap())
            }
            None => tbs.set_inherit_resources(),
        }
        TestCa {
            signer, key,
            cert: self.sign(tbs),
            repository,
            cert_uri: self.repository.join(
                format!("{}.cer", name).as_bytes()
            ).unwrap(),
        }
    }

    /// Returns the data of a certificate issued by this CA.
    pub fn child_tbs(
        &self, serial: u64, pubkey: PublicKey, key_usage: KeyUsage
    ) -> TbsCert {
        let mut tbs = TbsCert::new(
            Serial::from(serial),
            self.cert.subject().clone(),
            validity(),
            None,
            pubkey,
            key_usage,
        );
        tbs.set_authority_key_identifier(self.cert.subject_key_identifier());
        tbs.set_crl_uri(Some(self.crl_uri()));
        tbs.set_ca_issuer(Some(self.cert_uri.clone()));
        tbs
    }

    pub fn sign(&self, tbs: TbsCert) -> Cert {
        tbs.into_cert(&self.signer, &self.key).unwrap()
    }

    pub fn crl_uri(&self) -> uri::Rsync {
        self.repository.join(b"ca.crl").unwrap()
    }

    /// Returns a current CRL revoking the given serials.
    pub fn crl(&self, revoked: &[Serial]) -> Crl {
        self.crl_with_times(
            Time::now() - TimeDelta::hours(1),
            Time::now() + TimeDelta::days(1),
            revoked,
        )
    }

    pub fn crl_with_times(
        &self, this_update: Time, next_update: Time, revoked: &[Serial]
    ) -> Crl {
        TbsCertList::new(
            self.cert.subject().clone(),
            self.cert.subject_key_identifier().unwrap(),
            this_update,
            next_update,
            Serial::from(1u64),
            revoked.iter().map(|serial| {
                CrlEntry::new(*serial, this_update)
            }).collect(),
        ).into_crl(&self.signer, &self.key).unwrap()
    }

    /// Returns a builder for an object published by this CA.
    ///
    /// The EE certificate inherits all resources.
    pub fn object_builder(
        &self, serial: u64, name: &str
    ) -> SignedObjectBuilder {
        SignedObjectBuilder {
            serial_number: Some(Serial::from(serial)),
            validity: Some(validity()),
            issuer: Some(self.cert.subject().clone()),
            crl_uri: Some(self.crl_uri()),
            ca_issuer: Some(self.cert_uri.clone()),
            signed_object: Some(
                self.repository.join(name.as_bytes()).unwrap()
            ),
            .. Default::default()
        }
    }
}
