//! Recognizing repository objects.
//!
//! Files in an RPKI repository are usually told apart by their extension.
//! [`RepositoryObject::decode`] does that for the current location of a
//! validation result. If nothing is known about an object, [`detect`]
//! tries each kind in turn: resource certificate, ROA, manifest, and CRL.
//!
//! Each attempt produces a [`Detected`] value which distinguishes data
//! that is clearly something else from data that claims to be the kind in
//! question but is broken.

use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::validation::check;
use crate::validation::result::ValidationResult;
use super::cert::Cert;
use super::crl::Crl;
use super::manifest::Manifest;
use super::roa::Roa;
use super::sigobj::SignedObject;


//------------ RepositoryObjectType ------------------------------------------

/// The kinds of objects this crate knows about.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RepositoryObjectType {
    Cert,
    Crl,
    Manifest,
    Roa,
}

impl RepositoryObjectType {
    /// Determines the object type from a file name or URI.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext {
            "cer" => Some(RepositoryObjectType::Cert),
            "crl" => Some(RepositoryObjectType::Crl),
            "mft" => Some(RepositoryObjectType::Manifest),
            "roa" => Some(RepositoryObjectType::Roa),
            _ => None
        }
    }

    /// Tries to decode `data` as an object of this type.
    ///
    /// Since the type is known, data that fails to decode is reported as
    /// malformed rather than as being of another kind.
    pub fn detect(self, data: Bytes) -> Detected<RepositoryObject> {
        let res = match self {
            RepositoryObjectType::Cert => {
                detect_cert(data).map(RepositoryObject::Cert)
            }
            RepositoryObjectType::Crl => {
                detect_crl(data).map(RepositoryObject::Crl)
            }
            RepositoryObjectType::Manifest | RepositoryObjectType::Roa => {
                match detect_signed(data) {
                    Detected::Found(object) => {
                        match object.object_type() {
                            Some(found) if found == self => {
                                Detected::Found(object)
                            }
                            found => {
                                Detected::Malformed(format!(
                                    "expected {:?} but found {:?}",
                                    self, found
                                ))
                            }
                        }
                    }
                    other => other
                }
            }
        };
        match res {
            Detected::NotThisKind => {
                Detected::Malformed(format!("not a {:?} object", self))
            }
            other => other
        }
    }
}


//------------ RepositoryObject ----------------------------------------------

/// Any of the objects that can appear in a repository.
#[derive(Clone, Debug)]
pub enum RepositoryObject {
    Cert(Cert),
    Crl(Crl),
    Manifest(Manifest),
    Roa(Roa),

    /// An object with a file extension that isn’t known.
    Unknown(Bytes),
}

impl RepositoryObject {
    /// Decodes an object based on the name of the current location.
    ///
    /// An unknown extension results in a warning and an
    /// [`Unknown`][Self::Unknown] object. For known extensions, the parser
    /// for that kind records its checks in `result` and the object is only
    /// returned if it succeeds.
    pub fn decode(data: Bytes, result: &mut ValidationResult) -> Option<Self> {
        let name = result.current_location().to_string();
        let object_type = match RepositoryObjectType::from_name(&name) {
            Some(object_type) => object_type,
            None => {
                result.warn(check::KNOWN_OBJECT_TYPE, &[&name]);
                return Some(RepositoryObject::Unknown(data))
            }
        };
        match object_type {
            RepositoryObjectType::Cert => {
                match Cert::decode(data) {
                    Ok(cert) => {
                        result.pass(check::CERTIFICATE_PARSED, &[]);
                        if cert.check(result) {
                            Some(RepositoryObject::Cert(cert))
                        }
                        else {
                            None
                        }
                    }
                    Err(err) => {
                        debug!("{}: failed to decode certificate: {}",
                            result.current_location(), err
                        );
                        result.reject(check::CERTIFICATE_PARSED, &[]);
                        None
                    }
                }
            }
            RepositoryObjectType::Crl => {
                match Crl::decode(data) {
                    Ok(crl) => {
                        result.pass(check::CRL_PARSED, &[]);
                        Some(RepositoryObject::Crl(crl))
                    }
                    Err(err) => {
                        debug!("{}: failed to decode CRL: {}",
                            result.current_location(), err
                        );
                        result.reject(check::CRL_PARSED, &[]);
                        None
                    }
                }
            }
            RepositoryObjectType::Manifest => {
                Manifest::parse(data, result).map(RepositoryObject::Manifest)
            }
            RepositoryObjectType::Roa => {
                Roa::parse(data, result).map(RepositoryObject::Roa)
            }
        }
    }

    /// Returns the type of the object or `None` for unknown objects.
    pub fn object_type(&self) -> Option<RepositoryObjectType> {
        match *self {
            RepositoryObject::Cert(_) => Some(RepositoryObjectType::Cert),
            RepositoryObject::Crl(_) => Some(RepositoryObjectType::Crl),
            RepositoryObject::Manifest(_) => {
                Some(RepositoryObjectType::Manifest)
            }
            RepositoryObject::Roa(_) => Some(RepositoryObjectType::Roa),
            RepositoryObject::Unknown(_) => None,
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match *self {
            RepositoryObject::Cert(ref cert) => cert.to_bytes(),
            RepositoryObject::Crl(ref crl) => crl.to_bytes(),
            RepositoryObject::Manifest(ref manifest) => manifest.to_bytes(),
            RepositoryObject::Roa(ref roa) => roa.to_bytes(),
            RepositoryObject::Unknown(ref data) => data.clone(),
        }
    }
}


//------------ Detected ------------------------------------------------------

/// The outcome of trying to decode data as a certain kind of object.
#[derive(Clone, Debug)]
pub enum Detected<T> {
    /// The data is an object of this kind.
    Found(T),

    /// The data is not an object of this kind at all.
    NotThisKind,

    /// The data is of this kind but broken. The reason is given.
    Malformed(String),
}

impl<T> Detected<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> Detected<U> {
        match self {
            Detected::Found(value) => Detected::Found(op(value)),
            Detected::NotThisKind => Detected::NotThisKind,
            Detected::Malformed(reason) => Detected::Malformed(reason),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Detected::Found(value) => Some(value),
            _ => None
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(*self, Detected::Found(_))
    }

    pub fn is_not_this_kind(&self) -> bool {
        matches!(*self, Detected::NotThisKind)
    }
}


//------------ detect --------------------------------------------------------

/// Determines the kind of an object from its content alone.
///
/// The kinds are tried in turn and the first one that doesn’t reject the
/// data as something else entirely decides the outcome. If no kind
/// accepts the data, returns [`Detected::NotThisKind`].
pub fn detect(data: Bytes) -> Detected<RepositoryObject> {
    let res = detect_cert(data.clone()).map(RepositoryObject::Cert);
    if !res.is_not_this_kind() {
        return res
    }
    let res = detect_signed(data.clone());
    if !res.is_not_this_kind() {
        return res
    }
    detect_crl(data).map(RepositoryObject::Crl)
}

fn detect_cert(data: Bytes) -> Detected<Cert> {
    match Cert::decode(data) {
        Ok(cert) => Detected::Found(cert),
        Err(err) => {
            debug!("not a certificate: {}", err);
            Detected::NotThisKind
        }
    }
}

fn detect_crl(data: Bytes) -> Detected<Crl> {
    match Crl::decode(data) {
        Ok(crl) => Detected::Found(crl),
        Err(err) => {
            debug!("not a CRL: {}", err);
            Detected::NotThisKind
        }
    }
}

/// Tries to decode a manifest or ROA.
///
/// Data that isn’t a CMS signed object or carries a content type other
/// than these two is something else. Any other failed check makes the
/// object malformed.
fn detect_signed(data: Bytes) -> Detected<RepositoryObject> {
    let mut result = ValidationResult::default();
    let signed = match SignedObject::parse(data, &mut result) {
        Some(signed) => signed,
        None => {
            return failure_to_detected(&result, &[
                check::CMS_DATA_PARSING, check::CMS_CONTENT_TYPE
            ])
        }
    };
    if *signed.content_type() == oid::ROUTE_ORIGIN_AUTHZ {
        match Roa::from_signed_object(signed, &mut result) {
            Some(roa) => Detected::Found(RepositoryObject::Roa(roa)),
            None => failure_to_detected(&result, &[])
        }
    }
    else {
        match Manifest::from_signed_object(signed, &mut result) {
            Some(manifest) => {
                Detected::Found(RepositoryObject::Manifest(manifest))
            }
            None => failure_to_detected(&result, &[])
        }
    }
}

/// Turns the failures of a scratch result into the detection outcome.
///
/// If the first failure has one of the keys in `other_kind`, the data is
/// not of the kind. Otherwise it is malformed and the failures are the
/// reason.
fn failure_to_detected<T>(
    result: &ValidationResult, other_kind: &[&str]
) -> Detected<T> {
    let failures = result.failures_for_current_location();
    match failures.first() {
        Some(first) if other_kind.contains(&first.key()) => {
            Detected::NotThisKind
        }
        _ => {
            Detected::Malformed(
                failures.iter().map(ToString::to_string)
                    .collect::<Vec<_>>().join("; ")
            )
        }
    }
}


//============ Tests =========================================================


#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use std::str::FromStr;
    use crate::crypto::{PublicKeyFormat, Signer};
    use crate::repository::cert::KeyUsage;
    use crate::repository::manifest::ManifestBuilder;
    use crate::repository::resources::Asn;
    use crate::repository::roa::{RoaBuilder, RoaPrefix};
    use crate::repository::test_util::TestCa;
    use crate::repository::x509::{Serial, Time};
    use super::*;

    fn roa(ca: &TestCa) -> Roa {
        let mut builder = RoaBuilder::new(Asn::from_u32(64496));
        builder.push(RoaPrefix::from_str("10.0.0.0/16").unwrap());
        builder.finalize(
            ca.object_builder(3, "a.roa"), &ca.signer, &ca.key
        ).unwrap()
    }

    #[test]
    fn detect_all_kinds() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let manifest = ManifestBuilder::new(
            Serial::from(1u64), Time::now(), Time::now()
        ).finalize(
            ca.object_builder(2, "ca.mft"), &ca.signer, &ca.key
        ).unwrap();

        assert!(matches!(
            detect(ca.cert.to_bytes()),
            Detected::Found(RepositoryObject::Cert(_))
        ));
        assert!(matches!(
            detect(ca.crl(&[]).to_bytes()),
            Detected::Found(RepositoryObject::Crl(_))
        ));
        assert!(matches!(
            detect(manifest.to_bytes()),
            Detected::Found(RepositoryObject::Manifest(_))
        ));
        assert!(matches!(
            detect(roa(&ca).to_bytes()),
            Detected::Found(RepositoryObject::Roa(_))
        ));
    }

    #[test]
    fn known_type_mismatch() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let data = roa(&ca).to_bytes();
        assert!(RepositoryObjectType::Roa.detect(data.clone()).is_found());
        assert!(matches!(
            RepositoryObjectType::Manifest.detect(data.clone()),
            Detected::Malformed(_)
        ));
        assert!(matches!(
            RepositoryObjectType::Cert.detect(data),
            Detected::Malformed(_)
        ));
    }

    #[test]
    fn decode_by_location() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut result = ValidationResult::with_location(
            "rsync://example.com/ta/a.roa"
        );
        let object = RepositoryObject::decode(
            roa(&ca).to_bytes(), &mut result
        ).unwrap();
        assert_eq!(object.object_type(), Some(RepositoryObjectType::Roa));
        assert!(!result.has_failures());

        result.set_location("rsync://example.com/ta/a.crl");
        assert!(RepositoryObject::decode(
            object.to_bytes(), &mut result
        ).is_none());
        assert_eq!(
            result.failures_for_current_location()[0].key(),
            check::CRL_PARSED
        );
    }

    #[test]
    fn decode_checks_cert_profile() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let ca = ta.child("a", 2, None);
        let mut result = ValidationResult::with_location(&ca.cert_uri);
        assert!(matches!(
            RepositoryObject::decode(ca.cert.to_bytes(), &mut result),
            Some(RepositoryObject::Cert(_))
        ));
        assert!(!result.has_failures());
        assert!(
            result.result(
                result.current_location(), check::CRLDP_PRESENT
            ).is_some()
        );

        let key = ta.signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = ta.signer.get_key_info(&key).unwrap();
        let mut tbs = ta.child_tbs(3, pubkey, KeyUsage::ca());
        tbs.set_basic_ca(Some(true));
        tbs.set_inherit_resources();
        tbs.set_crl_uri(None);
        result.set_location("rsync://example.com/ta/b.cer");
        assert!(RepositoryObject::decode(
            ta.sign(tbs).to_bytes(), &mut result
        ).is_none());
        let failures = result.failures_for_current_location();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CRLDP_PRESENT);
    }
}
