//! Validating certificate chains.
//!
//! The central function of this module is [`validate_parent_child`] which
//! checks a single certificate against its issuer. The checks are the same
//! for every kind of certificate except for the key usage bits required
//! on top of the basic ones and the rules for resources. These differences
//! are provided by an implementation of [`CertificateKind`].
//!
//! [`validate_chain`] uses the function to validate a certificate bottom
//! up: it collects all certificates up to a self-signed root through a
//! [`ResourceCertificateLocator`] and then checks every link from the top.

use bytes::Bytes;
use log::{debug, warn};
use crate::repository::cert::{Cert, KeyUsage};
use crate::repository::crl::Crl;
use crate::repository::resources::ResourceSet;
use super::check;
use super::options::ValidationOptions;
use super::result::{ValidationLocation, ValidationResult};


//------------ CertificateKind -----------------------------------------------

/// The checks that differ between kinds of certificates.
pub trait CertificateKind {
    /// Checks key usage bits beyond those required of all certificates.
    fn verify_key_usage_extra(
        &self,
        child: &Cert,
        key_usage: KeyUsage,
        result: &mut ValidationResult,
    );

    /// Checks the resources of `child` against those of its issuer.
    ///
    /// The `resources` are the effective resources of the issuer.
    fn verify_resources(
        &self,
        child: &Cert,
        resources: &ResourceSet,
        options: &ValidationOptions,
        result: &mut ValidationResult,
    );
}


//------------ ResourceCertificateKind ---------------------------------------

/// RPKI resource certificates.
///
/// CA certificates need to be allowed to sign CRLs and must not claim
/// resources their issuer doesn’t hold.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceCertificateKind;

impl CertificateKind for ResourceCertificateKind {
    fn verify_key_usage_extra(
        &self,
        child: &Cert,
        key_usage: KeyUsage,
        result: &mut ValidationResult,
    ) {
        if child.is_ca() {
            result.reject_if_false(
                key_usage.crl_sign(), check::CRL_SIGN, &[]
            );
        }
    }

    fn verify_resources(
        &self,
        child: &Cert,
        resources: &ResourceSet,
        options: &ValidationOptions,
        result: &mut ValidationResult,
    ) {
        if child.is_root() {
            result.reject_if_true(
                child.is_inherited(), check::ROOT_INHERITS_RESOURCES, &[]
            );
        }

        // Inherited resource kinds are taken from `resources` and thus
        // never add to the difference.
        let uncovered = child.effective_resources(resources).difference(
            resources
        );
        if uncovered.is_empty() {
            result.pass(check::RESOURCE_RANGE, &[""]);
        }
        else if options.allow_overclaim_parent_child() {
            result.warn(check::RESOURCE_RANGE, &[&uncovered.to_string()]);
        }
        else {
            result.reject(check::RESOURCE_RANGE, &[&uncovered.to_string()]);
        }
    }
}


//------------ IdentityCertificateKind ---------------------------------------

/// Identity certificates used by the provisioning protocol.
///
/// These carry no resources and need no key usage bits beyond the basic
/// ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityCertificateKind;

impl CertificateKind for IdentityCertificateKind {
    fn verify_key_usage_extra(
        &self,
        _child: &Cert,
        _key_usage: KeyUsage,
        _result: &mut ValidationResult,
    ) { }

    fn verify_resources(
        &self,
        _child: &Cert,
        _resources: &ResourceSet,
        _options: &ValidationOptions,
        _result: &mut ValidationResult,
    ) { }
}


//------------ validate_parent_child -----------------------------------------

/// Validates a certificate against its issuer.
///
/// All checks are recorded for the current location of `result` which
/// should be that of `child`. A failing check does not stop the checks
/// that follow it. The `crl` is the issuer’s CRL. It may only be missing
/// if `child` is a self-signed root. The `resources` are the effective
/// resources of the issuer.
///
/// Returns whether none of the checks failed.
pub fn validate_parent_child<K: CertificateKind + ?Sized>(
    kind: &K,
    options: &ValidationOptions,
    result: &mut ValidationResult,
    parent: &Cert,
    child: &Cert,
    crl: Option<&Crl>,
    resources: &ResourceSet,
) -> bool {
    let failures = result.failures_for_current_location().len();

    verify_signature(result, parent, child);
    verify_validity(options, result, child);
    verify_crl(result, parent, child, crl);
    result.reject_if_false(
        child.issuer() == parent.subject(),
        check::PREV_SUBJECT_EQ_ISSUER, &[]
    );
    verify_key_usage(kind, result, child);
    verify_authority_key_identifier(result, parent, child);
    kind.verify_resources(child, resources, options, result);

    result.failures_for_current_location().len() == failures
}

fn verify_signature(
    result: &mut ValidationResult, parent: &Cert, child: &Cert
) {
    result.reject_if_false(parent.is_ca(), check::ISSUER_IS_CA, &[]);
    result.reject_if_false(
        child.verify_signature(parent.subject_public_key_info()).is_ok(),
        check::SIGNATURE_VALID, &[]
    );
}

fn verify_validity(
    options: &ValidationOptions, result: &mut ValidationResult, child: &Cert
) {
    let now = options.validation_time();
    let validity = child.validity();
    result.reject_if_false(
        now >= validity.not_before(),
        check::NOT_VALID_BEFORE, &[&validity.not_before().to_string()]
    );
    result.reject_if_false(
        now <= validity.not_after(),
        check::NOT_VALID_AFTER, &[&validity.not_after().to_string()]
    );
}

fn verify_crl(
    result: &mut ValidationResult,
    parent: &Cert,
    child: &Cert,
    crl: Option<&Crl>,
) {
    let crl = match crl {
        Some(crl) => crl,
        None => {
            result.reject_if_false(child.is_root(), check::CRL_REQUIRED, &[]);
            return
        }
    };
    result.reject_if_false(
        crl.verify_signature(parent.subject_public_key_info()).is_ok(),
        check::CRL_SIGNATURE_VALID, &[]
    );
    result.reject_if_true(
        crl.contains(child.serial_number()),
        check::CERT_NOT_REVOKED, &[&child.serial_number().to_string()]
    );
}

fn verify_key_usage<K: CertificateKind + ?Sized>(
    kind: &K, result: &mut ValidationResult, child: &Cert
) {
    let key_usage = match child.key_usage() {
        Some(key_usage) => {
            result.pass(check::KEY_USAGE_EXT_PRESENT, &[]);
            key_usage
        }
        None => {
            result.reject(check::KEY_USAGE_EXT_PRESENT, &[]);
            return
        }
    };
    if child.is_ca() {
        result.reject_if_false(
            key_usage.key_cert_sign(), check::KEY_CERT_SIGN, &[]
        );
    }
    else {
        result.reject_if_false(
            key_usage.digital_signature(), check::DIG_SIGN, &[]
        );
    }
    kind.verify_key_usage_extra(child, key_usage, result);
}

fn verify_authority_key_identifier(
    result: &mut ValidationResult, parent: &Cert, child: &Cert
) {
    if child.is_root() {
        return
    }
    let ski = parent.subject_key_identifier();
    let aki = child.authority_key_identifier();
    result.reject_if_none(ski, check::SKI_PRESENT, &[]);
    result.reject_if_none(aki, check::AKI_PRESENT, &[]);
    if let (Some(ski), Some(aki)) = (ski, aki) {
        result.reject_if_false(ski == aki, check::PREV_SKI_EQ_AKI, &[]);
    }
}


//------------ ResourceCertificateLocator ------------------------------------

/// Finds the issuer certificate and CRL of a certificate.
///
/// Both methods return the location of what they found and its encoded
/// form. Returning `None` means that nothing could be found.
pub trait ResourceCertificateLocator {
    /// Finds the issuer certificate of `cert`.
    fn find_parent(&self, cert: &Cert) -> Option<(ValidationLocation, Bytes)>;

    /// Finds the CRL of the issuer of `cert`.
    fn find_crl(&self, cert: &Cert) -> Option<(ValidationLocation, Bytes)>;
}


//------------ validate_chain ------------------------------------------------

/// Validates a certificate bottom up.
///
/// The certificate `cert` published at `location` is validated together
/// with all its ancestors up to a self-signed root. If `trust_anchors` is
/// not empty, the root has to be one of them. The chain, including root
/// and `cert`, may have at most
/// [`max_chain_length`][ValidationOptions::max_chain_length]
/// certificates.
///
/// Each certificate’s checks are recorded for its own location. The
/// walk is aborted if an ancestor is missing, cannot be decoded, or the
/// chain gets too long, as well as if a CRL cannot be decoded. The cursor
/// of `result` is left at the last location checked.
///
/// Returns whether the run added no failures to `result`.
pub fn validate_chain<L: ResourceCertificateLocator + ?Sized>(
    location: impl Into<ValidationLocation>,
    cert: Cert,
    locator: &L,
    trust_anchors: &[Cert],
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> bool {
    let location = location.into();
    let failures = result.failures_for_all_locations().len();
    match build_chain(location.clone(), cert, locator, options, result) {
        Some(chain) => {
            validate_links(chain, locator, trust_anchors, options, result);
        }
        None => {
            warn!("{}: cannot build certificate chain, validation aborted.",
                location
            );
        }
    }
    result.failures_for_all_locations().len() == failures
}

/// Collects the chain from `cert` up to a root.
///
/// The returned chain starts with the root.
fn build_chain<L: ResourceCertificateLocator + ?Sized>(
    location: ValidationLocation,
    cert: Cert,
    locator: &L,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> Option<Vec<(ValidationLocation, Cert)>> {
    let max = options.max_chain_length();
    let max_str = max.to_string();
    result.set_location(&location);
    cert.check(result);
    let mut chain = vec![(location, cert)];
    while let Some((location, cert)) = chain.last() {
        if cert.is_root() {
            break
        }
        let found = locator.find_parent(cert);
        result.set_location(location);
        let (parent_location, data) = match found {
            Some(found) => {
                result.pass(check::CERT_CHAIN_COMPLETE, &[]);
                found
            }
            None => {
                result.reject(check::CERT_CHAIN_COMPLETE, &[]);
                return None
            }
        };
        let parent = match Cert::decode(data) {
            Ok(parent) => parent,
            Err(err) => {
                warn!("{}: cannot decode certificate: {}",
                    parent_location, err
                );
                result.reject_for_location(
                    &parent_location, check::CERTIFICATE_PARSED, &[]
                );
                return None
            }
        };
        result.set_location(&parent_location);
        if !result.reject_if_false(
            chain.len() < max, check::CERT_CHAIN_LENGTH, &[&max_str]
        ) {
            return None
        }
        parent.check(result);
        chain.push((parent_location, parent));
    }
    chain.reverse();
    Some(chain)
}

/// Validates a chain starting at the root.
fn validate_links<L: ResourceCertificateLocator + ?Sized>(
    chain: Vec<(ValidationLocation, Cert)>,
    locator: &L,
    trust_anchors: &[Cert],
    options: &ValidationOptions,
    result: &mut ValidationResult,
) {
    let mut chain = chain.into_iter();
    let (root_location, mut parent) = match chain.next() {
        Some(root) => root,
        None => return
    };
    if !trust_anchors.is_empty() {
        result.set_location(&root_location);
        result.reject_if_false(
            trust_anchors.contains(&parent), check::ROOT_IS_TA, &[]
        );
    }

    let mut resources = parent.resources();
    for (location, child) in chain {
        result.set_location(&location);
        let crl = match locator.find_crl(&child) {
            Some((crl_location, data)) => match Crl::decode(data) {
                Ok(crl) => Some(crl),
                Err(err) => {
                    result.reject_for_location(
                        &crl_location, check::CRL_PARSED, &[]
                    );
                    warn!("{}: cannot decode CRL {}: {}, validation aborted.",
                        location, crl_location, err
                    );
                    return
                }
            }
            None => None,
        };
        let valid = validate_parent_child(
            &ResourceCertificateKind, options, result,
            &parent, &child, crl.as_ref(), &resources
        );
        debug!("{}: certificate {}.",
            location, if valid { "valid" } else { "invalid" }
        );
        resources = child.effective_resources(&resources);
        parent = child;
    }
}


//============ Tests =========================================================

#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use std::str::FromStr;
    use chrono::TimeDelta;
    use crate::crypto::{PublicKeyFormat, Signer};
    use crate::crypto::softsigner::OpenSslSigner;
    use crate::repository::cert::TbsCert;
    use crate::repository::crl::TbsCertList;
    use crate::repository::test_util::{rsync, validity, TestCa};
    use crate::repository::x509::{Name, Serial, Time};
    use super::*;

    #[derive(Default)]
    struct Locator {
        certs: Vec<(ValidationLocation, Cert)>,
        crls: Vec<(ValidationLocation, Crl)>,
    }

    impl Locator {
        fn add_ca(&mut self, ca: &TestCa) {
            self.certs.push((
                ValidationLocation::from(&ca.cert_uri), ca.cert.clone()
            ));
            self.crls.push((
                ValidationLocation::from(&ca.crl_uri()), ca.crl(&[])
            ));
        }
    }

    impl ResourceCertificateLocator for Locator {
        fn find_parent(
            &self, cert: &Cert
        ) -> Option<(ValidationLocation, Bytes)> {
            self.certs.iter().find(|(_, item)| {
                item.subject() == cert.issuer()
            }).map(|(location, item)| (location.clone(), item.to_bytes()))
        }

        fn find_crl(
            &self, cert: &Cert
        ) -> Option<(ValidationLocation, Bytes)> {
            self.crls.iter().find(|(_, item)| {
                item.issuer() == cert.issuer()
            }).map(|(location, item)| (location.clone(), item.to_bytes()))
        }
    }

    fn validate(
        parent: &TestCa, child: &Cert, crl: &Crl,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let mut result = ValidationResult::with_location("child.cer");
        validate_parent_child(
            &ResourceCertificateKind, options, &mut result,
            &parent.cert, child, Some(crl), &parent.cert.resources()
        );
        result
    }

    /// Creates a chain of CA certificates all using the same key.
    ///
    /// Returns a locator for the chain and the location and certificate
    /// of its last element.
    fn long_chain(len: usize) -> (Locator, ValidationLocation, Cert) {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let mut locator = Locator::default();
        let mut issuer = Name::from_common_name("ca-0");
        for i in 0..len {
            let subject = Name::from_common_name(&format!("ca-{}", i));
            let mut tbs = TbsCert::new(
                Serial::from(i as u64 + 1), issuer.clone(), validity(),
                Some(subject.clone()), pubkey.clone(), KeyUsage::ca()
            );
            tbs.set_basic_ca(Some(true));
            if i == 0 {
                tbs.set_resources(
                    &ResourceSet::from_str("10.0.0.0/8").unwrap()
                );
            }
            else {
                tbs.set_authority_key_identifier(
                    Some(pubkey.key_identifier())
                );
                tbs.set_crl_uri(Some(rsync(
                    &format!("rsync://example.com/ca-{}.crl", i - 1)
                )));
                tbs.set_ca_issuer(Some(rsync(
                    &format!("rsync://example.com/ca-{}.cer", i - 1)
                )));
                tbs.set_inherit_resources();
            }
            let crl = TbsCertList::new(
                subject.clone(),
                pubkey.key_identifier(),
                Time::now() - TimeDelta::hours(1),
                Time::now() + TimeDelta::days(1),
                Serial::from(1u64),
                Vec::new(),
            ).into_crl(&signer, &key).unwrap();
            locator.certs.push((
                ValidationLocation::new(
                    format!("rsync://example.com/ca-{}.cer", i)
                ),
                tbs.into_cert(&signer, &key).unwrap()
            ));
            locator.crls.push((
                ValidationLocation::new(
                    format!("rsync://example.com/ca-{}.crl", i)
                ),
                crl
            ));
            issuer = subject;
        }
        let (location, cert) = locator.certs.last().cloned().unwrap();
        (locator, location, cert)
    }

    #[test]
    fn valid_child() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, Some("10.1.0.0/16"));
        let result = validate(
            &ta, &child.cert, &ta.crl(&[]), &ValidationOptions::default()
        );
        assert!(!result.has_failures(), "{}", result);
        assert!(result.has_no_failures_or_warnings());
    }

    #[test]
    fn revoked_child() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, Some("10.1.0.0/16"));
        let crl = ta.crl(&[child.cert.serial_number()]);
        let result = validate(
            &ta, &child.cert, &crl, &ValidationOptions::default()
        );
        let failures = result.failures_for_all_locations();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CERT_NOT_REVOKED);
        assert_eq!(
            failures[0].params(), [child.cert.serial_number().to_string()]
        );
        assert!(result.has_failure_for_location(&"child.cer".into()));
    }

    #[test]
    fn revocation_is_idempotent() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, Some("10.1.0.0/16"));
        let crl = ta.crl(&[child.cert.serial_number()]);
        let options = ValidationOptions::default();
        assert_eq!(
            validate(&ta, &child.cert, &crl, &options),
            validate(&ta, &child.cert, &crl, &options),
        );
    }

    #[test]
    fn overclaiming_child() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, Some("10.1.0.0/16, 11.0.0.0/8"));
        let crl = ta.crl(&[]);

        let result = validate(
            &ta, &child.cert, &crl, &ValidationOptions::default()
        );
        let failures = result.failures_for_all_locations();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::RESOURCE_RANGE);
        assert_eq!(failures[0].params(), ["11.0.0.0/8"]);

        let result = validate(
            &ta, &child.cert, &crl,
            &ValidationOptions::builder()
                .allow_overclaim_parent_child(true)
                .build()
        );
        assert!(!result.has_failures());
        assert_eq!(result.all_warnings()[0].key(), check::RESOURCE_RANGE);
    }

    #[test]
    fn containment_is_monotonic() {
        // A child whose resources are covered stays valid when the
        // issuer’s resources grow.
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, Some("10.1.0.0/16"));
        let crl = ta.crl(&[]);
        let options = ValidationOptions::default();
        for resources in ["10.1.0.0/16", "10.0.0.0/8", "10.0.0.0/7, AS1"] {
            let mut result = ValidationResult::default();
            assert!(validate_parent_child(
                &ResourceCertificateKind, &options, &mut result,
                &ta.cert, &child.cert, Some(&crl),
                &ResourceSet::from_str(resources).unwrap()
            ));
        }
    }

    #[test]
    fn inheriting_child() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, None);
        let result = validate(
            &ta, &child.cert, &ta.crl(&[]), &ValidationOptions::default()
        );
        assert!(!result.has_failures(), "{}", result);
    }

    /// Returns the data of a CA certificate with a new key issued by `ta`.
    fn child_ca_tbs(ta: &TestCa, key_usage: KeyUsage) -> TbsCert {
        let key = ta.signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = ta.signer.get_key_info(&key).unwrap();
        let mut tbs = ta.child_tbs(2, pubkey, key_usage);
        tbs.set_basic_ca(Some(true));
        tbs.set_inherit_resources();
        tbs
    }

    fn failure_keys(result: &ValidationResult) -> Vec<&'static str> {
        result.failures_for_all_locations().iter().map(|check| {
            check.key()
        }).collect()
    }

    #[test]
    fn not_yet_valid_child() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, None);
        let options = ValidationOptions::builder()
            .validation_time(Time::now() - TimeDelta::days(1))
            .build();
        let result = validate(&ta, &child.cert, &ta.crl(&[]), &options);
        assert_eq!(failure_keys(&result), [check::NOT_VALID_BEFORE]);
        assert_eq!(
            result.failures_for_all_locations()[0].params(),
            [child.cert.validity().not_before().to_string()]
        );
    }

    #[test]
    fn issuer_not_ca() {
        let mut ta = TestCa::root("AS64496, 10.0.0.0/8");
        let pubkey = ta.cert.subject_public_key_info().clone();
        let mut tbs = TbsCert::new(
            Serial::from(1u64), Name::from_pub_key(&pubkey), validity(),
            None, pubkey, KeyUsage::ca()
        );
        tbs.set_resources(
            &ResourceSet::from_str("AS64496, 10.0.0.0/8").unwrap()
        );
        ta.cert = tbs.into_cert(&ta.signer, &ta.key).unwrap();
        assert_eq!(ta.cert.basic_ca(), None);

        let child = ta.child("a", 2, None);
        let result = validate(
            &ta, &child.cert, &ta.crl(&[]), &ValidationOptions::default()
        );
        assert_eq!(failure_keys(&result), [check::ISSUER_IS_CA]);
    }

    #[test]
    fn root_inheriting_resources() {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let mut tbs = TbsCert::new(
            Serial::from(1u64), Name::from_pub_key(&pubkey), validity(),
            None, pubkey, KeyUsage::ca()
        );
        tbs.set_basic_ca(Some(true));
        tbs.set_inherit_resources();
        let root = tbs.into_cert(&signer, &key).unwrap();
        assert!(root.is_root());

        let mut result = ValidationResult::with_location("ta.cer");
        assert!(!validate_parent_child(
            &ResourceCertificateKind, &ValidationOptions::default(),
            &mut result, &root, &root, None, &root.resources()
        ));
        assert_eq!(failure_keys(&result), [check::ROOT_INHERITS_RESOURCES]);
    }

    #[test]
    fn missing_key_usage() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let mut tbs = child_ca_tbs(&ta, KeyUsage::ca());
        tbs.set_key_usage(None);
        let result = validate(
            &ta, &ta.sign(tbs), &ta.crl(&[]), &ValidationOptions::default()
        );
        assert_eq!(failure_keys(&result), [check::KEY_USAGE_EXT_PRESENT]);
    }

    #[test]
    fn ca_without_crl_sign() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let tbs = child_ca_tbs(&ta, KeyUsage::KEY_CERT_SIGN);
        let result = validate(
            &ta, &ta.sign(tbs), &ta.crl(&[]), &ValidationOptions::default()
        );
        assert_eq!(failure_keys(&result), [check::CRL_SIGN]);

        // The identity kind does not ask for it.
        let tbs = child_ca_tbs(&ta, KeyUsage::KEY_CERT_SIGN);
        let mut result = ValidationResult::with_location("child.cer");
        assert!(validate_parent_child(
            &IdentityCertificateKind, &ValidationOptions::default(),
            &mut result, &ta.cert, &ta.sign(tbs), Some(&ta.crl(&[])),
            &ResourceSet::empty()
        ));
    }

    #[test]
    fn expired_child() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, None);
        let options = ValidationOptions::builder()
            .validation_time(Time::now() + TimeDelta::days(400))
            .build();
        let mut result = ValidationResult::with_location("child.cer");
        validate_parent_child(
            &IdentityCertificateKind, &options, &mut result,
            &ta.cert, &child.cert, None, &ResourceSet::empty()
        );
        let keys: Vec<_> = result.failures_for_current_location().iter()
            .map(|check| check.key()).collect();
        assert_eq!(keys, [check::NOT_VALID_AFTER, check::CRL_REQUIRED]);
    }

    #[test]
    fn wrong_issuer() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let other = TestCa::root("AS64496, 10.0.0.0/8");
        let child = ta.child("a", 2, None);
        let result = validate(
            &other, &child.cert, &other.crl(&[]),
            &ValidationOptions::default()
        );
        let keys: Vec<_> = result.failures_for_current_location().iter()
            .map(|check| check.key()).collect();
        assert_eq!(
            keys,
            [
                check::SIGNATURE_VALID, check::PREV_SUBJECT_EQ_ISSUER,
                check::PREV_SKI_EQ_AKI,
            ]
        );
    }

    #[test]
    fn trust_anchor_against_itself() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let mut result = ValidationResult::with_location(&ta.cert_uri);
        assert!(validate_parent_child(
            &ResourceCertificateKind, &ValidationOptions::default(),
            &mut result, &ta.cert, &ta.cert, None, &ta.cert.resources()
        ));
    }

    #[test]
    fn bottom_up() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let ca = ta.child("a", 2, None);
        let leaf = ca.child("b", 3, Some("10.1.0.0/16"));
        let mut locator = Locator::default();
        locator.add_ca(&ta);
        locator.add_ca(&ca);

        let mut result = ValidationResult::default();
        assert!(validate_chain(
            &leaf.cert_uri, leaf.cert.clone(), &locator,
            &[ta.cert.clone()], &ValidationOptions::default(), &mut result
        ), "{}", result);
        assert_eq!(
            result.current_location(),
            &ValidationLocation::from(&leaf.cert_uri)
        );
        assert!(
            result.result(
                &ValidationLocation::from(&ca.cert_uri), check::SIGNATURE_VALID
            ).is_some()
        );

        let other = TestCa::root("AS64496, 10.0.0.0/8");
        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            &leaf.cert_uri, leaf.cert.clone(), &locator,
            &[other.cert.clone()], &ValidationOptions::default(), &mut result
        ));
        let failures = result.failures_for_all_locations();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::ROOT_IS_TA);
    }

    #[test]
    fn bottom_up_overclaim_below_inheritance() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let ca = ta.child("a", 2, None);
        let leaf = ca.child("b", 3, Some("11.0.0.0/16"));
        let mut locator = Locator::default();
        locator.add_ca(&ta);
        locator.add_ca(&ca);

        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            &leaf.cert_uri, leaf.cert.clone(), &locator, &[],
            &ValidationOptions::default(), &mut result
        ));
        let failures = result.failures(
            &ValidationLocation::from(&leaf.cert_uri)
        );
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::RESOURCE_RANGE);
        assert_eq!(failures[0].params(), ["11.0.0.0/16"]);
    }

    #[test]
    fn missing_parent() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let ca = ta.child("a", 2, None);
        let leaf = ca.child("b", 3, None);
        let mut locator = Locator::default();
        locator.add_ca(&ca);

        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            &leaf.cert_uri, leaf.cert.clone(), &locator, &[],
            &ValidationOptions::default(), &mut result
        ));
        let failures = result.failures_for_all_locations();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CERT_CHAIN_COMPLETE);
        assert!(result.has_failure_for_location(
            &ValidationLocation::from(&ca.cert_uri)
        ));
    }

    #[test]
    fn undecodable_ancestor() {
        struct Broken;

        impl ResourceCertificateLocator for Broken {
            fn find_parent(
                &self, _: &Cert
            ) -> Option<(ValidationLocation, Bytes)> {
                Some(("parent.cer".into(), Bytes::from_static(b"foo")))
            }

            fn find_crl(
                &self, _: &Cert
            ) -> Option<(ValidationLocation, Bytes)> {
                None
            }
        }

        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let leaf = ta.child("a", 2, None);
        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            &leaf.cert_uri, leaf.cert.clone(), &Broken, &[],
            &ValidationOptions::default(), &mut result
        ));
        let failures = result.failures(&"parent.cer".into());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CERTIFICATE_PARSED);
    }

    #[test]
    fn leaf_profile() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let mut tbs = child_ca_tbs(&ta, KeyUsage::ca());
        tbs.set_crl_uri(None);
        tbs.set_ca_issuer(None);
        let mut locator = Locator::default();
        locator.add_ca(&ta);

        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            "leaf.cer", ta.sign(tbs), &locator, &[],
            &ValidationOptions::default(), &mut result
        ));
        assert_eq!(
            failure_keys(&result), [check::CRLDP_PRESENT, check::AIA_PRESENT]
        );
        assert!(result.has_failure_for_location(&"leaf.cer".into()));
    }

    #[test]
    fn ancestor_profile() {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let mut ca = ta.child("a", 2, None);
        let leaf = ca.child("b", 3, None);
        let mut tbs = ta.child_tbs(
            2, ca.cert.subject_public_key_info().clone(), KeyUsage::ca()
        );
        tbs.set_basic_ca(Some(true));
        tbs.set_inherit_resources();
        tbs.set_ca_issuer(None);
        ca.cert = ta.sign(tbs);
        let mut locator = Locator::default();
        locator.add_ca(&ta);
        locator.add_ca(&ca);

        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            &leaf.cert_uri, leaf.cert.clone(), &locator, &[],
            &ValidationOptions::default(), &mut result
        ));
        assert_eq!(failure_keys(&result), [check::AIA_PRESENT]);
        assert!(result.has_failure_for_location(
            &ValidationLocation::from(&ca.cert_uri)
        ));
    }

    #[test]
    fn chain_too_long() {
        let (locator, location, cert) = long_chain(31);
        let mut result = ValidationResult::default();
        assert!(!validate_chain(
            location, cert, &locator, &[],
            &ValidationOptions::default(), &mut result
        ));
        let failures = result.failures_for_all_locations();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CERT_CHAIN_LENGTH);
        assert_eq!(failures[0].params(), ["30"]);
        assert!(result.validated_locations().all(|location| {
            result.result(location, check::SIGNATURE_VALID).is_none()
        }));
    }

    #[test]
    fn longest_chain() {
        let (locator, location, cert) = long_chain(30);
        let mut result = ValidationResult::default();
        assert!(validate_chain(
            location.clone(), cert, &locator, &[],
            &ValidationOptions::default(), &mut result
        ), "{}", result);
        assert!(result.result(&location, check::SIGNATURE_VALID).is_some());
        assert_eq!(result.validated_locations().count(), 31);
    }
}
