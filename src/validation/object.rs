//! Validating repository objects against their issuer.
//!
//! Every object published by a CA is validated within the
//! [`ValidationContext`] of that CA. For signed objects, this means that
//! the embedded EE certificate is validated as a child of the CA
//! certificate using the CA’s CRL which is acquired through a
//! [`CrlLocator`]. Object specific checks follow.
//!
//! All functions here expect the object to have been parsed successfully
//! and record their checks for the location they are given. They return a
//! [`ValidationOutcome`].

use log::debug;
use crate::{oid, uri};
use crate::repository::cert::Cert;
use crate::repository::crl::Crl;
use crate::repository::manifest::Manifest;
use crate::repository::object::RepositoryObject;
use crate::repository::roa::Roa;
use super::check;
use super::chain::{validate_parent_child, ResourceCertificateKind};
use super::context::ValidationContext;
use super::crl::{check_next_update, validate_crl};
use super::options::ValidationOptions;
use super::result::{ValidationLocation, ValidationResult};


//------------ CrlLocator ----------------------------------------------------

/// Provides the CRL published at a given URI.
///
/// The locator can record its own checks in `result`. When it is called,
/// the current location is `uri`.
pub trait CrlLocator {
    fn get_crl(
        &self,
        uri: &uri::Rsync,
        context: &ValidationContext,
        result: &mut ValidationResult,
    ) -> Option<Crl>;
}


//------------ ValidationOutcome ---------------------------------------------

/// The result of validating a single object.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ValidationOutcome {
    valid: bool,
    revoked: bool,
}

impl ValidationOutcome {
    /// Determines the outcome from the current location of `result`.
    ///
    /// The object is valid if the number of failures for the location is
    /// still `failures`.
    fn from_result(result: &ValidationResult, failures: usize) -> Self {
        let current = result.failures_for_current_location();
        let outcome = ValidationOutcome {
            valid: current.len() == failures,
            revoked: current.iter().any(|item| {
                item.key() == check::CERT_NOT_REVOKED
            }),
        };
        debug!("{}: {}.", result.current_location(), outcome);
        outcome
    }

    /// Returns whether no check failed.
    pub fn is_valid(self) -> bool {
        self.valid
    }

    /// Returns whether the certificate of the object has been revoked.
    pub fn is_revoked(self) -> bool {
        self.revoked
    }
}

impl std::fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match (self.valid, self.revoked) {
            (true, _) => "valid",
            (false, true) => "revoked",
            (false, false) => "invalid",
        })
    }
}


//------------ Trust Anchors and Certificates --------------------------------

/// Validates a trust anchor certificate.
///
/// The certificate is checked against itself. It must be self-signed and
/// list all its resources.
pub fn validate_trust_anchor(
    location: impl Into<ValidationLocation>,
    cert: &Cert,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> ValidationOutcome {
    result.set_location(location);
    let failures = result.failures_for_current_location().len();
    validate_parent_child(
        &ResourceCertificateKind, options, result,
        cert, cert, None, &cert.resources()
    );
    ValidationOutcome::from_result(result, failures)
}

/// Validates a certificate issued by the CA of `context`.
pub fn validate_cert<L: CrlLocator + ?Sized>(
    location: impl Into<ValidationLocation>,
    cert: &Cert,
    context: &ValidationContext,
    locator: &L,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> ValidationOutcome {
    result.set_location(location);
    let failures = result.failures_for_current_location().len();
    if let Some(crl) = fetch_crl(cert, context, locator, result) {
        validate_parent_child(
            &ResourceCertificateKind, options, result,
            context.certificate(), cert, Some(&crl),
            context.effective_resources()
        );
    }
    ValidationOutcome::from_result(result, failures)
}


//------------ Signed Objects ------------------------------------------------

/// Validates a manifest issued by the CA of `context`.
///
/// Apart from validating the EE certificate, the manifest must not be
/// past its next update time by more than the
/// [`manifest_max_stale_period`][ValidationOptions::manifest_max_stale_period].
/// If the validity of the EE certificate differs from the update times of
/// the manifest, a warning is recorded.
pub fn validate_manifest<L: CrlLocator + ?Sized>(
    location: impl Into<ValidationLocation>,
    manifest: &Manifest,
    context: &ValidationContext,
    locator: &L,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> ValidationOutcome {
    result.set_location(location);
    let failures = result.failures_for_current_location().len();
    let ee = manifest.cert();
    let crl = match fetch_crl(ee, context, locator, result) {
        Some(crl) => crl,
        None => return ValidationOutcome::from_result(result, failures)
    };
    validate_parent_child(
        &ResourceCertificateKind, options, result,
        context.certificate(), ee, Some(&crl),
        context.effective_resources()
    );

    let validity = ee.validity();
    result.warn_if_false(
        validity.not_before() == manifest.this_update()
            && validity.not_after() == manifest.next_update(),
        check::MANIFEST_VALIDITY_TIMES_MATCH,
        &[
            &manifest.this_update().to_string(),
            &manifest.next_update().to_string(),
            &validity.not_before().to_string(),
            &validity.not_after().to_string(),
        ]
    );
    check_next_update(
        result, options, check::MANIFEST_PAST_NEXT_UPDATE_TIME,
        manifest.next_update(), options.manifest_max_stale_period(),
    );
    ValidationOutcome::from_result(result, failures)
}

/// Validates a ROA issued by the CA of `context`.
///
/// All prefixes of the ROA must be covered by the effective resources of
/// its EE certificate.
pub fn validate_roa<L: CrlLocator + ?Sized>(
    location: impl Into<ValidationLocation>,
    roa: &Roa,
    context: &ValidationContext,
    locator: &L,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> ValidationOutcome {
    result.set_location(location);
    let failures = result.failures_for_current_location().len();
    let content_type = roa.signed_object().content_type();
    result.reject_if_false(
        *content_type == oid::ROUTE_ORIGIN_AUTHZ,
        check::ROA_CONTENT_TYPE, &[&content_type.to_string()]
    );
    let ee = roa.cert();
    let crl = match fetch_crl(ee, context, locator, result) {
        Some(crl) => crl,
        None => return ValidationOutcome::from_result(result, failures)
    };
    validate_parent_child(
        &ResourceCertificateKind, options, result,
        context.certificate(), ee, Some(&crl),
        context.effective_resources()
    );

    let uncovered = roa.to_resources().difference(
        &ee.effective_resources(context.effective_resources())
    );
    if uncovered.is_empty() {
        result.pass(check::ROA_RESOURCES, &[""]);
    }
    else {
        result.reject(check::ROA_RESOURCES, &[&uncovered.to_string()]);
    }
    ValidationOutcome::from_result(result, failures)
}


//------------ Any Object ----------------------------------------------------

/// Validates any object issued by the CA of `context`.
///
/// CRLs are validated against the CA certificate. Unknown objects
/// produce a warning only.
pub fn validate_object<L: CrlLocator + ?Sized>(
    location: impl Into<ValidationLocation>,
    object: &RepositoryObject,
    context: &ValidationContext,
    locator: &L,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> ValidationOutcome {
    match *object {
        RepositoryObject::Cert(ref cert) => {
            validate_cert(location, cert, context, locator, options, result)
        }
        RepositoryObject::Crl(ref crl) => {
            result.set_location(location);
            let failures = result.failures_for_current_location().len();
            validate_crl(crl, context.certificate(), options, result);
            ValidationOutcome::from_result(result, failures)
        }
        RepositoryObject::Manifest(ref manifest) => {
            validate_manifest(
                location, manifest, context, locator, options, result
            )
        }
        RepositoryObject::Roa(ref roa) => {
            validate_roa(location, roa, context, locator, options, result)
        }
        RepositoryObject::Unknown(_) => {
            result.set_location(location);
            let failures = result.failures_for_current_location().len();
            let name = result.current_location().to_string();
            result.warn(check::KNOWN_OBJECT_TYPE, &[&name]);
            ValidationOutcome::from_result(result, failures)
        }
    }
}


//------------ Helpers -------------------------------------------------------

/// Acquires the CRL for a certificate.
///
/// The locator is called with the CRL URI as the current location. An
/// error is recorded for the current location if there is no CRL.
fn fetch_crl<L: CrlLocator + ?Sized>(
    cert: &Cert,
    context: &ValidationContext,
    locator: &L,
    result: &mut ValidationResult,
) -> Option<Crl> {
    let uri = match cert.crl_uri() {
        Some(uri) => uri,
        None => {
            result.reject(check::CRL_VALID, &[""]);
            return None
        }
    };
    let location = result.current_location().clone();
    result.set_location(uri);
    let crl = locator.get_crl(uri, context, result);
    result.set_location(location);
    result.reject_if_none(crl.as_ref(), check::CRL_VALID, &[&uri.to_string()]);
    crl
}


//============ Tests =========================================================
