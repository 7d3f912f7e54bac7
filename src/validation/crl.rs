//! Validating CRLs.

use chrono::TimeDelta;
use log::debug;
use crate::repository::cert::Cert;
use crate::repository::crl::Crl;
use crate::repository::x509::Time;
use super::check;
use super::options::ValidationOptions;
use super::result::ValidationResult;


/// Validates a CRL against the certificate of its issuer.
///
/// The checks are recorded for the current location of `result`. Returns
/// whether none of them failed.
pub fn validate_crl(
    crl: &Crl,
    issuer: &Cert,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) -> bool {
    let failures = result.failures_for_current_location().len();
    result.reject_if_false(
        crl.verify_signature(issuer.subject_public_key_info()).is_ok(),
        check::CRL_SIGNATURE_VALID, &[]
    );
    check_next_update(
        result, options, check::CRL_NEXT_UPDATE_BEFORE_NOW,
        crl.next_update(), options.crl_max_stale_period(),
    );
    let valid = result.failures_for_current_location().len() == failures;
    debug!("{}: CRL {}.",
        result.current_location(), if valid { "valid" } else { "invalid" }
    );
    valid
}

/// Records whether a next update time has passed.
///
/// A time in the past is an error only if strict checks are enabled and
/// it is more than `max_stale` ago. Otherwise it is a warning. A
/// `max_stale` too large to add to `next_update` never runs out.
pub(crate) fn check_next_update(
    result: &mut ValidationResult,
    options: &ValidationOptions,
    key: &'static str,
    next_update: Time,
    max_stale: TimeDelta,
) {
    let now = options.validation_time();
    let param = next_update.to_string();
    if next_update >= now {
        result.pass(key, &[&param]);
    }
    else if
        !options.strict_manifest_crl_validity_checks()
        || next_update.checked_add(max_stale).map_or(true, |limit| {
            now <= limit
        })
    {
        result.warn(key, &[&param]);
    }
    else {
        result.reject(key, &[&param]);
    }
}


//============ Tests =========================================================
