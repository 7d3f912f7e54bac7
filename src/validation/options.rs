//! Options for validation.

use chrono::TimeDelta;
use crate::repository::x509::Time;


//------------ ValidationOptions ---------------------------------------------

/// The knobs that change how strictly objects are validated.
///
/// Values are created through [`ValidationOptions::builder`] or
/// [`Default`] which uses the current time and the strictest settings.
#[derive(Clone, Debug)]
pub struct ValidationOptions {
    /// The time all time comparisons are made against.
    validation_time: Time,

    /// Whether stale manifests and CRLs can be errors at all.
    ///
    /// If this is `false`, being past the next update time is only ever a
    /// warning.
    strict_manifest_crl_validity_checks: bool,

    /// How long past its next update time a manifest is still acceptable.
    manifest_max_stale_period: TimeDelta,

    /// How long past its next update time a CRL is still acceptable.
    crl_max_stale_period: TimeDelta,

    /// Whether a child claiming resources its parent lacks is a warning.
    allow_overclaim_parent_child: bool,

    /// The maximum number of certificates in a chain, including the root.
    max_chain_length: usize,
}

impl ValidationOptions {
    /// The default maximum chain length.
    pub const MAX_CHAIN_LENGTH: usize = 30;

    pub fn builder() -> ValidationOptionsBuilder {
        ValidationOptionsBuilder::default()
    }

    pub fn validation_time(&self) -> Time {
        self.validation_time
    }

    pub fn strict_manifest_crl_validity_checks(&self) -> bool {
        self.strict_manifest_crl_validity_checks
    }

    pub fn manifest_max_stale_period(&self) -> TimeDelta {
        self.manifest_max_stale_period
    }

    pub fn crl_max_stale_period(&self) -> TimeDelta {
        self.crl_max_stale_period
    }

    pub fn allow_overclaim_parent_child(&self) -> bool {
        self.allow_overclaim_parent_child
    }

    pub fn max_chain_length(&self) -> usize {
        self.max_chain_length
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}


//------------ ValidationOptionsBuilder --------------------------------------

/// A builder for validation options.
///
/// Every value not set explicitly is taken from the defaults when
/// [`build`][Self::build] is called.
#[derive(Clone, Debug, Default)]
pub struct ValidationOptionsBuilder {
    validation_time: Option<Time>,
    strict_manifest_crl_validity_checks: Option<bool>,
    manifest_max_stale_period: Option<TimeDelta>,
    crl_max_stale_period: Option<TimeDelta>,
    allow_overclaim_parent_child: Option<bool>,
    max_chain_length: Option<usize>,
}

impl ValidationOptionsBuilder {
    pub fn validation_time(mut self, time: Time) -> Self {
        self.validation_time = Some(time);
        self
    }

    pub fn strict_manifest_crl_validity_checks(mut self, strict: bool) -> Self {
        self.strict_manifest_crl_validity_checks = Some(strict);
        self
    }

    pub fn manifest_max_stale_period(mut self, period: TimeDelta) -> Self {
        self.manifest_max_stale_period = Some(period);
        self
    }

    pub fn crl_max_stale_period(mut self, period: TimeDelta) -> Self {
        self.crl_max_stale_period = Some(period);
        self
    }

    pub fn allow_overclaim_parent_child(mut self, allow: bool) -> Self {
        self.allow_overclaim_parent_child = Some(allow);
        self
    }

    pub fn max_chain_length(mut self, len: usize) -> Self {
        self.max_chain_length = Some(len);
        self
    }

    /// Creates the options.
    ///
    /// If no validation time was given, the current time is used.
    pub fn build(self) -> ValidationOptions {
        ValidationOptions {
            validation_time: self.validation_time.unwrap_or_else(Time::now),
            strict_manifest_crl_validity_checks:
                self.strict_manifest_crl_validity_checks.unwrap_or(true),
            manifest_max_stale_period:
                self.manifest_max_stale_period.unwrap_or_else(TimeDelta::zero),
            crl_max_stale_period:
                self.crl_max_stale_period.unwrap_or_else(TimeDelta::zero),
            allow_overclaim_parent_child:
                self.allow_overclaim_parent_child.unwrap_or(false),
            max_chain_length: self.max_chain_length.unwrap_or(
                ValidationOptions::MAX_CHAIN_LENGTH
            ),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let options = ValidationOptions::default();
        assert!(options.strict_manifest_crl_validity_checks());
        assert_eq!(options.manifest_max_stale_period(), TimeDelta::zero());
        assert_eq!(options.crl_max_stale_period(), TimeDelta::zero());
        assert!(!options.allow_overclaim_parent_child());
        assert_eq!(options.max_chain_length(), 30);
    }

    #[test]
    fn builder() {
        let time = Time::utc(2024, 5, 1, 0, 0, 0);
        let options = ValidationOptions::builder()
            .validation_time(time)
            .manifest_max_stale_period(TimeDelta::days(7))
            .allow_overclaim_parent_child(true)
            .build();
        assert_eq!(options.validation_time(), time);
        assert_eq!(options.manifest_max_stale_period(), TimeDelta::days(7));
        assert!(options.allow_overclaim_parent_child());
        assert!(options.strict_manifest_crl_validity_checks());
    }
}
