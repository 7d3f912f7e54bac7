//! Collecting the outcome of validation.
//!
//! Every step of validating an object is recorded as a [`ValidationCheck`]
//! in a [`ValidationResult`]. Checks are grouped by the location of the
//! object they concern, typically its rsync URI. The result keeps a cursor,
//! the current location, that all recording methods use implicitly.
//!
//! A result never forgets anything: recording the same check again appends
//! another entry. It has failures if any check anywhere has the status
//! [`ValidationStatus::Error`].

use std::fmt;
use std::collections::HashMap;
use crate::uri;
use crate::repository::x509::Time;


//------------ ValidationLocation --------------------------------------------

/// The location of an object that checks are recorded for.
///
/// This is usually the URI of the object but can be any name, such as
/// the tag [`ValidationLocation::generated`] for freshly built objects.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ValidationLocation(String);

impl ValidationLocation {
    pub fn new(name: impl Into<String>) -> Self {
        ValidationLocation(name.into())
    }

    /// Returns the location used for objects that have no URI yet.
    pub fn generated() -> Self {
        ValidationLocation("<generated>".into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for ValidationLocation {
    fn default() -> Self {
        Self::generated()
    }
}

impl<'a> From<&'a str> for ValidationLocation {
    fn from(name: &'a str) -> Self {
        ValidationLocation(name.into())
    }
}

impl From<String> for ValidationLocation {
    fn from(name: String) -> Self {
        ValidationLocation(name)
    }
}

impl<'a> From<&'a uri::Rsync> for ValidationLocation {
    fn from(uri: &'a uri::Rsync) -> Self {
        ValidationLocation(uri.to_string())
    }
}

impl<'a> From<&'a ValidationLocation> for ValidationLocation {
    fn from(location: &'a ValidationLocation) -> Self {
        location.clone()
    }
}

impl fmt::Display for ValidationLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}


//------------ ValidationStatus ----------------------------------------------

/// The outcome of a single check.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValidationStatus {
    Passed,
    Warning,
    Error,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ValidationStatus::Passed => "passed",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Error => "error",
        })
    }
}


//------------ ValidationCheck -----------------------------------------------

/// A single recorded check.
///
/// The key is one of the constants in [`check`][super::check]. The number
/// of parameters is fixed for each key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationCheck {
    status: ValidationStatus,
    key: &'static str,
    params: Vec<String>,
}

impl ValidationCheck {
    pub fn new(
        status: ValidationStatus, key: &'static str, params: &[&str]
    ) -> Self {
        ValidationCheck {
            status,
            key,
            params: params.iter().map(|param| param.to_string()).collect(),
        }
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_error(&self) -> bool {
        self.status == ValidationStatus::Error
    }
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.key)?;
        if !self.params.is_empty() {
            write!(f, " ({})", self.params.join(", "))?;
        }
        Ok(())
    }
}


//------------ ValidationMetric ----------------------------------------------

/// A non-boolean diagnostic value recorded for a location.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationMetric {
    name: String,
    value: String,
    measured_at: Time,
}

impl ValidationMetric {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn measured_at(&self) -> Time {
        self.measured_at
    }
}


//------------ LocationResult ------------------------------------------------

/// Everything recorded for one location.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
struct LocationResult {
    location: ValidationLocation,
    checks: Vec<ValidationCheck>,
    metrics: Vec<ValidationMetric>,
}

impl LocationResult {
    fn new(location: ValidationLocation) -> Self {
        LocationResult {
            location,
            checks: Vec::new(),
            metrics: Vec::new(),
        }
    }

    fn with_status(
        &self, status: ValidationStatus
    ) -> impl Iterator<Item = &ValidationCheck> + '_ {
        self.checks.iter().filter(move |check| check.status == status)
    }
}


//------------ ValidationResult ----------------------------------------------

/// The accumulated checks of a validation run.
///
/// Locations are kept in the order they were first used. Within a location,
/// checks are kept in the order they were recorded.
///
/// The conditional methods such as [`reject_if_false`][Self::reject_if_false]
/// record a passed check if the condition says all is well and a warning or
/// error otherwise. They return `true` if the check passed, so callers can
/// skip checks that depend on it.
///
/// A result is meant to be owned by a single validation run. It is not
/// synchronized in any way.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationResult {
    locations: Vec<LocationResult>,
    index: HashMap<ValidationLocation, usize>,
    current: usize,
}

/// # Creation and Cursor
///
impl ValidationResult {
    /// Creates a new, empty result with the cursor at `location`.
    pub fn with_location(location: impl Into<ValidationLocation>) -> Self {
        let mut res = ValidationResult {
            locations: Vec::new(),
            index: HashMap::new(),
            current: 0,
        };
        res.set_location(location);
        res
    }

    /// Moves the cursor to the given location.
    pub fn set_location(
        &mut self, location: impl Into<ValidationLocation>
    ) -> &mut Self {
        self.current = self.location_index(location.into());
        self
    }

    /// Returns the location of the cursor.
    pub fn current_location(&self) -> &ValidationLocation {
        &self.locations[self.current].location
    }

    /// Returns all locations seen so far in the order of first use.
    pub fn validated_locations(
        &self
    ) -> impl Iterator<Item = &ValidationLocation> + '_ {
        self.locations.iter().map(|item| &item.location)
    }

    fn location_index(&mut self, location: ValidationLocation) -> usize {
        if let Some(idx) = self.index.get(&location) {
            return *idx
        }
        let idx = self.locations.len();
        self.index.insert(location.clone(), idx);
        self.locations.push(LocationResult::new(location));
        idx
    }

    fn record(
        &mut self, status: ValidationStatus, key: &'static str,
        params: &[&str],
    ) {
        self.locations[self.current].checks.push(
            ValidationCheck::new(status, key, params)
        )
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::with_location(ValidationLocation::generated())
    }
}


/// # Recording Checks
///
impl ValidationResult {
    pub fn pass(&mut self, key: &'static str, params: &[&str]) -> &mut Self {
        self.record(ValidationStatus::Passed, key, params);
        self
    }

    pub fn warn(&mut self, key: &'static str, params: &[&str]) -> &mut Self {
        self.record(ValidationStatus::Warning, key, params);
        self
    }

    pub fn reject(
        &mut self, key: &'static str, params: &[&str]
    ) -> &mut Self {
        self.record(ValidationStatus::Error, key, params);
        self
    }

    pub fn warn_if_false(
        &mut self, condition: bool, key: &'static str, params: &[&str]
    ) -> bool {
        if condition {
            self.pass(key, params);
        }
        else {
            self.warn(key, params);
        }
        condition
    }

    pub fn warn_if_true(
        &mut self, condition: bool, key: &'static str, params: &[&str]
    ) -> bool {
        self.warn_if_false(!condition, key, params)
    }

    pub fn warn_if_none<T>(
        &mut self, value: Option<T>, key: &'static str, params: &[&str]
    ) -> bool {
        self.warn_if_false(value.is_some(), key, params)
    }

    pub fn warn_if_some<T>(
        &mut self, value: Option<T>, key: &'static str, params: &[&str]
    ) -> bool {
        self.warn_if_false(value.is_none(), key, params)
    }

    pub fn reject_if_false(
        &mut self, condition: bool, key: &'static str, params: &[&str]
    ) -> bool {
        if condition {
            self.pass(key, params);
        }
        else {
            self.reject(key, params);
        }
        condition
    }

    pub fn reject_if_true(
        &mut self, condition: bool, key: &'static str, params: &[&str]
    ) -> bool {
        self.reject_if_false(!condition, key, params)
    }

    pub fn reject_if_none<T>(
        &mut self, value: Option<T>, key: &'static str, params: &[&str]
    ) -> bool {
        self.reject_if_false(value.is_some(), key, params)
    }

    pub fn reject_if_some<T>(
        &mut self, value: Option<T>, key: &'static str, params: &[&str]
    ) -> bool {
        self.reject_if_false(value.is_none(), key, params)
    }

    /// Records an error for a location other than the current one.
    ///
    /// The cursor stays where it is.
    pub fn reject_for_location(
        &mut self,
        location: impl Into<ValidationLocation>,
        key: &'static str,
        params: &[&str],
    ) -> &mut Self {
        self.record_for_location(
            location.into(), ValidationStatus::Error, key, params
        );
        self
    }

    /// Records a warning for a location other than the current one.
    ///
    /// The cursor stays where it is.
    pub fn warn_for_location(
        &mut self,
        location: impl Into<ValidationLocation>,
        key: &'static str,
        params: &[&str],
    ) -> &mut Self {
        self.record_for_location(
            location.into(), ValidationStatus::Warning, key, params
        );
        self
    }

    fn record_for_location(
        &mut self,
        location: ValidationLocation,
        status: ValidationStatus,
        key: &'static str,
        params: &[&str],
    ) {
        let idx = self.location_index(location);
        self.locations[idx].checks.push(
            ValidationCheck::new(status, key, params)
        )
    }

    /// Records a metric for the current location.
    pub fn add_metric(
        &mut self, name: impl Into<String>, value: impl Into<String>
    ) -> &mut Self {
        self.locations[self.current].metrics.push(ValidationMetric {
            name: name.into(),
            value: value.into(),
            measured_at: Time::now(),
        });
        self
    }

    /// Appends everything recorded in `other`.
    ///
    /// Checks and metrics of each location are added after those already
    /// present. The cursor is not moved.
    pub fn add_all(&mut self, other: &ValidationResult) -> &mut Self {
        for item in &other.locations {
            let idx = self.location_index(item.location.clone());
            let target = &mut self.locations[idx];
            target.checks.extend(item.checks.iter().cloned());
            target.metrics.extend(item.metrics.iter().cloned());
        }
        self
    }
}


/// # Querying
///
impl ValidationResult {
    /// Returns whether any check at any location failed.
    pub fn has_failures(&self) -> bool {
        self.locations.iter().any(|item| {
            item.with_status(ValidationStatus::Error).next().is_some()
        })
    }

    /// Returns whether there is a warning at any location.
    pub fn has_warnings(&self) -> bool {
        self.locations.iter().any(|item| {
            item.with_status(ValidationStatus::Warning).next().is_some()
        })
    }

    pub fn has_no_failures_or_warnings(&self) -> bool {
        !self.has_failures() && !self.has_warnings()
    }

    pub fn has_failure_for_location(
        &self, location: &ValidationLocation
    ) -> bool {
        !self.failures(location).is_empty()
    }

    pub fn has_failure_for_current_location(&self) -> bool {
        self.has_failure_for_location(self.current_location())
    }

    /// Returns the failed checks for a location.
    pub fn failures(
        &self, location: &ValidationLocation
    ) -> Vec<&ValidationCheck> {
        self.checks_with_status(location, ValidationStatus::Error)
    }

    pub fn failures_for_current_location(&self) -> Vec<&ValidationCheck> {
        self.failures(self.current_location())
    }

    /// Returns the failed checks of all locations.
    pub fn failures_for_all_locations(&self) -> Vec<&ValidationCheck> {
        self.locations.iter().flat_map(|item| {
            item.with_status(ValidationStatus::Error)
        }).collect()
    }

    /// Returns the warnings for a location.
    pub fn warnings(
        &self, location: &ValidationLocation
    ) -> Vec<&ValidationCheck> {
        self.checks_with_status(location, ValidationStatus::Warning)
    }

    /// Returns the warnings of all locations.
    pub fn all_warnings(&self) -> Vec<&ValidationCheck> {
        self.locations.iter().flat_map(|item| {
            item.with_status(ValidationStatus::Warning)
        }).collect()
    }

    /// Returns all checks recorded for a location in recording order.
    pub fn all_checks_for_location(
        &self, location: &ValidationLocation
    ) -> &[ValidationCheck] {
        match self.get(location) {
            Some(item) => &item.checks,
            None => &[]
        }
    }

    /// Returns the last check with the given key at a location.
    pub fn result(
        &self, location: &ValidationLocation, key: &str
    ) -> Option<&ValidationCheck> {
        self.all_checks_for_location(location).iter().rev().find(|check| {
            check.key == key
        })
    }

    pub fn result_for_current_location(
        &self, key: &str
    ) -> Option<&ValidationCheck> {
        self.result(self.current_location(), key)
    }

    /// Returns the metrics recorded for a location.
    pub fn metrics(
        &self, location: &ValidationLocation
    ) -> &[ValidationMetric] {
        match self.get(location) {
            Some(item) => &item.metrics,
            None => &[]
        }
    }

    fn get(&self, location: &ValidationLocation) -> Option<&LocationResult> {
        self.index.get(location).map(|idx| &self.locations[*idx])
    }

    fn checks_with_status(
        &self, location: &ValidationLocation, status: ValidationStatus
    ) -> Vec<&ValidationCheck> {
        match self.get(location) {
            Some(item) => item.with_status(status).collect(),
            None => Vec::new()
        }
    }
}


//--- Display

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for item in &self.locations {
            writeln!(f, "{}:", item.location)?;
            for check in &item.checks {
                writeln!(f, "  {}", check)?;
            }
        }
        Ok(())
    }
}


//--- Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for ValidationResult {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.locations)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn loc(name: &str) -> ValidationLocation {
        ValidationLocation::new(name)
    }

    #[test]
    fn cursor_and_buckets() {
        let mut result = ValidationResult::with_location("a");
        assert_eq!(result.current_location(), &loc("a"));
        result.set_location("b");
        result.set_location("a");
        assert_eq!(
            result.validated_locations().collect::<Vec<_>>(),
            [&loc("a"), &loc("b")]
        );
        assert!(!result.has_failures());
        assert!(result.has_no_failures_or_warnings());
        assert!(result.all_checks_for_location(&loc("b")).is_empty());
    }

    #[test]
    fn conditional_helpers_return_condition() {
        let mut result = ValidationResult::with_location("a");
        assert!(result.reject_if_false(true, "one", &[]));
        assert!(!result.reject_if_true(true, "two", &[]));
        assert!(result.reject_if_some(None::<u8>, "three", &[]));
        assert!(!result.reject_if_none(None::<u8>, "four", &[]));
        assert!(!result.warn_if_true(true, "five", &["x"]));
        assert!(result.warn_if_none(Some(1), "six", &[]));
        assert!(!result.warn_if_some(Some(1), "seven", &[]));

        let failures = result.failures(&loc("a"));
        assert_eq!(
            failures.iter().map(|c| c.key()).collect::<Vec<_>>(),
            ["two", "four"]
        );
        let warnings = result.warnings(&loc("a"));
        assert_eq!(
            warnings.iter().map(|c| c.key()).collect::<Vec<_>>(),
            ["five", "seven"]
        );
        assert_eq!(warnings[0].params(), ["x"]);
        assert!(result.has_failures());
        assert!(result.has_warnings());
        assert!(result.has_failure_for_current_location());
    }

    #[test]
    fn history_is_kept() {
        let mut result = ValidationResult::with_location("a");
        result.reject("key", &["1"]);
        result.pass("key", &["2"]);
        assert_eq!(result.all_checks_for_location(&loc("a")).len(), 2);
        let last = result.result(&loc("a"), "key").unwrap();
        assert_eq!(last.status(), ValidationStatus::Passed);
        assert_eq!(last.params(), ["2"]);
        assert!(result.has_failures());
        assert!(result.result(&loc("a"), "other").is_none());
        assert!(result.result(&loc("z"), "key").is_none());
    }

    #[test]
    fn other_location() {
        let mut result = ValidationResult::with_location("a");
        result.reject_for_location("crl", "crl.parsed", &[]);
        result.warn_for_location("crl", "crl.other", &[]);
        assert_eq!(result.current_location(), &loc("a"));
        assert!(!result.has_failure_for_current_location());
        assert!(result.has_failure_for_location(&loc("crl")));
        assert_eq!(result.failures_for_all_locations().len(), 1);
        assert_eq!(result.all_warnings().len(), 1);
    }

    #[test]
    fn add_all_appends() {
        let mut one = ValidationResult::with_location("a");
        one.pass("first", &[]);
        let mut two = ValidationResult::with_location("b");
        two.reject("second", &[]);
        two.set_location("a");
        two.pass("third", &[]).add_metric("objects", "3");

        one.add_all(&two);
        assert_eq!(one.current_location(), &loc("a"));
        assert_eq!(
            one.all_checks_for_location(&loc("a")).iter().map(|c| c.key())
                .collect::<Vec<_>>(),
            ["first", "third"]
        );
        assert!(one.has_failure_for_location(&loc("b")));
        assert_eq!(one.metrics(&loc("a"))[0].value(), "3");
        assert!(one.metrics(&loc("b")).is_empty());
    }

    #[test]
    fn structural_equality() {
        let make = || {
            let mut res = ValidationResult::with_location("a");
            res.reject("x", &["p"]).pass("y", &[]);
            res
        };
        assert_eq!(make(), make());
        let mut other = make();
        other.pass("z", &[]);
        assert_ne!(make(), other);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize() {
        let mut result = ValidationResult::with_location("a");
        result.reject("cert.signature", &["p"]);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            "[{\"location\":\"a\",\"checks\":[{\"status\":\"error\",\
             \"key\":\"cert.signature\",\"params\":[\"p\"]}],\
             \"metrics\":[]}]"
        );
    }
}
