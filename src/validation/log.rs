//! The validation log.
//!
//! Validation doesn’t stop at the first problem. Instead, each check is
//! recorded in a [`ValidationLog`] together with the location of the
//! object it was performed on, so that a caller gets the complete picture
//! for an object in a single pass.
//!
//! Every record is also passed on to the `log` crate: passed checks at
//! debug level, failures at info level, and warnings at warn level.

use std::fmt;
use log::{debug, info, warn};


//------------ CheckStatus ---------------------------------------------------

/// The outcome of a single check.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum CheckStatus {
    Passed,
    Failed,
    Warned,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Failed => "failed",
            CheckStatus::Warned => "warned",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ CheckRecord ---------------------------------------------------

/// The record of a single check performed on an object.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CheckRecord {
    location: String,
    check: String,
    status: CheckStatus,
    params: Vec<String>,
}

impl CheckRecord {
    /// Returns the location of the object the check was performed on.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the identifier of the check.
    pub fn check(&self) -> &str {
        &self.check
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    /// Returns additional information about the outcome.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }

    pub fn is_warned(&self) -> bool {
        self.status == CheckStatus::Warned
    }
}

impl fmt::Display for CheckRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} {}", self.location, self.check, self.status)?;
        if !self.params.is_empty() {
            write!(f, " ({})", self.params.join(", "))?;
        }
        Ok(())
    }
}


//------------ ValidationLog -------------------------------------------------

/// The results of all checks performed during one validation run.
///
/// The log keeps a current location. Objects push their location before
/// their checks are performed and all records are filed under the current
/// location. Locations are never popped while an object is being validated,
/// but [`set_location`][Self::set_location] allows returning to an object
/// seen earlier.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ValidationLog {
    /// The stack of locations. The last one is the current location.
    locations: Vec<String>,

    /// All locations ever pushed, in the order they were first seen.
    seen: Vec<String>,

    /// The records in the order they were made.
    records: Vec<CheckRecord>,
}

impl ValidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new log starting at the given location.
    pub fn with_location(location: impl Into<String>) -> Self {
        let mut res = Self::new();
        res.push(location);
        res
    }

    /// Makes `location` the current location.
    pub fn push(&mut self, location: impl Into<String>) {
        let location = location.into();
        if !self.seen.contains(&location) {
            self.seen.push(location.clone());
        }
        self.locations.push(location);
    }

    /// Returns to a location that has been pushed before.
    ///
    /// The location replaces the current location, so the stack doesn’t
    /// grow when switching back and forth. Returns whether the location
    /// was known. If it wasn’t, the current location stays unchanged.
    pub fn set_location(&mut self, location: &str) -> bool {
        if !self.seen.iter().any(|item| item == location) {
            return false
        }
        match self.locations.last_mut() {
            Some(last) => *last = location.into(),
            None => self.locations.push(location.into()),
        }
        true
    }

    /// Returns the current location.
    ///
    /// This is an empty string if no location has been pushed yet.
    pub fn current_location(&self) -> &str {
        self.locations.last().map(String::as_str).unwrap_or("")
    }

    /// Returns an iterator over all locations that have been pushed.
    pub fn validated_locations(&self) -> impl Iterator<Item = &str> + '_ {
        self.seen.iter().map(String::as_str)
    }
}

/// # Recording Checks
///
impl ValidationLog {
    /// Records a check with the given status.
    pub fn record(
        &mut self, check: &str, status: CheckStatus, params: Vec<String>
    ) {
        let record = CheckRecord {
            location: self.current_location().into(),
            check: check.into(),
            status,
            params,
        };
        match status {
            CheckStatus::Passed => debug!("{}", record),
            CheckStatus::Failed => info!("{}", record),
            CheckStatus::Warned => warn!("{}", record),
        }
        self.records.push(record);
    }

    /// Records a passed check.
    pub fn pass(&mut self, check: &str) {
        self.record(check, CheckStatus::Passed, Vec::new())
    }

    /// Records a failed check.
    pub fn fail(&mut self, check: &str, params: Vec<String>) {
        self.record(check, CheckStatus::Failed, params)
    }

    /// Records a warning.
    pub fn warn(&mut self, check: &str, params: Vec<String>) {
        self.record(check, CheckStatus::Warned, params)
    }

    /// Records a check that passes if `condition` is true.
    ///
    /// Returns `condition`.
    pub fn check(&mut self, condition: bool, check: &str) -> bool {
        self.check_with(condition, check, Vec::new)
    }

    /// Records a check that passes if `condition` is true.
    ///
    /// The params are only created if the check fails.
    pub fn check_with(
        &mut self,
        condition: bool,
        check: &str,
        params: impl FnOnce() -> Vec<String>,
    ) -> bool {
        if condition {
            self.pass(check)
        }
        else {
            self.fail(check, params())
        }
        condition
    }

    /// Records the outcome of an operation that may fail.
    ///
    /// A failed check carries the error’s message as its only param.
    /// Returns the success value if there was one.
    pub fn check_result<T, E: fmt::Display>(
        &mut self, res: Result<T, E>, check: &str
    ) -> Option<T> {
        match res {
            Ok(some) => {
                self.pass(check);
                Some(some)
            }
            Err(err) => {
                self.fail(check, vec![err.to_string()]);
                None
            }
        }
    }
}

/// # Inspecting Results
///
impl ValidationLog {
    /// Returns whether any check has failed.
    pub fn has_failures(&self) -> bool {
        self.records.iter().any(CheckRecord::is_failed)
    }

    /// Returns whether there are any warnings.
    pub fn has_warnings(&self) -> bool {
        self.records.iter().any(CheckRecord::is_warned)
    }

    /// Returns all records in the order they were made.
    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckRecord> + '_ {
        self.records.iter().filter(|item| item.is_failed())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckRecord> + '_ {
        self.records.iter().filter(|item| item.is_warned())
    }

    /// Returns all records for the given location.
    pub fn records_for<'a>(
        &'a self, location: &'a str
    ) -> impl Iterator<Item = &'a CheckRecord> + 'a {
        self.records.iter().filter(move |item| item.location == location)
    }

    /// Returns the record of a check at a location if it was performed.
    pub fn get(&self, location: &str, check: &str) -> Option<&CheckRecord> {
        self.records.iter().find(|item| {
            item.location == location && item.check == check
        })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn records_and_locations() {
        let mut log = ValidationLog::with_location("rsync://a/obj.sig");
        assert!(log.check(true, "one"));
        assert!(!log.check_with(false, "two", || vec!["why".into()]));
        log.push("<cms-cert>");
        log.warn("three", vec!["AS1".into()]);
        assert_eq!(
            log.check_result(Err::<(), _>("bad"), "four"), None
        );

        assert!(log.has_failures());
        assert!(log.has_warnings());
        assert_eq!(log.records().len(), 4);
        assert_eq!(log.failures().count(), 2);
        assert_eq!(log.warnings().count(), 1);
        assert_eq!(log.records_for("rsync://a/obj.sig").count(), 2);

        let two = log.get("rsync://a/obj.sig", "two").unwrap();
        assert!(two.is_failed());
        assert_eq!(two.params(), ["why"]);
        assert_eq!(
            log.get("<cms-cert>", "four").unwrap().params(), ["bad"]
        );
        assert!(log.get("<cms-cert>", "one").is_none());
        assert_eq!(
            log.get("<cms-cert>", "three").unwrap().to_string(),
            "<cms-cert>: three warned (AS1)"
        );

        assert!(log.set_location("rsync://a/obj.sig"));
        assert!(!log.set_location("rsync://b/"));
        assert_eq!(log.current_location(), "rsync://a/obj.sig");
        assert_eq!(
            log.validated_locations().collect::<Vec<_>>(),
            ["rsync://a/obj.sig", "<cms-cert>"]
        );
    }

    #[test]
    fn switch_locations() {
        let mut log = ValidationLog::with_location("a");
        log.push("b");
        for _ in 0..10 {
            assert!(log.set_location("a"));
            assert!(log.set_location("b"));
        }
        assert_eq!(log.locations.len(), 2);
        assert_eq!(log.current_location(), "b");

        assert!(log.set_location("a"));
        log.pass("check");
        assert_eq!(log.get("a", "check").unwrap().location(), "a");
        assert_eq!(log.locations, ["a", "a"]);
        assert_eq!(log.validated_locations().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn empty_log() {
        let log = ValidationLog::new();
        assert!(!log.has_failures());
        assert!(!log.has_warnings());
        assert_eq!(log.current_location(), "");
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_records() {
        let mut log = ValidationLog::with_location("x");
        log.fail("check", vec!["param".into()]);
        let json = serde_json::to_string(&log.records()[0]).unwrap();
        assert_eq!(
            json,
            r#"{"location":"x","check":"check","status":"failed","params":["param"]}"#
        );
        let back: CheckRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, &log.records()[0]);
    }
}
