//! Test-case lifecycle around one request log.
//!
//! A [`Suite`] records assertion outcomes against the shared [`RequestLog`]
//! and owns the teardown hook: when any assertion failed, the full captured
//! log is emitted for diagnosis, and the log is always cleared.

use serde::{Deserialize, Serialize};

use crate::expectation::{Expectation, exists};
use crate::log::{LogEntry, RequestLog};

/// Summary of assertions for a suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionsSummary {
    /// Number of passed assertions.
    pub passed: u32,
    /// Number of failed assertions.
    pub failed: u32,
}

/// Outcome of one named assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
}

/// What teardown did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeardownReport {
    /// Assertion counts at teardown time.
    pub assertions: AssertionsSummary,
    /// Entries emitted for diagnosis (empty when everything passed).
    pub dumped: Vec<LogEntry>,
    /// Number of entries removed from the log.
    pub cleared: usize,
}

/// Assertion bookkeeping bound to one request log.
#[derive(Debug)]
pub struct Suite {
    name: String,
    log: RequestLog,
    outcomes: Vec<TestOutcome>,
}

impl Suite {
    #[must_use]
    pub fn new(name: impl Into<String>, log: RequestLog) -> Self {
        Self {
            name: name.into(),
            log,
            outcomes: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn log(&self) -> &RequestLog {
        &self.log
    }

    /// Record an assertion outcome and return it.
    pub fn check(&mut self, name: impl Into<String>, passed: bool) -> bool {
        let name = name.into();
        if passed {
            tracing::debug!(suite = %self.name, test = %name, "assertion passed");
        } else {
            tracing::warn!(suite = %self.name, test = %name, "assertion failed");
        }
        self.outcomes.push(TestOutcome { name, passed });
        passed
    }

    /// Assert that some captured request satisfies `expected`.
    pub fn expect_sent(&mut self, name: impl Into<String>, expected: &Expectation) -> bool {
        let found = exists(expected, &self.log.snapshot());
        self.check(name, found)
    }

    /// Assert that no captured request satisfies `expected`.
    pub fn expect_not_sent(&mut self, name: impl Into<String>, expected: &Expectation) -> bool {
        let found = exists(expected, &self.log.snapshot());
        self.check(name, !found)
    }

    #[must_use]
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn summary(&self) -> AssertionsSummary {
        let passed = self.outcomes.iter().filter(|o| o.passed).count();
        let failed = self.outcomes.len() - passed;
        AssertionsSummary {
            passed: u32::try_from(passed).unwrap_or(u32::MAX),
            failed: u32::try_from(failed).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn any_failed(&self) -> bool {
        self.outcomes.iter().any(|o| !o.passed)
    }

    /// Dump the log if anything failed, then clear it and reset outcomes.
    ///
    /// The log is drained in one step, so every removed entry is also the
    /// one dumped: `cleared` always equals `dumped.len()` on failure.
    pub fn teardown(&mut self) -> TeardownReport {
        let assertions = self.summary();
        let failed = self.any_failed();
        let drained = self.log.drain();
        let cleared = drained.len();

        let dumped = if failed {
            tracing::error!(
                suite = %self.name,
                failed = assertions.failed,
                entries = cleared,
                "tests failed with following log"
            );
            for entry in &drained {
                match entry.to_json() {
                    Ok(line) => {
                        tracing::info!(suite = %self.name, entry = %line, "captured request");
                    }
                    Err(err) => {
                        tracing::warn!(suite = %self.name, error = %err, "unserializable captured request");
                    }
                }
            }
            drained
        } else {
            Vec::new()
        };

        tracing::info!(suite = %self.name, cleared, "cleaning log");
        self.outcomes.clear();

        TeardownReport {
            assertions,
            dumped,
            cleared,
        }
    }
}
