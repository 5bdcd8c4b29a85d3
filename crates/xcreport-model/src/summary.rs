//! Per-target test summaries.

use serde::{Deserialize, Serialize};

use crate::status::Status;
use crate::test::Test;

/// Name of the synthetic top-level group wrapping every test of a target.
pub const ALL_TESTS_GROUP: &str = "All tests";

/// Test results for one testable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub test_name: String,
    pub tests: Vec<Test>,
}

impl TestSummary {
    pub fn new(test_name: impl Into<String>, tests: Vec<Test>) -> Self {
        Self {
            test_name: test_name.into(),
            tests,
        }
    }

    /// Rolled-up status of the top-level tests.
    pub fn status(&self) -> Status {
        Status::rollup(self.tests.iter().map(|t| t.status))
    }

    /// Replace a top-level `All tests` group with its children.
    pub fn without_all_tests_group(mut self) -> Self {
        let tests = std::mem::take(&mut self.tests);
        self.tests = tests
            .into_iter()
            .flat_map(|test| {
                if test.name == ALL_TESTS_GROUP && !test.sub_tests.is_empty() {
                    test.sub_tests
                } else {
                    vec![test]
                }
            })
            .collect();
        self
    }
}
