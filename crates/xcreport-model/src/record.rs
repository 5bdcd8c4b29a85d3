//! Raw records as read from a result bundle.

use serde::{Deserialize, Serialize};

use crate::test::Test;

/// Identifier of an object stored inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Device or simulator a test action ran on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub identifier: String,
    pub operating_system_version: String,
    pub model_name: String,
}

/// One test execution attempt within a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Display title, used for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub run_destination: DeviceRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_ref: Option<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_ref: Option<Reference>,
}

impl ActionRecord {
    /// Title for log messages; empty when the action has none.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Results of one testable target, before summarizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestableSummary {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    #[serde(default)]
    pub tests: Vec<Test>,
}

impl TestableSummary {
    /// Name used to order summaries: the target name, else the testable name.
    pub fn test_name(&self) -> &str {
        self.target_name.as_deref().unwrap_or(&self.name)
    }
}

/// Results of one test plan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlanRunSummary {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub testable_summaries: Vec<TestableSummary>,
}

/// Every test plan configuration a test reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestPlanRunSummaries {
    #[serde(default)]
    pub summaries: Vec<TestPlanRunSummary>,
}

impl TestPlanRunSummaries {
    /// Testable summaries across all configurations, in order.
    pub fn testable_summaries(&self) -> impl Iterator<Item = &TestableSummary> {
        self.summaries.iter().flat_map(|s| s.testable_summaries.iter())
    }
}
