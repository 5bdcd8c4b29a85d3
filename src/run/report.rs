//! Display values for a run
//!
//! Everything a renderer substitutes into the run template, as strings, plus
//! a serializable view used for JSON output.

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::Engine;
use serde::Serialize;
use xcreport_model::{RenderingContent, Status};

use super::Run;
use crate::device::TargetDevice;

pub const PLACEHOLDER_DEVICE_IDENTIFIER: &str = "DEVICE_IDENTIFIER";
pub const PLACEHOLDER_LOG_SOURCE: &str = "LOG_SOURCE";
pub const PLACEHOLDER_N_OF_TESTS: &str = "N_OF_TESTS";
pub const PLACEHOLDER_N_OF_PASSED_TESTS: &str = "N_OF_PASSED_TESTS";
pub const PLACEHOLDER_N_OF_SKIPPED_TESTS: &str = "N_OF_SKIPPED_TESTS";
pub const PLACEHOLDER_N_OF_FAILED_TESTS: &str = "N_OF_FAILED_TESTS";
pub const PLACEHOLDER_N_OF_MIXED_TESTS: &str = "N_OF_MIXED_TESTS";

impl Run {
    /// Where the log can be loaded from: the file path, or a base64 data URI
    /// for inline content.
    pub fn log_source(&self) -> Option<String> {
        match self.log_content() {
            RenderingContent::Url(path) => Some(path.display().to_string()),
            RenderingContent::Data(data) => Some(format!(
                "data:text/plain;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(data)
            )),
            RenderingContent::None => None,
        }
    }

    /// Template values keyed by placeholder name.
    pub fn placeholder_values(&self) -> BTreeMap<&'static str, String> {
        let counts = self.test_counts();
        BTreeMap::from([
            (
                PLACEHOLDER_DEVICE_IDENTIFIER,
                self.run_destination().unique_identifier().to_string(),
            ),
            (PLACEHOLDER_LOG_SOURCE, self.log_source().unwrap_or_default()),
            (PLACEHOLDER_N_OF_TESTS, counts.total.to_string()),
            (PLACEHOLDER_N_OF_PASSED_TESTS, counts.passed.to_string()),
            (PLACEHOLDER_N_OF_SKIPPED_TESTS, counts.skipped.to_string()),
            (PLACEHOLDER_N_OF_FAILED_TESTS, counts.failed.to_string()),
            (PLACEHOLDER_N_OF_MIXED_TESTS, counts.mixed.to_string()),
        ])
    }

    /// Serializable snapshot of this run.
    pub fn report(&self) -> RunReport {
        let counts = self.test_counts();
        RunReport {
            device: self.run_destination().clone(),
            status: self.status(),
            bundles: self.files().iter().map(|f| f.location().to_path_buf()).collect(),
            log_source: self.log_source(),
            tests: counts.total,
            passed: counts.passed,
            skipped: counts.skipped,
            failed: counts.failed,
            mixed: counts.mixed,
            summaries: self
                .test_summaries()
                .iter()
                .map(|summary| SummaryReport {
                    test_name: summary.test_name.clone(),
                    status: summary.status(),
                })
                .collect(),
        }
    }
}

/// JSON view of a [`Run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub device: TargetDevice,
    pub status: Status,
    pub bundles: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_source: Option<String>,
    pub tests: usize,
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub mixed: usize,
    pub summaries: Vec<SummaryReport>,
}

/// JSON view of one test summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub test_name: String,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;
    use crate::mock::{device_record, MockResultSource};
    use std::sync::Arc;
    use xcreport_model::{Test, TestSummary};

    fn run_with_log(log_content: RenderingContent) -> Run {
        let logger = MemoryLogger::new();
        let source: Arc<dyn xcreport_model::ResultSource> = Arc::new(MockResultSource::new("/A"));
        Run::from_parts(
            vec![source],
            TargetDevice::anonymized(&device_record("UDID-1"), &logger),
            vec![
                TestSummary::new(
                    "UITests",
                    vec![Test::group(
                        "Suite",
                        vec![
                            Test::leaf("a", Status::Success),
                            Test::leaf("b", Status::Failure),
                        ],
                    )],
                ),
                TestSummary::new("AppTests", vec![Test::leaf("c", Status::Skipped)]),
            ],
            log_content,
        )
    }

    #[test]
    fn test_placeholders_for_linked_log() {
        let run = run_with_log(RenderingContent::Url(PathBuf::from("logs/out.log")));
        let values = run.placeholder_values();

        assert_eq!(values[PLACEHOLDER_DEVICE_IDENTIFIER], "Any");
        assert_eq!(values[PLACEHOLDER_LOG_SOURCE], "logs/out.log");
        assert_eq!(values[PLACEHOLDER_N_OF_TESTS], "3");
        assert_eq!(values[PLACEHOLDER_N_OF_PASSED_TESTS], "1");
        assert_eq!(values[PLACEHOLDER_N_OF_SKIPPED_TESTS], "1");
        assert_eq!(values[PLACEHOLDER_N_OF_FAILED_TESTS], "1");
        assert_eq!(values[PLACEHOLDER_N_OF_MIXED_TESTS], "0");
    }

    #[test]
    fn test_inline_log_is_data_uri() {
        let run = run_with_log(RenderingContent::Data(b"hello".to_vec()));
        assert_eq!(
            run.log_source().as_deref(),
            Some("data:text/plain;base64,aGVsbG8=")
        );
    }

    #[test]
    fn test_missing_log_renders_empty() {
        let run = run_with_log(RenderingContent::None);
        assert_eq!(run.log_source(), None);
        assert_eq!(run.placeholder_values()[PLACEHOLDER_LOG_SOURCE], "");
    }

    #[test]
    fn test_report_json() {
        let run = run_with_log(RenderingContent::None);
        let json = serde_json::to_value(run.report()).unwrap();

        assert_eq!(json["status"], "failure");
        assert_eq!(json["tests"], 3);
        assert_eq!(json["device"]["unique_identifier"], "Any");
        assert_eq!(json["bundles"][0], "/A");
        assert!(json.get("log_source").is_none());
        assert_eq!(json["summaries"][0]["test_name"], "AppTests");
        assert_eq!(json["summaries"][0]["status"], "skipped");
        assert_eq!(json["summaries"][1]["status"], "failure");
    }
}
