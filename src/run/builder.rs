//! Per-target summary construction
//!
//! Turning one testable target into a [`TestSummary`] is delegated through
//! [`SummaryBuilder`] so callers can plug in image processing or richer
//! attachment export. [`TreeSummaryBuilder`] copies the tree as stored.

use std::path::Path;

use xcreport_model::{ResultSource, Test, TestSummary, TestableSummary};

use crate::config::RenderingConfig;

/// Inputs for building one target's summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub testable: &'a TestableSummary,
    pub source: &'a dyn ResultSource,
    pub rendering: &'a RenderingConfig,
    /// Lift the children of a top-level `All tests` group
    pub remove_all_tests_group: bool,
}

/// Builds the summary of one testable target.
///
/// Called concurrently from the aggregator's worker threads.
pub trait SummaryBuilder: Send + Sync {
    fn build(&self, request: SummaryRequest<'_>) -> TestSummary;
}

/// Copies the stored test tree, anchoring relative attachment paths at the
/// bundle directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSummaryBuilder;

impl SummaryBuilder for TreeSummaryBuilder {
    fn build(&self, request: SummaryRequest<'_>) -> TestSummary {
        let root = request.source.location();
        let tests = request
            .testable
            .tests
            .iter()
            .map(|test| anchor_attachments(test.clone(), root))
            .collect();

        let summary = TestSummary::new(request.testable.test_name(), tests);
        if request.remove_all_tests_group {
            summary.without_all_tests_group()
        } else {
            summary
        }
    }
}

fn anchor_attachments(mut test: Test, root: &Path) -> Test {
    for attachment in &mut test.attachments {
        if let Some(source) = attachment.source.take() {
            attachment.source = Some(if source.is_relative() {
                root.join(source)
            } else {
                source
            });
        }
    }
    test.sub_tests = test
        .sub_tests
        .into_iter()
        .map(|sub_test| anchor_attachments(sub_test, root))
        .collect();
    test
}
