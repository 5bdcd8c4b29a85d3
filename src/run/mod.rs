//! Run aggregation
//!
//! A [`Run`] is one row of the report: the test summaries of a single
//! action, or of several actions folded together as a grouped run. Per-target
//! summaries are built in parallel and sorted by name once every build has
//! finished, so the result does not depend on completion order.
//!
//! Unresolvable references never fail the caller: they are logged as
//! warnings and the affected source contributes nothing.

pub mod builder;
mod pool;
mod report;

pub use builder::{SummaryBuilder, SummaryRequest, TreeSummaryBuilder};
pub use pool::default_worker_count;
pub use report::{
    RunReport, SummaryReport, PLACEHOLDER_DEVICE_IDENTIFIER, PLACEHOLDER_LOG_SOURCE,
    PLACEHOLDER_N_OF_FAILED_TESTS, PLACEHOLDER_N_OF_MIXED_TESTS, PLACEHOLDER_N_OF_PASSED_TESTS,
    PLACEHOLDER_N_OF_SKIPPED_TESTS, PLACEHOLDER_N_OF_TESTS,
};

use std::fmt;
use std::sync::Arc;

use xcreport_model::{
    ActionRecord, Attachment, RenderingContent, ResultSource, Status, Test, TestPlanRunSummaries,
    TestSummary,
};

use crate::config::{RenderingConfig, ReportConfig};
use crate::device::TargetDevice;
use crate::log::Logger;
use pool::{build_summaries, SummaryJob};

/// A bundle paired with one of its actions.
pub type SourceAction = (Arc<dyn ResultSource>, ActionRecord);

/// The aggregate of one report row.
#[derive(Debug, Clone)]
pub struct Run {
    files: Vec<Arc<dyn ResultSource>>,
    run_destination: TargetDevice,
    test_summaries: Vec<TestSummary>,
    log_content: RenderingContent,
}

impl Run {
    /// Bundles that contributed to this run, in input order.
    pub fn files(&self) -> &[Arc<dyn ResultSource>] {
        &self.files
    }

    pub fn run_destination(&self) -> &TargetDevice {
        &self.run_destination
    }

    /// Summaries sorted by test name.
    pub fn test_summaries(&self) -> &[TestSummary] {
        &self.test_summaries
    }

    pub fn log_content(&self) -> &RenderingContent {
        &self.log_content
    }

    /// Failure if any summary failed, else skipped if any was skipped, else
    /// success.
    pub fn status(&self) -> Status {
        Status::rollup(self.test_summaries.iter().map(TestSummary::status))
    }

    /// Top-level tests with every composite replaced by its leaf descendants.
    pub fn all_tests(&self) -> Vec<&Test> {
        self.test_summaries
            .iter()
            .flat_map(|summary| summary.tests.iter())
            .flat_map(|test| {
                let leaves = test.descendant_sub_tests();
                if leaves.is_empty() {
                    vec![test]
                } else {
                    leaves
                }
            })
            .collect()
    }

    /// Every counter from a single walk of [`Run::all_tests`].
    pub fn test_counts(&self) -> TestCounts {
        let mut counts = TestCounts::default();
        for test in self.all_tests() {
            counts.total += 1;
            match test.status {
                Status::Success => counts.passed += 1,
                Status::Skipped => counts.skipped += 1,
                Status::Failure => counts.failed += 1,
                Status::Mixed => counts.mixed += 1,
            }
        }
        counts
    }

    pub fn number_of_tests(&self) -> usize {
        self.test_counts().total
    }

    pub fn number_of_passed_tests(&self) -> usize {
        self.test_counts().passed
    }

    pub fn number_of_skipped_tests(&self) -> usize {
        self.test_counts().skipped
    }

    pub fn number_of_failed_tests(&self) -> usize {
        self.test_counts().failed
    }

    pub fn number_of_mixed_tests(&self) -> usize {
        self.test_counts().mixed
    }

    /// Attachments of every test in [`Run::all_tests`].
    pub fn all_attachments(&self) -> Vec<&Attachment> {
        self.all_tests()
            .into_iter()
            .flat_map(|test| test.all_attachments())
            .collect()
    }

    pub fn screenshot_attachments(&self) -> Vec<&Attachment> {
        self.all_attachments()
            .into_iter()
            .filter(|a| a.is_screenshot)
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        files: Vec<Arc<dyn ResultSource>>,
        run_destination: TargetDevice,
        mut test_summaries: Vec<TestSummary>,
        log_content: RenderingContent,
    ) -> Self {
        test_summaries.sort_by(|a, b| a.test_name.cmp(&b.test_name));
        Self {
            files,
            run_destination,
            test_summaries,
            log_content,
        }
    }
}

/// Per-status test counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    pub total: usize,
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub mixed: usize,
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.test_counts();
        write!(
            f,
            "{} {} ({}): {} tests, {} passed, {} skipped, {} failed, {} mixed [{}]",
            self.run_destination.model(),
            self.run_destination.os_version(),
            self.run_destination.unique_identifier(),
            counts.total,
            counts.passed,
            counts.skipped,
            counts.failed,
            counts.mixed,
            self.status(),
        )
    }
}

/// Builds [`Run`]s from bundles.
pub struct Aggregator<'a> {
    rendering: RenderingConfig,
    logger: &'a dyn Logger,
    builder: &'a dyn SummaryBuilder,
    workers: usize,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator with the tree-copying summary builder and the
    /// default pool size.
    pub fn new(rendering: RenderingConfig, logger: &'a dyn Logger) -> Self {
        Self {
            rendering,
            logger,
            builder: &TreeSummaryBuilder,
            workers: default_worker_count(),
        }
    }

    /// Create an aggregator from a loaded configuration.
    pub fn from_config(config: &ReportConfig, logger: &'a dyn Logger) -> Self {
        let aggregator = Self::new(config.rendering.clone(), logger);
        match config.worker_threads {
            Some(workers) => aggregator.with_workers(workers),
            None => aggregator,
        }
    }

    /// Use a different per-target summary builder.
    pub fn with_summary_builder(mut self, builder: &'a dyn SummaryBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Cap the number of summary-building threads (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Build the run of a single action.
    ///
    /// Returns `None` when the action's test reference or its test plan
    /// summaries cannot be resolved.
    pub fn single(&self, file: Arc<dyn ResultSource>, action: &ActionRecord) -> Option<Run> {
        let Some(plans) = resolve_test_plans(file.as_ref(), action) else {
            self.warn_missing_tests(action);
            return None;
        };

        let run_destination = TargetDevice::identified(&action.run_destination, self.logger);

        let log_content = match &action.log_ref {
            Some(log_ref) => file.export_log_content(&log_ref.id, self.rendering.rendering_mode),
            None => {
                self.logger.warning(&format!(
                    "Can't find log reference for action {}",
                    action.display_title()
                ));
                RenderingContent::None
            }
        };

        let jobs = schedule(&file, &plans, false);
        let test_summaries = build_summaries(&jobs, self.workers, self.builder, &self.rendering);

        Some(Run {
            files: vec![file],
            run_destination,
            test_summaries,
            log_content,
        })
    }

    /// Build one run from several actions representing the same logical run.
    ///
    /// The device is taken from the first action and anonymized. Actions
    /// whose tests cannot be resolved are skipped. Logs are not merged, so a
    /// grouped run never has log content. Returns `None` for an empty list.
    pub fn grouped(&self, file_with_actions: &[SourceAction]) -> Option<Run> {
        let Some((_, first_action)) = file_with_actions.first() else {
            self.logger.warning("Grouped actions list is empty");
            return None;
        };

        let run_destination = TargetDevice::anonymized(&first_action.run_destination, self.logger);

        let mut jobs = Vec::new();
        for (file, action) in file_with_actions {
            match resolve_test_plans(file.as_ref(), action) {
                Some(plans) => jobs.extend(schedule(file, &plans, true)),
                None => self.warn_missing_tests(action),
            }
        }

        let test_summaries = build_summaries(&jobs, self.workers, self.builder, &self.rendering);

        Some(Run {
            files: file_with_actions.iter().map(|(file, _)| Arc::clone(file)).collect(),
            run_destination,
            test_summaries,
            log_content: RenderingContent::None,
        })
    }

    fn warn_missing_tests(&self, action: &ActionRecord) {
        self.logger.warning(&format!(
            "Can't find test reference for action {}",
            action.display_title()
        ));
    }
}

fn resolve_test_plans(file: &dyn ResultSource, action: &ActionRecord) -> Option<TestPlanRunSummaries> {
    let tests_ref = action.tests_ref.as_ref()?;
    file.test_plan_run_summaries(&tests_ref.id)
}

fn schedule(
    file: &Arc<dyn ResultSource>,
    plans: &TestPlanRunSummaries,
    remove_all_tests_group: bool,
) -> Vec<SummaryJob> {
    plans
        .testable_summaries()
        .map(|testable| SummaryJob {
            source: Arc::clone(file),
            testable: testable.clone(),
            remove_all_tests_group,
        })
        .collect()
}
