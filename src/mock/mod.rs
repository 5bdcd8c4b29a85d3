//! In-memory test doubles
//!
//! - [`MockResultSource`]: a bundle whose test plans and logs are registered
//!   up front; log exports are recorded for assertions
//! - [`DelayedSummaryBuilder`]: wraps a builder and sleeps per target, to
//!   shuffle the completion order of parallel builds
//!
//! Plus small constructors for action records and testables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use xcreport_model::{
    ActionRecord, DeviceRecord, Reference, RenderingContent, RenderingMode, ResultSource, Test,
    TestPlanRunSummaries, TestPlanRunSummary, TestSummary, TestableSummary,
};

use crate::run::{SummaryBuilder, SummaryRequest};

/// A result bundle held in memory.
#[derive(Debug, Clone)]
pub struct MockResultSource {
    location: PathBuf,
    test_plans: HashMap<String, TestPlanRunSummaries>,
    logs: HashMap<String, RenderingContent>,
    log_requests: Arc<Mutex<Vec<(String, RenderingMode)>>>,
}

impl MockResultSource {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            test_plans: HashMap::new(),
            logs: HashMap::new(),
            log_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a single test plan configuration under a test reference.
    pub fn with_tests(self, id: impl Into<String>, testables: Vec<TestableSummary>) -> Self {
        self.with_test_plans(
            id,
            TestPlanRunSummaries {
                summaries: vec![TestPlanRunSummary {
                    name: "Test Scheme Action".to_string(),
                    testable_summaries: testables,
                }],
            },
        )
    }

    /// Register arbitrary test plans under a test reference.
    pub fn with_test_plans(mut self, id: impl Into<String>, plans: TestPlanRunSummaries) -> Self {
        self.test_plans.insert(id.into(), plans);
        self
    }

    /// Register log content under a log reference.
    pub fn with_log(mut self, id: impl Into<String>, content: RenderingContent) -> Self {
        self.logs.insert(id.into(), content);
        self
    }

    /// A shareable handle; clones share the recorded log requests.
    pub fn shared(&self) -> Arc<dyn ResultSource> {
        Arc::new(self.clone())
    }

    /// Every log export requested so far.
    pub fn log_requests(&self) -> Vec<(String, RenderingMode)> {
        self.log_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultSource for MockResultSource {
    fn location(&self) -> &Path {
        &self.location
    }

    fn test_plan_run_summaries(&self, id: &str) -> Option<TestPlanRunSummaries> {
        self.test_plans.get(id).cloned()
    }

    fn export_log_content(&self, id: &str, mode: RenderingMode) -> RenderingContent {
        self.log_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id.to_string(), mode));
        self.logs.get(id).cloned().unwrap_or_default()
    }
}

/// Sleeps before delegating, keyed by the testable's raw name.
pub struct DelayedSummaryBuilder<B> {
    inner: B,
    delays: HashMap<String, Duration>,
}

impl<B: SummaryBuilder> DelayedSummaryBuilder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            delays: HashMap::new(),
        }
    }

    pub fn with_delay(mut self, testable_name: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(testable_name.into(), delay);
        self
    }
}

impl<B: SummaryBuilder> SummaryBuilder for DelayedSummaryBuilder<B> {
    fn build(&self, request: SummaryRequest<'_>) -> TestSummary {
        if let Some(delay) = self.delays.get(&request.testable.name) {
            thread::sleep(*delay);
        }
        self.inner.build(request)
    }
}

/// An iPhone 15 on iOS 17.2 with the given identifier.
pub fn device_record(identifier: &str) -> DeviceRecord {
    DeviceRecord {
        identifier: identifier.to_string(),
        operating_system_version: "17.2".to_string(),
        model_name: "iPhone 15".to_string(),
    }
}

/// An action on [`device_record`] with optional test and log references.
pub fn action(
    title: &str,
    device_identifier: &str,
    tests_ref: Option<&str>,
    log_ref: Option<&str>,
) -> ActionRecord {
    ActionRecord {
        title: Some(title.to_string()),
        run_destination: device_record(device_identifier),
        tests_ref: tests_ref.map(Reference::new),
        log_ref: log_ref.map(Reference::new),
    }
}

/// A testable whose name and target name are both `name`.
pub fn testable(name: &str, tests: Vec<Test>) -> TestableSummary {
    TestableSummary {
        name: name.to_string(),
        target_name: Some(name.to_string()),
        tests,
    }
}
