//! The seam through which bundle contents are resolved.

use std::fmt;
use std::path::Path;

use crate::content::{RenderingContent, RenderingMode};
use crate::record::TestPlanRunSummaries;

/// A readable result bundle.
///
/// Handles are shared read-only between worker threads while summaries are
/// built, so implementations must tolerate concurrent reads.
pub trait ResultSource: fmt::Debug + Send + Sync {
    /// Bundle directory on disk.
    fn location(&self) -> &Path;

    /// Test plan summaries behind a test reference.
    fn test_plan_run_summaries(&self, id: &str) -> Option<TestPlanRunSummaries>;

    /// Log content behind a log reference.
    fn export_log_content(&self, id: &str, mode: RenderingMode) -> RenderingContent;
}
