//! xcreport test result model
//!
//! Shared types for test results read out of result bundles: statuses, test
//! trees, attachments, action records, and the [`ResultSource`] seam through
//! which bundle contents are resolved.

pub mod content;
pub mod record;
pub mod source;
pub mod status;
pub mod summary;

pub use content::{RenderingContent, RenderingMode};
pub use record::{
    ActionRecord, DeviceRecord, Reference, TestPlanRunSummaries, TestPlanRunSummary,
    TestableSummary,
};
pub use source::ResultSource;
pub use status::Status;
pub use summary::{TestSummary, ALL_TESTS_GROUP};
pub use test::{Attachment, Test};
