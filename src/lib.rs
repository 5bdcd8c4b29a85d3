//! xcreport - test result report aggregation
//!
//! Merges one or more test result bundles into report [`Run`]s and reclaims
//! the storage of attachments no run references.
//!
//! - [`run::Aggregator`] builds a run from one action, or folds several
//!   actions into one grouped run
//! - [`attachments::remove_unattached_files`] deletes files in the bundles'
//!   attachment directories that the runs no longer reference

pub mod attachments;
pub mod config;
pub mod device;
pub mod log;
pub mod mock;
pub mod run;
pub mod source;

pub use attachments::{reachable_file_names, remove_unattached_files, UnattachedFileCollector};
pub use config::{CollectorConfig, ConfigError, RenderingConfig, ReportConfig};
pub use device::{TargetDevice, ANONYMOUS_DEVICE_ID};
pub use log::{LogLevel, Logger, MemoryLogger, TracingLogger};
pub use run::{Aggregator, Run, RunReport, SourceAction, SummaryBuilder, TestCounts, TreeSummaryBuilder};
pub use source::{discover_bundles, BundleError, JsonBundle};

pub use xcreport_model as model;
