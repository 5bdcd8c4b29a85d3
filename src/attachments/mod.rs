//! Attachment bookkeeping
//!
//! [`reachable_file_names`] lists the files a set of runs still references;
//! [`remove_unattached_files`] deletes everything else from the bundles'
//! attachment directories.

mod gc;

pub use gc::{remove_unattached_files, UnattachedFileCollector};

use std::collections::HashSet;

use crate::run::Run;

/// File names referenced by the runs' attachments and linked logs.
///
/// Attachments are taken from [`Run::all_tests`]. Attachments without a
/// source contribute nothing.
pub fn reachable_file_names(runs: &[Run]) -> HashSet<String> {
    let mut names = HashSet::new();
    for run in runs {
        names.extend(run.all_attachments().iter().filter_map(|a| a.file_name()));
        if let Some(name) = run
            .log_content()
            .url()
            .and_then(|path| path.file_name())
        {
            names.insert(name.to_string_lossy().into_owned());
        }
    }
    names
}
