//! Removal of unattached files
//!
//! Scans each bundle directory and its data directory (one level each, no
//! recursion), then deletes every regular file that no run references and
//! that is not on the allow-list.
//!
//! - Directories are never deleted
//! - All listings finish before the first deletion
//! - The first filesystem error ends the pass; files already deleted stay
//!   deleted and are counted
//! - Two passes over the same bundles must not run concurrently

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::reachable_file_names;
use crate::config::CollectorConfig;
use crate::log::Logger;
use crate::run::Run;

/// Failures that end a collection pass.
#[derive(Debug, thiserror::Error)]
enum CollectError {
    #[error("cannot list {path}: {source}")]
    List { path: PathBuf, source: io::Error },

    #[error("cannot remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Deletes files under the runs' bundles that nothing references.
pub struct UnattachedFileCollector<'a> {
    config: CollectorConfig,
    logger: &'a dyn Logger,
    remove: fn(&Path) -> io::Result<()>,
}

impl<'a> UnattachedFileCollector<'a> {
    pub fn new(config: CollectorConfig, logger: &'a dyn Logger) -> Self {
        Self {
            config,
            logger,
            remove: |path| fs::remove_file(path),
        }
    }

    #[cfg(test)]
    fn with_remover(mut self, remove: fn(&Path) -> io::Result<()>) -> Self {
        self.remove = remove;
        self
    }

    /// Run one pass and return how many files were removed.
    ///
    /// In dry-run mode nothing is removed and the return value is the number
    /// of files that would have been. Errors are logged, never returned.
    pub fn run(&self, runs: &[Run]) -> usize {
        let reachable = reachable_file_names(runs);
        let mut removed = 0;

        if let Err(e) = self.remove_candidates(runs, &reachable, &mut removed) {
            self.logger.error(&format!("Error while removing files {}", e));
        }

        removed
    }

    fn remove_candidates(
        &self,
        runs: &[Run],
        reachable: &HashSet<String>,
        removed: &mut usize,
    ) -> Result<(), CollectError> {
        for path in self.candidate_paths(runs)? {
            if !self.should_be_deleted(&path, reachable) {
                continue;
            }

            if self.config.dry_run {
                self.logger.substep(&format!("Would remove {}", path.display()));
            } else {
                (self.remove)(&path).map_err(|source| CollectError::Remove {
                    path: path.clone(),
                    source,
                })?;
            }
            *removed += 1;
        }
        Ok(())
    }

    /// Every entry of every bundle directory and its data directory.
    ///
    /// A bundle backing several runs is listed once.
    fn candidate_paths(&self, runs: &[Run]) -> Result<Vec<PathBuf>, CollectError> {
        let roots: BTreeSet<&Path> = runs
            .iter()
            .flat_map(|run| run.files())
            .map(|file| file.location())
            .collect();

        let mut paths = Vec::new();
        for root in roots {
            paths.extend(list_dir(root)?);
            paths.extend(list_dir(&root.join(&self.config.data_dir_name))?);
        }
        Ok(paths)
    }

    fn should_be_deleted(&self, path: &Path, reachable: &HashSet<String>) -> bool {
        if path.is_dir() {
            return false;
        }

        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        if reachable.contains(&*name) {
            return false;
        }

        !self.config.preserved_files.iter().any(|kept| kept.as_str() == &*name)
    }
}

/// Remove unattached files with the given configuration.
pub fn remove_unattached_files(runs: &[Run], config: &CollectorConfig, logger: &dyn Logger) -> usize {
    UnattachedFileCollector::new(config.clone(), logger).run(runs)
}

/// Entries of `dir`, sorted by path.
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, CollectError> {
    let list_error = |source| CollectError::List {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_error)? {
        paths.push(entry.map_err(list_error)?.path());
    }
    paths.sort();
    Ok(paths)
}
