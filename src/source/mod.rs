//! Directory-backed result bundles
//!
//! A bundle is a directory holding a `manifest.json` next to its attachment
//! storage:
//!
//! ```text
//! Tests.xcresult/
//!   manifest.json     actions, test plans by reference, logs by reference
//!   action.log
//!   Data/             exported attachments
//! ```
//!
//! Log and attachment paths in the manifest are relative to the bundle.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use xcreport_model::{ActionRecord, RenderingContent, RenderingMode, ResultSource, TestPlanRunSummaries};

/// Manifest file name inside a bundle.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory extension recognized when searching for bundles.
pub const BUNDLE_EXTENSION: &str = "xcresult";

/// How deep below a search root bundles are looked for.
const SEARCH_DEPTH: usize = 3;

/// Errors opening or discovering bundles
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No manifest.json in bundle {0}")]
    MissingManifest(PathBuf),

    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub actions: Vec<ActionRecord>,

    /// Test plans keyed by test reference id
    #[serde(default)]
    pub test_plans: HashMap<String, TestPlanRunSummaries>,

    /// Bundle-relative log paths keyed by log reference id
    #[serde(default)]
    pub logs: HashMap<String, PathBuf>,
}

/// A result bundle read from disk.
#[derive(Debug, Clone)]
pub struct JsonBundle {
    location: PathBuf,
    manifest: BundleManifest,
}

impl JsonBundle {
    /// Open the bundle at `location`, reading its manifest.
    pub fn open(location: impl Into<PathBuf>) -> Result<Self, BundleError> {
        let location = location.into();
        let manifest_path = location.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(BundleError::MissingManifest(location));
        }

        let content = fs::read_to_string(&manifest_path)?;
        let manifest = serde_json::from_str(&content).map_err(|source| BundleError::Manifest {
            path: manifest_path,
            source,
        })?;

        Ok(Self { location, manifest })
    }

    /// Actions in manifest order.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.manifest.actions
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }
}

impl ResultSource for JsonBundle {
    fn location(&self) -> &Path {
        &self.location
    }

    fn test_plan_run_summaries(&self, id: &str) -> Option<TestPlanRunSummaries> {
        self.manifest.test_plans.get(id).cloned()
    }

    fn export_log_content(&self, id: &str, mode: RenderingMode) -> RenderingContent {
        let Some(relative) = self.manifest.logs.get(id) else {
            return RenderingContent::None;
        };
        let path = self.location.join(relative);

        match mode {
            RenderingMode::Linking if path.is_file() => RenderingContent::Url(path),
            RenderingMode::Linking => RenderingContent::None,
            RenderingMode::Inline => match fs::read(&path) {
                Ok(data) => RenderingContent::Data(data),
                Err(_) => RenderingContent::None,
            },
        }
    }
}

/// Whether `path` is a directory carrying a manifest.
pub fn is_bundle(path: &Path) -> bool {
    path.is_dir() && path.join(MANIFEST_FILE).is_file()
}

/// Resolve command-line paths to bundle directories.
///
/// A path that is itself a bundle is taken as is. Any other directory is
/// searched for `*.xcresult` bundles. Results keep argument order; bundles
/// found by searching are sorted by path.
pub fn discover_bundles(paths: &[PathBuf]) -> Result<Vec<PathBuf>, BundleError> {
    let mut bundles = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(BundleError::NotFound(path.clone()));
        }
        if is_bundle(path) {
            bundles.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        let mut walker = WalkDir::new(path).min_depth(1).max_depth(SEARCH_DEPTH).into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let is_xcresult = entry
                .path()
                .extension()
                .map(|ext| ext == BUNDLE_EXTENSION)
                .unwrap_or(false);
            if is_xcresult {
                if is_bundle(entry.path()) {
                    found.push(entry.path().to_path_buf());
                }
                walker.skip_current_dir();
            }
        }
        found.sort();
        bundles.extend(found);
    }
    Ok(bundles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_bundle(dir: &Path) {
        fs::create_dir_all(dir.join("Data")).unwrap();
        fs::write(dir.join("action.log"), "Test Suite 'All tests' started").unwrap();
        let manifest = json!({
            "actions": [{
                "title": "Test",
                "run_destination": {
                    "identifier": "UDID-1",
                    "operating_system_version": "17.2",
                    "model_name": "iPhone 15"
                },
                "tests_ref": {"id": "tests-1"},
                "log_ref": {"id": "log-1"}
            }],
            "test_plans": {
                "tests-1": {
                    "summaries": [{
                        "name": "Debug",
                        "testable_summaries": [{
                            "name": "AppTests",
                            "tests": [{"name": "testA", "status": "success"}]
                        }]
                    }]
                }
            },
            "logs": {"log-1": "action.log", "gone": "missing.log"}
        });
        fs::write(dir.join(MANIFEST_FILE), manifest.to_string()).unwrap();
    }

    #[test]
    fn test_open_reads_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("A.xcresult");
        write_bundle(&path);

        let bundle = JsonBundle::open(&path).unwrap();
        assert_eq!(bundle.actions().len(), 1);
        assert_eq!(bundle.actions()[0].display_title(), "Test");
        let plans = bundle.test_plan_run_summaries("tests-1").unwrap();
        assert_eq!(plans.testable_summaries().count(), 1);
        assert!(bundle.test_plan_run_summaries("other").is_none());
    }

    #[test]
    fn test_log_export_modes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("A.xcresult");
        write_bundle(&path);
        let bundle = JsonBundle::open(&path).unwrap();

        assert_eq!(
            bundle.export_log_content("log-1", RenderingMode::Linking),
            RenderingContent::Url(path.join("action.log"))
        );
        assert_eq!(
            bundle.export_log_content("log-1", RenderingMode::Inline),
            RenderingContent::Data(b"Test Suite 'All tests' started".to_vec())
        );
        assert_eq!(bundle.export_log_content("gone", RenderingMode::Linking), RenderingContent::None);
        assert_eq!(bundle.export_log_content("gone", RenderingMode::Inline), RenderingContent::None);
        assert_eq!(bundle.export_log_content("nope", RenderingMode::Inline), RenderingContent::None);
    }

    #[test]
    fn test_open_without_manifest() {
        let dir = TempDir::new().unwrap();
        let err = JsonBundle::open(dir.path()).unwrap_err();
        assert!(matches!(err, BundleError::MissingManifest(_)));
    }

    #[test]
    fn test_open_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        let err = JsonBundle::open(dir.path()).unwrap_err();
        assert!(matches!(err, BundleError::Manifest { .. }));
    }

    #[test]
    fn test_discover_bundles() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir.path().join("nightly/B.xcresult"));
        write_bundle(&dir.path().join("A.xcresult"));
        fs::create_dir_all(dir.path().join("Empty.xcresult")).unwrap();
        fs::create_dir_all(dir.path().join("other")).unwrap();

        let bundles = discover_bundles(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            bundles,
            vec![dir.path().join("A.xcresult"), dir.path().join("nightly/B.xcresult")]
        );
    }

    #[test]
    fn test_discover_explicit_bundle_and_missing_path() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("A.xcresult");
        write_bundle(&bundle);

        assert_eq!(discover_bundles(&[bundle.clone()]).unwrap(), vec![bundle]);

        let err = discover_bundles(&[dir.path().join("missing")]).unwrap_err();
        assert!(matches!(err, BundleError::NotFound(_)));
    }
}
