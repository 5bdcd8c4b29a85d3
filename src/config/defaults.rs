//! Built-in defaults (layer 1)

/// Nested attachment directory of a result bundle
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Files kept by the collector whether or not anything references them
pub const DEFAULT_PRESERVED_FILES: &[&str] = &["report.junit"];

/// Screenshot scale when downsizing is enabled
pub const DEFAULT_DOWNSIZE_SCALE_FACTOR: f64 = 0.5;

pub(super) fn downsize_scale_factor() -> f64 {
    DEFAULT_DOWNSIZE_SCALE_FACTOR
}

pub(super) fn data_dir_name() -> String {
    DEFAULT_DATA_DIR.to_string()
}

pub(super) fn preserved_files() -> Vec<String> {
    DEFAULT_PRESERVED_FILES.iter().map(|s| s.to_string()).collect()
}
