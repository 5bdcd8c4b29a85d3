//! Where a rendered log lives.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How bundle-resident content is exposed to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingMode {
    /// Embed the bytes in the report
    Inline,
    /// Reference the file in place
    #[default]
    Linking,
}

/// Location of a human-readable log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum RenderingContent {
    /// No log available
    #[default]
    None,
    /// External file reference
    Url(PathBuf),
    /// Raw bytes
    Data(Vec<u8>),
}

impl RenderingContent {
    /// The referenced file, if the content is an external file reference.
    pub fn url(&self) -> Option<&Path> {
        match self {
            RenderingContent::Url(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RenderingContent::None)
    }
}
