//! Test status and roll-up precedence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a test, a test group, or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Passed
    Success,
    /// Failed at least once
    Failure,
    /// Skipped
    Skipped,
    /// Repeated executions with differing outcomes
    Mixed,
}

impl Status {
    /// Roll up a set of statuses into one.
    ///
    /// Failure wins over skipped, skipped wins over everything else. An empty
    /// input is a success.
    pub fn rollup<I>(statuses: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        let mut skipped = false;
        for status in statuses {
            match status {
                Status::Failure => return Status::Failure,
                Status::Skipped => skipped = true,
                Status::Success | Status::Mixed => {}
            }
        }
        if skipped {
            Status::Skipped
        } else {
            Status::Success
        }
    }

    /// Lowercase name as used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Skipped => "skipped",
            Status::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollup_empty_is_success() {
        assert_eq!(Status::rollup(Vec::<Status>::new()), Status::Success);
    }

    #[test]
    fn test_rollup_skipped_over_success() {
        assert_eq!(Status::rollup([Status::Skipped, Status::Success]), Status::Skipped);
    }

    #[test]
    fn test_rollup_failure_over_skipped() {
        assert_eq!(Status::rollup([Status::Failure, Status::Skipped]), Status::Failure);
        assert_eq!(
            Status::rollup([Status::Skipped, Status::Mixed, Status::Failure]),
            Status::Failure
        );
    }

    #[test]
    fn test_rollup_mixed_alone_is_success() {
        assert_eq!(Status::rollup([Status::Mixed, Status::Success]), Status::Success);
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&Status::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
        let parsed: Status = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(parsed, Status::Mixed);
    }
}
