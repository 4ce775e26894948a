//! Core types for plan and apply

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the host will do to one resource block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// State already matches configuration
    NoOp,
    /// Not tracked yet, or gone remotely
    Create,
    /// Tracked, some attributes differ
    Update,
    /// A force-new attribute differs: delete then create
    Replace,
    /// Tracked but no longer declared
    Delete,
}

impl Action {
    /// Check if the action changes anything
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Whether the action removes the current remote object
    pub fn removes(&self) -> bool {
        matches!(self, Self::Delete | Self::Replace)
    }

    /// Whether the action writes a new remote object
    pub fn writes(&self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Replace)
    }

    /// Single-character marker for plan output
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::NoOp => " ",
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "-/+",
            Self::Delete => "-",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Result of applying one planned change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was updated in place
    Updated,
    /// Resource was deleted and created again
    Replaced,
    /// Resource was removed
    Removed,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.removed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Updated => self.updated += 1,
            ApplyResult::Replaced => self.replaced += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of resources applied concurrently within a dependency tier
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_flags() {
        assert!(!Action::NoOp.is_change());
        assert!(Action::Replace.removes() && Action::Replace.writes());
        assert!(Action::Delete.removes() && !Action::Delete.writes());
        assert_eq!(Action::Replace.symbol(), "-/+");
        assert_eq!(Action::Update.to_string(), "update");
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        for r in [
            ApplyResult::Created,
            ApplyResult::Updated,
            ApplyResult::Removed,
            ApplyResult::Failed {
                error: "x".into(),
            },
            ApplyResult::NoChange,
        ] {
            summary.add_result(&r);
        }
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.total(), 5);
        assert!(!summary.is_success());
    }
}
