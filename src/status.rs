//! Allowed status values per entity kind.
//!
//! The storage layer stores any status string it is given; these sets are
//! for callers to check user input before it reaches `create_*`/`update_*`.

use crate::{Error, Result};

/// A named vocabulary of status strings
#[derive(Debug, Clone, Copy)]
pub struct StatusSet {
    kind: &'static str,
    allowed: &'static [&'static str],
    default: Option<&'static str>,
}

pub const ASSET: StatusSet = StatusSet {
    kind: "asset",
    allowed: &["todo", "design", "in_progress", "review", "approved", "done"],
    default: Some("todo"),
};

pub const TASK: StatusSet = StatusSet {
    kind: "task",
    allowed: &["todo", "not_started", "in_progress", "review", "blocked", "done"],
    default: Some("todo"),
};

pub const APPROVAL: StatusSet = StatusSet {
    kind: "approval",
    allowed: &["approved", "rejected", "needs_changes"],
    default: None,
};

pub const SCHEDULE: StatusSet = StatusSet {
    kind: "schedule",
    allowed: &["scheduled", "in_progress", "blocked", "done"],
    default: Some("scheduled"),
};

impl StatusSet {
    /// Status applied when the caller gives none.
    ///
    /// Approvals have no default; falls back to the first allowed value.
    pub fn default_value(&self) -> &'static str {
        self.default.unwrap_or(self.allowed[0])
    }

    pub fn contains(&self, value: &str) -> bool {
        self.allowed.contains(&value)
    }

    pub fn validate(&self, value: &str) -> Result<()> {
        if self.contains(value) {
            return Ok(());
        }
        let mut allowed: Vec<&str> = self.allowed.to_vec();
        allowed.sort_unstable();
        Err(Error::InvalidStatus {
            kind: self.kind,
            value: value.to_string(),
            allowed: allowed.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_known_values() {
        assert!(ASSET.validate("todo").is_ok());
        assert!(TASK.validate("blocked").is_ok());
        assert!(APPROVAL.validate("needs_changes").is_ok());
        assert!(SCHEDULE.validate("scheduled").is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_value() {
        let err = APPROVAL.validate("maybe").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid approval status 'maybe'. Allowed: approved, needs_changes, rejected"
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ASSET.default_value(), "todo");
        assert_eq!(TASK.default_value(), "todo");
        assert_eq!(SCHEDULE.default_value(), "scheduled");
    }
}
