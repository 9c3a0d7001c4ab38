//! Participant domain model.
//!
//! # Responsibility
//! - Define the roster entry used by grouping and attendance checks.
//! - Provide the department bucketing key used for group balancing.
//!
//! # Invariants
//! - `id` is stable for the meeting lifetime and never reused.
//! - Blank departments collapse into one shared bucket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable participant identifier.
pub type ParticipantId = Uuid;

/// Department bucket used for participants with an empty department.
pub const UNASSIGNED_DEPT: &str = "Unassigned";

/// One roster entry of a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Free-form department label. May be empty.
    pub dept: String,
}

impl Participant {
    /// Creates a participant with a generated stable ID.
    pub fn new(name: impl Into<String>, dept: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, dept)
    }

    /// Creates a participant with a caller-provided ID.
    pub fn with_id(id: ParticipantId, name: impl Into<String>, dept: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dept: dept.into(),
        }
    }

    /// Returns the department key used for balancing.
    ///
    /// Empty or whitespace-only departments map to [`UNASSIGNED_DEPT`].
    pub fn dept_key(&self) -> &str {
        let trimmed = self.dept.trim();
        if trimmed.is_empty() {
            UNASSIGNED_DEPT
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Participant, UNASSIGNED_DEPT};

    #[test]
    fn dept_key_trims_and_buckets_blank_values() {
        assert_eq!(Participant::new("Ann", " Sales ").dept_key(), "Sales");
        assert_eq!(Participant::new("Bob", "").dept_key(), UNASSIGNED_DEPT);
        assert_eq!(Participant::new("Cy", "   ").dept_key(), UNASSIGNED_DEPT);
    }
}
