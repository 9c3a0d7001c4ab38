//! Group and grouping result models.
//!
//! # Responsibility
//! - Define the partition shape produced by the allocator and edited by users.
//!
//! # Invariants
//! - A participant appears at most once across all leaders and members.
//! - A group's leader is never repeated in its own `member_ids`.
//! - `saved` is informational and never read by the allocator.
//!
//! # See also
//! - `crate::grouping` for allocation and edit operations.

use super::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable group identifier.
pub type GroupId = Uuid;

/// One group of a meeting partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// User-facing label, e.g. `Group 1`.
    pub name: String,
    pub leader_id: Option<ParticipantId>,
    /// Ordered, unique within the group.
    pub member_ids: Vec<ParticipantId>,
}

impl Group {
    /// Creates an empty group with a generated ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            leader_id: None,
            member_ids: Vec::new(),
        }
    }

    /// Member count plus one when a leader is set.
    pub fn occupied_size(&self) -> usize {
        self.member_ids.len() + usize::from(self.leader_id.is_some())
    }

    /// Returns whether `pid` is this group's leader or one of its members.
    pub fn contains(&self, pid: ParticipantId) -> bool {
        self.leader_id == Some(pid) || self.member_ids.contains(&pid)
    }
}

/// Ordered groups plus the user's commit flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingResult {
    pub groups: Vec<Group>,
    pub saved: bool,
}

impl GroupingResult {
    /// Wraps freshly allocated groups as an unsaved result.
    pub fn unsaved(groups: Vec<Group>) -> Self {
        Self {
            groups,
            saved: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finds one group by ID.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Commits the current partition.
    pub fn mark_saved(&mut self) {
        self.saved = true;
    }
}
