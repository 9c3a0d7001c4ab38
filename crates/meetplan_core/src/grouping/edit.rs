//! User edits on an existing partition.
//!
//! # Responsibility
//! - Reassign leaders and members inside a `GroupingResult`.
//! - Cascade roster deletions into group structure.
//!
//! # Invariants
//! - Unknown target groups make every edit a no-op.
//! - A participant never ends up as leader or member of two groups.
//! - Applied edits reset `saved`; no-ops leave it untouched.

use crate::model::group::{GroupId, GroupingResult};
use crate::model::participant::{Participant, ParticipantId};

impl GroupingResult {
    /// Makes `pid` the leader of `target`.
    ///
    /// `pid` is removed from every member list and from any other leadership.
    /// A different leader already sitting on `target` is moved to the front of
    /// that group's members. Calling this twice is the same as calling it once.
    ///
    /// Returns `false` when `target` does not exist.
    pub fn set_leader(&mut self, pid: ParticipantId, target: GroupId) -> bool {
        let Some(target_index) = self.index_of(target) else {
            return false;
        };

        for (index, group) in self.groups.iter_mut().enumerate() {
            group.member_ids.retain(|id| *id != pid);
            if index != target_index && group.leader_id == Some(pid) {
                group.leader_id = None;
            }
        }

        let group = &mut self.groups[target_index];
        if let Some(previous) = group.leader_id.replace(pid) {
            if previous != pid {
                group.member_ids.insert(0, previous);
            }
        }
        self.saved = false;
        true
    }

    /// Unsets the leader of `group_id`.
    ///
    /// With `return_to_members` the former leader is prepended to the group's
    /// members; otherwise they leave the partition and show up in
    /// [`GroupingResult::unassigned`].
    ///
    /// Returns `false` when the group does not exist or has no leader.
    pub fn clear_leader(&mut self, group_id: GroupId, return_to_members: bool) -> bool {
        let Some(index) = self.index_of(group_id) else {
            return false;
        };
        let group = &mut self.groups[index];
        let Some(pid) = group.leader_id.take() else {
            return false;
        };
        if return_to_members && !group.member_ids.contains(&pid) {
            group.member_ids.insert(0, pid);
        }
        self.saved = false;
        true
    }

    /// Appends `pid` to the members of `target`, removing it everywhere else.
    ///
    /// Also drops any leadership `pid` holds so roles stay exclusive.
    /// Returns `false` when `target` does not exist.
    pub fn move_member(&mut self, pid: ParticipantId, target: GroupId) -> bool {
        let Some(target_index) = self.index_of(target) else {
            return false;
        };
        for group in &mut self.groups {
            group.member_ids.retain(|id| *id != pid);
            if group.leader_id == Some(pid) {
                group.leader_id = None;
            }
        }
        self.groups[target_index].member_ids.push(pid);
        self.saved = false;
        true
    }

    /// Removes every trace of `pid`; vacated leader slots stay empty.
    ///
    /// Returns whether any group changed.
    pub fn remove_participant(&mut self, pid: ParticipantId) -> bool {
        let mut changed = false;
        for group in &mut self.groups {
            let before = group.member_ids.len();
            group.member_ids.retain(|id| *id != pid);
            changed |= group.member_ids.len() != before;
            if group.leader_id == Some(pid) {
                group.leader_id = None;
                changed = true;
            }
        }
        if changed {
            self.saved = false;
        }
        changed
    }

    /// Roster participants that belong to no group, in roster order.
    pub fn unassigned<'a>(&self, roster: &'a [Participant]) -> Vec<&'a Participant> {
        roster
            .iter()
            .filter(|p| !self.groups.iter().any(|group| group.contains(p.id)))
            .collect()
    }

    fn index_of(&self, id: GroupId) -> Option<usize> {
        self.groups.iter().position(|group| group.id == id)
    }
}
