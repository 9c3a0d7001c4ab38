//! Meeting aggregate.
//!
//! # Responsibility
//! - Own every piece of one meeting: location, agenda, roster and grouping.
//! - Keep roster deletion consistent with group membership.
//!
//! # Invariants
//! - `id` is stable and never reused for another meeting.
//! - Removing a participant also removes them from every group.

use super::agenda::{AgendaItem, StartTime};
use super::group::GroupingResult;
use super::participant::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable meeting identifier.
pub type MeetingId = Uuid;

/// Venue details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    /// Whether a facilities work order has been filed for the venue.
    pub has_work_order: bool,
}

/// One meeting and everything organized for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub location: Location,
    pub start_time: StartTime,
    pub agenda_items: Vec<AgendaItem>,
    pub participants: Vec<Participant>,
    pub grouping: GroupingResult,
}

impl Meeting {
    /// Creates an empty meeting stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now_epoch_ms(),
            location: Location::default(),
            start_time: StartTime::DEFAULT,
            agenda_items: Vec::new(),
            participants: Vec::new(),
            grouping: GroupingResult::default(),
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Deletes one roster entry and cascades into the grouping.
    ///
    /// Returns `false` when `id` is not on the roster.
    pub fn remove_participant(&mut self, id: ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        if self.participants.len() == before {
            return false;
        }
        self.grouping.remove_participant(id);
        true
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
