//! Meeting use-case service.
//!
//! # Responsibility
//! - Orchestrate meeting, agenda, roster and grouping use-cases.
//! - Feed the allocator from stored state and persist its result.
//!
//! # Invariants
//! - Every roster or grouping change leaves the grouping unsaved.
//! - A saved, non-empty grouping is only replaced by explicit request.
//! - Grouping edits referencing unknown groups or participants are no-ops.

use crate::grouping::{allocate, validate_group_count, Allocation, AllocationError};
use crate::model::agenda::{
    normalize_agenda, reorder, schedule, AgendaError, AgendaItem, ScheduledAgendaItem, StartTime,
};
use crate::model::group::{GroupId, GroupingResult};
use crate::model::meeting::{Location, Meeting, MeetingId};
use crate::model::participant::{Participant, ParticipantId};
use crate::repo::meeting_repo::{MeetingRepository, RepoError};
use crate::roster::{check_attendance, parse_names, AttendanceReport};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for meeting use-cases.
#[derive(Debug)]
pub enum MeetingServiceError {
    /// Meeting name is blank after trim.
    InvalidMeetingName,
    /// Participant names or department could not be used.
    InvalidParticipantInput(&'static str),
    MeetingNotFound(MeetingId),
    /// Regrouping would discard a saved partition.
    SavedGroupingWouldBeLost(MeetingId),
    /// Saving was requested before any grouping exists.
    NoGrouping(MeetingId),
    Agenda(AgendaError),
    Allocation(AllocationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for MeetingServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMeetingName => write!(f, "meeting name must not be blank"),
            Self::InvalidParticipantInput(details) => {
                write!(f, "invalid participant input: {details}")
            }
            Self::MeetingNotFound(id) => write!(f, "meeting not found: {id}"),
            Self::SavedGroupingWouldBeLost(id) => write!(
                f,
                "meeting {id} has a saved grouping; confirm overwrite to regroup"
            ),
            Self::NoGrouping(id) => write!(f, "meeting {id} has no grouping to save"),
            Self::Agenda(err) => write!(f, "{err}"),
            Self::Allocation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MeetingServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Agenda(err) => Some(err),
            Self::Allocation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MeetingServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::MeetingNotFound(id) => Self::MeetingNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<AgendaError> for MeetingServiceError {
    fn from(value: AgendaError) -> Self {
        Self::Agenda(value)
    }
}

impl From<AllocationError> for MeetingServiceError {
    fn from(value: AllocationError) -> Self {
        Self::Allocation(value)
    }
}

pub type ServiceResult<T> = Result<T, MeetingServiceError>;

/// Meeting service facade over repository implementations.
pub struct MeetingService<R: MeetingRepository> {
    repo: R,
}

impl<R: MeetingRepository> MeetingService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an empty meeting with default start time.
    pub fn create_meeting(&self, name: impl Into<String>) -> ServiceResult<Meeting> {
        let meeting = Meeting::new(normalize_meeting_name(name.into())?);
        self.repo.create_meeting(&meeting)?;
        info!(
            "event=meeting_create module=service status=ok meeting_id={}",
            meeting.id
        );
        Ok(meeting)
    }

    /// Loads one meeting or fails with `MeetingNotFound`.
    pub fn get_meeting(&self, id: MeetingId) -> ServiceResult<Meeting> {
        self.repo
            .get_meeting(id)?
            .ok_or(MeetingServiceError::MeetingNotFound(id))
    }

    /// Lists meetings oldest first.
    pub fn list_meetings(&self) -> ServiceResult<Vec<Meeting>> {
        Ok(self.repo.list_meetings()?)
    }

    pub fn rename_meeting(&self, id: MeetingId, name: impl Into<String>) -> ServiceResult<()> {
        let name = normalize_meeting_name(name.into())?;
        Ok(self.repo.update_meeting_name(id, name.as_str())?)
    }

    pub fn delete_meeting(&self, id: MeetingId) -> ServiceResult<()> {
        self.repo.delete_meeting(id)?;
        info!("event=meeting_delete module=service status=ok meeting_id={id}");
        Ok(())
    }

    /// Stores venue address (trimmed) and work-order flag.
    pub fn save_location(
        &self,
        id: MeetingId,
        address: &str,
        has_work_order: bool,
    ) -> ServiceResult<Location> {
        let location = Location {
            address: address.trim().to_string(),
            has_work_order,
        };
        self.repo.update_location(id, &location)?;
        Ok(location)
    }

    /// Validates and stores start time plus agenda, returning the timed slots.
    ///
    /// Blank `start_time` falls back to `09:00`; blank rows are dropped.
    pub fn save_agenda(
        &self,
        id: MeetingId,
        start_time: &str,
        items: Vec<AgendaItem>,
    ) -> ServiceResult<Vec<ScheduledAgendaItem>> {
        let start = StartTime::parse_or_default(start_time)?;
        for item in &items {
            item.validate()?;
        }
        let items = normalize_agenda(items);
        self.repo.replace_agenda(id, start, &items)?;
        Ok(schedule(start, &items))
    }

    /// Appends one default `discuss` row.
    pub fn add_agenda_item(&self, id: MeetingId) -> ServiceResult<Vec<AgendaItem>> {
        let meeting = self.get_meeting(id)?;
        let mut items = meeting.agenda_items;
        items.push(AgendaItem::default());
        self.repo.replace_agenda(id, meeting.start_time, &items)?;
        Ok(items)
    }

    /// Removes the row at `index`; out-of-range indices change nothing.
    pub fn remove_agenda_item(&self, id: MeetingId, index: usize) -> ServiceResult<Vec<AgendaItem>> {
        let meeting = self.get_meeting(id)?;
        let mut items = meeting.agenda_items;
        if index < items.len() {
            items.remove(index);
            self.repo.replace_agenda(id, meeting.start_time, &items)?;
        }
        Ok(items)
    }

    /// Moves one agenda row; out-of-range indices change nothing.
    pub fn reorder_agenda(
        &self,
        id: MeetingId,
        from: usize,
        to: usize,
    ) -> ServiceResult<Vec<AgendaItem>> {
        let meeting = self.get_meeting(id)?;
        let mut items = meeting.agenda_items;
        if reorder(&mut items, from, to) {
            self.repo.replace_agenda(id, meeting.start_time, &items)?;
        }
        Ok(items)
    }

    /// Computes timed slots for the stored agenda.
    pub fn agenda_schedule(&self, id: MeetingId) -> ServiceResult<Vec<ScheduledAgendaItem>> {
        let meeting = self.get_meeting(id)?;
        Ok(schedule(meeting.start_time, &meeting.agenda_items))
    }

    /// Adds every name parsed from `raw_names` under one department.
    ///
    /// # Errors
    /// - `InvalidParticipantInput` when names or department are blank, or no
    ///   name survives parsing.
    pub fn add_participants(
        &self,
        id: MeetingId,
        raw_names: &str,
        dept: &str,
    ) -> ServiceResult<Vec<Participant>> {
        if raw_names.trim().is_empty() {
            return Err(MeetingServiceError::InvalidParticipantInput(
                "names must not be blank",
            ));
        }
        let dept = dept.trim();
        if dept.is_empty() {
            return Err(MeetingServiceError::InvalidParticipantInput(
                "department must not be blank",
            ));
        }
        let participants: Vec<Participant> = parse_names(raw_names)
            .into_iter()
            .map(|name| Participant::new(name, dept))
            .collect();
        if participants.is_empty() {
            return Err(MeetingServiceError::InvalidParticipantInput(
                "no valid names found",
            ));
        }

        self.repo.insert_participants(id, &participants)?;
        info!(
            "event=participants_add module=service status=ok meeting_id={id} count={}",
            participants.len()
        );
        Ok(participants)
    }

    /// Renames or re-departments one participant.
    pub fn update_participant(
        &self,
        id: MeetingId,
        participant_id: ParticipantId,
        name: &str,
        dept: &str,
    ) -> ServiceResult<Participant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MeetingServiceError::InvalidParticipantInput(
                "name must not be blank",
            ));
        }
        let participant = Participant::with_id(participant_id, name, dept.trim());
        self.repo.update_participant(id, &participant)?;
        Ok(participant)
    }

    /// Deletes one participant and drops them from every group.
    ///
    /// Returns `false` when the participant is not on the roster.
    pub fn remove_participant(
        &self,
        id: MeetingId,
        participant_id: ParticipantId,
    ) -> ServiceResult<bool> {
        let mut meeting = self.get_meeting(id)?;
        if !meeting.remove_participant(participant_id) {
            return Ok(false);
        }
        self.repo.delete_participant(id, participant_id)?;
        meeting.grouping.saved = false;
        self.repo.replace_grouping(id, &meeting.grouping)?;
        Ok(true)
    }

    /// Regroups the roster, pinning leaders of the current grouping by index.
    ///
    /// # Errors
    /// - `Allocation` for an empty roster or invalid group count; these are
    ///   checked first and nothing is written.
    /// - `SavedGroupingWouldBeLost` when a saved grouping exists and
    ///   `overwrite_saved` is `false`.
    pub fn auto_group(
        &self,
        id: MeetingId,
        requested_group_count: f64,
        overwrite_saved: bool,
    ) -> ServiceResult<Allocation> {
        let meeting = self.get_meeting(id)?;
        if meeting.participants.is_empty() {
            return Err(AllocationError::EmptyRoster.into());
        }
        validate_group_count(requested_group_count)?;
        if meeting.grouping.saved && !meeting.grouping.is_empty() && !overwrite_saved {
            return Err(MeetingServiceError::SavedGroupingWouldBeLost(id));
        }

        let allocation = allocate(
            &meeting.participants,
            requested_group_count,
            &meeting.grouping.groups,
        )?;
        self.repo
            .replace_grouping(id, &GroupingResult::unsaved(allocation.groups.clone()))?;
        info!(
            "event=groups_auto module=service status=ok meeting_id={id} group_count={} clamped={}",
            allocation.group_count, allocation.clamped
        );
        Ok(allocation)
    }

    /// Makes a roster participant the leader of `group_id`.
    pub fn set_leader(
        &self,
        id: MeetingId,
        participant_id: ParticipantId,
        group_id: GroupId,
    ) -> ServiceResult<GroupingResult> {
        self.edit_grouping(id, |meeting| {
            meeting.participant(participant_id).is_some()
                && meeting.grouping.set_leader(participant_id, group_id)
        })
    }

    /// Unsets the leader of `group_id`, optionally keeping them as a member.
    pub fn clear_leader(
        &self,
        id: MeetingId,
        group_id: GroupId,
        return_to_members: bool,
    ) -> ServiceResult<GroupingResult> {
        self.edit_grouping(id, |meeting| {
            meeting.grouping.clear_leader(group_id, return_to_members)
        })
    }

    /// Moves a roster participant into the members of `group_id`.
    pub fn move_member(
        &self,
        id: MeetingId,
        participant_id: ParticipantId,
        group_id: GroupId,
    ) -> ServiceResult<GroupingResult> {
        self.edit_grouping(id, |meeting| {
            meeting.participant(participant_id).is_some()
                && meeting.grouping.move_member(participant_id, group_id)
        })
    }

    /// Commits the current grouping.
    pub fn save_grouping(&self, id: MeetingId) -> ServiceResult<()> {
        let meeting = self.get_meeting(id)?;
        if meeting.grouping.is_empty() {
            return Err(MeetingServiceError::NoGrouping(id));
        }
        self.repo.set_grouping_saved(id, true)?;
        Ok(())
    }

    /// Roster participants that currently belong to no group.
    pub fn unassigned_participants(&self, id: MeetingId) -> ServiceResult<Vec<Participant>> {
        let meeting = self.get_meeting(id)?;
        Ok(meeting
            .grouping
            .unassigned(&meeting.participants)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Compares the roster against one attendee name per line.
    pub fn check_attendance(
        &self,
        id: MeetingId,
        attendance_text: &str,
    ) -> ServiceResult<AttendanceReport> {
        let meeting = self.get_meeting(id)?;
        Ok(check_attendance(&meeting.participants, attendance_text))
    }

    fn edit_grouping(
        &self,
        id: MeetingId,
        edit: impl FnOnce(&mut Meeting) -> bool,
    ) -> ServiceResult<GroupingResult> {
        let mut meeting = self.get_meeting(id)?;
        if edit(&mut meeting) {
            self.repo.replace_grouping(id, &meeting.grouping)?;
        }
        Ok(meeting.grouping)
    }
}

fn normalize_meeting_name(value: String) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MeetingServiceError::InvalidMeetingName);
    }
    Ok(trimmed.to_string())
}
