//! Core domain logic for MeetPlan.
//! This crate is the single source of truth for meeting and grouping invariants.

pub mod db;
pub mod grouping;
pub mod logging;
pub mod model;
pub mod repo;
pub mod roster;
pub mod service;

pub use grouping::{allocate, allocate_with_rng, Allocation, AllocationError, MAX_GROUP_COUNT};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::agenda::{AgendaError, AgendaItem, AgendaKind, ScheduledAgendaItem, StartTime};
pub use model::group::{Group, GroupId, GroupingResult};
pub use model::meeting::{Location, Meeting, MeetingId};
pub use model::participant::{Participant, ParticipantId, UNASSIGNED_DEPT};
pub use repo::meeting_repo::{MeetingRepository, RepoError, RepoResult, SqliteMeetingRepository};
pub use roster::{check_attendance, parse_names, AttendanceReport};
pub use service::meeting_service::{MeetingService, MeetingServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
