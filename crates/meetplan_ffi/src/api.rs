//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose meeting, roster and grouping use-cases to Dart via FRB.
//! - Flatten core errors into response envelopes with readable messages.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - IDs cross the boundary as UTF-8 UUID strings.

use log::warn;
use meetplan_core::db::open_db;
use meetplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    GroupingResult, MeetingService, ServiceResult, SqliteMeetingRepository,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "meetplan.sqlite3";
const DB_PATH_ENV: &str = "MEETPLAN_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// IDs created by the action, if any.
    pub ids: Vec<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            ok: true,
            ids,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ids: Vec::new(),
            message: message.into(),
        }
    }
}

/// Meeting row for board listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingListItem {
    pub meeting_id: String,
    pub name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Meeting board response, oldest meeting first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingListResponse {
    pub items: Vec<MeetingListItem>,
    pub message: String,
}

/// One group as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub group_id: String,
    pub name: String,
    pub leader_id: Option<String>,
    pub member_ids: Vec<String>,
}

/// Grouping state after an allocation or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingResponse {
    pub ok: bool,
    pub groups: Vec<GroupView>,
    pub saved: bool,
    /// Effective group count; differs from the request when it was clamped.
    pub applied_group_count: u32,
    pub message: String,
}

impl GroupingResponse {
    fn from_grouping(grouping: GroupingResult, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            applied_group_count: grouping.groups.len() as u32,
            saved: grouping.saved,
            groups: grouping
                .groups
                .into_iter()
                .map(|group| GroupView {
                    group_id: group.id.to_string(),
                    name: group.name,
                    leader_id: group.leader_id.map(|id| id.to_string()),
                    member_ids: group.member_ids.iter().map(Uuid::to_string).collect(),
                })
                .collect(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            groups: Vec::new(),
            saved: false,
            applied_group_count: 0,
            message: message.into(),
        }
    }
}

/// Attendance cross-check response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceResponse {
    pub ok: bool,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub message: String,
}

/// Creates one meeting.
#[flutter_rust_bridge::frb(sync)]
pub fn meeting_create(name: String) -> ActionResponse {
    match with_meeting_service(|service| service.create_meeting(name)) {
        Ok(meeting) => ActionResponse::success("Meeting created.", vec![meeting.id.to_string()]),
        Err(err) => ActionResponse::failure(format!("meeting_create failed: {err}")),
    }
}

/// Lists meetings for the board view.
#[flutter_rust_bridge::frb(sync)]
pub fn meeting_list() -> MeetingListResponse {
    match with_meeting_service(|service| service.list_meetings()) {
        Ok(meetings) => MeetingListResponse {
            message: format!("Found {} meeting(s).", meetings.len()),
            items: meetings
                .into_iter()
                .map(|meeting| MeetingListItem {
                    meeting_id: meeting.id.to_string(),
                    name: meeting.name,
                    created_at: meeting.created_at,
                })
                .collect(),
        },
        Err(err) => MeetingListResponse {
            items: Vec::new(),
            message: format!("meeting_list failed: {err}"),
        },
    }
}

/// Adds a batch of names under one department.
#[flutter_rust_bridge::frb(sync)]
pub fn participants_add(meeting_id: String, names: String, dept: String) -> ActionResponse {
    let result = parse_id(&meeting_id, "meeting_id").and_then(|id| {
        with_meeting_service(|service| service.add_participants(id, &names, &dept))
    });
    match result {
        Ok(added) => ActionResponse::success(
            format!("Added {} participant(s).", added.len()),
            added.iter().map(|p| p.id.to_string()).collect(),
        ),
        Err(err) => ActionResponse::failure(format!("participants_add failed: {err}")),
    }
}

/// Runs the group allocator for one meeting.
///
/// # FFI contract
/// - `requested_group_count` is validated by core (`1..=100`, integral).
/// - `applied_group_count` reports the clamped count for the input field.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_auto(
    meeting_id: String,
    requested_group_count: f64,
    overwrite_saved: bool,
) -> GroupingResponse {
    let result = parse_id(&meeting_id, "meeting_id").and_then(|id| {
        with_meeting_service(|service| {
            service.auto_group(id, requested_group_count, overwrite_saved)
        })
    });
    match result {
        Ok(allocation) => {
            let message = if allocation.clamped {
                format!(
                    "Group count reduced to {} to match participants.",
                    allocation.group_count
                )
            } else {
                format!("Created {} group(s).", allocation.group_count)
            };
            GroupingResponse::from_grouping(GroupingResult::unsaved(allocation.groups), message)
        }
        Err(err) => GroupingResponse::failure(format!("groups_auto failed: {err}")),
    }
}

/// Makes a participant the leader of a group.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_set_leader(
    meeting_id: String,
    participant_id: String,
    group_id: String,
) -> GroupingResponse {
    grouping_edit("groups_set_leader", || {
        let meeting_id = parse_id(&meeting_id, "meeting_id")?;
        let participant_id = parse_id(&participant_id, "participant_id")?;
        let group_id = parse_id(&group_id, "group_id")?;
        with_meeting_service(|service| service.set_leader(meeting_id, participant_id, group_id))
    })
}

/// Unsets a group leader, optionally keeping them as a member.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_clear_leader(
    meeting_id: String,
    group_id: String,
    return_to_members: bool,
) -> GroupingResponse {
    grouping_edit("groups_clear_leader", || {
        let meeting_id = parse_id(&meeting_id, "meeting_id")?;
        let group_id = parse_id(&group_id, "group_id")?;
        with_meeting_service(|service| {
            service.clear_leader(meeting_id, group_id, return_to_members)
        })
    })
}

/// Moves a participant into another group's members.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_move_member(
    meeting_id: String,
    participant_id: String,
    group_id: String,
) -> GroupingResponse {
    grouping_edit("groups_move_member", || {
        let meeting_id = parse_id(&meeting_id, "meeting_id")?;
        let participant_id = parse_id(&participant_id, "participant_id")?;
        let group_id = parse_id(&group_id, "group_id")?;
        with_meeting_service(|service| service.move_member(meeting_id, participant_id, group_id))
    })
}

/// Commits the current grouping.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_save(meeting_id: String) -> ActionResponse {
    let result = parse_id(&meeting_id, "meeting_id")
        .and_then(|id| with_meeting_service(|service| service.save_grouping(id)));
    match result {
        Ok(()) => ActionResponse::success("Grouping saved.", Vec::new()),
        Err(err) => ActionResponse::failure(format!("groups_save failed: {err}")),
    }
}

/// Compares the roster against one attendee name per line.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_check(meeting_id: String, attendance_text: String) -> AttendanceResponse {
    let result = parse_id(&meeting_id, "meeting_id").and_then(|id| {
        with_meeting_service(|service| service.check_attendance(id, &attendance_text))
    });
    match result {
        Ok(report) => AttendanceResponse {
            ok: true,
            message: if report.is_complete() {
                "Attendance matches roster.".to_string()
            } else {
                format!(
                    "{} missing, {} extra.",
                    report.missing.len(),
                    report.extra.len()
                )
            },
            missing: report.missing,
            extra: report.extra,
        },
        Err(err) => AttendanceResponse {
            ok: false,
            missing: Vec::new(),
            extra: Vec::new(),
            message: format!("attendance_check failed: {err}"),
        },
    }
}

fn grouping_edit(
    operation: &'static str,
    run: impl FnOnce() -> Result<GroupingResult, String>,
) -> GroupingResponse {
    match run() {
        Ok(grouping) => GroupingResponse::from_grouping(grouping, "Grouping updated."),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error operation={operation}");
            GroupingResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn parse_id(value: &str, field: &'static str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid {field} `{value}`"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn open_store() -> Result<Connection, String> {
    open_db(resolve_db_path()).map_err(|err| format!("meeting DB open failed: {err}"))
}

fn with_meeting_service<T>(
    f: impl FnOnce(&MeetingService<SqliteMeetingRepository<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let conn = open_store()?;
    let repo = SqliteMeetingRepository::try_new(&conn)
        .map_err(|err| format!("meeting repo init failed: {err}"))?;
    let service = MeetingService::new(repo);
    f(&service).map_err(|err| err.to_string())
}
