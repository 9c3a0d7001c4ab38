//! Meeting repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the meeting aggregate: location, agenda, roster and grouping.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Agenda items, participants, groups and group members keep their
//!   position order on read-back.
//! - Deleting a participant cascades into `group_members` and clears any
//!   leader slot through foreign keys.
//! - Every write to a meeting's children bumps `meetings.updated_at`.
//! - Roster writes reset `meetings.groups_saved` atomically with the change.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::agenda::{AgendaItem, AgendaKind, StartTime};
use crate::model::group::{Group, GroupingResult};
use crate::model::meeting::{Location, Meeting, MeetingId};
use crate::model::participant::{Participant, ParticipantId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MEETING_SELECT_SQL: &str = "SELECT
    meeting_uuid,
    name,
    created_at,
    address,
    has_work_order,
    start_time,
    groups_saved
FROM meetings";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from meeting persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    MeetingNotFound(MeetingId),
    ParticipantNotFound(ParticipantId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid domain value.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MeetingNotFound(id) => write!(f, "meeting not found: {id}"),
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "meeting repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted meeting data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the meeting aggregate.
pub trait MeetingRepository {
    /// Inserts a meeting with all of its children.
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<MeetingId>;
    /// Loads one meeting aggregate.
    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<Meeting>>;
    /// Lists all meetings, oldest first.
    fn list_meetings(&self) -> RepoResult<Vec<Meeting>>;
    /// Deletes a meeting and everything it owns.
    fn delete_meeting(&self, id: MeetingId) -> RepoResult<()>;
    fn update_meeting_name(&self, id: MeetingId, name: &str) -> RepoResult<()>;
    fn update_location(&self, id: MeetingId, location: &Location) -> RepoResult<()>;
    /// Replaces the start time and the full agenda in one transaction.
    fn replace_agenda(
        &self,
        id: MeetingId,
        start_time: StartTime,
        items: &[AgendaItem],
    ) -> RepoResult<()>;
    /// Appends participants after the current roster.
    ///
    /// Roster writes clear the grouping's saved flag in the same transaction.
    fn insert_participants(&self, id: MeetingId, participants: &[Participant]) -> RepoResult<()>;
    /// Updates name and department of one participant.
    fn update_participant(&self, id: MeetingId, participant: &Participant) -> RepoResult<()>;
    /// Removes one participant and their group membership/leadership.
    fn delete_participant(&self, id: MeetingId, participant_id: ParticipantId) -> RepoResult<()>;
    /// Replaces the stored groups and saved flag.
    fn replace_grouping(&self, id: MeetingId, grouping: &GroupingResult) -> RepoResult<()>;
    fn set_grouping_saved(&self, id: MeetingId, saved: bool) -> RepoResult<()>;
}

/// SQLite-backed meeting repository.
pub struct SqliteMeetingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeetingRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl MeetingRepository for SqliteMeetingRepository<'_> {
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<MeetingId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO meetings (
                meeting_uuid,
                name,
                created_at,
                address,
                has_work_order,
                start_time,
                groups_saved
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                meeting.id.to_string(),
                meeting.name.as_str(),
                meeting.created_at,
                meeting.location.address.as_str(),
                bool_to_int(meeting.location.has_work_order),
                meeting.start_time.to_string(),
                bool_to_int(meeting.grouping.saved),
            ],
        )?;
        write_agenda(&tx, meeting.id, &meeting.agenda_items)?;
        append_participants(&tx, meeting.id, &meeting.participants)?;
        write_groups(&tx, meeting.id, &meeting.grouping.groups)?;
        tx.commit()?;
        Ok(meeting.id)
    }

    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<Meeting>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEETING_SELECT_SQL} WHERE meeting_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(load_meeting(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_meetings(&self) -> RepoResult<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEETING_SELECT_SQL} ORDER BY created_at ASC, meeting_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            meetings.push(load_meeting(self.conn, row)?);
        }
        Ok(meetings)
    }

    fn delete_meeting(&self, id: MeetingId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM meetings WHERE meeting_uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::MeetingNotFound(id));
        }
        Ok(())
    }

    fn update_meeting_name(&self, id: MeetingId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE meeting_uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::MeetingNotFound(id));
        }
        Ok(())
    }

    fn update_location(&self, id: MeetingId, location: &Location) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET address = ?2,
                 has_work_order = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE meeting_uuid = ?1;",
            params![
                id.to_string(),
                location.address.as_str(),
                bool_to_int(location.has_work_order),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::MeetingNotFound(id));
        }
        Ok(())
    }

    fn replace_agenda(
        &self,
        id: MeetingId,
        start_time: StartTime,
        items: &[AgendaItem],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE meetings
             SET start_time = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE meeting_uuid = ?1;",
            params![id.to_string(), start_time.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::MeetingNotFound(id));
        }
        tx.execute(
            "DELETE FROM agenda_items WHERE meeting_uuid = ?1;",
            [id.to_string()],
        )?;
        write_agenda(&tx, id, items)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_participants(&self, id: MeetingId, participants: &[Participant]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        touch_roster(&tx, id)?;
        append_participants(&tx, id, participants)?;
        tx.commit()?;
        Ok(())
    }

    fn update_participant(&self, id: MeetingId, participant: &Participant) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        touch_roster(&tx, id)?;
        let changed = tx.execute(
            "UPDATE participants
             SET name = ?3,
                 dept = ?4
             WHERE meeting_uuid = ?1
               AND participant_uuid = ?2;",
            params![
                id.to_string(),
                participant.id.to_string(),
                participant.name.as_str(),
                participant.dept.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ParticipantNotFound(participant.id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_participant(&self, id: MeetingId, participant_id: ParticipantId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        touch_roster(&tx, id)?;
        let changed = tx.execute(
            "DELETE FROM participants
             WHERE meeting_uuid = ?1
               AND participant_uuid = ?2;",
            params![id.to_string(), participant_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::ParticipantNotFound(participant_id));
        }
        tx.commit()?;
        Ok(())
    }

    fn replace_grouping(&self, id: MeetingId, grouping: &GroupingResult) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE meetings
             SET groups_saved = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE meeting_uuid = ?1;",
            params![id.to_string(), bool_to_int(grouping.saved)],
        )?;
        if changed == 0 {
            return Err(RepoError::MeetingNotFound(id));
        }
        tx.execute("DELETE FROM groups WHERE meeting_uuid = ?1;", [id.to_string()])?;
        write_groups(&tx, id, &grouping.groups)?;
        tx.commit()?;
        Ok(())
    }

    fn set_grouping_saved(&self, id: MeetingId, saved: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET groups_saved = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE meeting_uuid = ?1;",
            params![id.to_string(), bool_to_int(saved)],
        )?;
        if changed == 0 {
            return Err(RepoError::MeetingNotFound(id));
        }
        Ok(())
    }
}

/// Bumps `updated_at` and drops the saved mark of a roster-changing write.
fn touch_roster(conn: &Connection, id: MeetingId) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE meetings
         SET groups_saved = 0,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE meeting_uuid = ?1;",
        [id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::MeetingNotFound(id));
    }
    Ok(())
}

fn write_agenda(conn: &Connection, id: MeetingId, items: &[AgendaItem]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO agenda_items (
            meeting_uuid,
            position,
            kind,
            title,
            owner,
            duration_minutes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?;
    for (position, item) in items.iter().enumerate() {
        stmt.execute(params![
            id.to_string(),
            position as i64,
            item.kind.as_str(),
            item.title.as_str(),
            item.owner.as_str(),
            item.duration_minutes,
        ])?;
    }
    Ok(())
}

fn append_participants(
    conn: &Connection,
    id: MeetingId,
    participants: &[Participant],
) -> RepoResult<()> {
    let base: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1
         FROM participants
         WHERE meeting_uuid = ?1;",
        [id.to_string()],
        |row| row.get(0),
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO participants (
            participant_uuid,
            meeting_uuid,
            position,
            name,
            dept
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
    )?;
    for (offset, participant) in participants.iter().enumerate() {
        stmt.execute(params![
            participant.id.to_string(),
            id.to_string(),
            base + offset as i64,
            participant.name.as_str(),
            participant.dept.as_str(),
        ])?;
    }
    Ok(())
}

fn write_groups(conn: &Connection, id: MeetingId, groups: &[Group]) -> RepoResult<()> {
    let mut group_stmt = conn.prepare(
        "INSERT INTO groups (
            group_uuid,
            meeting_uuid,
            position,
            name,
            leader_uuid
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
    )?;
    let mut member_stmt = conn.prepare(
        "INSERT INTO group_members (
            group_uuid,
            participant_uuid,
            position
        ) VALUES (?1, ?2, ?3);",
    )?;
    for (position, group) in groups.iter().enumerate() {
        group_stmt.execute(params![
            group.id.to_string(),
            id.to_string(),
            position as i64,
            group.name.as_str(),
            group.leader_id.map(|leader| leader.to_string()),
        ])?;
        for (member_position, member) in group.member_ids.iter().enumerate() {
            member_stmt.execute(params![
                group.id.to_string(),
                member.to_string(),
                member_position as i64,
            ])?;
        }
    }
    Ok(())
}

fn load_meeting(conn: &Connection, row: &Row<'_>) -> RepoResult<Meeting> {
    let id_text: String = row.get("meeting_uuid")?;
    let id = parse_uuid(&id_text, "meetings.meeting_uuid")?;

    let start_text: String = row.get("start_time")?;
    let start_time = start_text.parse::<StartTime>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid start time `{start_text}` in meetings.start_time"
        ))
    })?;

    Ok(Meeting {
        id,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        location: Location {
            address: row.get("address")?,
            has_work_order: int_to_bool(row.get("has_work_order")?, "meetings.has_work_order")?,
        },
        start_time,
        agenda_items: load_agenda(conn, id)?,
        participants: load_participants(conn, id)?,
        grouping: GroupingResult {
            groups: load_groups(conn, id)?,
            saved: int_to_bool(row.get("groups_saved")?, "meetings.groups_saved")?,
        },
    })
}

fn load_agenda(conn: &Connection, id: MeetingId) -> RepoResult<Vec<AgendaItem>> {
    let mut stmt = conn.prepare(
        "SELECT kind, title, owner, duration_minutes
         FROM agenda_items
         WHERE meeting_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let kind_text: String = row.get("kind")?;
        let kind = AgendaKind::parse(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid agenda kind `{kind_text}` in agenda_items.kind"
            ))
        })?;
        items.push(AgendaItem {
            kind,
            title: row.get("title")?,
            owner: row.get("owner")?,
            duration_minutes: row.get("duration_minutes")?,
        });
    }
    Ok(items)
}

fn load_participants(conn: &Connection, id: MeetingId) -> RepoResult<Vec<Participant>> {
    let mut stmt = conn.prepare(
        "SELECT participant_uuid, name, dept
         FROM participants
         WHERE meeting_uuid = ?1
         ORDER BY position ASC, participant_uuid ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut participants = Vec::new();
    while let Some(row) = rows.next()? {
        let pid_text: String = row.get("participant_uuid")?;
        participants.push(Participant {
            id: parse_uuid(&pid_text, "participants.participant_uuid")?,
            name: row.get("name")?,
            dept: row.get("dept")?,
        });
    }
    Ok(participants)
}

fn load_groups(conn: &Connection, id: MeetingId) -> RepoResult<Vec<Group>> {
    let mut stmt = conn.prepare(
        "SELECT group_uuid, name, leader_uuid
         FROM groups
         WHERE meeting_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut groups = Vec::new();
    while let Some(row) = rows.next()? {
        let group_text: String = row.get("group_uuid")?;
        let group_id = parse_uuid(&group_text, "groups.group_uuid")?;
        let leader_id = row
            .get::<_, Option<String>>("leader_uuid")?
            .map(|value| parse_uuid(&value, "groups.leader_uuid"))
            .transpose()?;
        groups.push(Group {
            id: group_id,
            name: row.get("name")?,
            leader_id,
            member_ids: load_member_ids(conn, group_id)?,
        });
    }
    Ok(groups)
}

fn load_member_ids(conn: &Connection, group_id: Uuid) -> RepoResult<Vec<ParticipantId>> {
    let mut stmt = conn.prepare(
        "SELECT participant_uuid
         FROM group_members
         WHERE group_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([group_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "group_members.participant_uuid")?);
    }
    Ok(ids)
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
