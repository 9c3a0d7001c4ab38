//! Agenda model and time-slot scheduling.
//!
//! # Responsibility
//! - Define agenda rows and the meeting start time.
//! - Derive consecutive wall-clock slots from durations.
//!
//! # Invariants
//! - Durations are within `0..=MAX_DURATION_MINUTES` and multiples of
//!   `DURATION_STEP_MINUTES`.
//! - Slot times wrap at midnight; they never fail.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MAX_DURATION_MINUTES: u32 = 120;
pub const DURATION_STEP_MINUTES: u32 = 10;
pub const DEFAULT_DURATION_MINUTES: u32 = 30;
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Agenda validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    /// Start time text is not a valid `HH:MM` value.
    InvalidStartTime(String),
    /// Duration is out of range or not on a 10-minute step.
    InvalidDuration(u32),
}

impl Display for AgendaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStartTime(value) => {
                write!(f, "invalid start time `{value}`; expected HH:MM")
            }
            Self::InvalidDuration(value) => write!(
                f,
                "invalid duration {value} minutes; expected 0-{MAX_DURATION_MINUTES} in steps of {DURATION_STEP_MINUTES}"
            ),
        }
    }
}

impl Error for AgendaError {}

/// Agenda row category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaKind {
    Opening,
    Import,
    Discuss,
    Lunch,
    Converge,
}

impl AgendaKind {
    /// Stable storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Import => "import",
            Self::Discuss => "discuss",
            Self::Lunch => "lunch",
            Self::Converge => "converge",
        }
    }

    /// Parses a storage/wire label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "opening" => Some(Self::Opening),
            "import" => Some(Self::Import),
            "discuss" => Some(Self::Discuss),
            "lunch" => Some(Self::Lunch),
            "converge" => Some(Self::Converge),
            _ => None,
        }
    }
}

/// One agenda row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub kind: AgendaKind,
    pub title: String,
    /// Person responsible for this slot.
    pub owner: String,
    pub duration_minutes: u32,
}

impl Default for AgendaItem {
    fn default() -> Self {
        Self {
            kind: AgendaKind::Discuss,
            title: String::new(),
            owner: String::new(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl AgendaItem {
    pub fn new(
        kind: AgendaKind,
        title: impl Into<String>,
        owner: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            owner: owner.into(),
            duration_minutes,
        }
    }

    /// Validates the duration constraint.
    pub fn validate(&self) -> Result<(), AgendaError> {
        if self.duration_minutes > MAX_DURATION_MINUTES
            || self.duration_minutes % DURATION_STEP_MINUTES != 0
        {
            return Err(AgendaError::InvalidDuration(self.duration_minutes));
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        self.title.is_empty() && self.owner.is_empty() && self.duration_minutes == 0
    }
}

/// Wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StartTime {
    minutes: u32,
}

impl StartTime {
    /// Meeting start used when none is provided.
    pub const DEFAULT: StartTime = StartTime { minutes: 9 * 60 };

    /// Builds a time from hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, AgendaError> {
        if hour > 23 || minute > 59 {
            return Err(AgendaError::InvalidStartTime(format!("{hour}:{minute}")));
        }
        Ok(Self {
            minutes: hour * 60 + minute,
        })
    }

    /// Parses `HH:MM`; blank input yields [`StartTime::DEFAULT`].
    pub fn parse_or_default(value: &str) -> Result<Self, AgendaError> {
        if value.trim().is_empty() {
            return Ok(Self::DEFAULT);
        }
        value.parse()
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u32 {
        self.minutes
    }

    fn wrapping_from_minutes(total: u32) -> Self {
        Self {
            minutes: total % MINUTES_PER_DAY,
        }
    }
}

impl Default for StartTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for StartTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl FromStr for StartTime {
    type Err = AgendaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || AgendaError::InvalidStartTime(value.to_string());
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for StartTime {
    type Error = AgendaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StartTime> for String {
    fn from(value: StartTime) -> Self {
        value.to_string()
    }
}

/// Agenda row with its computed time slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAgendaItem {
    pub item: AgendaItem,
    pub begin: StartTime,
    pub end: StartTime,
    /// `HH:MM - HH:MM`, or empty for zero-length rows.
    pub time_text: String,
}

/// Lays agenda rows out back to back from `start`.
pub fn schedule(start: StartTime, items: &[AgendaItem]) -> Vec<ScheduledAgendaItem> {
    let mut cursor = start.minutes();
    items
        .iter()
        .map(|item| {
            // Both operands stay below one day, so the sum cannot overflow.
            let begin = cursor;
            let end = (begin + item.duration_minutes % MINUTES_PER_DAY) % MINUTES_PER_DAY;
            cursor = end;

            let begin = StartTime::wrapping_from_minutes(begin);
            let end = StartTime::wrapping_from_minutes(end);
            let time_text = if item.duration_minutes > 0 {
                format!("{begin} - {end}")
            } else {
                String::new()
            };
            ScheduledAgendaItem {
                item: item.clone(),
                begin,
                end,
                time_text,
            }
        })
        .collect()
}

/// Trims text fields and drops rows that carry no information.
pub fn normalize_agenda(items: Vec<AgendaItem>) -> Vec<AgendaItem> {
    items
        .into_iter()
        .map(|item| AgendaItem {
            title: item.title.trim().to_string(),
            owner: item.owner.trim().to_string(),
            ..item
        })
        .filter(|item| !item.is_blank())
        .collect()
}

/// Moves the row at `from` to index `to`.
///
/// Returns `false` without touching `items` when either index is out of range.
pub fn reorder(items: &mut Vec<AgendaItem>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let moved = items.remove(from);
    items.insert(to, moved);
    true
}
