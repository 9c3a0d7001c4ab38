//! Roster entry parsing and attendance cross-check.
//!
//! # Responsibility
//! - Split batch name input into individual participant names.
//! - Compare the registered roster against names actually present.
//!
//! # Invariants
//! - Parsed names are trimmed and never empty.
//! - Attendance lists keep first-seen order and contain no duplicates.

use crate::model::participant::Participant;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NAME_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[、，,;；@\s]+").expect("valid name separator regex"));

/// Splits batch name input on list punctuation, `@` and whitespace.
pub fn parse_names(raw: &str) -> Vec<String> {
    NAME_SEPARATOR_RE
        .split(raw)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Result of comparing the roster against an attendance list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceReport {
    /// Registered but not present.
    pub missing: Vec<String>,
    /// Present but not registered.
    pub extra: Vec<String>,
}

impl AttendanceReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Diffs roster names against one name per line of `attendance_text`.
pub fn check_attendance(roster: &[Participant], attendance_text: &str) -> AttendanceReport {
    let expected = unique_in_order(roster.iter().map(|p| p.name.trim()));
    let actual = unique_in_order(attendance_text.lines().map(str::trim));

    let expected_set: HashSet<&str> = expected.iter().copied().collect();
    let actual_set: HashSet<&str> = actual.iter().copied().collect();

    AttendanceReport {
        missing: expected
            .iter()
            .filter(|name| !actual_set.contains(*name))
            .map(|name| name.to_string())
            .collect(),
        extra: actual
            .iter()
            .filter(|name| !expected_set.contains(*name))
            .map(|name| name.to_string())
            .collect(),
    }
}

fn unique_in_order<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{check_attendance, parse_names};
    use crate::model::participant::Participant;

    #[test]
    fn parse_names_splits_on_all_separators() {
        let names = parse_names("Ann、Bob，Cy,Dee;Eve；Fay@Gus Hal\nIvy\r\n\tJo  ");
        assert_eq!(
            names,
            ["Ann", "Bob", "Cy", "Dee", "Eve", "Fay", "Gus", "Hal", "Ivy", "Jo"]
        );
    }

    #[test]
    fn parse_names_returns_empty_for_separator_only_input() {
        assert!(parse_names(" ,,、 @ ").is_empty());
    }

    #[test]
    fn check_attendance_reports_missing_and_extra() {
        let roster = vec![
            Participant::new("Ann", "Ops"),
            Participant::new(" Bob ", "Ops"),
            Participant::new("Cy", "Eng"),
        ];
        let report = check_attendance(&roster, "Bob\n\n  Zed \nAnn\nZed\n");

        assert_eq!(report.missing, ["Cy"]);
        assert_eq!(report.extra, ["Zed"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn check_attendance_complete_when_lists_match() {
        let roster = vec![Participant::new("Ann", "Ops")];
        assert!(check_attendance(&roster, "Ann").is_complete());
    }
}
