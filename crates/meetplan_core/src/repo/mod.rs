//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for meetings.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`MeetingNotFound`,
//!   `ParticipantNotFound`) in addition to DB transport errors.

pub mod meeting_repo;
