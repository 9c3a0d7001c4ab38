//! Meeting domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the meeting aggregate as the single owner of roster and groups.
//!
//! # Invariants
//! - Meetings, participants and groups are identified by stable UUIDs.

pub mod agenda;
pub mod group;
pub mod meeting;
pub mod participant;
