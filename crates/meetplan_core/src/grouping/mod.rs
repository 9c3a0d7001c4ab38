//! Participant grouping.
//!
//! # Responsibility
//! - Partition a roster into balanced groups (`allocator`).
//! - Apply user edits to an existing partition (`edit`).
//!
//! # Invariants
//! - Allocation is pure: inputs are borrowed and never mutated.
//! - Edits referencing unknown groups are no-ops, never errors.

pub mod allocator;
pub mod edit;

pub use allocator::{
    allocate, allocate_with_rng, validate_group_count, Allocation, AllocationError,
    MAX_GROUP_COUNT,
};
