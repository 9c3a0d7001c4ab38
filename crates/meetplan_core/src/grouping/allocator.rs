//! Balanced group allocator.
//!
//! # Responsibility
//! - Split a roster into N groups whose occupied sizes differ by at most one.
//! - Spread departments across groups as evenly as size balance allows.
//! - Carry leaders over from a previous partition by group position.
//!
//! # Invariants
//! - Leaders plus members of the result cover the roster exactly once.
//! - The requested group count is clamped to the roster size, never raised.
//! - Ties on size and department resolve to the lowest group index; the
//!   upstream shuffle is the only source of randomness.

use crate::model::group::Group;
use crate::model::participant::{Participant, ParticipantId};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound accepted for the requested group count.
pub const MAX_GROUP_COUNT: u32 = 100;

/// Reasons an allocation request is rejected before any work is done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllocationError {
    /// The roster has no participants.
    EmptyRoster,
    /// Requested count is not an integer in `1..=MAX_GROUP_COUNT`.
    InvalidGroupCount(f64),
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRoster => write!(f, "roster is empty; add participants before grouping"),
            Self::InvalidGroupCount(value) => write!(
                f,
                "invalid group count {value}; expected an integer between 1 and {MAX_GROUP_COUNT}"
            ),
        }
    }
}

impl Error for AllocationError {}

/// Output of one allocation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Groups in index order.
    pub groups: Vec<Group>,
    /// Effective group count after clamping.
    pub group_count: usize,
    /// Whether the requested count exceeded the roster size.
    pub clamped: bool,
}

/// Checks that `requested` is an integer in `1..=MAX_GROUP_COUNT`.
pub fn validate_group_count(requested: f64) -> Result<usize, AllocationError> {
    if !requested.is_finite()
        || requested.fract() != 0.0
        || requested < 1.0
        || requested > f64::from(MAX_GROUP_COUNT)
    {
        return Err(AllocationError::InvalidGroupCount(requested));
    }
    Ok(requested as usize)
}

/// Allocates groups using the thread-local RNG.
///
/// See [`allocate_with_rng`].
pub fn allocate(
    roster: &[Participant],
    requested_group_count: f64,
    prior_groups: &[Group],
) -> Result<Allocation, AllocationError> {
    allocate_with_rng(
        roster,
        requested_group_count,
        prior_groups,
        &mut rand::rng(),
    )
}

/// Partitions `roster` into balanced groups.
///
/// Leaders of `prior_groups` are pinned into the group at the same index when
/// they are still on the roster. Every other participant is shuffled and then
/// placed greedily: smallest occupied size first, then fewest colleagues from
/// the same department, then lowest index.
///
/// # Errors
/// - `EmptyRoster` when `roster` is empty (checked first).
/// - `InvalidGroupCount` when `requested_group_count` is out of range.
pub fn allocate_with_rng<R: Rng + ?Sized>(
    roster: &[Participant],
    requested_group_count: f64,
    prior_groups: &[Group],
    rng: &mut R,
) -> Result<Allocation, AllocationError> {
    if roster.is_empty() {
        return Err(AllocationError::EmptyRoster);
    }
    let requested = validate_group_count(requested_group_count)?;
    let group_count = requested.min(roster.len());

    let by_id: HashMap<ParticipantId, &Participant> = roster.iter().map(|p| (p.id, p)).collect();
    let mut pinned: HashSet<ParticipantId> = HashSet::new();
    let mut groups: Vec<Group> = (0..group_count)
        .map(|index| {
            let mut group = Group::new(format!("Group {}", index + 1));
            group.leader_id = prior_groups
                .get(index)
                .and_then(|prior| prior.leader_id)
                .filter(|leader| by_id.contains_key(leader) && pinned.insert(*leader));
            group
        })
        .collect();

    let mut dept_counts: Vec<HashMap<&str, usize>> = groups
        .iter()
        .map(|group| {
            let mut counts = HashMap::new();
            if let Some(leader) = group.leader_id.and_then(|id| by_id.get(&id).copied()) {
                counts.insert(leader.dept_key(), 1);
            }
            counts
        })
        .collect();

    let mut assignable: Vec<&Participant> = roster
        .iter()
        .filter(|p| !pinned.contains(&p.id))
        .collect();
    assignable.shuffle(rng);

    for participant in assignable {
        let dept = participant.dept_key();
        let min_size = groups.iter().map(Group::occupied_size).min().unwrap_or(0);
        let chosen = groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.occupied_size() == min_size)
            .min_by_key(|(index, _)| dept_counts[*index].get(dept).copied().unwrap_or(0))
            .map(|(index, _)| index);

        if let Some(index) = chosen {
            groups[index].member_ids.push(participant.id);
            *dept_counts[index].entry(dept).or_insert(0) += 1;
        }
    }

    debug!(
        "event=groups_allocate module=grouping status=ok roster_size={} requested={} group_count={} pinned_leaders={}",
        roster.len(),
        requested,
        group_count,
        pinned.len()
    );

    Ok(Allocation {
        groups,
        group_count,
        clamped: group_count < requested,
    })
}
