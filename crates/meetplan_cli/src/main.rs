//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `meetplan_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("meetplan_core ping={}", meetplan_core::ping());
    println!("meetplan_core version={}", meetplan_core::core_version());
    println!("meetplan_core max_groups={}", meetplan_core::MAX_GROUP_COUNT);
}
