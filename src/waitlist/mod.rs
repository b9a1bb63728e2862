//! Waitlist core - entry storage, points, and position ranking.
//!
//! ## Module Organization
//!
//! - `service.rs` - WaitlistService, the engine object handlers talk to
//! - `store/` - SQLite entry store (migrations, transactional row ops)
//! - `position.rs` - pure rank-key calculator
//! - `recompute.rs` - coalescing single-flight position recomputation
//! - `notify.rs` - fire-and-forget outbound email dispatch
//! - `entry.rs` / `error.rs` / `validation.rs` / `metrics.rs` - support types

mod entry;
mod error;
mod metrics;
mod notify;
pub mod position;
mod recompute;
mod service;
pub mod store;
mod validation;

#[cfg(test)]
mod tests;

pub use entry::{milestones, Entry};
pub use error::WaitlistError;
pub use metrics::{StatsSnapshot, WaitlistMetrics};
pub use notify::Notifier;
pub use service::{CreatedEntry, PositionInfo, WaitlistService};

/// Population size at which positions are first assigned.
pub const WAITLIST_POSITION_THRESHOLD: u64 = 150;

/// Points granted to a referrer per successful referral.
pub const REFERRAL_POINTS: u32 = 100;

/// Points granted for sharing the waitlist on social media.
pub const SOCIAL_SHARE_POINTS: u32 = 50;

/// One-time bonus for named milestone crossings.
pub const MILESTONE_POINTS: u32 = 200;
