//! Waitlist entry record and milestone identifiers.

use serde::Serialize;

/// One waitlist participant.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// 1-based queue position; `None` until the waitlist reaches the
    /// population threshold. Lower = closer to the front.
    pub position: Option<i64>,
    pub referral_code: String,
    /// Referral code of the entry that referred this one. Informational,
    /// not enforced as a foreign key.
    pub referred_by: Option<String>,
    pub referral_count: u32,
    pub points_earned: u32,
    /// Milestone identifiers already awarded; each appears at most once.
    pub milestones: Vec<String>,
    /// Millisecond timestamp of the last position recompute.
    pub last_position_update: Option<u64>,
    /// Millisecond creation timestamp; the base ordering key.
    pub created_at: u64,
}

/// Milestone identifiers. Each is awarded at most once per entry.
pub mod milestones {
    pub const EARLY_BIRD: &str = "early_bird";
    pub const FIRST_REFERRAL: &str = "first_referral";
    pub const FIVE_REFERRALS: &str = "five_referrals";
    pub const TEN_REFERRALS: &str = "ten_referrals";
    pub const TOP_HUNDRED: &str = "top_hundred";
}
