//! WaitlistService - the engine object handlers talk to.
//!
//! One constructed instance owns the store handle, the notifier, the
//! aggregate counters and the recomputation queue state; callers receive
//! an `Arc<WaitlistService>` (no global accessor).

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
#[cfg(test)]
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::store::{NewEntry, WaitlistStore};
use super::validation::{validate_email, validate_name};
use super::{
    milestones, Entry, Notifier, StatsSnapshot, WaitlistError, WaitlistMetrics, MILESTONE_POINTS,
    REFERRAL_POINTS, SOCIAL_SHARE_POINTS,
};

/// Response payload for a successful signup.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEntry {
    pub id: i64,
    pub position: Option<i64>,
    pub referral_code: String,
    /// Total entries after this signup.
    pub total: u64,
}

/// Response payload for a position lookup.
#[derive(Debug, Clone, Serialize)]
pub struct PositionInfo {
    pub position: Option<i64>,
    pub total: u64,
    pub referral_code: String,
    pub referral_count: u64,
    pub points_earned: u32,
    pub milestones: Vec<String>,
}

pub struct WaitlistService {
    pub(crate) store: Arc<WaitlistStore>,
    pub(crate) notifier: Notifier,
    pub(crate) metrics: WaitlistMetrics,
    /// Entry ids awaiting a position recompute. Inserting twice before a
    /// drain coalesces into one pass.
    pub(crate) pending: Mutex<HashSet<i64>>,
    /// Single-flight guard: at most one drain cycle at a time.
    pub(crate) draining: AtomicBool,
    /// Artificial per-cycle delay for drain-race tests.
    #[cfg(test)]
    pub(crate) drain_delay_ms: AtomicU64,
}

impl WaitlistService {
    pub fn new(store: Arc<WaitlistStore>, notifier: Notifier) -> Arc<Self> {
        Arc::new(Self {
            store,
            notifier,
            metrics: WaitlistMetrics::new(),
            pending: Mutex::new(HashSet::new()),
            draining: AtomicBool::new(false),
            #[cfg(test)]
            drain_delay_ms: AtomicU64::new(0),
        })
    }

    // ============== Signup & Lookup ==============

    /// Validate input, create the entry, credit the referrer and send the
    /// welcome email. The entry creation (including any threshold-crossing
    /// backfill) commits before the referrer is credited, so a referral
    /// failure can never roll back a signup.
    pub fn create_entry(
        self: &Arc<Self>,
        name: &str,
        email: &str,
        referred_by: Option<&str>,
    ) -> Result<CreatedEntry, WaitlistError> {
        validate_name(name)?;
        validate_email(email)?;

        let referral_code = generate_referral_code();
        let entry = self.store.create(NewEntry {
            name: name.trim(),
            email,
            referral_code: &referral_code,
            referred_by,
        })?;
        let total = self.store.count()?;
        self.metrics.record_signup();
        info!(entry_id = entry.id, total, "Waitlist signup");

        if let Some(code) = referred_by {
            if let Err(e) = self.process_referral(code) {
                warn!(code, error = %e, "Referral credit failed");
            }
        }

        self.notifier.welcome(email, name.trim());

        Ok(CreatedEntry {
            id: entry.id,
            position: entry.position,
            referral_code: entry.referral_code,
            total,
        })
    }

    /// Position payload for one email, or `NotFound`.
    pub fn get_position(&self, email: &str) -> Result<PositionInfo, WaitlistError> {
        let entry = self.entry_by_email(email)?;
        let total = self.store.count()?;
        let referral_count = self.store.count_referred_by(&entry.referral_code)?;

        Ok(PositionInfo {
            position: entry.position,
            total,
            referral_code: entry.referral_code,
            referral_count,
            points_earned: entry.points_earned,
            milestones: entry.milestones,
        })
    }

    pub fn entry_by_email(&self, email: &str) -> Result<Entry, WaitlistError> {
        self.store
            .get_by_email(email)?
            .ok_or(WaitlistError::NotFound)
    }

    /// Admin list: all entries, newest first, with computed referral counts.
    pub fn list_entries(&self) -> Result<Vec<Entry>, WaitlistError> {
        self.store.list_entries()
    }

    // ============== Points & Milestones ==============

    /// Add points and optionally a milestone, then queue the entry for a
    /// position recompute. Re-awarding a milestone is a no-op for the
    /// milestone set but the points still accrue; callers guard against
    /// double-invoking non-idempotent grants. A missing entry is a no-op.
    pub fn award_points(
        self: &Arc<Self>,
        entry_id: i64,
        points: u32,
        milestone: Option<&str>,
    ) -> Result<(), WaitlistError> {
        let found = self
            .store
            .update_points_and_milestones(entry_id, points, milestone)?;
        if found {
            self.enqueue_position_update(entry_id);
        }
        Ok(())
    }

    /// Credit a referral to the owner of `referral_code`. An unknown code
    /// is silently ignored - stale links are expected. Referral milestones
    /// trigger on the count *before* the increment (the first referral at
    /// count 0, the fifth at 4, the tenth at 9).
    pub fn process_referral(self: &Arc<Self>, referral_code: &str) -> Result<(), WaitlistError> {
        let Some(referrer) = self.store.get_by_referral_code(referral_code)? else {
            return Ok(());
        };

        let milestone = referral_milestone(referrer.referral_count);
        let found = self
            .store
            .increment_referral(referrer.id, REFERRAL_POINTS, milestone)?;
        if found {
            self.metrics.record_referral();
            info!(
                entry_id = referrer.id,
                milestone = milestone.unwrap_or("none"),
                "Referral credited"
            );
            self.enqueue_position_update(referrer.id);
        }
        Ok(())
    }

    /// Social-share credit: points only, no milestone.
    pub fn record_social_share(self: &Arc<Self>, entry_id: i64) -> Result<(), WaitlistError> {
        self.metrics.record_social_share();
        self.award_points(entry_id, SOCIAL_SHARE_POINTS, None)
    }

    /// One-time bonus for a named milestone crossing (for example
    /// [`milestones::EARLY_BIRD`]). The milestone marker is deduplicated;
    /// the caller guards against invoking the bonus twice.
    pub fn award_milestone(
        self: &Arc<Self>,
        entry_id: i64,
        milestone: &str,
    ) -> Result<(), WaitlistError> {
        self.award_points(entry_id, MILESTONE_POINTS, Some(milestone))
    }

    // ============== Admin ==============

    /// Exact full-population renumber (1..N). Incremental updates between
    /// full passes are per-entry approximations; this restores strictly
    /// sequential positions.
    pub fn recompute_all(&self) -> Result<u64, WaitlistError> {
        let updated = self.store.recompute_all()?;
        if updated > 0 {
            info!(updated, "Full position recompute");
        }
        Ok(updated)
    }

    /// Aggregate counters for the admin dashboard.
    pub fn stats(&self) -> Result<StatsSnapshot, WaitlistError> {
        let total_entries = self.store.count()?;
        Ok(self.metrics.snapshot(
            total_entries,
            self.notifier.sent(),
            self.notifier.failed(),
        ))
    }
}

/// Milestone for the referral about to be credited, given the referrer's
/// count before the increment.
pub(crate) fn referral_milestone(count_before: u32) -> Option<&'static str> {
    match count_before {
        0 => Some(milestones::FIRST_REFERRAL),
        4 => Some(milestones::FIVE_REFERRALS),
        9 => Some(milestones::TEN_REFERRALS),
        _ => None,
    }
}

/// 8 uppercase hex chars, unique enough for a referral link.
fn generate_referral_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    uuid[..8].to_ascii_uppercase()
}
