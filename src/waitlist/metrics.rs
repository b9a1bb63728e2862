//! Aggregate counters for the admin dashboard.
//!
//! Atomic counters updated on the hot paths so stats queries never touch
//! the store beyond a row count.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct WaitlistMetrics {
    pub signups: AtomicU64,
    pub referrals: AtomicU64,
    pub social_shares: AtomicU64,
    pub recomputes: AtomicU64,
    pub recompute_batches: AtomicU64,
}

/// Point-in-time copy of the counters, plus the store's entry count.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_entries: u64,
    pub signups: u64,
    pub referrals: u64,
    pub social_shares: u64,
    pub recomputes: u64,
    pub recompute_batches: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
}

impl WaitlistMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_signup(&self) {
        self.signups.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_referral(&self) {
        self.referrals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_social_share(&self) {
        self.social_shares.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_recompute(&self) {
        self.recomputes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_batch(&self) {
        self.recompute_batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Notification counters live on the [`super::Notifier`], which is the
    /// component that actually observes send outcomes.
    pub fn snapshot(
        &self,
        total_entries: u64,
        notifications_sent: u64,
        notifications_failed: u64,
    ) -> StatsSnapshot {
        StatsSnapshot {
            total_entries,
            signups: self.signups.load(Ordering::Relaxed),
            referrals: self.referrals.load(Ordering::Relaxed),
            social_shares: self.social_shares.load(Ordering::Relaxed),
            recomputes: self.recomputes.load(Ordering::Relaxed),
            recompute_batches: self.recompute_batches.load(Ordering::Relaxed),
            notifications_sent,
            notifications_failed,
        }
    }
}
