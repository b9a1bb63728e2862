//! Service-level tests against an in-memory store.

mod core;
mod recompute;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::store::{StoreConfig, WaitlistStore};
use super::{Notifier, WaitlistService, WAITLIST_POSITION_THRESHOLD};

fn setup_with_threshold(position_threshold: u64) -> Arc<WaitlistService> {
    let store = WaitlistStore::open(StoreConfig::in_memory(position_threshold))
        .expect("in-memory store");
    WaitlistService::new(Arc::new(store), Notifier::disabled())
}

fn setup() -> Arc<WaitlistService> {
    setup_with_threshold(WAITLIST_POSITION_THRESHOLD)
}

/// Poll until at least `n` recomputes have run, or panic after ~1s.
async fn wait_for_recomputes(service: &WaitlistService, n: u64) {
    for _ in 0..200 {
        if service.metrics.recomputes.load(Ordering::Relaxed) >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("recompute queue did not drain in time");
}
