//! Coalescing position-recompute queue.
//!
//! State machine: Idle -> Draining -> Idle, never two concurrent drains.
//! `enqueue_position_update` adds an id to the pending set (duplicates
//! collapse) and spawns a drain when idle. Each drain snapshots and clears
//! the set, recomputes every id in the batch inside its own transaction,
//! then releases the flag - re-arming itself if ids arrived mid-batch, so
//! nothing enqueued during a drain is ever dropped.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::error;

use super::WaitlistService;

impl WaitlistService {
    /// Queue an entry for position recomputation.
    pub(crate) fn enqueue_position_update(self: &Arc<Self>, entry_id: i64) {
        self.pending.lock().insert(entry_id);

        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let service = Arc::clone(self);
            tokio::spawn(async move {
                service.drain_position_updates().await;
            });
        }
    }

    /// Drain pending recomputes until the set stays empty.
    async fn drain_position_updates(self: Arc<Self>) {
        loop {
            let batch: Vec<i64> = {
                let mut pending = self.pending.lock();
                pending.drain().collect()
            };

            // Test hook: parking here, between the snapshot and the batch
            // processing, lets tests enqueue ids mid-drain.
            #[cfg(test)]
            {
                let delay = self.drain_delay_ms.load(Ordering::Relaxed);
                if delay > 0 {
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                }
            }

            if !batch.is_empty() {
                self.metrics.record_batch();
                for entry_id in batch {
                    match self.store.recompute_position(entry_id) {
                        Ok(outcome) => {
                            self.metrics.record_recompute();
                            // Notification only after the commit, and only
                            // when a position was actually assigned.
                            if let Some((email, position)) = outcome {
                                self.notifier.position_updated(&email, position);
                            }
                        }
                        Err(e) => {
                            error!(entry_id, error = %e, "Position recompute failed");
                        }
                    }
                }
            }

            // Release the flag, then re-check: an id enqueued after the
            // snapshot either lands before this store (we loop) or its
            // enqueue sees Idle and spawns the next drain itself.
            self.draining.store(false, Ordering::Release);
            if self.pending.lock().is_empty() {
                break;
            }
            if self
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                break;
            }
        }
    }
}
