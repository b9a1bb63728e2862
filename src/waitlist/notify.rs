//! Outbound email dispatch.
//!
//! Notifications are strictly best-effort: every send runs on a spawned
//! task after the triggering transaction has committed, and a failure is
//! logged and counted, never propagated. Ranking correctness does not
//! depend on delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, warn};

struct Inner {
    client: reqwest::Client,
    /// Mail API endpoint; `None` disables dispatch entirely.
    endpoint: Option<String>,
    api_key: Option<String>,
    from: String,
    sent: AtomicU64,
    failed: AtomicU64,
}

/// Handle to the mail sender. Cheap to clone; all clones share counters
/// and the underlying HTTP client.
#[derive(Clone)]
pub struct Notifier(Arc<Inner>);

impl Notifier {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Notifier(Arc::new(Inner {
            client,
            endpoint,
            api_key,
            from,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }))
    }

    /// A notifier that never sends anything. Used in tests and when no
    /// mail endpoint is configured.
    pub fn disabled() -> Self {
        Self::new(None, None, String::new())
    }

    pub fn sent(&self) -> u64 {
        self.0.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.0.failed.load(Ordering::Relaxed)
    }

    /// Welcome email after a successful signup.
    pub fn welcome(&self, email: &str, name: &str) {
        self.send(
            email,
            "You're on the waitlist!",
            &format!(
                "Hi {name}, you're on the list. Share your referral code \
                 with friends to move up!"
            ),
        );
    }

    /// Position-change email after a recompute.
    pub fn position_updated(&self, email: &str, position: i64) {
        self.send(
            email,
            "Your Waitlist Position Has Changed!",
            &format!(
                "Great news! Your position has been updated to {position}. \
                 Keep referring friends to move up the list!"
            ),
        );
    }

    /// Fire one message in the background using the shared client.
    fn send(&self, to: &str, subject: &str, body: &str) {
        let Some(endpoint) = self.0.endpoint.clone() else {
            debug!(to, subject, "Mail endpoint not configured, skipping send");
            return;
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.0.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let inner = Arc::clone(&self.0);
        let to = to.to_string();

        tokio::spawn(async move {
            let mut req = inner.client.post(&endpoint).json(&payload);
            if let Some(ref key) = inner.api_key {
                req = req.bearer_auth(key);
            }

            let success = match req.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        true
                    } else {
                        warn!(to = %to, status = %response.status(), "Mail request rejected");
                        false
                    }
                }
                Err(e) => {
                    error!(to = %to, error = %e, "Mail request error");
                    false
                }
            };

            if success {
                inner.sent.fetch_add(1, Ordering::Relaxed);
            } else {
                inner.failed.fetch_add(1, Ordering::Relaxed);
            }
        });
    }
}
