//! SQLite entry store.
//!
//! Embedded persistence with:
//! - WAL mode for durability
//! - a single `Mutex<Connection>`; callers queue on the lock, so the lock
//!   doubles as the bound on in-flight transactions
//! - migrations tracked in a `migrations` table
//!
//! Every mutation that affects ranking runs inside a transaction; an error
//! rolls the whole transaction back. Connectivity is only retried at
//! startup ([`WaitlistStore::connect`]), never per call - per-call failures
//! surface as [`WaitlistError::StorageUnavailable`] and the caller decides
//! whether to retry.

mod entries;
mod migration;


use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{info, warn};

use super::{Entry, WaitlistError, WAITLIST_POSITION_THRESHOLD};

pub(crate) use entries::NewEntry;

/// Millisecond wall-clock timestamp.
#[inline(always)]
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database file path; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// Population size at which positions are first assigned.
    pub position_threshold: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("waitlist.db")),
            position_threshold: WAITLIST_POSITION_THRESHOLD,
        }
    }
}

impl StoreConfig {
    /// In-memory database, used by tests.
    pub fn in_memory(position_threshold: u64) -> Self {
        Self {
            path: None,
            position_threshold,
        }
    }
}

/// SQLite-backed waitlist entry store.
pub struct WaitlistStore {
    conn: Mutex<Connection>,
    position_threshold: u64,
}

impl WaitlistStore {
    /// Open the database, apply PRAGMAs and run migrations.
    pub fn open(config: StoreConfig) -> Result<Self, WaitlistError> {
        let conn = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).ok();
                    }
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;

        migration::migrate(&conn)?;

        match &config.path {
            Some(path) => info!(path = %path.display(), "SQLite initialized"),
            None => info!("SQLite initialized (in-memory)"),
        }

        Ok(Self {
            conn: Mutex::new(conn),
            position_threshold: config.position_threshold,
        })
    }

    /// Open with bounded retries. Only used at startup; per-call failures
    /// after this point are surfaced, not retried.
    pub async fn connect(
        config: StoreConfig,
        tries: u32,
        interval: Duration,
    ) -> Result<Self, WaitlistError> {
        let mut remaining = tries;
        loop {
            match Self::open(config.clone()) {
                Ok(store) => return Ok(store),
                Err(e) if remaining > 0 => {
                    warn!(
                        error = %e,
                        attempts_remaining = remaining,
                        "Failed to open store, retrying"
                    );
                    remaining -= 1;
                    tokio::time::sleep(interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn position_threshold(&self) -> u64 {
        self.position_threshold
    }

    // ============== Entry Operations ==============

    /// Create an entry. Decides the initial position (and runs the one-time
    /// threshold-crossing backfill) inside the same transaction.
    pub fn create(&self, new: NewEntry<'_>) -> Result<Entry, WaitlistError> {
        let conn = self.conn.lock();
        entries::create(&conn, new, self.position_threshold, now_ms())
    }

    pub fn get_by_email(&self, email: &str) -> Result<Option<Entry>, WaitlistError> {
        let conn = self.conn.lock();
        entries::get_by_email(&conn, email)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Entry>, WaitlistError> {
        let conn = self.conn.lock();
        entries::get_by_id(&conn, id)
    }

    pub fn get_by_referral_code(&self, code: &str) -> Result<Option<Entry>, WaitlistError> {
        let conn = self.conn.lock();
        entries::get_by_referral_code(&conn, code)
    }

    /// Total number of entries.
    pub fn count(&self) -> Result<u64, WaitlistError> {
        let conn = self.conn.lock();
        entries::count(&conn)
    }

    /// Number of entries whose `referred_by` equals the given code.
    pub fn count_referred_by(&self, code: &str) -> Result<u64, WaitlistError> {
        let conn = self.conn.lock();
        entries::count_referred_by(&conn, code)
    }

    /// All entries, creation-descending, with `referral_count` computed
    /// from the `referred_by` linkage.
    pub fn list_entries(&self) -> Result<Vec<Entry>, WaitlistError> {
        let conn = self.conn.lock();
        entries::list_entries(&conn)
    }

    // ============== Points & Position Operations ==============

    /// Add points and append a milestone if absent. Returns `false` when
    /// the entry does not exist (a no-op, not an error).
    pub fn update_points_and_milestones(
        &self,
        id: i64,
        points_delta: u32,
        milestone: Option<&str>,
    ) -> Result<bool, WaitlistError> {
        let conn = self.conn.lock();
        entries::update_points_and_milestones(&conn, id, points_delta, milestone)
    }

    /// One referral credit: `referral_count + 1`, points added, milestone
    /// appended if absent - all in one transaction.
    pub fn increment_referral(
        &self,
        id: i64,
        points: u32,
        milestone: Option<&str>,
    ) -> Result<bool, WaitlistError> {
        let conn = self.conn.lock();
        entries::increment_referral(&conn, id, points, milestone)
    }

    /// Set an entry's position and `last_position_update`.
    pub fn update_position(&self, id: i64, position: i64) -> Result<(), WaitlistError> {
        let conn = self.conn.lock();
        entries::update_position(&conn, id, position, now_ms())
    }

    /// Recompute one entry's position against the whole population.
    /// Returns the entry's email and new position for notification, or
    /// `None` when the entry is gone or the population is still below the
    /// threshold.
    pub fn recompute_position(&self, id: i64) -> Result<Option<(String, i64)>, WaitlistError> {
        let conn = self.conn.lock();
        entries::recompute_position(&conn, id, self.position_threshold, now_ms())
    }

    /// Full-population renumber to exact sequential positions 1..N.
    /// Idempotent: a second pass without intervening point changes assigns
    /// identical positions. Returns the number of entries updated.
    pub fn recompute_all(&self) -> Result<u64, WaitlistError> {
        let conn = self.conn.lock();
        entries::recompute_all(&conn, self.position_threshold, now_ms())
    }
}
