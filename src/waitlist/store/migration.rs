//! Database migrations.

use rusqlite::Connection;
use tracing::info;

/// Run all migrations that have not been applied yet.
pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let applied: Vec<String> = {
        let mut stmt = conn.prepare("SELECT name FROM migrations")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.filter_map(|r| r.ok()).collect()
    };

    let mut applied_count = 0;

    if !applied.contains(&"001_create_waitlist".to_string()) {
        conn.execute_batch(
            "CREATE TABLE waitlist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                position INTEGER,
                referral_code TEXT NOT NULL UNIQUE,
                referred_by TEXT,
                referral_count INTEGER NOT NULL DEFAULT 0,
                points_earned INTEGER NOT NULL DEFAULT 0,
                milestones TEXT NOT NULL DEFAULT '[]',
                last_position_update INTEGER,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX idx_waitlist_referred_by ON waitlist(referred_by);
            CREATE INDEX idx_waitlist_created_at ON waitlist(created_at);

            INSERT INTO migrations (name, applied_at)
            VALUES ('001_create_waitlist', strftime('%s', 'now'));
            ",
        )?;
        applied_count += 1;
    }

    if applied_count > 0 {
        info!(count = applied_count, "Applied migrations");
    }

    Ok(())
}
