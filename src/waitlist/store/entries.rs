//! Row operations for the waitlist table.
//!
//! Transaction boundaries live here: creation (with the one-time
//! threshold-crossing backfill), referral credits, points updates and the
//! two recompute paths each commit or roll back as a unit.

use rusqlite::{params, Connection, OptionalExtension};

use crate::waitlist::position::{self, RankInput};
use crate::waitlist::{Entry, WaitlistError};

const ENTRY_COLUMNS: &str = "id, name, email, position, referral_code, referred_by, \
     referral_count, points_earned, milestones, last_position_update, created_at";

/// Fields supplied at signup.
pub struct NewEntry<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub referral_code: &'a str,
    pub referred_by: Option<&'a str>,
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<Entry, rusqlite::Error> {
    let milestones_raw: String = row.get(8)?;
    Ok(Entry {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        position: row.get(3)?,
        referral_code: row.get(4)?,
        referred_by: row.get(5)?,
        referral_count: row.get::<_, i64>(6)? as u32,
        points_earned: row.get::<_, i64>(7)? as u32,
        milestones: serde_json::from_str(&milestones_raw).unwrap_or_default(),
        last_position_update: row.get::<_, Option<i64>>(9)?.map(|v| v as u64),
        created_at: row.get::<_, i64>(10)? as u64,
    })
}

fn milestones_json(milestones: &[String]) -> String {
    serde_json::to_string(milestones).unwrap_or_else(|_| "[]".to_string())
}

pub fn create(
    conn: &Connection,
    new: NewEntry<'_>,
    threshold: u64,
    now: u64,
) -> Result<Entry, WaitlistError> {
    let tx = conn.unchecked_transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM waitlist WHERE email = ?1)",
        params![new.email],
        |row| row.get(0),
    )?;
    if exists {
        // Dropping the transaction rolls back; nothing was written.
        return Err(WaitlistError::DuplicateEmail);
    }

    let population = count(&tx)? + 1;
    let position = if population >= threshold {
        Some(population as i64)
    } else {
        None
    };

    tx.execute(
        "INSERT INTO waitlist (name, email, position, referral_code, referred_by, milestones, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6)",
        params![
            new.name,
            new.email,
            position,
            new.referral_code,
            new.referred_by,
            now as i64
        ],
    )?;
    let id = tx.last_insert_rowid();

    // Threshold crossing: the first positioned insert backfills sequential
    // positions (by creation order) onto every still-unpositioned entry.
    // Touching only NULL positions keeps a retry from double-assigning.
    if position.is_some() {
        assign_missing_positions(&tx, now)?;
    }

    tx.commit()?;

    Ok(Entry {
        id,
        name: new.name.to_string(),
        email: new.email.to_string(),
        position,
        referral_code: new.referral_code.to_string(),
        referred_by: new.referred_by.map(str::to_string),
        referral_count: 0,
        points_earned: 0,
        milestones: Vec::new(),
        last_position_update: None,
        created_at: now,
    })
}

/// Assign each unpositioned entry its 1-based rank over
/// `(created_at ASC, id ASC)`. No-op once every entry has a position.
pub fn assign_missing_positions(conn: &Connection, now: u64) -> Result<u64, WaitlistError> {
    let changed = conn.execute(
        "UPDATE waitlist SET
            position = (SELECT COUNT(*) FROM waitlist w2
                        WHERE w2.created_at < waitlist.created_at
                           OR (w2.created_at = waitlist.created_at AND w2.id <= waitlist.id)),
            last_position_update = ?1
         WHERE position IS NULL",
        params![now as i64],
    )?;
    Ok(changed as u64)
}

pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<Entry>, WaitlistError> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM waitlist WHERE email = ?1"),
            params![email],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Entry>, WaitlistError> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM waitlist WHERE id = ?1"),
            params![id],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

pub fn get_by_referral_code(conn: &Connection, code: &str) -> Result<Option<Entry>, WaitlistError> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM waitlist WHERE referral_code = ?1"),
            params![code],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

pub fn count(conn: &Connection) -> Result<u64, WaitlistError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM waitlist", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn count_referred_by(conn: &Connection, code: &str) -> Result<u64, WaitlistError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM waitlist WHERE referred_by = ?1",
        params![code],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// All entries, newest first, with `referral_count` computed from the
/// `referred_by` linkage rather than the stored counter.
pub fn list_entries(conn: &Connection) -> Result<Vec<Entry>, WaitlistError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, position, referral_code, referred_by,
                (SELECT COUNT(*) FROM waitlist r WHERE r.referred_by = w.referral_code),
                points_earned, milestones, last_position_update, created_at
         FROM waitlist w
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], row_to_entry)?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

pub fn update_points_and_milestones(
    conn: &Connection,
    id: i64,
    points_delta: u32,
    milestone: Option<&str>,
) -> Result<bool, WaitlistError> {
    let tx = conn.unchecked_transaction()?;

    let row = tx
        .query_row(
            "SELECT points_earned, milestones FROM waitlist WHERE id = ?1",
            params![id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((points, milestones_raw)) = row else {
        return Ok(false);
    };

    let mut milestones: Vec<String> = serde_json::from_str(&milestones_raw).unwrap_or_default();
    if let Some(m) = milestone {
        if !milestones.iter().any(|existing| existing == m) {
            milestones.push(m.to_string());
        }
    }

    tx.execute(
        "UPDATE waitlist SET points_earned = ?1, milestones = ?2 WHERE id = ?3",
        params![
            points + points_delta as i64,
            milestones_json(&milestones),
            id
        ],
    )?;
    tx.commit()?;
    Ok(true)
}

pub fn increment_referral(
    conn: &Connection,
    id: i64,
    points: u32,
    milestone: Option<&str>,
) -> Result<bool, WaitlistError> {
    let tx = conn.unchecked_transaction()?;

    let row = tx
        .query_row(
            "SELECT referral_count, points_earned, milestones FROM waitlist WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    let Some((referral_count, points_earned, milestones_raw)) = row else {
        return Ok(false);
    };

    let mut milestones: Vec<String> = serde_json::from_str(&milestones_raw).unwrap_or_default();
    if let Some(m) = milestone {
        if !milestones.iter().any(|existing| existing == m) {
            milestones.push(m.to_string());
        }
    }

    tx.execute(
        "UPDATE waitlist SET referral_count = ?1, points_earned = ?2, milestones = ?3
         WHERE id = ?4",
        params![
            referral_count + 1,
            points_earned + points as i64,
            milestones_json(&milestones),
            id
        ],
    )?;
    tx.commit()?;
    Ok(true)
}

pub fn update_position(
    conn: &Connection,
    id: i64,
    position: i64,
    now: u64,
) -> Result<(), WaitlistError> {
    conn.execute(
        "UPDATE waitlist SET position = ?1, last_position_update = ?2 WHERE id = ?3",
        params![position, now as i64, id],
    )?;
    Ok(())
}

fn rank_inputs(conn: &Connection) -> Result<Vec<RankInput>, WaitlistError> {
    let mut stmt = conn.prepare("SELECT id, created_at, points_earned FROM waitlist")?;
    let rows = stmt.query_map([], |row| {
        Ok(RankInput {
            id: row.get(0)?,
            created_at: row.get::<_, i64>(1)? as u64,
            points_earned: row.get::<_, i64>(2)? as u32,
        })
    })?;
    let mut inputs = Vec::new();
    for row in rows {
        inputs.push(row?);
    }
    Ok(inputs)
}

/// Re-rank a single entry against the whole population and persist its new
/// position. Leaves positions untouched while the population is below the
/// threshold so no entry is positioned before the crossing.
pub fn recompute_position(
    conn: &Connection,
    id: i64,
    threshold: u64,
    now: u64,
) -> Result<Option<(String, i64)>, WaitlistError> {
    let tx = conn.unchecked_transaction()?;

    let row = tx
        .query_row(
            "SELECT email, created_at, points_earned FROM waitlist WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as u64,
                    row.get::<_, i64>(2)? as u32,
                ))
            },
        )
        .optional()?;
    let Some((email, created_at, points_earned)) = row else {
        return Ok(None);
    };

    let population = rank_inputs(&tx)?;
    if (population.len() as u64) < threshold {
        return Ok(None);
    }

    let target = RankInput {
        id,
        created_at,
        points_earned,
    };
    let new_position = position::rank_of(&target, &population);

    update_position(&tx, id, new_position, now)?;
    tx.commit()?;
    Ok(Some((email, new_position)))
}

/// Exact full-population renumber: positions 1..N by rank-key order.
pub fn recompute_all(conn: &Connection, threshold: u64, now: u64) -> Result<u64, WaitlistError> {
    let tx = conn.unchecked_transaction()?;

    let mut population = rank_inputs(&tx)?;
    if (population.len() as u64) < threshold {
        return Ok(0);
    }
    population.sort_unstable_by(position::cmp);

    for (index, input) in population.iter().enumerate() {
        update_position(&tx, input.id, index as i64 + 1, now)?;
    }

    let updated = population.len() as u64;
    tx.commit()?;
    Ok(updated)
}
