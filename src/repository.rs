// src/repository.rs

use crate::models::{
    BucketMap, BucketNumber, Difficulty, Flashcard, PracticeRecord, ProgressStats,
    SessionHistory,
};
use log::debug;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

/// Reads a card from four consecutive columns (front, back, hint, tags)
/// starting at `first`.
fn card_from_row(row: &Row, first: usize) -> Result<Flashcard> {
    let tags_json: String = row.get(first + 3)?;
    let tags = serde_json::from_str(&tags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(first + 3, Type::Text, Box::new(e))
    })?;

    Ok(Flashcard {
        front: row.get(first)?,
        back: row.get(first + 1)?,
        hint: row.get(first + 2)?,
        tags,
    })
}

/// Registers a card. Existing cards (same front and back) are left as is.
pub fn upsert_card(conn: &Connection, card: &Flashcard) -> Result<()> {
    let tags = serde_json::to_string(&card.tags)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT OR IGNORE INTO cards (front, back, hint, tags) VALUES (?, ?, ?, ?)",
        params![card.front, card.back, card.hint, tags],
    )?;
    Ok(())
}

// --- Buckets ---

/// Snapshot of the current bucket mapping. Only occupied buckets appear.
pub fn load_buckets(conn: &Connection) -> Result<BucketMap> {
    let mut stmt = conn.prepare(
        "SELECT cb.bucket, c.front, c.back, c.hint, c.tags
         FROM card_buckets cb
         JOIN cards c ON c.id = cb.card_id
         ORDER BY cb.bucket",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, BucketNumber>(0)?, card_from_row(row, 1)?))
    })?;

    let mut buckets = BucketMap::new();
    for entry in rows {
        let (bucket, card) = entry?;
        buckets.entry(bucket).or_default().insert(card);
    }
    Ok(buckets)
}

/// Atomically swaps the stored mapping for `buckets`. Cards not seen
/// before are registered on the way.
pub fn replace_buckets(conn: &Connection, buckets: &BucketMap) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM card_buckets", [])?;

    let mut stmt = tx.prepare(
        "INSERT INTO card_buckets (card_id, bucket)
         SELECT id, ? FROM cards WHERE front = ? AND back = ?",
    )?;
    let mut placed = 0;
    for (bucket, cards) in buckets {
        for card in cards {
            upsert_card(&tx, card)?;
            stmt.execute(params![bucket, card.front, card.back])?;
            placed += 1;
        }
    }
    drop(stmt);
    tx.commit()?;

    debug!("[DB] Replaced bucket mapping ({} cards)", placed);
    Ok(())
}

/// Looks up a tracked card by front and back.
pub fn find_card(conn: &Connection, front: &str, back: &str) -> Result<Option<Flashcard>> {
    conn.query_row(
        "SELECT c.front, c.back, c.hint, c.tags
         FROM cards c
         JOIN card_buckets cb ON cb.card_id = c.id
         WHERE c.front = ? AND c.back = ?",
        params![front, back],
        |row| card_from_row(row, 0),
    )
    .optional()
}

pub fn find_card_bucket(conn: &Connection, front: &str, back: &str) -> Result<Option<BucketNumber>> {
    conn.query_row(
        "SELECT cb.bucket
         FROM card_buckets cb
         JOIN cards c ON c.id = cb.card_id
         WHERE c.front = ? AND c.back = ?",
        params![front, back],
        |row| row.get(0),
    )
    .optional()
}

// --- Day counter ---

pub fn get_current_day(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT current_day FROM app_state WHERE id = 1", [], |row| {
        row.get(0)
    })
}

/// Moves to the next day and returns it.
pub fn increment_day(conn: &Connection) -> Result<u32> {
    conn.execute(
        "UPDATE app_state SET current_day = current_day + 1 WHERE id = 1",
        [],
    )?;
    get_current_day(conn)
}

// --- Practice history ---

pub fn log_practice_record(conn: &Connection, record: &PracticeRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO practice_history (card_front, card_back, timestamp, difficulty, previous_bucket, new_bucket) VALUES (?, ?, ?, ?, ?, ?)",
        params![
            record.card_front,
            record.card_back,
            record.timestamp,
            record.difficulty,
            record.previous_bucket,
            record.new_bucket
        ],
    )?;
    Ok(())
}

pub fn get_history(conn: &Connection) -> Result<Vec<PracticeRecord>> {
    let mut stmt = conn.prepare(
        "SELECT card_front, card_back, timestamp, difficulty, previous_bucket, new_bucket
         FROM practice_history
         ORDER BY id",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(PracticeRecord {
                card_front: row.get(0)?,
                card_back: row.get(1)?,
                timestamp: row.get(2)?,
                difficulty: row.get(3)?,
                previous_bucket: row.get(4)?,
                new_bucket: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(records)
}

// --- Session ---

/// Stores the outcome of the latest answer for `card`, replacing any
/// earlier outcome in the same session.
pub fn record_outcome(
    conn: &Connection,
    card: &Flashcard,
    difficulty: Difficulty,
    hint_used: bool,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO session_outcomes (card_id, difficulty, hint_used)
         SELECT id, ?, ? FROM cards WHERE front = ? AND back = ?",
        params![difficulty, hint_used, card.front, card.back],
    )?;
    Ok(())
}

pub fn load_session_history(conn: &Connection) -> Result<SessionHistory> {
    let mut stmt = conn.prepare(
        "SELECT c.front, c.back, c.hint, c.tags, so.difficulty, so.hint_used
         FROM session_outcomes so
         JOIN cards c ON c.id = so.card_id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            card_from_row(row, 0)?,
            row.get::<_, Difficulty>(4)?,
            row.get::<_, bool>(5)?,
        ))
    })?;

    let mut history = SessionHistory::default();
    for entry in rows {
        let (card, difficulty, hint_used) = entry?;
        history.record(card, difficulty, hint_used);
    }
    Ok(history)
}

pub fn clear_session(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM session_outcomes", [])?;
    Ok(())
}

// --- Progress ---

pub fn load_progress_stats(conn: &Connection) -> Result<ProgressStats> {
    let mut stmt = conn.prepare("SELECT rate FROM success_rates ORDER BY id")?;
    let success_rates = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<f64>>>()?;
    Ok(ProgressStats { success_rates })
}

pub fn append_success_rate(conn: &Connection, rate: f64) -> Result<()> {
    conn.execute("INSERT INTO success_rates (rate) VALUES (?)", [rate])?;
    Ok(())
}
