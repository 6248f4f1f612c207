// src/database.rs

use crate::constants::{FIRST_DAY, NEW_CARD_BUCKET};
use crate::error::Result;
use crate::models::Flashcard;
use crate::repository;
use log::debug;
use rusqlite::{params, Connection};

pub fn init_db(conn: &Connection) -> Result<()> {
    debug!("init_db: Checking database schema...");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            hint TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            UNIQUE (front, back)
        );
        CREATE TABLE IF NOT EXISTS card_buckets (
            card_id INTEGER PRIMARY KEY,
            bucket INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS app_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            current_day INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS practice_history (
            id INTEGER PRIMARY KEY,
            card_front TEXT NOT NULL,
            card_back TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            difficulty TEXT CHECK (difficulty IN ('Wrong','Easy')),
            previous_bucket INTEGER NOT NULL,
            new_bucket INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS session_outcomes (
            card_id INTEGER PRIMARY KEY,
            difficulty TEXT CHECK (difficulty IN ('Wrong','Easy')),
            hint_used INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS success_rates (
            id INTEGER PRIMARY KEY,
            rate REAL NOT NULL
        );
        ",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (id, current_day) VALUES (1, ?)",
        [FIRST_DAY],
    )?;

    let count: i64 = conn.query_row("SELECT count(*) FROM cards", [], |row| row.get(0))?;
    if count == 0 {
        debug!("init_db: No cards. Seeding data...");
        seed_data(conn)?;
    }

    Ok(())
}

fn seed_data(conn: &Connection) -> Result<()> {
    let data = include_str!("data/initial_cards.json");
    let cards: Vec<Flashcard> = serde_json::from_str(data)?;

    let tx = conn.unchecked_transaction()?;
    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO card_buckets (card_id, bucket)
         SELECT id, ? FROM cards WHERE front = ? AND back = ?",
    )?;
    for card in &cards {
        repository::upsert_card(&tx, card)?;
        stmt.execute(params![NEW_CARD_BUCKET, card.front, card.back])?;
    }
    drop(stmt);
    tx.commit()?;

    debug!("init_db: Seeded {} cards into bucket {}", cards.len(), NEW_CARD_BUCKET);
    Ok(())
}
