// src/lib.rs

pub mod algorithm;
pub mod commands;
pub mod constants;
pub mod database;
pub mod error;
pub mod models;
pub mod pedagogy;
pub mod repository;

pub use error::{Result, SchedulerError};
pub use models::AppState;

/// Opens a fresh in-memory store seeded with the starter deck.
pub fn open_state() -> Result<AppState> {
    let conn = rusqlite::Connection::open_in_memory()?;
    database::init_db(&conn)?;
    Ok(AppState::new(conn))
}
