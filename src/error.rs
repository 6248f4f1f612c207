// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Card not found: {front} / {back}")]
    CardNotFound { front: String, back: String },

    #[error("Card update failed: {0}")]
    UpdateFailed(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
