// src/constants.rs

// --- Buckets ---
pub const NEW_CARD_BUCKET: u32 = 0; // New and failed cards
pub const FIRST_DAY: u32 = 0;

// --- Hints ---
pub const NO_HINT_MESSAGE: &str = "You're on your own with this one";

// --- Progress ---
pub const SUCCESS_RATE_SCALE: f64 = 100.0; // Percent
pub const MIN_SESSION_CARDS: usize = 1; // Floor for the success-rate denominator

// --- Logging ---
pub const DEFAULT_LOG_FILTER: &str = "info";
