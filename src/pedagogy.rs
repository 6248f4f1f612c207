// src/pedagogy.rs

use crate::algorithm;
use crate::error::{Result, SchedulerError};
use crate::models::{AnswerLog, Flashcard, PracticeRecord, PracticeSession, PracticeStats, ProgressView};
use crate::repository;
use chrono::Utc;
use log::{debug, info, warn};
use rusqlite::Connection;

// --- Public Interface ---

/// Cards due today, in front/back order.
pub fn get_practice_session(conn: &Connection) -> Result<PracticeSession> {
    let day = repository::get_current_day(conn)?;
    let buckets = repository::load_buckets(conn)?;
    let bucket_sets = algorithm::to_bucket_sets(&buckets);

    let cards: Vec<Flashcard> = algorithm::practice(&bucket_sets, day)
        .into_iter()
        .collect();

    info!("Found {} cards for day {}.", cards.len(), day);
    Ok(PracticeSession { cards, day })
}

/// Applies one answer: moves the card, logs the transition and records the
/// outcome for the running session.
pub fn process_answer(conn: &Connection, log: &AnswerLog) -> Result<PracticeRecord> {
    let now = Utc::now().timestamp_millis();
    info!("Processing {} answer for '{}'", log.difficulty, log.card_front);

    let (card, previous_bucket) = lookup_tracked_card(conn, &log.card_front, &log.card_back)?;

    // 1. Move the card
    let buckets = repository::load_buckets(conn)?;
    let updated = algorithm::update(&buckets, &card, log.difficulty);
    repository::replace_buckets(conn, &updated)?;

    let new_bucket = repository::find_card_bucket(conn, &log.card_front, &log.card_back)?
        .ok_or_else(|| {
            SchedulerError::UpdateFailed(format!(
                "'{}' has no bucket after the update",
                log.card_front
            ))
        })?;

    // 2. Audit trail
    let record = PracticeRecord {
        card_front: log.card_front.clone(),
        card_back: log.card_back.clone(),
        timestamp: now,
        difficulty: log.difficulty,
        previous_bucket,
        new_bucket,
    };
    repository::log_practice_record(conn, &record)?;

    // 3. Session outcome
    repository::record_outcome(conn, &card, log.difficulty, log.hint_used)?;

    info!(
        "Updated card '{}' from bucket {} to {}.",
        log.card_front, previous_bucket, new_bucket
    );
    Ok(record)
}

pub fn get_hint(conn: &Connection, front: &str, back: &str) -> Result<String> {
    let (card, _) = lookup_tracked_card(conn, front, back)?;
    Ok(algorithm::hint(&card).to_string())
}

/// Read-only progress overview. Does not close the session.
pub fn get_progress(conn: &Connection) -> Result<ProgressView> {
    let day = repository::get_current_day(conn)?;
    let buckets = repository::load_buckets(conn)?;
    let bucket_range = algorithm::bucket_range(&algorithm::to_bucket_sets(&buckets));
    let stats = repository::load_progress_stats(conn)?;
    let session = repository::load_session_history(conn)?;

    Ok(ProgressView {
        day,
        bucket_range,
        success_rates: stats.success_rates,
        practiced: session.outcomes.len(),
    })
}

/// Closes the running session: summarises it, stores the new success rate
/// and starts a fresh session.
pub fn finish_session(conn: &Connection) -> Result<PracticeStats> {
    let session = repository::load_session_history(conn)?;
    let prior = repository::load_progress_stats(conn)?;

    if session.outcomes.is_empty() {
        warn!("Finishing a session with no answers recorded.");
    }

    let stats = algorithm::compute_progress(&session, &prior);
    debug!(
        "[Session] total: {}, wrong: {}, hints: {}",
        stats.total_cards,
        stats.got_wrong.len(),
        stats.hints_needed
    );

    let tx = conn.unchecked_transaction()?;
    repository::append_success_rate(&tx, stats.success_rate)?;
    repository::clear_session(&tx)?;
    tx.commit()?;

    info!(
        "Session finished with a success rate of {:.1}% ({} sessions so far).",
        stats.success_rate,
        stats.progress_stats.success_rates.len()
    );
    Ok(stats)
}

pub fn advance_day(conn: &Connection) -> Result<u32> {
    let day = repository::increment_day(conn)?;
    info!("Advanced to day {}.", day);
    Ok(day)
}

// --- Internal Logic ---

/// A card the store currently tracks, with its bucket. Absence is a user
/// error here: answers and hints only make sense for known cards.
fn lookup_tracked_card(conn: &Connection, front: &str, back: &str) -> Result<(Flashcard, u32)> {
    let not_found = || SchedulerError::CardNotFound {
        front: front.to_string(),
        back: back.to_string(),
    };

    let card = repository::find_card(conn, front, back)?.ok_or_else(not_found)?;
    let bucket = repository::find_card_bucket(conn, front, back)?.ok_or_else(not_found)?;
    Ok((card, bucket))
}
