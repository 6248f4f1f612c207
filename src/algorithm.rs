// src/algorithm.rs

//! Modified-Leitner scheduling.
//!
//! Cards live in numbered buckets. Bucket 0 is practised every day, bucket
//! `i` every `2^i` days. A correct ("Easy") answer moves a card up one
//! bucket, a wrong answer sends it back to bucket 0.
//!
//! Everything here is pure: inputs are borrowed and never modified, and
//! every result is a freshly built collection.

use crate::constants::*;
use crate::models::{
    BucketMap, BucketNumber, BucketRange, BucketSets, Difficulty, Flashcard, PracticeStats,
    ProgressStats, SessionHistory,
};
use std::collections::BTreeSet;

// --- Representation ---

/// Converts the sparse bucket map into the dense form, where index `i`
/// holds bucket `i` and unoccupied buckets are empty sets.
pub fn to_bucket_sets(buckets: &BucketMap) -> BucketSets {
    let Some(&max_bucket) = buckets.keys().next_back() else {
        return Vec::new();
    };

    (0..=max_bucket)
        .map(|i| buckets.get(&i).cloned().unwrap_or_default())
        .collect()
}

/// Inverse of [`to_bucket_sets`]. Empty buckets are dropped.
pub fn to_bucket_map(bucket_sets: &[BTreeSet<Flashcard>]) -> BucketMap {
    bucket_sets
        .iter()
        .enumerate()
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(i, cards)| (i as BucketNumber, cards.clone()))
        .collect()
}

// --- Progress ---

/// Lowest and highest occupied bucket, or `None` when no card is tracked.
pub fn bucket_range(bucket_sets: &[BTreeSet<Flashcard>]) -> Option<BucketRange> {
    let mut occupied = bucket_sets
        .iter()
        .enumerate()
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(i, _)| i as BucketNumber);

    let min_bucket = occupied.next()?;
    let max_bucket = occupied.last().unwrap_or(min_bucket);
    Some(BucketRange {
        min_bucket,
        max_bucket,
    })
}

// --- Selection ---

/// Cards due for practice on `day`.
pub fn practice(bucket_sets: &[BTreeSet<Flashcard>], day: u32) -> BTreeSet<Flashcard> {
    let Some(new_cards) = bucket_sets.first() else {
        return BTreeSet::new();
    };

    let mut due = new_cards.clone();
    if day == FIRST_DAY {
        return due;
    }

    for (bucket, cards) in bucket_sets.iter().enumerate().skip(1) {
        if is_bucket_due(bucket, day) {
            due.extend(cards.iter().cloned());
        }
    }
    due
}

/// Bucket `i` is due every `2^i` days. Periods too large to represent never
/// come due.
fn is_bucket_due(bucket: usize, day: u32) -> bool {
    u32::try_from(bucket)
        .ok()
        .and_then(|shift| 1u64.checked_shl(shift))
        .is_some_and(|period| u64::from(day) % period == 0)
}

// --- Transitions ---

/// Bucket currently holding `card`, compared by front and back.
pub fn find_bucket(buckets: &BucketMap, card: &Flashcard) -> Option<BucketNumber> {
    buckets
        .iter()
        .find(|(_, cards)| cards.contains(card))
        .map(|(&bucket, _)| bucket)
}

/// Returns a new bucket map with `card` moved according to `difficulty`.
///
/// A card that is not tracked yet goes into the new-card bucket. A tracked
/// card keeps its stored hint and tags when it moves.
pub fn update(buckets: &BucketMap, card: &Flashcard, difficulty: Difficulty) -> BucketMap {
    let mut next = buckets.clone();

    let Some(current) = find_bucket(buckets, card) else {
        next.entry(NEW_CARD_BUCKET)
            .or_default()
            .insert(card.clone());
        return next;
    };

    let target = match difficulty {
        Difficulty::Easy => current.saturating_add(1),
        Difficulty::Wrong => NEW_CARD_BUCKET,
    };

    let moved = next
        .get_mut(&current)
        .and_then(|cards| cards.take(card))
        .unwrap_or_else(|| card.clone());
    next.entry(target).or_default().insert(moved);
    next
}

// --- Hints ---

pub fn hint(card: &Flashcard) -> &str {
    if card.hint.is_empty() {
        NO_HINT_MESSAGE
    } else {
        &card.hint
    }
}

// --- Statistics ---

/// Summarises a finished session and appends its success rate to a copy of
/// the running history.
pub fn compute_progress(history: &SessionHistory, progress: &ProgressStats) -> PracticeStats {
    let total_cards = history.outcomes.len().max(MIN_SESSION_CARDS);

    let got_wrong: Vec<Flashcard> = history
        .outcomes
        .iter()
        .filter(|(_, outcome)| outcome.difficulty == Difficulty::Wrong)
        .map(|(card, _)| card.clone())
        .collect();

    let hints_needed = history
        .outcomes
        .values()
        .filter(|outcome| outcome.hint_used)
        .count();

    let success_rate =
        (total_cards - got_wrong.len()) as f64 / total_cards as f64 * SUCCESS_RATE_SCALE;

    let mut success_rates = progress.success_rates.clone();
    success_rates.push(success_rate);

    PracticeStats {
        total_cards,
        success_rate,
        hints_needed,
        got_wrong,
        progress_stats: ProgressStats { success_rates },
    }
}
