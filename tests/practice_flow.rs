//! End-to-end practice flow over the in-memory store.

use leitner_lib::algorithm;
use leitner_lib::commands::{self, Command};
use leitner_lib::models::{Difficulty, Flashcard, UpdateRequest};
use leitner_lib::{open_state, repository, AppState};

fn update(card: &Flashcard, difficulty: &str, hint_used: bool) -> UpdateRequest {
    UpdateRequest {
        card_front: card.front.clone(),
        card_back: card.back.clone(),
        difficulty: difficulty.to_string(),
        hint_used,
    }
}

fn bucket_of(state: &AppState, card: &Flashcard) -> Option<u32> {
    let conn = state.db.lock().unwrap();
    repository::find_card_bucket(&conn, &card.front, &card.back).unwrap()
}

#[test]
fn test_week_of_practice() {
    let state = open_state().expect("Failed to open store");

    // Day 0: everything is new. Answer all correctly but the first.
    let session = commands::get_practice_cards(&state).unwrap();
    assert_eq!(session.cards.len(), 6);
    let missed = session.cards[0].clone();
    for (i, card) in session.cards.iter().enumerate() {
        let difficulty = if i == 0 { "Wrong" } else { "Easy" };
        commands::submit_answer(&state, update(card, difficulty, i == 1)).unwrap();
    }

    let stats = commands::end_session(&state).unwrap();
    assert_eq!(stats.total_cards, 6);
    assert_eq!(stats.hints_needed, 1);
    assert_eq!(stats.got_wrong, vec![missed.clone()]);
    assert!((stats.success_rate - 500.0 / 6.0).abs() < 1e-9);

    // Day 1: only the missed card is due.
    assert_eq!(commands::advance_day(&state).unwrap(), 1);
    let session = commands::get_practice_cards(&state).unwrap();
    assert_eq!(session.cards, vec![missed.clone()]);
    commands::submit_answer(&state, update(&missed, "Easy", false)).unwrap();
    commands::end_session(&state).unwrap();

    // Day 2: bucket 1 comes due, so every card is back.
    assert_eq!(commands::advance_day(&state).unwrap(), 2);
    let session = commands::get_practice_cards(&state).unwrap();
    assert_eq!(session.cards.len(), 6);

    let progress = commands::get_progress(&state).unwrap();
    assert_eq!(progress.success_rates.len(), 2);
    assert_eq!(progress.success_rates[1], 100.0);
    assert_eq!(bucket_of(&state, &missed), Some(1));

    let conn = state.db.lock().unwrap();
    let history = repository::get_history(&conn).unwrap();
    assert_eq!(history.len(), 7);
    assert_eq!(history[0].difficulty, Difficulty::Wrong);
    assert_eq!((history[0].previous_bucket, history[0].new_bucket), (0, 0));
    assert_eq!((history[6].previous_bucket, history[6].new_bucket), (0, 1));
}

#[test]
fn test_rejected_requests_leave_state_untouched() {
    let state = open_state().unwrap();
    let before = {
        let conn = state.db.lock().unwrap();
        repository::load_buckets(&conn).unwrap()
    };

    let card = before[&0].iter().next().unwrap().clone();
    assert!(commands::submit_answer(&state, update(&card, "Hard", false)).is_err());

    let stranger = Flashcard::new("Capital of Atlantis?", "Unknown", "", &[]);
    assert!(commands::submit_answer(&state, update(&stranger, "Easy", false)).is_err());

    let after = {
        let conn = state.db.lock().unwrap();
        repository::load_buckets(&conn).unwrap()
    };
    assert_eq!(before, after);
}

#[test]
fn test_dispatch_matches_direct_calls() {
    let state = open_state().unwrap();
    let command: Command = serde_json::from_str(r#"{"command": "practice"}"#).unwrap();
    let value = commands::dispatch(&state, command).unwrap();

    let direct = commands::get_practice_cards(&state).unwrap();
    assert_eq!(value["cards"].as_array().unwrap().len(), direct.cards.len());
}

#[test]
fn test_core_agrees_with_store() {
    let state = open_state().unwrap();
    let conn = state.db.lock().unwrap();
    let buckets = repository::load_buckets(&conn).unwrap();
    let card = buckets[&0].iter().next().unwrap().clone();

    let promoted = algorithm::update(&buckets, &card, Difficulty::Easy);
    repository::replace_buckets(&conn, &promoted).unwrap();

    assert_eq!(algorithm::find_bucket(&promoted, &card), Some(1));
    assert_eq!(
        repository::find_card_bucket(&conn, &card.front, &card.back).unwrap(),
        Some(1)
    );
    assert_eq!(
        algorithm::to_bucket_map(&algorithm::to_bucket_sets(&promoted)),
        repository::load_buckets(&conn).unwrap()
    );
}
