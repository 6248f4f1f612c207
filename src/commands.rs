// src/commands.rs

use crate::models::{
    AnswerLog, AppState, HintRequest, PracticeRecord, PracticeSession, PracticeStats,
    ProgressView, UpdateRequest,
};
use crate::pedagogy;
use log::error;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::MutexGuard;

fn lock(state: &AppState) -> Result<MutexGuard<'_, Connection>, String> {
    state.db.lock().map_err(|e| e.to_string())
}

pub fn get_practice_cards(state: &AppState) -> Result<PracticeSession, String> {
    let conn = lock(state)?;
    pedagogy::get_practice_session(&conn).map_err(|e| e.to_string())
}

pub fn submit_answer(state: &AppState, request: UpdateRequest) -> Result<PracticeRecord, String> {
    let log = AnswerLog::try_from(request).map_err(|e| e.to_string())?;
    let conn = lock(state)?;
    pedagogy::process_answer(&conn, &log).map_err(|e| e.to_string())
}

pub fn get_hint(state: &AppState, request: HintRequest) -> Result<String, String> {
    let conn = lock(state)?;
    pedagogy::get_hint(&conn, &request.card_front, &request.card_back).map_err(|e| e.to_string())
}

pub fn get_progress(state: &AppState) -> Result<ProgressView, String> {
    let conn = lock(state)?;
    pedagogy::get_progress(&conn).map_err(|e| e.to_string())
}

pub fn end_session(state: &AppState) -> Result<PracticeStats, String> {
    let conn = lock(state)?;
    pedagogy::finish_session(&conn).map_err(|e| e.to_string())
}

pub fn advance_day(state: &AppState) -> Result<u32, String> {
    let conn = lock(state)?;
    pedagogy::advance_day(&conn).map_err(|e| e.to_string())
}

// --- Dispatch ---

#[derive(Deserialize, Debug)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Practice,
    Update(UpdateRequest),
    Hint(HintRequest),
    Progress,
    EndSession,
    NextDay,
}

pub fn dispatch(state: &AppState, command: Command) -> Result<Value, String> {
    let value = match command {
        Command::Practice => serde_json::to_value(get_practice_cards(state)?),
        Command::Update(request) => serde_json::to_value(submit_answer(state, request)?),
        Command::Hint(request) => Ok(json!({ "hint": get_hint(state, request)? })),
        Command::Progress => serde_json::to_value(get_progress(state)?),
        Command::EndSession => serde_json::to_value(end_session(state)?),
        Command::NextDay => Ok(json!({ "day": advance_day(state)? })),
    };
    value.map_err(|e| e.to_string())
}

/// Handles one JSON request line and always produces one JSON response
/// line: `{"ok": ...}` on success, `{"error": "..."}` otherwise.
pub fn handle_line(state: &AppState, line: &str) -> String {
    let result = serde_json::from_str::<Command>(line)
        .map_err(|e| format!("Invalid request: {}", e))
        .and_then(|command| dispatch(state, command));

    let response = match result {
        Ok(value) => json!({ "ok": value }),
        Err(message) => {
            error!("{}", message);
            json!({ "error": message })
        }
    };
    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    fn setup() -> AppState {
        let conn = Connection::open_in_memory().unwrap();
        database::init_db(&conn).unwrap();
        AppState::new(conn)
    }

    fn respond(state: &AppState, line: &str) -> Value {
        serde_json::from_str(&handle_line(state, line)).unwrap()
    }

    #[test]
    fn test_practice_command() {
        let state = setup();
        let response = respond(&state, r#"{"command": "practice"}"#);

        assert_eq!(response["ok"]["day"], 0);
        assert_eq!(response["ok"]["cards"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_update_command() {
        let state = setup();
        let response = respond(
            &state,
            r#"{"command": "update", "cardFront": "What is the capital of Spain?", "cardBack": "Madrid", "difficulty": "Easy"}"#,
        );

        assert_eq!(response["ok"]["previousBucket"], 0);
        assert_eq!(response["ok"]["newBucket"], 1);
        assert_eq!(response["ok"]["difficulty"], "Easy");
    }

    #[test]
    fn test_invalid_difficulty_is_rejected() {
        let state = setup();
        let response = respond(
            &state,
            r#"{"command": "update", "cardFront": "What is the capital of Spain?", "cardBack": "Madrid", "difficulty": "Hard"}"#,
        );

        let message = response["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid input"));

        let progress = get_progress(&state).unwrap();
        assert_eq!(progress.practiced, 0);
    }

    #[test]
    fn test_unknown_card_and_bad_json() {
        let state = setup();
        let response = respond(
            &state,
            r#"{"command": "hint", "cardFront": "Unknown", "cardBack": "Card"}"#,
        );
        assert!(response["error"].as_str().unwrap().starts_with("Card not found"));

        let response = respond(&state, "not json");
        assert!(response["error"].as_str().unwrap().starts_with("Invalid request"));

        let response = respond(&state, r#"{"command": "fly"}"#);
        assert!(response.get("error").is_some());
    }

    #[test]
    fn test_day_and_session_commands() {
        let state = setup();
        assert_eq!(respond(&state, r#"{"command": "next_day"}"#)["ok"]["day"], 1);

        let hint = respond(
            &state,
            r#"{"command": "hint", "cardFront": "What is the capital of Greece?", "cardBack": "Athens"}"#,
        );
        assert_eq!(hint["ok"]["hint"], "Not Sparta");

        let stats = respond(&state, r#"{"command": "end_session"}"#);
        assert_eq!(stats["ok"]["totalCards"], 1);
        assert_eq!(stats["ok"]["successRate"], 100.0);

        let progress = respond(&state, r#"{"command": "progress"}"#);
        assert_eq!(progress["ok"]["day"], 1);
        assert_eq!(progress["ok"]["successRates"][0], 100.0);
        assert_eq!(progress["ok"]["bucketRange"]["minBucket"], 0);
    }
}
