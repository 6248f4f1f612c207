// src/models.rs

use crate::error::SchedulerError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Mutex;

// --- App State ---

pub struct AppState {
    pub db: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        AppState {
            db: Mutex::new(conn),
        }
    }
}

// --- Data Models ---

pub type BucketNumber = u32;

/// Sparse representation: bucket number to the cards it holds.
pub type BucketMap = BTreeMap<BucketNumber, BTreeSet<Flashcard>>;

/// Dense representation: index `i` holds bucket `i`, gaps are empty sets.
pub type BucketSets = Vec<BTreeSet<Flashcard>>;

/// A flashcard. Two cards are the same card when front and back match;
/// hint and tags do not take part in equality, hashing or ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Flashcard {
    pub fn new(front: &str, back: &str, hint: &str, tags: &[&str]) -> Self {
        Flashcard {
            front: front.to_string(),
            back: back.to_string(),
            hint: hint.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn matches(&self, front: &str, back: &str) -> bool {
        self.front == front && self.back == back
    }
}

impl PartialEq for Flashcard {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.front, &other.back)
    }
}

impl Eq for Flashcard {}

impl Hash for Flashcard {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.front.hash(state);
        self.back.hash(state);
    }
}

impl Ord for Flashcard {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.front, &self.back).cmp(&(&other.front, &other.back))
    }
}

impl PartialOrd for Flashcard {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Wrong,
    Easy,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Wrong => "Wrong",
            Difficulty::Easy => "Easy",
        }
    }
}

impl FromStr for Difficulty {
    type Err = SchedulerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Wrong" => Ok(Difficulty::Wrong),
            "Easy" => Ok(Difficulty::Easy),
            other => Err(SchedulerError::InvalidInput(format!(
                "'{}' is not an acceptable difficulty",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BucketRange {
    pub min_bucket: BucketNumber,
    pub max_bucket: BucketNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub difficulty: Difficulty,
    pub hint_used: bool,
}

/// Last recorded outcome per card for the running session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHistory {
    pub outcomes: BTreeMap<Flashcard, Outcome>,
}

impl SessionHistory {
    pub fn record(&mut self, card: Flashcard, difficulty: Difficulty, hint_used: bool) {
        self.outcomes.insert(
            card,
            Outcome {
                difficulty,
                hint_used,
            },
        );
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub success_rates: Vec<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    pub total_cards: usize,
    pub success_rate: f64,
    pub hints_needed: usize,
    pub got_wrong: Vec<Flashcard>,
    pub progress_stats: ProgressStats,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub card_front: String,
    pub card_back: String,
    pub timestamp: i64, // Milliseconds since the epoch
    pub difficulty: Difficulty,
    pub previous_bucket: BucketNumber,
    pub new_bucket: BucketNumber,
}

// --- Views returned to callers ---

#[derive(Serialize, Debug)]
pub struct PracticeSession {
    pub cards: Vec<Flashcard>,
    pub day: u32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub day: u32,
    pub bucket_range: Option<BucketRange>,
    pub success_rates: Vec<f64>,
    pub practiced: usize,
}

// --- Requests ---

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub card_front: String,
    pub card_back: String,
    pub difficulty: String,
    #[serde(default)]
    pub hint_used: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    pub card_front: String,
    pub card_back: String,
}

/// A validated answer, ready for the transition engine.
#[derive(Debug, Clone)]
pub struct AnswerLog {
    pub card_front: String,
    pub card_back: String,
    pub difficulty: Difficulty,
    pub hint_used: bool,
}

impl TryFrom<UpdateRequest> for AnswerLog {
    type Error = SchedulerError;
    fn try_from(req: UpdateRequest) -> Result<Self, Self::Error> {
        Ok(AnswerLog {
            difficulty: req.difficulty.parse()?,
            card_front: req.card_front,
            card_back: req.card_back,
            hint_used: req.hint_used,
        })
    }
}
