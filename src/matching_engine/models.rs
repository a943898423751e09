use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::matching_engine::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Document-store ids arrive as either strings or integers; both are kept as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    RawId::deserialize(d).map(String::from)
}

fn de_id_set<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<BTreeSet<String>, D::Error> {
    let raw: Vec<RawId> = Vec::deserialize(d)?;
    Ok(raw.into_iter().map(String::from).collect())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Snapshot of one student as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Elo rating per category.
    #[serde(default)]
    pub elos: BTreeMap<String, f64>,
    /// BKT mastery probability per category, in [0, 1].
    #[serde(default)]
    pub knowledge: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "de_id_set")]
    pub solved: BTreeSet<String>,
    #[serde(default, deserialize_with = "de_id_set")]
    pub failed: BTreeSet<String>,
    /// Ranking score per category; only read by the pairing stream.
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl Student {
    pub fn new(id: impl Into<String>) -> Self {
        Student { id: id.into(), ..Default::default() }
    }

    pub fn with_elo(mut self, category: impl Into<String>, elo: f64) -> Self {
        self.elos.insert(category.into(), elo);
        self
    }

    pub fn with_knowledge(mut self, category: impl Into<String>, p: f64) -> Self {
        self.knowledge.insert(category.into(), p);
        self
    }

    pub fn with_score(mut self, category: impl Into<String>, score: f64) -> Self {
        self.scores.insert(category.into(), score);
        self
    }

    pub fn with_solved(mut self, exercise_id: impl Into<String>) -> Self {
        self.solved.insert(exercise_id.into());
        self
    }

    /// Rating for `category`, or `InvalidInput` naming the missing entry.
    pub fn elo(&self, category: &str) -> Result<f64> {
        match self.elos.get(category) {
            Some(&elo) if elo.is_finite() => Ok(elo),
            Some(_) => Err(EngineError::invalid(format!(
                "student '{}' has a non-finite elos['{category}']",
                self.id
            ))),
            None => Err(EngineError::invalid(format!(
                "student '{}' is missing elos['{category}']",
                self.id
            ))),
        }
    }

    /// Mastery for `category`; an absent entry counts as 0.0.
    pub fn mastery(&self, category: &str) -> Result<f64> {
        match self.knowledge.get(category) {
            None => Ok(0.0),
            Some(&p) if (0.0..=1.0).contains(&p) => Ok(p),
            Some(p) => Err(EngineError::invalid(format!(
                "student '{}' has knowledge['{category}'] = {p}, expected a value in [0, 1]",
                self.id
            ))),
        }
    }

    /// Pairing score for `category`.
    pub fn score(&self, category: &str) -> Result<f64> {
        match self.scores.get(category) {
            Some(&s) if s.is_finite() => Ok(s),
            _ => Err(EngineError::invalid(format!(
                "student '{}' is missing a finite scores['{category}']",
                self.id
            ))),
        }
    }
}

/// An exercise with its difficulty rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub category: String,
    pub elo: f64,
}

impl Exercise {
    pub fn new(id: impl Into<String>, category: impl Into<String>, elo: f64) -> Self {
        Exercise { id: id.into(), category: category.into(), elo }
    }

    pub(crate) fn checked_elo(&self) -> Result<f64> {
        if self.elo.is_finite() {
            Ok(self.elo)
        } else {
            Err(EngineError::invalid(format!("exercise '{}' has a non-finite elo", self.id)))
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes and results
// ---------------------------------------------------------------------------

/// Result of an attempt, from the student's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Wire value: 1, 0 or -1.
    pub fn value(self) -> i64 {
        match self {
            Outcome::Win => 1,
            Outcome::Draw => 0,
            Outcome::Loss => -1,
        }
    }

    /// Actual score fed to the Elo update: 1, 0.5 or 0.
    pub fn actual_score(self) -> f64 {
        (self.value() as f64 + 1.0) / 2.0
    }

    /// Threshold applied to the raw outcome, so only a win lands in `solved`
    /// and a draw is recorded as failed.
    pub fn counts_as_solved(self) -> bool {
        self.value() as f64 >= 0.5
    }
}

impl TryFrom<i64> for Outcome {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Outcome::Win),
            0 => Ok(Outcome::Draw),
            -1 => Ok(Outcome::Loss),
            other => Err(EngineError::invalid(format!(
                "outcome must be one of 1, 0, -1 (got {other})"
            ))),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win  => write!(f, "win"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Loss => write!(f, "loss"),
        }
    }
}

/// New student record after one rating update, plus the two headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub student: Student,
    pub updated_rating: f64,
    pub updated_mastery: f64,
}

/// One step of a pairing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PairingEvent {
    Pair(Student, Student),
    Leftover(Student),
}

impl PairingEvent {
    /// Ids of the students carried by this event, in order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            PairingEvent::Pair(a, b) => vec![a.id.as_str(), b.id.as_str()],
            PairingEvent::Leftover(s) => vec![s.id.as_str()],
        }
    }
}

/// Input for a seeded pairing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingRequest {
    pub category: String,
    pub students: Vec<Student>,
    /// `Some(seed)` makes the partner draws reproducible.
    pub rng_seed: Option<u64>,
}

impl PairingRequest {
    /// Unseeded request; partners are drawn from entropy.
    pub fn new(category: impl Into<String>, students: Vec<Student>) -> Self {
        PairingRequest { category: category.into(), students, rng_seed: None }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
