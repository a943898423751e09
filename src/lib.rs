//! # skill_match_engine
//!
//! The computational core behind an adaptive peer-learning app: per-category
//! skill tracking, next-exercise selection, and matchmaking for study pairs.
//!
//! The crate does no I/O and keeps no state between calls. The surrounding
//! application loads student and exercise records, calls into the engine once
//! per event, and persists whatever comes back.
//!
//! ## How it works
//!
//! 1. **Rating** — [`RatingEngine::update`] applies one attempt's [`Outcome`]
//!    to a [`Student`]: an Elo step (K = 32) against the exercise rating, and a
//!    Bayesian Knowledge Tracing step (slip 0.1, guess 0.2) on mastery. The
//!    input snapshot is not modified; a new record is returned.
//! 2. **Selection** — [`choose_exercise`] takes one or two students and returns
//!    the unsolved exercise whose rating is closest to their average.
//! 3. **Pairing** — [`PairingStream`] ranks a cohort into quartiles and yields
//!    one top↔bottom / middle↔middle pair per step, ending with a leftover when
//!    the cohort is odd.
//!
//! ## Key features
//!
//! - **Deterministic**: only partner selection is random, and it draws from
//!   the RNG you inject. Pass `rng_seed: Some(u64)` in a [`PairingRequest`] to
//!   reproduce a pass exactly.
//! - **No partial updates**: inputs are validated before anything is computed;
//!   errors are [`EngineError::InvalidInput`] or [`EngineError::NoCandidates`].
//!
//! ## Quick start
//!
//! ```rust
//! use skill_match_engine::{
//!     choose_exercise, pair_students, Exercise, Outcome, PairingRequest, RatingEngine, Student,
//! };
//!
//! let student = Student::new("ana").with_elo("math", 1200.0).with_knowledge("math", 0.5);
//! let exercise = Exercise::new("ex-1", "math", 1200.0);
//!
//! let update = RatingEngine::default().update(&student, &exercise, Outcome::Win).unwrap();
//! assert_eq!(update.updated_rating, 1216.0);
//!
//! let pool = vec![Exercise::new("1", "math", 1100.0), Exercise::new("2", "math", 1300.0)];
//! let next = choose_exercise(&[update.student], "math", &pool).unwrap();
//! assert_eq!(next.id, "2");
//!
//! let cohort = vec![
//!     Student::new("a").with_score("math", 90.0),
//!     Student::new("b").with_score("math", 40.0),
//!     Student::new("c").with_score("math", 70.0),
//! ];
//! let events = pair_students(PairingRequest::new("math", cohort).seeded(42)).unwrap();
//! assert_eq!(events.len(), 2);
//! ```

pub mod matching_engine;

// Convenience re-exports so callers can use `skill_match_engine::choose_exercise`
// directly without reaching into `matching_engine::`.
pub use matching_engine::{
    choose_exercise, pair_students, EngineConfig, EngineError, Exercise, Outcome, PairingEvent,
    PairingRequest, PairingStream, RatingEngine, RatingUpdate, Student,
};
