//! Core matching engine — ratings, exercise selection, and peer pairing.
//!
//! ## Module overview
//!
//! | Module     | Purpose |
//! |------------|---------|
//! | `models`   | Shared types: students, exercises, outcomes, pairing events |
//! | `error`    | `EngineError` and the crate `Result` alias |
//! | `config`   | `EngineConfig` (K-factor, BKT slip / guess) with defaults |
//! | `helpers`  | Rounding and averaging shared by rating and selection |
//! | `rating`   | Elo + Bayesian Knowledge Tracing update for one attempt |
//! | `selector` | Closest-rated unsolved exercise for one or two students |
//! | `pairing`  | Lazy quartile pairing stream with an injectable RNG |
//! | `snapshot` | Type-checked conversion from raw JSON documents |

pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod pairing;
pub mod rating;
pub mod selector;
pub mod snapshot;

// Re-export the public API surface so callers can use
// `matching_engine::choose_exercise` without reaching into sub-modules.
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use models::{Exercise, Outcome, PairingEvent, PairingRequest, RatingUpdate, Student};
pub use pairing::{pair_students, PairingStream};
pub use rating::RatingEngine;
pub use selector::choose_exercise;
