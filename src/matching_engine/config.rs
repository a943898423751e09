use serde::{Deserialize, Serialize};

use crate::matching_engine::error::{EngineError, Result};

/// Rating points exchanged per update.
pub const DEFAULT_K_FACTOR: f64 = 32.0;
/// BKT: probability of a wrong answer despite mastery.
pub const DEFAULT_SLIP: f64 = 0.1;
/// BKT: probability of a right answer without mastery.
pub const DEFAULT_GUESS: f64 = 0.2;

/// Tunable parameters of the rating engine.
///
/// Missing fields fall back to the defaults above, so `{"k_factor": 24}` is a
/// complete config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub k_factor: f64,
    pub slip: f64,
    pub guess: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            k_factor: DEFAULT_K_FACTOR,
            slip: DEFAULT_SLIP,
            guess: DEFAULT_GUESS,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config, validating the result.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)
            .map_err(|e| EngineError::invalid(format!("engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// K must be positive; slip and guess must lie strictly inside (0, 1) so the
    /// BKT posterior never divides by zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.k_factor.is_finite() && self.k_factor > 0.0) {
            return Err(EngineError::invalid(format!(
                "k_factor must be a positive number (got {})",
                self.k_factor
            )));
        }
        for (name, p) in [("slip", self.slip), ("guess", self.guess)] {
            if !(p > 0.0 && p < 1.0) {
                return Err(EngineError::invalid(format!(
                    "{name} must lie strictly between 0 and 1 (got {p})"
                )));
            }
        }
        Ok(())
    }
}
