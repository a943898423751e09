//! Elo + Bayesian Knowledge Tracing update for one exercise attempt.
//!
//! The student's rating moves by `K·(actual − expected)` where the expectation
//! comes from the logistic Elo curve. Mastery is updated in two steps: a Bayes
//! posterior conditioned on whether the answer was correct (slip / guess), then
//! a learning transition that uses the same Elo expectation as the probability
//! of acquiring the skill on this attempt.

use tracing::debug;

use crate::matching_engine::{
    config::EngineConfig,
    error::Result,
    helpers::round_half_up,
    models::{Exercise, Outcome, RatingUpdate, Student},
};

/// Stateless rating engine; holds only its parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingEngine {
    config: EngineConfig,
}

impl RatingEngine {
    /// Build an engine from a validated config.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(RatingEngine { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Probability that a student at `student_elo` beats an exercise at `exercise_elo`.
    pub fn expected_score(student_elo: f64, exercise_elo: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((exercise_elo - student_elo) / 400.0))
    }

    /// Apply one outcome to `student` for `exercise.category`.
    ///
    /// The input is left untouched; the returned [`RatingUpdate`] carries a new
    /// student record with `elos[category]` and `knowledge[category]` replaced.
    pub fn update(
        &self,
        student: &Student,
        exercise: &Exercise,
        outcome: Outcome,
    ) -> Result<RatingUpdate> {
        let category = exercise.category.as_str();
        let exercise_elo = exercise.checked_elo()?;
        let student_elo = student.elo(category)?;
        let p_known = student.mastery(category)?;

        let expected = Self::expected_score(student_elo, exercise_elo);
        let actual = outcome.actual_score();

        let updated_rating = round_half_up(student_elo + self.config.k_factor * (actual - expected));
        let updated_mastery = self.trace_knowledge(p_known, actual == 1.0, expected);

        debug!(
            student = %student.id,
            exercise = %exercise.id,
            category,
            %outcome,
            expected,
            old_rating = student_elo,
            updated_rating,
            old_mastery = p_known,
            updated_mastery,
            "rating updated"
        );

        let mut next = student.clone();
        next.elos.insert(category.to_string(), updated_rating);
        next.knowledge.insert(category.to_string(), updated_mastery);

        Ok(RatingUpdate { student: next, updated_rating, updated_mastery })
    }

    /// Record the attempt in `solved` (win) or `failed` (draw, loss), then
    /// apply [`update`](Self::update).
    pub fn record_result(
        &self,
        student: &Student,
        exercise: &Exercise,
        outcome: Outcome,
    ) -> Result<RatingUpdate> {
        let mut result = self.update(student, exercise, outcome)?;
        let id = exercise.id.clone();
        if outcome.counts_as_solved() {
            result.student.solved.insert(id);
        } else {
            result.student.failed.insert(id);
        }
        Ok(result)
    }

    /// Rating the exercise would get from the mirrored update.
    ///
    /// Never applied by [`update`](Self::update); callers that want symmetric
    /// ratings persist this value themselves.
    pub fn exercise_rating_after(
        &self,
        student: &Student,
        exercise: &Exercise,
        outcome: Outcome,
    ) -> Result<f64> {
        let exercise_elo = exercise.checked_elo()?;
        let student_elo = student.elo(&exercise.category)?;
        let expected_exercise = 1.0 - Self::expected_score(student_elo, exercise_elo);
        let actual_exercise = 1.0 - outcome.actual_score();
        Ok(round_half_up(
            exercise_elo + self.config.k_factor * (actual_exercise - expected_exercise),
        ))
    }

    /// BKT posterior followed by the learning transition.
    fn trace_knowledge(&self, p_known: f64, correct: bool, p_transit: f64) -> f64 {
        let EngineConfig { slip, guess, .. } = self.config;
        let (given_known, given_unknown) = if correct {
            (1.0 - slip, guess)
        } else {
            (slip, 1.0 - guess)
        };

        let numerator = p_known * given_known;
        let posterior = numerator / (numerator + (1.0 - p_known) * given_unknown);

        (posterior + (1.0 - posterior) * p_transit).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching_engine::error::EngineError;

    fn student(elo: f64, knowledge: Option<f64>) -> Student {
        let s = Student::new("s1").with_elo("math", elo);
        match knowledge {
            Some(p) => s.with_knowledge("math", p),
            None => s,
        }
    }

    fn math(elo: f64) -> Exercise {
        Exercise::new("e1", "math", elo)
    }

    #[test]
    fn expected_score_is_half_at_equal_ratings() {
        assert_eq!(RatingEngine::expected_score(1200.0, 1200.0), 0.5);
        let e = RatingEngine::expected_score(1200.0, 1600.0);
        assert!((e - 1.0 / 11.0).abs() < 1e-12, "400 points under should be 1/11, got {e}");
    }

    #[test]
    fn win_at_equal_rating_gains_half_k() {
        let engine = RatingEngine::default();
        let r = engine.update(&student(1200.0, Some(0.5)), &math(1200.0), Outcome::Win).unwrap();
        assert_eq!(r.updated_rating, 1216.0);
        // posterior 0.45 / 0.55, then blended halfway towards 1
        assert!((r.updated_mastery - 10.0 / 11.0).abs() < 1e-12, "got {}", r.updated_mastery);
        assert_eq!(r.student.elos["math"], 1216.0);
        assert_eq!(r.student.knowledge["math"], r.updated_mastery);
    }

    #[test]
    fn input_snapshot_is_not_mutated() {
        let engine = RatingEngine::default();
        let before = student(1200.0, Some(0.3));
        let copy = before.clone();
        engine.update(&before, &math(1300.0), Outcome::Loss).unwrap();
        assert_eq!(before, copy);
    }

    #[test]
    fn missing_knowledge_starts_at_zero() {
        let engine = RatingEngine::default();
        let r = engine.update(&student(1200.0, None), &math(1200.0), Outcome::Draw).unwrap();
        assert_eq!(r.updated_rating, 1200.0);
        // posterior of 0 stays 0, transition lifts it to E = 0.5
        assert!((r.updated_mastery - 0.5).abs() < 1e-12);
    }

    #[test]
    fn draw_counts_as_a_wrong_answer_for_mastery() {
        let engine = RatingEngine::default();
        let r = engine.update(&student(1200.0, Some(0.5)), &math(1200.0), Outcome::Draw).unwrap();
        // posterior 0.05 / 0.45 = 1/9, then blended halfway towards 1
        assert!((r.updated_mastery - 5.0 / 9.0).abs() < 1e-12, "got {}", r.updated_mastery);
    }

    #[test]
    fn loss_uses_slip_for_known_and_one_minus_guess_for_unknown() {
        let engine = RatingEngine::default();
        let r = engine.update(&student(1200.0, Some(0.5)), &math(1300.0), Outcome::Loss).unwrap();
        let e = RatingEngine::expected_score(1200.0, 1300.0);
        let posterior = 1.0 / 9.0;
        let want = posterior + (1.0 - posterior) * e;
        assert!((r.updated_mastery - want).abs() < 1e-12, "got {}, want {want}", r.updated_mastery);
    }

    #[test]
    fn loss_against_weaker_exercise_drops_rating() {
        let engine = RatingEngine::default();
        let r = engine.update(&student(1200.0, None), &math(1100.0), Outcome::Loss).unwrap();
        assert!(r.updated_rating < 1200.0);
    }

    #[test]
    fn missing_category_rating_is_invalid_input() {
        let engine = RatingEngine::default();
        let s = Student::new("s1").with_elo("physics", 1200.0);
        match engine.update(&s, &math(1200.0), Outcome::Win) {
            Err(EngineError::InvalidInput(msg)) => assert!(msg.contains("elos['math']"), "{msg}"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let engine = RatingEngine::default();
        assert!(engine.update(&student(f64::NAN, None), &math(1200.0), Outcome::Win).is_err());
        assert!(engine.update(&student(1200.0, None), &math(f64::INFINITY), Outcome::Win).is_err());
        assert!(engine.update(&student(1200.0, Some(1.5)), &math(1200.0), Outcome::Win).is_err());
    }

    #[test]
    fn record_result_files_draws_as_failed() {
        let engine = RatingEngine::default();
        let s = student(1200.0, None);
        let win = engine.record_result(&s, &math(1200.0), Outcome::Win).unwrap();
        assert!(win.student.solved.contains("e1"));
        assert!(win.student.failed.is_empty());

        let draw = engine.record_result(&s, &math(1200.0), Outcome::Draw).unwrap();
        assert!(draw.student.failed.contains("e1"));
        assert!(draw.student.solved.is_empty());
    }

    #[test]
    fn exercise_rating_mirrors_student_change() {
        let engine = RatingEngine::default();
        let s = student(1200.0, None);
        let ex = engine.exercise_rating_after(&s, &math(1200.0), Outcome::Win).unwrap();
        assert_eq!(ex, 1184.0);
        let ex = engine.exercise_rating_after(&s, &math(1200.0), Outcome::Loss).unwrap();
        assert_eq!(ex, 1216.0);
    }

    #[test]
    fn custom_k_factor_scales_delta() {
        let engine = RatingEngine::new(EngineConfig { k_factor: 16.0, ..Default::default() }).unwrap();
        let r = engine.update(&student(1200.0, None), &math(1200.0), Outcome::Win).unwrap();
        assert_eq!(r.updated_rating, 1208.0);
    }
}
