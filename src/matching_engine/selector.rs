//! Next-exercise selection for one student or a pair working together.

use tracing::debug;

use crate::matching_engine::{
    error::{EngineError, Result},
    helpers::mean,
    models::{Exercise, Student},
};

/// Pick the unsolved exercise in `category` whose rating is closest to the
/// students' average rating.
///
/// An exercise is skipped if *any* of the students has solved it. On equal
/// distance the earliest exercise in `exercises` wins.
pub fn choose_exercise<'a>(
    students: &[Student],
    category: &str,
    exercises: &'a [Exercise],
) -> Result<&'a Exercise> {
    if !(1..=2).contains(&students.len()) {
        return Err(EngineError::invalid(format!(
            "students must hold 1 or 2 entries (got {})",
            students.len()
        )));
    }

    let ratings = students
        .iter()
        .map(|s| s.elo(category))
        .collect::<Result<Vec<f64>>>()?;
    // len checked above
    let average = mean(&ratings).unwrap_or_default();

    let mut closest: Option<(&Exercise, f64)> = None;
    for exercise in exercises {
        if exercise.category != category
            || students.iter().any(|s| s.solved.contains(&exercise.id))
        {
            continue;
        }
        let distance = (exercise.checked_elo()? - average).abs();
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((exercise, distance)),
        }
    }

    let (chosen, distance) = closest.ok_or_else(|| EngineError::NoCandidates {
        category: category.to_string(),
    })?;

    debug!(category, average, exercise = %chosen.id, distance, "exercise chosen");
    Ok(chosen)
}
