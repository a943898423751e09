//! Loosely-typed boundary for records coming straight out of the document store.
//!
//! The store hands over JSON documents whose shape is not enforced, so these
//! helpers do the type checks (list vs. object, string category, integer
//! outcome) and turn failures into [`EngineError::InvalidInput`]. Results are
//! mapped back into the field names the client already persists.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::matching_engine::{
    error::{EngineError, Result},
    models::{Exercise, Outcome, PairingEvent, Student},
    rating::RatingEngine,
    selector::choose_exercise,
};

fn object_from_value<T: DeserializeOwned>(what: &str, value: &Value) -> Result<T> {
    if !value.is_object() {
        return Err(EngineError::invalid(format!("{what} must be an object")));
    }
    serde_json::from_value(value.clone()).map_err(|e| EngineError::invalid(format!("{what}: {e}")))
}

fn list_from_value<T: DeserializeOwned>(what: &str, value: &Value) -> Result<Vec<T>> {
    let items = value
        .as_array()
        .ok_or_else(|| EngineError::invalid(format!("{what} must be a list")))?;
    items.iter().map(|item| object_from_value(what, item)).collect()
}

pub fn student_from_value(value: &Value) -> Result<Student> {
    object_from_value("student", value)
}

pub fn exercise_from_value(value: &Value) -> Result<Exercise> {
    object_from_value("exercise", value)
}

pub fn students_from_value(value: &Value) -> Result<Vec<Student>> {
    list_from_value("students", value)
}

pub fn exercises_from_value(value: &Value) -> Result<Vec<Exercise>> {
    list_from_value("exercises", value)
}

/// Accepts 1, 0 or -1, including their float spellings (`1.0`).
pub fn outcome_from_value(value: &Value) -> Result<Outcome> {
    let raw = match value.as_i64() {
        Some(n) => n,
        None => match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= 1.0 => f as i64,
            _ => {
                return Err(EngineError::invalid(format!(
                    "outcome must be one of 1, 0, -1 (got {value})"
                )))
            }
        },
    };
    Outcome::try_from(raw)
}

/// [`choose_exercise`] over raw documents.
///
/// Checks run in a fixed order: students (a list of one or two), exercises
/// (a list), category (a string).
pub fn choose_exercise_from_json(
    students: &Value,
    category: &Value,
    exercises: &Value,
) -> Result<Exercise> {
    let students = students_from_value(students)?;
    if !(1..=2).contains(&students.len()) {
        return Err(EngineError::invalid(
            "students must be a list of 1 or 2 students",
        ));
    }
    let exercises = exercises_from_value(exercises)?;
    let category = category
        .as_str()
        .ok_or_else(|| EngineError::invalid("category must be a string"))?;

    choose_exercise(&students, category, &exercises).cloned()
}

/// Run [`RatingEngine::update`] on raw documents.
///
/// Returns the updated student plus `{"updatedStudentElo", "updatedKnowledge"}`.
pub fn update_from_json(
    engine: &RatingEngine,
    student: &Value,
    exercise: &Value,
    outcome: &Value,
) -> Result<(Student, Value)> {
    let student = student_from_value(student)?;
    let exercise = exercise_from_value(exercise)?;
    let outcome = outcome_from_value(outcome)?;

    let update = engine.update(&student, &exercise, outcome)?;
    let summary = json!({
        "updatedStudentElo": update.updated_rating,
        "updatedKnowledge": update.updated_mastery,
    });
    Ok((update.student, summary))
}

/// `{"pair": [a, b]}` or `{"leftover": s}`.
pub fn pairing_event_to_value(event: &PairingEvent) -> Result<Value> {
    let to_value = |s: &Student| {
        serde_json::to_value(s).map_err(|e| EngineError::invalid(format!("student '{}': {e}", s.id)))
    };
    Ok(match event {
        PairingEvent::Pair(a, b) => json!({ "pair": [to_value(a)?, to_value(b)?] }),
        PairingEvent::Leftover(s) => json!({ "leftover": to_value(s)? }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercises() -> Value {
        json!([
            { "id": 1, "category": "math", "elo": 1100 },
            { "id": 2, "category": "math", "elo": 1300 },
            { "id": 3, "category": "science", "elo": 1200 }
        ])
    }

    #[test]
    fn numeric_ids_are_normalised() {
        let s = student_from_value(&json!({ "id": 7, "elos": { "math": 1250 }, "solved": [2, "x"] })).unwrap();
        assert_eq!(s.id, "7");
        assert!(s.solved.contains("2"));
        assert!(s.solved.contains("x"));
        assert!(s.knowledge.is_empty());
    }

    #[test]
    fn chooses_from_raw_documents() {
        let students = json!([{ "id": "a", "elos": { "math": 1250 }, "solved": [2] }]);
        let chosen = choose_exercise_from_json(&students, &json!("math"), &exercises()).unwrap();
        assert_eq!(chosen.id, "1");
    }

    #[test]
    fn type_errors_name_the_argument() {
        let one = json!([{ "id": "a", "elos": { "math": 1200 } }]);
        let cases = [
            (json!({ "id": "a" }), json!("math"), exercises(), "students must be a list"),
            (json!([]), json!("math"), exercises(), "1 or 2 students"),
            (one.clone(), json!("math"), json!({}), "exercises must be a list"),
            (one, json!(5), exercises(), "category must be a string"),
        ];
        for (students, category, exercises, needle) in cases {
            match choose_exercise_from_json(&students, &category, &exercises) {
                Err(EngineError::InvalidInput(msg)) => assert!(msg.contains(needle), "{msg} !~ {needle}"),
                other => panic!("expected InvalidInput containing '{needle}', got {other:?}"),
            }
        }
    }

    #[test]
    fn outcome_parsing() {
        assert_eq!(outcome_from_value(&json!(1)).unwrap(), Outcome::Win);
        assert_eq!(outcome_from_value(&json!(0.0)).unwrap(), Outcome::Draw);
        assert_eq!(outcome_from_value(&json!(-1)).unwrap(), Outcome::Loss);
        for bad in [json!(2), json!(0.5), json!("1"), Value::Null] {
            assert!(outcome_from_value(&bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn update_summary_uses_client_field_names() {
        let engine = RatingEngine::default();
        let (student, summary) = update_from_json(
            &engine,
            &json!({ "id": "s", "elos": { "math": 1200 }, "knowledge": { "math": 0.5 } }),
            &json!({ "id": "e", "category": "math", "elo": 1200 }),
            &json!(1),
        )
        .unwrap();
        assert_eq!(summary["updatedStudentElo"], json!(1216.0));
        assert!(summary["updatedKnowledge"].as_f64().unwrap() > 0.5);
        assert_eq!(student.elos["math"], 1216.0);
    }

    #[test]
    fn exercise_without_elo_is_invalid_input() {
        match exercise_from_value(&json!({ "id": 1, "category": "math" })) {
            Err(EngineError::InvalidInput(msg)) => assert!(msg.contains("elo"), "{msg}"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn pairing_events_serialise_to_client_shape() {
        let a = Student::new("a");
        let v = pairing_event_to_value(&PairingEvent::Leftover(a.clone())).unwrap();
        assert_eq!(v["leftover"]["id"], json!("a"));
        let v = pairing_event_to_value(&PairingEvent::Pair(a, Student::new("b"))).unwrap();
        assert_eq!(v["pair"][1]["id"], json!("b"));
    }
}
