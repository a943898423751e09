//! End-to-end demo of the matching engine.
//!
//! Run with: `cargo run --example demo`
//! Add `RUST_LOG=skill_match_engine=debug` to see the engine's trace events.
//!
//! 1. **Rating** — one student answers three exercises; the Elo rating and
//!    mastery estimate are printed after each attempt.
//! 2. **Selection** — the next exercise for that student, and for a pair.
//! 3. **Pairing** — a seeded quartile pass over a small cohort, advanced step
//!    by step.

use skill_match_engine::{
    choose_exercise, Exercise, Outcome, PairingEvent, PairingRequest, PairingStream,
    RatingEngine, Student,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = RatingEngine::default();
    let exercises = vec![
        Exercise::new("fractions-1", "math", 1100.0),
        Exercise::new("fractions-2", "math", 1250.0),
        Exercise::new("algebra-1", "math", 1400.0),
        Exercise::new("cells-1", "biology", 1200.0),
    ];

    // ── rating ──────────────────────────────────────────────────────────────
    println!("== rating ==");
    let mut ana = Student::new("ana").with_elo("math", 1200.0);
    let attempts = [
        (&exercises[0], Outcome::Win),
        (&exercises[1], Outcome::Draw),
        (&exercises[2], Outcome::Loss),
    ];
    for (exercise, outcome) in attempts {
        match engine.record_result(&ana, exercise, outcome) {
            Ok(update) => {
                println!(
                    "{:<12} {:<5} -> elo {:>6.0}  mastery {:.3}",
                    exercise.id, outcome, update.updated_rating, update.updated_mastery
                );
                ana = update.student;
            }
            Err(e) => eprintln!("update failed: {e}"),
        }
    }
    println!("solved: {:?}  failed: {:?}", ana.solved, ana.failed);

    // ── selection ───────────────────────────────────────────────────────────
    println!("\n== selection ==");
    let ben = Student::new("ben").with_elo("math", 1350.0);
    match choose_exercise(std::slice::from_ref(&ana), "math", &exercises) {
        Ok(ex) => println!("next for ana:       {} (elo {})", ex.id, ex.elo),
        Err(e) => println!("next for ana:       {e}"),
    }
    match choose_exercise(&[ana.clone(), ben], "math", &exercises) {
        Ok(ex) => println!("next for ana + ben: {} (elo {})", ex.id, ex.elo),
        Err(e) => println!("next for ana + ben: {e}"),
    }

    // ── pairing ─────────────────────────────────────────────────────────────
    println!("\n== pairing ==");
    let cohort: Vec<Student> = [
        ("ana", 72.0), ("ben", 91.0), ("cleo", 35.0), ("dev", 58.0),
        ("eli", 80.0), ("fay", 12.0), ("gus", 64.0),
    ]
    .into_iter()
    .map(|(id, score)| Student::new(id).with_score("math", score))
    .collect();

    let mut stream = match PairingStream::from_request(PairingRequest::new("math", cohort).seeded(42)) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("pairing failed: {e}");
            return;
        }
    };
    while let Some(event) = stream.advance() {
        match event {
            PairingEvent::Pair(a, b) => println!(
                "pair     {:<5} ({:>3}) <-> {:<5} ({:>3})",
                a.id, a.scores["math"], b.id, b.scores["math"]
            ),
            PairingEvent::Leftover(s) => println!("leftover {:<5} ({:>3})", s.id, s.scores["math"]),
        }
    }
}
