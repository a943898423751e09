//! Quartile matchmaking for peer-learning sessions.
//!
//! The cohort is ranked by `scores[category]` and cut into four contiguous
//! bins (0 = top quarter, 3 = bottom quarter). Students are taken in arrival
//! order and each one is paired with a random student from the complementary
//! bin (`3 - bin`), so strong students meet weak ones and the two middle
//! quarters meet each other. When the complementary bin has run dry any
//! remaining student is eligible. An odd cohort ends with one leftover.
//!
//! ## RNG ordering
//!
//! Exactly one draw is made per pair, and only when the candidate pool has been
//! built. Reordering the steps below changes which partner a given seed picks.

use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};
use std::iter::FusedIterator;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, trace};

use crate::matching_engine::{
    error::{EngineError, Result},
    models::{PairingEvent, PairingRequest, Student},
};

const BIN_COUNT: usize = 4;

/// Lazily produces one [`PairingEvent`] per [`advance`](Self::advance).
///
/// Each stream owns private copies of the cohort and is not resumable: to pair
/// again, build a new stream.
pub struct PairingStream<R = StdRng> {
    category: String,
    rng: R,
    state: State,
}

enum State {
    /// Validated input, not yet ranked.
    Pending { students: Vec<Student>, scores: Vec<f64> },
    Running(Working),
    Finished,
}

/// Working copies for one pass. Students are addressed by their arrival index.
struct Working {
    slots: Vec<Option<Student>>,
    queue: VecDeque<usize>,
    bins: [Vec<usize>; BIN_COUNT],
}

impl Working {
    fn rank(students: Vec<Student>, scores: &[f64]) -> Self {
        let n = students.len();
        let mut order: Vec<usize> = (0..n).collect();
        // Stable, so equal scores (0.0 and -0.0 included) keep arrival order.
        // Scores are finite, so partial_cmp always succeeds.
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        let (t1, t2, t3) = (n / 4, n / 2, n * 3 / 4);
        let mut bins: [Vec<usize>; BIN_COUNT] = Default::default();
        for (rank, &idx) in order.iter().enumerate() {
            let bin = if rank < t1 {
                0
            } else if rank < t2 {
                1
            } else if rank < t3 {
                2
            } else {
                3
            };
            bins[bin].push(idx);
        }

        Working {
            slots: students.into_iter().map(Some).collect(),
            queue: (0..n).collect(),
            bins,
        }
    }

    /// Remove `idx` from whichever bin holds it and return that bin.
    fn take_from_bin(&mut self, idx: usize) -> Option<usize> {
        for (bin, members) in self.bins.iter_mut().enumerate() {
            if let Some(pos) = members.iter().position(|&m| m == idx) {
                members.remove(pos);
                return Some(bin);
            }
        }
        None
    }

    /// Hand out the student at `idx`. Each index leaves the queue exactly once,
    /// so a slot is never taken twice.
    fn take_student(&mut self, idx: usize) -> Student {
        let student = self.slots[idx].take();
        debug_assert!(student.is_some(), "student slot {idx} handed out twice");
        student.unwrap_or_default()
    }
}

impl PairingStream<StdRng> {
    /// Stream seeded from `request.rng_seed`, or from entropy when unset.
    pub fn from_request(request: PairingRequest) -> Result<Self> {
        let rng = match request.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        PairingStream::new(request.category, request.students, rng)
    }
}

impl<R: Rng> PairingStream<R> {
    /// Validate the cohort and wrap it in a stream drawing partners from `rng`.
    ///
    /// Every student needs a finite `scores[category]` and a unique id.
    pub fn new(category: impl Into<String>, students: Vec<Student>, rng: R) -> Result<Self> {
        let category = category.into();
        let scores = students
            .iter()
            .map(|s| s.score(&category))
            .collect::<Result<Vec<f64>>>()?;

        let mut seen = BTreeSet::new();
        for s in &students {
            if !seen.insert(s.id.as_str()) {
                return Err(EngineError::invalid(format!(
                    "student id '{}' appears more than once in the cohort",
                    s.id
                )));
            }
        }

        Ok(PairingStream {
            category,
            rng,
            state: State::Pending { students, scores },
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Produce the next pair, the final leftover, or `None` once exhausted.
    pub fn advance(&mut self) -> Option<PairingEvent> {
        if let State::Pending { .. } = self.state {
            if let State::Pending { students, scores } =
                std::mem::replace(&mut self.state, State::Finished)
            {
                debug!(category = %self.category, cohort = students.len(), "ranking cohort");
                self.state = State::Running(Working::rank(students, &scores));
            }
        }

        let State::Running(work) = &mut self.state else {
            return None;
        };

        match work.queue.len() {
            0 => {
                self.state = State::Finished;
                None
            }
            1 => {
                let idx = work.queue.pop_front()?;
                let last = work.take_student(idx);
                self.state = State::Finished;
                debug!(category = %self.category, student = %last.id, "leftover");
                Some(PairingEvent::Leftover(last))
            }
            _ => {
                let first = work.queue.pop_front()?;
                let first_bin = work.take_from_bin(first).unwrap_or(BIN_COUNT - 1);
                let target = BIN_COUNT - 1 - first_bin;

                let pool: Vec<usize> = if work.bins[target].is_empty() {
                    work.bins.iter().flatten().copied().filter(|&i| i != first).collect()
                } else {
                    work.bins[target].iter().copied().filter(|&i| i != first).collect()
                };

                // Every queued student sits in exactly one bin, and at least one
                // other student is still queued.
                debug_assert!(!pool.is_empty(), "queue and bins disagree");
                let Some(&partner) = pool.choose(&mut self.rng) else {
                    let lone = work.take_student(first);
                    self.state = State::Finished;
                    return Some(PairingEvent::Leftover(lone));
                };

                if let Some(pos) = work.queue.iter().position(|&i| i == partner) {
                    work.queue.remove(pos);
                }
                let partner_bin = work.take_from_bin(partner);
                trace!(first_bin, target, ?partner_bin, pool = pool.len(), "partner drawn");

                let a = work.take_student(first);
                let b = work.take_student(partner);
                debug!(category = %self.category, first = %a.id, partner = %b.id, "paired");
                Some(PairingEvent::Pair(a, b))
            }
        }
    }
}

impl<R: Rng> Iterator for PairingStream<R> {
    type Item = PairingEvent;

    fn next(&mut self) -> Option<PairingEvent> {
        self.advance()
    }
}

impl<R: Rng> FusedIterator for PairingStream<R> {}

/// Run a whole pairing pass and collect every event.
pub fn pair_students(request: PairingRequest) -> Result<Vec<PairingEvent>> {
    Ok(PairingStream::from_request(request)?.collect())
}
