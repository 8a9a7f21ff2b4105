//! Timetable fitness evaluation.
//!
//! Scores a chromosome in [0, 1] as a weighted sum of three terms:
//!
//! ```text
//! fitness  = w_cov·coverage + w_spread·spread + w_conf·(1 − penalty)
//! coverage = scheduled courses / total courses
//! spread   = distinct slots used / total slots
//! penalty  = min(1, conflict score / (max_conflict_per_course · courses))
//! ```
//!
//! The conflict score sums weighted per-session violations: ineligible
//! teacher, unavailable teacher, teacher double-booking, room over
//! capacity, room double-booking, and one point per student shared by
//! two courses held in the same slot.
//!
//! # Modes
//!
//! - [`EvaluationMode::Exact`] inspects every session.
//! - [`EvaluationMode::Sampled`] inspects a bounded prefix, measures spread
//!   and conflicts there, and scales the conflict score linearly up to the
//!   full session count. It is an estimate for large instances; final
//!   results should be re-scored exactly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::Chromosome;
use crate::models::{Conflict, ConflictKind, ProblemInstance, Session};

/// Weights of the fitness terms and of each conflict kind.
///
/// The defaults follow the full conflict model. [`FitnessWeights::small_scale`]
/// reproduces the lighter weighting used for small instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Weight of course coverage.
    pub coverage: f64,
    /// Weight of slot spread.
    pub spread: f64,
    /// Weight of the conflict-free term `1 − penalty`.
    pub conflict: f64,
    /// Score for a teacher not qualified for the course.
    pub ineligible_teacher: f64,
    /// Score for a teacher unavailable at the slot.
    pub unavailable_teacher: f64,
    /// Score for a teacher already teaching at the slot.
    pub teacher_double_booked: f64,
    /// Score for a room holding more students than its capacity.
    pub room_over_capacity: f64,
    /// Score for a room already used at the slot.
    pub room_double_booked: f64,
    /// Score per student attending two courses in one slot.
    pub student_clash: f64,
    /// Conflict score per course at which the penalty saturates.
    pub max_conflict_per_course: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            coverage: 0.4,
            spread: 0.3,
            conflict: 0.3,
            ineligible_teacher: 6.0,
            unavailable_teacher: 5.0,
            teacher_double_booked: 4.0,
            room_over_capacity: 3.0,
            room_double_booked: 2.0,
            student_clash: 1.0,
            max_conflict_per_course: 10.0,
        }
    }
}

impl FitnessWeights {
    /// Weighting used for small (tens of courses) instances: lighter
    /// availability and double-booking scores, penalty saturating at 3 per course.
    pub fn small_scale() -> Self {
        Self {
            unavailable_teacher: 4.0,
            teacher_double_booked: 3.0,
            max_conflict_per_course: 3.0,
            ..Self::default()
        }
    }

    /// Sets the three term weights.
    pub fn with_terms(mut self, coverage: f64, spread: f64, conflict: f64) -> Self {
        self.coverage = coverage;
        self.spread = spread;
        self.conflict = conflict;
        self
    }

    /// Sets the unavailable-teacher score.
    pub fn with_unavailable_teacher(mut self, score: f64) -> Self {
        self.unavailable_teacher = score;
        self
    }

    /// Sets the teacher double-booking score.
    pub fn with_teacher_double_booked(mut self, score: f64) -> Self {
        self.teacher_double_booked = score;
        self
    }

    /// Sets the penalty saturation scale.
    pub fn with_max_conflict_per_course(mut self, scale: f64) -> Self {
        self.max_conflict_per_course = scale;
        self
    }

    /// Score assigned to one occurrence of a conflict kind.
    pub fn score_of(&self, kind: ConflictKind) -> f64 {
        match kind {
            ConflictKind::IneligibleTeacher => self.ineligible_teacher,
            ConflictKind::UnavailableTeacher => self.unavailable_teacher,
            ConflictKind::TeacherDoubleBooked => self.teacher_double_booked,
            ConflictKind::RoomOverCapacity => self.room_over_capacity,
            ConflictKind::RoomDoubleBooked => self.room_double_booked,
            ConflictKind::StudentClash => self.student_clash,
        }
    }

    /// Checks that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let all = [
            ("coverage", self.coverage),
            ("spread", self.spread),
            ("conflict", self.conflict),
            ("ineligible_teacher", self.ineligible_teacher),
            ("unavailable_teacher", self.unavailable_teacher),
            ("teacher_double_booked", self.teacher_double_booked),
            ("room_over_capacity", self.room_over_capacity),
            ("room_double_booked", self.room_double_booked),
            ("student_clash", self.student_clash),
            ("max_conflict_per_course", self.max_conflict_per_course),
        ];
        for (name, w) in all {
            if !w.is_finite() || w < 0.0 {
                return Err(format!("weight `{name}` must be a non-negative number, got {w}"));
            }
        }
        Ok(())
    }
}

/// How many sessions the evaluator inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Every session.
    #[default]
    Exact,
    /// The first `sample_size` sessions, extrapolated.
    Sampled {
        /// Number of leading sessions inspected.
        sample_size: usize,
    },
}

impl EvaluationMode {
    /// Whether this mode approximates.
    pub fn is_sampled(&self) -> bool {
        matches!(self, EvaluationMode::Sampled { .. })
    }
}

/// Occurrences of each conflict kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCounts {
    pub ineligible_teacher: usize,
    pub unavailable_teacher: usize,
    pub teacher_double_booked: usize,
    pub room_over_capacity: usize,
    pub room_double_booked: usize,
    /// Summed over course pairs: students shared by two courses in one slot.
    pub student_clashes: usize,
}

impl ConflictCounts {
    /// Adds `n` occurrences of a kind.
    pub fn record(&mut self, kind: ConflictKind, n: usize) {
        let counter = match kind {
            ConflictKind::IneligibleTeacher => &mut self.ineligible_teacher,
            ConflictKind::UnavailableTeacher => &mut self.unavailable_teacher,
            ConflictKind::TeacherDoubleBooked => &mut self.teacher_double_booked,
            ConflictKind::RoomOverCapacity => &mut self.room_over_capacity,
            ConflictKind::RoomDoubleBooked => &mut self.room_double_booked,
            ConflictKind::StudentClash => &mut self.student_clashes,
        };
        *counter += n;
    }

    /// Occurrences of a kind.
    pub fn get(&self, kind: ConflictKind) -> usize {
        match kind {
            ConflictKind::IneligibleTeacher => self.ineligible_teacher,
            ConflictKind::UnavailableTeacher => self.unavailable_teacher,
            ConflictKind::TeacherDoubleBooked => self.teacher_double_booked,
            ConflictKind::RoomOverCapacity => self.room_over_capacity,
            ConflictKind::RoomDoubleBooked => self.room_double_booked,
            ConflictKind::StudentClash => self.student_clashes,
        }
    }

    /// Total occurrences across all kinds.
    pub fn total(&self) -> usize {
        ConflictKind::ALL.iter().map(|&k| self.get(k)).sum()
    }

    /// Weighted conflict score.
    pub fn score(&self, weights: &FitnessWeights) -> f64 {
        ConflictKind::ALL
            .iter()
            .map(|&k| self.get(k) as f64 * weights.score_of(k))
            .sum()
    }
}

/// Individual fitness terms of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    /// Scheduled courses / total courses.
    pub coverage: f64,
    /// Distinct slots used / total slots (over the inspected sessions).
    pub spread: f64,
    /// Normalized conflict penalty in [0, 1].
    pub penalty: f64,
    /// Weighted conflict score, extrapolated in sampled mode.
    pub conflict_score: f64,
    /// Raw conflict occurrences among the inspected sessions.
    pub counts: ConflictCounts,
    /// Number of sessions inspected.
    pub inspected_sessions: usize,
    /// Final fitness in [0, 1].
    pub fitness: f64,
}

/// Scores chromosomes against one problem instance.
///
/// Holds only shared references and plain weights, so one evaluator can
/// be used from many worker threads at once.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'a> {
    instance: &'a ProblemInstance,
    weights: FitnessWeights,
    mode: EvaluationMode,
}

/// Per-evaluation bookkeeping of occupied resources.
#[derive(Default)]
struct Occupancy {
    teacher_slot: HashSet<(usize, usize)>,
    room_slot: HashSet<(usize, usize)>,
    room_students: HashMap<(usize, usize), HashSet<usize>>,
    /// slot → student → courses attended in that slot so far.
    slot_students: HashMap<usize, HashMap<usize, usize>>,
    slots: HashSet<usize>,
}

impl<'a> FitnessEvaluator<'a> {
    /// Creates an exact evaluator.
    pub fn new(instance: &'a ProblemInstance, weights: FitnessWeights) -> Self {
        Self {
            instance,
            weights,
            mode: EvaluationMode::Exact,
        }
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// The instance being scored against.
    pub fn instance(&self) -> &'a ProblemInstance {
        self.instance
    }

    /// Active weights.
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Active mode.
    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Fitness in [0, 1] under the active mode.
    pub fn evaluate(&self, chromosome: &Chromosome) -> f64 {
        self.breakdown(chromosome).fitness
    }

    /// Fitness in [0, 1] inspecting every session, regardless of mode.
    pub fn evaluate_exact(&self, chromosome: &Chromosome) -> f64 {
        self.exact_breakdown(chromosome).fitness
    }

    /// All fitness terms under the active mode.
    pub fn breakdown(&self, chromosome: &Chromosome) -> FitnessBreakdown {
        match self.mode {
            EvaluationMode::Exact => self.exact_breakdown(chromosome),
            EvaluationMode::Sampled { sample_size } => {
                self.sampled_breakdown(chromosome, sample_size)
            }
        }
    }

    /// All fitness terms inspecting every session.
    pub fn exact_breakdown(&self, chromosome: &Chromosome) -> FitnessBreakdown {
        let sessions = chromosome.sessions();
        let (counts, distinct_slots) = self.tally(sessions, None);
        self.combine(sessions.len(), sessions.len(), distinct_slots, counts, 1.0)
    }

    /// All fitness terms inspecting the first `sample_size` sessions.
    ///
    /// Coverage uses the full session count. Spread and conflicts are
    /// measured on the prefix; the conflict score is multiplied by
    /// `total / sampled` before normalization.
    pub fn sampled_breakdown(&self, chromosome: &Chromosome, sample_size: usize) -> FitnessBreakdown {
        let sessions = chromosome.sessions();
        let sampled = sample_size.max(1).min(sessions.len());
        let (counts, distinct_slots) = self.tally(&sessions[..sampled], None);
        let factor = if sampled == 0 {
            1.0
        } else {
            sessions.len() as f64 / sampled as f64
        };
        self.combine(sessions.len(), sampled, distinct_slots, counts, factor)
    }

    /// Lists every conflict in the chromosome, attributed to the session
    /// that completes it.
    pub fn conflicts(&self, chromosome: &Chromosome) -> Vec<Conflict> {
        let mut found = Vec::new();
        self.tally(chromosome.sessions(), Some(&mut found));
        found
    }

    fn combine(
        &self,
        scheduled: usize,
        inspected: usize,
        distinct_slots: usize,
        counts: ConflictCounts,
        extrapolation: f64,
    ) -> FitnessBreakdown {
        let w = &self.weights;
        let courses = self.instance.course_count();
        let slots = self.instance.slot_count();

        let coverage = if courses == 0 {
            0.0
        } else {
            (scheduled as f64 / courses as f64).min(1.0)
        };
        let spread = if slots == 0 {
            0.0
        } else {
            distinct_slots as f64 / slots as f64
        };

        let conflict_score = counts.score(w) * extrapolation;
        let max_score = (w.max_conflict_per_course * courses as f64).max(1.0);
        let penalty = (conflict_score / max_score).min(1.0);

        let fitness =
            (w.coverage * coverage + w.spread * spread + w.conflict * (1.0 - penalty)).clamp(0.0, 1.0);

        FitnessBreakdown {
            coverage,
            spread,
            penalty,
            conflict_score,
            counts,
            inspected_sessions: inspected,
            fitness,
        }
    }

    /// Counts conflicts in one pass using incremental occupancy sets.
    ///
    /// Returns the counts and the number of distinct slots used.
    fn tally(&self, sessions: &[Session], mut sink: Option<&mut Vec<Conflict>>) -> (ConflictCounts, usize) {
        let inst = self.instance;
        let mut counts = ConflictCounts::default();
        let mut occ = Occupancy::default();

        let mut report = |kind: ConflictKind, n: usize, session: &Session, message: String| {
            counts.record(kind, n);
            if let Some(list) = sink.as_deref_mut() {
                list.push(Conflict::new(kind, session, message));
            }
        };

        for s in sessions {
            occ.slots.insert(s.slot);

            if !inst.is_eligible(s.course, s.teacher) {
                report(
                    ConflictKind::IneligibleTeacher,
                    1,
                    s,
                    format!("teacher {} is not qualified for course {}", s.teacher, s.course),
                );
            }
            if !inst.is_available(s.teacher, s.slot) {
                report(
                    ConflictKind::UnavailableTeacher,
                    1,
                    s,
                    format!("teacher {} is unavailable at slot {}", s.teacher, s.slot),
                );
            }
            if !occ.teacher_slot.insert((s.teacher, s.slot)) {
                report(
                    ConflictKind::TeacherDoubleBooked,
                    1,
                    s,
                    format!("teacher {} already teaches at slot {}", s.teacher, s.slot),
                );
            }
            if !occ.room_slot.insert((s.room, s.slot)) {
                report(
                    ConflictKind::RoomDoubleBooked,
                    1,
                    s,
                    format!("room {} is already used at slot {}", s.room, s.slot),
                );
            }

            let students = inst.enrolled_students(s.course);

            let in_room = occ.room_students.entry((s.room, s.slot)).or_default();
            in_room.extend(students.iter().copied());
            let capacity = inst.room_capacity(s.room);
            if in_room.len() as u64 > u64::from(capacity) {
                let seated = in_room.len();
                report(
                    ConflictKind::RoomOverCapacity,
                    1,
                    s,
                    format!("room {} holds {seated} students, capacity {capacity}", s.room),
                );
            }

            let in_slot = occ.slot_students.entry(s.slot).or_default();
            let mut clashes = 0;
            for &student in students {
                let attended = in_slot.entry(student).or_insert(0);
                clashes += *attended;
                *attended += 1;
            }
            if clashes > 0 {
                report(
                    ConflictKind::StudentClash,
                    clashes,
                    s,
                    format!(
                        "{clashes} enrollments of course {} collide at slot {}",
                        s.course, s.slot
                    ),
                );
            }
        }

        let distinct = occ.slots.len();
        (counts, distinct)
    }
}
