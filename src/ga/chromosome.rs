//! Session-list chromosome for timetabling.
//!
//! # Encoding
//!
//! A chromosome is an ordered list of [`Session`]s with at most one
//! session per course. Courses without a session are unscheduled; the
//! fitness function penalizes the gap instead of the encoding forbidding it.
//!
//! Each chromosome carries a [`CacheKey`], a SHA-256 digest of its ordered
//! session sequence, so equal timetables share fitness cache entries and
//! any change to a session produces a new key.

use std::collections::HashSet;
use std::fmt;

use rand::prelude::IndexedRandom;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::models::{ProblemInstance, Session};

/// Default number of placement attempts per course during generation.
pub const DEFAULT_PLACEMENT_ATTEMPTS: usize = 50;

/// Content digest of a chromosome's ordered session sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Digests an ordered session sequence.
    pub fn of(sessions: &[Session]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((sessions.len() as u64).to_le_bytes());
        for s in sessions {
            for field in [s.course, s.teacher, s.room, s.slot] {
                hasher.update((field as u64).to_le_bytes());
            }
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", &self.to_string()[..12])
    }
}

/// Candidate timetable.
///
/// Higher fitness = better timetable (maximization convention).
/// Fitness is memoized: `None` until evaluated, carried along by clones
/// (elites keep their score), and absent on every operator result.
#[derive(Debug, Clone)]
pub struct Chromosome {
    sessions: Vec<Session>,
    key: CacheKey,
    fitness: Option<f64>,
}

impl PartialEq for Chromosome {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.sessions == other.sessions
    }
}

impl Chromosome {
    /// Creates an unevaluated chromosome from a session list.
    pub fn new(sessions: Vec<Session>) -> Self {
        let key = CacheKey::of(&sessions);
        Self {
            sessions,
            key,
            fitness: None,
        }
    }

    /// A chromosome that schedules nothing.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Builds a random, mostly conflict-free chromosome.
    ///
    /// For each course, samples (eligible teacher, slot, room) triples and
    /// accepts the first one where the teacher is available and neither the
    /// teacher nor the room is already taken at that slot. After
    /// `max_attempts` rejections the course is left unscheduled, as is any
    /// course with no eligible teacher.
    pub fn generate<R: Rng>(instance: &ProblemInstance, max_attempts: usize, rng: &mut R) -> Self {
        let mut sessions = Vec::with_capacity(instance.course_count());
        if instance.room_count() == 0 || instance.slot_count() == 0 {
            return Self::new(sessions);
        }

        let mut teacher_busy: HashSet<(usize, usize)> = HashSet::new();
        let mut room_busy: HashSet<(usize, usize)> = HashSet::new();

        for course in 0..instance.course_count() {
            let eligible = instance.eligible_teachers(course);
            if eligible.is_empty() {
                continue;
            }

            for _ in 0..max_attempts {
                let Some(&teacher) = eligible.choose(rng) else {
                    break;
                };
                let slot = rng.random_range(0..instance.slot_count());
                let room = rng.random_range(0..instance.room_count());

                if instance.is_available(teacher, slot)
                    && !teacher_busy.contains(&(teacher, slot))
                    && !room_busy.contains(&(room, slot))
                {
                    teacher_busy.insert((teacher, slot));
                    room_busy.insert((room, slot));
                    sessions.push(Session::new(course, teacher, room, slot));
                    break;
                }
            }
        }

        Self::new(sessions)
    }

    /// Sessions in chromosome order.
    #[inline]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of scheduled courses.
    #[inline]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no course is scheduled.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Structural cache key.
    #[inline]
    pub fn key(&self) -> CacheKey {
        self.key
    }

    /// Memoized fitness, if evaluated.
    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness used for ranking; unevaluated chromosomes rank last.
    #[inline]
    pub fn rank_fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Records an evaluated fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Drops the memoized fitness.
    pub fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }

    /// Session scheduling `course`, if any.
    pub fn session_for(&self, course: usize) -> Option<&Session> {
        self.sessions.iter().find(|s| s.course == course)
    }

    /// Returns a new chromosome with the session at `index` replaced.
    ///
    /// Out-of-range indices yield an unevaluated copy.
    pub fn with_session(&self, index: usize, session: Session) -> Self {
        let mut sessions = self.sessions.clone();
        if let Some(slot) = sessions.get_mut(index) {
            *slot = session;
        }
        Self::new(sessions)
    }

    /// Whether every course appears at most once.
    pub fn has_unique_courses(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.sessions.len());
        self.sessions.iter().all(|s| seen.insert(s.course))
    }

    /// Validates the chromosome against an instance: unique courses and
    /// every index within the instance's dimensions.
    pub fn is_valid(&self, instance: &ProblemInstance) -> bool {
        self.has_unique_courses()
            && self.sessions.iter().all(|s| {
                s.course < instance.course_count()
                    && s.teacher < instance.teacher_count()
                    && s.room < instance.room_count()
                    && s.slot < instance.slot_count()
            })
    }
}

impl From<Vec<Session>> for Chromosome {
    fn from(sessions: Vec<Session>) -> Self {
        Self::new(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_instance() -> ProblemInstance {
        ProblemInstance::builder(6, 3, 2, 5, 30)
            .with_eligible(0, [0, 1])
            .with_eligible(1, [1])
            .with_eligible(2, [2])
            .with_eligible(3, [0, 2])
            .with_eligible(4, [1, 2])
            // course 5 has nobody
            .with_availability(1, 0, false)
            .with_availability(1, 1, false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_generate_respects_constraints() {
        let inst = sample_instance();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = Chromosome::generate(&inst, DEFAULT_PLACEMENT_ATTEMPTS, &mut rng);

        assert!(ch.is_valid(&inst));
        assert!(ch.session_for(5).is_none());
        assert!(ch.fitness().is_none());

        for s in ch.sessions() {
            assert!(inst.is_eligible(s.course, s.teacher));
            assert!(inst.is_available(s.teacher, s.slot));
        }
        for (i, a) in ch.sessions().iter().enumerate() {
            for b in &ch.sessions()[i + 1..] {
                assert!(!a.clashes_with(b), "{a:?} clashes with {b:?}");
            }
        }
    }

    #[test]
    fn test_generate_schedules_every_teachable_course() {
        let inst = sample_instance();
        let mut rng = SmallRng::seed_from_u64(7);
        let ch = Chromosome::generate(&inst, DEFAULT_PLACEMENT_ATTEMPTS, &mut rng);
        assert_eq!(ch.len(), 5);
    }

    #[test]
    fn test_generate_zero_attempts_is_empty() {
        let inst = sample_instance();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = Chromosome::generate(&inst, 0, &mut rng);
        assert!(ch.is_empty());
    }

    #[test]
    fn test_cache_key_tracks_content() {
        let a = Chromosome::new(vec![Session::new(0, 0, 0, 0), Session::new(1, 1, 1, 1)]);
        let b = Chromosome::new(vec![Session::new(0, 0, 0, 0), Session::new(1, 1, 1, 1)]);
        let reordered = Chromosome::new(vec![Session::new(1, 1, 1, 1), Session::new(0, 0, 0, 0)]);
        let moved = a.with_session(1, Session::new(1, 1, 0, 1));

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), reordered.key());
        assert_ne!(a.key(), moved.key());
        assert_ne!(Chromosome::empty().key(), a.key());
    }

    #[test]
    fn test_cache_key_distinguishes_hash_sum_collisions() {
        // (course*1000 + teacher*100 + room*10 + slot) sums are equal here.
        let a = Chromosome::new(vec![Session::new(0, 0, 1, 0), Session::new(0, 0, 0, 1)]);
        let b = Chromosome::new(vec![Session::new(0, 0, 0, 11)]);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_clone_is_deep_and_keeps_fitness() {
        let mut a = Chromosome::new(vec![Session::new(0, 0, 0, 0)]);
        a.set_fitness(0.75);
        let b = a.clone();
        assert_eq!(b.fitness(), Some(0.75));
        assert_eq!(a, b);

        let c = b.with_session(0, Session::new(0, 0, 1, 0));
        assert_eq!(a.sessions()[0].room, 0);
        assert!(c.fitness().is_none());
    }

    #[test]
    fn test_invalidate_fitness() {
        let mut a = Chromosome::empty();
        a.set_fitness(0.3);
        a.invalidate_fitness();
        assert!(a.fitness().is_none());
        assert_eq!(a.rank_fitness(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_duplicate_course_detection() {
        let inst = sample_instance();
        let ch = Chromosome::new(vec![Session::new(0, 0, 0, 0), Session::new(0, 1, 1, 1)]);
        assert!(!ch.has_unique_courses());
        assert!(!ch.is_valid(&inst));

        let out_of_range = Chromosome::new(vec![Session::new(0, 0, 9, 0)]);
        assert!(!out_of_range.is_valid(&inst));
    }

    #[test]
    fn test_display_key_is_hex() {
        let key = Chromosome::empty().key();
        let hex = key.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
