//! Configurable genetic operators for timetabling.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`], plus tournament selection.
//!
//! Every operator returns a fresh [`Chromosome`] and leaves its inputs
//! untouched, so parents can be shared across worker threads.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ga::operators::{GeneticOperators, CrossoverType, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::SinglePoint);
//! assert_eq!(ops.mutation_type, MutationType::RoomOrSlot);
//! assert_eq!(ops.tournament_size, 3);
//! ```

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Chromosome;
use crate::models::{ProblemInstance, Session};

/// Default number of candidate slots tried by a slot mutation.
pub const DEFAULT_MUTATION_ATTEMPTS: usize = 5;

/// Default tournament size.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

/// Crossover strategy for timetable chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// Prefix of parent A up to a random cut, remaining courses from B.
    #[default]
    SinglePoint,
    /// Each of A's sessions kept with probability ½, remaining courses from B.
    Uniform,
}

/// Mutation strategy for timetable chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Fair coin between moving the room and moving the slot.
    #[default]
    RoomOrSlot,
    /// Always move the room.
    Room,
    /// Always move the slot.
    Slot,
}

/// Runtime-selectable genetic operators for the timetabling GA.
///
/// # Example
///
/// ```
/// use u_timetable::ga::operators::{GeneticOperators, CrossoverType, MutationType};
///
/// let ops = GeneticOperators::default()
///     .with_crossover(CrossoverType::Uniform)
///     .with_tournament_size(5);
/// assert_eq!(ops.tournament_size, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
    /// Candidates drawn per tournament.
    pub tournament_size: usize,
    /// Slot candidates tried before settling on an unavailable one.
    pub mutation_attempts: usize,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::SinglePoint,
            mutation_type: MutationType::RoomOrSlot,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            mutation_attempts: DEFAULT_MUTATION_ATTEMPTS,
        }
    }
}

impl GeneticOperators {
    /// Sets the crossover strategy.
    pub fn with_crossover(mut self, crossover_type: CrossoverType) -> Self {
        self.crossover_type = crossover_type;
        self
    }

    /// Sets the mutation strategy.
    pub fn with_mutation(mut self, mutation_type: MutationType) -> Self {
        self.mutation_type = mutation_type;
        self
    }

    /// Sets the tournament size (at least 1).
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k.max(1);
        self
    }

    /// Sets the slot mutation retry budget (at least 1).
    pub fn with_mutation_attempts(mut self, attempts: usize) -> Self {
        self.mutation_attempts = attempts.max(1);
        self
    }

    /// Picks a parent by tournament. Returns `None` for an empty population.
    pub fn select<'p, R: Rng>(&self, population: &'p [Chromosome], rng: &mut R) -> Option<&'p Chromosome> {
        tournament_select(population, self.tournament_size, rng)
    }

    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(&self, a: &Chromosome, b: &Chromosome, rng: &mut R) -> Chromosome {
        match self.crossover_type {
            CrossoverType::SinglePoint => single_point_crossover(a, b, rng),
            CrossoverType::Uniform => uniform_crossover(a, b, rng),
        }
    }

    /// Performs mutation using the configured strategy.
    pub fn mutate<R: Rng>(&self, chromosome: &Chromosome, instance: &ProblemInstance, rng: &mut R) -> Chromosome {
        mutate(chromosome, instance, self.mutation_type, self.mutation_attempts, rng)
    }
}

/// Tournament selection with replacement.
///
/// Draws `k` members uniformly (with replacement) and returns the one with
/// the highest fitness. Unevaluated members rank last.
pub fn tournament_select<'p, R: Rng>(
    population: &'p [Chromosome],
    k: usize,
    rng: &mut R,
) -> Option<&'p Chromosome> {
    if population.is_empty() {
        return None;
    }
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..k.max(1) {
        let candidate = &population[rng.random_range(0..population.len())];
        if candidate.rank_fitness() > best.rank_fitness() {
            best = candidate;
        }
    }
    Some(best)
}

/// Single-point crossover.
///
/// The cut is drawn from `0..=min(len_a, len_b)`. The child takes A's
/// sessions before the cut, then every session of B whose course is not
/// yet scheduled, in B's order.
pub fn single_point_crossover<R: Rng>(a: &Chromosome, b: &Chromosome, rng: &mut R) -> Chromosome {
    let shorter = a.len().min(b.len());
    let cut = rng.random_range(0..=shorter);
    fill_from(a.sessions()[..cut].to_vec(), b)
}

/// Uniform crossover: each of A's sessions is kept with probability ½,
/// then B fills the remaining courses.
pub fn uniform_crossover<R: Rng>(a: &Chromosome, b: &Chromosome, rng: &mut R) -> Chromosome {
    let kept: Vec<Session> = a
        .sessions()
        .iter()
        .filter(|_| rng.random_bool(0.5))
        .copied()
        .collect();
    fill_from(kept, b)
}

fn fill_from(mut sessions: Vec<Session>, donor: &Chromosome) -> Chromosome {
    let mut used: HashSet<usize> = sessions.iter().map(|s| s.course).collect();
    for s in donor.sessions() {
        if used.insert(s.course) {
            sessions.push(*s);
        }
    }
    Chromosome::new(sessions)
}

/// Moves one randomly chosen session to another room or slot.
///
/// A slot move retries up to `attempts` candidates looking for a slot
/// where the teacher is available and otherwise keeps the last one drawn.
/// When the chosen dimension has a single value the other one is moved.
/// An empty chromosome comes back as an unevaluated copy.
pub fn mutate<R: Rng>(
    chromosome: &Chromosome,
    instance: &ProblemInstance,
    mutation_type: MutationType,
    attempts: usize,
    rng: &mut R,
) -> Chromosome {
    if chromosome.is_empty() {
        return Chromosome::new(chromosome.sessions().to_vec());
    }

    let index = rng.random_range(0..chromosome.len());
    let session = chromosome.sessions()[index];

    let rooms = instance.room_count();
    let slots = instance.slot_count();
    let mut move_room = match mutation_type {
        MutationType::RoomOrSlot => rng.random_bool(0.5),
        MutationType::Room => true,
        MutationType::Slot => false,
    };
    if move_room && rooms < 2 {
        move_room = false;
    } else if !move_room && slots < 2 {
        move_room = true;
    }

    let mutated = if move_room && rooms >= 2 {
        session.with_room(other_than(session.room, rooms, rng))
    } else if !move_room && slots >= 2 {
        let mut slot = session.slot;
        for _ in 0..attempts.max(1) {
            slot = other_than(session.slot, slots, rng);
            if instance.is_available(session.teacher, slot) {
                break;
            }
        }
        session.with_slot(slot)
    } else {
        session
    };

    chromosome.with_session(index, mutated)
}

/// Uniform draw from `0..n` excluding `current`. Requires `n >= 2`.
fn other_than<R: Rng>(current: usize, n: usize, rng: &mut R) -> usize {
    let drawn = rng.random_range(0..n - 1);
    if drawn >= current {
        drawn + 1
    } else {
        drawn
    }
}
