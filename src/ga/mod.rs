//! Genetic optimization of timetables.
//!
//! # Encoding
//!
//! A [`Chromosome`] is an ordered list of [`Session`](crate::models::Session)s,
//! at most one per course. Unscheduled courses are simply absent and cost
//! coverage in the fitness.
//!
//! # Submodules
//!
//! - [`fitness`]: Weighted coverage / spread / conflict scoring, exact or sampled
//! - [`cache`]: Concurrent fitness memo keyed by chromosome digest
//! - [`operators`]: Tournament selection, crossover and mutation strategies
//! - [`config`]: Run parameters and scale presets
//! - [`engine`]: Generational loop with elitism on a rayon pool
//!
//! # Reference
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing"

pub mod cache;
mod chromosome;
pub mod config;
pub mod engine;
pub mod fitness;
pub mod operators;

pub use cache::FitnessCache;
pub use chromosome::{CacheKey, Chromosome, DEFAULT_PLACEMENT_ATTEMPTS};
pub use config::{EvaluationStrategy, EvolutionConfig};
pub use engine::{EnginePhase, EvolutionEngine, EvolutionResult, GenerationStats};
pub use fitness::{ConflictCounts, EvaluationMode, FitnessBreakdown, FitnessEvaluator, FitnessWeights};
pub use operators::{CrossoverType, GeneticOperators, MutationType};
