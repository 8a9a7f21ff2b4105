//! University course timetabling with a genetic algorithm.
//!
//! Assigns every course a teacher, a room and a weekly time slot so that
//! teachers are qualified and available, nobody is double-booked, rooms
//! hold their students and students do not face overlapping courses.
//! The search is best-effort: the result is the best timetable found in a
//! fixed number of generations, conflicts included.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ProblemInstance`, `Session`, `Timetable`, `Conflict`
//! - **`ga`**: Chromosome encoding, fitness evaluation, fitness cache,
//!   genetic operators, run configuration and the evolution engine
//! - **`validation`**: Instance integrity checks (table shapes, unknown references)
//! - **`generator`**: Synthetic instances at three reference scales
//! - **`report`**: Weekly grid rendering of a timetable
//! - **`error`**: Crate error type
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_timetable::ga::{EvolutionConfig, EvolutionEngine};
//! use u_timetable::generator::{GeneratorParams, InstanceGenerator};
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let instance = InstanceGenerator::new(GeneratorParams::small())
//!     .generate(&mut rng)
//!     .unwrap();
//!
//! let config = EvolutionConfig::small()
//!     .with_population_size(30)
//!     .with_generations(5)
//!     .with_seed(42);
//! let result = EvolutionEngine::new(&instance, config).unwrap().run();
//! assert!(result.exact_fitness > 0.0);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod error;
pub mod ga;
pub mod generator;
pub mod models;
pub mod report;
pub mod validation;

pub use error::{Error, Result};
