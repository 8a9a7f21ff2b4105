//! Evolution run configuration.
//!
//! [`EvolutionConfig`] holds every parameter of a run. It is passed by
//! value into [`EvolutionEngine::new`](super::EvolutionEngine::new), can be
//! built in code with `with_*` methods or loaded from JSON, and comes with
//! presets for the three reference problem scales.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::fitness::{EvaluationMode, FitnessWeights};
use super::operators::{CrossoverType, DEFAULT_MUTATION_ATTEMPTS, DEFAULT_TOURNAMENT_SIZE};
use super::DEFAULT_PLACEMENT_ATTEMPTS;
use crate::error::{Error, Result};
use crate::models::ProblemInstance;

/// How fitness is evaluated during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvaluationStrategy {
    /// Always inspect every session.
    #[default]
    Exact,
    /// Always inspect the first `sample_size` sessions.
    Sampled {
        /// Number of leading sessions inspected.
        sample_size: usize,
    },
    /// Sample once the instance has at least `threshold` courses.
    Auto {
        /// Number of leading sessions inspected when sampling.
        sample_size: usize,
        /// Course count from which sampling kicks in.
        threshold: usize,
    },
}

impl EvaluationStrategy {
    /// Resolves the strategy to a concrete mode for an instance.
    pub fn resolve(&self, instance: &ProblemInstance) -> EvaluationMode {
        match *self {
            EvaluationStrategy::Exact => EvaluationMode::Exact,
            EvaluationStrategy::Sampled { sample_size } => EvaluationMode::Sampled { sample_size },
            EvaluationStrategy::Auto {
                sample_size,
                threshold,
            } => {
                if instance.course_count() >= threshold {
                    EvaluationMode::Sampled { sample_size }
                } else {
                    EvaluationMode::Exact
                }
            }
        }
    }
}

/// Configuration of one evolution run.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::EvolutionConfig;
///
/// let config = EvolutionConfig::default();
/// assert_eq!(config.population_size, 200);
/// assert_eq!(config.generations, 100);
/// assert_eq!(config.elite_count(), 20);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::EvolutionConfig;
///
/// let config = EvolutionConfig::default()
///     .with_population_size(20)
///     .with_generations(10)
///     .with_elite_ratio(0.1)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of chromosomes per generation.
    pub population_size: usize,

    /// Number of breeding rounds. The run never stops early.
    pub generations: usize,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Probability of crossing two parents (0.0–1.0).
    ///
    /// When crossover is skipped the first parent is cloned.
    pub crossover_rate: f64,

    /// Fraction of the population copied unchanged (0.0–1.0).
    pub elite_ratio: f64,

    /// Candidates drawn per tournament.
    pub tournament_size: usize,

    /// Crossover strategy.
    pub crossover_type: CrossoverType,

    /// Exact, sampled, or size-dependent evaluation.
    pub evaluation: EvaluationStrategy,

    /// Fitness cache bound. `None` is unbounded.
    pub cache_capacity: Option<usize>,

    /// Fitness term and conflict weights.
    pub weights: FitnessWeights,

    /// Placement retries per course when building the initial population.
    pub placement_attempts: usize,

    /// Slot candidates tried per mutation.
    pub mutation_attempts: usize,

    /// Whether to evaluate and breed on a rayon pool.
    pub parallel: bool,

    /// Worker threads of the pool. 0 lets rayon decide.
    pub worker_threads: usize,

    /// Master seed. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Progress is logged every this many generations. 0 disables it.
    pub log_interval: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self::small()
    }
}

impl EvolutionConfig {
    /// Preset for tens of courses: 200 chromosomes, 100 generations.
    pub fn small() -> Self {
        Self {
            population_size: 200,
            generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elite_ratio: 0.1,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            crossover_type: CrossoverType::SinglePoint,
            evaluation: EvaluationStrategy::Exact,
            cache_capacity: None,
            weights: FitnessWeights::small_scale(),
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            mutation_attempts: DEFAULT_MUTATION_ATTEMPTS,
            parallel: true,
            worker_threads: 0,
            seed: None,
            log_interval: 10,
        }
    }

    /// Preset for around a hundred courses: 500 chromosomes, 200 generations.
    pub fn medium() -> Self {
        Self {
            population_size: 500,
            generations: 200,
            mutation_rate: 0.05,
            crossover_rate: 0.85,
            elite_ratio: 0.1,
            tournament_size: 5,
            weights: FitnessWeights::default(),
            log_interval: 20,
            ..Self::small()
        }
    }

    /// Preset for hundreds of courses: sampled fitness, bounded cache.
    pub fn large() -> Self {
        Self {
            population_size: 1000,
            generations: 300,
            mutation_rate: 0.03,
            crossover_rate: 0.9,
            elite_ratio: 0.1,
            tournament_size: 5,
            evaluation: EvaluationStrategy::Sampled { sample_size: 100 },
            cache_capacity: Some(10_000),
            weights: FitnessWeights::default(),
            log_interval: 30,
            ..Self::small()
        }
    }

    /// Number of elites: `population_size × elite_ratio`, rounded.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_ratio).round() as usize).min(self.population_size)
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the crossover strategy.
    pub fn with_crossover_type(mut self, crossover_type: CrossoverType) -> Self {
        self.crossover_type = crossover_type;
        self
    }

    /// Sets the evaluation strategy.
    pub fn with_evaluation(mut self, evaluation: EvaluationStrategy) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Sets the cache bound (`None` for unbounded).
    pub fn with_cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the placement retries per course.
    pub fn with_placement_attempts(mut self, attempts: usize) -> Self {
        self.placement_attempts = attempts;
        self
    }

    /// Sets the slot candidates tried per mutation.
    pub fn with_mutation_attempts(mut self, attempts: usize) -> Self {
        self.mutation_attempts = attempts;
        self
    }

    /// Enables or disables the worker pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the number of worker threads (0 = rayon default).
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Sets the master seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the progress logging interval (0 disables it).
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns [`Error::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return invalid_config("population_size must be at least 2".into());
        }
        if self.tournament_size == 0 {
            return invalid_config("tournament_size must be at least 1".into());
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("elite_ratio", self.elite_ratio),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return invalid_config(format!("{name} must be within [0, 1], got {rate}"));
            }
        }
        if self.elite_count() >= self.population_size {
            return invalid_config("elite_ratio too high: elites fill entire population".into());
        }
        match self.evaluation {
            EvaluationStrategy::Sampled { sample_size: 0 }
            | EvaluationStrategy::Auto { sample_size: 0, .. } => {
                return invalid_config("sample_size must be at least 1".into());
            }
            _ => {}
        }
        if self.cache_capacity == Some(0) {
            return invalid_config("cache_capacity must be at least 1 (use null for unbounded)".into());
        }
        self.weights.validate().map_err(Error::InvalidConfig)?;
        Ok(())
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// Missing fields take the [`EvolutionConfig::small`] values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

fn invalid_config(message: String) -> Result<()> {
    Err(Error::InvalidConfig(message))
}
