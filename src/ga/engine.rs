//! Generational evolution loop.
//!
//! [`EvolutionEngine`] runs a fixed number of generations over a fixed-size
//! population:
//!
//! ```text
//! Init → Evaluating → Ranked → Breeding ─┐
//!            ▲                           │ (× generations)
//!            └───────────────────────────┘
//!        → Evaluating → Ranked → Terminated
//! ```
//!
//! Each generation keeps the top `elite_count` chromosomes unchanged and
//! fills the rest with offspring (tournament selection, crossover with
//! probability `crossover_rate`, mutation with probability `mutation_rate`).
//!
//! # Parallelism
//!
//! Initialization, evaluation and offspring construction run on a private
//! rayon pool. Every chromosome built in parallel gets its own `SmallRng`
//! seeded from the master RNG beforehand, so a fixed seed gives the same
//! run for any thread count. The [`FitnessCache`] is the only shared
//! mutable state.
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cache::FitnessCache;
use super::config::EvolutionConfig;
use super::fitness::{EvaluationMode, FitnessBreakdown, FitnessEvaluator};
use super::operators::GeneticOperators;
use super::Chromosome;
use crate::error::{Error, Result};
use crate::models::{Conflict, ProblemInstance, Timetable};

/// Current step of the evolution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Building the initial population.
    Init,
    /// Scoring the population.
    Evaluating,
    /// Population sorted by descending fitness.
    Ranked,
    /// Building the next generation.
    Breeding,
    /// Run finished.
    Terminated,
}

/// Fitness statistics of one ranked generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index; 0 is the initial population.
    pub generation: usize,
    /// Highest fitness.
    pub best: f64,
    /// Lowest fitness.
    pub worst: f64,
    /// Mean fitness.
    pub mean: f64,
}

impl GenerationStats {
    fn from_ranked(generation: usize, ranked: &[Chromosome]) -> Self {
        let best = ranked.first().map_or(0.0, Chromosome::rank_fitness);
        let worst = ranked.last().map_or(0.0, Chromosome::rank_fitness);
        let mean = if ranked.is_empty() {
            0.0
        } else {
            ranked.iter().map(Chromosome::rank_fitness).sum::<f64>() / ranked.len() as f64
        };
        Self {
            generation,
            best,
            worst,
            mean,
        }
    }

    /// Fitness spread of the generation (`best − worst`).
    pub fn diversity(&self) -> f64 {
        self.best - self.worst
    }
}

/// Outcome of an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Best chromosome of the final generation.
    pub best: Chromosome,
    /// Its fitness under the run's evaluation mode.
    pub best_fitness: f64,
    /// Its fitness inspecting every session.
    pub exact_fitness: f64,
    /// Exact fitness terms of the best chromosome.
    pub breakdown: FitnessBreakdown,
    /// Conflicts remaining in the best chromosome.
    pub conflicts: Vec<Conflict>,
    /// Breeding rounds performed.
    pub generations: usize,
    /// Statistics of the initial population and every later generation.
    pub history: Vec<GenerationStats>,
    /// Fitness cache hits over the run.
    pub cache_hits: u64,
    /// Fitness cache misses over the run.
    pub cache_misses: u64,
}

impl EvolutionResult {
    /// Best chromosome as a reportable timetable, scored exactly.
    pub fn timetable(&self) -> Timetable {
        Timetable::new(self.best.sessions().to_vec(), self.exact_fitness)
            .with_conflicts(self.conflicts.clone())
    }
}

/// Genetic optimizer for one problem instance.
///
/// # Usage
///
/// ```
/// use u_timetable::ga::{EvolutionConfig, EvolutionEngine};
/// use u_timetable::models::ProblemInstance;
///
/// let instance = ProblemInstance::builder(5, 2, 2, 4, 10)
///     .with_all_eligible()
///     .build()
///     .unwrap();
/// let config = EvolutionConfig::default()
///     .with_population_size(20)
///     .with_generations(10)
///     .with_seed(42);
///
/// let mut engine = EvolutionEngine::new(&instance, config).unwrap();
/// let result = engine.run();
/// assert!(result.best_fitness >= 0.0 && result.best_fitness <= 1.0);
/// assert_eq!(result.history.len(), 11);
/// ```
pub struct EvolutionEngine<'a> {
    instance: &'a ProblemInstance,
    config: EvolutionConfig,
    evaluator: FitnessEvaluator<'a>,
    operators: GeneticOperators,
    cache: FitnessCache,
    pool: Option<ThreadPool>,
    phase: EnginePhase,
}

impl<'a> EvolutionEngine<'a> {
    /// Creates an engine after validating the configuration.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] if a parameter is out of range or the
    /// worker pool cannot be built.
    pub fn new(instance: &'a ProblemInstance, config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let mode = config.evaluation.resolve(instance);
        let evaluator = FitnessEvaluator::new(instance, config.weights.clone()).with_mode(mode);
        let operators = GeneticOperators::default()
            .with_crossover(config.crossover_type)
            .with_tournament_size(config.tournament_size)
            .with_mutation_attempts(config.mutation_attempts);
        let cache = FitnessCache::with_capacity(config.cache_capacity);

        let pool = if config.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("timetable-worker-{i}"))
                .build()
                .map_err(|e| Error::InvalidConfig(format!("cannot build worker pool: {e}")))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            instance,
            config,
            evaluator,
            operators,
            cache,
            pool,
            phase: EnginePhase::Init,
        })
    }

    /// Run configuration.
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Fitness evaluator used by the run.
    pub fn evaluator(&self) -> &FitnessEvaluator<'a> {
        &self.evaluator
    }

    /// Evaluation mode resolved for this instance.
    pub fn mode(&self) -> EvaluationMode {
        self.evaluator.mode()
    }

    /// Current phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Shared fitness cache.
    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    /// Runs the full evolution and returns the best timetable found.
    pub fn run(&mut self) -> EvolutionResult {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let generations = self.config.generations;

        info!(
            "evolving {} courses: population {}, {} generations, {:?} evaluation",
            self.instance.course_count(),
            self.config.population_size,
            generations,
            self.mode()
        );

        self.set_phase(EnginePhase::Init);
        let mut population = self.initial_population(&mut rng);
        let mut history = Vec::with_capacity(generations + 1);

        for generation in 0..generations {
            self.evaluate_and_rank(&mut population);
            let stats = GenerationStats::from_ranked(generation, &population);
            self.log_progress(&stats);
            history.push(stats);

            self.set_phase(EnginePhase::Breeding);
            population = self.breed(&population, &mut rng);
        }

        self.evaluate_and_rank(&mut population);
        let stats = GenerationStats::from_ranked(generations, &population);
        self.log_progress(&stats);
        history.push(stats);
        self.set_phase(EnginePhase::Terminated);

        let best = population.into_iter().next().unwrap_or_else(Chromosome::empty);
        let breakdown = self.evaluator.exact_breakdown(&best);
        let best_fitness = best.fitness().unwrap_or(breakdown.fitness);
        let conflicts = self.evaluator.conflicts(&best);

        info!(
            "finished: best {:.4} (exact {:.4}), {} of {} courses scheduled, {} conflicts, cache hit rate {:.1}%",
            best_fitness,
            breakdown.fitness,
            best.len(),
            self.instance.course_count(),
            conflicts.len(),
            self.cache.hit_rate() * 100.0
        );

        EvolutionResult {
            best,
            best_fitness,
            exact_fitness: breakdown.fitness,
            breakdown,
            conflicts,
            generations,
            history,
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
        }
    }

    fn set_phase(&mut self, phase: EnginePhase) {
        debug!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn log_progress(&self, stats: &GenerationStats) {
        let interval = self.config.log_interval;
        let last = stats.generation == self.config.generations;
        if interval > 0 && (stats.generation % interval == 0 || last) {
            info!(
                "generation {:>4}: best {:.4}, mean {:.4}, worst {:.4}, diversity {:.4}",
                stats.generation,
                stats.best,
                stats.mean,
                stats.worst,
                stats.diversity()
            );
        }
    }

    /// Draws one seed per chromosome so parallel construction stays reproducible.
    fn child_seeds(rng: &mut SmallRng, n: usize) -> Vec<u64> {
        (0..n).map(|_| rng.random()).collect()
    }

    fn initial_population(&self, rng: &mut SmallRng) -> Vec<Chromosome> {
        let seeds = Self::child_seeds(rng, self.config.population_size);
        let instance = self.instance;
        let attempts = self.config.placement_attempts;
        let build = |seed: &u64| {
            let mut child_rng = SmallRng::seed_from_u64(*seed);
            Chromosome::generate(instance, attempts, &mut child_rng)
        };

        match &self.pool {
            Some(pool) => pool.install(|| seeds.par_iter().map(build).collect()),
            None => seeds.iter().map(build).collect(),
        }
    }

    fn evaluate_and_rank(&mut self, population: &mut [Chromosome]) {
        self.set_phase(EnginePhase::Evaluating);
        self.evaluate_population(population);
        self.set_phase(EnginePhase::Ranked);
        rank(population);
    }

    /// Fills in missing fitness values, consulting the cache first.
    fn evaluate_population(&self, population: &mut [Chromosome]) {
        let cache = &self.cache;
        let evaluator = &self.evaluator;
        let score = |ch: &mut Chromosome| {
            if ch.fitness().is_some() {
                return;
            }
            let fitness = cache.get_or_compute(ch.key(), || evaluator.evaluate(ch));
            ch.set_fitness(fitness);
        };

        match &self.pool {
            Some(pool) => pool.install(|| population.par_iter_mut().for_each(score)),
            None => population.iter_mut().for_each(score),
        }
    }

    /// Builds the next generation from a ranked population.
    fn breed(&self, ranked: &[Chromosome], rng: &mut SmallRng) -> Vec<Chromosome> {
        let size = self.config.population_size;
        let elites = self.config.elite_count().min(ranked.len());
        let seeds = Self::child_seeds(rng, size.saturating_sub(elites));

        let make = |seed: &u64| {
            let mut child_rng = SmallRng::seed_from_u64(*seed);
            self.offspring(ranked, &mut child_rng)
        };
        let offspring: Vec<Chromosome> = match &self.pool {
            Some(pool) => pool.install(|| seeds.par_iter().map(make).collect()),
            None => seeds.iter().map(make).collect(),
        };

        let mut next = Vec::with_capacity(size);
        next.extend_from_slice(&ranked[..elites]);
        next.extend(offspring);
        next
    }

    fn offspring(&self, parents: &[Chromosome], rng: &mut SmallRng) -> Chromosome {
        let (Some(a), Some(b)) = (
            self.operators.select(parents, rng),
            self.operators.select(parents, rng),
        ) else {
            return Chromosome::empty();
        };

        let child = if rng.random_bool(self.config.crossover_rate) {
            self.operators.crossover(a, b, rng)
        } else {
            a.clone()
        };

        if rng.random_bool(self.config.mutation_rate) {
            self.operators.mutate(&child, self.instance, rng)
        } else {
            child
        }
    }
}

/// Stable sort by descending fitness; unevaluated chromosomes go last.
fn rank(population: &mut [Chromosome]) {
    population.sort_by(|a, b| b.rank_fitness().total_cmp(&a.rank_fitness()));
}
