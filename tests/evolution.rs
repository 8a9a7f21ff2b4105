//! End-to-end runs of the timetabling GA.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use u_timetable::ga::{
    Chromosome, EvaluationMode, EvaluationStrategy, EvolutionConfig, EvolutionEngine, FitnessEvaluator,
    FitnessWeights, DEFAULT_PLACEMENT_ATTEMPTS,
};
use u_timetable::generator::{GeneratorParams, InstanceGenerator};
use u_timetable::models::ProblemInstance;
use u_timetable::report::{render_timetable, ReportLayout};

/// 5 courses, 2 teachers qualified for everything and always available,
/// 2 rooms, 4 slots, no student in two courses.
fn scenario_instance() -> ProblemInstance {
    let mut builder = ProblemInstance::builder(5, 2, 2, 4, 100).with_all_eligible();
    for course in 0..5 {
        builder = builder.with_enrollment(course, course * 20..course * 20 + 20);
    }
    builder.build().unwrap()
}

fn scenario_config(seed: u64) -> EvolutionConfig {
    EvolutionConfig::default()
        .with_population_size(20)
        .with_generations(10)
        .with_elite_ratio(0.1)
        .with_mutation_rate(0.1)
        .with_crossover_rate(0.8)
        .with_seed(seed)
}

#[test]
fn test_scenario_reaches_conflict_free_timetable() {
    let inst = scenario_instance();
    let trials = 20;
    let mut good = 0;
    for seed in 0..trials {
        let mut engine = EvolutionEngine::new(&inst, scenario_config(seed)).unwrap();
        assert_eq!(engine.config().elite_count(), 2);
        let result = engine.run();
        if result.best_fitness >= 0.9
            && (result.breakdown.coverage - 1.0).abs() < 1e-12
            && result.breakdown.penalty == 0.0
        {
            good += 1;
        }
    }
    assert!(good * 100 >= trials * 95, "only {good} of {trials} trials succeeded");
}

#[test]
fn test_sampled_fitness_tracks_exact_on_large_instance() {
    let mut rng = SmallRng::seed_from_u64(42);
    let inst = InstanceGenerator::new(GeneratorParams::large())
        .generate(&mut rng)
        .unwrap();
    assert_eq!(inst.course_count(), 500);

    let exact = FitnessEvaluator::new(&inst, FitnessWeights::default());
    let sampled = exact
        .clone()
        .with_mode(EvaluationMode::Sampled { sample_size: 100 });

    for _ in 0..10 {
        let ch = Chromosome::generate(&inst, DEFAULT_PLACEMENT_ATTEMPTS, &mut rng);
        let e = exact.evaluate(&ch);
        let s = sampled.evaluate(&ch);
        assert!((e - s).abs() <= 0.15, "exact {e:.4} vs sampled {s:.4}");
    }
}

#[test]
fn test_elitism_on_generated_instance() {
    let mut rng = SmallRng::seed_from_u64(42);
    let inst = InstanceGenerator::new(GeneratorParams::small())
        .generate(&mut rng)
        .unwrap();
    let config = EvolutionConfig::small()
        .with_population_size(60)
        .with_generations(25)
        .with_seed(42);
    let result = EvolutionEngine::new(&inst, config).unwrap().run();

    let bests: Vec<f64> = result.history.iter().map(|s| s.best).collect();
    assert!(bests.windows(2).all(|w| w[1] >= w[0]), "{bests:?}");
    assert!(result.best.is_valid(&inst));
    assert!(result.best_fitness >= bests[0]);
}

#[test]
fn test_large_preset_samples_and_rescores() {
    let mut rng = SmallRng::seed_from_u64(7);
    let inst = InstanceGenerator::new(GeneratorParams::large())
        .generate(&mut rng)
        .unwrap();
    let config = EvolutionConfig::large()
        .with_population_size(30)
        .with_generations(3)
        .with_seed(7);
    let mut engine = EvolutionEngine::new(&inst, config).unwrap();
    assert!(engine.mode().is_sampled());

    let result = engine.run();
    let exact = engine.evaluator().evaluate_exact(&result.best);
    assert!((result.exact_fitness - exact).abs() < 1e-12);
    assert!((result.exact_fitness - result.best_fitness).abs() <= 0.15);
    assert!(engine.cache().len() <= 10_000);
}

#[test]
fn test_auto_strategy_switches_on_course_count() {
    let auto = EvaluationStrategy::Auto {
        sample_size: 50,
        threshold: 100,
    };
    let inst = scenario_instance();
    let engine = EvolutionEngine::new(&inst, scenario_config(1).with_evaluation(auto)).unwrap();
    assert_eq!(engine.mode(), EvaluationMode::Exact);
}

#[test]
fn test_instance_from_json_runs_and_reports() {
    let json = r#"{
        "course_count": 3,
        "teacher_count": 2,
        "room_count": 1,
        "slot_count": 5,
        "student_count": 6,
        "eligibility": [[0], [1], [0, 1]],
        "availability": [
            [true, true, false, true, true],
            [true, false, true, true, true]
        ],
        "room_capacities": [30],
        "enrollments": [[0, 1], [1, 2], [3, 4, 5]],
        "course_names": ["Algorithms", "Networks", "Databases"]
    }"#;
    let inst = ProblemInstance::from_json_str(json).unwrap();
    let result = EvolutionEngine::new(&inst, scenario_config(3)).unwrap().run();

    let timetable = result.timetable();
    let text = render_timetable(&inst, &timetable, &ReportLayout::default());
    assert!(text.contains("MONDAY:"));
    assert!(text.contains("Scheduled courses:"));
    assert!(text.contains("Teacher 1") || text.contains("Teacher 2"));
}
