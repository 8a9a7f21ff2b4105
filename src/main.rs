use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use u_timetable::ga::{EvolutionConfig, EvolutionEngine};
use u_timetable::generator::{GeneratorParams, InstanceGenerator};
use u_timetable::models::ProblemInstance;
use u_timetable::report::{render_timetable, write_report, ReportLayout};

/// Problem scale used for generated instances and default run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// 15 courses, population 200, 100 generations
    Small,
    /// 150 courses, population 500, 200 generations
    Medium,
    /// 500 courses, population 1000, 300 generations, sampled fitness
    Large,
}

impl Preset {
    fn generator(self) -> GeneratorParams {
        match self {
            Preset::Small => GeneratorParams::small(),
            Preset::Medium => GeneratorParams::medium(),
            Preset::Large => GeneratorParams::large(),
        }
    }

    fn config(self) -> EvolutionConfig {
        match self {
            Preset::Small => EvolutionConfig::small(),
            Preset::Medium => EvolutionConfig::medium(),
            Preset::Large => EvolutionConfig::large(),
        }
    }
}

#[derive(Parser)]
#[command(name = "u-timetable")]
#[command(author, version, about = "Course timetabling with a genetic algorithm", long_about = None)]
struct Cli {
    /// Problem scale for generated instances and default parameters
    #[arg(short, long, value_enum, default_value = "small")]
    preset: Preset,

    /// Problem instance in JSON; a synthetic one is generated when absent
    #[arg(short, long, value_name = "FILE")]
    instance: Option<PathBuf>,

    /// Run configuration in JSON; the preset's parameters when absent
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for instance generation and evolution
    #[arg(short, long)]
    seed: Option<u64>,

    /// Overrides the number of generations
    #[arg(short, long)]
    generations: Option<usize>,

    /// Also writes the timetable report to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> u_timetable::Result<()> {
    let instance = load_instance(cli)?;
    let untaught = instance.courses_without_teacher();
    if !untaught.is_empty() {
        warn!(
            "{} courses have no qualified teacher and will stay unscheduled",
            untaught.len()
        );
    }

    let mut config = match &cli.config {
        Some(path) => EvolutionConfig::from_json_file(path)?,
        None => cli.preset.config(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(generations) = cli.generations {
        config = config.with_generations(generations);
    }

    let mut engine = EvolutionEngine::new(&instance, config)?;
    let result = engine.run();
    let timetable = result.timetable();
    let layout = ReportLayout::default();

    println!("{}", render_timetable(&instance, &timetable, &layout));

    if let Some(path) = &cli.output {
        match write_report(path, &instance, &timetable, &layout) {
            Ok(()) => info!("report written to {}", path.display()),
            Err(e) => error!("cannot write report to {}: {e}", path.display()),
        }
    }
    Ok(())
}

fn load_instance(cli: &Cli) -> u_timetable::Result<ProblemInstance> {
    if let Some(path) = &cli.instance {
        info!("loading instance from {}", path.display());
        return ProblemInstance::from_json_file(path);
    }

    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    info!("generating a {:?} instance", cli.preset);
    InstanceGenerator::new(cli.preset.generator()).generate(&mut rng)
}
