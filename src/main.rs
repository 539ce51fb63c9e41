//! FORAGERS - CLI Entry Point
//!
//! Day-cycle foraging simulator.

use clap::{Parser, Subcommand};
use foragers::batch::{extinction_rate, run_replicates};
use foragers::snapshot::WorldSnapshot;
use foragers::{benchmark, Config, Mutation, World};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "foragers")]
#[command(version)]
#[command(about = "Day-cycle foraging simulator with mutations and predators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of days to simulate (defaults to population.max_days)
        #[arg(short, long)]
        days: Option<u32>,

        /// Output directory for stats and snapshots
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON snapshot of every finished day
        #[arg(long)]
        snapshots: bool,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run independent seeded replicates in parallel
    Batch {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of replicates
        #[arg(short, long, default_value = "8")]
        replicates: u64,

        /// Days per replicate
        #[arg(short, long, default_value = "100")]
        days: u32,

        /// Seed of the first replicate; the rest follow consecutively
        #[arg(long, default_value = "0")]
        base_seed: u64,

        /// Output file for replicate summaries
        #[arg(short, long, default_value = "replicates.json")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of days
        #[arg(short, long, default_value = "100")]
        days: u32,

        /// Population size
        #[arg(short, long, default_value = "100")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            days,
            output,
            seed,
            snapshots,
            quiet,
        } => run_simulation(config, days, output, seed, snapshots, quiet),

        Commands::Batch {
            config,
            replicates,
            days,
            base_seed,
            output,
        } => run_batch(config, replicates, days, base_seed, output),

        Commands::Benchmark { days, population } => {
            init_logging("info");
            run_benchmark(days, population)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

/// Load the config at `path`, falling back to defaults when it does not exist,
/// then start logging at the configured level
fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        Config::from_file(path)?
    } else {
        Config::default()
    };
    init_logging(&config.logging.log_level);

    if path.exists() {
        log::info!("Loaded config from: {:?}", path);
    } else {
        log::info!("Using default configuration");
    }
    Ok(config)
}

fn run_simulation(
    config_path: PathBuf,
    days: Option<u32>,
    output: PathBuf,
    seed: Option<u64>,
    snapshots: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;

    std::fs::create_dir_all(&output)?;

    let mut world = match seed {
        Some(s) => World::new_with_seed(config.clone(), s)?,
        None => World::new(config.clone())?,
    };

    if !quiet {
        println!("Starting simulation");
        println!("  Seed: {}", world.seed());
        println!("  Initial population: {}", world.population());
        let (width, height) = world.environment.dimensions();
        println!("  Grid size: {}x{}", width, height);
        println!("  Steps per day: {}", config.population.steps_per_day);
        println!();
    }

    let start = Instant::now();
    let mut snapshot_error = None;

    let day_limit = days.or(config.population.max_days);
    let on_day = |w: &World, _: &foragers::DayStats| {
        if snapshots && snapshot_error.is_none() {
            let path = output.join(format!("day_{:05}.json", w.day - 1));
            let written = serde_json::to_string(&WorldSnapshot::from_last_day(w))
                .map_err(std::io::Error::from)
                .and_then(|json| std::fs::write(&path, json));
            if let Err(e) = written {
                log::error!("Snapshot write failed: {}", e);
                snapshot_error = Some(e);
            }
        }
    };

    let simulated = match day_limit {
        Some(limit) => world.run_with_callback(limit, on_day),
        None => {
            let mut on_day = on_day;
            let mut count = 0;
            while !world.is_extinct() {
                let stats = world.simulate_day();
                on_day(&world, &stats);
                count += 1;
            }
            count
        }
    };

    if let Some(e) = snapshot_error {
        return Err(e.into());
    }

    let elapsed = start.elapsed();

    if !quiet {
        println!();
        println!("=== Simulation Complete ===");
        println!("Time: {:.2}s", elapsed.as_secs_f64());
        println!("Days: {}", simulated);
        if world.is_extinct() {
            println!("Population extinct");
        }
        println!("Final population: {}", world.population());
        println!("Max generation: {}", world.generation_max);
        println!("Lineages: {}", world.lineage_tracker.surviving_count());
        if let Some((id, lineage)) = world.lineage_tracker.dominant_lineage() {
            println!(
                "Dominant lineage: {} ({} organisms, generation {})",
                id, lineage.current_population, lineage.max_generation
            );
        }
        if let Some(last) = world.stats_history.latest() {
            for mutation in [Mutation::None, Mutation::Speed, Mutation::Priority] {
                println!("  {:<8} {}", mutation.name(), last.counts.get(mutation));
            }
        }
    }

    let stats_path = output.join("stats_history.json");
    world.stats_history.save(&stats_path)?;
    if !quiet {
        println!("Stats history: {:?}", stats_path);
    }

    Ok(())
}

fn run_batch(
    config_path: PathBuf,
    replicates: u64,
    days: u32,
    base_seed: u64,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let seeds: Vec<u64> = (0..replicates).map(|i| base_seed.wrapping_add(i)).collect();

    println!("=== FORAGERS Batch ===");
    println!("Replicates: {}", seeds.len());
    println!("Days: {}", days);
    println!();

    let start = Instant::now();
    let summaries = run_replicates(&config, &seeds, days)?;
    let elapsed = start.elapsed();

    for s in &summaries {
        println!(
            "seed {:>6} | days {:>4} | pop {:>4} (peak {:>4}) | N/S/P {}/{}/{} | gen {:>3}{}",
            s.seed,
            s.days_simulated,
            s.final_population,
            s.peak_population,
            s.final_counts.none,
            s.final_counts.speed,
            s.final_counts.priority,
            s.generation_max,
            if s.extinct { " | extinct" } else { "" }
        );
    }
    println!();
    println!("Extinction rate: {:.1}%", extinction_rate(&summaries) * 100.0);
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    std::fs::write(&output, serde_json::to_string_pretty(&summaries)?)?;
    println!("Summaries: {:?}", output);

    Ok(())
}

fn run_benchmark(days: u32, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== FORAGERS Benchmark ===");
    println!("Days: {}", days);
    println!("Population: {}", population);
    println!();

    let result = benchmark(days, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
