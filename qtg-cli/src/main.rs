//! QTG-QAOA command-line front end
//!
//! # Usage
//!
//! ```bash
//! # Solve an instance file with the default configuration
//! qtg solve instance.txt
//!
//! # Shot-based evaluation, results appended to the instance file
//! qtg solve instance.txt --backend shots --shots 2000 --append --benchmark
//!
//! # Hamming-weight preserving mixer instead of the tree mixer
//! qtg solve instance.txt --mixer hamming_weight
//!
//! # Classical references
//! qtg exact instance.txt
//! qtg greedy instance.txt
//!
//! # Random instance in the standard text format
//! qtg generate --items 20 --range 100 --density 50 --seed 1 --out instance.txt
//!
//! # Average gaps over several random instances
//! qtg bench --items 10 --experiments 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qtg_core::{
    exhaustive, generate_instance, greedy_deletion, read_instance, write_instance, ClassicalSolution,
    GeneratorConfig, Instance,
};
use qtg_sim::{
    Backend, BenchmarkReport, BenchmarkSummary, MixerKind, OptimizationState, QtgQaoaSolver, ResultSink,
    Solution, SolverConfig,
};

/// Instances above this size are not solved exhaustively by `--benchmark`
const EXACT_LIMIT: usize = 24;

/// QAOA with a quantum tree generator mixer for the quadratic knapsack problem
#[derive(Parser)]
#[command(name = "qtg")]
#[command(version)]
#[command(about = "QTG-QAOA solver for the quadratic knapsack problem")]
struct Cli {
    /// Path to a YAML solver configuration
    #[arg(short, long, global = true, env = "QTG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by the solving subcommands
#[derive(clap::Args)]
struct SolveArgs {
    /// Number of QAOA layers
    #[arg(short, long)]
    layers: Option<usize>,

    /// Measurement shots
    #[arg(short, long)]
    shots: Option<usize>,

    /// Expectation backend (statevector, shots)
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Layer mixer (qtg, hamming_weight)
    #[arg(short, long)]
    mixer: Option<MixerKind>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Greedy bias per item (0 disables)
    #[arg(long)]
    bias: Option<f64>,

    /// Uniform weights over feasible selections
    #[arg(long)]
    uniform: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance file with QTG-QAOA
    Solve {
        /// Instance file
        file: PathBuf,

        #[command(flatten)]
        args: SolveArgs,

        /// Append the result to the instance file
        #[arg(long)]
        append: bool,

        /// Compare against the exact and greedy solutions
        #[arg(long)]
        benchmark: bool,
    },

    /// Solve an instance file exhaustively
    Exact {
        /// Instance file
        file: PathBuf,
    },

    /// Solve an instance file with greedy deletion
    Greedy {
        /// Instance file
        file: PathBuf,
    },

    /// Write a random instance
    Generate {
        /// Number of items
        #[arg(short = 'n', long)]
        items: usize,

        /// Upper bound of the profit range
        #[arg(short, long, default_value_t = 100)]
        range: u32,

        /// Percentage of non-zero profits
        #[arg(short, long, default_value_t = 50)]
        density: u32,

        /// Random seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Average gaps over random instances
    Bench {
        /// Number of items
        #[arg(short = 'n', long)]
        items: usize,

        /// Upper bound of the profit range
        #[arg(short, long, default_value_t = 100)]
        range: u32,

        /// Percentage of non-zero profits
        #[arg(short, long, default_value_t = 50)]
        density: u32,

        /// Number of instances
        #[arg(short, long, default_value_t = 5)]
        experiments: u64,

        /// Seed of the first instance
        #[arg(long, default_value_t = 1)]
        first_seed: u64,

        #[command(flatten)]
        args: SolveArgs,
    },

    /// Show the effective solver configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let config = SolverConfig::load(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid configuration from environment".to_string(),
        })?;

    match cli.command {
        Commands::Solve {
            file,
            args,
            append,
            benchmark,
        } => {
            let instance = load_instance(&file)?;
            let solver = QtgQaoaSolver::new(apply_args(config, &args))?;

            let started = Instant::now();
            let solution = run_solver(&solver, &instance)?;
            let mut report = BenchmarkReport::new(&solution).with_elapsed(started.elapsed());

            println!("{}", solution);
            if benchmark {
                report = with_references(report, &instance);
            }
            if append {
                ResultSink::append(&file, &report)
                    .with_context(|| format!("Failed to append result to {}", file.display()))?;
                info!(path = %file.display(), "Appended result");
            }
            if benchmark {
                println!();
                print!("{}", report);
            }
        }

        Commands::Exact { file } => {
            let instance = load_instance(&file)?;
            if instance.num_items() > EXACT_LIMIT {
                warn!(items = instance.num_items(), "Exhaustive search over a large instance");
            }
            print_classical("Classical solution (exhaustive):", &exhaustive(&instance));
        }

        Commands::Greedy { file } => {
            let instance = load_instance(&file)?;
            print_classical("Greedy solution:", &greedy_deletion(&instance));
        }

        Commands::Generate {
            items,
            range,
            density,
            seed,
            out,
        } => {
            let generator = GeneratorConfig::new(items, range, density, seed);
            let instance = generate_instance(&generator).context("Failed to generate instance")?;
            let reference = format!("qkp_n{}_r{}_pct{}_seed{}", items, range, density, seed);
            write_instance(&out, &reference, &instance)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(path = %out.display(), capacity = instance.capacity(), "Wrote instance");
        }

        Commands::Bench {
            items,
            range,
            density,
            experiments,
            first_seed,
            args,
        } => {
            if experiments == 0 {
                bail!("At least one experiment is required");
            }
            let solver = QtgQaoaSolver::new(apply_args(config, &args))?;
            let mut summary = BenchmarkSummary::new();

            for seed in first_seed..first_seed + experiments {
                let instance = generate_instance(&GeneratorConfig::new(items, range, density, seed))
                    .with_context(|| format!("Failed to generate instance with seed {}", seed))?;
                info!(seed, "Running experiment");

                let started = Instant::now();
                let solution = run_solver(&solver, &instance)?;
                let report = with_references(
                    BenchmarkReport::new(&solution).with_elapsed(started.elapsed()),
                    &instance,
                );
                summary.record(&report);
            }

            println!("Number of Items: {}", items);
            println!("Density (%): {}", density);
            println!("{}", summary);
        }

        Commands::Config => {
            let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn load_instance(path: &Path) -> Result<Instance> {
    let file = read_instance(path).with_context(|| format!("Failed to read instance {}", path.display()))?;
    info!(
        reference = %file.reference,
        items = file.instance.num_items(),
        capacity = file.instance.capacity(),
        "Loaded instance"
    );
    Ok(file.instance)
}

/// Apply CLI overrides on top of file and environment configuration
fn apply_args(mut config: SolverConfig, args: &SolveArgs) -> SolverConfig {
    if let Some(layers) = args.layers {
        config.layers = layers;
    }
    if let Some(shots) = args.shots {
        config.shots = shots;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(mixer) = args.mixer {
        config.mixer = mixer;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(bias) = args.bias {
        config.bias_per_item = bias;
    }
    if args.uniform {
        config.uniform = true;
    }
    config
}

fn run_solver(solver: &QtgQaoaSolver, instance: &Instance) -> Result<Solution> {
    let evaluator = solver.evaluator()?;
    let mut progress = |state: &OptimizationState| {
        if state.iteration % 100 == 0 {
            info!(
                iteration = state.iteration,
                best = state.best_value,
                evaluations = state.evaluations,
                "Optimizer progress"
            );
        }
    };
    let solution = solver
        .solve(instance, evaluator.as_ref(), Some(&mut progress))
        .context("QTG-QAOA solve failed")?;
    if !solution.feasible {
        warn!(selection = %solution.selection, "Reported selection is infeasible");
    }
    Ok(solution)
}

fn with_references(report: BenchmarkReport, instance: &Instance) -> BenchmarkReport {
    let report = report.with_greedy(greedy_deletion(instance));
    if instance.num_items() <= EXACT_LIMIT {
        report.with_exact(exhaustive(instance))
    } else {
        warn!(
            items = instance.num_items(),
            limit = EXACT_LIMIT,
            "Skipping exhaustive reference"
        );
        report
    }
}

fn print_classical(title: &str, solution: &ClassicalSolution) {
    println!("{}", title);
    println!("Best Value:  {}", solution.value);
    println!("Best Solution: {}", solution.selection);
}
