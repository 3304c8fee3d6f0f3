//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stepfit::alloc::{Heuristic, OrderKey};

#[derive(Debug, Parser)]
#[command(name = "stepfit")]
#[command(author, version, about = "Greedy task placement onto a capacity step function")]
#[command(
    long_about = "Places power-drawing tasks onto a time-slotted capacity profile with greedy\n\
    heuristics and measures how much of the usable energy they capture.\n\
    \nExamples:\n  \
    stepfit profile --seed 7 --out week.txt\n  \
    stepfit plan --profile week.txt --tasks tasks.csv --heuristic next-fit\n  \
    stepfit grid --preset quick --summary-csv summary.csv\n  \
    stepfit stats --samples 2000"
)]
pub struct Cli {
    /// Experiment configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in experiment preset (reference, quick, dense)
    #[arg(long, global = true, value_name = "NAME")]
    pub preset: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a synthetic capacity profile, one value per line
    Profile(ProfileArgs),

    /// Generate a synthetic task list as CSV
    Tasks(TasksArgs),

    /// Allocate a task file onto a profile file and report the placements
    Plan(PlanArgs),

    /// Run the trials of one (order, heuristic) combination
    #[command(
        long_about = "Run repeated randomized trials for a single combination.\n\
        \nThe efficacy series is written one value per line (NaN for undefined\n\
        trials) to --out or stdout; the summary goes to stderr."
    )]
    Evaluate(EvaluateArgs),

    /// Run every (order, heuristic) combination and print a summary table
    Grid(GridArgs),

    /// Summarize the distributions of generated profiles and task batches
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Seed for the generator (defaults to the configured trial seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TasksArgs {
    /// Seed for the generator (defaults to the configured trial seed)
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Output file (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Number of generated instances
    #[arg(long, default_value_t = 10_000)]
    pub samples: usize,

    /// First seed (defaults to the configured trial seed)
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Also write the summaries as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

/// Overrides for the task generator.
#[derive(Debug, Args)]
pub struct WorkloadArgs {
    /// Number of tasks per batch
    #[arg(long)]
    pub count: Option<usize>,

    /// Mean power draw
    #[arg(long)]
    pub mean_power: Option<f64>,

    /// Standard deviation of the power draw
    #[arg(long)]
    pub sigma_power: Option<f64>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Capacity profile series file
    #[arg(long, value_name = "PATH")]
    pub profile: PathBuf,

    /// Task CSV file (id,duration,power with optional repeats)
    #[arg(long, value_name = "PATH")]
    pub tasks: PathBuf,

    /// Sort key applied before placement (duration, power, area)
    #[arg(long, default_value = "area")]
    pub order: OrderKey,

    /// Placement heuristic (first-fit, next-fit, best-fit, true-best-fit)
    #[arg(long, default_value = "first-fit")]
    pub heuristic: Heuristic,

    /// Write per-task placements as CSV
    #[arg(long, value_name = "PATH")]
    pub placements_out: Option<PathBuf>,

    /// Write the remaining capacity as a series
    #[arg(long, value_name = "PATH")]
    pub residual_out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Sort key applied before placement (duration, power, area)
    #[arg(long)]
    pub order: OrderKey,

    /// Placement heuristic (first-fit, next-fit, best-fit, true-best-fit)
    #[arg(long)]
    pub heuristic: Heuristic,

    /// Number of tasks per trial
    #[arg(long = "tasks")]
    pub task_count: Option<usize>,

    /// Mean power draw
    #[arg(long)]
    pub mean_power: Option<f64>,

    /// Standard deviation of the power draw
    #[arg(long)]
    pub sigma_power: Option<f64>,

    #[command(flatten)]
    pub trials: TrialArgs,

    /// Efficacy series output file (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

/// Overrides for trial count, seeding and parallelism.
#[derive(Debug, Args)]
pub struct TrialArgs {
    /// Trials per combination
    #[arg(long)]
    pub trials: Option<usize>,

    /// Base seed; trial i uses seed + i
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Debug, Args)]
pub struct GridArgs {
    /// Comma-separated sort keys (defaults to the configured grid)
    #[arg(long, value_delimiter = ',')]
    pub orders: Vec<OrderKey>,

    /// Comma-separated heuristics (defaults to the configured grid)
    #[arg(long, value_delimiter = ',')]
    pub heuristics: Vec<Heuristic>,

    #[command(flatten)]
    pub trials: TrialArgs,

    /// Directory for one per-trial CSV per combination
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Write the summary table as CSV
    #[arg(long, value_name = "PATH")]
    pub summary_csv: Option<PathBuf>,

    /// Write the summary as JSON
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}
