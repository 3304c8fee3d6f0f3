//! stepfit entry point: CLI wiring and config-driven command dispatch.

mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, bail};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stepfit::alloc::allocate;
use stepfit::config::ExperimentConfig;
use stepfit::eval::{Harness, compute_efficacy, sample_instance_stats};
use stepfit::generators::{generate_capacity_profile, generate_tasks};
use stepfit::io::export;
use stepfit::io::{
    read_profile_file, read_tasks_file, write_efficacy_series, write_series, write_series_file,
    write_tasks,
};
use stepfit::reporting::{GridTable, PlanReport, StatsTable};

use cli::{
    Cli, Commands, EvaluateArgs, GridArgs, PlanArgs, ProfileArgs, StatsArgs, TasksArgs,
    TrialArgs, WorkloadArgs,
};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        warn!(error = %e, "cannot install Ctrl-C handler");
    }

    if let Err(e) = run(cli, cancel) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli, cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Profile(args) => cmd_profile(&config, &args),
        Commands::Tasks(args) => {
            apply_workload(&mut config, &args.workload);
            ensure_valid(&config)?;
            cmd_tasks(&config, &args)
        }
        Commands::Plan(args) => cmd_plan(&args),
        Commands::Evaluate(args) => {
            if let Some(n) = args.task_count {
                config.tasks.count = n;
            }
            if let Some(x) = args.mean_power {
                config.tasks.mean_power = x;
            }
            if let Some(x) = args.sigma_power {
                config.tasks.sigma_power = x;
            }
            apply_trials(&mut config, &args.trials);
            ensure_valid(&config)?;
            cmd_evaluate(&config, &args, cancel)
        }
        Commands::Grid(args) => {
            if !args.orders.is_empty() {
                config.grid.orders.clone_from(&args.orders);
            }
            if !args.heuristics.is_empty() {
                config.grid.heuristics.clone_from(&args.heuristics);
            }
            apply_trials(&mut config, &args.trials);
            ensure_valid(&config)?;
            cmd_grid(&config, &args, cancel)
        }
        Commands::Stats(args) => {
            apply_workload(&mut config, &args.workload);
            ensure_valid(&config)?;
            cmd_stats(&config, &args)
        }
    }
}

/// `--config` takes priority, then `--preset`, then the reference experiment.
fn load_config(cli: &Cli) -> anyhow::Result<ExperimentConfig> {
    let config = if let Some(path) = &cli.config {
        ExperimentConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        ExperimentConfig::from_preset(name)?
    } else {
        ExperimentConfig::reference()
    };
    Ok(config)
}

fn ensure_valid(config: &ExperimentConfig) -> anyhow::Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
    bail!("invalid configuration:\n  {}", lines.join("\n  "))
}

fn apply_workload(config: &mut ExperimentConfig, args: &WorkloadArgs) {
    if let Some(n) = args.count {
        config.tasks.count = n;
    }
    if let Some(x) = args.mean_power {
        config.tasks.mean_power = x;
    }
    if let Some(x) = args.sigma_power {
        config.tasks.sigma_power = x;
    }
}

fn apply_trials(config: &mut ExperimentConfig, args: &TrialArgs) {
    if let Some(n) = args.trials {
        config.trials.count = n;
    }
    if let Some(seed) = args.seed {
        config.trials.seed = seed;
    }
    if let Some(threads) = args.threads {
        config.trials.threads = threads;
    }
}

/// Runs `write` against `path` or, when absent, locked stdout.
fn with_output(
    path: Option<&Path>,
    write: impl FnOnce(&mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            let mut file = export::create(p)
                .with_context(|| format!("cannot create \"{}\"", p.display()))?;
            write(&mut file).with_context(|| format!("cannot write \"{}\"", p.display()))?;
            info!(path = %p.display(), "written");
        }
        None => write(&mut io::stdout().lock()).context("cannot write to stdout")?,
    }
    Ok(())
}

fn cmd_profile(config: &ExperimentConfig, args: &ProfileArgs) -> anyhow::Result<()> {
    config
        .profile
        .validate()
        .context("invalid profile parameters")?;
    let seed = args.seed.unwrap_or(config.trials.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let generated = generate_capacity_profile(&config.profile, &mut rng)?;
    info!(
        seed,
        slots = generated.weekly.len(),
        energy = generated.weekly.total(),
        "generated capacity profile"
    );
    with_output(args.out.as_deref(), |w| {
        write_series(generated.weekly.values().iter().copied(), w)
    })
}

fn cmd_tasks(config: &ExperimentConfig, args: &TasksArgs) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or(config.trials.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let tasks = generate_tasks(&config.tasks, &mut rng)?;
    info!(seed, count = tasks.len(), "generated tasks");
    with_output(args.out.as_deref(), |w| write_tasks(&tasks, w))
}

fn cmd_plan(args: &PlanArgs) -> anyhow::Result<()> {
    let before = read_profile_file(&args.profile)
        .with_context(|| format!("cannot load profile \"{}\"", args.profile.display()))?;
    let mut tasks = read_tasks_file(&args.tasks)
        .with_context(|| format!("cannot load tasks \"{}\"", args.tasks.display()))?;

    args.order.sort(&mut tasks);
    let mut after = before.clone();
    let report = allocate(&mut tasks, &mut after, args.heuristic)?;

    let plan = PlanReport {
        order: args.order,
        heuristic: args.heuristic,
        tasks: &tasks,
        report: &report,
        original_energy: before.total(),
        remaining_energy: after.total(),
        efficacy: compute_efficacy(&before, &after, &tasks),
    };
    println!("{plan}");

    if let Some(path) = &args.placements_out {
        with_output(Some(path.as_path()), |w| export::write_placements_csv(&tasks, w))?;
    }
    if let Some(path) = &args.residual_out {
        write_series_file(path, after.values().iter().copied())
            .with_context(|| format!("cannot write \"{}\"", path.display()))?;
        info!(path = %path.display(), "written");
    }
    Ok(())
}

fn cmd_evaluate(
    config: &ExperimentConfig,
    args: &EvaluateArgs,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let harness = Harness::from_config(config).with_cancel_flag(cancel);
    let result = harness.run_combination(args.order, args.heuristic)?;

    with_output(args.out.as_deref(), |w| {
        write_efficacy_series(&result.efficacies(), w)
    })?;
    eprintln!("{} / {}: {}", result.order, result.heuristic, result.summary());

    if result.cancelled {
        bail!("interrupted before all trials finished");
    }
    Ok(())
}

fn cmd_grid(
    config: &ExperimentConfig,
    args: &GridArgs,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let harness = Harness::from_config(config).with_cancel_flag(cancel);
    let grid = harness.run_grid(&config.grid.orders, &config.grid.heuristics)?;

    println!("{}", GridTable(&grid));

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create directory \"{}\"", dir.display()))?;
        for c in &grid.combinations {
            let path = dir.join(export::outcomes_file_name(c.order, c.heuristic));
            with_output(Some(path.as_path()), |w| export::write_outcomes_csv(&c.outcomes, w))?;
        }
    }
    if let Some(path) = &args.summary_csv {
        with_output(Some(path.as_path()), |w| {
            export::write_summary_csv(&grid.combinations, w)
        })?;
    }
    if let Some(path) = &args.summary_json {
        with_output(Some(path.as_path()), |w| export::write_summary_json(&grid, w))?;
    }

    if grid.cancelled {
        bail!("interrupted before all trials finished");
    }
    Ok(())
}

fn cmd_stats(config: &ExperimentConfig, args: &StatsArgs) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or(config.trials.seed);
    let stats = sample_instance_stats(&config.profile, &config.tasks, args.samples, seed)?;

    println!("{}", StatsTable(&stats));

    if let Some(path) = &args.json {
        with_output(Some(path.as_path()), |w| export::write_stats_json(&stats, w))?;
    }
    Ok(())
}
