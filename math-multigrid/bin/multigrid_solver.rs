//! Duct flow solver
//!
//! Solves the Poisson (Newtonian) and Mosolov (Bingham) duct flow problems
//! with full multigrid and writes one JSON snapshot per run. Independent
//! runs (several aspect ratios or Bingham numbers) are solved in parallel.
//!
//! Usage:
//!   cargo run --release --bin multigrid-solver -- poisson 1 2 4
//!   cargo run --release --bin multigrid-solver -- mosolov --aspect 2 --bingham 0.1 0.2
//!   cargo run --release --bin multigrid-solver -- mosolov --aspect 2 --fraction 0.5
//!   cargo run --release --bin multigrid-solver -- --help

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use math_multigrid::problems::critical_bingham;
use math_multigrid::{
    MosolovFlow, MosolovSettings, PoissonProblem, Settings, SnapshotContents,
};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "multigrid-solver")]
#[command(about = "Finite-difference multigrid solver for duct flow problems")]
struct Args {
    #[command(subcommand)]
    problem: ProblemCommand,

    /// Path to JSON multigrid settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for JSON snapshots
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Override the number of grid levels
    #[arg(short, long, global = true)]
    levels: Option<usize>,

    /// Fields to export: 1 solution, 2 adds |∇u|, 3 adds log10 residual
    #[arg(long, global = true, default_value = "1")]
    variables: usize,
}

#[derive(Subcommand, Debug)]
enum ProblemCommand {
    /// Newtonian flow, one run per aspect ratio
    Poisson {
        #[arg(required = true)]
        aspects: Vec<f64>,
    },
    /// Bingham flow by augmented Lagrangian iteration
    Mosolov {
        /// Duct aspect ratio
        #[arg(short, long, default_value = "2")]
        aspect: f64,

        /// Bingham numbers, one run each
        #[arg(short, long, num_args = 1.., conflicts_with = "fraction")]
        bingham: Vec<f64>,

        /// Bingham numbers as fractions of the critical value
        #[arg(short, long, num_args = 1..)]
        fraction: Vec<f64>,

        /// Augmentation parameter
        #[arg(long, default_value = "1")]
        alpha: f64,

        /// Maximum augmented Lagrangian iterations
        #[arg(long, default_value = "1000")]
        max_iterations: usize,

        /// Convergence threshold on the strain-rate residual
        #[arg(long, default_value = "1e-6")]
        tolerance: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to set thread pool")?;
        println!("Using {} threads (user-specified)", threads);
    } else {
        println!("Using {} threads (all cores)", rayon::current_num_threads());
    }

    let mut settings = match &args.config {
        Some(path) => {
            println!("Loading settings from: {}", path.display());
            Settings::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Settings::default(),
    };
    if let Some(levels) = args.levels {
        settings.number_of_grids = levels;
    }
    let contents = SnapshotContents::from_count(args.variables)?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    match args.problem {
        ProblemCommand::Poisson { aspects } => {
            let runs = aspects
                .par_iter()
                .map(|&aspect| {
                    let settings = Settings {
                        aspect_ratio: aspect,
                        ..settings.clone()
                    };
                    run_poisson(settings, contents, &args.output_dir)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            print_summary(&runs);
        }
        ProblemCommand::Mosolov {
            aspect,
            bingham,
            fraction,
            alpha,
            max_iterations,
            tolerance,
        } => {
            let bingham_numbers: Vec<f64> = if !fraction.is_empty() {
                let critical = critical_bingham(aspect);
                println!("Critical Bingham number for aspect {}: {:.6}", aspect, critical);
                fraction.iter().map(|f| f * critical).collect()
            } else if !bingham.is_empty() {
                bingham
            } else {
                bail!("mosolov needs --bingham or --fraction");
            };

            let runs = bingham_numbers
                .par_iter()
                .map(|&bingham_number| {
                    let settings = MosolovSettings {
                        multigrid: Settings {
                            aspect_ratio: aspect,
                            ..settings.clone()
                        },
                        bingham_number,
                        augmenting_parameter: alpha,
                        max_lagrange_iterations: max_iterations,
                        lagrange_tolerance: tolerance,
                    };
                    run_mosolov(settings, contents, &args.output_dir)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            print_summary(&runs);
        }
    }

    println!("Done!");
    Ok(())
}

/// One finished run for the summary table
#[derive(Debug)]
struct RunSummary {
    stem: String,
    iterations: usize,
    residual: f64,
    converged: bool,
    flux: Option<f64>,
    seconds: f64,
}

fn run_poisson(
    settings: Settings,
    contents: SnapshotContents,
    output_dir: &Path,
) -> anyhow::Result<RunSummary> {
    let start = Instant::now();
    let mut problem = PoissonProblem::new(settings)?;
    let report = problem.solve()?;

    let stem = problem.file_stem();
    let path = output_dir.join(format!("{stem}.json"));
    problem
        .snapshot(contents)?
        .write_json(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(RunSummary {
        stem,
        iterations: report.cycles,
        residual: report.residual_norm,
        converged: report.converged,
        flux: problem.flux().ok(),
        seconds: start.elapsed().as_secs_f64(),
    })
}

fn run_mosolov(
    settings: MosolovSettings,
    contents: SnapshotContents,
    output_dir: &Path,
) -> anyhow::Result<RunSummary> {
    let start = Instant::now();
    let mut flow = MosolovFlow::new(settings)?;
    let report = flow.solve()?;

    let stem = flow.file_stem();
    let path = output_dir.join(format!("{stem}.json"));
    flow.snapshot(contents)?
        .write_json(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(RunSummary {
        stem,
        iterations: report.iterations,
        residual: report.residual,
        converged: report.converged,
        flux: report.flux,
        seconds: start.elapsed().as_secs_f64(),
    })
}

fn print_summary(runs: &[RunSummary]) {
    println!("\n=== Results ===");
    println!(
        "{:<20} {:>10} {:>12} {:>10} {:>14} {:>9}",
        "run", "iterations", "residual", "converged", "flux", "time (s)"
    );
    for run in runs {
        let flux = run
            .flux
            .map(|f| format!("{f:.8}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:>10} {:>12.3e} {:>10} {:>14} {:>9.2}",
            run.stem, run.iterations, run.residual, run.converged, flux, run.seconds
        );
    }
}
