//! Command-line interface for the enzkin library
//!
//! This binary provides a CLI to the two workflows of the library:
//! - Fitting Michaelis-Menten parameters to velocity measurements
//! - Integrating the enzymatic mass balance with the Euler scheme
//!
//! # Usage
//!
//! ```bash
//! # Fit the built-in reference measurements with Levenberg-Marquardt
//! enzkin fit --guess 1500,80
//!
//! # Fit measurements from a JSON file with L-BFGS and save the report
//! enzkin fit --data observations.json --optimizer lbfgs --output report.json
//!
//! # Integrate the mass balance and compare against the adaptive reference
//! enzkin simulate --dt 10 --t1 1400 --adaptive
//! ```

use std::{fs::File, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use enzkin::{
    data::ObservationSet,
    kinetics::{KineticParameters, MichaelisMenten},
    optim::{
        CurveFitProblem, FitReport, LBFGSBuilder, LevenbergMarquardtBuilder, Optimizer,
    },
    simulation::{
        adaptive::{integrate_adaptive, AdaptiveSetup},
        euler::EulerIntegrator,
        SimulationSetup,
    },
};
use log::info;
use serde::Serialize;

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Fit Michaelis-Menten parameters to velocity measurements
    Fit {
        /// Path to a JSON observation set, defaults to the reference measurements
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Initial guess as `v_max,k_m`
        #[arg(short, long, value_delimiter = ',', default_values_t = [1500.0, 80.0])]
        guess: Vec<f64>,

        /// Optimization algorithm
        #[arg(long, value_enum, default_value_t = Algorithm::Lm)]
        optimizer: Algorithm,

        /// Maximum number of iterations before stopping
        #[arg(long)]
        max_iters: Option<u64>,

        /// Print every L-BFGS iteration
        #[arg(long, default_value_t = false)]
        progress: bool,

        /// Path to save the fit report to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Integrate the enzymatic mass balance
    Simulate {
        /// Path to a JSON simulation setup, overridden by explicit flags
        #[arg(long)]
        setup: Option<PathBuf>,

        /// Step size
        #[arg(long)]
        dt: Option<f64>,

        /// Stop time
        #[arg(long)]
        t1: Option<f64>,

        /// Initial substrate concentration
        #[arg(long)]
        s0: Option<f64>,

        /// Initial product concentration
        #[arg(long)]
        p0: Option<f64>,

        /// Maximum velocity
        #[arg(long, default_value_t = 0.0596)]
        v_max: f64,

        /// Michaelis constant
        #[arg(long, default_value_t = 5.0)]
        k_m: f64,

        /// Compare against the adaptive Runge-Kutta reference
        #[arg(long, default_value_t = false)]
        adaptive: bool,

        /// Path to save the trace to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Available optimization algorithms
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Levenberg-Marquardt
    Lm,
    /// Limited-memory BFGS
    Lbfgs,
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fit {
            data,
            guess,
            optimizer,
            max_iters,
            progress,
            output,
        } => fit(data, guess, optimizer, max_iters, progress, output),
        Commands::Simulate {
            setup,
            dt,
            t1,
            s0,
            p0,
            v_max,
            k_m,
            adaptive,
            output,
        } => {
            let params = KineticParameters::new(v_max, k_m);
            load_setup(setup).and_then(|setup| {
                let setup = SimulationSetup {
                    dt: dt.unwrap_or(setup.dt),
                    t1: t1.unwrap_or(setup.t1),
                    initial_substrate: s0.unwrap_or(setup.initial_substrate),
                    initial_product: p0.unwrap_or(setup.initial_product),
                };
                simulate(setup, params, adaptive, output)
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".bold().red(), err);
            ExitCode::FAILURE
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn fit(
    data: Option<PathBuf>,
    guess: Vec<f64>,
    algorithm: Algorithm,
    max_iters: Option<u64>,
    progress: bool,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let observations = match data {
        Some(path) => serde_json::from_reader::<_, ObservationSet>(File::open(path)?)?,
        None => ObservationSet::reference(),
    };
    info!("Fitting {} observations with {:?}", observations.len(), algorithm);

    let problem = CurveFitProblem::new(MichaelisMenten, observations);
    let report: FitReport = match algorithm {
        Algorithm::Lm => {
            let mut builder = LevenbergMarquardtBuilder::default();
            if let Some(max_iters) = max_iters {
                builder = builder.max_iters(max_iters);
            }
            builder.build().optimize(&problem, guess)?
        }
        Algorithm::Lbfgs => {
            let mut builder = LBFGSBuilder::default().show_progress(progress);
            if let Some(max_iters) = max_iters {
                builder = builder.max_iters(max_iters);
            }
            builder.build().optimize(&problem, guess)?
        }
    };

    println!("{report}");
    write_json(output, &report)
}

fn load_setup(path: Option<PathBuf>) -> CliResult<SimulationSetup> {
    match path {
        Some(path) => Ok(serde_json::from_reader(File::open(path)?)?),
        None => Ok(SimulationSetup::default()),
    }
}

fn simulate(
    setup: SimulationSetup,
    params: KineticParameters,
    adaptive: bool,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let trace = EulerIntegrator::new(setup).integrate(&params)?;
    println!("{trace}");

    if let Some((t, s, p)) = trace.last() {
        println!(
            "{} t = {t}, S = {s:.6}, P = {p:.6}, mass balance error = {:.3e}",
            "Final state:".bold().green(),
            trace.mass_balance_error()
        );
    }

    if adaptive {
        let reference = integrate_adaptive(&AdaptiveSetup::default(), &setup, &params)?;
        println!(
            "{} max |S_euler - S_ref| = {:.6e} over {} reference steps",
            "Adaptive reference:".bold().yellow(),
            trace.max_deviation(&reference),
            reference.len() - 1
        );
    }

    write_json(output, &trace)
}

fn write_json<T: Serialize>(output: Option<PathBuf>, value: &T) -> CliResult<()> {
    if let Some(path) = output {
        serde_json::to_writer_pretty(File::create(&path)?, value)?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}
