use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::Verbosity;
use env_logger::Builder;
use simplex_format::{render_solution, render_step, render_task};
use simplex_solver::{
    to_dual_form, to_dual_standard_form, to_standard_form, DualSolver, LpTask, PivotRule,
    PrimalSolver, Solver, SolverStep, StepData,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "simplex")]
#[command(about = "Step through primal and dual simplex solves of linear programs", long_about = None)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    Primal,
    Dual,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a task and print the optimal solution
    Solve {
        /// The file containing the task
        file: PathBuf,
        /// Simplex method to use
        #[arg(short, long, value_enum, default_value_t = Method::Primal)]
        method: Method,
        /// Print the snapshot of every step, not just the result
        #[arg(short, long)]
        steps: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Stop after this many pivots
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Print the dual of a task
    Dual {
        /// The file containing the task
        file: PathBuf,
        /// Also solve the dual with the dual simplex method
        #[arg(long)]
        solve: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Print the standard form of a task
    Standard {
        /// The file containing the task
        file: PathBuf,
        /// Which method's standard form to print
        #[arg(short, long, value_enum, default_value_t = Method::Primal)]
        method: Method,
    },
    /// Check a task file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Solve {
            file,
            method,
            steps,
            format,
            max_iterations,
        } => {
            let task = read_task(&file)?;
            let count = task.variable_count();
            match method {
                Method::Primal => run(
                    PrimalSolver::new(task).with_max_iterations(max_iterations),
                    count,
                    steps,
                    format,
                ),
                Method::Dual => run(
                    DualSolver::new(task).with_max_iterations(max_iterations),
                    count,
                    steps,
                    format,
                ),
            }
        }
        Commands::Dual { file, solve, format } => {
            let task = read_task(&file)?;
            let dual = to_dual_form(&task).context("Building the dual task")?;

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&dual)?),
                Format::Pretty => println!("{}", render_task(&dual)),
            }

            if solve {
                println!();
                let count = dual.variable_count();
                run(DualSolver::new(dual), count, false, format)?;
            }
            Ok(())
        }
        Commands::Standard { file, method } => {
            let task = read_task(&file)?;
            let standard = match method {
                Method::Primal => to_standard_form(&task),
                Method::Dual => to_dual_standard_form(&task),
            };
            println!("{}", render_task(&standard));
            Ok(())
        }
        Commands::Check { file } => {
            let task = read_task(&file)?;
            println!("✓ {} is valid", file.display());
            println!("  {} variables", task.variable_count());
            println!("  {} constraints", task.constraint_count());
            println!("  objective: {}", task.sense());
            Ok(())
        }
    }
}

fn read_task(path: &Path) -> Result<LpTask> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;
    simplex_format::Parser::parse(&source).with_context(|| format!("Parsing {}", path.display()))
}

/// Drive a solver to completion, printing each step when asked.
fn run<R: PivotRule>(mut solver: Solver<R>, original_count: usize, steps: bool, format: Format) -> Result<()> {
    log::info!("solving with the {} simplex method", solver.method());

    if steps {
        while solver.current_step() != SolverStep::Complete {
            solver
                .move_to_next_step()
                .with_context(|| format!("{} simplex stopped after {} iterations", solver.method(), solver.iterations()))?;

            if format == Format::Pretty {
                println!("== {}", solver.state_description());
            }
            if let Some(data) = solver.step_data() {
                print_step(&data, format)?;
            }
        }
        return Ok(());
    }

    let solution = solver
        .solve()
        .with_context(|| format!("{} simplex stopped after {} iterations", solver.method(), solver.iterations()))?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&solution)?),
        Format::Pretty => {
            println!("Status: OPTIMAL ({} iterations)", solver.iterations());
            println!("{}", render_solution(&solution, Some(original_count)));
        }
    }
    Ok(())
}

fn print_step(data: &StepData<'_>, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(data)?),
        Format::Pretty => {
            println!("{}", render_step(data));
            println!();
        }
    }
    Ok(())
}
