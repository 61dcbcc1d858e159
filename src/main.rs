//! Cellcraft - spreadsheet formula practice in the terminal

mod config;
mod render;
mod shell;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cellcraft_core::storage::parse_cells;
use cellcraft_core::{CellStore, TaskBank, TaskKey, TaskSession};
use cellcraft_engine::{ERROR_SENTINEL, evaluate_formula};
use clap::{Parser, Subcommand};
use log::info;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "cellcraft")]
#[command(
    author,
    version,
    about = "Practice spreadsheet formulas against graded tasks"
)]
struct Cli {
    /// Config file (default: cellcraft.toml in the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Task bank TOML to use instead of the built-in tasks
    #[arg(long, global = true)]
    tasks: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List levels and tasks
    Tasks,

    /// List the built-in spreadsheet functions
    Functions,

    /// Play a task interactively (e.g. `cellcraft play 1-2`)
    Play {
        /// Task to play, as LEVEL-TASK
        task: TaskKey,

        /// Start from cells saved with :save
        #[arg(long)]
        cells: Option<PathBuf>,
    },

    /// Evaluate one formula and print the result (exit code 1 on #ERROR)
    Eval {
        /// Formula to evaluate; the leading `=` is optional
        formula: String,

        /// Cell file to evaluate against
        #[arg(long)]
        cells: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Eval { formula, cells } => eval(&formula, cells.as_deref()),
        Commands::Functions => {
            print!("{}", render::render_functions());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Tasks => {
            let config = Config::load(cli.config.as_deref())?;
            let bank = load_bank(cli.tasks.as_deref(), &config)?;
            print!("{}", render::render_task_list(&bank));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Play { task, cells } => {
            let config = Config::load(cli.config.as_deref())?;
            let bank = load_bank(cli.tasks.as_deref(), &config)?;
            play(bank, task, cells.as_deref(), config.show_hints)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// `--tasks` wins over the config's `task_bank`; otherwise the built-in bank.
fn load_bank(flag: Option<&Path>, config: &Config) -> Result<TaskBank> {
    match flag.or(config.task_bank.as_deref()) {
        Some(path) => TaskBank::load(path)
            .with_context(|| format!("Failed to load task bank {}", path.display())),
        None => Ok(TaskBank::builtin()?),
    }
}

fn play(bank: TaskBank, key: TaskKey, cells: Option<&Path>, show_hints: bool) -> Result<()> {
    let mut session = TaskSession::new(bank);
    session.start_task(key)?;
    if let Some(path) = cells {
        session
            .load_cells(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell::run(&mut session, stdin.lock(), &mut stdout, show_hints)?;
    info!("left task {}", key);
    Ok(())
}

/// Command mode: print the formula's display value.
fn eval(formula: &str, cells: Option<&Path>) -> Result<ExitCode> {
    let store = match cells {
        Some(path) => {
            parse_cells(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => CellStore::new(),
    };

    let formula = formula.trim();
    let formula = if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={}", formula)
    };

    let result = evaluate_formula(&formula, &store);
    println!("{}", result);
    if result == ERROR_SENTINEL {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
