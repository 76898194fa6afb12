use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

use self::{danger::DangerArg, eval::EvalArg, path::PathArg};

mod danger;
mod eval;
mod path;
mod report;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score the first placement of a scenario
    Eval(#[clap(flatten)] EvalArg),
    /// Score every placement of a scenario as one search path
    Path(#[clap(flatten)] PathArg),
    /// Print the danger masks of every piece kind
    Danger(#[clap(flatten)] DangerArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);
    match args.mode {
        Mode::Eval(arg) => eval::run(&arg)?,
        Mode::Path(arg) => path::run(&arg)?,
        Mode::Danger(arg) => danger::run(&arg)?,
    }
    Ok(())
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

// Reports go to stdout, so logs are written to stderr.
fn init_logging(verbose: u8) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(LevelFilter::from_level(log_level(verbose)))
        .init();
}
