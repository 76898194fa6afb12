use std::{path::PathBuf, slice};

use anyhow::{Context as _, ensure};

use super::report::{self, StrategyKind};
use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvalArg {
    /// Scenario JSON file
    scenario: PathBuf,
    /// Strategy to run; all strategies when omitted
    #[arg(long)]
    strategy: Option<StrategyKind>,
    /// Strategy configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Search depth the placement is scored at
    #[arg(long, default_value_t = 1)]
    depth: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvalArg) -> anyhow::Result<()> {
    ensure!(arg.depth > 0, "Search depth starts at 1");
    let scenario = util::read_scenario_file(&arg.scenario)?;
    let config = util::read_config_file(arg.config.as_deref())?;
    let placement = scenario
        .placements
        .first()
        .context("Scenario has no placements")?;

    let reports = StrategyKind::selected(arg.strategy)
        .into_iter()
        .map(|kind| {
            report::score(
                kind,
                &scenario,
                slice::from_ref(placement),
                arg.depth,
                &config,
            )
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Output::save_json(&reports, arg.output.clone())
}
