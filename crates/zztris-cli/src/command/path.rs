use std::path::PathBuf;

use anyhow::ensure;

use super::report::{self, StrategyKind};
use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PathArg {
    /// Scenario JSON file
    scenario: PathBuf,
    /// Strategy to run; all strategies when omitted
    #[arg(long)]
    strategy: Option<StrategyKind>,
    /// Strategy configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PathArg) -> anyhow::Result<()> {
    let scenario = util::read_scenario_file(&arg.scenario)?;
    ensure!(
        !scenario.placements.is_empty(),
        "Scenario has no placements"
    );
    let config = util::read_config_file(arg.config.as_deref())?;

    let reports = StrategyKind::selected(arg.strategy)
        .into_iter()
        .map(|kind| report::score(kind, &scenario, &scenario.placements, 1, &config))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Output::save_json(&reports, arg.output.clone())
}
