//! Running strategies over scenario placements.

use anyhow::Context as _;
use serde::Serialize;
use tracing::{debug, info};
use zztris_engine::{Board, SpinKind};
use zztris_evaluator::{
    config::Config,
    feature::BoardFeatures,
    strategy::{
        Attack, AttackStatus, Baseline, BaselineStatus, Combo, ComboStatus, Dig, DigStatus,
        Guideline, GuidelineStatus, PathStatus as _, Strategy,
    },
};

use crate::schema::scenario::{PlacementSpec, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum StrategyKind {
    Baseline,
    Attack,
    Dig,
    Guideline,
    Combo,
}

impl StrategyKind {
    pub const ALL: [Self; 5] = [
        Self::Baseline,
        Self::Attack,
        Self::Dig,
        Self::Guideline,
        Self::Combo,
    ];

    /// The chosen strategy, or every strategy when none is chosen.
    pub fn selected(kind: Option<Self>) -> Vec<Self> {
        kind.map_or_else(|| Self::ALL.to_vec(), |kind| vec![kind])
    }
}

/// Scoring of one placement along a path.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport<R, S> {
    pub depth: usize,
    pub placement: String,
    pub cleared: usize,
    pub spin: SpinKind,
    /// Board after the placement locked and lines cleared
    pub board: Board,
    pub features: BoardFeatures,
    pub result: R,
    pub status: S,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathReport<R, S> {
    pub strategy: &'static str,
    pub steps: Vec<StepReport<R, S>>,
}

/// Locks each placement in turn and folds the results into one status chain.
///
/// The first placement is scored at `first_depth`; each following one is one
/// level deeper.
pub fn score_path<S>(
    strategy: &S,
    scenario: &Scenario,
    placements: &[PlacementSpec],
    first_depth: usize,
    initial: S::Status,
) -> anyhow::Result<PathReport<S::Result, S::Status>>
where
    S: Strategy,
{
    let mut board = scenario.board.clone();
    let mut status = initial;
    let mut steps = Vec::with_capacity(placements.len());
    for (i, spec) in placements.iter().enumerate() {
        let depth = first_depth + i;
        let mut placement = spec
            .resolve(&board)
            .with_context(|| format!("Invalid placement #{i}"))?;
        let mut after = board.clone();
        after.fill_placement(&placement);
        let cleared = after.clear_lines();
        let result = strategy.eval(&mut placement, &after, &board, cleared);
        status = strategy.get(&result, depth, scenario.hold, &status);
        debug!(
            strategy = strategy.name(),
            depth,
            %placement,
            cleared,
            value = status.value(),
            "scored placement"
        );
        steps.push(StepReport {
            depth,
            placement: placement.to_string(),
            cleared,
            spin: placement.spin(),
            board: after.clone(),
            features: BoardFeatures::extract(&after),
            result,
            status,
        });
        board = after;
    }
    info!(
        strategy = strategy.name(),
        steps = steps.len(),
        value = status.value(),
        "scored path"
    );
    Ok(PathReport {
        strategy: strategy.name(),
        steps,
    })
}

/// Builds the strategy of `kind` for the scenario and scores the placements.
pub fn score(
    kind: StrategyKind,
    scenario: &Scenario,
    placements: &[PlacementSpec],
    first_depth: usize,
    config: &Config,
) -> anyhow::Result<serde_json::Value> {
    let context = scenario.context()?;
    let value = match kind {
        StrategyKind::Baseline => serde_json::to_value(score_path(
            &Baseline::new(&context),
            scenario,
            placements,
            first_depth,
            BaselineStatus::default(),
        )?)?,
        StrategyKind::Attack => serde_json::to_value(score_path(
            &Attack::new(&context, config.clone()).context("Failed to build attack strategy")?,
            scenario,
            placements,
            first_depth,
            AttackStatus::default(),
        )?)?,
        StrategyKind::Dig => serde_json::to_value(score_path(
            &Dig::new(&context),
            scenario,
            placements,
            first_depth,
            DigStatus::default(),
        )?)?,
        StrategyKind::Guideline => serde_json::to_value(score_path(
            &Guideline::new(&context, config.clone())
                .context("Failed to build guideline strategy")?,
            scenario,
            placements,
            first_depth,
            GuidelineStatus {
                under_attack: scenario.under_attack,
                ..GuidelineStatus::default()
            },
        )?)?,
        StrategyKind::Combo => serde_json::to_value(score_path(
            &Combo::new(&context, config.clone()).context("Failed to build combo strategy")?,
            scenario,
            placements,
            first_depth,
            ComboStatus::default(),
        )?)?,
    };
    Ok(value)
}
