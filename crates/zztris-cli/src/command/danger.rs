use std::path::PathBuf;

use anyhow::Context as _;
use serde::Serialize;
use tracing::info;
use zztris_engine::{GameContext, PieceKind};
use zztris_evaluator::danger::{DANGER_ROWS, DangerTable};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DangerArg {
    /// Board width
    #[arg(long, default_value_t = GameContext::STANDARD_WIDTH)]
    width: usize,
    /// Board height
    #[arg(long, default_value_t = GameContext::STANDARD_HEIGHT)]
    height: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct DangerReport {
    width: usize,
    height: usize,
    kinds: Vec<KindDanger>,
}

/// Danger masks of one kind, top row first.
#[derive(Debug, Clone, Serialize)]
struct KindDanger {
    kind: PieceKind,
    spawn: String,
    masks: Vec<String>,
    lowered: Vec<String>,
}

fn build_report(context: &GameContext) -> DangerReport {
    let table = DangerTable::new(context);
    let lowered = DangerTable::lowered(context);
    let rows = |masks: &[u32; DANGER_ROWS]| -> Vec<String> {
        masks
            .iter()
            .rev()
            .map(|mask| util::mask_ascii(*mask, context.width()))
            .collect()
    };
    let kinds = PieceKind::ALL
        .into_iter()
        .map(|kind| KindDanger {
            kind,
            spawn: context.generate(kind).to_string(),
            masks: rows(table.masks(kind)),
            lowered: rows(lowered.masks(kind)),
        })
        .collect();
    DangerReport {
        width: context.width(),
        height: context.height(),
        kinds,
    }
}

pub(crate) fn run(arg: &DangerArg) -> anyhow::Result<()> {
    let context = GameContext::new(arg.width, arg.height).context("Invalid board dimensions")?;
    let report = build_report(&context);
    info!(
        width = report.width,
        height = report.height,
        "built danger tables"
    );
    Output::save_json(&report, arg.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_report() {
        let report = build_report(&GameContext::standard());
        assert_eq!(report.kinds.len(), PieceKind::LEN);
        let i = &report.kinds[PieceKind::I.id()];
        assert_eq!(i.kind, PieceKind::I);
        assert_eq!(i.spawn, "I#0@3,21");
        assert_eq!(
            i.masks,
            ["...####...", "..........", "..........", ".........."]
        );
        // one row lower, the footprint also covers the second row
        assert_eq!(
            i.lowered,
            ["...####...", "...####...", "..........", ".........."]
        );
    }
}
