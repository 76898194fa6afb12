use serde::Serialize;
use tracing::debug;
use zztris_engine::{Board, GameContext, PieceKind, Placement};

use super::{BranchMerge, PathStatus, Strategy, average_branches, depth_divisor, float, middle};
use crate::{
    danger::DangerTable,
    feature::{self, HoleScan, RowTransitionStyle},
};

/// Height/centering/line-clear heuristic with penalties for holes and wells.
#[derive(Debug, Clone)]
pub struct Baseline {
    height: usize,
    width: usize,
    danger: DangerTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselineResult {
    /// Placement-dependent part, accumulated along the path.
    pub land_point: f64,
    /// Board-dependent part.
    pub map: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct BaselineStatus {
    pub land_point: f64,
    pub value: f64,
}

impl PathStatus for BaselineStatus {
    fn value(&self) -> f64 {
        self.value
    }
}

impl Baseline {
    #[must_use]
    pub fn new(context: &GameContext) -> Self {
        let danger = DangerTable::new(context);
        debug!(
            width = context.width(),
            height = context.height(),
            "built baseline danger table"
        );
        Self {
            height: context.height(),
            width: context.width(),
            danger,
        }
    }
}

impl Strategy for Baseline {
    type Result = BaselineResult;
    type Status = BaselineStatus;

    fn name(&self) -> &'static str {
        "baseline"
    }

    fn eval(
        &self,
        placement: &mut Placement,
        board: &Board,
        _prior: &Board,
        cleared: usize,
    ) -> BaselineResult {
        let land_height = float(placement.top());
        let middle = middle(placement, self.width);

        let col_trans = f64::from(feature::column_transitions(board));
        let row_trans = f64::from(feature::row_transitions(
            board,
            RowTransitionStyle::ImplicitFloor,
        ));
        let scan = HoleScan::new(board);
        let hole_piece = f64::from(scan.clear_width(board, 0));
        let danger = f64::from(self.danger.count(board));

        let land_point =
            -land_height * 1750.0 / float(self.height) + middle * 2.0 + float(cleared) * 60.0;
        let map = -col_trans * 80.0
            - row_trans * 80.0
            - f64::from(scan.hole_count()) * 60.0
            - f64::from(scan.hole_line()) * 380.0
            - f64::from(scan.well_depth()) * 100.0
            - f64::from(scan.hole_depth()) * 40.0
            - hole_piece * 5.0
            - danger * 50000.0;
        BaselineResult { land_point, map }
    }

    fn get(
        &self,
        result: &BaselineResult,
        depth: usize,
        _hold: Option<PieceKind>,
        status: &BaselineStatus,
    ) -> BaselineStatus {
        let land_point = status.land_point + result.land_point;
        BaselineStatus {
            land_point,
            value: land_point / depth_divisor(depth) + result.map,
        }
    }
}

impl BranchMerge for Baseline {
    fn iterate(&self, branches: &[Option<&BaselineStatus>]) -> BaselineStatus {
        BaselineStatus {
            land_point: 0.0,
            value: average_branches(branches),
        }
    }
}
