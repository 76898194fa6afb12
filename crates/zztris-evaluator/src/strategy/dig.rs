use serde::Serialize;
use tracing::debug;
use zztris_engine::{Board, GameContext, PieceKind, Placement};

use super::{PathStatus, Strategy, depth_divisor, float, middle};
use crate::{
    danger::DangerTable,
    feature::{self, HoleScan, MAX_HOLE_LAYERS, RowTransitionStyle},
};

/// Clear-width weight per hole layer, topmost first.
const LAYER_WEIGHTS: [f64; MAX_HOLE_LAYERS] =
    [4.0, 1.0, 0.25, 0.125, 0.0625, 0.031_25, 0.015_625, 0.007_812_5];

/// Baseline variant that weighs every buried hole layer, not just the top one.
#[derive(Debug, Clone)]
pub struct Dig {
    height: usize,
    width: usize,
    danger: DangerTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DigResult {
    pub land_point: f64,
    pub map: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct DigStatus {
    pub land_point: f64,
    pub value: f64,
}

impl PathStatus for DigStatus {
    fn value(&self) -> f64 {
        self.value
    }
}

impl Dig {
    #[must_use]
    pub fn new(context: &GameContext) -> Self {
        debug!(layers = MAX_HOLE_LAYERS, "built dig strategy");
        Self {
            height: context.height(),
            width: context.width(),
            danger: DangerTable::new(context),
        }
    }
}

impl Strategy for Dig {
    type Result = DigResult;
    type Status = DigStatus;

    fn name(&self) -> &'static str {
        "dig"
    }

    fn eval(
        &self,
        placement: &mut Placement,
        board: &Board,
        _prior: &Board,
        cleared: usize,
    ) -> DigResult {
        let land_height = float(placement.top());
        let middle = middle(placement, self.width);

        let col_trans = f64::from(feature::column_transitions(board));
        let row_trans = f64::from(feature::row_transitions(
            board,
            RowTransitionStyle::ImplicitFloor,
        ));
        let scan = HoleScan::new(board);
        let buried: f64 = scan
            .layers()
            .iter()
            .zip(LAYER_WEIGHTS)
            .map(|(layer, weight)| f64::from(layer.clear_width(board)) * weight)
            .sum();
        let danger = f64::from(self.danger.count(board));

        let land_point =
            -land_height * 1750.0 / float(self.height) + middle * 2.0 + float(cleared) * 60.0;
        let map = -col_trans * 80.0
            - row_trans * 80.0
            - f64::from(scan.hole_count()) * 60.0
            - f64::from(scan.hole_line()) * 380.0
            - f64::from(scan.well_depth()) * 100.0
            - f64::from(scan.hole_depth()) * 40.0
            - buried
            - danger * 50000.0;
        DigResult { land_point, map }
    }

    fn get(
        &self,
        result: &DigResult,
        depth: usize,
        _hold: Option<PieceKind>,
        status: &DigStatus,
    ) -> DigStatus {
        let land_point = status.land_point + result.land_point;
        DigStatus {
            land_point,
            value: land_point / depth_divisor(depth) + result.map,
        }
    }
}
