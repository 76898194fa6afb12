//! Combo-building strategy.
//!
//! With `mode == 1` the strategy keeps a wide well open on the board and runs
//! a combo state machine in [`Strategy::get`]: starting a combo from a tall,
//! dense stack is rewarded, while breaking or starting one too early is
//! penalized. Cell-count thresholds shrink by `safe * width` to keep a margin.
//! Any other mode evaluates the board shape only.

use serde::Serialize;
use tracing::debug;
use zztris_engine::{Board, GameContext, PieceKind, Placement};

use super::{
    BranchMerge, PathStatus, Strategy, average_branches, depth_divisor, float, middle, signed,
};
use crate::{
    config::{Config, ConfigError},
    danger::DangerTable,
    feature::{self, HoleScan, RowTransitionStyle},
};

/// Row whose occupation alone counts as a danger.
const CEILING_ROW: usize = 17;

/// Clear-width weights of the top three hole layers.
const LAYER_WEIGHTS: [f64; 3] = [8.0, 4.0, 1.0];

/// Penalty for placements that cannot be reached by a hard drop.
const SOFT_DROP_PENALTY: f64 = 800.0;

#[derive(Debug, Clone)]
pub struct Combo {
    config: Config,
    width: usize,
    height: usize,
    danger: DangerTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComboResult {
    pub land_point: f64,
    pub map: f64,
    /// Well-shape attack potential, 0 unless `mode == 1`.
    pub attack: f64,
    pub clear: usize,
    /// Height of the lowest column.
    pub low_y: usize,
    /// Occupied cells plus holes.
    pub count: i32,
    pub soft_drop: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ComboStatus {
    pub land_point: f64,
    pub combo: i32,
    pub value: f64,
}

impl PathStatus for ComboStatus {
    fn value(&self) -> f64 {
        self.value
    }
}

impl Combo {
    pub fn new(context: &GameContext, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let danger = DangerTable::lowered(context).with_ceiling_row(CEILING_ROW);
        debug!(
            mode = config.mode,
            safe = config.safe,
            "built combo danger table"
        );
        Ok(Self {
            config,
            width: context.width(),
            height: context.height(),
            danger,
        })
    }

    /// Column the combo well is built in; edges win ties.
    fn low_column(&self, board: &Board) -> usize {
        let top = board.tops();
        let last = self.width - 1;
        let mut low_x = 1;
        for x in 2..last {
            if top[x] < top[low_x] {
                low_x = x;
            }
        }
        if top[0] <= top[low_x] {
            low_x = 0;
        }
        if top[last] <= top[low_x] {
            low_x = last;
        }
        low_x
    }

    fn well_attack(&self, scan: &HoleScan) -> f64 {
        if self.config.mode != 1 {
            return 0.0;
        }
        let wells = scan.wide_wells().map(f64::from);
        let single = wells[0].min(4.0);
        wells[5] * 16.0
            + wells[4] * 24.0
            + wells[3] * 32.0
            + wells[2] * 40.0
            + wells[1] * 8.0
            + single * single * 128.0
    }

    /// Combo state machine bonus for `mode == 1`.
    fn combo_bonus(&self, result: &ComboResult, combo: i32) -> f64 {
        let margin = self.config.safe * signed(self.width);
        let count = result.count;
        if result.clear == 0 {
            return if combo > 0 && count <= 64 - margin {
                -2000.0
            } else {
                0.0
            };
        }
        match combo {
            0 => {
                if result.clear == 4 && count >= 84 - margin {
                    8000.0
                } else if result.clear == 3 && count >= 92 - margin {
                    4000.0
                } else if result.low_y <= 5 {
                    if count < 92 - margin {
                        -4000.0
                    } else if result.clear < 3 {
                        if count <= 100 - margin {
                            -4000.0
                        } else if count <= 120 - margin {
                            -2000.0
                        } else {
                            0.0
                        }
                    } else {
                        0.0
                    }
                } else {
                    0.0
                }
            }
            1 => match result.clear {
                4 => 2500.0,
                3 => 1000.0,
                _ => 0.0,
            },
            _ => {
                let mut bonus = 0.0;
                if combo > 3 && result.clear > 1 && count <= 72 - margin {
                    bonus -= 1000.0;
                }
                if combo < 6 {
                    bonus += 2000.0;
                } else {
                    bonus += f64::from(combo) * 10000.0;
                }
                bonus
            }
        }
    }
}

impl Strategy for Combo {
    type Result = ComboResult;
    type Status = ComboStatus;

    fn name(&self) -> &'static str {
        "combo"
    }

    fn eval(
        &self,
        placement: &mut Placement,
        board: &Board,
        prior: &Board,
        cleared: usize,
    ) -> ComboResult {
        let land_height = float(placement.top());
        let middle = middle(placement, self.width);
        let mut board_dead_zone = f64::from(self.danger.count(board));
        if board.roof() == self.height {
            board_dead_zone += 70.0;
        }

        let col_trans = f64::from(feature::column_transitions(board));
        let row_trans = f64::from(feature::row_transitions(
            board,
            RowTransitionStyle::Walled,
        ));
        let scan = HoleScan::new(board);
        let buried: f64 = LAYER_WEIGHTS
            .iter()
            .enumerate()
            .map(|(i, weight)| f64::from(scan.clear_width(board, i)) * weight)
            .sum();

        let land_point = -land_height * 1750.0 / float(self.height)
            + middle * 2.0
            + float(cleared) * 60.0
            - board_dead_zone * 50_000_000.0;
        let map = -col_trans * 80.0
            - row_trans * 80.0
            - f64::from(scan.hole_count()) * 80.0
            - f64::from(scan.hole_line()) * 380.0
            - buried
            - f64::from(scan.well_depth()) * 100.0;
        ComboResult {
            land_point,
            map,
            attack: self.well_attack(&scan),
            clear: cleared,
            low_y: board.top(self.low_column(board)),
            count: signed(board.count()) + scan.hole_count().cast_signed(),
            soft_drop: !placement.open(prior),
        }
    }

    fn get(
        &self,
        result: &ComboResult,
        depth: usize,
        _hold: Option<PieceKind>,
        status: &ComboStatus,
    ) -> ComboStatus {
        let mut next = *status;
        next.land_point += result.land_point;
        if self.config.mode == 1 {
            if status.combo == 0 {
                next.land_point += result.attack;
            }
            next.land_point += self.combo_bonus(result, status.combo);
            if result.clear > 0 {
                next.combo += 1;
            }
        }
        if result.soft_drop {
            next.land_point -= SOFT_DROP_PENALTY;
        }
        next.value = next.land_point / depth_divisor(depth) + result.map;
        next
    }
}

impl BranchMerge for Combo {
    fn iterate(&self, branches: &[Option<&ComboStatus>]) -> ComboStatus {
        ComboStatus {
            land_point: 0.0,
            combo: 0,
            value: average_branches(branches),
        }
    }
}
