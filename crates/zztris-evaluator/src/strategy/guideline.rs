//! Guideline-rules strategy: T-spins, back-to-back, combos and survivability.
//!
//! Unlike the other strategies the status value is not accumulated: each
//! [`Strategy::get`] call recomputes it from the board score of the latest
//! placement, scaled by the attack economy carried in the status and by how much
//! room is left below the spawn area.
//!
//! # T-spin cavities
//!
//! The board is searched bottom-up for prepared T-spin slots:
//!
//! - **T2** (double): a 3-wide window `#.#` in a row one cell short of full,
//!   with an empty window above it.
//! - **T3** (triple): a 4-wide window shaped as a TST slot, in either
//!   orientation.
//!
//! Each kind of cavity stops the search once a sufficiently complete one is found,
//! so only the lowest complete cavity contributes.

use serde::Serialize;
use tracing::debug;
use zztris_engine::{Board, GameContext, PieceKind, Placement, SpinKind};

use super::{PathStatus, Strategy, depth_divisor, signed};
use crate::config::{Config, ConfigError};

/// Penalty for placements that leave no margin below the spawn area.
const DEATH_PENALTY: f64 = 99_999.0;

/// A T3 slot orientation, as 4-bit windows read from the bottom row up.
struct TripleSlot {
    /// Bottom row, repeated as the third row.
    base: u32,
    /// Fourth row: the overhang.
    overhang: u32,
    /// Fifth row windows that complete the roof.
    roof: [u32; 2],
}

const TRIPLE_SLOTS: [TripleSlot; 2] = [
    TripleSlot {
        base: 0b1011,
        overhang: 0b1000,
        roof: [0b0100, 0b1100],
    },
    TripleSlot {
        base: 0b1101,
        overhang: 0b0001,
        roof: [0b0011, 0b0001],
    },
];

/// Middle row of every T3 slot.
const TRIPLE_NECK: u32 = 0b1001;

#[derive(Debug, Clone)]
pub struct Guideline {
    config: Config,
    width: usize,
    /// Lowest spawn row over all piece kinds.
    danger_line: i32,
    /// Columns covered by any spawn bounding box.
    reach: u32,
    /// Cells available below the spawn area.
    full_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuidelineResult {
    /// Cell-position score of the board (always non-positive).
    pub board_score: i32,
    pub clear: usize,
    /// Sum of column heights.
    pub count: i32,
    /// Rows between the highest stack under the spawn area and the danger line.
    pub safe: i32,
    pub spin: SpinKind,
    pub t2: i32,
    pub t3: i32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct GuidelineStatus {
    pub value: f64,
    pub combo: i32,
    /// Incoming garbage lines not yet received.
    pub under_attack: i32,
    pub attack: i32,
    /// Style bonus accumulated along the path.
    pub like: i32,
    pub b2b: bool,
}

impl PathStatus for GuidelineStatus {
    fn value(&self) -> f64 {
        self.value
    }
}

impl Guideline {
    pub fn new(context: &GameContext, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut danger_line = context.height();
        let mut reach = 0;
        for kind in PieceKind::ALL {
            let spawn = context.generate(kind);
            danger_line = danger_line.min(spawn.row());
            reach |= ((1 << spawn.width()) - 1) << spawn.col();
        }
        let danger_line = signed(danger_line);
        let full_count = signed(context.width()) * (danger_line - 1);
        debug!(danger_line, reach, full_count, "built guideline spawn limits");
        Ok(Self {
            config,
            width: context.width(),
            danger_line,
            reach,
            full_count,
        })
    }

    fn board_score(board: &Board) -> i32 {
        let width = board.width();
        let mut score = 0;
        for x in 0..width {
            for y in 0..board.roof() {
                let weight = signed(y + 1);
                if board.is_occupied(x, y) {
                    score -= 2 * weight;
                    continue;
                }
                if x == width - 1 || board.is_occupied(x + 1, y) {
                    score -= 3 * weight;
                }
                if x == 0 || board.is_occupied(x - 1, y) {
                    score -= 3 * weight;
                }
                if board.is_occupied(x, y + 1) {
                    score -= 10 * weight;
                    if board.is_occupied(x, y + 2) {
                        score -= 4;
                        if board.is_occupied(x, y + 3) {
                            score -= 3;
                            if board.is_occupied(x, y + 4) {
                                score -= 2;
                            }
                        }
                    }
                }
            }
        }
        score
    }

    fn safe(&self, board: &Board) -> i32 {
        let line = match board.roof().checked_sub(1) {
            None => -1,
            Some(top) => signed(
                (1..=top)
                    .rev()
                    .find(|&y| board.row(y) & self.reach != 0)
                    .unwrap_or(0),
            ),
        };
        self.danger_line - (line + 2)
    }

    /// Scores prepared T2 and T3 cavities, lowest first.
    fn cavities(board: &Board) -> (i32, i32) {
        let width = board.width();
        let full = board.full_mask().count_ones();
        let mut t2 = 0;
        let mut t3 = 0;
        let mut finding2 = true;
        let mut finding3 = true;
        for y in 0..board.roof().saturating_sub(2) {
            if !finding2 && !finding3 {
                break;
            }
            let row: [u32; 5] = std::array::from_fn(|dy| board.row(y + dy));

            for x in 0..width - 2 {
                if !finding2 {
                    break;
                }
                if (row[0] >> x) & 7 != 0b101
                    || (row[1] >> x) & 7 != 0
                    || row[0].count_ones() != full - 1
                {
                    continue;
                }
                t2 += 1;
                if row[1].count_ones() == full - 3 {
                    t2 += 2;
                    let cap = (row[2] >> x) & 7;
                    if cap == 0b001 || cap == 0b100 {
                        t2 += 2;
                    }
                    finding2 = false;
                }
            }

            for x in 0..width - 3 {
                if !finding3 {
                    break;
                }
                for slot in &TRIPLE_SLOTS {
                    if (row[0] >> x) & 15 != slot.base
                        || (row[1] >> x) & 15 != TRIPLE_NECK
                        || row[0].count_ones() != full - 1
                    {
                        continue;
                    }
                    t3 += 1;
                    if row[1].count_ones() != full - 2 {
                        continue;
                    }
                    t3 += 2;
                    if (row[2] >> x) & 15 != slot.base {
                        continue;
                    }
                    t3 += 1;
                    if row[2].count_ones() == full - 1 {
                        t3 += 1;
                        if (row[3] >> x) & 15 == slot.overhang {
                            t3 += 3;
                            if slot.roof.contains(&((row[4] >> x) & 15)) {
                                t3 += 5;
                            }
                        }
                    }
                    finding3 = false;
                }
            }
        }
        (t2, t3)
    }
}

impl Strategy for Guideline {
    type Result = GuidelineResult;
    type Status = GuidelineStatus;

    fn name(&self) -> &'static str {
        "guideline"
    }

    fn eval(
        &self,
        placement: &mut Placement,
        board: &Board,
        _prior: &Board,
        cleared: usize,
    ) -> GuidelineResult {
        let flags = placement.flags();
        if cleared > 0 && flags.check && flags.last_rotate {
            let spin = if cleared == 1 && flags.mini_ready {
                SpinKind::Mini
            } else if flags.ready {
                SpinKind::Full
            } else {
                SpinKind::None
            };
            placement.set_spin(spin);
        }
        let (t2, t3) = Self::cavities(board);
        GuidelineResult {
            board_score: Self::board_score(board),
            clear: cleared,
            count: board.tops().iter().map(|top| i32::from(*top)).sum(),
            safe: self.safe(board),
            spin: placement.spin(),
            t2,
            t3,
        }
    }

    fn get(
        &self,
        result: &GuidelineResult,
        depth: usize,
        hold: Option<PieceKind>,
        status: &GuidelineStatus,
    ) -> GuidelineStatus {
        let rate = 1.0 / depth_divisor(depth) + 1.0;
        let spun = !result.spin.is_none();
        let b2b_bonus = |plain: i32| if status.b2b { plain + 1 } else { plain };

        let mut next = *status;
        next.value = f64::from(result.board_score);
        let mut up = 0;
        if result.safe <= 0 {
            next.value -= DEATH_PENALTY;
        }
        match result.clear {
            0 => {
                if status.combo > 0 && status.combo < 3 {
                    next.like -= 2;
                }
                next.combo = 0;
                if status.under_attack > 0 {
                    up = (status.under_attack - status.attack).max(0);
                    if up >= result.safe {
                        next.value -= DEATH_PENALTY;
                    }
                    next.under_attack = 0;
                }
            }
            1 => {
                match result.spin {
                    SpinKind::Mini => next.attack += b2b_bonus(1),
                    SpinKind::Full => next.attack += b2b_bonus(2),
                    SpinKind::None => {}
                }
                next.combo += 1;
                next.attack += self.config.combo_attack(next.combo);
                next.b2b = spun;
            }
            2 => {
                if spun {
                    next.like += 8;
                    next.attack += b2b_bonus(4);
                }
                next.combo += 1;
                next.attack += self.config.combo_attack(next.combo);
                next.b2b = spun;
            }
            3 => {
                if spun {
                    next.like += 12;
                    next.attack += if status.b2b { 8 } else { 6 };
                }
                next.combo += 1;
                next.attack += self.config.combo_attack(next.combo) + 2;
                next.b2b = spun;
            }
            4 => {
                next.like += 8;
                next.combo += 1;
                next.attack += self.config.combo_attack(next.combo) + b2b_bonus(4);
                next.b2b = true;
            }
            _ => {}
        }
        if next.combo < 5 {
            next.like -= next.combo;
        }
        if result.count == 0 && up == 0 {
            next.like += 20;
            next.attack += 6;
        }
        match hold {
            Some(PieceKind::T) if !spun => next.like += 4,
            Some(PieceKind::I) if result.clear != 4 => next.like += 2,
            _ => {}
        }

        let t3 = if result.safe >= 12 && next.under_attack < 2 {
            result.t3 * if next.b2b { 128 } else { 80 }
        } else {
            0
        };
        let score = next.attack * 160
            + result.t2 * 128
            + t3
            + if next.b2b { 240 } else { 0 }
            + next.like * 24;
        let capacity =
            (self.full_count - result.count - next.under_attack * signed(self.width)).max(0);
        next.value +=
            f64::from(score) * rate * f64::from(capacity) / f64::from(self.full_count);
        next
    }
}
