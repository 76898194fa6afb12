use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::debug;
use zztris_engine::{Board, GameContext, MAX_WIDTH, PieceKind, Placement};

use super::{PathStatus, Strategy, depth_divisor, float, middle};
use crate::{
    config::{Config, ConfigError},
    danger::DangerTable,
    feature::{self, HoleScan, RowTransitionStyle},
};

/// Penalty for a placement whose top reaches the ceiling.
const DEAD_ZONE: f64 = 500_000.0;

/// Line-sending strategy that keeps a garbage-receiving column open.
///
/// Rows that are one cell short of full (or two adjacent cells short) are
/// "receiving lines": the stack above the receiving column is scored by how
/// many of them line up.
#[derive(Debug, Clone)]
pub struct Attack {
    config: Config,
    width: usize,
    height: usize,
    danger: DangerTable,
    /// Full rows with one column removed, sorted.
    check_line_1: ArrayVec<u32, MAX_WIDTH>,
    /// Full rows with two adjacent columns removed, sorted.
    check_line_2: ArrayVec<u32, MAX_WIDTH>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttackResult {
    pub land_point: f64,
    pub map: f64,
    pub clear: usize,
    /// How close the receiving column is to the ceiling, 0 (safe) to 5.
    pub danger: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct AttackStatus {
    pub land_point: f64,
    /// Lines cleared one or two at a time.
    pub rubbish: usize,
    pub attack: f64,
    pub value: f64,
}

impl PathStatus for AttackStatus {
    fn value(&self) -> f64 {
        self.value
    }
}

impl Attack {
    pub fn new(context: &GameContext, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let width = context.width();
        if config.mode & 1 != 0 && width < 5 {
            return Err(ConfigError::WidthTooSmall {
                mode: config.mode,
                width,
                min: 5,
            });
        }

        let full = context.full();
        let mut check_line_1: ArrayVec<u32, MAX_WIDTH> =
            (0..width).map(|x| full & !(1 << x)).collect();
        let mut check_line_2: ArrayVec<u32, MAX_WIDTH> =
            (0..width - 1).map(|x| full & !(3 << x)).collect();
        check_line_1.sort_unstable();
        check_line_2.sort_unstable();
        debug!(
            mode = config.mode,
            check_line_1 = check_line_1.len(),
            check_line_2 = check_line_2.len(),
            "built attack receiving-line tables"
        );

        Ok(Self {
            config,
            width,
            height: context.height(),
            danger: DangerTable::new(context),
            check_line_1,
            check_line_2,
        })
    }

    fn is_check_line_1(&self, row: u32) -> bool {
        self.check_line_1.binary_search(&row).is_ok()
    }

    fn is_check_line_2(&self, row: u32) -> bool {
        self.check_line_2.binary_search(&row).is_ok()
    }

    /// Column garbage is expected to be received in.
    fn low_column(&self, board: &Board) -> usize {
        let top = board.tops();
        let last = self.width - 1;
        if self.config.mode & 1 == 0 {
            let mut low_x = 1;
            for x in 2..last {
                if top[x] < top[low_x] {
                    low_x = x;
                }
            }
            if top[0] < top[low_x] {
                low_x = 0;
            }
            if top[last] < top[low_x] {
                low_x = last;
            }
            low_x
        } else {
            let mut low_x = if top[last - 3] <= top[last - 4] {
                last - 3
            } else {
                last - 4
            };
            if top[last - 2] <= top[low_x] {
                low_x = last - 2;
            }
            low_x
        }
    }

    /// Scores the receiving lines stacked between the roof and `low_y`.
    fn attack_depth(&self, board: &Board, low_y: usize) -> f64 {
        let roof = board.roof();
        let scan = low_y..roof;
        let Some(first) = scan.clone().rev().find(|&y| self.is_check_line_1(board.row(y))) else {
            return -2.0 * float(scan.len());
        };
        let misses = -2.0 * float(roof - 1 - first);
        let head = if first + 1 < self.height && self.is_check_line_2(board.row(first + 1)) {
            20.0
        } else {
            16.0
        };
        let below: f64 = (low_y..first)
            .map(|y| {
                if self.is_check_line_1(board.row(y)) {
                    3.0
                } else {
                    -5.0
                }
            })
            .sum();
        misses + head + below
    }

    /// Attack depth and ceiling danger of the receiving column.
    ///
    /// A shallow attack depth is worthless once the receiving column is within
    /// five rows of the ceiling.
    fn receiving(&self, board: &Board) -> (f64, u32) {
        let low_y = board.top(self.low_column(board));
        let attack_depth = self.attack_depth(board, low_y);
        let room = u32::try_from(self.height - low_y).unwrap_or(u32::MAX);
        let danger = 5 - room.min(5);
        if danger > 0 && attack_depth < 20.0 {
            (0.0, danger)
        } else {
            (attack_depth, danger)
        }
    }
}

impl Strategy for Attack {
    type Result = AttackResult;
    type Status = AttackStatus;

    fn name(&self) -> &'static str {
        "attack"
    }

    fn eval(
        &self,
        placement: &mut Placement,
        board: &Board,
        _prior: &Board,
        cleared: usize,
    ) -> AttackResult {
        let land_height = float(placement.top());
        let middle = middle(placement, self.width);
        let dead_zone = if placement.top() == self.height {
            DEAD_ZONE
        } else {
            0.0
        };
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
        let hole_piece = f64::from(scan.clear_width(board, 0));

        let (attack_depth, danger) = self.receiving(board);

        let land_point = -land_height * 16.0 + middle * 0.2 + float(cleared) * 6.0
            - dead_zone
            - board_dead_zone * 500_000.0;
        let map = -col_trans * 32.0
            - row_trans * 32.0
            - f64::from(scan.hole_count()) * 400.0
            - f64::from(scan.hole_line()) * 38.0
            - f64::from(scan.well_depth()) * 16.0
            - f64::from(scan.hole_depth()) * 4.0
            - hole_piece * 2.0
            + attack_depth * 100.0;
        AttackResult {
            land_point,
            map,
            clear: cleared,
            danger,
        }
    }

    fn get(
        &self,
        result: &AttackResult,
        depth: usize,
        _hold: Option<PieceKind>,
        status: &AttackStatus,
    ) -> AttackStatus {
        let depth = depth_divisor(depth);
        let mut next = *status;
        next.land_point += result.land_point;
        match result.clear {
            0 => {}
            1 | 2 => next.rubbish += result.clear,
            3 if self.config.mode != 0 => next.attack += 12.0,
            clear => next.attack += float(clear) * 10.0 * (10.0 / depth),
        }
        let rubbish_rate = if result.danger > 0 { -100.0 } else { 640.0 };
        next.value = next.land_point / depth + result.map - float(next.rubbish) * rubbish_rate
            + next.attack * 100.0;
        next
    }
}

#[cfg(test)]
mod tests {
    use zztris_engine::PieceRotation;

    use super::*;

    fn strategy(mode: u32) -> Attack {
        Attack::new(
            &GameContext::standard(),
            Config {
                mode,
                ..Config::default()
            },
        )
        .unwrap()
    }

    fn eval(strategy: &Attack, board: &Board) -> AttackResult {
        let mut placement = Placement::new(PieceKind::O, PieceRotation::default(), 4, 0);
        strategy.eval(&mut placement, board, &Board::new(10, 22), 0)
    }

    #[test]
    fn test_check_lines() {
        let strategy = strategy(0);
        assert_eq!(strategy.check_line_1.len(), 10);
        assert_eq!(strategy.check_line_2.len(), 9);
        assert!(strategy.check_line_1.is_sorted());
        assert!(strategy.is_check_line_1(0b11_1111_1110));
        assert!(strategy.is_check_line_1(0b01_1111_1111));
        assert!(!strategy.is_check_line_1(0b11_1111_1111));
        assert!(strategy.is_check_line_2(0b11_1111_1100));
        assert!(!strategy.is_check_line_2(0b11_1111_1010));
    }

    #[test]
    fn test_mode_requires_width() {
        let narrow = GameContext::new(4, 22).unwrap();
        let config = Config {
            mode: 1,
            ..Config::default()
        };
        assert!(matches!(
            Attack::new(&narrow, config),
            Err(ConfigError::WidthTooSmall { min: 5, .. })
        ));
        assert!(Attack::new(&narrow, Config::default()).is_ok());
    }

    #[test]
    fn test_low_column() {
        let board = Board::from_ascii(
            10,
            22,
            r"
            ..##..###.
            ##########
            ",
        );
        // interior first minimum wins over the equally low edges
        assert_eq!(strategy(0).low_column(&board), 1);

        let board = Board::from_ascii(
            10,
            22,
            r"
            .#########
            ",
        );
        assert_eq!(strategy(0).low_column(&board), 0);

        // right side: ties resolve toward the right
        let flat = Board::new(10, 22);
        assert_eq!(strategy(1).low_column(&flat), 7);
        let board = Board::from_ascii(
            10,
            22,
            r"
            #####.####
            ",
        );
        assert_eq!(strategy(1).low_column(&board), 5);
    }

    #[test]
    fn test_attack_depth() {
        let strategy = strategy(0);
        // receiving column 1; rows from the top: miss, hit (row above is a
        // double gap), hit, miss
        let board = Board::from_ascii(
            10,
            22,
            r"
            #..#######
            #.########
            #.########
            #.#.######
            ",
        );
        assert_eq!(strategy.low_column(&board), 1);
        assert_eq!(board.top(1), 0);
        // row 3 is a double gap (miss, -2); row 2 is a hit under a double gap (+20);
        // row 1 hits (+3); row 0 misses (-5)
        assert_eq!(strategy.attack_depth(&board, 0), -2.0 + 20.0 + 3.0 - 5.0);

        let board = Board::from_ascii(
            10,
            22,
            r"
            #.#.######
            #.#.######
            ",
        );
        assert_eq!(strategy.attack_depth(&board, 0), -4.0);
    }

    #[test]
    fn test_eval_scores_receiving_lines() {
        let strategy = strategy(0);
        let open = Board::from_ascii(
            10,
            22,
            r"
            #.########
            #.########
            ",
        );
        let result = eval(&strategy, &open);
        assert_eq!(result.danger, 0);
        assert_eq!(result.clear, 0);

        let ragged = Board::from_ascii(
            10,
            22,
            r"
            #.#.######
            #.#.######
            ",
        );
        let ragged_result = eval(&strategy, &ragged);
        assert!(result.map > ragged_result.map);
    }

    #[test]
    fn test_danger_zeroes_shallow_attack() {
        let strategy = strategy(0);
        let mut board = Board::new(10, 22);
        for y in 0..18 {
            board.set_row(y, 0b01_1111_1111);
        }
        board.set_row(18, 0b11_1111_1101);
        board.set_row(19, 0b11_1111_1101);
        // receiving column 1 tops out at row 18, four rows below the ceiling
        assert_eq!(board.top(1), 18);
        assert_eq!(strategy.attack_depth(&board, 18), 16.0 + 3.0);
        assert_eq!(strategy.receiving(&board), (0.0, 1));
        assert_eq!(eval(&strategy, &board).danger, 1);

        // a double gap on top lifts the depth past the threshold
        board.set_row(20, 0b11_1111_1001);
        assert_eq!(board.top(1), 18);
        assert_eq!(strategy.receiving(&board), (-2.0 + 20.0 + 3.0, 1));
    }

    #[test]
    fn test_dead_zone() {
        let strategy = strategy(0);
        let board = Board::new(10, 22);
        let mut low = Placement::new(PieceKind::O, PieceRotation::default(), 4, 0);
        let mut high = Placement::new(PieceKind::O, PieceRotation::default(), 4, 20);
        let low = strategy.eval(&mut low, &board, &board, 0);
        let high = strategy.eval(&mut high, &board, &board, 0);
        let height_gap = 20.0 * 16.0;
        assert!((low.land_point - high.land_point - height_gap - DEAD_ZONE).abs() < 1e-9);
    }

    #[test]
    fn test_get() {
        let result = |clear, danger| AttackResult {
            land_point: 10.0,
            map: -5.0,
            clear,
            danger,
        };
        let root = AttackStatus::default();

        let single = strategy(0).get(&result(1, 0), 1, None, &root);
        assert_eq!(single.rubbish, 1);
        assert_eq!(single.value, 10.0 - 5.0 - 640.0);

        let in_danger = strategy(0).get(&result(2, 3), 1, None, &root);
        assert_eq!(in_danger.rubbish, 2);
        assert_eq!(in_danger.value, 10.0 - 5.0 + 200.0);

        // three lines: fixed bonus only when a mode is set
        let fixed = strategy(1).get(&result(3, 0), 2, None, &root);
        assert_eq!(fixed.attack, 12.0);
        let scaled = strategy(0).get(&result(3, 0), 2, None, &root);
        assert_eq!(scaled.attack, 3.0 * 10.0 * 5.0);

        let tetris = strategy(1).get(&result(4, 0), 4, None, &single);
        assert_eq!(tetris.attack, 4.0 * 10.0 * 2.5);
        assert_eq!(tetris.rubbish, 1);
        assert_eq!(tetris.land_point, 20.0);
    }
}
