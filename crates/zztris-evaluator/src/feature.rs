//! Bit-level board features shared by every strategy.
//!
//! All features read a [`Board`] snapshot once, top to bottom or bottom to top,
//! with per-column counters kept in stack arrays. Nothing here allocates.
//!
//! # Terms
//!
//! - **Covered mask**: while scanning from the roof downward, the OR of every row
//!   seen so far. A column bit is covered once any cell at or above the current
//!   row is occupied.
//! - **Hole**: an empty cell under a covered column (`covered ^ row`).
//! - **Hole layer**: a row containing holes, recorded as `(y + 1, hole bits)` so
//!   that the layer names the first row above the holes.
//! - **Well cell**: an uncovered cell whose left and right neighbors (or the wall)
//!   are covered.

use arrayvec::ArrayVec;
use serde::Serialize;
use zztris_engine::{Board, MAX_WIDTH};

/// Deepest number of hole layers any strategy inspects.
pub const MAX_HOLE_LAYERS: usize = 8;

/// Wide-well histogram buckets: runs of 1 to 6 uncovered columns.
pub const WIDE_WELL_BUCKETS: usize = 6;

/// Board coordinates never exceed `MAX_HEIGHT`, so counts fit comfortably.
#[expect(clippy::cast_possible_truncation)]
fn small(n: usize) -> u32 {
    n as u32
}

/// Counts horizontal neighbor changes down each column.
///
/// Every empty row above the roof counts twice (both walls). Below the roof each
/// row adds one per empty edge column plus one per adjacent pair of columns that
/// differ.
#[must_use]
pub fn column_transitions(board: &Board) -> u32 {
    let width = board.width();
    let col_mask = board.full_mask() & !1;
    let mut transitions = 2 * small(board.height() - board.roof());
    for y in 0..board.roof() {
        let row = board.row(y);
        if row & 1 == 0 {
            transitions += 1;
        }
        if (row >> (width - 1)) & 1 == 0 {
            transitions += 1;
        }
        transitions += ((row ^ (row << 1)) & col_mask).count_ones();
    }
    transitions
}

/// How the floor and the space above the roof are treated by [`row_transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTransitionStyle {
    /// The floor is an implicit full row; the space above the roof is empty.
    ImplicitFloor,
    /// As `ImplicitFloor`, plus a flat `width` charge unless the stack touches
    /// the ceiling, where the ceiling counts as a full row.
    Walled,
}

/// Counts vertical changes between consecutive rows.
#[must_use]
pub fn row_transitions(board: &Board, style: RowTransitionStyle) -> u32 {
    let full = board.full_mask();
    let roof = board.roof();
    let at_ceiling = roof == board.height();
    let top_row = roof.checked_sub(1).map_or(0, |y| board.row(y));
    let between: u32 = (1..roof)
        .map(|y| (board.row(y - 1) ^ board.row(y)).count_ones())
        .sum();
    match style {
        RowTransitionStyle::ImplicitFloor => {
            let top = if at_ceiling { !full & top_row } else { top_row };
            (full ^ board.row(0)).count_ones() + top.count_ones() + between
        }
        RowTransitionStyle::Walled => {
            let base = if at_ceiling { 0 } else { small(board.width()) };
            let top = if at_ceiling { full & !top_row } else { top_row };
            base + between + (full & !board.row(0)).count_ones() + top.count_ones()
        }
    }
}

/// A row containing holes: `posy` is the row above it, `bits` the hole columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoleLayer {
    pub posy: usize,
    pub bits: u32,
}

impl HoleLayer {
    /// Weighted count of the cells stacked on this layer's holes.
    ///
    /// Walks up from `posy` while any hole column is still occupied; each row
    /// adds `(y + 1) * occupied_hole_columns`.
    #[must_use]
    pub fn clear_width(&self, board: &Board) -> u32 {
        let mut width = 0;
        for y in self.posy..board.roof() {
            let check = self.bits & board.row(y);
            if check == 0 {
                break;
            }
            width += small(y + 1) * check.count_ones();
        }
        width
    }
}

/// Holes, wells and wide wells from one top-down pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleScan {
    hole_count: u32,
    hole_line: u32,
    hole_depth: u32,
    well_depth: u32,
    wide_wells: [u32; WIDE_WELL_BUCKETS],
    layers: ArrayVec<HoleLayer, MAX_HOLE_LAYERS>,
}

impl HoleScan {
    #[must_use]
    pub fn new(board: &Board) -> Self {
        let width = board.width();
        let mut scan = Self {
            hole_count: 0,
            hole_line: 0,
            hole_depth: 0,
            well_depth: 0,
            wide_wells: [0; WIDE_WELL_BUCKETS],
            layers: ArrayVec::new(),
        };
        let mut hole_num = [0u32; MAX_WIDTH];
        let mut well_num = [0u32; MAX_WIDTH];
        let mut covered = 0u32;

        for y in (0..board.roof()).rev() {
            let row = board.row(y);
            covered |= row;
            let line_hole = covered ^ row;
            if line_hole != 0 {
                scan.hole_count += line_hole.count_ones();
                scan.hole_line += 1;
                if !scan.layers.is_full() {
                    scan.layers.push(HoleLayer {
                        posy: y + 1,
                        bits: line_hole,
                    });
                }
            }

            let mut run = 0;
            let mut widest = 0;
            for x in 0..width {
                if (line_hole >> x) & 1 != 0 {
                    hole_num[x] += 1;
                    scan.hole_depth += hole_num[x];
                } else {
                    hole_num[x] = 0;
                }

                if is_well_cell(covered, x, width) {
                    well_num[x] += 1;
                    scan.well_depth += well_num[x];
                } else {
                    well_num[x] = 0;
                }

                if (covered >> x) & 1 == 0 {
                    run += 1;
                    widest = widest.max(run);
                } else {
                    run = 0;
                }
            }
            if (1..=WIDE_WELL_BUCKETS).contains(&widest) {
                scan.wide_wells[widest - 1] += 1;
            }
        }
        scan
    }

    #[must_use]
    pub fn hole_count(&self) -> u32 {
        self.hole_count
    }

    /// Number of rows containing at least one hole.
    #[must_use]
    pub fn hole_line(&self) -> u32 {
        self.hole_line
    }

    /// Sum over vertical runs of holes of `1 + 2 + ... + run_length`.
    #[must_use]
    pub fn hole_depth(&self) -> u32 {
        self.hole_depth
    }

    /// Sum over vertical runs of well cells of `1 + 2 + ... + run_length`.
    #[must_use]
    pub fn well_depth(&self) -> u32 {
        self.well_depth
    }

    /// Rows whose widest uncovered run is 1..=6 columns, bucketed by run width.
    #[must_use]
    pub fn wide_wells(&self) -> &[u32; WIDE_WELL_BUCKETS] {
        &self.wide_wells
    }

    /// Up to [`MAX_HOLE_LAYERS`] hole rows, topmost first.
    #[must_use]
    pub fn layers(&self) -> &[HoleLayer] {
        &self.layers
    }

    /// Clear width of the `index`-th hole layer, or 0 if there are fewer layers.
    #[must_use]
    pub fn clear_width(&self, board: &Board, index: usize) -> u32 {
        self.layers
            .get(index)
            .map_or(0, |layer| layer.clear_width(board))
    }
}

fn is_well_cell(covered: u32, x: usize, width: usize) -> bool {
    if x == 0 {
        covered & 3 == 2
    } else if x == width - 1 {
        (covered >> (width - 2)) & 3 == 1
    } else {
        (covered >> (x - 1)) & 7 == 5
    }
}

/// Every shared feature of a board, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardFeatures {
    pub column_transitions: u32,
    pub row_transitions_floor: u32,
    pub row_transitions_walled: u32,
    pub hole_count: u32,
    pub hole_line: u32,
    pub hole_depth: u32,
    pub well_depth: u32,
    pub wide_wells: [u32; WIDE_WELL_BUCKETS],
    pub clear_widths: [u32; MAX_HOLE_LAYERS],
}

impl BoardFeatures {
    #[must_use]
    pub fn extract(board: &Board) -> Self {
        let scan = HoleScan::new(board);
        Self {
            column_transitions: column_transitions(board),
            row_transitions_floor: row_transitions(board, RowTransitionStyle::ImplicitFloor),
            row_transitions_walled: row_transitions(board, RowTransitionStyle::Walled),
            hole_count: scan.hole_count(),
            hole_line: scan.hole_line(),
            hole_depth: scan.hole_depth(),
            well_depth: scan.well_depth(),
            wide_wells: *scan.wide_wells(),
            clear_widths: std::array::from_fn(|i| scan.clear_width(board, i)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn six_by_four() -> Board {
        Board::from_ascii(
            6,
            4,
            r"
            .#..#.
            ##.###
            #.####
            ",
        )
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new(10, 22);
        let scan = HoleScan::new(&board);
        assert_eq!(scan.hole_count(), 0);
        assert_eq!(scan.hole_line(), 0);
        assert_eq!(scan.hole_depth(), 0);
        assert_eq!(scan.well_depth(), 0);
        assert_eq!(scan.wide_wells(), &[0; WIDE_WELL_BUCKETS]);
        assert!(scan.layers().is_empty());
        assert_eq!(scan.clear_width(&board, 0), 0);

        assert_eq!(column_transitions(&board), 44);
        assert_eq!(
            row_transitions(&board, RowTransitionStyle::ImplicitFloor),
            10
        );
        assert_eq!(row_transitions(&board, RowTransitionStyle::Walled), 20);
    }

    #[test]
    fn test_column_transitions() {
        // above roof: 2; y0: 2 pairs; y1: 2 pairs; y2: 2 empty edges + 4 pairs
        assert_eq!(column_transitions(&six_by_four()), 12);
    }

    #[test]
    fn test_row_transitions() {
        let board = six_by_four();
        assert_eq!(
            row_transitions(&board, RowTransitionStyle::ImplicitFloor),
            8
        );
        assert_eq!(row_transitions(&board, RowTransitionStyle::Walled), 14);
    }

    #[test]
    fn test_row_transitions_at_ceiling() {
        let board = Board::from_ascii(
            4,
            4,
            r"
            #...
            ##.#
            ###.
            ####
            ",
        );
        assert_eq!(board.roof(), board.height());
        // 0 (floor) + 0 (masked top) + 1 + 2 + 2
        assert_eq!(
            row_transitions(&board, RowTransitionStyle::ImplicitFloor),
            5
        );
        // 0 (no flat charge) + 5 (between) + 0 (floor) + 3 (ceiling)
        assert_eq!(row_transitions(&board, RowTransitionStyle::Walled), 8);
    }

    #[test]
    fn test_holes_and_wells() {
        let board = six_by_four();
        let scan = HoleScan::new(&board);
        assert_eq!(scan.hole_count(), 1);
        assert_eq!(scan.hole_line(), 1);
        assert_eq!(scan.hole_depth(), 1);
        // both edges on the top row, column 2 on the middle row
        assert_eq!(scan.well_depth(), 3);
        assert_eq!(scan.wide_wells(), &[1, 1, 0, 0, 0, 0]);
        assert_eq!(scan.layers(), &[HoleLayer { posy: 1, bits: 0b10 }]);
        assert_eq!(scan.clear_width(&board, 0), 2 + 3);
    }

    #[test]
    fn test_hole_layers_and_depth() {
        let board = Board::from_ascii(
            4,
            6,
            r"
            ####
            #.##
            #.#.
            ##.#
            ",
        );
        let scan = HoleScan::new(&board);
        assert_eq!(scan.hole_count(), 4);
        assert_eq!(scan.hole_line(), 3);
        // column 1: runs of 2 (1 + 2), column 3: 1, column 2: 1
        assert_eq!(scan.hole_depth(), 5);
        assert_eq!(
            scan.layers(),
            &[
                HoleLayer {
                    posy: 3,
                    bits: 0b0010
                },
                HoleLayer {
                    posy: 2,
                    bits: 0b1010
                },
                HoleLayer {
                    posy: 1,
                    bits: 0b0100
                },
            ]
        );
        assert_eq!(scan.clear_width(&board, 0), 4);
        assert_eq!(scan.clear_width(&board, 1), 3 + 8);
        assert_eq!(scan.clear_width(&board, 2), 2 + 3 + 4);
        assert_eq!(scan.clear_width(&board, 3), 0);
    }

    #[test]
    fn test_hole_layers_are_capped() {
        let mut art = String::from("####\n");
        for _ in 0..9 {
            art.push_str("###.\n");
        }
        let board = Board::from_ascii(4, 12, &art);
        let scan = HoleScan::new(&board);
        assert_eq!(scan.hole_line(), 9);
        assert_eq!(scan.hole_count(), 9);
        assert_eq!(scan.hole_depth(), (1..=9).sum::<u32>());
        assert_eq!(scan.layers().len(), MAX_HOLE_LAYERS);
        assert_eq!(scan.layers()[0].posy, 9);
        assert_eq!(scan.layers()[7].posy, 2);
    }

    #[test]
    fn test_clear_width_stops_at_gap() {
        let board = Board::from_ascii(
            3,
            6,
            r"
            .#.
            ...
            .#.
            .#.
            #.#
            ",
        );
        let layer = HoleLayer { posy: 1, bits: 0b010 };
        // rows 1 and 2 stack on the hole; row 3 is empty, row 4 is never reached
        assert_eq!(layer.clear_width(&board), 2 + 3);
    }

    #[test]
    fn test_wide_well_histogram() {
        let board = Board::from_ascii(
            10,
            22,
            r"
            #.........
            ###...####
            ",
        );
        let scan = HoleScan::new(&board);
        // top row leaves 9 uncovered columns (ignored), bottom row leaves 3
        assert_eq!(scan.wide_wells(), &[0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..50 {
            let mut board = Board::new(10, 22);
            let rows = rng.random_range(0..22);
            for y in 0..rows {
                board.set_row(y, rng.random::<u32>());
            }
            let first = BoardFeatures::extract(&board);
            let second = BoardFeatures::extract(&board.clone());
            assert_eq!(first, second);
            assert_eq!(first.clear_widths[0], {
                let scan = HoleScan::new(&board);
                scan.layers().first().map_or(0, |l| l.clear_width(&board))
            });
        }
    }
}
