use std::fmt;

use serde::{Deserialize, Serialize};

use super::{MAX_HEIGHT, MAX_WIDTH, placement::Placement};

/// Returns the mask with the low `width` bits set.
#[must_use]
pub const fn full_row_mask(width: usize) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("board row {y} has {actual} cells, expected {expected}")]
    RowWidth {
        y: usize,
        actual: usize,
        expected: usize,
    },
    #[display("board has {rows} rows but is only {height} tall")]
    TooManyRows { rows: usize, height: usize },
    #[display("invalid cell {cell:?} in board row {y} (expected '#' or '.')")]
    InvalidCell { y: usize, cell: char },
    #[display("board dimensions {width}x{height} exceed {MAX_WIDTH}x{MAX_HEIGHT}")]
    Dimensions { width: usize, height: usize },
}

/// Immutable snapshot of the stack, one `u32` bit mask per row.
///
/// Row 0 is the bottom row; bit `x` of a row is column `x`. Besides the rows the
/// snapshot carries values derived from them, kept in sync by every mutation:
///
/// - `roof`: one past the highest occupied row (the smallest `y` such that all rows
///   at or above `y` are empty)
/// - `top[x]`: height of column `x` (one past its highest occupied cell)
/// - `count`: total number of occupied cells
///
/// Rows at or above `height` read as empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BoardRepr", try_from = "BoardRepr")]
pub struct Board {
    width: u8,
    height: u8,
    roof: u8,
    count: u16,
    rows: [u32; MAX_HEIGHT],
    top: [u8; MAX_WIDTH],
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("roof", &self.roof)
            .field("count", &self.count)
            .field("rows", &self.rows())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.roof()).rev() {
            writeln!(f, "{}", self.row_ascii(y))?;
        }
        Ok(())
    }
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are zero or exceed [`MAX_WIDTH`]×[`MAX_HEIGHT`].
    /// Use [`GameContext::new`](crate::GameContext::new) to validate dimensions.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!((1..=MAX_WIDTH).contains(&width));
        assert!((1..=MAX_HEIGHT).contains(&height));
        #[expect(clippy::cast_possible_truncation)]
        Self {
            width: width as u8,
            height: height as u8,
            roof: 0,
            count: 0,
            rows: [0; MAX_HEIGHT],
            top: [0; MAX_WIDTH],
        }
    }

    /// Builds a board from ascii rows listed top to bottom.
    ///
    /// The last row is row 0. Rows above the listed ones are empty. `#` is an
    /// occupied cell and `.` an empty one; whitespace is ignored.
    pub fn from_rows<S>(width: usize, height: usize, rows: &[S]) -> Result<Self, BoardError>
    where
        S: AsRef<str>,
    {
        if !(1..=MAX_WIDTH).contains(&width) || !(1..=MAX_HEIGHT).contains(&height) {
            return Err(BoardError::Dimensions { width, height });
        }
        if rows.len() > height {
            return Err(BoardError::TooManyRows {
                rows: rows.len(),
                height,
            });
        }
        let mut board = Self::new(width, height);
        for (i, line) in rows.iter().enumerate() {
            let y = rows.len() - 1 - i;
            let mut bits = 0;
            let mut x = 0;
            for ch in line.as_ref().chars().filter(|c| !c.is_whitespace()) {
                match ch {
                    '#' => bits |= 1 << x.min(31),
                    '.' => {}
                    cell => return Err(BoardError::InvalidCell { y, cell }),
                }
                x += 1;
            }
            if x != width {
                return Err(BoardError::RowWidth {
                    y,
                    actual: x,
                    expected: width,
                });
            }
            board.rows[y] = bits;
        }
        board.refresh();
        Ok(board)
    }

    /// Creates a board from ASCII art for tests and fixtures.
    ///
    /// Blank lines are skipped; see [`Board::from_rows`] for the format.
    ///
    /// # Panics
    ///
    /// Panics if the art does not describe a `width`×`height` board.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        match Self::from_rows(width, height, &lines) {
            Ok(board) => board,
            Err(e) => panic!("invalid board art: {e}"),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.height)
    }

    #[must_use]
    pub fn roof(&self) -> usize {
        usize::from(self.roof)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        usize::from(self.count)
    }

    /// Mask of a completely filled row.
    #[must_use]
    pub fn full_mask(&self) -> u32 {
        full_row_mask(self.width())
    }

    /// Returns row `y`, or the empty row at or above the board height.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> u32 {
        if y < self.height() { self.rows[y] } else { 0 }
    }

    /// Returns all rows from the bottom up.
    #[must_use]
    pub fn rows(&self) -> &[u32] {
        &self.rows[..self.height()]
    }

    /// Height of column `x`.
    #[inline]
    #[must_use]
    pub fn top(&self, x: usize) -> usize {
        usize::from(self.top[x])
    }

    /// Heights of all columns from left to right.
    #[must_use]
    pub fn tops(&self) -> &[u8] {
        &self.top[..self.width()]
    }

    /// Checks if the cell at column `x`, row `y` is occupied.
    ///
    /// Cells outside the board are empty.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width() && (self.row(y) >> x) & 1 != 0
    }

    /// Replaces row `y`, masking bits beyond the board width.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the board.
    pub fn set_row(&mut self, y: usize, bits: u32) {
        assert!(y < self.height());
        self.rows[y] = bits & self.full_mask();
        self.refresh();
    }

    /// Locks a placement onto the board by setting its occupied cells.
    ///
    /// Cells outside the board are dropped.
    pub fn fill_placement(&mut self, placement: &Placement) {
        let full = self.full_mask();
        for (y, mask) in placement.cells() {
            if y < self.height() {
                self.rows[y] |= mask & full;
            }
        }
        self.refresh();
    }

    /// Clears filled lines and returns the number of lines cleared.
    pub fn clear_lines(&mut self) -> usize {
        let full = self.full_mask();
        let height = self.height();
        let mut count = 0;
        for y in 0..height {
            if self.rows[y] == full {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y - count] = self.rows[y];
            }
        }
        self.rows[height - count..height].fill(0);
        if count > 0 {
            self.refresh();
        }
        count
    }

    /// Renders row `y` as `#`/`.` characters, column 0 first.
    #[must_use]
    pub fn row_ascii(&self, y: usize) -> String {
        (0..self.width())
            .map(|x| if self.is_occupied(x, y) { '#' } else { '.' })
            .collect()
    }

    #[expect(clippy::cast_possible_truncation)]
    fn refresh(&mut self) {
        let height = self.height();
        let width = self.width();
        let mut roof = 0;
        let mut count = 0;
        self.top = [0; MAX_WIDTH];
        for (y, row) in self.rows[..height].iter().enumerate() {
            if *row == 0 {
                continue;
            }
            roof = y + 1;
            count += row.count_ones();
            for (x, top) in self.top[..width].iter_mut().enumerate() {
                if (row >> x) & 1 != 0 {
                    *top = (y + 1) as u8;
                }
            }
        }
        self.roof = roof as u8;
        self.count = count as u16;
    }
}

/// Serialized form of a [`Board`]: dimensions plus ascii rows, top row first.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardRepr {
    width: usize,
    height: usize,
    rows: Vec<String>,
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        Self {
            width: board.width(),
            height: board.height(),
            rows: (0..board.roof()).rev().map(|y| board.row_ascii(y)).collect(),
        }
    }
}

impl TryFrom<BoardRepr> for Board {
    type Error = BoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        Board::from_rows(repr.width, repr.height, &repr.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PieceKind, PieceRotation};

    #[test]
    fn test_empty_board() {
        let board = Board::new(10, 22);
        assert_eq!(board.roof(), 0);
        assert_eq!(board.count(), 0);
        assert!(board.tops().iter().all(|t| *t == 0));
        assert_eq!(board.full_mask(), 0x3ff);
        assert_eq!(board.row(21), 0);
        assert_eq!(board.row(40), 0);
    }

    #[test]
    fn test_from_ascii_derived_values() {
        let board = Board::from_ascii(
            6,
            4,
            r"
            ......
            ..#...
            #.#..#
            ######
            ",
        );
        assert_eq!(board.row(0), 0b11_1111);
        assert_eq!(board.row(1), 0b10_0101);
        assert_eq!(board.row(2), 0b00_0100);
        assert_eq!(board.row(3), 0);
        assert_eq!(board.roof(), 3);
        assert_eq!(board.count(), 10);
        assert_eq!(board.tops(), &[2, 1, 3, 1, 1, 2]);
        assert!(board.is_occupied(2, 2));
        assert!(!board.is_occupied(1, 1));
        assert!(!board.is_occupied(6, 0));
    }

    #[test]
    fn test_from_rows_errors() {
        assert!(matches!(
            Board::from_rows(4, 4, &["###"]),
            Err(BoardError::RowWidth { y: 0, actual: 3, .. })
        ));
        assert!(matches!(
            Board::from_rows(4, 1, &["....", "...."]),
            Err(BoardError::TooManyRows { rows: 2, height: 1 })
        ));
        assert!(matches!(
            Board::from_rows(4, 4, &["#x.."]),
            Err(BoardError::InvalidCell { cell: 'x', .. })
        ));
        assert!(matches!(
            Board::from_rows::<&str>(33, 4, &[]),
            Err(BoardError::Dimensions { .. })
        ));
    }

    #[test]
    fn test_full_row_mask() {
        assert_eq!(full_row_mask(1), 1);
        assert_eq!(full_row_mask(10), 0x3ff);
        assert_eq!(full_row_mask(32), u32::MAX);
    }

    #[test]
    fn test_clear_lines() {
        let mut board = Board::from_ascii(
            4,
            6,
            r"
            .#..
            ####
            #.#.
            ####
            ####
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared, 3);
        assert_eq!(board.row(0), 0b0101);
        assert_eq!(board.row(1), 0b0010);
        assert_eq!(board.row(2), 0);
        assert_eq!(board.roof(), 2);
        assert_eq!(board.count(), 3);
        assert_eq!(board.clear_lines(), 0);
    }

    #[test]
    fn test_clear_lines_full_board() {
        let mut board = Board::new(4, 4);
        for y in 0..4 {
            board.set_row(y, 0b1111);
        }
        assert_eq!(board.roof(), 4);
        assert_eq!(board.clear_lines(), 4);
        assert_eq!(board.roof(), 0);
        assert_eq!(board.count(), 0);
    }

    #[test]
    fn test_set_row_masks_width() {
        let mut board = Board::new(4, 4);
        board.set_row(1, u32::MAX);
        assert_eq!(board.row(1), 0b1111);
        assert_eq!(board.tops(), &[2, 2, 2, 2]);
    }

    #[test]
    fn test_fill_placement() {
        let mut board = Board::new(10, 22);
        let t = Placement::new(PieceKind::T, PieceRotation::default(), 3, 0);
        board.fill_placement(&t);
        assert_eq!(board.row(0), 0b111 << 3);
        assert_eq!(board.row(1), 0b010 << 3);
        assert_eq!(board.tops()[3..6], [1, 2, 1]);
        assert_eq!(board.count(), 4);
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_ascii(
            4,
            8,
            r"
            .#..
            ##.#
            ",
        );
        let serialized = serde_json::to_string(&board).unwrap();
        assert_eq!(
            serialized,
            r###"{"width":4,"height":8,"rows":[".#..","##.#"]}"###
        );
        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);

        let narrow = r###"{"width":4,"height":8,"rows":["##"]}"###;
        assert!(serde_json::from_str::<Board>(narrow).is_err());
    }

    #[test]
    fn test_display() {
        let board = Board::from_ascii(
            3,
            5,
            r"
            #..
            ###
            ",
        );
        assert_eq!(board.to_string(), "#..\n###\n");
    }
}
