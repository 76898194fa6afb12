use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    piece::{PieceKind, PieceRotation, PieceShape},
};

/// T-spin classification of a landed piece.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
)]
pub enum SpinKind {
    #[default]
    None,
    Mini,
    Full,
}

/// Movement history flags recorded by the move generator.
///
/// The evaluator only reads these; deciding them requires kick resolution,
/// which lives with the search driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinFlags {
    /// The final movement before locking was a rotation.
    pub last_rotate: bool,
    /// The piece passed the spin corner check.
    pub check: bool,
    /// A full T-spin is possible from this position.
    pub ready: bool,
    /// A mini T-spin is possible from this position.
    pub mini_ready: bool,
}

/// A piece at a fixed position, with its footprint trimmed to its bounding box.
///
/// `col`/`row` are the bottom-left corner of the bounding box in board
/// coordinates. The placement's highest row is `row + height - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    kind: PieceKind,
    rotation: PieceRotation,
    col: u8,
    row: u8,
    shape: PieceShape,
    flags: SpinFlags,
    spin: SpinKind,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.as_u8(),
            self.col,
            self.row
        )
    }
}

impl Placement {
    /// Creates a placement of `kind` in `rotation` with the bounding box at (`col`, `row`).
    ///
    /// # Panics
    ///
    /// Panics if `col` or `row` does not fit in a `u8`.
    #[must_use]
    pub fn new(kind: PieceKind, rotation: PieceRotation, col: usize, row: usize) -> Self {
        Self {
            kind,
            rotation,
            col: u8::try_from(col).unwrap(),
            row: u8::try_from(row).unwrap(),
            shape: kind.shape(rotation),
            flags: SpinFlags::default(),
            spin: SpinKind::None,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: SpinFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn col(&self) -> usize {
        usize::from(self.col)
    }

    #[must_use]
    pub fn row(&self) -> usize {
        usize::from(self.row)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.shape.height()
    }

    /// One past the highest occupied row, i.e. the landing height.
    #[must_use]
    pub fn top(&self) -> usize {
        self.row() + self.height()
    }

    #[must_use]
    pub fn flags(&self) -> SpinFlags {
        self.flags
    }

    #[must_use]
    pub fn spin(&self) -> SpinKind {
        self.spin
    }

    pub fn set_spin(&mut self, spin: SpinKind) {
        self.spin = spin;
    }

    /// Cell mask of bounding-box row `dy`, shifted into board columns.
    #[must_use]
    pub fn row_mask(&self, dy: usize) -> u32 {
        self.shape.row(dy) << self.col
    }

    /// Occupied rows as `(board_y, mask)` pairs from the bottom up.
    pub fn cells(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        (0..self.height()).map(|dy| (self.row() + dy, self.row_mask(dy)))
    }

    /// Checks if the placement leaves the board or overlaps occupied cells.
    #[must_use]
    pub fn is_colliding(&self, board: &Board) -> bool {
        if self.col() + self.width() > board.width() || self.top() > board.height() {
            return true;
        }
        self.cells().any(|(y, mask)| board.row(y) & mask != 0)
    }

    /// Returns the placement one row lower, or `None` at the floor.
    #[must_use]
    pub fn down(&self) -> Option<Self> {
        let row = self.row.checked_sub(1)?;
        Some(Self { row, ..*self })
    }

    /// Drops the placement straight down until it rests on the stack or the floor.
    #[must_use]
    pub fn dropped(&self, board: &Board) -> Self {
        let mut current = *self;
        while let Some(next) = current.down() {
            if next.is_colliding(board) {
                break;
            }
            current = next;
        }
        current
    }

    /// Checks if the placement can be reached by falling straight down from the ceiling.
    ///
    /// Every column of the piece must have its lowest cell at or above the
    /// column's stack height.
    #[must_use]
    pub fn open(&self, board: &Board) -> bool {
        (0..self.width()).all(|dx| {
            let bottom = (0..self.height())
                .find(|dy| (self.shape.row(*dy) >> dx) & 1 != 0)
                .unwrap_or(0);
            board.top(self.col() + dx) <= self.row() + bottom
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t_spawn(col: usize, row: usize) -> Placement {
        Placement::new(PieceKind::T, PieceRotation::default(), col, row)
    }

    #[test]
    fn test_cells_and_top() {
        let t = t_spawn(3, 2);
        let cells: Vec<_> = t.cells().collect();
        assert_eq!(cells, vec![(2, 0b111 << 3), (3, 0b010 << 3)]);
        assert_eq!(t.top(), 4);
        assert_eq!(t.to_string(), "T#0@3,2");
    }

    #[test]
    fn test_is_colliding() {
        let board = Board::from_ascii(
            4,
            4,
            r"
            .#..
            ####
            ",
        );
        assert!(t_spawn(0, 1).is_colliding(&board));
        assert!(!t_spawn(0, 2).is_colliding(&board));
        assert!(t_spawn(2, 2).is_colliding(&board), "out of the right wall");
        assert!(t_spawn(0, 3).is_colliding(&board), "above the ceiling");
    }

    #[test]
    fn test_dropped() {
        let board = Board::from_ascii(
            6,
            8,
            r"
            ..#...
            ######
            ",
        );
        let dropped = t_spawn(1, 6).dropped(&board);
        assert_eq!(dropped.row(), 2);
        let dropped = t_spawn(3, 6).dropped(&board);
        assert_eq!(dropped.row(), 1);
        assert_eq!(t_spawn(0, 0).down(), None);
    }

    #[test]
    fn test_open() {
        let board = Board::from_ascii(
            5,
            8,
            r"
            ##...
            #....
            #..##
            ",
        );
        // resting on the floor under the overhang at column 1
        let under = Placement::new(PieceKind::O, PieceRotation::default(), 1, 0);
        assert!(!under.is_colliding(&board));
        assert!(!under.open(&board));

        let free = Placement::new(PieceKind::O, PieceRotation::default(), 2, 1);
        assert!(!free.is_colliding(&board));
        assert!(free.open(&board));

        // T pointing down: the stem reaches below the arms
        let t = Placement::new(PieceKind::T, PieceRotation::new(2).unwrap(), 2, 0);
        assert!(!t.is_colliding(&Board::new(5, 8)));
        assert!(t.open(&Board::new(5, 8)));
    }

    #[test]
    fn test_spin_state() {
        let flags = SpinFlags {
            last_rotate: true,
            check: true,
            ready: true,
            mini_ready: false,
        };
        let mut t = t_spawn(0, 0).with_flags(flags);
        assert_eq!(t.flags(), flags);
        assert!(t.spin().is_none());
        t.set_spin(SpinKind::Full);
        assert!(t.spin().is_full());
    }
}
