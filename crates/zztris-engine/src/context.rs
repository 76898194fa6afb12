//! Game geometry shared by every strategy.

use crate::core::{Board, MAX_HEIGHT, MAX_WIDTH, PieceKind, PieceRotation, Placement, full_row_mask};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ContextError {
    #[display("board width {width} is outside 4..={MAX_WIDTH}")]
    Width { width: usize },
    #[display("board height {height} is outside 4..={MAX_HEIGHT}")]
    Height { height: usize },
}

/// Board dimensions and spawn rules.
///
/// Pieces spawn in rotation 0 with the bounding box against the ceiling and
/// horizontally centered, rounding to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameContext {
    width: usize,
    height: usize,
    full: u32,
}

impl GameContext {
    pub const STANDARD_WIDTH: usize = 10;
    pub const STANDARD_HEIGHT: usize = 22;

    pub fn new(width: usize, height: usize) -> Result<Self, ContextError> {
        if !(4..=MAX_WIDTH).contains(&width) {
            return Err(ContextError::Width { width });
        }
        if !(4..=MAX_HEIGHT).contains(&height) {
            return Err(ContextError::Height { height });
        }
        Ok(Self {
            width,
            height,
            full: full_row_mask(width),
        })
    }

    /// The 10-wide, 22-tall field (20 visible rows plus 2 spawn rows).
    #[must_use]
    pub fn standard() -> Self {
        Self {
            width: Self::STANDARD_WIDTH,
            height: Self::STANDARD_HEIGHT,
            full: full_row_mask(Self::STANDARD_WIDTH),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Mask of a completely filled row.
    #[must_use]
    pub fn full(&self) -> u32 {
        self.full
    }

    /// Number of piece kinds.
    #[must_use]
    pub fn type_max(&self) -> usize {
        PieceKind::LEN
    }

    /// Spawn placement of `kind`.
    #[must_use]
    pub fn generate(&self, kind: PieceKind) -> Placement {
        let rotation = PieceRotation::default();
        let shape = kind.shape(rotation);
        Placement::new(
            kind,
            rotation,
            (self.width - shape.width()) / 2,
            self.height - shape.height(),
        )
    }

    #[must_use]
    pub fn empty_board(&self) -> Board {
        Board::new(self.width, self.height)
    }
}
