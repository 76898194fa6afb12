use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};
use zztris_engine::{Board, GameContext, PieceKind, PieceRotation, Placement, SpinFlags};

/// A board and the placements to score on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Board before the first placement
    pub board: Board,
    /// Piece in the hold slot, if any
    #[serde(default)]
    pub hold: Option<PieceKind>,
    /// Incoming garbage lines not yet received
    #[serde(default)]
    pub under_attack: i32,
    /// Placements in play order
    pub placements: Vec<PlacementSpec>,
}

/// A placement as written in a scenario file.
///
/// Without `row` the piece is hard-dropped from its spawn height in `col`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacementSpec {
    pub kind: PieceKind,
    #[serde(default)]
    pub rotation: u8,
    pub col: usize,
    #[serde(default)]
    pub row: Option<usize>,
    #[serde(default)]
    pub flags: SpinFlags,
}

impl Scenario {
    pub fn context(&self) -> anyhow::Result<GameContext> {
        GameContext::new(self.board.width(), self.board.height())
            .context("Scenario board has unsupported dimensions")
    }
}

impl PlacementSpec {
    /// Resolves the placement on `board`, rejecting overlapping positions.
    pub fn resolve(&self, board: &Board) -> anyhow::Result<Placement> {
        let rotation = PieceRotation::new(self.rotation)
            .with_context(|| format!("Invalid rotation {} for {:?}", self.rotation, self.kind))?;
        let shape = self.kind.shape(rotation);
        ensure!(
            self.col + shape.width() <= board.width(),
            "{:?} does not fit at column {} of a {}-wide board",
            self.kind,
            self.col,
            board.width()
        );
        let spawn_row = board.height().checked_sub(shape.height()).with_context(|| {
            format!("{:?} does not fit in a board of height {}", self.kind, board.height())
        })?;
        let placement = match self.row {
            Some(row) => {
                ensure!(row <= spawn_row, "{:?} at row {row} is above the ceiling", self.kind);
                Placement::new(self.kind, rotation, self.col, row)
            }
            None => Placement::new(self.kind, rotation, self.col, spawn_row).dropped(board),
        };
        ensure!(
            !placement.is_colliding(board),
            "Placement {placement} collides with the board"
        );
        Ok(placement.with_flags(self.flags))
    }
}
