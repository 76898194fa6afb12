//! Imminent-death detection near the spawn area.
//!
//! For every piece kind the table stores the top four rows of an empty board
//! with the spawned piece attached. Each stored row is OR-accumulated with the
//! rows below it, so a board cell under any part of the spawn footprint within
//! those four rows marks the kind as endangered.

use zztris_engine::{Board, GameContext, PieceKind};

/// Rows the table inspects, counted down from the ceiling.
pub const DANGER_ROWS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DangerTable {
    masks: [[u32; DANGER_ROWS]; PieceKind::LEN],
    ceiling_row: Option<usize>,
}

impl DangerTable {
    /// Builds the table from the spawn positions.
    #[must_use]
    pub fn new(context: &GameContext) -> Self {
        Self::build(context, false)
    }

    /// Builds the table from the spawn positions moved one row down.
    #[must_use]
    pub fn lowered(context: &GameContext) -> Self {
        Self::build(context, true)
    }

    /// Additionally counts one danger whenever row `y` is occupied.
    ///
    /// Ignored when `y` is at or above the board height.
    #[must_use]
    pub fn with_ceiling_row(mut self, y: usize) -> Self {
        self.ceiling_row = Some(y);
        self
    }

    fn build(context: &GameContext, lowered: bool) -> Self {
        let base = context.height() - DANGER_ROWS;
        let mut masks = [[0; DANGER_ROWS]; PieceKind::LEN];
        for kind in PieceKind::ALL {
            let spawn = context.generate(kind);
            let placement = if lowered {
                spawn.down().unwrap_or(spawn)
            } else {
                spawn
            };
            let mut board = context.empty_board();
            board.fill_placement(&placement);
            let data = &mut masks[kind.id()];
            for (i, mask) in data.iter_mut().enumerate() {
                *mask = board.row(base + i);
            }
            for y in 0..DANGER_ROWS - 1 {
                data[y + 1] |= data[y];
            }
        }
        Self {
            masks,
            ceiling_row: None,
        }
    }

    /// The accumulated masks for `kind`, lowest row first.
    #[must_use]
    pub fn masks(&self, kind: PieceKind) -> &[u32; DANGER_ROWS] {
        &self.masks[kind.id()]
    }

    /// Checks if the spawn area of `kind` is obstructed.
    #[must_use]
    pub fn is_endangered(&self, board: &Board, kind: PieceKind) -> bool {
        let base = board.height() - DANGER_ROWS;
        self.masks(kind)
            .iter()
            .enumerate()
            .any(|(i, mask)| mask & board.row(base + i) != 0)
    }

    /// Number of piece kinds in danger, plus one for an occupied ceiling row.
    #[must_use]
    pub fn count(&self, board: &Board) -> u32 {
        let mut danger = 0;
        for kind in PieceKind::ALL {
            if self.is_endangered(board, kind) {
                danger += 1;
            }
        }
        if let Some(y) = self.ceiling_row
            && board.row(y) != 0
        {
            danger += 1;
        }
        danger
    }
}
