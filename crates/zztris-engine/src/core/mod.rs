pub use self::{board::*, piece::*, placement::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod placement;

/// Widest supported board. Rows are stored as `u32` bit masks.
pub const MAX_WIDTH: usize = 32;

/// Tallest supported board.
pub const MAX_HEIGHT: usize = 40;
