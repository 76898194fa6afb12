//! Board, piece and placement types consumed by the `zztris` evaluation core.
//!
//! The engine crate owns everything the evaluator needs to read but never
//! computes itself:
//!
//! - [`Board`] - immutable per-call snapshot (row bit masks, column tops, roof, cell count)
//! - [`Placement`] - a landed piece with its footprint and rotation/spin flags
//! - [`GameContext`] - board dimensions, the full-row mask and spawn generation
//!
//! # Coordinate System
//!
//! Row 0 is the bottom row and rows grow upward. Inside a row, bit `x` is column
//! `x`, so bit 0 is the leftmost column. A board is at most [`MAX_WIDTH`] columns
//! wide so that a row always fits in a `u32`.
//!
//! # Example
//!
//! ```
//! use zztris_engine::{GameContext, PieceKind, PieceRotation, Placement};
//!
//! let context = GameContext::standard();
//! let mut board = context.empty_board();
//! let placement = Placement::new(PieceKind::I, PieceRotation::default(), 0, 10).dropped(&board);
//! board.fill_placement(&placement);
//! assert_eq!(board.roof(), 1);
//! assert_eq!(board.count(), 4);
//! ```

pub use self::{context::*, core::*};

pub mod context;
pub mod core;
