//! Board evaluation for a Tetris search agent.
//!
//! Given a candidate placement and the board it produces, a strategy returns a
//! scalar desirability score. Along a search path the per-placement results are
//! folded into a running status, and at branch points sibling statuses can be
//! merged into one.
//!
//! # Architecture
//!
//! ```text
//! search driver (external)
//!     ↓ eval / get / iterate
//! strategies: Baseline, Attack, Dig, Guideline, Combo
//!     ↓ share
//! feature extractor + danger table
//! ```
//!
//! - [`feature`] - bit-level board features (transitions, holes, wells, clear widths)
//! - [`danger`] - per-piece "spawn is about to collide" masks
//! - [`strategy`] - the [`Strategy`](strategy::Strategy) protocol and the five strategies
//! - [`config`] - tuning parameters shared by the configurable strategies
//!
//! Strategies are immutable after construction and can be shared between search
//! threads. Evaluation never allocates.
//!
//! # Example
//!
//! ```
//! use zztris_engine::{GameContext, PieceKind, PieceRotation, Placement};
//! use zztris_evaluator::strategy::{Baseline, PathStatus, Strategy};
//!
//! let context = GameContext::standard();
//! let strategy = Baseline::new(&context);
//!
//! let prior = context.empty_board();
//! let mut placement = Placement::new(PieceKind::I, PieceRotation::default(), 0, 0);
//! let mut board = prior.clone();
//! board.fill_placement(&placement);
//! let cleared = board.clear_lines();
//!
//! let result = strategy.eval(&mut placement, &board, &prior, cleared);
//! let status = strategy.get(&result, 1, None, &Default::default());
//! assert!(status.value().is_finite());
//! ```

pub mod config;
pub mod danger;
pub mod feature;
pub mod strategy;
