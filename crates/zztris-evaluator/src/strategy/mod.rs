//! The evaluation protocol and the strategies implementing it.
//!
//! A search driver uses a strategy in three steps:
//!
//! 1. [`Strategy::eval`] scores one candidate placement on the board it produced.
//! 2. [`Strategy::get`] folds that result into the running [`Strategy::Status`] of
//!    the path leading to the placement. `depth` is the 1-based position of the
//!    placement on the path.
//! 3. At branch points, [`BranchMerge::iterate`] merges the statuses of sibling
//!    branches. Only strategies whose statuses are meaningful to average support it.
//!
//! Statuses are ranked by [`PathStatus::value`]; higher is better.
//!
//! | Strategy | Focus | `iterate` |
//! |----------|-------|-----------|
//! | [`Baseline`] | height, centering, line clears | yes |
//! | [`Attack`] | sending lines, receiving garbage safely | no |
//! | [`Dig`] | clearing buried holes | no |
//! | [`Guideline`] | T-spins, back-to-back, combos | no |
//! | [`Combo`] | building and running combos | yes |

use std::fmt;

use serde::Serialize;
use zztris_engine::{Board, PieceKind, Placement};

pub use self::{
    attack::{Attack, AttackResult, AttackStatus},
    baseline::{Baseline, BaselineResult, BaselineStatus},
    combo::{Combo, ComboResult, ComboStatus},
    dig::{Dig, DigResult, DigStatus},
    guideline::{Guideline, GuidelineResult, GuidelineStatus},
};

mod attack;
mod baseline;
mod combo;
mod dig;
mod guideline;

/// Value an absent branch contributes to [`BranchMerge::iterate`].
pub const MISSING_BRANCH_VALUE: f64 = -9_999_999_999.0;

/// A running path accumulator that can be ranked.
pub trait PathStatus {
    fn value(&self) -> f64;
}

/// A board-evaluation strategy.
///
/// Strategies are immutable after construction; every method takes `&self`
/// and can be called concurrently.
pub trait Strategy: fmt::Debug + Send + Sync {
    /// Per-placement output of [`Strategy::eval`].
    type Result: fmt::Debug + Clone + Serialize;
    /// Running accumulator along a search path. `Default` is the root status.
    type Status: fmt::Debug + Copy + Default + Serialize + PathStatus;

    fn name(&self) -> &'static str;

    /// Scores `placement` given the board after it locked and `cleared` lines
    /// were removed. `prior` is the board before the placement.
    ///
    /// Strategies that classify spins record the result on `placement`.
    fn eval(
        &self,
        placement: &mut Placement,
        board: &Board,
        prior: &Board,
        cleared: usize,
    ) -> Self::Result;

    /// Folds `result` into the status of the path leading to it.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is 0.
    fn get(
        &self,
        result: &Self::Result,
        depth: usize,
        hold: Option<PieceKind>,
        status: &Self::Status,
    ) -> Self::Status;
}

/// Merging of sibling branch statuses.
pub trait BranchMerge: Strategy {
    /// Averages the branch values; a `None` branch counts as
    /// [`MISSING_BRANCH_VALUE`].
    ///
    /// # Panics
    ///
    /// Panics if `branches` is empty.
    fn iterate(&self, branches: &[Option<&Self::Status>]) -> Self::Status;
}

/// Mean of branch values with missing branches penalized.
pub(crate) fn average_branches<S>(branches: &[Option<&S>]) -> f64
where
    S: PathStatus,
{
    assert!(!branches.is_empty(), "cannot merge an empty branch list");
    let sum: f64 = branches
        .iter()
        .map(|branch| branch.map_or(MISSING_BRANCH_VALUE, PathStatus::value))
        .sum();
    sum / float(branches.len())
}

/// Converts a search depth for division, rejecting the invalid depth 0.
pub(crate) fn depth_divisor(depth: usize) -> f64 {
    assert!(depth > 0, "search depth starts at 1");
    float(depth)
}

/// Board-sized counts convert to `f64` exactly.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn float(n: usize) -> f64 {
    n as f64
}

/// Board-sized counts convert to `i32` exactly.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn signed(n: usize) -> i32 {
    n as i32
}

/// `|2 * (col + 1) - width|`: distance of the placement from the center.
pub(crate) fn middle(placement: &Placement, width: usize) -> f64 {
    float((2 * (placement.col() + 1)).abs_diff(width))
}
