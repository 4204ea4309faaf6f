//! Core trait definitions.
//!
//! Two seams live here:
//! - [`LayeredProblem`]: what the generic [`DpEngine`](crate::engine::DpEngine)
//!   needs from a dynamic program that advances one layer at a time.
//! - [`PackingSolver`]: the interface every packing solver exposes, so that an
//!   exact DP, a reference enumeration or an external integer-programming
//!   backend can be swapped or run side by side on the same instance.

use crate::error::Result;
use crate::model::{PackingInstance, PackingPlan};

/// A dynamic program processed as a sequence of layers.
///
/// Semantics:
/// - There are `T = num_layers()` steps.
/// - The engine starts from `init_frontier()` and calls
///   `forward_step(i, frontier_i)` for `i = 0..T`, each call building the
///   frontier of layer `i + 1` from the previous one without mutating it.
/// - After the last step, `extract(frontier_T)` turns the final frontier into
///   the answer.
///
/// Any step may fail; the engine stops at the first error and returns it.
pub trait LayeredProblem {
    /// All DP values (and whatever bookkeeping is needed) on one layer.
    type Frontier;

    /// Answer produced from the final frontier.
    type Output;

    type Error;

    /// Number of DP layers/steps `T`.
    fn num_layers(&self) -> usize;

    /// Frontier at layer 0.
    fn init_frontier(&self) -> Self::Frontier;

    /// Perform one DP step: from layer `layer` to `layer + 1`.
    ///
    /// Must only depend on `frontier` and fixed problem data.
    fn forward_step(
        &self,
        layer: usize,
        frontier: &Self::Frontier,
    ) -> std::result::Result<Self::Frontier, Self::Error>;

    /// Number of live states in `frontier`, used for statistics and logs.
    fn frontier_width(&self, frontier: &Self::Frontier) -> usize;

    /// Extract the answer from the frontier at layer `T`.
    fn extract(&self, frontier: Self::Frontier) -> std::result::Result<Self::Output, Self::Error>;
}

/// A solver for the three-destination packing problem.
///
/// Every implementation returns usage in its own plan's scale, the net value
/// and one [`Destination`](crate::model::Destination) per item, so plans from
/// different solvers can be compared directly.
pub trait PackingSolver {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    fn solve(&self, instance: &PackingInstance) -> Result<PackingPlan>;
}

impl<S: PackingSolver + ?Sized> PackingSolver for &S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, instance: &PackingInstance) -> Result<PackingPlan> {
        (**self).solve(instance)
    }
}

impl<S: PackingSolver + ?Sized> PackingSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, instance: &PackingInstance) -> Result<PackingPlan> {
        (**self).solve(instance)
    }
}
