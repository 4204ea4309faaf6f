//! Generic layer-by-layer DP engine.
//!
//! The engine owns a [`LayeredProblem`] and drives it from layer 0 to layer
//! `T`, keeping exactly one live frontier: each step derives the next frontier
//! from the current one, after which the current one is dropped.
//!
//! With the `tracing` feature, a run is wrapped in an `info` span and every
//! layer in a `trace` span; the frontier width after each step is logged at
//! `debug` level.

use crate::traits::LayeredProblem;

/// Counters collected during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Layers processed before the run finished or failed.
    pub layers: usize,
    /// Widest frontier seen, including the initial one.
    pub peak_width: usize,
    /// Width of the frontier handed to `extract`.
    pub final_width: usize,
}

/// Layered DP engine for a given problem instance `P`.
///
/// Typical usage:
/// ```
/// use pack_dp::engine::DpEngine;
/// use pack_dp::model::{Capacity, Destination, Item};
/// use pack_dp::problems::packing::PackingProblem;
/// use pack_dp::scale::Scaler;
///
/// let items = vec![Item::new("kettle", 1.5, 2.0, 40.0)
///     .allow(Destination::CheckIn)
///     .allow(Destination::Movers)];
/// let scaled = Scaler::default()
///     .scale_parts(&items, &Capacity::new(7.0, 20.0), &Capacity::new(23.0, 60.0), 1.0)
///     .unwrap();
/// let engine = DpEngine::new(PackingProblem::new(scaled));
/// let plan = engine.run().unwrap();
/// assert_eq!(plan.net_value, 40.0);
/// ```
pub struct DpEngine<P: LayeredProblem> {
    problem: P,
}

impl<P: LayeredProblem> DpEngine<P> {
    pub fn new(problem: P) -> Self {
        Self { problem }
    }

    /// Expose immutable reference to the underlying problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Expose mutable reference if callers need to adjust configuration.
    pub fn problem_mut(&mut self) -> &mut P {
        &mut self.problem
    }

    pub fn into_problem(self) -> P {
        self.problem
    }

    /// Run every layer and extract the answer.
    pub fn run(&self) -> Result<P::Output, P::Error> {
        self.run_with_stats().map(|(output, _)| output)
    }

    /// Like [`run`](Self::run), also returning the counters of the run.
    pub fn run_with_stats(&self) -> Result<(P::Output, EngineStats), P::Error> {
        let t = self.problem.num_layers();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("dp_run", layers = t);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut frontier = self.problem.init_frontier();
        let mut stats = EngineStats {
            layers: 0,
            peak_width: self.problem.frontier_width(&frontier),
            final_width: 0,
        };

        for layer in 0..t {
            #[cfg(feature = "tracing")]
            let span = tracing::trace_span!("forward_step", layer);
            #[cfg(feature = "tracing")]
            let _enter = span.enter();

            let next = match self.problem.forward_step(layer, &frontier) {
                Ok(next) => next,
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(layer, "forward step failed");
                    return Err(err);
                }
            };
            frontier = next;
            stats.layers = layer + 1;

            let width = self.problem.frontier_width(&frontier);
            stats.peak_width = stats.peak_width.max(width);
            #[cfg(feature = "tracing")]
            tracing::debug!(layer, width, "frontier advanced");
        }

        stats.final_width = self.problem.frontier_width(&frontier);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            peak_width = stats.peak_width,
            final_width = stats.final_width,
            "extracting"
        );
        let output = self.problem.extract(frontier)?;
        Ok((output, stats))
    }
}
