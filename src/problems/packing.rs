//! Three-destination packing as a layered DP.
//!
//! Layer `i` holds one entry per reachable [`Usage`] after deciding items
//! `0..i`. Each step expands every entry into at most three successors (cabin,
//! check-in, movers) and keeps only the best value per usage, so the frontier
//! is bounded by the number of distinct scaled usages rather than by the
//! number of assignment histories.

use crate::error::PackingError;
use crate::model::{Destination, PackingPlan};
use crate::scale::{ScaledInstance, ScaledItem};
use crate::table::{Entry, StateTable, Usage};
use crate::traits::LayeredProblem;

/// Tables smaller than this are always expanded on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Packing DP instance: scaled items and capacities plus run limits.
#[derive(Debug, Clone)]
pub struct PackingProblem {
    instance: ScaledInstance,
    max_states: Option<usize>,
    shards: usize,
    parallel_threshold: usize,
}

impl PackingProblem {
    pub fn new(instance: ScaledInstance) -> Self {
        Self {
            instance,
            max_states: None,
            shards: 1,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_max_states(mut self, limit: Option<usize>) -> Self {
        self.max_states = limit;
        self
    }

    /// Split tables into `shards` contiguous slices per step (feature
    /// `parallel`). Zero is treated as one.
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }

    /// Minimum table size before sharding kicks in.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn instance(&self) -> &ScaledInstance {
        &self.instance
    }

    pub fn max_states(&self) -> Option<usize> {
        self.max_states
    }

    pub fn shards(&self) -> usize {
        self.shards
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Offer every successor of `entries` for `item` to `out`, in entry order
    /// and cabin, check-in, movers order within an entry.
    fn expand_into<'a>(
        &self,
        item: &ScaledItem,
        entries: impl Iterator<Item = (&'a Usage, &'a Entry)>,
        out: &mut StateTable,
    ) {
        for (usage, entry) in entries {
            for dest in Destination::ALL {
                if !item.allows(dest) {
                    continue;
                }
                if let Some(next) = usage.place(dest, item.weight, item.volume, self.instance.bounds(dest)) {
                    out.offer(next, entry.extend(dest, item.gain(dest)));
                }
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn expand(&self, item: &ScaledItem, frontier: &StateTable) -> StateTable {
        let mut next = StateTable::new();
        self.expand_into(item, frontier.iter(), &mut next);
        next
    }

    /// Shards are contiguous runs of the table in iteration order and are
    /// merged back in the same order, so the result (tie-breaks included)
    /// equals the sequential expansion.
    #[cfg(feature = "parallel")]
    fn expand(&self, item: &ScaledItem, frontier: &StateTable) -> StateTable {
        use rayon::prelude::*;

        if self.shards <= 1 || frontier.len() < self.parallel_threshold.max(2) {
            let mut next = StateTable::new();
            self.expand_into(item, frontier.iter(), &mut next);
            return next;
        }

        let entries: Vec<(&Usage, &Entry)> = frontier.iter().collect();
        let chunk = entries.len().div_ceil(self.shards).max(1);
        let partials: Vec<StateTable> = entries
            .par_chunks(chunk)
            .map(|shard| {
                let mut out = StateTable::new();
                self.expand_into(item, shard.iter().copied(), &mut out);
                out
            })
            .collect();

        let mut next = StateTable::new();
        for partial in partials {
            next.merge(partial);
        }
        next
    }
}

impl LayeredProblem for PackingProblem {
    type Frontier = StateTable;
    type Output = PackingPlan;
    type Error = PackingError;

    fn num_layers(&self) -> usize {
        self.instance.len()
    }

    fn init_frontier(&self) -> Self::Frontier {
        StateTable::seeded()
    }

    fn forward_step(&self, layer: usize, frontier: &StateTable) -> Result<StateTable, PackingError> {
        let item = &self.instance.items()[layer];
        let next = self.expand(item, frontier);

        if next.is_empty() {
            return Err(PackingError::Infeasible {
                index: layer,
                name: self.instance.name(layer).to_string(),
            });
        }
        if let Some(limit) = self.max_states {
            if next.len() > limit {
                return Err(PackingError::StateLimit {
                    index: layer,
                    states: next.len(),
                    limit,
                });
            }
        }
        Ok(next)
    }

    fn frontier_width(&self, frontier: &StateTable) -> usize {
        frontier.len()
    }

    fn extract(&self, frontier: StateTable) -> Result<PackingPlan, PackingError> {
        let last = self.instance.len().saturating_sub(1);
        let (usage, entry) = frontier.best().ok_or_else(|| PackingError::Infeasible {
            index: last,
            name: self.instance.name(last).to_string(),
        })?;
        let assignment = entry.history.to_vec();
        debug_assert_eq!(assignment.len(), self.instance.len());
        Ok(PackingPlan {
            usage: *usage,
            scale: self.instance.scale(),
            tolerance: self.instance.tolerance(),
            net_value: entry.value,
            assignment,
        })
    }
}
