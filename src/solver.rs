//! Packing solvers behind the [`PackingSolver`] seam.
//!
//! - [`DpSolver`]: exact DP over resource-usage states; the production path.
//! - [`ExhaustiveSolver`]: depth-first enumeration of every assignment, for
//!   cross-checking small instances.

use crate::builder::DpSolverBuilder;
use crate::config::PackingConfig;
use crate::engine::{DpEngine, EngineStats};
use crate::error::{PackingError, Result};
use crate::model::{Capacity, Destination, Item, PackingInstance, PackingPlan};
use crate::problems::packing::PackingProblem;
use crate::scale::{ScaledInstance, Scaler, DEFAULT_TOLERANCE};
use crate::table::Usage;
use crate::traits::PackingSolver;

/// Solve one packing instance with the DP solver at `scale` and default
/// tolerance.
///
/// ```
/// use pack_dp::{pack, Capacity, Destination, Item};
///
/// let items = vec![
///     Item::new("A", 2.0, 3.0, 100.0).allow(Destination::Cabin).allow(Destination::Movers),
///     Item::new("B", 5.0, 10.0, 50.0).allow(Destination::CheckIn).allow(Destination::Movers),
/// ];
/// let plan = pack(&items, Capacity::new(3.0, 5.0), Capacity::new(5.0, 10.0), 2.0, 2).unwrap();
/// assert_eq!(plan.net_value, 150.0);
/// assert_eq!(plan.assignment, vec![Destination::Cabin, Destination::CheckIn]);
/// ```
pub fn pack(
    items: &[Item],
    cabin: Capacity,
    checkin: Capacity,
    movers_rate: f64,
    scale: u32,
) -> Result<PackingPlan> {
    DpSolverBuilder::new()
        .with_scale(scale)
        .build()?
        .solve_parts(items, &cabin, &checkin, movers_rate)
}

/// Exact DP solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpSolver {
    config: PackingConfig,
}

impl DpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DpSolverBuilder {
        DpSolverBuilder::new()
    }

    pub fn with_config(config: PackingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub(crate) fn with_config_unchecked(config: PackingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    /// The DP problem this solver would run for already-scaled inputs.
    pub fn problem(&self, scaled: ScaledInstance) -> PackingProblem {
        PackingProblem::new(scaled)
            .with_max_states(self.config.max_states)
            .with_shards(self.config.shards)
    }

    fn run(&self, scaled: ScaledInstance) -> Result<(PackingPlan, EngineStats)> {
        #[cfg(feature = "tracing")]
        let items = scaled.len();
        let engine = DpEngine::new(self.problem(scaled));
        let result = engine.run_with_stats();
        #[cfg(feature = "tracing")]
        match &result {
            Ok((plan, stats)) => tracing::info!(
                items,
                net_value = plan.net_value,
                peak_states = stats.peak_width,
                "dp solved"
            ),
            Err(err) => tracing::warn!(items, error = %err, "dp failed"),
        }
        result
    }

    /// Solve and also report engine counters (peak table size etc.).
    pub fn solve_with_stats(&self, instance: &PackingInstance) -> Result<(PackingPlan, EngineStats)> {
        let scaled = self.config.scaler()?.scale_instance(instance)?;
        self.run(scaled)
    }

    /// Solve from separate inputs without assembling a [`PackingInstance`].
    pub fn solve_parts(
        &self,
        items: &[Item],
        cabin: &Capacity,
        checkin: &Capacity,
        movers_rate: f64,
    ) -> Result<PackingPlan> {
        let scaled = self
            .config
            .scaler()?
            .scale_parts(items, cabin, checkin, movers_rate)?;
        self.run(scaled).map(|(plan, _)| plan)
    }
}

impl PackingSolver for DpSolver {
    fn name(&self) -> &'static str {
        "dp"
    }

    fn solve(&self, instance: &PackingInstance) -> Result<PackingPlan> {
        self.solve_with_stats(instance).map(|(plan, _)| plan)
    }
}

/// Default item bound of [`ExhaustiveSolver`] (3^12 ≈ 530k leaves).
pub const DEFAULT_EXHAUSTIVE_LIMIT: usize = 12;

/// Enumerates every feasible assignment and keeps the first best one.
///
/// Exponential in the item count; refuses instances above `max_items`.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSolver {
    scaler: Scaler,
    max_items: usize,
}

impl Default for ExhaustiveSolver {
    fn default() -> Self {
        Self {
            scaler: Scaler::default(),
            max_items: DEFAULT_EXHAUSTIVE_LIMIT,
        }
    }
}

impl ExhaustiveSolver {
    pub fn new(scale: u32, max_items: usize) -> Result<Self> {
        Ok(Self {
            scaler: Scaler::new(scale, DEFAULT_TOLERANCE)?,
            max_items,
        })
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn solve_scaled(&self, scaled: &ScaledInstance) -> Result<PackingPlan> {
        if scaled.len() > self.max_items {
            return Err(PackingError::TooManyItems {
                count: scaled.len(),
                limit: self.max_items,
            });
        }
        let mut search = Search {
            instance: scaled,
            path: Vec::with_capacity(scaled.len()),
            best: None,
            deepest: 0,
        };
        search.descend(0, Usage::ZERO, 0.0);

        match search.best {
            Some((net_value, usage, assignment)) => Ok(PackingPlan {
                usage,
                scale: scaled.scale(),
                tolerance: scaled.tolerance(),
                net_value,
                assignment,
            }),
            None => Err(PackingError::Infeasible {
                index: search.deepest,
                name: scaled.name(search.deepest).to_string(),
            }),
        }
    }
}

impl PackingSolver for ExhaustiveSolver {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, instance: &PackingInstance) -> Result<PackingPlan> {
        let scaled = self.scaler.scale_instance(instance)?;
        self.solve_scaled(&scaled)
    }
}

struct Search<'a> {
    instance: &'a ScaledInstance,
    path: Vec<Destination>,
    best: Option<(f64, Usage, Vec<Destination>)>,
    /// Longest feasible prefix seen; the blocking item when nothing completes.
    deepest: usize,
}

impl Search<'_> {
    fn descend(&mut self, index: usize, usage: Usage, value: f64) {
        self.deepest = self.deepest.max(index);
        let instance = self.instance;
        let Some(item) = instance.items().get(index) else {
            match &self.best {
                Some((best, _, _)) if value <= *best => {}
                _ => self.best = Some((value, usage, self.path.clone())),
            }
            return;
        };
        for dest in Destination::ALL {
            if !item.allows(dest) {
                continue;
            }
            if let Some(next) = usage.place(dest, item.weight, item.volume, instance.bounds(dest)) {
                self.path.push(dest);
                self.descend(index + 1, next, value + item.gain(dest));
                self.path.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_item_instance() -> PackingInstance {
        PackingInstance::new(
            vec![
                Item::new("A", 2.0, 3.0, 100.0)
                    .allow(Destination::Cabin)
                    .allow(Destination::Movers),
                Item::new("B", 5.0, 10.0, 50.0)
                    .allow(Destination::CheckIn)
                    .allow(Destination::Movers),
            ],
            Capacity::new(3.0, 5.0),
            Capacity::new(5.0, 10.0),
            2.0,
        )
    }

    #[test]
    fn dp_and_exhaustive_agree_on_example() {
        let instance = two_item_instance();
        let dp = DpSolver::new().solve(&instance).unwrap();
        let ex = ExhaustiveSolver::default().solve(&instance).unwrap();
        assert_eq!(dp, ex);
        assert_eq!(dp.usage, Usage::new(4, 6, 10, 20));
        dp.verify(&instance).unwrap();
    }

    #[test]
    fn plans_verify_under_the_tolerance_they_were_solved_with() {
        let instance = PackingInstance::new(
            vec![Item::new("scarf", 0.5 + 1e-5, 1.0, 20.0)
                .allow(Destination::Cabin)
                .allow(Destination::Movers)],
            Capacity::new(7.0, 20.0),
            Capacity::new(23.0, 60.0),
            1.0,
        );
        assert!(matches!(
            DpSolver::new().solve(&instance),
            Err(PackingError::Precision { field: "weight", .. })
        ));

        let loose = DpSolver::builder().with_tolerance(1e-4).build().unwrap();
        let plan = loose.solve(&instance).unwrap();
        assert_eq!(plan.tolerance, 1e-4);
        assert_eq!(plan.assignment, vec![Destination::Cabin]);
        assert_eq!(plan.verify(&instance), Ok(()));
    }

    #[test]
    fn solvers_are_usable_as_trait_objects() {
        let instance = two_item_instance();
        let solvers: Vec<Box<dyn PackingSolver>> =
            vec![Box::new(DpSolver::new()), Box::new(ExhaustiveSolver::default())];
        let names: Vec<_> = solvers.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["dp", "exhaustive"]);
        for s in &solvers {
            assert_eq!(s.solve(&instance).unwrap().net_value, 150.0);
        }
    }

    #[test]
    fn exhaustive_reports_same_blocking_item_as_dp() {
        let instance = PackingInstance::new(
            vec![
                Item::new("x", 1.0, 1.0, 1.0).allow(Destination::Movers),
                Item::new("y", 1.0, 1.0, 1.0).allow(Destination::Cabin),
                Item::new("z", 1.0, 1.0, 1.0).allow(Destination::Movers),
            ],
            Capacity::default(),
            Capacity::default(),
            0.0,
        );
        let expected = PackingError::Infeasible {
            index: 1,
            name: "y".into(),
        };
        assert_eq!(DpSolver::new().solve(&instance).unwrap_err(), expected);
        assert_eq!(ExhaustiveSolver::default().solve(&instance).unwrap_err(), expected);
    }

    #[test]
    fn exhaustive_refuses_large_instances() {
        let items = (0..5)
            .map(|i| Item::new(format!("{i}"), 0.0, 0.0, 1.0).allow(Destination::Movers))
            .collect();
        let instance = PackingInstance::new(items, Capacity::default(), Capacity::default(), 0.0);
        let solver = ExhaustiveSolver::new(2, 4).unwrap();
        assert_eq!(
            solver.solve(&instance).unwrap_err(),
            PackingError::TooManyItems { count: 5, limit: 4 }
        );
    }

    #[test]
    fn solve_with_stats_reports_table_growth() {
        let (plan, stats) = DpSolver::new()
            .solve_with_stats(&two_item_instance())
            .unwrap();
        assert_eq!(plan.net_value, 150.0);
        assert_eq!(stats.layers, 2);
        assert!(stats.peak_width >= stats.final_width);
        assert!(stats.final_width >= 1);
    }

    #[test]
    fn pack_rejects_zero_scale() {
        let err = pack(&[], Capacity::default(), Capacity::default(), 0.0, 0).unwrap_err();
        assert!(matches!(err, PackingError::InvalidConfig(_)));
    }
}
