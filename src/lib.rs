//! Exact packing planner (pack-dp)
//!
//! This crate assigns every item of a move to exactly one of three
//! destinations so that the total net value is maximal:
//! - **cabin** and **check-in**, each bounded by a maximum weight and volume;
//! - **movers**, unbounded but charging a rate per unit of volume.
//!
//! ## Core idea
//! 1. Scale weights and volumes to integers (see [`scale`]), rounding instead
//!    of truncating so float noise cannot lose a unit.
//! 2. Process items one at a time as the layers of a DP. A layer is a
//!    [`StateTable`](table::StateTable) keyed by the four used quantities
//!    `(cabin weight, cabin volume, check-in weight, check-in volume)`.
//! 3. Keep only the best value per key. The table is bounded by the number of
//!    distinct scaled usages, not by the number of assignment histories.
//! 4. Take the best entry of the last layer and walk its history back to get
//!    one destination per item.
//!
//! ## Quick start
//! ```
//! use pack_dp::{Capacity, Destination, DpSolver, Item, PackingInstance, PackingSolver};
//!
//! let instance = PackingInstance::new(
//!     vec![
//!         Item::new("laptop", 2.0, 3.0, 100.0)
//!             .allow(Destination::Cabin)
//!             .allow(Destination::Movers),
//!         Item::new("duvet", 5.0, 10.0, 50.0)
//!             .allow(Destination::CheckIn)
//!             .allow(Destination::Movers),
//!     ],
//!     Capacity::new(3.0, 5.0),
//!     Capacity::new(5.0, 10.0),
//!     2.0,
//! );
//! let plan = DpSolver::new().solve(&instance).unwrap();
//! assert_eq!(plan.net_value, 150.0);
//! assert_eq!(plan.physical_usage().cabin_weight, 2.0);
//! ```
//!
//! ## Features
//! - `parallel`: expand large state tables in shards on the rayon pool.
//! - `tracing`: spans and events for runs and layers.
//! - `heavy`: enables long-running stress tests.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod problems;
pub mod scale;
pub mod solver;
pub mod table;
pub mod traits;

pub use crate::builder::DpSolverBuilder;
pub use crate::config::PackingConfig;
pub use crate::engine::{DpEngine, EngineStats};
pub use crate::error::PackingError;
pub use crate::model::{Capacity, Destination, Item, PackingInstance, PackingPlan};
pub use crate::solver::{pack, DpSolver, ExhaustiveSolver};
pub use crate::traits::{LayeredProblem, PackingSolver};
