//! Error type shared by the scaler, the solvers and plan verification.

use crate::model::Destination;
use thiserror::Error;

/// Everything that can go wrong between raw inputs and a verified plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackingError {
    /// Processing `index` left no reachable state: there is no complete
    /// assignment under the given flags and capacities.
    #[error("no feasible assignment: item {index} ({name:?}) cannot be placed in any destination")]
    Infeasible { index: usize, name: String },

    /// A scaled item quantity is not within tolerance of an integer unit.
    #[error(
        "{field} of {subject} is {value}, not a multiple of 1/{scale} \
         (off by {deviation:.3e} units)"
    )]
    Precision {
        subject: String,
        field: &'static str,
        value: f64,
        scale: u32,
        deviation: f64,
    },

    /// A quantity, value or rate is negative, NaN or infinite.
    #[error("{field} of {subject} must be finite and non-negative, got {value}")]
    InvalidQuantity {
        subject: String,
        field: &'static str,
        value: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The state table outgrew the configured bound.
    #[error("state table reached {states} entries after item {index}, limit is {limit}")]
    StateLimit {
        index: usize,
        states: usize,
        limit: usize,
    },

    #[error("exhaustive search supports at most {limit} items, got {count}")]
    TooManyItems { count: usize, limit: usize },

    #[error("assignment has {actual} entries for {expected} items")]
    AssignmentLength { expected: usize, actual: usize },

    #[error("item {index} ({name:?}) is not eligible for {destination}")]
    Ineligible {
        index: usize,
        name: String,
        destination: Destination,
    },

    #[error("{destination} {resource} exceeded: {used} units used, {limit} allowed")]
    CapacityExceeded {
        destination: Destination,
        resource: &'static str,
        used: u64,
        limit: u64,
    },

    /// A plan disagrees with the instance it claims to solve.
    #[error("plan does not match its instance: {0}")]
    PlanMismatch(String),
}

pub type Result<T> = std::result::Result<T, PackingError>;
