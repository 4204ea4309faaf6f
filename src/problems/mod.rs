//! Problem implementations for the layered DP engine.
//!
//! - [`packing`] : cabin / check-in / movers assignment with state dominance.

pub mod packing;
