//! Items, capacities, destinations and the plans the solvers return.

use crate::error::{PackingError, Result};
use crate::scale::{Scaler, DEFAULT_TOLERANCE};
use crate::table::Usage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an item ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Destination {
    #[serde(rename = "Cabin")]
    Cabin,
    #[serde(rename = "Check-in")]
    CheckIn,
    #[serde(rename = "Movers")]
    Movers,
}

impl Destination {
    /// All destinations in transition order.
    pub const ALL: [Destination; 3] = [Destination::Cabin, Destination::CheckIn, Destination::Movers];

    pub fn label(self) -> &'static str {
        match self {
            Destination::Cabin => "Cabin",
            Destination::CheckIn => "Check-in",
            Destination::Movers => "Movers",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One packable object.
///
/// Weight and volume are physical quantities (e.g. kg and litres) that must be
/// whole multiples of `1 / scale` for the scale the solver runs with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "item")]
    pub name: String,
    pub weight: f64,
    pub volume: f64,
    /// Current net value in currency units.
    #[serde(alias = "current_value")]
    pub value: f64,
    #[serde(default)]
    pub cabin_safe: bool,
    #[serde(default)]
    pub checkin_safe: bool,
    #[serde(default)]
    pub movers_safe: bool,
}

impl Item {
    /// Create an item that is not yet eligible for any destination.
    pub fn new(name: impl Into<String>, weight: f64, volume: f64, value: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            volume,
            value,
            cabin_safe: false,
            checkin_safe: false,
            movers_safe: false,
        }
    }

    /// Mark the item as eligible for `destination`.
    pub fn allow(mut self, destination: Destination) -> Self {
        match destination {
            Destination::Cabin => self.cabin_safe = true,
            Destination::CheckIn => self.checkin_safe = true,
            Destination::Movers => self.movers_safe = true,
        }
        self
    }

    pub fn is_eligible(&self, destination: Destination) -> bool {
        match destination {
            Destination::Cabin => self.cabin_safe,
            Destination::CheckIn => self.checkin_safe,
            Destination::Movers => self.movers_safe,
        }
    }

    /// Net value of sending this item with the movers at `rate` per volume unit.
    #[inline]
    pub fn movers_value(&self, rate: f64) -> f64 {
        self.value - rate * self.volume
    }
}

/// Current value of an item bought for `monetary` that loses
/// `depreciation_percent` of its value per year, truncated to whole units.
pub fn depreciated_value(monetary: f64, depreciation_percent: f64, age_years: u32) -> f64 {
    let years = i32::try_from(age_years).unwrap_or(i32::MAX);
    let factor = (1.0 - depreciation_percent / 100.0).powi(years);
    (monetary * factor).trunc()
}

/// Weight and volume bound of a container destination.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Capacity {
    pub max_weight: f64,
    pub max_volume: f64,
}

impl Capacity {
    pub fn new(max_weight: f64, max_volume: f64) -> Self {
        Self {
            max_weight,
            max_volume,
        }
    }
}

/// Complete input of one packing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingInstance {
    pub items: Vec<Item>,
    pub cabin: Capacity,
    pub checkin: Capacity,
    /// Movers cost per unit of (unscaled) volume.
    pub movers_rate: f64,
}

impl PackingInstance {
    pub fn new(items: Vec<Item>, cabin: Capacity, checkin: Capacity, movers_rate: f64) -> Self {
        Self {
            items,
            cabin,
            checkin,
            movers_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Usage of both containers in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalUsage {
    pub cabin_weight: f64,
    pub cabin_volume: f64,
    pub checkin_weight: f64,
    pub checkin_volume: f64,
}

/// Result of a solver: container usage, net value and one destination per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingPlan {
    /// Usage in scaled integer units.
    pub usage: Usage,
    /// Scale the usage is expressed in.
    pub scale: u32,
    /// Rounding tolerance the instance was scaled with.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    pub net_value: f64,
    /// Destination of each item, in input order.
    pub assignment: Vec<Destination>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl PackingPlan {
    /// The plan for an instance without items.
    pub fn empty(scale: u32) -> Self {
        Self {
            usage: Usage::ZERO,
            scale,
            tolerance: DEFAULT_TOLERANCE,
            net_value: 0.0,
            assignment: Vec::new(),
        }
    }

    /// Usage divided back into physical units.
    pub fn physical_usage(&self) -> PhysicalUsage {
        let s = f64::from(self.scale.max(1));
        PhysicalUsage {
            cabin_weight: self.usage.cabin_weight as f64 / s,
            cabin_volume: self.usage.cabin_volume as f64 / s,
            checkin_weight: self.usage.checkin_weight as f64 / s,
            checkin_volume: self.usage.checkin_volume as f64 / s,
        }
    }

    /// Number of items sent to `destination`.
    pub fn count(&self, destination: Destination) -> usize {
        self.assignment.iter().filter(|&&d| d == destination).count()
    }

    /// Indices of the items sent to `destination`, ascending.
    pub fn items_for(&self, destination: Destination) -> impl Iterator<Item = usize> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter(move |(_, &d)| d == destination)
            .map(|(i, _)| i)
    }

    /// Whether two plans reach the same net value within `epsilon`.
    pub fn agrees_with(&self, other: &PackingPlan, epsilon: f64) -> bool {
        (self.net_value - other.net_value).abs() <= epsilon
    }

    /// Re-evaluate the assignment against `instance` and check that it is
    /// feasible and that usage and net value are the ones reported.
    pub fn verify(&self, instance: &PackingInstance) -> Result<()> {
        let scaled = Scaler::new(self.scale, self.tolerance)?.scale_instance(instance)?;
        let (usage, value) = scaled.evaluate(&self.assignment)?;
        if usage != self.usage {
            return Err(PackingError::PlanMismatch(format!(
                "usage {:?} recomputes to {:?}",
                self.usage, usage
            )));
        }
        let tolerance = 1e-9 * value.abs().max(1.0);
        if (value - self.net_value).abs() > tolerance {
            return Err(PackingError::PlanMismatch(format!(
                "net value {} recomputes to {}",
                self.net_value, value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_sets_only_requested_flag() {
        let item = Item::new("lamp", 1.0, 2.0, 10.0).allow(Destination::CheckIn);
        assert!(!item.is_eligible(Destination::Cabin));
        assert!(item.is_eligible(Destination::CheckIn));
        assert!(!item.is_eligible(Destination::Movers));
    }

    #[test]
    fn movers_value_uses_unscaled_volume() {
        let item = Item::new("box", 5.0, 10.0, 50.0);
        assert_eq!(item.movers_value(2.0), 30.0);
        assert_eq!(item.movers_value(0.0), 50.0);
    }

    #[test]
    fn depreciation_truncates() {
        assert_eq!(depreciated_value(1000.0, 10.0, 0), 1000.0);
        assert_eq!(depreciated_value(1000.0, 10.0, 2), 810.0);
        assert_eq!(depreciated_value(999.0, 33.0, 1), 669.0);
        assert_eq!(depreciated_value(500.0, 100.0, 3), 0.0);
        assert_eq!(depreciated_value(1000.0, 10.0, u32::MAX), 0.0);
        assert_eq!(depreciated_value(1000.0, 0.0, u32::MAX), 1000.0);
    }

    #[test]
    fn plan_without_tolerance_field_uses_default() {
        let json = r#"{"usage":{"cabin_weight":0,"cabin_volume":0,"checkin_weight":0,"checkin_volume":0},
                       "scale":2,"net_value":0.0,"assignment":[]}"#;
        let plan: PackingPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan, PackingPlan::empty(2));
    }

    #[test]
    fn destination_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Destination::ALL).unwrap();
        assert_eq!(json, r#"["Cabin","Check-in","Movers"]"#);
        let back: Vec<Destination> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Destination::ALL.to_vec());
    }

    #[test]
    fn item_accepts_normalized_column_names() {
        let json = r#"{"item":"camera","weight":1.5,"volume":2,"current_value":900,
                       "cabin_safe":true,"checkin_safe":false}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.name, "camera");
        assert_eq!(item.value, 900.0);
        assert!(item.cabin_safe);
        assert!(!item.movers_safe);
    }

    #[test]
    fn physical_usage_descales() {
        let plan = PackingPlan {
            usage: Usage::new(4, 6, 10, 20),
            scale: 2,
            tolerance: DEFAULT_TOLERANCE,
            net_value: 150.0,
            assignment: vec![Destination::Cabin, Destination::CheckIn],
        };
        let phys = plan.physical_usage();
        assert_eq!(phys.cabin_weight, 2.0);
        assert_eq!(phys.cabin_volume, 3.0);
        assert_eq!(phys.checkin_weight, 5.0);
        assert_eq!(phys.checkin_volume, 10.0);
        assert_eq!(plan.count(Destination::Cabin), 1);
        assert_eq!(plan.items_for(Destination::CheckIn).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn verify_rejects_wrong_value() {
        let instance = PackingInstance::new(
            vec![Item::new("a", 1.0, 1.0, 10.0).allow(Destination::Movers)],
            Capacity::default(),
            Capacity::default(),
            1.0,
        );
        let plan = PackingPlan {
            usage: Usage::ZERO,
            scale: 2,
            tolerance: DEFAULT_TOLERANCE,
            net_value: 10.0,
            assignment: vec![Destination::Movers],
        };
        assert!(matches!(
            plan.verify(&instance),
            Err(PackingError::PlanMismatch(_))
        ));
        let fixed = PackingPlan {
            net_value: 9.0,
            ..plan
        };
        assert_eq!(fixed.verify(&instance), Ok(()));
    }
}
