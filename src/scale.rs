//! Conversion of physical weights and volumes into integer state units.
//!
//! Quantities are multiplied by the scale factor and **rounded** to the
//! nearest integer. Floating-point products such as `0.1 * 3 * 10` land a hair
//! below or above the intended integer; anything within `tolerance` units of
//! an integer is accepted as that integer. Item quantities further away than
//! that are not a whole number of increments and are rejected. Capacities are
//! snapped the same way and floored otherwise, which loses nothing: item
//! quantities are whole units, so a fractional remainder of capacity can never
//! be used.

use crate::error::{PackingError, Result};
use crate::model::{Capacity, Destination, Item, PackingInstance};
use crate::table::Usage;

/// Default scale: half-unit resolution (0.5 kg, 0.5 L).
pub const DEFAULT_SCALE: u32 = 2;

/// Default accepted deviation from an integer, in scaled units.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Largest scaled magnitude that still converts to an exact integer.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53

/// Integer weight and volume bound of one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    pub weight: u64,
    pub volume: u64,
}

enum Fault {
    Invalid,
    Drift(f64),
}

/// Converts physical quantities to integer units with a fixed scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaler {
    scale: u32,
    tolerance: f64,
}

impl Default for Scaler {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Scaler {
    /// Create a scaler. `scale` must be positive and `tolerance` finite and
    /// in `[0, 0.5)` so that rounding stays unambiguous.
    pub fn new(scale: u32, tolerance: f64) -> Result<Self> {
        if scale == 0 {
            return Err(PackingError::InvalidConfig(
                "scale factor must be positive".into(),
            ));
        }
        if !tolerance.is_finite() || !(0.0..0.5).contains(&tolerance) {
            return Err(PackingError::InvalidConfig(format!(
                "tolerance must lie in [0, 0.5), got {tolerance}"
            )));
        }
        Ok(Self { scale, tolerance })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn convert(&self, value: f64, floor_remainder: bool) -> std::result::Result<u64, Fault> {
        if !value.is_finite() || value < 0.0 {
            return Err(Fault::Invalid);
        }
        let scaled = value * f64::from(self.scale);
        if scaled >= MAX_EXACT {
            return Err(Fault::Invalid);
        }
        let rounded = scaled.round();
        let deviation = (scaled - rounded).abs();
        if deviation <= self.tolerance {
            Ok(rounded as u64)
        } else if floor_remainder {
            Ok(scaled.floor() as u64)
        } else {
            Err(Fault::Drift(deviation))
        }
    }

    fn fault(
        &self,
        fault: Fault,
        subject: impl FnOnce() -> String,
        field: &'static str,
        value: f64,
    ) -> PackingError {
        match fault {
            Fault::Invalid => PackingError::InvalidQuantity {
                subject: subject(),
                field,
                value,
            },
            Fault::Drift(deviation) => PackingError::Precision {
                subject: subject(),
                field,
                value,
                scale: self.scale,
                deviation,
            },
        }
    }

    /// Convert an exact quantity (a whole number of `1 / scale` increments).
    pub fn to_units(&self, value: f64) -> Result<u64> {
        self.convert(value, false)
            .map_err(|f| self.fault(f, || "quantity".into(), "value", value))
    }

    /// Convert a capacity bound, flooring any fractional remainder.
    pub fn capacity_units(&self, value: f64) -> Result<u64> {
        self.convert(value, true)
            .map_err(|f| self.fault(f, || "capacity".into(), "bound", value))
    }

    /// Back to physical units.
    pub fn to_physical(&self, units: u64) -> f64 {
        units as f64 / f64::from(self.scale)
    }

    fn bounds(&self, capacity: &Capacity, label: &'static str) -> Result<Bounds> {
        let weight = self
            .convert(capacity.max_weight, true)
            .map_err(|f| self.fault(f, || format!("{label} capacity"), "max_weight", capacity.max_weight))?;
        let volume = self
            .convert(capacity.max_volume, true)
            .map_err(|f| self.fault(f, || format!("{label} capacity"), "max_volume", capacity.max_volume))?;
        Ok(Bounds { weight, volume })
    }

    fn scale_item(&self, index: usize, item: &Item, rate: f64) -> Result<ScaledItem> {
        let subject = || format!("item {index} ({:?})", item.name);
        let weight = self
            .convert(item.weight, false)
            .map_err(|f| self.fault(f, subject, "weight", item.weight))?;
        let volume = self
            .convert(item.volume, false)
            .map_err(|f| self.fault(f, subject, "volume", item.volume))?;
        if !item.value.is_finite() || item.value < 0.0 {
            return Err(self.fault(Fault::Invalid, subject, "value", item.value));
        }
        Ok(ScaledItem {
            weight,
            volume,
            value: item.value,
            movers_value: item.movers_value(rate),
            cabin: item.cabin_safe,
            checkin: item.checkin_safe,
            movers: item.movers_safe,
        })
    }

    /// Scale a full set of solver inputs.
    pub fn scale_parts(
        &self,
        items: &[Item],
        cabin: &Capacity,
        checkin: &Capacity,
        movers_rate: f64,
    ) -> Result<ScaledInstance> {
        if !movers_rate.is_finite() || movers_rate < 0.0 {
            return Err(PackingError::InvalidQuantity {
                subject: "movers".into(),
                field: "rate",
                value: movers_rate,
            });
        }
        let scaled = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.scale_item(i, item, movers_rate))
            .collect::<Result<Vec<_>>>()?;
        Ok(ScaledInstance {
            items: scaled,
            names: items.iter().map(|it| it.name.clone()).collect(),
            cabin: self.bounds(cabin, "cabin")?,
            checkin: self.bounds(checkin, "check-in")?,
            scale: self.scale,
            tolerance: self.tolerance,
        })
    }

    pub fn scale_instance(&self, instance: &PackingInstance) -> Result<ScaledInstance> {
        self.scale_parts(
            &instance.items,
            &instance.cabin,
            &instance.checkin,
            instance.movers_rate,
        )
    }
}

/// An item in integer units with its two possible value contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledItem {
    pub weight: u64,
    pub volume: u64,
    /// Contribution when packed in cabin or check-in.
    pub value: f64,
    /// Contribution when sent with the movers.
    pub movers_value: f64,
    pub cabin: bool,
    pub checkin: bool,
    pub movers: bool,
}

impl ScaledItem {
    #[inline]
    pub fn allows(&self, destination: Destination) -> bool {
        match destination {
            Destination::Cabin => self.cabin,
            Destination::CheckIn => self.checkin,
            Destination::Movers => self.movers,
        }
    }

    #[inline]
    pub fn gain(&self, destination: Destination) -> f64 {
        match destination {
            Destination::Movers => self.movers_value,
            Destination::Cabin | Destination::CheckIn => self.value,
        }
    }
}

/// Solver inputs after scaling; shared read-only by every solver.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledInstance {
    items: Vec<ScaledItem>,
    names: Vec<String>,
    cabin: Bounds,
    checkin: Bounds,
    scale: u32,
    tolerance: f64,
}

impl ScaledInstance {
    pub fn items(&self) -> &[ScaledItem] {
        &self.items
    }

    pub fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cabin(&self) -> Bounds {
        self.cabin
    }

    pub fn checkin(&self) -> Bounds {
        self.checkin
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Tolerance the quantities were checked against.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Bound of `destination`; movers are unbounded and the value returned
    /// for them is never consulted.
    #[inline]
    pub fn bounds(&self, destination: Destination) -> Bounds {
        match destination {
            Destination::Cabin => self.cabin,
            Destination::CheckIn => self.checkin,
            Destination::Movers => Bounds::default(),
        }
    }

    /// Usage and net value of an explicit assignment, rejecting ineligible
    /// choices and exceeded bounds.
    ///
    /// Values are summed in item order, the same order the DP accumulates
    /// them, so equal assignments give bit-identical totals.
    pub fn evaluate(&self, assignment: &[Destination]) -> Result<(Usage, f64)> {
        if assignment.len() != self.items.len() {
            return Err(PackingError::AssignmentLength {
                expected: self.items.len(),
                actual: assignment.len(),
            });
        }
        let mut usage = Usage::ZERO;
        let mut value = 0.0;
        for (index, (item, &dest)) in self.items.iter().zip(assignment).enumerate() {
            if !item.allows(dest) {
                return Err(PackingError::Ineligible {
                    index,
                    name: self.name(index).to_string(),
                    destination: dest,
                });
            }
            usage = usage.charge(dest, item.weight, item.volume);
            value += item.gain(dest);
        }
        check_bound(Destination::Cabin, "weight", usage.cabin_weight, self.cabin.weight)?;
        check_bound(Destination::Cabin, "volume", usage.cabin_volume, self.cabin.volume)?;
        check_bound(Destination::CheckIn, "weight", usage.checkin_weight, self.checkin.weight)?;
        check_bound(Destination::CheckIn, "volume", usage.checkin_volume, self.checkin.volume)?;
        Ok((usage, value))
    }
}

fn check_bound(destination: Destination, resource: &'static str, used: u64, limit: u64) -> Result<()> {
    if used > limit {
        Err(PackingError::CapacityExceeded {
            destination,
            resource,
            used,
            limit,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(Scaler::new(0, 1e-6), Err(PackingError::InvalidConfig(_))));
        assert!(matches!(Scaler::new(2, 0.5), Err(PackingError::InvalidConfig(_))));
        assert!(matches!(Scaler::new(2, f64::NAN), Err(PackingError::InvalidConfig(_))));
        assert!(Scaler::new(1, 0.0).is_ok());
    }

    #[test]
    fn exact_half_steps_convert() {
        let s = Scaler::default();
        assert_eq!(s.to_units(0.0).unwrap(), 0);
        assert_eq!(s.to_units(0.5).unwrap(), 1);
        assert_eq!(s.to_units(7.5).unwrap(), 15);
        assert_eq!(s.to_physical(15), 7.5);
    }

    #[test]
    fn rounding_absorbs_float_drift() {
        // 0.1 + 0.2 is 0.30000000000000004; truncating 0.3 * 10 style
        // products would drop a unit.
        let s = Scaler::new(10, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(s.to_units(0.1 + 0.2).unwrap(), 3);
        let s = Scaler::new(100, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(s.to_units(1.15).unwrap(), 115);
        assert_eq!(s.to_units(0.29).unwrap(), 29);
    }

    #[test]
    fn off_increment_quantities_are_rejected() {
        let s = Scaler::default();
        match s.to_units(0.3) {
            Err(PackingError::Precision { scale, deviation, .. }) => {
                assert_eq!(scale, 2);
                assert!((deviation - 0.4).abs() < 1e-9);
            }
            other => panic!("expected precision error, got {other:?}"),
        }
    }

    #[test]
    fn negative_and_non_finite_are_invalid() {
        let s = Scaler::default();
        for v in [-0.5, f64::NAN, f64::INFINITY, 1e300] {
            assert!(matches!(s.to_units(v), Err(PackingError::InvalidQuantity { .. })));
        }
    }

    #[test]
    fn capacities_floor_fractional_remainder() {
        let s = Scaler::default();
        assert_eq!(s.capacity_units(3.3).unwrap(), 6);
        assert_eq!(s.capacity_units(3.5).unwrap(), 7);
        assert_eq!(s.capacity_units(0.0).unwrap(), 0);
    }

    #[test]
    fn item_errors_name_the_item() {
        let items = vec![
            Item::new("ok", 1.0, 1.0, 1.0).allow(Destination::Movers),
            Item::new("odd", 1.25, 1.0, 1.0).allow(Destination::Movers),
        ];
        let err = Scaler::default()
            .scale_parts(&items, &Capacity::default(), &Capacity::default(), 0.0)
            .unwrap_err();
        match err {
            PackingError::Precision { subject, field, .. } => {
                assert!(subject.contains("item 1"));
                assert!(subject.contains("odd"));
                assert_eq!(field, "weight");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_rate_is_rejected() {
        let err = Scaler::default()
            .scale_parts(&[], &Capacity::default(), &Capacity::default(), -1.0)
            .unwrap_err();
        assert!(matches!(err, PackingError::InvalidQuantity { field: "rate", .. }));
    }

    #[test]
    fn evaluate_checks_eligibility_and_bounds() {
        let items = vec![
            Item::new("a", 2.0, 3.0, 100.0)
                .allow(Destination::Cabin)
                .allow(Destination::Movers),
            Item::new("b", 5.0, 10.0, 50.0)
                .allow(Destination::CheckIn)
                .allow(Destination::Movers),
        ];
        let scaled = Scaler::default()
            .scale_parts(&items, &Capacity::new(3.0, 5.0), &Capacity::new(5.0, 10.0), 2.0)
            .unwrap();

        let (usage, value) = scaled
            .evaluate(&[Destination::Cabin, Destination::CheckIn])
            .unwrap();
        assert_eq!(usage, Usage::new(4, 6, 10, 20));
        assert_eq!(value, 150.0);

        let (usage, value) = scaled
            .evaluate(&[Destination::Movers, Destination::Movers])
            .unwrap();
        assert_eq!(usage, Usage::ZERO);
        assert_eq!(value, (100.0 - 6.0) + (50.0 - 20.0));

        assert!(matches!(
            scaled.evaluate(&[Destination::CheckIn, Destination::CheckIn]),
            Err(PackingError::Ineligible { index: 0, .. })
        ));
        assert!(matches!(
            scaled.evaluate(&[Destination::Cabin]),
            Err(PackingError::AssignmentLength { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn evaluate_reports_exceeded_capacity() {
        let items = vec![
            Item::new("a", 2.0, 1.0, 1.0).allow(Destination::Cabin),
            Item::new("b", 2.0, 1.0, 1.0).allow(Destination::Cabin),
        ];
        let scaled = Scaler::default()
            .scale_parts(&items, &Capacity::new(3.0, 5.0), &Capacity::default(), 0.0)
            .unwrap();
        let err = scaled
            .evaluate(&[Destination::Cabin, Destination::Cabin])
            .unwrap_err();
        assert_eq!(
            err,
            PackingError::CapacityExceeded {
                destination: Destination::Cabin,
                resource: "weight",
                used: 8,
                limit: 6,
            }
        );
    }
}
