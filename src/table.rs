//! State-table data structures used by the packing DP.
//!
//! A [`StateTable`] maps each reachable [`Usage`] to the best [`Entry`] seen
//! for it. Entries carry their assignment history as a shared, persistent
//! list so that expanding an entry costs O(1) instead of copying the prefix.

use crate::model::Destination;
use crate::scale::Bounds;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::sync::Arc;

/// Scaled weight and volume consumed in cabin and check-in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Usage {
    pub cabin_weight: u64,
    pub cabin_volume: u64,
    pub checkin_weight: u64,
    pub checkin_volume: u64,
}

impl Usage {
    pub const ZERO: Usage = Usage {
        cabin_weight: 0,
        cabin_volume: 0,
        checkin_weight: 0,
        checkin_volume: 0,
    };

    pub const fn new(cabin_weight: u64, cabin_volume: u64, checkin_weight: u64, checkin_volume: u64) -> Self {
        Self {
            cabin_weight,
            cabin_volume,
            checkin_weight,
            checkin_volume,
        }
    }

    /// Usage after placing `weight`/`volume` in `destination`, or `None` if
    /// that would exceed `bounds`. Movers never change usage.
    #[inline]
    pub fn place(self, destination: Destination, weight: u64, volume: u64, bounds: Bounds) -> Option<Usage> {
        let fits = |used_w: u64, used_v: u64| -> Option<(u64, u64)> {
            let w = used_w.checked_add(weight).filter(|&w| w <= bounds.weight)?;
            let v = used_v.checked_add(volume).filter(|&v| v <= bounds.volume)?;
            Some((w, v))
        };
        match destination {
            Destination::Cabin => {
                let (w, v) = fits(self.cabin_weight, self.cabin_volume)?;
                Some(Usage {
                    cabin_weight: w,
                    cabin_volume: v,
                    ..self
                })
            }
            Destination::CheckIn => {
                let (w, v) = fits(self.checkin_weight, self.checkin_volume)?;
                Some(Usage {
                    checkin_weight: w,
                    checkin_volume: v,
                    ..self
                })
            }
            Destination::Movers => Some(self),
        }
    }

    /// Usage after placing `weight`/`volume` in `destination` without any
    /// bound check.
    pub fn charge(self, destination: Destination, weight: u64, volume: u64) -> Usage {
        match destination {
            Destination::Cabin => Usage {
                cabin_weight: self.cabin_weight.saturating_add(weight),
                cabin_volume: self.cabin_volume.saturating_add(volume),
                ..self
            },
            Destination::CheckIn => Usage {
                checkin_weight: self.checkin_weight.saturating_add(weight),
                checkin_volume: self.checkin_volume.saturating_add(volume),
                ..self
            },
            Destination::Movers => self,
        }
    }
}

#[derive(Debug)]
struct Step {
    destination: Destination,
    prev: Option<Arc<Step>>,
}

impl Drop for Step {
    // Unlink iteratively; the default recursive drop would use one stack
    // frame per item on long chains.
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(step) = next {
            match Arc::try_unwrap(step) {
                Ok(mut inner) => next = inner.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Destinations chosen so far, newest first, sharing prefixes between entries.
#[derive(Debug, Clone, Default)]
pub struct History {
    head: Option<Arc<Step>>,
    len: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new history with `destination` appended; `self` is left untouched.
    #[inline]
    pub fn push(&self, destination: Destination) -> History {
        History {
            head: Some(Arc::new(Step {
                destination,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walk back from the newest step and return destinations in input order.
    pub fn to_vec(&self) -> Vec<Destination> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(step) = cursor {
            out.push(step.destination);
            cursor = step.prev.as_deref();
        }
        out.reverse();
        out
    }
}

/// Accumulated value and history of one table entry.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub value: f64,
    pub history: History,
}

impl Entry {
    /// The entry reached by sending the next item to `destination`.
    #[inline]
    pub fn extend(&self, destination: Destination, gain: f64) -> Entry {
        Entry {
            value: self.value + gain,
            history: self.history.push(destination),
        }
    }
}

/// Best entry per reachable usage.
///
/// Iteration is in ascending [`Usage`] order, which makes every run on the
/// same input produce the same table, the same tie-breaks and the same
/// extracted optimum.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    entries: BTreeMap<Usage, Entry>,
}

impl StateTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table before any item: zero usage, zero value, empty history.
    pub fn seeded() -> Self {
        let mut table = Self::new();
        table.entries.insert(Usage::ZERO, Entry::default());
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, usage: &Usage) -> Option<&Entry> {
        self.entries.get(usage)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Usage, Entry> {
        self.entries.iter()
    }

    /// Insert `entry` unless an entry for `usage` already has an equal or
    /// higher value. Returns whether the table changed.
    #[inline]
    pub fn offer(&mut self, usage: Usage, entry: Entry) -> bool {
        match self.entries.entry(usage) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            btree_map::Entry::Occupied(mut slot) => {
                if entry.value > slot.get().value {
                    slot.insert(entry);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Fold `later` into `self` under the dominance rule. Entries already in
    /// `self` win ties, so merging shards in order reproduces sequential
    /// first-seen behaviour.
    pub fn merge(&mut self, later: StateTable) {
        if self.entries.is_empty() {
            self.entries = later.entries;
            return;
        }
        for (usage, entry) in later.entries {
            self.offer(usage, entry);
        }
    }

    /// First entry of maximum value in iteration order.
    pub fn best(&self) -> Option<(&Usage, &Entry)> {
        let mut best: Option<(&Usage, &Entry)> = None;
        for (usage, entry) in &self.entries {
            match best {
                Some((_, b)) if entry.value <= b.value => {}
                _ => best = Some((usage, entry)),
            }
        }
        best
    }
}

impl FromIterator<(Usage, Entry)> for StateTable {
    fn from_iter<I: IntoIterator<Item = (Usage, Entry)>>(iter: I) -> Self {
        let mut table = StateTable::new();
        for (usage, entry) in iter {
            table.offer(usage, entry);
        }
        table
    }
}
