//! Persisted date referents.
//!
//! A relative or absolute date is stored as a chain of nodes, each refining
//! its `higher` node by one granule ("15 марта 2023" is a day node whose
//! higher node is a month node whose higher node is a year node). Nodes live
//! in a [`ReferentArena`] and link to each other by [`ReferentId`]; a node may
//! only link to a node added before it, so every chain ends.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::errors::{DateError, DateResult};
use crate::fragment::{Granule, PointerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferentId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RangeId(usize);

impl ReferentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl RangeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a token span of a line has already been resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentHandle {
    Date(ReferentId),
    Range(RangeId),
}

/// One refinement node of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateReferent {
    /// `None` for a node that only carries a pointer ("в настоящее время").
    pub granule: Option<Granule>,
    pub value: i32,
    pub is_relative: bool,
    /// "Last" / "penultimate" whose value depends on the enclosing period.
    #[serde(default)]
    pub is_last: bool,
    pub pointer: PointerKind,
    pub higher: Option<ReferentId>,
}

impl DateReferent {
    pub fn absolute(granule: Granule, value: i32) -> Self {
        DateReferent {
            granule: Some(granule),
            value,
            is_relative: false,
            is_last: false,
            pointer: PointerKind::No,
            higher: None,
        }
    }

    pub fn relative(granule: Granule, value: i32) -> Self {
        DateReferent {
            is_relative: true,
            ..DateReferent::absolute(granule, value)
        }
    }

    pub fn pointer_only(pointer: PointerKind) -> Self {
        DateReferent {
            granule: None,
            value: 0,
            is_relative: false,
            is_last: false,
            pointer,
            higher: None,
        }
    }

    pub fn with_higher(mut self, higher: Option<ReferentId>) -> Self {
        self.higher = higher;
        self
    }

    pub fn with_pointer(mut self, pointer: PointerKind) -> Self {
        self.pointer = pointer;
        self
    }
}

/// A `from..to` pair of dates; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRangeReferent {
    pub date_from: Option<ReferentId>,
    pub date_to: Option<ReferentId>,
}

/// Storage for the referents of one or more documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferentArena {
    dates: Vec<DateReferent>,
    ranges: Vec<DateRangeReferent>,
}

/// Granules compared by [`ReferentArena::compare`], coarse first.
const COMPARED: [Granule; 5] = [
    Granule::Year,
    Granule::Month,
    Granule::Day,
    Granule::Hour,
    Granule::Minute,
];

impl ReferentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node. A `higher` link that does not point at an earlier node
    /// is dropped.
    pub fn add_date(&mut self, mut node: DateReferent) -> ReferentId {
        let id = ReferentId(self.dates.len());
        node.higher = node.higher.filter(|h| h.0 < id.0);
        self.dates.push(node);
        id
    }

    pub fn add_range(&mut self, mut range: DateRangeReferent) -> RangeId {
        let known = self.dates.len();
        range.date_from = range.date_from.filter(|d| d.0 < known);
        range.date_to = range.date_to.filter(|d| d.0 < known);
        let id = RangeId(self.ranges.len());
        self.ranges.push(range);
        id
    }

    pub fn date(&self, id: ReferentId) -> Option<&DateReferent> {
        self.dates.get(id.0)
    }

    pub fn range(&self, id: RangeId) -> Option<&DateRangeReferent> {
        self.ranges.get(id.0)
    }

    pub fn dates(&self) -> impl Iterator<Item = (ReferentId, &DateReferent)> + '_ {
        self.dates.iter().enumerate().map(|(i, d)| (ReferentId(i), d))
    }

    pub fn ranges(&self) -> impl Iterator<Item = (RangeId, &DateRangeReferent)> + '_ {
        self.ranges.iter().enumerate().map(|(i, r)| (RangeId(i), r))
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.ranges.is_empty()
    }

    /// `id` followed by its higher nodes, finest first.
    pub fn chain(&self, id: ReferentId) -> impl Iterator<Item = (ReferentId, &DateReferent)> + '_ {
        let mut next = self.date(id).map(|node| (id, node));
        std::iter::from_fn(move || {
            let current = next.take()?;
            next = current
                .1
                .higher
                .and_then(|h| self.date(h).map(|node| (h, node)));
            Some(current)
        })
    }

    /// Value of `granule` on this node or any higher node.
    pub fn value(&self, id: ReferentId, granule: Granule) -> Option<i32> {
        self.chain(id)
            .find(|(_, node)| node.granule == Some(granule))
            .map(|(_, node)| node.value)
    }

    pub fn year(&self, id: ReferentId) -> Option<i32> {
        self.value(id, Granule::Year)
    }

    pub fn month(&self, id: ReferentId) -> Option<i32> {
        self.value(id, Granule::Month)
    }

    pub fn day(&self, id: ReferentId) -> Option<i32> {
        self.value(id, Granule::Day)
    }

    /// Stored century, or the one containing an absolute year.
    pub fn century(&self, id: ReferentId) -> Option<i32> {
        if let Some(c) = self.value(id, Granule::Century) {
            return Some(c);
        }
        if self.is_relative(id) {
            return None;
        }
        match self.year(id)? {
            0 => None,
            y if y > 0 => Some((y - 1) / 100 + 1),
            y => Some(-(((y.unsigned_abs() - 1) / 100 + 1) as i32)),
        }
    }

    /// The finest pointer along the chain.
    pub fn pointer(&self, id: ReferentId) -> PointerKind {
        self.chain(id)
            .map(|(_, node)| node.pointer)
            .find(|p| *p != PointerKind::No)
            .unwrap_or_default()
    }

    /// True if any node of the chain is relative or points at "today".
    pub fn is_relative(&self, id: ReferentId) -> bool {
        self.chain(id)
            .any(|(_, node)| node.is_relative || node.pointer == PointerKind::Today)
    }

    /// The coarsest node of the chain.
    pub fn root(&self, id: ReferentId) -> ReferentId {
        self.chain(id).last().map(|(root, _)| root).unwrap_or(id)
    }

    /// False if the two dates disagree on any granule they both carry.
    pub fn can_be_equal(&self, a: ReferentId, b: ReferentId) -> bool {
        if self.is_relative(a) != self.is_relative(b) {
            return false;
        }
        let (pa, pb) = (self.pointer(a), self.pointer(b));
        if pa != PointerKind::No && pb != PointerKind::No && pa != pb {
            return false;
        }
        for (_, node) in self.chain(a) {
            let Some(granule) = node.granule else { continue };
            if let Some(other) = self.value(b, granule) {
                if other != node.value {
                    return false;
                }
            }
        }
        true
    }

    /// Order two absolute dates by the granules both carry.
    ///
    /// Relative dates have no order without an anchor and give `None`.
    pub fn compare(&self, a: ReferentId, b: ReferentId) -> Option<Ordering> {
        if self.is_relative(a) || self.is_relative(b) {
            return None;
        }
        for granule in COMPARED {
            match (self.value(a, granule), self.value(b, granule)) {
                (Some(x), Some(y)) if x != y => return Some(x.cmp(&y)),
                (Some(_), Some(_)) => continue,
                _ => break,
            }
        }
        Some(Ordering::Equal)
    }

    pub fn to_ron(&self) -> DateResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| DateError::Store(e.to_string()))
    }

    /// Read an arena back, rejecting links that could form a cycle.
    pub fn from_ron(text: &str) -> DateResult<Self> {
        let arena: ReferentArena =
            ron::from_str(text).map_err(|e| DateError::Store(e.to_string()))?;
        for (i, node) in arena.dates.iter().enumerate() {
            if node.higher.map_or(false, |h| h.0 >= i) {
                return Err(DateError::Store(format!("node {} links forward", i)));
            }
        }
        let known = arena.dates.len();
        for (i, range) in arena.ranges.iter().enumerate() {
            let dangling = [range.date_from, range.date_to]
                .iter()
                .flatten()
                .any(|d| d.0 >= known);
            if dangling {
                return Err(DateError::Store(format!("range {} points past the arena", i)));
            }
        }
        Ok(arena)
    }
}
