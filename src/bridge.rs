//! Conversion between date expressions and stored referents.

use chrono::NaiveDateTime;
use tracing::trace;

use crate::expression::DateExpression;
use crate::fragment::{ExpressionFragment, Granule, PointerKind};
use crate::ll_line::{LLLine, SpanRef};
use crate::referent::{DateRangeReferent, DateReferent, RangeId, ReferentArena, ReferentHandle, ReferentId};
use crate::resolver::{normalize_last, Tense, ValueResolver};

/// Stores expressions as referent chains and reads them back.
pub struct ReferentBridge;

impl ReferentBridge {
    /// Store `items` coarse to fine as one chain; returns the finest node.
    ///
    /// "Last" fragments that sit under a known period are stored with the
    /// absolute value they denote. An empty list stores a pointer-only node,
    /// or nothing when there is no pointer either.
    pub fn from_items(
        arena: &mut ReferentArena,
        items: &[ExpressionFragment],
        pointer: PointerKind,
    ) -> Option<ReferentId> {
        let items = normalize_last(items);
        if items.is_empty() {
            if pointer == PointerKind::No {
                return None;
            }
            return Some(arena.add_date(DateReferent::pointer_only(pointer)));
        }
        let mut higher = None;
        let last = items.len() - 1;
        for (i, it) in items.iter().enumerate() {
            let mut node = if it.relative {
                DateReferent::relative(it.granule, it.value)
            } else {
                DateReferent::absolute(it.granule, it.value)
            };
            node.is_last = it.is_last;
            if i == last {
                node.pointer = pointer;
            }
            higher = Some(arena.add_date(node.with_higher(higher)));
        }
        higher
    }

    /// Fragments of the chain ending at `id`, coarse first, spanning `span`.
    pub fn to_items(arena: &ReferentArena, id: ReferentId, span: SpanRef) -> Vec<ExpressionFragment> {
        let mut items: Vec<ExpressionFragment> = arena
            .chain(id)
            .filter_map(|(_, node)| {
                let granule = node.granule?;
                Some(ExpressionFragment {
                    granule,
                    value: node.value,
                    relative: node.is_relative,
                    is_last: node.is_last,
                    not_strict: false,
                    span: Some(span),
                })
            })
            .collect();
        items.reverse();
        if arena.pointer(id) == PointerKind::Today && !items.iter().any(|it| it.granule == Granule::Day) {
            items.push(ExpressionFragment::relative(Granule::Day, 0).with_span(span));
        }
        items
    }

    /// Store `expr`: a date chain, or a range over two chains.
    pub fn create_referents(arena: &mut ReferentArena, expr: &DateExpression) -> Option<ReferentHandle> {
        let handle = if expr.is_range {
            let date_from = Self::from_items(arena, &expr.items_from, expr.pointer);
            let date_to = Self::from_items(arena, &expr.items_to, PointerKind::No);
            if date_from.is_none() && date_to.is_none() {
                return None;
            }
            ReferentHandle::Range(arena.add_range(DateRangeReferent { date_from, date_to }))
        } else {
            ReferentHandle::Date(Self::from_items(arena, &expr.items_from, expr.pointer)?)
        };
        trace!(?handle, span = ?expr.span, "stored date referent");
        Some(handle)
    }

    pub fn calculate_date(
        arena: &ReferentArena,
        id: ReferentId,
        now: NaiveDateTime,
        tense: Tense,
    ) -> Option<NaiveDateTime> {
        if arena.pointer(id) == PointerKind::Today {
            return Some(now);
        }
        let items = Self::to_items(arena, id, SpanRef::new(0, 0));
        ValueResolver::new(now, tense).date(&items).ok()
    }

    /// First and last instant of a stored date or range.
    pub fn calculate_date_range(
        arena: &ReferentArena,
        handle: ReferentHandle,
        now: NaiveDateTime,
        tense: Tense,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match handle {
            ReferentHandle::Date(id) if arena.pointer(id) == PointerKind::Today => Some((now, now)),
            ReferentHandle::Date(id) => {
                let items = Self::to_items(arena, id, SpanRef::new(0, 0));
                ValueResolver::new(now, tense).date_range(&items, &[]).ok()
            }
            ReferentHandle::Range(id) => Self::calculate_range_referent(arena, id, now, tense),
        }
    }

    /// A range with one side missing spans the period of the other side.
    pub fn calculate_range_referent(
        arena: &ReferentArena,
        id: RangeId,
        now: NaiveDateTime,
        tense: Tense,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let range = arena.range(id)?;
        let side = |date: Option<ReferentId>| {
            date.map(|d| Self::to_items(arena, d, SpanRef::new(0, 0)))
                .unwrap_or_default()
        };
        let (from, to) = (side(range.date_from), side(range.date_to));
        if from.is_empty() && to.is_empty() {
            return None;
        }
        ValueResolver::new(now, tense).date_range(&from, &to).ok()
    }

    /// Store every [`DateExpression`] attribute of `line` and mark its span
    /// as resolved, so later passes import it instead of parsing it again.
    pub fn attach_all(line: &mut LLLine, arena: &mut ReferentArena) -> Vec<(SpanRef, ReferentHandle)> {
        let found: Vec<(SpanRef, DateExpression)> = line
            .attrs_by::<DateExpression>()
            .into_iter()
            .map(|(span, expr)| (span, expr.clone()))
            .collect();
        let mut attached = Vec::new();
        for (span, expr) in found {
            if let Some(handle) = Self::create_referents(arena, &expr) {
                line.attach_referent(span, handle);
                attached.push((span, handle));
            }
        }
        attached
    }
}
