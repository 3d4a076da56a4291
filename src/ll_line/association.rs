//! Links between spans of a line.
//!
//! A date phrase that reuses an already resolved date points back at the
//! span that produced it; the link is rendered by [`LLLineDisplay`] as an
//! arrow under the phrase.
//!
//! [`LLLineDisplay`]: super::LLLineDisplay

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt::Debug;
use std::sync::Arc;

/// Inclusive token range within an `LLLine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanRef {
    pub start_idx: usize,
    pub end_idx: usize,
}

impl SpanRef {
    pub fn new(start_idx: usize, end_idx: usize) -> Self {
        Self { start_idx, end_idx }
    }

    /// Smallest span covering both.
    pub fn join(self, other: SpanRef) -> SpanRef {
        SpanRef::new(
            self.start_idx.min(other.start_idx),
            self.end_idx.max(other.end_idx),
        )
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.start_idx <= idx && idx <= self.end_idx
    }
}

/// A typed label for the relationship between two spans.
///
/// ```
/// use layered_dates::Association;
///
/// #[derive(Debug, Clone)]
/// pub struct RangeStart;
///
/// impl Association for RangeStart {
///     fn label(&self) -> &'static str { "range_start" }
///     fn glyph(&self) -> Option<&'static str> { Some("<") }
/// }
/// ```
pub trait Association: Debug + Send + Sync + 'static {
    fn label(&self) -> &'static str;

    /// Rendered before the label in display arrows.
    fn glyph(&self) -> Option<&'static str> {
        None
    }
}

/// Object-safe form of [`Association`], implemented for every association.
pub trait AssociationAny: Debug + Send + Sync {
    fn label(&self) -> &'static str;
    fn glyph(&self) -> Option<&'static str>;
    fn association_type_id(&self) -> TypeId;
}

impl<A: Association> AssociationAny for A {
    fn label(&self) -> &'static str {
        Association::label(self)
    }

    fn glyph(&self) -> Option<&'static str> {
        Association::glyph(self)
    }

    fn association_type_id(&self) -> TypeId {
        TypeId::of::<A>()
    }
}

/// A target span together with the association describing it.
#[derive(Clone)]
pub struct AssociatedSpan {
    pub span: SpanRef,
    association: Arc<dyn AssociationAny>,
}

impl Debug for AssociatedSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociatedSpan")
            .field("span", &self.span)
            .field("label", &self.label())
            .finish()
    }
}

impl AssociatedSpan {
    pub fn new<A: Association>(association: A, span: SpanRef) -> Self {
        Self {
            span,
            association: Arc::new(association),
        }
    }

    pub fn label(&self) -> &'static str {
        self.association.label()
    }

    pub fn glyph(&self) -> Option<&'static str> {
        self.association.glyph()
    }

    pub fn association_type_id(&self) -> TypeId {
        self.association.association_type_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct RangeStart;

    impl Association for RangeStart {
        fn label(&self) -> &'static str {
            "range_start"
        }

        fn glyph(&self) -> Option<&'static str> {
            Some("<")
        }
    }

    #[derive(Debug, Clone)]
    struct RangeEnd;

    impl Association for RangeEnd {
        fn label(&self) -> &'static str {
            "range_end"
        }
    }

    #[test]
    fn join_covers_both_spans() {
        let joined = SpanRef::new(4, 6).join(SpanRef::new(1, 2));
        assert_eq!(joined, SpanRef::new(1, 6));
        assert!(joined.contains(3));
        assert!(!joined.contains(7));
    }

    #[test]
    fn associated_span_keeps_label_and_type() {
        let start = AssociatedSpan::new(RangeStart, SpanRef::new(0, 2));
        let end = AssociatedSpan::new(RangeEnd, SpanRef::new(4, 6));

        assert_eq!(start.label(), "range_start");
        assert_eq!(start.glyph(), Some("<"));
        assert_eq!(end.glyph(), None);
        assert_ne!(start.association_type_id(), end.association_type_id());
        assert_eq!(start.clone().span, SpanRef::new(0, 2));
    }

    #[test]
    fn associated_span_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssociatedSpan>();
    }
}
