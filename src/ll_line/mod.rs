mod association;
mod cursor;
mod display;

pub use association::{AssociatedSpan, Association, AssociationAny, SpanRef};
pub use cursor::Cursor;
pub use display::LLLineDisplay;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Write;
use unicode_segmentation::UnicodeSegmentation;

use crate::lexicon::{LexEntry, Lexicon};
use crate::referent::ReferentHandle;

/// Inclusive token range `(start_idx, end_idx)`.
pub type LRange = (usize, usize);

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextTag {
    /// Natural number (run of digits)
    NATN,
    PUNC,
    SYMB,
    SPACE,
    WORD,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LToken {
    Text(String, TextTag),
}

#[derive(Debug, Clone)]
pub struct LLToken {
    pub token_idx: usize,
    /// Char index where the token starts
    pub pos_starts_at: usize,
    /// Char index one past the token
    pub pos_ends_at: usize,
    pub token: LToken,
    term: String,
    lex: Vec<LexEntry>,
}

impl LLToken {
    pub fn text(&self) -> &str {
        match &self.token {
            LToken::Text(text, _) => text,
        }
    }

    pub fn tag(&self) -> TextTag {
        match &self.token {
            LToken::Text(_, tag) => *tag,
        }
    }

    /// Upper-cased text with `Ё` folded to `Е`.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn lex_entries(&self) -> &[LexEntry] {
        &self.lex
    }
}

struct StoredAttr {
    range: LRange,
    value: Box<dyn Any + Send + Sync>,
    debug_value: String,
    associations: Vec<AssociatedSpan>,
}

#[derive(Default)]
pub(crate) struct LLLineAttrs {
    by_type: HashMap<TypeId, Vec<StoredAttr>>,
}

impl LLLineAttrs {
    fn push<T: 'static + std::fmt::Debug + Send + Sync>(&mut self, assignment: LLCursorAssignment<T>) {
        let mut debug_value = String::new();
        let _ = write!(&mut debug_value, "{:?}", assignment.value);
        self.by_type
            .entry(TypeId::of::<T>())
            .or_default()
            .push(StoredAttr {
                range: (assignment.start_idx, assignment.end_idx),
                value: Box::new(assignment.value),
                debug_value,
                associations: assignment.associations,
            });
    }

    fn get<T: 'static>(&self) -> &[StoredAttr] {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn debug_entries<T: 'static>(
        &self,
    ) -> impl Iterator<Item = (LRange, &str, &[AssociatedSpan])> + '_ {
        self.get::<T>()
            .iter()
            .map(|a| (a.range, a.debug_value.as_str(), a.associations.as_slice()))
    }
}

/// A line of tokens with attributes layered on top by resolvers.
pub struct LLLine {
    ll_tokens: Vec<LLToken>,
    attrs: LLLineAttrs,
    referents: Vec<(SpanRef, ReferentHandle)>,
}

/// An attribute produced by a [`Resolver`] for a token range.
#[derive(Debug)]
pub struct LLCursorAssignment<Attr> {
    start_idx: usize,
    end_idx: usize,
    value: Attr,
    associations: Vec<AssociatedSpan>,
}

impl<Attr> LLCursorAssignment<Attr> {
    pub fn span(&self) -> SpanRef {
        SpanRef::new(self.start_idx, self.end_idx)
    }

    pub fn value(&self) -> &Attr {
        &self.value
    }

    /// Link this attribute to another span.
    pub fn with_association<A: Association>(mut self, association: A, span: SpanRef) -> Self {
        self.associations.push(AssociatedSpan::new(association, span));
        self
    }
}

/// A range of the line handed to a [`Resolver`].
#[derive(Clone, Copy)]
pub struct LLSelection<'l> {
    ll_line: &'l LLLine,
    start_idx: usize,
    end_idx: usize,
}

impl<'l> LLSelection<'l> {
    pub fn line(&self) -> &'l LLLine {
        self.ll_line
    }

    pub fn span(&self) -> SpanRef {
        SpanRef::new(self.start_idx, self.end_idx)
    }

    /// Narrow the selection to `span`.
    pub fn sub(&self, span: SpanRef) -> LLSelection<'l> {
        LLSelection {
            ll_line: self.ll_line,
            start_idx: span.start_idx,
            end_idx: span.end_idx,
        }
    }

    /// Every significant (non-whitespace) cursor inside the selection.
    pub fn cursors(&self) -> impl Iterator<Item = Cursor<'l>> + 'l {
        let (line, start, end) = (self.ll_line, self.start_idx, self.end_idx);
        (start..=end.min(line.ll_tokens.len().saturating_sub(1)))
            .filter_map(move |idx| Cursor::at(line, idx))
    }

    pub fn finish_with_attr<Attr>(&self, value: Attr) -> LLCursorAssignment<Attr> {
        LLCursorAssignment {
            start_idx: self.start_idx,
            end_idx: self.end_idx,
            value,
            associations: Vec::new(),
        }
    }
}

pub trait Resolver {
    type Attr: std::fmt::Debug + Send + Sync + 'static;

    fn go(&self, selection: LLSelection) -> Vec<LLCursorAssignment<Self::Attr>>;
}

impl LLLine {
    pub fn ll_tokens(&self) -> &[LLToken] {
        &self.ll_tokens
    }

    pub fn selection(&self) -> LLSelection<'_> {
        LLSelection {
            ll_line: self,
            start_idx: 0,
            end_idx: self.ll_tokens.len().saturating_sub(1),
        }
    }

    /// First significant token of the line.
    pub fn first_cursor(&self) -> Option<Cursor<'_>> {
        (0..self.ll_tokens.len()).find_map(|idx| Cursor::at(self, idx))
    }

    pub fn run<R: Resolver>(mut self, resolver: &R) -> Self {
        if self.ll_tokens.is_empty() {
            return self;
        }
        let assignments = resolver.go(self.selection());
        for assignment in assignments {
            self.attrs.push(assignment);
        }
        self
    }

    pub fn attrs_by<T: 'static>(&self) -> Vec<(SpanRef, &T)> {
        self.attrs
            .get::<T>()
            .iter()
            .filter_map(|a| {
                a.value
                    .downcast_ref::<T>()
                    .map(|v| (SpanRef::new(a.range.0, a.range.1), v))
            })
            .collect()
    }

    pub(crate) fn attrs(&self) -> &LLLineAttrs {
        &self.attrs
    }

    /// Mark `span` as already resolved to `handle`.
    pub fn attach_referent(&mut self, span: SpanRef, handle: ReferentHandle) {
        self.referents.retain(|(s, _)| s.start_idx != span.start_idx);
        self.referents.push((span, handle));
    }

    /// The referent attached to a span starting at `start_idx`, if any.
    pub fn referent_at(&self, start_idx: usize) -> Option<(SpanRef, ReferentHandle)> {
        self.referents
            .iter()
            .find(|(span, _)| span.start_idx == start_idx)
            .copied()
    }

    pub fn attached_referents(&self) -> &[(SpanRef, ReferentHandle)] {
        &self.referents
    }

    /// Source text for a span.
    pub fn span_text(&self, span: SpanRef) -> String {
        self.ll_tokens
            .get(span.start_idx..=span.end_idx)
            .unwrap_or(&[])
            .iter()
            .map(|t| t.text())
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Other,
}

fn char_class(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Other
    }
}

/// Split a word-bound segment into digit runs, letter runs and single symbols.
fn split_segment(segment: &str) -> Vec<(&str, TextTag)> {
    if segment.chars().all(char::is_whitespace) {
        return vec![(segment, TextTag::SPACE)];
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;
    for (byte_idx, ch) in segment.char_indices() {
        let class = char_class(ch);
        if let Some(prev) = current {
            if prev != class || class == CharClass::Other {
                pieces.push(&segment[start..byte_idx]);
                start = byte_idx;
            }
        }
        current = Some(class);
    }
    pieces.push(&segment[start..]);

    pieces
        .into_iter()
        .map(|piece| {
            let tag = match piece.chars().next().map(char_class) {
                Some(CharClass::Digit) => TextTag::NATN,
                Some(CharClass::Letter) => TextTag::WORD,
                _ if piece.chars().all(|c| c.is_whitespace()) => TextTag::SPACE,
                _ if piece.chars().all(is_punctuation) => TextTag::PUNC,
                _ => TextTag::SYMB,
            };
            (piece, tag)
        })
        .collect()
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '«' | '»' | '–' | '—' | '…' | '“' | '”' | '„')
}

fn to_term(text: &str) -> String {
    text.to_uppercase().replace('Ё', "Е")
}

/// Tokenize `text` with the built-in lexicon.
pub fn create_line_from_string<T: AsRef<str>>(text: T) -> LLLine {
    create_line_with_lexicon(text, Lexicon::builtin())
}

/// Tokenize `text`, attaching the lexicon entries of every word form.
pub fn create_line_with_lexicon<T: AsRef<str>>(text: T, lexicon: &Lexicon) -> LLLine {
    let mut ll_tokens = Vec::new();
    let mut char_pos = 0;
    for segment in text.as_ref().split_word_bounds() {
        for (piece, tag) in split_segment(segment) {
            let len = piece.chars().count();
            let term = to_term(piece);
            let lex = if tag == TextTag::SPACE {
                Vec::new()
            } else {
                lexicon.entries(&term).to_vec()
            };
            ll_tokens.push(LLToken {
                token_idx: ll_tokens.len(),
                pos_starts_at: char_pos,
                pos_ends_at: char_pos + len,
                token: LToken::Text(piece.to_string(), tag),
                term,
                lex,
            });
            char_pos += len;
        }
    }

    LLLine {
        ll_tokens,
        attrs: LLLineAttrs::default(),
        referents: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(line: &LLLine) -> Vec<(String, TextTag)> {
        line.ll_tokens()
            .iter()
            .map(|t| (t.text().to_string(), t.tag()))
            .collect()
    }

    #[test]
    fn splits_dotted_dates_and_glued_units() {
        let line = create_line_from_string("15.03.2023г");
        let texts: Vec<String> = tags(&line).into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["15", ".", "03", ".", "2023", "г"]);
    }

    #[test]
    fn keeps_whitespace_as_space_tokens() {
        let line = create_line_from_string("в 10:30");
        assert_eq!(
            tags(&line),
            vec![
                ("в".to_string(), TextTag::WORD),
                (" ".to_string(), TextTag::SPACE),
                ("10".to_string(), TextTag::NATN),
                (":".to_string(), TextTag::PUNC),
                ("30".to_string(), TextTag::NATN),
            ]
        );
    }

    #[test]
    fn terms_are_folded() {
        let line = create_line_from_string("Ёлка т.г.");
        let terms: Vec<&str> = line.ll_tokens().iter().map(|t| t.term()).collect();
        assert_eq!(terms, vec!["ЕЛКА", " ", "Т", ".", "Г", "."]);
    }
}
