use super::{LLLine, LLToken, SpanRef, TextTag};
use crate::lexicon::{Lexeme, MorphClass};
use crate::referent::ReferentHandle;

/// Read-only position over the significant (non-whitespace) tokens of a line.
///
/// Whitespace tokens never surface through a cursor; they are only
/// observable through the `whitespaces_*` and `is_newline_*` queries.
#[derive(Clone, Copy)]
pub struct Cursor<'l> {
    line: &'l LLLine,
    idx: usize,
}

impl<'l> std::fmt::Debug for Cursor<'l> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cursor({}, {:?})", self.idx, self.text())
    }
}

impl<'l> PartialEq for Cursor<'l> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.line, other.line) && self.idx == other.idx
    }
}

impl<'l> Cursor<'l> {
    /// A cursor at token `idx`, unless that token is whitespace.
    pub fn at(line: &'l LLLine, idx: usize) -> Option<Self> {
        match line.ll_tokens.get(idx) {
            Some(token) if token.tag() != TextTag::SPACE => Some(Cursor { line, idx }),
            _ => None,
        }
    }

    pub fn line(&self) -> &'l LLLine {
        self.line
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn current(&self) -> &'l LLToken {
        &self.line.ll_tokens[self.idx]
    }

    pub fn next(&self) -> Option<Self> {
        ((self.idx + 1)..self.line.ll_tokens.len()).find_map(|i| Cursor::at(self.line, i))
    }

    pub fn previous(&self) -> Option<Self> {
        (0..self.idx).rev().find_map(|i| Cursor::at(self.line, i))
    }

    /// Step `n` significant tokens forward.
    pub fn nth_next(&self, n: usize) -> Option<Self> {
        let mut cur = *self;
        for _ in 0..n {
            cur = cur.next()?;
        }
        Some(cur)
    }

    pub fn text(&self) -> &'l str {
        self.current().text()
    }

    pub fn term(&self) -> &'l str {
        self.current().term()
    }

    pub fn tag(&self) -> TextTag {
        self.current().tag()
    }

    pub fn is_value(&self, term: &str) -> bool {
        self.term() == term
    }

    pub fn numeric_value(&self) -> Option<i64> {
        if self.tag() != TextTag::NATN {
            return None;
        }
        let text = self.text();
        if text.len() > 10 {
            return None;
        }
        text.parse().ok()
    }

    /// Character length of the token.
    pub fn length_char(&self) -> usize {
        self.text().chars().count()
    }

    fn space_between(&self, from: usize, to: usize) -> (usize, bool) {
        let mut count = 0;
        let mut newline = false;
        for token in &self.line.ll_tokens[from..to] {
            if token.tag() != TextTag::SPACE {
                break;
            }
            count += token.text().chars().count();
            newline |= token.text().contains(['\n', '\r']);
        }
        (count, newline)
    }

    fn space_before(&self) -> (usize, bool) {
        let start = self.previous().map(|p| p.idx + 1).unwrap_or(0);
        self.space_between(start, self.idx)
    }

    fn space_after(&self) -> (usize, bool) {
        let end = self
            .next()
            .map(|n| n.idx)
            .unwrap_or(self.line.ll_tokens.len());
        self.space_between(self.idx + 1, end)
    }

    pub fn whitespaces_before(&self) -> usize {
        self.space_before().0
    }

    pub fn whitespaces_after(&self) -> usize {
        self.space_after().0
    }

    pub fn is_whitespace_before(&self) -> bool {
        self.whitespaces_before() > 0
    }

    pub fn is_whitespace_after(&self) -> bool {
        self.whitespaces_after() > 0
    }

    pub fn is_newline_before(&self) -> bool {
        self.space_before().1
    }

    pub fn is_newline_after(&self) -> bool {
        self.space_after().1
    }

    pub fn is_char(&self, ch: char) -> bool {
        let mut chars = self.text().chars();
        chars.next() == Some(ch) && chars.next().is_none()
    }

    pub fn is_char_of(&self, chars: &str) -> bool {
        let mut it = self.text().chars();
        match (it.next(), it.next()) {
            (Some(c), None) => chars.contains(c),
            _ => false,
        }
    }

    pub fn is_hyphen(&self) -> bool {
        self.is_char_of("-–—")
    }

    pub fn is_comma(&self) -> bool {
        self.is_char(',')
    }

    pub fn is_letters(&self) -> bool {
        self.tag() == TextTag::WORD
    }

    pub fn is_latin(&self) -> bool {
        self.is_letters() && self.text().chars().all(|c| c.is_ascii_alphabetic())
    }

    pub fn is_cyrillic(&self) -> bool {
        self.is_letters()
            && self
                .text()
                .chars()
                .all(|c| matches!(c, '\u{0400}'..='\u{04FF}'))
    }

    /// Class of the first lexicon entry, or `Undefined` for unknown words.
    pub fn morph_class(&self) -> MorphClass {
        self.current()
            .lex_entries()
            .first()
            .map(|e| e.class)
            .unwrap_or(MorphClass::Undefined)
    }

    pub fn has_class(&self, class: MorphClass) -> bool {
        self.current().lex_entries().iter().any(|e| e.class == class)
    }

    pub fn is_preposition(&self) -> bool {
        self.has_class(MorphClass::Preposition)
    }

    pub fn matches_lexeme(&self, lexeme: Lexeme) -> bool {
        self.current()
            .lex_entries()
            .iter()
            .any(|e| e.lexeme == lexeme)
    }

    pub fn lexemes(&self) -> impl Iterator<Item = Lexeme> + 'l {
        self.current().lex_entries().iter().map(|e| e.lexeme)
    }

    pub fn month_name(&self) -> Option<(i32, bool)> {
        self.lexemes().find_map(|l| match l {
            Lexeme::MonthName { month, abbreviated } => Some((month as i32, abbreviated)),
            _ => None,
        })
    }

    pub fn weekday_name(&self) -> Option<(i32, bool)> {
        self.lexemes().find_map(|l| match l {
            Lexeme::Weekday { day, abbreviated } => Some((day as i32, abbreviated)),
            _ => None,
        })
    }

    /// A referent attached to a span that starts here.
    pub fn attached_referent(&self) -> Option<(SpanRef, ReferentHandle)> {
        self.line.referent_at(self.idx)
    }

    pub fn span(&self) -> SpanRef {
        SpanRef::new(self.idx, self.idx)
    }

    pub fn span_to(&self, end: &Cursor<'l>) -> SpanRef {
        SpanRef::new(self.idx, end.idx.max(self.idx))
    }

    /// The cursor at the last token of `span`.
    pub fn end_of(line: &'l LLLine, span: SpanRef) -> Option<Self> {
        Cursor::at(line, span.end_idx)
    }
}
