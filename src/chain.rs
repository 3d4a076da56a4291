//! Chains of primitive fragments forming one contiguous date phrase.

use crate::fragment::{DateFragment, FragmentKind};
use crate::lexicon::{Lexeme, MorphClass};
use crate::ll_line::{Cursor, LLLine, SpanRef, TextTag};
use crate::primitive::PrimitiveParser;

/// Builds fragment chains with a [`PrimitiveParser`].
///
/// The chain keeps input order; sorting by granule is left to the
/// aggregator.
pub struct ChainBuilder<'p, 'a> {
    parser: &'p mut PrimitiveParser<'a>,
}

fn after<'l>(line: &'l LLLine, span: SpanRef) -> Option<Cursor<'l>> {
    Cursor::end_of(line, span).and_then(|c| c.next())
}

impl<'p, 'a> ChainBuilder<'p, 'a> {
    pub fn new(parser: &'p mut PrimitiveParser<'a>) -> Self {
        ChainBuilder { parser }
    }

    pub fn build(&mut self, cur: Cursor) -> Option<Vec<DateFragment>> {
        let limit = self.parser.config().max_chain_fragments;
        self.build_with_limit(cur, limit)
    }

    pub fn build_with_limit(&mut self, cur: Cursor, max_fragments: usize) -> Option<Vec<DateFragment>> {
        let line = cur.line();
        let first = self.parser.recognize(cur, &[])?;
        let mut chain = vec![first];
        let mut t = chain.last().and_then(|f| after(line, f.span));

        while let Some(tt) = t {
            if chain.len() >= max_fragments {
                break;
            }
            if self.parser.lexicon().is_empty_word(tt.term()) && !tt.is_newline_before() {
                t = tt.next();
                continue;
            }

            let Some(mut candidate) = self.parser.recognize(tt, &chain) else {
                if tt.is_char('(') {
                    if let Some((alternative, close)) = self.new_style(tt) {
                        if let Some(last) = chain.last_mut() {
                            last.new_style = alternative;
                            last.span = SpanRef::new(last.span.start_idx, close.idx());
                        }
                        t = close.next();
                        continue;
                    }
                }
                if tt.is_newline_before() || tt.is_latin() {
                    break;
                }
                if (tt.has_class(MorphClass::Adjective) || tt.has_class(MorphClass::Pronoun))
                    && !tt.has_class(MorphClass::Adverb)
                {
                    t = tt.next();
                    continue;
                }
                if let Some(year) = self.preposition_year(&tt) {
                    t = after(line, year.span);
                    chain.push(year);
                    continue;
                }
                break;
            };

            let last = chain.last()?;
            if tt.is_newline_before() {
                let crossing = (last.kind == FragmentKind::Month && candidate.can_be_year())
                    || (last.kind == FragmentKind::Number
                        && last.can_be_day()
                        && candidate.kind == FragmentKind::Month);
                if !crossing {
                    break;
                }
            }

            if candidate.kind == FragmentKind::Number {
                if matches!(last.kind, FragmentKind::HalfYear | FragmentKind::Quarter) && candidate.can_be_year() {
                    candidate = candidate.with_kind(FragmentKind::Year);
                } else if last.kind == FragmentKind::Pointer && candidate.value > 1990 {
                    candidate = candidate.with_kind(FragmentKind::Year);
                }
            }
            if candidate.kind == FragmentKind::Minute && chain.len() >= 2 {
                let n = chain.len();
                if chain[n - 1].is_delimiter(':')
                    && chain[n - 2].kind == FragmentKind::Number
                    && chain[n - 2].can_be_hour()
                {
                    chain[n - 2] = chain[n - 2].with_kind(FragmentKind::Hour);
                }
            }

            t = after(line, candidate.span);
            chain.push(candidate);
        }

        self.prune(line, chain)
    }

    /// "в 1997", "у 2001" inside a phrase.
    fn preposition_year(&mut self, tt: &Cursor) -> Option<DateFragment> {
        if !(tt.is_value("В") || tt.is_value("У")) {
            return None;
        }
        let next = tt.next().filter(|n| !n.is_newline_before())?;
        let inner = self.parser.recognize(next, &[])?;
        if !inner.can_be_year() {
            return None;
        }
        Some(
            inner
                .with_kind(FragmentKind::Year)
                .with_span(SpanRef::new(tt.idx(), inner.span.end_idx)),
        )
    }

    /// A parenthesized alternative date: "19 февраля (3 марта) 1861 г.".
    fn new_style<'l>(&mut self, open: Cursor<'l>) -> Option<(Vec<DateFragment>, Cursor<'l>)> {
        let mut fragments: Vec<DateFragment> = Vec::new();
        let mut t = open.next()?;
        loop {
            if t.is_char(')') {
                break;
            }
            if fragments.len() >= 5 || t.is_newline_before() {
                return None;
            }
            let f = self.parser.recognize(t, &fragments)?;
            t = after(open.line(), f.span)?;
            fragments.push(f);
        }
        let has_date = fragments.iter().any(|f| f.kind.granule().is_some());
        has_date.then_some((fragments, t))
    }

    fn prune(&self, line: &LLLine, mut chain: Vec<DateFragment>) -> Option<Vec<DateFragment>> {
        let next_of = |f: &DateFragment| after(line, f.span).filter(|n| !n.is_newline_before());

        // trailing delimiters
        while chain.last().map_or(false, |f| f.kind == FragmentKind::Delimiter) {
            chain.pop();
        }

        // "5 кг": the number belongs to a measure
        if let Some(last) = chain.last() {
            let after_colon = chain.len() >= 2 && chain[chain.len() - 2].is_delimiter(':');
            if last.kind == FragmentKind::Number
                && !after_colon
                && next_of(last).map_or(false, |n| n.matches_lexeme(Lexeme::Unit))
            {
                chain.pop();
            }
        }

        // "март, 2023"
        if chain.len() == 3
            && chain[0].kind == FragmentKind::Month
            && chain[1].is_delimiter(',')
            && chain[2].can_be_year()
        {
            chain.remove(1);
        }

        // "2 сотрудника": a number heading an unrelated noun phrase
        if let Some(last) = chain.last() {
            let after_month = chain.len() >= 2 && chain[chain.len() - 2].kind == FragmentKind::Month;
            let heads_noun = next_of(last).map_or(false, |n| {
                n.tag() == TextTag::WORD
                    && matches!(n.morph_class(), MorphClass::Noun | MorphClass::Undefined)
            });
            if last.kind == FragmentKind::Number && heads_noun && !(after_month && last.can_be_year()) {
                chain.pop();
                if chain.last().map_or(false, |f| f.kind == FragmentKind::Delimiter) {
                    chain.pop();
                }
            }
        }

        // glued two-piece tokens like "a5"; line edges count as whitespace
        if chain.len() == 2 {
            let first_start = Cursor::at(line, chain[0].span.start_idx)?;
            let first_end = Cursor::end_of(line, chain[0].span)?;
            let second_end = Cursor::end_of(line, chain[1].span)?;
            let open_before = first_start.previous().is_none() || first_start.is_whitespace_before();
            let open_after = second_end.next().is_none() || second_end.is_whitespace_after();
            if !first_end.is_whitespace_after() && !open_before && !open_after {
                return None;
            }
        }

        // a lone "последний"
        if chain.len() == 1 && chain[0].relative && chain[0].is_last && chain[0].value == 0 {
            return None;
        }

        (!chain.is_empty()).then_some(chain)
    }
}
