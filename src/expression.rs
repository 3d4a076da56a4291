//! Aggregation of fragment chains into one date expression.
//!
//! [`ExpressionParser::parse`] walks the tokens from a cursor. Prepositions
//! switch between the "from" and "to" side of a range, chains are classified
//! into calendar fragments, and referents already attached to the line are
//! imported as finished fragments.

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::bridge::ReferentBridge;
use crate::chain::ChainBuilder;
use crate::errors::{DateError, DateResult};
use crate::fragment::{sort_fragments, DateFragment, ExpressionFragment, FragmentKind, Granule, PointerKind};
use crate::lexicon::{Lexeme, MorphClass};
use crate::ll_line::{Cursor, LLLine, SpanRef};
use crate::primitive::PrimitiveParser;
use crate::referent::ReferentHandle;
use crate::resolver::{Tense, ValueResolver};

/// A date or a range of dates found in text.
#[derive(Clone, PartialEq, Eq)]
pub struct DateExpression {
    pub items_from: Vec<ExpressionFragment>,
    /// Empty unless `is_range`.
    pub items_to: Vec<ExpressionFragment>,
    pub is_range: bool,
    pub pointer: PointerKind,
    pub span: SpanRef,
    /// Spans of referents this expression was assembled from.
    pub imported: Vec<SpanRef>,
}

fn write_items(f: &mut std::fmt::Formatter<'_>, items: &[ExpressionFragment]) -> std::fmt::Result {
    for (i, it) in items.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{:?}", it)?;
    }
    Ok(())
}

impl std::fmt::Debug for DateExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DateExpression(")?;
        if self.pointer != PointerKind::No {
            write!(f, "[{:?}] ", self.pointer)?;
        }
        if self.is_range {
            f.write_str("fr: ")?;
            write_items(f, &self.items_from)?;
            f.write_str(" | to: ")?;
            write_items(f, &self.items_to)?;
        } else {
            write_items(f, &self.items_from)?;
        }
        f.write_str(")")
    }
}

impl DateExpression {
    /// The instant the expression denotes; for a range, its first side.
    pub fn to_date(&self, now: NaiveDateTime, tense: Tense) -> Option<NaiveDateTime> {
        let items = if self.items_from.is_empty() {
            &self.items_to
        } else {
            &self.items_from
        };
        ValueResolver::new(now, tense).date(items).ok()
    }

    /// First and last instant of the denoted period.
    pub fn to_date_range(&self, now: NaiveDateTime, tense: Tense) -> Option<(NaiveDateTime, NaiveDateTime)> {
        ValueResolver::new(now, tense)
            .date_range(&self.items_from, &self.items_to)
            .ok()
    }

    pub fn has_granule(&self, granule: Granule) -> bool {
        self.items_from
            .iter()
            .chain(&self.items_to)
            .any(|it| it.granule == granule)
    }
}

/// A number the chain could not place on its own.
#[derive(Debug, Clone)]
struct Bare {
    fragment: DateFragment,
    after_preposition: bool,
}

/// Classified content of one chain, or of one side of a range.
#[derive(Debug, Clone, Default)]
struct Piece {
    items: Vec<ExpressionFragment>,
    bare: Vec<Bare>,
    pointer: PointerKind,
    not_strict: bool,
}

impl Piece {
    fn has(&self, granule: Granule) -> bool {
        self.items.iter().any(|it| it.granule == granule)
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty() && self.bare.is_empty()
    }

    fn has_year(&self) -> bool {
        self.items
            .iter()
            .any(|it| matches!(it.granule, Granule::Year | Granule::Decade | Granule::Century))
    }

    fn push(&mut self, fragment: &DateFragment, granule: Granule, value: i32) {
        self.items
            .push(ExpressionFragment::from_fragment(fragment, granule, value));
    }

    fn absorb(&mut self, other: Piece) {
        self.items.extend(other.items);
        self.bare.extend(other.bare);
        self.not_strict |= other.not_strict;
    }

    fn collides_with(&self, other: &Piece) -> bool {
        other.items.iter().any(|it| self.has(it.granule))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    From,
    To,
}

/// Numbers joined by the same delimiter: `n0 d n1 [d n2]`.
fn numeric_run(frags: &[DateFragment]) -> Option<(char, usize)> {
    let plain = |f: &DateFragment| f.kind == FragmentKind::Number;
    frags.first().filter(|f| plain(f))?;
    let d1 = frags.get(1)?.delimiter?;
    frags.get(2).filter(|f| plain(f))?;
    let third = frags.get(4).filter(|f| {
        plain(f) || (f.kind == FragmentKind::Year && !f.relative)
    });
    match (frags.get(3).and_then(|d| d.delimiter), third) {
        (Some(d2), Some(_)) if d2 == d1 => Some((d1, 5)),
        _ => Some((d1, 3)),
    }
}

fn single_token(span: Option<SpanRef>) -> bool {
    span.map_or(false, |s| s.start_idx == s.end_idx)
}

pub struct ExpressionParser<'p, 'a> {
    parser: &'p mut PrimitiveParser<'a>,
}

impl<'p, 'a> ExpressionParser<'p, 'a> {
    pub fn new(parser: &'p mut PrimitiveParser<'a>) -> Self {
        ExpressionParser { parser }
    }

    /// Parse the longest date expression starting at `cur`.
    pub fn parse(&mut self, cur: Cursor) -> DateResult<DateExpression> {
        let result = self.walk(cur, 0);
        let exceeded = self.parser.take_recursion_exceeded();
        match result {
            Err(_) if exceeded => Err(DateError::RecursionLimitExceeded {
                depth: self.parser.config().max_recursion_depth,
            }),
            Err(DateError::AmbiguousRejected { reason }) => {
                debug!(token = cur.idx(), reason, "date expression rejected");
                Err(DateError::AmbiguousRejected { reason })
            }
            Ok(expr) => {
                trace!(span = ?expr.span, expression = ?expr, "date expression");
                Ok(expr)
            }
            other => other,
        }
    }

    fn walk(&mut self, cur: Cursor, nested: usize) -> DateResult<DateExpression> {
        let line = cur.line();
        let mut from = Piece::default();
        let mut to = Piece::default();
        let mut from_regime = false;
        let mut to_regime = false;
        let mut split = false;
        let mut pending: Option<(Regime, usize)> = None;
        let mut regime_start: Option<usize> = None;
        let mut first_start: Option<usize> = None;
        let mut end: Option<usize> = None;
        let mut pointer = PointerKind::No;
        let mut imported: Vec<SpanRef> = Vec::new();
        let mut t = Some(cur);

        while let Some(tt) = t {
            if end.is_some() && tt.is_newline_before() {
                break;
            }

            // "за период с ... по ..."
            if nested == 0 && end.is_none() && tt.matches_lexeme(Lexeme::For) {
                if let Some(period) = tt.next().filter(|p| p.matches_lexeme(Lexeme::Period)) {
                    let inner_start = period.next().ok_or(DateError::NoMatch)?;
                    let mut inner = self.walk(inner_start, nested + 1)?;
                    if !inner.is_range {
                        return Err(DateError::NoMatch);
                    }
                    inner.span = SpanRef::new(tt.idx(), inner.span.end_idx);
                    return Ok(inner);
                }
            }

            if let (Some((span, handle)), Some(arena)) = (tt.attached_referent(), self.parser.arena()) {
                match handle {
                    ReferentHandle::Range(id) => {
                        if end.is_some() {
                            break;
                        }
                        let range = arena.range(id).ok_or(DateError::NoMatch)?;
                        for side in [range.date_from, range.date_to].into_iter().flatten() {
                            if arena.pointer(side) == PointerKind::Today {
                                return Err(DateError::AmbiguousRejected {
                                    reason: "imported range points at today",
                                });
                            }
                        }
                        let items = |id| ReferentBridge::to_items(arena, id, span);
                        from.items = range.date_from.map(&items).unwrap_or_default();
                        to.items = range.date_to.map(&items).unwrap_or_default();
                        from_regime = true;
                        first_start.get_or_insert(span.start_idx);
                        imported.push(span);
                        end = Some(span.end_idx);
                        break;
                    }
                    ReferentHandle::Date(id) => {
                        if arena.pointer(id) == PointerKind::Today {
                            return Err(DateError::AmbiguousRejected {
                                reason: "imported date points at today",
                            });
                        }
                        let items = ReferentBridge::to_items(arena, id, span);
                        if !items.is_empty() {
                            let regime = pending.take();
                            let into_to = to_regime || matches!(regime, Some((Regime::To, _)));
                            let side = if into_to { &to } else { &from };
                            if items.iter().any(|it| side.has(it.granule)) {
                                break;
                            }
                            match regime {
                                Some((Regime::To, _)) => to_regime = true,
                                Some((Regime::From, _)) => from_regime = true,
                                None => {}
                            }
                            let side = if into_to { &mut to } else { &mut from };
                            side.items.extend(items);
                            first_start.get_or_insert(span.start_idx);
                            imported.push(span);
                            end = Some(span.end_idx);
                        }
                        t = Cursor::at(line, span.end_idx).and_then(|c| c.next());
                        continue;
                    }
                }
            }

            if tt.is_preposition()
                || tt.has_class(MorphClass::Conjunction)
                || self.parser.lexicon().is_empty_word(tt.term())
            {
                let regime = if tt.matches_lexeme(Lexeme::To) {
                    Some(Regime::To)
                } else if tt.matches_lexeme(Lexeme::From) {
                    Some(Regime::From)
                } else {
                    None
                };
                if let Some(r) = regime {
                    pending = Some((r, tt.idx()));
                }
                t = tt.next();
                continue;
            }

            // "день недели"
            if tt.matches_lexeme(Lexeme::Day) && tt.next().map_or(false, |n| n.matches_lexeme(Lexeme::Week)) {
                break;
            }

            let Some(chain) = ChainBuilder::new(self.parser).build(tt) else {
                break;
            };
            let Some((first, second)) = self.classify(line, &chain) else {
                break;
            };
            let chain_start = chain.iter().map(|f| f.span.start_idx).min().unwrap_or(tt.idx());
            let chain_end = chain.iter().map(|f| f.span.end_idx).max().unwrap_or(tt.idx());

            if second.is_none() && first.bare.is_empty() && first.items.len() == 1 {
                let it = first.items[0];
                if matches!(it.granule, Granule::Hour | Granule::Minute) && single_token(it.span) {
                    let after_preposition = Cursor::at(line, chain_start)
                        .and_then(|c| c.previous())
                        .map_or(false, |p| p.is_preposition());
                    if !after_preposition {
                        break;
                    }
                }
                let bare_unit = matches!(
                    it.granule,
                    Granule::Day | Granule::Month | Granule::Week | Granule::Quarter | Granule::Year
                );
                if end.is_none() && bare_unit && !it.relative && it.value == 0 && single_token(it.span) {
                    return Err(DateError::NoMatch);
                }
            }

            if let Some(right) = second {
                if end.is_some() {
                    break;
                }
                if let Some((r, idx)) = pending.take() {
                    regime_start.get_or_insert(idx);
                    match r {
                        Regime::To => to_regime = true,
                        Regime::From => from_regime = true,
                    }
                }
                pointer = first.pointer;
                from.absorb(first);
                to.absorb(right);
                split = true;
                first_start = Some(chain_start);
                end = Some(chain_end);
                t = Cursor::at(line, chain_end).and_then(|c| c.next());
                continue;
            }
            if first.is_empty() {
                break;
            }

            let regime = pending.take();
            let into_to = to_regime || matches!(regime, Some((Regime::To, _)));
            let side = if into_to { &mut to } else { &mut from };
            if side.collides_with(&first) {
                break;
            }
            match regime {
                Some((Regime::To, idx)) => {
                    to_regime = true;
                    regime_start.get_or_insert(idx);
                }
                Some((Regime::From, idx)) => {
                    from_regime = true;
                    regime_start.get_or_insert(idx);
                }
                None => {}
            }
            if pointer == PointerKind::No {
                pointer = first.pointer;
            }

            // "последние 3 дня" runs up to now
            let open: Vec<ExpressionFragment> = first
                .items
                .iter()
                .filter(|it| !into_to && it.is_last && it.value != 0 && it.value != -1)
                .map(|it| {
                    let mut now = ExpressionFragment::relative(it.granule, 0);
                    now.span = it.span;
                    now
                })
                .collect();
            side.absorb(first);
            if !open.is_empty() {
                to.items.extend(open);
                from_regime = true;
            }

            first_start.get_or_insert(chain_start);
            end = Some(chain_end);
            t = Cursor::at(line, chain_end).and_then(|c| c.next());
        }

        let (Some(start), Some(mut end)) = (first_start, end) else {
            return Err(DateError::NoMatch);
        };

        let to_granules: Vec<Granule> = to.items.iter().map(|it| it.granule).collect();
        let from_granules: Vec<Granule> = from.items.iter().map(|it| it.granule).collect();
        self.place_bare(&mut from, &to_granules);
        self.place_bare(&mut to, &from_granules);

        // "с 10 по 15 марта 2023 г." already carries its year; a year after
        // imported referents does not
        if !from.has_year() && !to.has_year() {
            if let Some(year) = self.trailing_year(line, end) {
                let item = ExpressionFragment::from_fragment(&year, Granule::Year, year.year(self.parser.config()));
                for side in [&mut from, &mut to] {
                    if !side.items.is_empty() {
                        side.items.insert(0, item);
                    }
                }
                end = year.span.end_idx;
            }
        }

        if from.items.is_empty() && to.items.is_empty() {
            return Err(DateError::NoMatch);
        }
        let is_range = from_regime || to_regime || split;
        if !is_range {
            from.items.append(&mut to.items);
        }
        if from.items.len() == 1 && to.items.is_empty() && from.items[0].is_last && from.items[0].value == 0 {
            return Err(DateError::AmbiguousRejected {
                reason: "a lone \"last\" without a containing period",
            });
        }
        for side in [&mut from, &mut to] {
            if side.not_strict {
                side.items.iter_mut().for_each(|it| it.not_strict = true);
            }
            sort_fragments(&mut side.items);
        }

        let begin = match regime_start {
            Some(r) if r < start && Cursor::at(line, r).and_then(|c| c.next()).map(|c| c.idx()) == Some(start) => r,
            _ => start,
        };
        Ok(DateExpression {
            items_from: from.items,
            items_to: to.items,
            is_range,
            pointer,
            span: SpanRef::new(begin, end),
            imported,
        })
    }

    /// A standalone year closely following the expression.
    fn trailing_year(&mut self, line: &LLLine, end: usize) -> Option<DateFragment> {
        let last = Cursor::at(line, end)?;
        if last.whitespaces_after() >= 3 {
            return None;
        }
        let next = last.next().filter(|n| !n.is_newline_before())?;
        if next.attached_referent().is_some() {
            return None;
        }
        let year = self.parser.recognize(next, &[])?;
        (year.kind == FragmentKind::Year && !year.relative).then_some(year)
    }

    /// Split a chain at a range hyphen and classify each half.
    fn classify(&self, line: &LLLine, chain: &[DateFragment]) -> Option<(Piece, Option<Piece>)> {
        let numeric_date = matches!(numeric_run(chain), Some(('-', 5)));
        let hyphen = chain
            .iter()
            .position(|f| f.is_delimiter('-'))
            .filter(|&k| k > 0 && k + 1 < chain.len() && !numeric_date);
        match hyphen {
            Some(k) => {
                let mut left = self.classify_half(line, &chain[..k]);
                let mut right = self.classify_half(line, &chain[k + 1..]);
                if left.is_empty() || right.is_empty() {
                    return None;
                }
                let right_granules: Vec<Granule> = right.items.iter().map(|it| it.granule).collect();
                let left_granules: Vec<Granule> = left.items.iter().map(|it| it.granule).collect();
                self.place_bare(&mut left, &right_granules);
                self.place_bare(&mut right, &left_granules);
                if left.items.is_empty() || right.items.is_empty() {
                    return None;
                }
                Some((left, Some(right)))
            }
            None => {
                let piece = self.classify_half(line, chain);
                let pointer_only = piece.is_empty() && piece.pointer != PointerKind::No;
                (!pointer_only).then_some((piece, None))
            }
        }
    }

    fn classify_half(&self, line: &LLLine, frags: &[DateFragment]) -> Piece {
        let config = self.parser.config();
        let mut piece = Piece::default();
        let mut i = 0;
        while i < frags.len() {
            if let Some(consumed) = self.numeric_date(&frags[i..], &mut piece) {
                i += consumed;
                continue;
            }
            let f = &frags[i];
            piece.not_strict |= f.not_strict;
            match f.kind {
                FragmentKind::Delimiter => {}
                FragmentKind::Pointer => {
                    if piece.pointer == PointerKind::No {
                        piece.pointer = f.pointer;
                    }
                    if f.pointer == PointerKind::Today {
                        piece.items.push(ExpressionFragment::relative(Granule::Day, 0).with_span(f.span));
                    }
                }
                FragmentKind::Number => {
                    let before_month = frags.get(i + 1).map_or(false, |n| n.kind == FragmentKind::Month);
                    let after_month = piece.items.last().map_or(false, |p| p.granule == Granule::Month);
                    if before_month && f.can_be_day() && !piece.has(Granule::Day) {
                        piece.push(f, Granule::Day, f.value);
                    } else if after_month && f.can_be_day() && !piece.has(Granule::Day) {
                        piece.push(f, Granule::Day, f.value);
                    } else if piece.has(Granule::Month) && f.can_be_year() && !piece.has(Granule::Year) {
                        piece.push(f, Granule::Year, f.year(config));
                    } else {
                        let after_preposition = Cursor::at(line, f.span.start_idx)
                            .and_then(|c| c.previous())
                            .map_or(false, |p| p.is_preposition());
                        piece.bare.push(Bare {
                            fragment: f.clone(),
                            after_preposition,
                        });
                    }
                }
                FragmentKind::Year => {
                    let value = if f.relative { f.value } else { f.year(config) };
                    piece.push(f, Granule::Year, value);
                }
                FragmentKind::Century => {
                    let value = if f.new_era < 0 { -f.value } else { f.value };
                    piece.push(f, Granule::Century, value);
                }
                kind => {
                    if let Some(granule) = kind.granule() {
                        piece.push(f, granule, f.value);
                    }
                }
            }
            i += 1;
        }
        piece
    }

    /// "15.03.2023", "2023-03-15", "10:30", "10:30:15", "15.03", "03.2023".
    fn numeric_date(&self, frags: &[DateFragment], piece: &mut Piece) -> Option<usize> {
        let config = self.parser.config();
        let (delim, len) = numeric_run(frags)?;
        let (a, b) = (&frags[0], &frags[2]);
        if len == 5 {
            let c = &frags[4];
            if delim == ':' && a.can_be_hour() && b.can_be_minute() && c.can_be_minute() {
                piece.push(a, Granule::Hour, a.value);
                piece.push(b, Granule::Minute, b.value);
                piece.push(c, Granule::Second, c.value);
                return Some(5);
            }
            if matches!(delim, '.' | '/' | '\\' | '-') {
                if a.digits == 4 && b.can_be_month() && c.can_be_day() && c.kind == FragmentKind::Number {
                    piece.push(a, Granule::Year, a.value);
                    piece.push(b, Granule::Month, b.value);
                    piece.push(c, Granule::Day, c.value);
                    return Some(5);
                }
                let year_like = c.kind == FragmentKind::Year || matches!(c.digits, 2 | 4);
                if a.can_be_day() && b.can_be_month() && year_like {
                    piece.push(a, Granule::Day, a.value);
                    piece.push(b, Granule::Month, b.value);
                    piece.push(c, Granule::Year, c.year(config));
                    return Some(5);
                }
            }
            return None;
        }
        match delim {
            ':' if a.can_be_hour() && b.can_be_minute() => {
                piece.push(a, Granule::Hour, a.value);
                piece.push(b, Granule::Minute, b.value);
                Some(3)
            }
            '.' | '/' if a.can_be_day() && b.can_be_month() && b.digits == 2 => {
                piece.push(a, Granule::Day, a.value);
                piece.push(b, Granule::Month, b.value);
                Some(3)
            }
            '.' | '/' if a.can_be_month() && b.digits == 4 && b.can_be_year() => {
                piece.push(a, Granule::Month, a.value);
                piece.push(b, Granule::Year, b.value);
                Some(3)
            }
            _ => None,
        }
    }

    /// Give unplaced numbers the granule the other side of a range shows:
    /// "с 1 по 5 марта", "с 2020 по 2023 год", "в 2023".
    fn place_bare(&self, piece: &mut Piece, other: &[Granule]) {
        let config = self.parser.config();
        for bare in std::mem::take(&mut piece.bare) {
            let f = &bare.fragment;
            if !piece.has(Granule::Day)
                && f.can_be_day()
                && (other.contains(&Granule::Day) || piece.has(Granule::Month))
            {
                piece.push(f, Granule::Day, f.value);
            } else if !piece.has(Granule::Year)
                && f.can_be_year()
                && (other.contains(&Granule::Year) || bare.after_preposition)
            {
                piece.push(f, Granule::Year, f.year(config));
            } else if !piece.has(Granule::Hour) && f.can_be_hour() && other.contains(&Granule::Hour) {
                piece.push(f, Granule::Hour, f.value);
            }
        }
    }
}
