//! Primitive recognizer: one date fragment at a cursor.
//!
//! A [`PrimitiveParser`] is created per document. It owns the optional
//! speed-regime memo and the recursion counter, both discarded with the
//! parser (or explicitly through [`PrimitiveParser::reset`]).

use std::collections::HashMap;
use tracing::debug;

use crate::config::ParserConfig;
use crate::fragment::{DateFragment, FragmentKind, PointerKind};
use crate::lexicon::{Lexeme, Lexicon, MorphClass};
use crate::ll_line::{Cursor, LLLine, SpanRef, TextTag};
use crate::referent::{ReferentArena, ReferentHandle};

/// Recognizes single date fragments.
pub struct PrimitiveParser<'a> {
    lexicon: &'a Lexicon,
    config: &'a ParserConfig,
    arena: Option<&'a ReferentArena>,
    memo: HashMap<usize, Option<DateFragment>>,
    depth: usize,
    depth_exceeded: bool,
}

/// Modifier words that adjust a unit's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Next,
    Nearest,
    Previous,
    BeforePrevious,
    Current,
    This,
    First,
    Last,
    Penultimate,
}

fn modifier_of(cur: &Cursor) -> Option<Modifier> {
    cur.lexemes().find_map(|l| match l {
        Lexeme::Next => Some(Modifier::Next),
        Lexeme::Nearest => Some(Modifier::Nearest),
        Lexeme::Previous => Some(Modifier::Previous),
        Lexeme::BeforePrevious => Some(Modifier::BeforePrevious),
        Lexeme::Current => Some(Modifier::Current),
        Lexeme::This => Some(Modifier::This),
        Lexeme::First => Some(Modifier::First),
        Lexeme::Last => Some(Modifier::Last),
        Lexeme::Penultimate => Some(Modifier::Penultimate),
        _ => None,
    })
}

/// Calendar unit named by a noun.
pub(crate) fn unit_of(cur: &Cursor) -> Option<FragmentKind> {
    cur.lexemes().find_map(|l| match l {
        Lexeme::Year => Some(FragmentKind::Year),
        Lexeme::HalfYear => Some(FragmentKind::HalfYear),
        Lexeme::Century => Some(FragmentKind::Century),
        Lexeme::Quarter => Some(FragmentKind::Quarter),
        Lexeme::Decade => Some(FragmentKind::Decade),
        Lexeme::Month => Some(FragmentKind::Month),
        Lexeme::Day => Some(FragmentKind::Day),
        Lexeme::Week => Some(FragmentKind::Week),
        Lexeme::Weekend => Some(FragmentKind::Weekend),
        Lexeme::Hour => Some(FragmentKind::Hour),
        Lexeme::Minute => Some(FragmentKind::Minute),
        Lexeme::Second => Some(FragmentKind::Second),
        _ => None,
    })
}

fn season_of(cur: &Cursor) -> Option<i32> {
    cur.lexemes().find_map(|l| match l {
        Lexeme::Winter => Some(1),
        Lexeme::Spring => Some(2),
        Lexeme::Summer => Some(3),
        Lexeme::Autumn => Some(4),
        _ => None,
    })
}

/// Head of a date noun phrase.
#[derive(Debug, Clone, Copy)]
enum Head {
    Unit(FragmentKind),
    MonthName(i32),
    Weekday(i32),
    Season(i32),
}

fn head_of(cur: &Cursor) -> Option<Head> {
    if let Some(unit) = unit_of(cur) {
        return Some(Head::Unit(unit));
    }
    if let Some((m, _)) = cur.month_name() {
        return Some(Head::MonthName(m));
    }
    if let Some((d, _)) = cur.weekday_name() {
        return Some(Head::Weekday(d));
    }
    season_of(cur).map(Head::Season)
}

/// Next significant token on the same line.
fn same_line_next<'l>(cur: &Cursor<'l>) -> Option<Cursor<'l>> {
    cur.next().filter(|n| !n.is_newline_before())
}

/// `cur`, or the dot glued right after it.
fn skip_dot<'l>(cur: Cursor<'l>) -> Cursor<'l> {
    match cur.next() {
        Some(n) if n.is_char('.') && !n.is_whitespace_before() => n,
        _ => cur,
    }
}

fn roman_digit(c: char) -> Option<i32> {
    Some(match c {
        'I' | 'І' => 1,
        'V' => 5,
        'X' | 'Х' => 10,
        'L' => 50,
        'C' | 'С' => 100,
        'D' => 500,
        'M' => 1000,
        _ => return None,
    })
}

/// Value of a canonical Roman numeral (Latin or look-alike Cyrillic letters).
pub(crate) fn parse_roman(term: &str) -> Option<i32> {
    if term.is_empty() || term.chars().count() > 8 {
        return None;
    }
    let digits: Vec<i32> = term.chars().map(roman_digit).collect::<Option<_>>()?;
    let mut total = 0;
    for (i, d) in digits.iter().enumerate() {
        match digits.get(i + 1) {
            Some(next) if next > d => total -= d,
            _ => total += d,
        }
    }
    if total <= 0 || to_roman(total) != normalize_roman(term) {
        return None;
    }
    Some(total)
}

fn normalize_roman(term: &str) -> String {
    term.chars()
        .map(|c| match c {
            'І' => 'I',
            'Х' => 'X',
            'С' => 'C',
            other => other,
        })
        .collect()
}

fn to_roman(mut n: i32) -> String {
    const TABLE: &[(i32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, text) in TABLE {
        while n >= value {
            out.push_str(text);
            n -= value;
        }
    }
    out
}

/// Relative markers found around a unit phrase.
struct Markers<'l> {
    relative: bool,
    negative: bool,
    end: Cursor<'l>,
}

fn relative_markers<'l>(begin: &Cursor<'l>, end: Cursor<'l>, has_number: bool) -> Markers<'l> {
    let mut markers = Markers {
        relative: false,
        negative: false,
        end,
    };
    if let Some(p) = begin.previous() {
        if p.matches_lexeme(Lexeme::Through)
            || p.matches_lexeme(Lexeme::Later)
            || (has_number && p.is_value("IN"))
        {
            markers.relative = true;
        }
    }
    if let Some(n) = same_line_next(&end) {
        if n.matches_lexeme(Lexeme::Ago) {
            markers.relative = true;
            markers.negative = true;
            markers.end = n;
        } else if n.matches_lexeme(Lexeme::Tomu) {
            if let Some(nn) = same_line_next(&n).filter(|nn| nn.matches_lexeme(Lexeme::Ago)) {
                markers.relative = true;
                markers.negative = true;
                markers.end = nn;
            }
        } else if n.matches_lexeme(Lexeme::Later) {
            markers.relative = true;
            markers.end = n;
        }
    }
    markers
}

fn span(begin: &Cursor, end: &Cursor) -> SpanRef {
    begin.span_to(end)
}

impl<'a> PrimitiveParser<'a> {
    pub fn new(lexicon: &'a Lexicon, config: &'a ParserConfig) -> Self {
        PrimitiveParser {
            lexicon,
            config,
            arena: None,
            memo: HashMap::new(),
            depth: 0,
            depth_exceeded: false,
        }
    }

    /// Resolve standalone "next/previous" against referents in this arena.
    pub fn with_arena(mut self, arena: &'a ReferentArena) -> Self {
        self.arena = Some(arena);
        self
    }

    pub fn config(&self) -> &'a ParserConfig {
        self.config
    }

    pub fn lexicon(&self) -> &'a Lexicon {
        self.lexicon
    }

    pub fn arena(&self) -> Option<&'a ReferentArena> {
        self.arena
    }

    /// Forget the memo and the recursion state of the previous document.
    pub fn reset(&mut self) {
        self.memo.clear();
        self.depth = 0;
        self.depth_exceeded = false;
    }

    /// True once the recursion bound was hit since the last call.
    pub fn take_recursion_exceeded(&mut self) -> bool {
        std::mem::take(&mut self.depth_exceeded)
    }

    /// Memoizing pre-pass over every position of `line`.
    pub fn prepare(&mut self, line: &LLLine) {
        self.reset();
        let cursors: Vec<Cursor> = line.selection().cursors().collect();
        for cur in cursors {
            let prev = self.memoized_prefix(&cur);
            let found = self.recognize_fresh(cur, &prev);
            self.memo.entry(cur.idx()).or_insert(found);
        }
        self.depth_exceeded = false;
    }

    /// Memoized fragments ending right before `cur`, in text order.
    fn memoized_prefix(&self, cur: &Cursor) -> Vec<DateFragment> {
        let mut prev = Vec::new();
        let mut t = cur.previous();
        while let Some(p) = t {
            if prev.len() >= self.config.max_recursion_depth {
                break;
            }
            let found = self
                .memo
                .values()
                .flatten()
                .find(|f| f.span.end_idx == p.idx())
                .cloned();
            match found {
                Some(f) => {
                    t = Cursor::at(cur.line(), f.span.start_idx).and_then(|s| s.previous());
                    prev.push(f);
                }
                None => break,
            }
        }
        prev.reverse();
        prev
    }

    /// Try to read one fragment at `cur`; `prev` holds the fragments already
    /// accepted into the current chain.
    pub fn recognize<'l>(&mut self, cur: Cursor<'l>, prev: &[DateFragment]) -> Option<DateFragment> {
        if self.depth == 0 && self.config.speed_regime {
            if let Some(hit) = self.memo.get(&cur.idx()) {
                return hit.clone();
            }
        }
        self.recognize_fresh(cur, prev)
    }

    fn recognize_fresh<'l>(&mut self, cur: Cursor<'l>, prev: &[DateFragment]) -> Option<DateFragment> {
        self.depth += 1;
        let result = if self.depth > self.config.max_recursion_depth {
            if !self.depth_exceeded {
                debug!(depth = self.depth, token = cur.idx(), "date recognizer recursion limit hit");
            }
            self.depth_exceeded = true;
            None
        } else {
            self.recognize_with_wrappers(cur, prev)
        };
        self.depth -= 1;
        result
    }

    fn recognize_with_wrappers<'l>(&mut self, cur: Cursor<'l>, prev: &[DateFragment]) -> Option<DateFragment> {
        // "___ 2023", "[____] марта"
        if cur.is_char('_') {
            let mut t = cur;
            while t.is_char('_') {
                t = t.next()?;
            }
            let res = self.recognize(t, prev)?;
            return Some(res.with_span(SpanRef::new(cur.idx(), res.span.end_idx)));
        }
        if cur.is_char_of("([") {
            let mut t = cur.next()?;
            if t.is_char('_') {
                while t.is_char('_') {
                    t = t.next()?;
                }
                if t.is_char_of(")]") {
                    let after = t.next()?;
                    let res = self.recognize(after, prev)?;
                    return Some(res.with_span(SpanRef::new(cur.idx(), res.span.end_idx)));
                }
                return None;
            }
        }
        if cur.is_value("THE") {
            let res = self.recognize(same_line_next(&cur)?, prev)?;
            return Some(res.with_span(SpanRef::new(cur.idx(), res.span.end_idx)));
        }

        let res = self.attach(cur, prev)?;
        if matches!(
            res.kind,
            FragmentKind::Number | FragmentKind::Year | FragmentKind::Century
        ) {
            if let Some(end) = Cursor::end_of(cur.line(), res.span) {
                if let Some((sign, era_end)) = self.new_era_after(&end) {
                    let kind = if res.kind == FragmentKind::Number {
                        FragmentKind::Year
                    } else {
                        res.kind
                    };
                    return Some(
                        res.with_kind(kind)
                            .with_new_era(sign)
                            .with_span(SpanRef::new(res.span.start_idx, era_end.idx())),
                    );
                }
            }
        }
        Some(res)
    }

    /// "н.э.", "до нашей эры", "от Р.Х." right after `end`.
    fn new_era_after<'l>(&self, end: &Cursor<'l>) -> Option<(i8, Cursor<'l>)> {
        let mut t = same_line_next(end)?;
        let mut sign = 1;
        if t.is_value("ДО") {
            sign = -1;
            t = same_line_next(&t)?;
        } else if t.is_value("ОТ") || t.is_value("ВІД") {
            t = same_line_next(&t)?;
        }
        'phrases: for phrase in self.lexicon.new_era_phrases() {
            let mut cur = t;
            for (i, term) in phrase.iter().enumerate() {
                if i > 0 {
                    match cur.next() {
                        Some(n) => cur = n,
                        None => continue 'phrases,
                    }
                }
                if cur.term() != term {
                    continue 'phrases;
                }
            }
            return Some((sign, cur));
        }
        None
    }

    fn attach<'l>(&mut self, cur: Cursor<'l>, prev: &[DateFragment]) -> Option<DateFragment> {
        if let Some(f) = self.day_word(&cur) {
            return Some(f);
        }
        if let Some(f) = self.this_year_abbr(&cur, prev) {
            return Some(f);
        }
        if let Some(f) = self.pointer_word(&cur, prev) {
            return Some(f);
        }
        if let Some(f) = self.noun_phrase(&cur) {
            return Some(f);
        }
        match cur.tag() {
            TextTag::NATN => self.number(cur, prev),
            TextTag::WORD => {
                if let Some(f) = self.roman(cur) {
                    return Some(f);
                }
                if let Some(f) = self.letter_o_number(&cur) {
                    return Some(f);
                }
                self.modifier_fallback(cur, prev)
            }
            _ => self.punctuation(&cur),
        }
    }

    /// Сегодня, завтра, позавчера, вчерашний день, полчаса.
    fn day_word(&self, cur: &Cursor) -> Option<DateFragment> {
        for lexeme in cur.lexemes() {
            let offset = match lexeme {
                Lexeme::Today => Some(0),
                Lexeme::Tomorrow => Some(1),
                Lexeme::DayAfterTomorrow => Some(2),
                Lexeme::Yesterday => Some(-1),
                Lexeme::DayBeforeYesterday => Some(-2),
                _ => None,
            };
            if let Some(v) = offset {
                return Some(DateFragment::relative(FragmentKind::Day, v, cur.span()));
            }
            let adjective = match lexeme {
                Lexeme::TomorrowAdj => Some(1),
                Lexeme::DayAfterTomorrowAdj => Some(2),
                Lexeme::YesterdayAdj => Some(-1),
                Lexeme::DayBeforeYesterdayAdj => Some(-2),
                _ => None,
            };
            if let Some(v) = adjective {
                let noun = same_line_next(cur).filter(|n| n.matches_lexeme(Lexeme::Day))?;
                return Some(DateFragment::relative(FragmentKind::Day, v, span(cur, &noun)));
            }
            if lexeme == Lexeme::HalfHour {
                return Some(DateFragment::relative(FragmentKind::Minute, 30, cur.span()));
            }
        }
        None
    }

    /// "т.г." (this year) continuing a phrase.
    fn this_year_abbr(&self, cur: &Cursor, prev: &[DateFragment]) -> Option<DateFragment> {
        if prev.is_empty() || !cur.is_value("Т") {
            return None;
        }
        let dot = cur.next().filter(|n| n.is_char('.'))?;
        let g = dot.next().filter(|n| n.is_value("Г") && !n.is_whitespace_before())?;
        Some(DateFragment::relative(
            FragmentKind::Year,
            0,
            span(cur, &skip_dot(g)),
        ))
    }

    fn pointer_word(&self, cur: &Cursor, prev: &[DateFragment]) -> Option<DateFragment> {
        let pointer = if cur.matches_lexeme(Lexeme::AtEnd) {
            PointerKind::End
        } else if cur.matches_lexeme(Lexeme::Recently) {
            PointerKind::Today
        } else if cur.matches_lexeme(Lexeme::About) && prev.is_empty() {
            let end = if cur.is_value("ОК") { skip_dot(*cur) } else { *cur };
            let mut f = DateFragment::pointer(PointerKind::About, span(cur, &end));
            f.not_strict = true;
            return Some(f);
        } else if cur.matches_lexeme(Lexeme::Begin) {
            PointerKind::Begin
        } else if cur.matches_lexeme(Lexeme::Middle) {
            PointerKind::Center
        } else if cur.matches_lexeme(Lexeme::End) {
            PointerKind::End
        } else if cur.matches_lexeme(Lexeme::Present) {
            let noun = same_line_next(cur)
                .filter(|n| n.matches_lexeme(Lexeme::Time) || n.matches_lexeme(Lexeme::Hour))?;
            return Some(DateFragment::pointer(PointerKind::Today, span(cur, &noun)));
        } else {
            return None;
        };
        Some(DateFragment::pointer(pointer, cur.span()))
    }

    /// Granule nouns with optional modifiers: "прошлом году", "последние 3
    /// дня", "этот квартал", "следующий понедельник", "марта", "летом".
    fn noun_phrase(&self, cur: &Cursor) -> Option<DateFragment> {
        if cur.tag() == TextTag::NATN {
            return None;
        }
        let mut t = *cur;
        let mut anaphor = false;
        let mut modifiers: Vec<Modifier> = Vec::new();
        let mut number: Option<i32> = None;
        let mut adjectives = 0;
        loop {
            if t.idx() != cur.idx() && t.is_newline_before() {
                return None;
            }
            if t.has_class(MorphClass::Pronoun) && t.matches_lexeme(Lexeme::This) && adjectives == 0 && !anaphor {
                anaphor = true;
            } else if head_of(&t).is_none() && t.has_class(MorphClass::Adjective) {
                modifiers.push(modifier_of(&t)?);
                adjectives += 1;
            } else if t.tag() == TextTag::NATN && adjectives > 0 && number.is_none() {
                number = Some(i32::try_from(t.numeric_value()?).ok()?);
                adjectives += 1;
            } else {
                break;
            }
            if adjectives > 3 {
                return None;
            }
            t = t.next()?;
        }
        let head = head_of(&t)?;
        let noun = t;
        let mut end = noun;
        if let Head::MonthName(_) | Head::Weekday(_) = head {
            if noun.month_name().map_or(false, |(_, abbr)| abbr)
                || noun.weekday_name().map_or(false, |(_, abbr)| abbr)
            {
                end = skip_dot(noun);
            }
        }

        let (kind, mut value) = match head {
            Head::Unit(FragmentKind::Day) => {
                if same_line_next(&noun).map_or(false, |n| n.matches_lexeme(Lexeme::Week)) {
                    return None;
                }
                (FragmentKind::Day, 0)
            }
            Head::Unit(kind) => (kind, 0),
            Head::MonthName(m) => (FragmentKind::Month, m),
            Head::Weekday(d) => (FragmentKind::DayOfWeek, d),
            Head::Season(s) => (FragmentKind::Season, s),
        };
        let named = !matches!(head, Head::Unit(_));
        let mut relative = false;
        let mut is_last = false;
        let mut negative = false;

        if anaphor && !named {
            relative = true;
        }
        if kind == FragmentKind::Weekend {
            relative = true;
        }
        let month_name = matches!(head, Head::MonthName(_));
        for modifier in &modifiers {
            if month_name && !matches!(modifier, Modifier::Current | Modifier::This) {
                return None;
            }
            match modifier {
                Modifier::Next | Modifier::Nearest => {
                    relative = true;
                    if kind == FragmentKind::DayOfWeek {
                        value += 7;
                    } else if !named && !(kind == FragmentKind::Weekend && *modifier == Modifier::Nearest) {
                        value = 1;
                    }
                }
                Modifier::Previous => {
                    relative = true;
                    negative = true;
                    if !named {
                        value = 1;
                    }
                }
                Modifier::BeforePrevious => {
                    relative = true;
                    negative = true;
                    if !named {
                        value = 2;
                    }
                }
                Modifier::Current | Modifier::This => {
                    if !named {
                        relative = true;
                    }
                }
                Modifier::First => {
                    if named {
                        return None;
                    }
                    value = 1;
                }
                Modifier::Last => {
                    if named {
                        return None;
                    }
                    relative = true;
                    is_last = true;
                }
                Modifier::Penultimate => {
                    if named {
                        return None;
                    }
                    relative = true;
                    is_last = true;
                    value = -1;
                }
            }
        }
        if let Some(n) = number {
            if named || modifiers.contains(&Modifier::First) {
                return None;
            }
            if is_last {
                value = -n;
            } else {
                value = n;
            }
        }
        if negative {
            value = -value;
        }
        if kind == FragmentKind::HalfYear && is_last && value == 0 {
            // "последнее полугодие" is the second half
            is_last = false;
            relative = false;
            value = 2;
        }

        let mut marked = false;
        if !named {
            let markers = relative_markers(cur, end, number.is_some());
            if markers.relative {
                marked = true;
                if value == 0 && !is_last {
                    value = 1;
                }
                if markers.negative {
                    value = -value.abs();
                }
                relative = true;
                end = markers.end;
            }
            if modifiers.is_empty() && !anaphor && !relative && number.is_none() {
                if let Some(p) = cur.previous() {
                    if p.is_value("ПО") && kind != FragmentKind::Month {
                        return None;
                    }
                }
            }
        }

        let mut f = DateFragment::new(kind, value, span(cur, &end));
        f.relative = relative;
        f.is_last = is_last;
        // "через неделю", "неделю назад"
        if kind == FragmentKind::Week && marked && !is_last {
            return Some(f.with_kind(FragmentKind::Day).with_value(value.checked_mul(7)?));
        }
        Some(f)
    }

    fn number<'l>(&mut self, cur: Cursor<'l>, prev: &[DateFragment]) -> Option<DateFragment> {
        let n = i32::try_from(cur.numeric_value()?).ok()?;
        let digits = cur.length_char();
        let plain = DateFragment::number(n, digits, cur.span());
        let next = same_line_next(&cur);

        // "марта 20 23" -> 2023
        if n == 20 && digits == 2 && cur.whitespaces_after() == 1 {
            if let Some(nx) = next.filter(|nx| nx.tag() == TextTag::NATN && nx.length_char() == 2) {
                let after_month = prev.last().map_or(false, |p| p.kind == FragmentKind::Month);
                let year = 2000 + nx.numeric_value().unwrap_or(0) as i32;
                if after_month && year < 2030 {
                    return Some(DateFragment::new(FragmentKind::Year, year, span(&cur, &nx)));
                }
            }
        }

        if let Some(nx) = next {
            // "20__ г."
            if nx.is_char('_') && !cur.is_whitespace_after() {
                let mut t = nx;
                while t.is_char('_') {
                    match t.next() {
                        Some(n2) => t = n2,
                        None => break,
                    }
                }
                if t.matches_lexeme(Lexeme::YearAbbr) || t.matches_lexeme(Lexeme::Year) {
                    return Some(DateFragment::new(FragmentKind::Year, 0, span(&cur, &skip_dot(t))));
                }
            }

            if let Some(f) = self.time_of_day(&cur, n) {
                return Some(f);
            }

            if nx.matches_lexeme(Lexeme::DayNumber) && (1..=31).contains(&n) {
                return Some(DateFragment::new(FragmentKind::Day, n, span(&cur, &nx)));
            }

            if let Some(unit) = unit_of(&nx) {
                if let Some(f) = self.number_with_unit(&cur, nx, n, unit) {
                    return Some(f);
                }
            }

            if nx.matches_lexeme(Lexeme::YearAbbr) && !cur.is_newline_after() {
                let after_month = prev.last().map_or(false, |p| p.kind == FragmentKind::Month);
                let single = nx.length_char() == 1;
                if plain.can_be_year() || digits == 2 || after_month || !single {
                    return Some(DateFragment::new(FragmentKind::Year, n, span(&cur, &skip_dot(nx))));
                }
            }
        }

        if let Some(p) = cur.previous() {
            let year_preposition = ["IN", "SINCE", "NEL", "DEL"].iter().any(|w| p.is_value(w));
            let unit_follows = next.map_or(false, |nx| nx.matches_lexeme(Lexeme::Unit));
            if year_preposition && (1000..=2100).contains(&n) && !unit_follows {
                return Some(DateFragment::new(FragmentKind::Year, n, cur.span()));
            }
        }

        Some(plain)
    }

    /// "5 утра", "7 часов вечера", "3 часа дня", "12 ночи".
    fn time_of_day(&self, cur: &Cursor, n: i32) -> Option<DateFragment> {
        if n > 12 {
            return None;
        }
        let mut t = same_line_next(cur)?;
        let mut saw_hour = false;
        if t.matches_lexeme(Lexeme::Hour) {
            saw_hour = true;
            t = same_line_next(&t)?;
        }
        let hour = if t.matches_lexeme(Lexeme::Morning) {
            if n == 12 {
                0
            } else {
                n
            }
        } else if t.matches_lexeme(Lexeme::Evening) {
            if n < 12 {
                n + 12
            } else {
                n
            }
        } else if t.matches_lexeme(Lexeme::Night) {
            if n == 12 {
                0
            } else if n > 9 {
                n + 12
            } else {
                n
            }
        } else if saw_hour && t.matches_lexeme(Lexeme::Day) {
            if n < 10 {
                n + 12
            } else {
                n
            }
        } else {
            return None;
        };
        Some(DateFragment::new(FragmentKind::Hour, hour, span(cur, &t)))
    }

    /// "2023 году", "3 дня назад", "через 2 часа", "19 век", "3 квартал".
    fn number_with_unit<'l>(
        &self,
        cur: &Cursor<'l>,
        unit_cur: Cursor<'l>,
        n: i32,
        unit: FragmentKind,
    ) -> Option<DateFragment> {
        let unit_end = if unit_cur.length_char() <= 3 && unit_cur.is_letters() {
            skip_dot(unit_cur)
        } else {
            unit_cur
        };
        let markers = relative_markers(cur, unit_end, true);
        let relative = markers.relative;
        let ok = match unit {
            FragmentKind::Century => relative || n < 30,
            FragmentKind::Decade => relative || n < 10,
            FragmentKind::Quarter => relative || (1..=4).contains(&n),
            FragmentKind::HalfYear => relative || (1..=2).contains(&n),
            FragmentKind::Hour => relative || n < 24,
            FragmentKind::Minute => relative || n < 60,
            FragmentKind::Second => relative || n < 60,
            FragmentKind::Day
            | FragmentKind::Month
            | FragmentKind::Week
            | FragmentKind::Weekend => relative,
            FragmentKind::Year => {
                let plural = ["ГОДА", "ЛЕТ", "РОКИ", "РОКІВ", "YEARS", "ГОДОВ", "ANNI"]
                    .iter()
                    .any(|w| unit_cur.is_value(w));
                relative || !(plural && n < 100)
            }
            _ => false,
        };
        if !ok {
            return None;
        }
        let value = if markers.negative { -n } else { n };
        let span = span(cur, &markers.end);
        let mut f = DateFragment::new(unit, value, span);
        f.relative = relative;
        if !relative {
            f.digits = cur.length_char();
        }
        if relative && unit == FragmentKind::Week {
            f = f.with_kind(FragmentKind::Day).with_value(value.checked_mul(7)?);
        }
        Some(f)
    }

    /// Roman numerals before a unit: "XIX век", "II квартал", "XV-XVI вв.",
    /// "I и II кварталы".
    fn roman<'l>(&mut self, cur: Cursor<'l>) -> Option<DateFragment> {
        let v = parse_roman(cur.term())?;
        let next = same_line_next(&cur)?;

        if let Some(unit) = unit_of(&next) {
            let ok = match unit {
                FragmentKind::Quarter => v <= 4,
                FragmentKind::HalfYear => v <= 2,
                FragmentKind::Century | FragmentKind::Decade => true,
                _ => false,
            };
            return ok.then(|| DateFragment::new(unit, v, span(&cur, &next)));
        }
        if next.is_value("В") || next.is_value("ВВ") {
            let dot = next.next().filter(|d| d.is_char('.'))?;
            return Some(DateFragment::new(FragmentKind::Century, v, span(&cur, &dot)));
        }

        // separators before a second numeral sharing the unit
        let mut t = next;
        let mut steps = 0;
        while steps < 3
            && (t.is_hyphen() || t.is_comma() || t.matches_lexeme(Lexeme::And) || t.is_preposition())
        {
            t = same_line_next(&t)?;
            steps += 1;
        }
        if steps == 0 || parse_roman(t.term()).is_none() {
            return None;
        }
        let shared = self.recognize(t, &[])?;
        match shared.kind {
            FragmentKind::Century | FragmentKind::Quarter => {
                let mut f = DateFragment::new(shared.kind, v, cur.span());
                f.new_era = shared.new_era;
                Some(f)
            }
            _ => None,
        }
    }

    /// "O5" typed with a letter instead of a zero.
    fn letter_o_number(&self, cur: &Cursor) -> Option<DateFragment> {
        if !(cur.is_value("O") || cur.is_value("О")) {
            return None;
        }
        let nx = cur.next().filter(|n| n.tag() == TextTag::NATN && !n.is_whitespace_before())?;
        let v = i32::try_from(nx.numeric_value()?).ok()?;
        Some(DateFragment::number(v, nx.length_char() + 1, span(cur, &nx)))
    }

    /// A modifier word whose unit did not form a noun phrase: apply it to the
    /// next fragment, or to the unit of an earlier relative referent.
    fn modifier_fallback<'l>(&mut self, cur: Cursor<'l>, prev: &[DateFragment]) -> Option<DateFragment> {
        let modifier = modifier_of(&cur)?;
        if let Some(next) = same_line_next(&cur) {
            if let Some(inner) = self.recognize(next, prev) {
                return apply_modifier(modifier, &inner, &cur);
            }
        }
        if cur.is_value("ЭТО") || cur.is_value("ЦЕ") {
            return None;
        }
        self.back_reference(&cur, modifier)
    }

    fn back_reference(&self, cur: &Cursor, modifier: Modifier) -> Option<DateFragment> {
        let arena = self.arena?;
        let offset = match modifier {
            Modifier::Next => 1,
            Modifier::Previous => -1,
            Modifier::BeforePrevious => -2,
            _ => return None,
        };
        let mut t = cur.previous();
        let mut steps = 0;
        while let Some(p) = t {
            if steps > 50 {
                break;
            }
            if let Some((_, ReferentHandle::Date(id))) = p.attached_referent() {
                let node = arena.date(id)?;
                if arena.is_relative(id) {
                    let kind = node.granule?.kind();
                    return Some(DateFragment::relative(kind, offset, cur.span()));
                }
                return None;
            }
            t = p.previous();
            steps += 1;
        }
        None
    }

    fn punctuation(&self, cur: &Cursor) -> Option<DateFragment> {
        if cur.is_char_of("([") {
            let num = cur.next().filter(|n| n.tag() == TextTag::NATN)?;
            let close = num.next().filter(|c| c.is_char_of(")]"))?;
            let v = i32::try_from(num.numeric_value()?).ok()?;
            if (1000..=2100).contains(&v) {
                return Some(DateFragment::new(FragmentKind::Year, v, span(cur, &close)));
            }
            return None;
        }
        if cur.is_hyphen() {
            return Some(DateFragment::delimiter('-', cur.span()));
        }
        let ch = cur.text().chars().next()?;
        if cur.is_char_of(".\\/:,") {
            return Some(DateFragment::delimiter(ch, cur.span()));
        }
        None
    }
}

fn apply_modifier(modifier: Modifier, inner: &DateFragment, cur: &Cursor) -> Option<DateFragment> {
    if inner.kind.granule().is_none() || inner.relative || inner.is_last {
        return None;
    }
    let span = SpanRef::new(cur.idx(), inner.span.end_idx);
    let mut f = inner.with_span(span);
    match modifier {
        Modifier::First if inner.value == 0 => f.value = 1,
        Modifier::Last if inner.value == 0 => {
            f.relative = true;
            f.is_last = true;
        }
        Modifier::Next if inner.value == 0 => {
            f.relative = true;
            f.value = 1;
        }
        Modifier::Previous if inner.value == 0 => {
            f.relative = true;
            f.value = -1;
        }
        Modifier::BeforePrevious if inner.value == 0 => {
            f.relative = true;
            f.value = -2;
        }
        Modifier::Current | Modifier::This if inner.value == 0 => f.relative = true,
        _ => return None,
    }
    Some(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_numerals() {
        assert_eq!(parse_roman("XIX"), Some(19));
        assert_eq!(parse_roman("ХХ"), Some(20));
        assert_eq!(parse_roman("IV"), Some(4));
        assert_eq!(parse_roman("IIII"), None);
        assert_eq!(parse_roman("ВЕК"), None);
    }
}
