//! Date fragments: the recognizer's output and the aggregator's refined unit.
//!
//! Fragments are values. Disambiguation never edits one in place; it builds a
//! new fragment with the corrected kind or value (`with_kind`, `with_value`).

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::ll_line::SpanRef;

/// Kind of a primitive fragment.
///
/// Besides the numeric and calendar kinds, the recognizer also emits the
/// calendar-only kinds `Season`, `Week`, `Weekend` and `DayOfWeek` for unit
/// words such as "неделя" or "выходные".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    Number,
    Delimiter,
    Pointer,
    Century,
    Decade,
    Year,
    HalfYear,
    Quarter,
    Season,
    Month,
    Week,
    Day,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    Weekend,
}

impl FragmentKind {
    /// The calendar granule denoted by this kind, if any.
    pub fn granule(self) -> Option<Granule> {
        Some(match self {
            FragmentKind::Century => Granule::Century,
            FragmentKind::Decade => Granule::Decade,
            FragmentKind::Year => Granule::Year,
            FragmentKind::HalfYear => Granule::HalfYear,
            FragmentKind::Quarter => Granule::Quarter,
            FragmentKind::Season => Granule::Season,
            FragmentKind::Month => Granule::Month,
            FragmentKind::Week => Granule::Week,
            FragmentKind::Day => Granule::Day,
            FragmentKind::DayOfWeek => Granule::DayOfWeek,
            FragmentKind::Hour => Granule::Hour,
            FragmentKind::Minute => Granule::Minute,
            FragmentKind::Second => Granule::Second,
            FragmentKind::Weekend => Granule::Weekend,
            FragmentKind::Number | FragmentKind::Delimiter | FragmentKind::Pointer => return None,
        })
    }
}

/// Calendar unit, ordered from coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Granule {
    Century,
    Decade,
    Year,
    HalfYear,
    Quarter,
    Season,
    Month,
    Week,
    Day,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    Weekend,
}

impl Granule {
    pub fn is_time(self) -> bool {
        matches!(self, Granule::Hour | Granule::Minute | Granule::Second)
    }

    pub fn kind(self) -> FragmentKind {
        match self {
            Granule::Century => FragmentKind::Century,
            Granule::Decade => FragmentKind::Decade,
            Granule::Year => FragmentKind::Year,
            Granule::HalfYear => FragmentKind::HalfYear,
            Granule::Quarter => FragmentKind::Quarter,
            Granule::Season => FragmentKind::Season,
            Granule::Month => FragmentKind::Month,
            Granule::Week => FragmentKind::Week,
            Granule::Day => FragmentKind::Day,
            Granule::DayOfWeek => FragmentKind::DayOfWeek,
            Granule::Hour => FragmentKind::Hour,
            Granule::Minute => FragmentKind::Minute,
            Granule::Second => FragmentKind::Second,
            Granule::Weekend => FragmentKind::Weekend,
        }
    }
}

/// Named pointer carried by a fragment or referent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    No,
    Begin,
    Center,
    End,
    Today,
    About,
    Winter,
    Spring,
    Summer,
    Autumn,
    Undefined,
}

impl PointerKind {
    /// Season number (winter = 1 .. autumn = 4).
    pub fn season(self) -> Option<i32> {
        match self {
            PointerKind::Winter => Some(1),
            PointerKind::Spring => Some(2),
            PointerKind::Summer => Some(3),
            PointerKind::Autumn => Some(4),
            _ => None,
        }
    }

    pub fn from_season(season: i32) -> PointerKind {
        match season {
            1 => PointerKind::Winter,
            2 => PointerKind::Spring,
            3 => PointerKind::Summer,
            4 => PointerKind::Autumn,
            _ => PointerKind::Undefined,
        }
    }
}

/// One recognized date or time component.
#[derive(Clone, PartialEq, Eq)]
pub struct DateFragment {
    pub kind: FragmentKind,
    pub value: i32,
    pub relative: bool,
    pub is_last: bool,
    /// Approximate value ("около", "примерно").
    pub not_strict: bool,
    pub pointer: PointerKind,
    /// −1 before the common era, +1 explicitly within it, 0 unmarked.
    pub new_era: i8,
    pub span: SpanRef,
    /// Character length of the number token this fragment was read from.
    pub digits: usize,
    /// The delimiter character for `Delimiter` fragments.
    pub delimiter: Option<char>,
    /// Alternative reading from a parenthesized "(new style)" date.
    pub new_style: Vec<DateFragment>,
}

impl std::fmt::Debug for DateFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FragmentKind::Delimiter => write!(f, "Delimiter {:?}", self.delimiter.unwrap_or('?'))?,
            FragmentKind::Pointer => write!(f, "Pointer {:?}", self.pointer)?,
            kind => {
                write!(f, "{:?} ", kind)?;
                if self.relative && self.value >= 0 {
                    f.write_str("+")?;
                }
                write!(f, "{}", self.value)?;
            }
        }
        if self.is_last {
            f.write_str(" last")?;
        }
        if self.not_strict {
            f.write_str(" ~")?;
        }
        match self.new_era {
            n if n < 0 => f.write_str(" BC")?,
            n if n > 0 => f.write_str(" AD")?,
            _ => {}
        }
        if !self.new_style.is_empty() {
            write!(f, " new_style={:?}", self.new_style)?;
        }
        Ok(())
    }
}

impl DateFragment {
    pub fn new(kind: FragmentKind, value: i32, span: SpanRef) -> Self {
        DateFragment {
            kind,
            value,
            relative: false,
            is_last: false,
            not_strict: false,
            pointer: PointerKind::No,
            new_era: 0,
            span,
            digits: 0,
            delimiter: None,
            new_style: Vec::new(),
        }
    }

    pub fn number(value: i32, digits: usize, span: SpanRef) -> Self {
        DateFragment {
            digits,
            ..DateFragment::new(FragmentKind::Number, value, span)
        }
    }

    pub fn relative(kind: FragmentKind, value: i32, span: SpanRef) -> Self {
        DateFragment {
            relative: true,
            ..DateFragment::new(kind, value, span)
        }
    }

    pub fn delimiter(ch: char, span: SpanRef) -> Self {
        DateFragment {
            delimiter: Some(ch),
            ..DateFragment::new(FragmentKind::Delimiter, 0, span)
        }
    }

    pub fn pointer(pointer: PointerKind, span: SpanRef) -> Self {
        DateFragment {
            pointer,
            ..DateFragment::new(FragmentKind::Pointer, 0, span)
        }
    }

    pub fn with_kind(&self, kind: FragmentKind) -> Self {
        DateFragment {
            kind,
            ..self.clone()
        }
    }

    pub fn with_value(&self, value: i32) -> Self {
        DateFragment {
            value,
            ..self.clone()
        }
    }

    pub fn with_span(&self, span: SpanRef) -> Self {
        DateFragment {
            span,
            ..self.clone()
        }
    }

    pub fn with_new_era(&self, new_era: i8) -> Self {
        DateFragment {
            new_era,
            ..self.clone()
        }
    }

    pub fn is_delimiter(&self, ch: char) -> bool {
        self.kind == FragmentKind::Delimiter && self.delimiter == Some(ch)
    }

    /// Calendar year denoted by a `Year` or year-like `Number`.
    ///
    /// Two-digit values map into 2000s up to `reference_year - 2000 + 5`,
    /// into 1900s above that.
    pub fn year(&self, config: &ParserConfig) -> i32 {
        let v = self.value;
        if self.new_era != 0 {
            return if self.new_era < 0 { -v } else { v };
        }
        if v == 0 || v >= 100 {
            return v;
        }
        if v < 16 || v <= config.two_digit_threshold() {
            2000 + v
        } else {
            1900 + v
        }
    }

    pub fn can_be_year(&self) -> bool {
        match self.kind {
            FragmentKind::Year => true,
            FragmentKind::Number => {
                (self.value >= 50 && self.value < 100 && self.digits == 2)
                    || (1000..=2100).contains(&self.value)
            }
            _ => false,
        }
    }

    pub fn can_be_month(&self) -> bool {
        match self.kind {
            FragmentKind::Month => true,
            FragmentKind::Number => self.digits <= 2 && (1..=12).contains(&self.value),
            _ => false,
        }
    }

    pub fn can_be_day(&self) -> bool {
        match self.kind {
            FragmentKind::Day => true,
            FragmentKind::Number => self.digits <= 2 && (1..=31).contains(&self.value),
            _ => false,
        }
    }

    pub fn can_be_hour(&self) -> bool {
        match self.kind {
            FragmentKind::Hour => true,
            FragmentKind::Number => self.digits <= 2 && (0..=23).contains(&self.value),
            _ => false,
        }
    }

    pub fn can_be_minute(&self) -> bool {
        match self.kind {
            FragmentKind::Minute => true,
            FragmentKind::Number => self.digits == 2 && (0..=59).contains(&self.value),
            _ => false,
        }
    }
}

/// A classified calendar component of a [`DateExpression`](crate::DateExpression).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpressionFragment {
    pub granule: Granule,
    pub value: i32,
    pub relative: bool,
    pub is_last: bool,
    pub not_strict: bool,
    pub span: Option<SpanRef>,
}

impl std::fmt::Debug for ExpressionFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ", self.granule)?;
        if self.relative && self.value >= 0 {
            f.write_str("+")?;
        }
        write!(f, "{}", self.value)?;
        if self.is_last {
            f.write_str(" last")?;
        }
        if self.not_strict {
            f.write_str(" ~")?;
        }
        Ok(())
    }
}

impl ExpressionFragment {
    pub fn absolute(granule: Granule, value: i32) -> Self {
        ExpressionFragment {
            granule,
            value,
            relative: false,
            is_last: false,
            not_strict: false,
            span: None,
        }
    }

    pub fn relative(granule: Granule, value: i32) -> Self {
        ExpressionFragment {
            relative: true,
            ..ExpressionFragment::absolute(granule, value)
        }
    }

    /// A relative "last" fragment (value 0 = the last one, −N = N before it).
    pub fn last(granule: Granule, value: i32) -> Self {
        ExpressionFragment {
            is_last: true,
            ..ExpressionFragment::relative(granule, value)
        }
    }

    pub fn with_span(mut self, span: SpanRef) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    /// Build from a recognized fragment of a calendar kind.
    pub fn from_fragment(fragment: &DateFragment, granule: Granule, value: i32) -> Self {
        ExpressionFragment {
            granule,
            value,
            relative: fragment.relative,
            is_last: fragment.is_last,
            not_strict: fragment.not_strict,
            span: Some(fragment.span),
        }
    }
}

/// Stable sort by granule, coarse first.
pub fn sort_fragments(items: &mut [ExpressionFragment]) {
    items.sort_by_key(|it| it.granule);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ParserConfig {
        ParserConfig::standard().with_reference_year(2024)
    }

    #[test]
    fn two_digit_year_window() {
        let span = SpanRef::new(0, 0);
        let cfg = config();
        assert_eq!(DateFragment::number(12, 2, span).year(&cfg), 2012);
        assert_eq!(DateFragment::number(29, 2, span).year(&cfg), 2029);
        assert_eq!(DateFragment::number(30, 2, span).year(&cfg), 1930);
        assert_eq!(DateFragment::number(99, 2, span).year(&cfg), 1999);
        assert_eq!(DateFragment::number(1812, 4, span).year(&cfg), 1812);
        let bc = DateFragment::new(FragmentKind::Year, 44, span).with_new_era(-1);
        assert_eq!(bc.year(&cfg), -44);
    }

    #[test]
    fn reclassification_builds_a_new_value() {
        let number = DateFragment::number(2023, 4, SpanRef::new(3, 3));
        let year = number.with_kind(FragmentKind::Year);
        assert_eq!(number.kind, FragmentKind::Number);
        assert_eq!(year.kind, FragmentKind::Year);
        assert_eq!(year.value, 2023);
    }

    #[test]
    fn capabilities() {
        let span = SpanRef::new(0, 0);
        assert!(DateFragment::number(31, 2, span).can_be_day());
        assert!(!DateFragment::number(32, 2, span).can_be_day());
        assert!(DateFragment::number(7, 1, span).can_be_month());
        assert!(DateFragment::number(75, 2, span).can_be_year());
        assert!(!DateFragment::number(75, 3, span).can_be_year());
        assert!(!DateFragment::new(FragmentKind::Quarter, 1, span).can_be_year());
        assert!(DateFragment::number(5, 2, span).can_be_minute());
        assert!(!DateFragment::number(5, 1, span).can_be_minute());
    }

    #[test]
    fn granules_sort_coarse_first() {
        let mut items = vec![
            ExpressionFragment::absolute(Granule::Day, 1),
            ExpressionFragment::absolute(Granule::Year, 2023),
            ExpressionFragment::absolute(Granule::Month, 3),
        ];
        sort_fragments(&mut items);
        let granules: Vec<Granule> = items.iter().map(|i| i.granule).collect();
        assert_eq!(granules, vec![Granule::Year, Granule::Month, Granule::Day]);
        assert_eq!(
            format!("{:?}", ExpressionFragment::last(Granule::Day, -3)),
            "Day -3 last"
        );
    }
}
