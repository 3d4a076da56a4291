//! Resolution of expression fragments into calendar values.
//!
//! [`ValueResolver::resolve`] walks the fragments coarse to fine, each
//! granule narrowing the value left by the coarser ones and defaulting from
//! the anchor instant. [`ValueResolver::generate_date`] then fills whatever
//! is still unset for the start or the end of the denoted period.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DateError, DateResult};
use crate::fragment::{sort_fragments, ExpressionFragment, Granule};

/// Resolved calendar fields; `0` means "not set, default from the anchor".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub year1: i32,
    pub year2: i32,
    pub month1: i32,
    pub month2: i32,
    pub day1: i32,
    pub day2: i32,
}

impl ResolvedValue {
    fn single(date: NaiveDate) -> Self {
        let mut value = ResolvedValue::default();
        value.set_start(date);
        value
    }

    fn set_start(&mut self, date: NaiveDate) {
        self.year1 = date.year();
        self.month1 = date.month() as i32;
        self.day1 = date.day() as i32;
        self.year2 = 0;
        self.month2 = 0;
        self.day2 = 0;
    }

    fn set_end(&mut self, date: NaiveDate) {
        self.year2 = date.year();
        self.month2 = date.month() as i32;
        self.day2 = date.day() as i32;
    }
}

/// Which occurrence an unanchored granule prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Tense {
    /// The occurrence already elapsed this year.
    Past,
    #[default]
    Unspecified,
    /// The next occurrence.
    Future,
}

impl Tense {
    pub fn from_sign(sign: i32) -> Tense {
        match sign.signum() {
            -1 => Tense::Past,
            1 => Tense::Future,
            _ => Tense::Unspecified,
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Tense::Past => -1,
            Tense::Unspecified => 0,
            Tense::Future => 1,
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in `month` of `year`, or 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: i32) -> i32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Move unit `current + offset` (1-based, `per_year` units a year) into
/// range, carrying the overflow into `year`.
fn wrap(current: i32, offset: i32, per_year: i32, year: i32) -> DateResult<(i32, i32)> {
    current
        .checked_add(offset)
        .and_then(|unit| unit.checked_sub(1))
        .and_then(|zero_based| {
            let carried = year.checked_add(zero_based.div_euclid(per_year))?;
            Some((zero_based.rem_euclid(per_year) + 1, carried))
        })
        .ok_or_else(|| invalid(year, current, 0))
}

/// `base + steps * size`, or an invalid value when it leaves `i32`.
fn offset_year(base: i32, steps: i32, size: i32) -> DateResult<i32> {
    steps
        .checked_mul(size)
        .and_then(|delta| base.checked_add(delta))
        .ok_or_else(|| invalid(base, 0, 0))
}

fn season_of_month(month: i32) -> i32 {
    match month {
        12 | 1 | 2 => 1,
        3..=5 => 2,
        6..=8 => 3,
        _ => 4,
    }
}

fn invalid(year: i32, month: i32, day: i32) -> DateError {
    debug!(year, month, day, "invalid calendar value");
    DateError::InvalidCalendarValue { year, month, day }
}

fn shift_days(date: NaiveDate, days: i64) -> DateResult<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| invalid(date.year(), date.month() as i32, date.day() as i32))
}

/// Replace "last" / "penultimate" day, month and quarter fragments that sit
/// under a known higher granule with the absolute value they denote.
///
/// "последний день 2 квартала" becomes month 6, day 30. Month lengths use an
/// absolute year of the phrase when there is one, a common year otherwise.
pub(crate) fn normalize_last(items: &[ExpressionFragment]) -> Vec<ExpressionFragment> {
    let mut out = items.to_vec();
    sort_fragments(&mut out);
    let year = out
        .iter()
        .find(|it| it.granule == Granule::Year && !it.relative && it.value > 0)
        .map_or(2001, |it| it.value);

    let mut i = 0;
    while i < out.len() {
        let it = out[i];
        if !it.is_last || !(it.value == 0 || it.value == -1) {
            i += 1;
            continue;
        }
        let v = it.value;
        let parent = i.checked_sub(1).map(|p| out[p]).filter(|p| !p.relative || p.granule == Granule::Year);
        let absolute = |granule: Granule, value: i32| ExpressionFragment {
            span: it.span,
            not_strict: it.not_strict,
            ..ExpressionFragment::absolute(granule, value)
        };
        match (it.granule, parent.map(|p| p.granule)) {
            (Granule::Day, Some(Granule::Month)) => {
                let month = parent.map_or(0, |p| p.value);
                out[i] = absolute(Granule::Day, days_in_month(year, month) + v);
            }
            (Granule::Day, Some(g @ (Granule::Quarter | Granule::HalfYear))) => {
                let p = parent.map_or(0, |p| p.value);
                let month = p.saturating_mul(if g == Granule::Quarter { 3 } else { 6 });
                out[i] = absolute(Granule::Day, days_in_month(year, month) + v);
                out.insert(i, absolute(Granule::Month, month));
                i += 1;
            }
            (Granule::Day, Some(Granule::Year)) => {
                out[i] = absolute(Granule::Day, 31 + v);
                out.insert(i, absolute(Granule::Month, 12));
                i += 1;
            }
            (Granule::Day, Some(Granule::Century)) => {
                out[i] = absolute(Granule::Day, 31 + v);
                out.insert(i, absolute(Granule::Month, 12));
                out.insert(i, ExpressionFragment::relative(Granule::Year, 99));
                i += 2;
            }
            (Granule::Month, Some(Granule::Quarter)) => {
                let q = parent.map_or(0, |p| p.value);
                out[i] = absolute(Granule::Month, q.saturating_mul(3) + v);
            }
            (Granule::Month, Some(Granule::HalfYear)) => {
                let h = parent.map_or(0, |p| p.value);
                out[i] = absolute(Granule::Month, h.saturating_mul(6) + v);
            }
            (Granule::Month, Some(Granule::Year | Granule::Decade | Granule::Century)) => {
                out[i] = absolute(Granule::Month, 12 + v);
            }
            (Granule::Quarter, Some(Granule::Year)) => {
                out[i] = absolute(Granule::Quarter, 4 + v);
            }
            (Granule::HalfYear, Some(Granule::Year)) => {
                out[i] = absolute(Granule::HalfYear, 2 + v);
            }
            _ => {}
        }
        i += 1;
    }
    out
}

/// Give a day of week the week it falls in.
fn attach_week(items: &mut Vec<ExpressionFragment>) -> DateResult<()> {
    let Some(j) = items.iter().position(|it| it.granule == Granule::DayOfWeek) else {
        return Ok(());
    };
    if j > 0 && items[j - 1].granule == Granule::Week {
        return Ok(());
    }
    let dow = items[j];
    let (week, day) = if !dow.relative {
        (0, dow.value)
    } else if dow.value < 0 {
        (-1, dow.value.checked_neg().ok_or_else(|| invalid(0, 0, dow.value))?)
    } else if dow.value > 7 {
        (1, dow.value - 7)
    } else {
        (0, dow.value)
    };
    items[j] = ExpressionFragment {
        relative: false,
        ..dow.with_value(day)
    };
    items.insert(j, ExpressionFragment::relative(Granule::Week, week));
    Ok(())
}

/// Resolves fragment lists against an anchor instant.
#[derive(Debug, Clone, Copy)]
pub struct ValueResolver {
    now: NaiveDateTime,
    tense: Tense,
}

impl ValueResolver {
    pub fn new(now: NaiveDateTime, tense: Tense) -> Self {
        ValueResolver { now, tense }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Pick the year of a block that has no stated year.
    fn tie_break(&self, value: i32, current: i32) -> i32 {
        let year = self.now.year();
        match self.tense {
            Tense::Past if value > current => year - 1,
            Tense::Future if value < current => year + 1,
            _ => year,
        }
    }

    pub fn resolve(&self, items: &[ExpressionFragment]) -> DateResult<ResolvedValue> {
        let today = self.now.date();
        let mut items = normalize_last(items);
        items.retain(|it| !it.granule.is_time());
        if items.is_empty() {
            return Ok(ResolvedValue::single(today));
        }
        attach_week(&mut items)?;

        let this_year = today.year();
        let this_month = today.month() as i32;
        let mut res = ResolvedValue::default();

        for (i, it) in items.iter().enumerate() {
            let v = it.value;
            let finer_follows = i + 1 < items.len();
            let previous = i.checked_sub(1).map(|p| items[p]);
            match it.granule {
                Granule::Century => {
                    if it.relative {
                        res.year1 = offset_year((this_year / 100) * 100, v, 100)?;
                        res.year2 = offset_year(res.year1, 1, 99)?;
                    } else if v > 0 {
                        res.year1 = offset_year(0, v - 1, 100)?.max(1);
                        res.year2 = offset_year(0, v, 100)? - 1;
                    } else if v < 0 {
                        // "V век до н.э." is 500..401 BC
                        res.year1 = offset_year(0, v, 100)?;
                        res.year2 = res.year1 + 99;
                    } else {
                        return Err(invalid(0, 0, 0));
                    }
                }
                Granule::Decade => {
                    let in_century = previous
                        .map_or(false, |p| p.granule == Granule::Century && !p.relative);
                    res.year1 = if it.relative {
                        offset_year((this_year / 10) * 10, v, 10)?
                    } else if in_century {
                        offset_year(res.year1, v.saturating_sub(1), 10)?
                    } else {
                        offset_year((this_year / 100) * 100, v, 10)?
                    };
                    res.year2 = offset_year(res.year1, 1, 9)?;
                    return Ok(res);
                }
                Granule::Year => {
                    if !it.relative {
                        res.year1 = v;
                        res.year2 = 0;
                    } else if res.year2 > res.year1 && v >= 0 {
                        res.year1 = offset_year(res.year1, v, 1)?;
                        res.year2 = res.year1;
                    } else {
                        res.year1 = offset_year(this_year, v, 1)?;
                        res.year2 = 0;
                    }
                }
                Granule::HalfYear => {
                    let half = if !it.relative {
                        if it.is_last || v == 2 {
                            2
                        } else {
                            1
                        }
                    } else {
                        let base = if res.year1 != 0 { res.year1 } else { this_year };
                        let current = if this_month > 6 { 2 } else { 1 };
                        let (half, year) = wrap(current, v, 2, base)?;
                        res.year1 = year;
                        half
                    };
                    res.month1 = if half == 2 { 7 } else { 1 };
                    res.month2 = res.month1 + 5;
                }
                Granule::Quarter => {
                    let current = 1 + (this_month - 1) / 3;
                    let quarter = if !it.relative {
                        if !(1..=4).contains(&v) {
                            return Err(invalid(res.year1, v, 0));
                        }
                        if res.year1 == 0 {
                            res.year1 = self.tie_break(v, current);
                        }
                        v
                    } else {
                        let base = if res.year1 != 0 { res.year1 } else { this_year };
                        let (quarter, year) = wrap(current, v, 4, base)?;
                        res.year1 = year;
                        quarter
                    };
                    res.month1 = (quarter - 1) * 3 + 1;
                    res.month2 = res.month1 + 2;
                    if !finer_follows {
                        return Ok(res);
                    }
                }
                Granule::Season => {
                    let current = season_of_month(this_month);
                    let season = v.checked_abs().unwrap_or(0);
                    if !(1..=4).contains(&season) {
                        return Err(invalid(res.year1, v, 0));
                    }
                    if res.year1 == 0 {
                        res.year1 = if !it.relative {
                            self.tie_break(season, current)
                        } else if v > 0 && season <= current {
                            this_year + 1
                        } else if v < 0 && season >= current {
                            this_year - 1
                        } else {
                            this_year
                        };
                    }
                    match season {
                        1 => {
                            res.year2 = res.year1;
                            res.year1 = offset_year(res.year1, -1, 1)?;
                            res.month1 = 12;
                            res.month2 = 2;
                        }
                        s => {
                            res.month1 = (s - 1) * 3;
                            res.month2 = res.month1 + 2;
                        }
                    }
                    if !finer_follows {
                        return Ok(res);
                    }
                }
                Granule::Month => {
                    if it.is_last && (v == 0 || v == -1) && (res.month2 != 0 || res.year1 != 0) {
                        res.month1 = (if res.month2 != 0 { res.month2 } else { 12 }) + v;
                    } else if !it.relative {
                        if !(1..=12).contains(&v) {
                            return Err(invalid(res.year1, v, 0));
                        }
                        if res.year1 == 0 {
                            res.year1 = self.tie_break(v, this_month);
                        }
                        res.month1 = v;
                    } else {
                        let base = if res.year1 != 0 { res.year1 } else { this_year };
                        let (month, year) = wrap(this_month, v, 12, base)?;
                        res.year1 = year;
                        res.month1 = month;
                    }
                    res.month2 = 0;
                }
                Granule::Weekend => {
                    if i != 0 {
                        continue;
                    }
                    let weekday = today.weekday().num_days_from_monday() as i64;
                    let to_saturday = match weekday {
                        5 => 0,
                        6 => -1,
                        d => 5 - d,
                    };
                    let start = shift_days(today, to_saturday + 7 * v as i64)?;
                    res.set_start(start);
                    res.set_end(shift_days(start, 1)?);
                    return Ok(res);
                }
                Granule::Week => {
                    if i != 0 || !it.relative {
                        continue;
                    }
                    let weekday = today.weekday().num_days_from_monday() as i64;
                    let start = shift_days(today, 7 * v as i64 - weekday)?;
                    res.set_start(start);
                    res.set_end(shift_days(start, 6)?);
                }
                Granule::Day => {
                    if it.is_last && (v == 0 || v == -1) && res.month1 != 0 {
                        let year = if res.year1 != 0 { res.year1 } else { this_year };
                        res.day1 = days_in_month(year, res.month1) + v;
                    } else if !it.relative {
                        if !(1..=31).contains(&v) {
                            return Err(invalid(res.year1, res.month1, v));
                        }
                        if res.month1 == 0 {
                            let today_day = today.day() as i32;
                            let shift = match self.tense {
                                Tense::Past if v > today_day => -1,
                                Tense::Future if v < today_day => 1,
                                _ => 0,
                            };
                            let base = if res.year1 != 0 { res.year1 } else { this_year };
                            let (month, year) = wrap(this_month, shift, 12, base)?;
                            res.year1 = year;
                            res.month1 = month;
                        }
                        res.day1 = v;
                    } else {
                        let date = shift_days(today, v as i64)?;
                        res.set_start(date);
                        continue;
                    }
                    res.month2 = 0;
                    res.day2 = 0;
                }
                Granule::DayOfWeek => {
                    let after_week = previous.map_or(false, |p| p.granule == Granule::Week);
                    if !after_week || !(1..=7).contains(&v) || res.day1 == 0 {
                        continue;
                    }
                    let start = NaiveDate::from_ymd_opt(res.year1, res.month1 as u32, res.day1 as u32)
                        .ok_or_else(|| invalid(res.year1, res.month1, res.day1))?;
                    res.set_start(shift_days(start, (v - 1) as i64)?);
                }
                Granule::Hour | Granule::Minute | Granule::Second => {}
            }
        }
        Ok(res)
    }

    /// Materialize the start (or, with `end_of_range`, the end) of a value.
    pub fn generate_date(&self, value: &ResolvedValue, end_of_range: bool) -> DateResult<NaiveDate> {
        let today = self.now.date();
        let mut year = if value.year1 != 0 { value.year1 } else { today.year() };
        if end_of_range && value.year2 > value.year1 {
            year = value.year2;
        }
        let mut month = if value.month1 > 0 {
            value.month1
        } else if end_of_range {
            12
        } else {
            1
        };
        if end_of_range && value.month2 > 0 {
            month = value.month2;
        }
        if year < 0 || year >= 9999 || !(1..=12).contains(&month) {
            return Err(invalid(year, month, value.day1));
        }
        let last = days_in_month(year, month);
        let day = if end_of_range && value.day2 > 0 {
            value.day2
        } else if value.day1 > 0 {
            value.day1
        } else if end_of_range {
            last
        } else {
            1
        };
        if day > last {
            return Err(invalid(year, month, day));
        }
        NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(|| invalid(year, month, day))
    }

    /// Apply the hour, minute and second fragments of `items` to `date`.
    pub fn correct_hours(&self, date: NaiveDate, items: &[ExpressionFragment]) -> DateResult<NaiveDateTime> {
        let at = |date: NaiveDate, hour: u32, minute: u32| {
            date.and_hms_opt(hour, minute, 0)
                .ok_or_else(|| invalid(date.year(), date.month() as i32, date.day() as i32))
        };
        let shift = |dt: NaiveDateTime, by: Duration| {
            dt.checked_add_signed(by)
                .ok_or_else(|| invalid(dt.year(), dt.month() as i32, dt.day() as i32))
        };
        let mut items = items.to_vec();
        sort_fragments(&mut items);
        let mut dt = at(date, 0, 0)?;
        let mut has_hour = false;
        for it in items.iter().filter(|it| it.granule.is_time()) {
            let v = it.value;
            match it.granule {
                Granule::Hour => {
                    has_hour = true;
                    if it.relative {
                        dt = shift(at(dt.date(), self.now.hour(), self.now.minute())?, Duration::hours(v as i64))?;
                    } else if (0..=23).contains(&v) {
                        dt = at(dt.date(), v as u32, 0)?;
                    }
                }
                Granule::Minute => {
                    if !has_hour {
                        dt = at(dt.date(), self.now.hour(), 0)?;
                    }
                    if it.relative {
                        dt = shift(at(dt.date(), dt.hour(), 0)?, Duration::minutes(v as i64))?;
                        if !has_hour {
                            dt = shift(dt, Duration::minutes(self.now.minute() as i64))?;
                        }
                    } else if (0..=59).contains(&v) {
                        dt = at(dt.date(), dt.hour(), v as u32)?;
                    }
                }
                Granule::Second => {
                    if it.relative {
                        dt = shift(dt, Duration::seconds(v as i64))?;
                    } else if let Some(with_second) = (0..=59)
                        .contains(&v)
                        .then(|| dt.with_second(v as u32))
                        .flatten()
                    {
                        dt = with_second;
                    }
                }
                _ => {}
            }
        }
        Ok(dt)
    }

    /// Start of the date denoted by `items`, with its clock time.
    pub fn date(&self, items: &[ExpressionFragment]) -> DateResult<NaiveDateTime> {
        let value = self.resolve(items)?;
        let date = self.generate_date(&value, false)?;
        self.correct_hours(date, items)
    }

    /// First and last instant of a `from..to` expression; either side may be
    /// empty.
    pub fn date_range(
        &self,
        from: &[ExpressionFragment],
        to: &[ExpressionFragment],
    ) -> DateResult<(NaiveDateTime, NaiveDateTime)> {
        let (from, to) = if from.is_empty() { (to, from) } else { (from, to) };
        let has_hours = from
            .iter()
            .chain(to)
            .any(|it| matches!(it.granule, Granule::Hour | Granule::Minute));
        if has_hours {
            let dates_only = |items: &[ExpressionFragment]| -> Vec<ExpressionFragment> {
                items.iter().filter(|it| !it.granule.is_time()).copied().collect()
            };
            let merged = merge_sides(&dates_only(from), &dates_only(to));
            let value = self.resolve(&merged)?;
            let date = self.generate_date(&value, false)?;
            let start = self.correct_hours(date, from)?;
            let end = self.correct_hours(date, if to.is_empty() { from } else { to })?;
            return Ok((start, end));
        }

        let coarse = from
            .iter()
            .any(|it| matches!(it.granule, Granule::Century | Granule::Decade));
        if to.is_empty() && !coarse {
            let value = self.resolve(from)?;
            let start = self.generate_date(&value, false)?;
            let end = self.generate_date(&value, true).unwrap_or(start);
            return Ok((self.correct_hours(start, &[])?, self.correct_hours(end, &[])?));
        }

        let first = self.resolve(&merge_sides(from, to))?;
        let second = self.resolve(&merge_sides(to, from))?;
        let start = self.generate_date(&first, false)?;
        let end = self.generate_date(&second, true)?;
        Ok((self.correct_hours(start, &[])?, self.correct_hours(end, &[])?))
    }
}

/// `primary` plus the granules of `fallback` it does not carry.
pub(crate) fn merge_sides(
    primary: &[ExpressionFragment],
    fallback: &[ExpressionFragment],
) -> Vec<ExpressionFragment> {
    let mut merged = primary.to_vec();
    for it in fallback {
        if !primary.iter().any(|p| p.granule == it.granule) {
            merged.push(*it);
        }
    }
    sort_fragments(&mut merged);
    merged
}
