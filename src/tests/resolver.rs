use chrono::{NaiveDate, NaiveDateTime};

use crate::{DateError, ExpressionFragment, Granule, ResolvedValue, Tense, ValueResolver};

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(hh, mm, 0))
        .unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    at(y, m, d, 0, 0)
}

fn abs(granule: Granule, value: i32) -> ExpressionFragment {
    ExpressionFragment::absolute(granule, value)
}

fn rel(granule: Granule, value: i32) -> ExpressionFragment {
    ExpressionFragment::relative(granule, value)
}

/// Saturday, 2024-06-15 10:30.
fn resolver(tense: Tense) -> ValueResolver {
    ValueResolver::new(at(2024, 6, 15, 10, 30), tense)
}

fn period(items: &[ExpressionFragment]) -> (NaiveDateTime, NaiveDateTime) {
    resolver(Tense::Unspecified).date_range(items, &[]).unwrap()
}

#[test]
fn quarter_tie_break() {
    let q1 = [abs(Granule::Quarter, 1)];
    assert_eq!(
        resolver(Tense::Past).date_range(&q1, &[]),
        Ok((day(2024, 1, 1), day(2024, 3, 31)))
    );
    assert_eq!(
        resolver(Tense::Future).date_range(&q1, &[]),
        Ok((day(2025, 1, 1), day(2025, 3, 31)))
    );
    assert_eq!(
        resolver(Tense::Unspecified).date_range(&q1, &[]),
        Ok((day(2024, 1, 1), day(2024, 3, 31)))
    );
}

#[test]
fn month_tie_break() {
    let august = [abs(Granule::Month, 8)];
    assert_eq!(resolver(Tense::Past).date(&august), Ok(day(2023, 8, 1)));
    assert_eq!(resolver(Tense::Future).date(&august), Ok(day(2024, 8, 1)));
    assert_eq!(resolver(Tense::Unspecified).date(&august), Ok(day(2024, 8, 1)));
}

#[test]
fn day_without_month_follows_the_tense() {
    let day_20 = |year: Option<i32>| {
        let mut items = vec![abs(Granule::Day, 20)];
        items.extend(year.map(|y| abs(Granule::Year, y)));
        items
    };
    assert_eq!(resolver(Tense::Past).date(&day_20(None)), Ok(day(2024, 5, 20)));
    assert_eq!(resolver(Tense::Past).date(&day_20(Some(2023))), Ok(day(2023, 5, 20)));
    assert_eq!(resolver(Tense::Unspecified).date(&day_20(Some(2023))), Ok(day(2023, 6, 20)));
    assert_eq!(
        resolver(Tense::Future).date(&[abs(Granule::Year, 2023), abs(Granule::Day, 10)]),
        Ok(day(2023, 7, 10))
    );
    // the month carries into the previous year
    let january = ValueResolver::new(day(2024, 1, 5), Tense::Past);
    assert_eq!(january.date(&day_20(Some(2023))), Ok(day(2022, 12, 20)));
}

#[test]
fn relative_month_wraps_the_year() {
    let r = ValueResolver::new(day(2024, 1, 15), Tense::Unspecified);
    assert_eq!(
        r.date_range(&[rel(Granule::Month, -1)], &[]),
        Ok((day(2023, 12, 1), day(2023, 12, 31)))
    );
}

#[test]
fn relative_day_crosses_the_year() {
    let r = ValueResolver::new(day(2024, 1, 2), Tense::Unspecified);
    assert_eq!(r.date(&[rel(Granule::Day, -3)]), Ok(day(2023, 12, 30)));
}

#[test]
fn century_and_decade() {
    assert_eq!(period(&[abs(Granule::Century, 19)]), (day(1800, 1, 1), day(1899, 12, 31)));
    assert_eq!(
        period(&[abs(Granule::Century, 20), abs(Granule::Decade, 9)]),
        (day(1980, 1, 1), day(1989, 12, 31))
    );
}

#[test]
fn bc_century() {
    assert_eq!(
        resolver(Tense::Unspecified).resolve(&[abs(Granule::Century, -5)]),
        Ok(ResolvedValue {
            year1: -500,
            year2: -401,
            ..ResolvedValue::default()
        })
    );
    assert!(resolver(Tense::Unspecified).date(&[abs(Granule::Century, -5)]).is_err());
    assert!(resolver(Tense::Unspecified).resolve(&[abs(Granule::Century, 0)]).is_err());
}

#[test]
fn offsets_beyond_the_calendar_are_invalid() {
    let r = resolver(Tense::Unspecified);
    let granules = [
        Granule::Century,
        Granule::Decade,
        Granule::Year,
        Granule::HalfYear,
        Granule::Quarter,
        Granule::Month,
        Granule::Week,
        Granule::Day,
    ];
    for granule in granules {
        for value in [i32::MAX, i32::MIN] {
            assert!(
                matches!(r.date(&[rel(granule, value)]), Err(DateError::InvalidCalendarValue { .. })),
                "{:?} {}",
                granule,
                value
            );
        }
    }
    for granule in [Granule::Century, Granule::Decade] {
        assert!(matches!(
            r.date(&[abs(granule, i32::MAX)]),
            Err(DateError::InvalidCalendarValue { .. })
        ));
    }
    assert!(r.date(&[abs(Granule::Century, 20), abs(Granule::Decade, i32::MAX)]).is_err());
}

#[test]
fn half_year_and_season() {
    assert_eq!(
        period(&[abs(Granule::Year, 2023), abs(Granule::HalfYear, 2)]),
        (day(2023, 7, 1), day(2023, 12, 31))
    );
    assert_eq!(
        period(&[abs(Granule::Year, 2023), abs(Granule::Season, 3)]),
        (day(2023, 6, 1), day(2023, 8, 31))
    );
    // winter of 2024 starts in December 2023
    assert_eq!(
        period(&[abs(Granule::Year, 2024), abs(Granule::Season, 1)]),
        (day(2023, 12, 1), day(2024, 2, 29))
    );
}

#[test]
fn weekend_on_a_saturday() {
    assert_eq!(period(&[rel(Granule::Weekend, 0)]), (day(2024, 6, 15), day(2024, 6, 16)));
    assert_eq!(period(&[rel(Granule::Weekend, 1)]), (day(2024, 6, 22), day(2024, 6, 23)));
}

#[test]
fn last_day_of_february() {
    let items = [
        abs(Granule::Year, 2024),
        abs(Granule::Month, 2),
        ExpressionFragment::last(Granule::Day, 0),
    ];
    assert_eq!(resolver(Tense::Unspecified).date(&items), Ok(day(2024, 2, 29)));
}

#[test]
fn nonexistent_day_is_an_error() {
    let r = resolver(Tense::Unspecified);
    let items = [abs(Granule::Year, 2023), abs(Granule::Month, 2), abs(Granule::Day, 30)];
    let value = r.resolve(&items).unwrap();
    assert_eq!(
        value,
        ResolvedValue {
            year1: 2023,
            month1: 2,
            day1: 30,
            ..ResolvedValue::default()
        }
    );
    assert_eq!(
        r.generate_date(&value, false),
        Err(DateError::InvalidCalendarValue {
            year: 2023,
            month: 2,
            day: 30
        })
    );
    assert!(!DateError::InvalidCalendarValue { year: 2023, month: 2, day: 30 }.is_no_match());
}

#[test]
fn clock_time() {
    let r = resolver(Tense::Unspecified);
    assert_eq!(
        r.date(&[abs(Granule::Hour, 9), abs(Granule::Minute, 5)]),
        Ok(at(2024, 6, 15, 9, 5))
    );
    assert_eq!(r.date(&[rel(Granule::Hour, 2)]), Ok(at(2024, 6, 15, 12, 30)));
    assert_eq!(r.date(&[rel(Granule::Minute, 30)]), Ok(at(2024, 6, 15, 11, 0)));
}

#[test]
fn time_range_shares_the_date() {
    let from = [abs(Granule::Day, 1), abs(Granule::Month, 3), abs(Granule::Hour, 9)];
    let to = [abs(Granule::Hour, 18)];
    assert_eq!(
        resolver(Tense::Unspecified).date_range(&from, &to),
        Ok((at(2024, 3, 1, 9, 0), at(2024, 3, 1, 18, 0)))
    );
}

#[test]
fn open_range_takes_the_other_side() {
    let to = [abs(Granule::Year, 2023), abs(Granule::Month, 5)];
    assert_eq!(
        resolver(Tense::Unspecified).date_range(&[], &to),
        Ok((day(2023, 5, 1), day(2023, 5, 31)))
    );
}

#[test]
fn tense_sign() {
    assert_eq!(Tense::from_sign(-5), Tense::Past);
    assert_eq!(Tense::from_sign(0), Tense::Unspecified);
    assert_eq!(Tense::Future.sign(), 1);
}
