use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use crate::{
    create_line_from_string, days_in_month, describe, ExpressionFragment, ExpressionParser, Granule, Lexicon,
    ParserConfig, PointerKind, PrimitiveParser, ReferentArena, ReferentBridge, ReferentHandle, Tense,
    ValueResolver,
};

fn anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .unwrap()
}

fn resolver() -> ValueResolver {
    ValueResolver::new(anchor(), Tense::Unspecified)
}

const CALENDAR: [Granule; 11] = [
    Granule::Century,
    Granule::Decade,
    Granule::Year,
    Granule::HalfYear,
    Granule::Quarter,
    Granule::Season,
    Granule::Month,
    Granule::Week,
    Granule::Day,
    Granule::DayOfWeek,
    Granule::Weekend,
];

const TIME: [Granule; 3] = [Granule::Hour, Granule::Minute, Granule::Second];

fn fragment(granules: Vec<Granule>, values: impl Strategy<Value = i32>) -> impl Strategy<Value = ExpressionFragment> {
    (proptest::sample::select(granules), values, any::<bool>(), any::<bool>()).prop_map(
        |(granule, value, relative, is_last)| ExpressionFragment {
            relative,
            is_last,
            ..ExpressionFragment::absolute(granule, value)
        },
    )
}

/// Calendar fragments of plausible magnitude, absolute or relative, some of
/// them "last".
fn calendar_items() -> impl Strategy<Value = Vec<ExpressionFragment>> {
    proptest::collection::vec(fragment(CALENDAR.to_vec(), -40i32..2100), 1..5)
}

/// Any granule with any value.
fn arbitrary_items() -> impl Strategy<Value = Vec<ExpressionFragment>> {
    let all: Vec<Granule> = CALENDAR.iter().chain(TIME.iter()).copied().collect();
    proptest::collection::vec(fragment(all, any::<i32>()), 0..5)
}

proptest! {
    #[test]
    fn generated_days_exist(year in 1900i32..2100, month in 1i32..=12, day in 1i32..=31) {
        let items = [
            ExpressionFragment::absolute(Granule::Year, year),
            ExpressionFragment::absolute(Granule::Month, month),
            ExpressionFragment::absolute(Granule::Day, day),
        ];
        let result = resolver().date(&items);
        if day <= days_in_month(year, month) {
            let date = result.unwrap().date();
            prop_assert_eq!(date.year(), year);
            prop_assert_eq!(date.month() as i32, month);
            prop_assert_eq!(date.day() as i32, day);
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn finer_granule_narrows_the_period(year in 1900i32..2100, month in 1i32..=12) {
        let r = resolver();
        let year_only = [ExpressionFragment::absolute(Granule::Year, year)];
        let with_month = [
            ExpressionFragment::absolute(Granule::Year, year),
            ExpressionFragment::absolute(Granule::Month, month),
        ];
        let (year_start, year_end) = r.date_range(&year_only, &[]).unwrap();
        let (month_start, month_end) = r.date_range(&with_month, &[]).unwrap();
        prop_assert!(year_start <= month_start);
        prop_assert!(month_start <= month_end);
        prop_assert!(month_end <= year_end);
    }

    #[test]
    fn relative_day_offsets_are_exact(offset in -400i32..400) {
        let items = [ExpressionFragment::relative(Granule::Day, offset)];
        let expected = anchor().date() + Duration::days(offset as i64);
        prop_assert_eq!(resolver().date(&items).unwrap().date(), expected);
    }

    #[test]
    fn stored_referents_resolve_like_their_items(items in calendar_items()) {
        let mut arena = ReferentArena::new();
        let id = ReferentBridge::from_items(&mut arena, &items, PointerKind::No).unwrap();
        let stored = ReferentBridge::to_items(&arena, id, crate::SpanRef::new(0, 0));
        for tense in [Tense::Past, Tense::Unspecified, Tense::Future] {
            let r = ValueResolver::new(anchor(), tense);
            prop_assert_eq!(r.resolve(&items), r.resolve(&stored));
        }
    }

    #[test]
    fn resolution_never_panics(items in arbitrary_items(), to in arbitrary_items()) {
        for tense in [Tense::Past, Tense::Unspecified, Tense::Future] {
            let r = ValueResolver::new(anchor(), tense);
            let _ = r.date(&items);
            let _ = r.date_range(&items, &to);
            if let Ok(value) = r.resolve(&items) {
                let _ = r.generate_date(&value, false);
                let _ = r.generate_date(&value, true);
            }
        }

        let mut arena = ReferentArena::new();
        if let Some(id) = ReferentBridge::from_items(&mut arena, &items, PointerKind::No) {
            let _ = describe(&arena, id);
            let _ = arena.century(id);
            let _ = ReferentBridge::calculate_date_range(&arena, ReferentHandle::Date(id), anchor(), Tense::Past);
        }
    }

    #[test]
    fn large_counts_in_text_never_panic(n in any::<u32>(), unit in proptest::sample::select(vec![
        "недель", "дней", "лет", "месяцев", "кварталов", "веков", "часов", "weeks", "years",
    ])) {
        let config = ParserConfig::standard().with_reference_year(2024);
        for text in [format!("через {} {}", n, unit), format!("{} {} назад", n, unit)] {
            let line = create_line_from_string(&text);
            let mut parser = PrimitiveParser::new(Lexicon::builtin(), &config);
            if let Ok(expr) = ExpressionParser::new(&mut parser).parse(line.first_cursor().unwrap()) {
                let _ = expr.to_date_range(anchor(), Tense::Unspecified);
            }
        }
    }
}
