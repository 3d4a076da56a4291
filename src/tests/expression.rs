use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    create_line_from_string, DateError, DateExpression, DateExpressionResolver, DateResult, ExpressionParser,
    LLLineDisplay, Lexicon, ParserConfig, PrimitiveParser, SpanRef, Tense,
};

fn config() -> ParserConfig {
    ParserConfig::standard().with_reference_year(2024)
}

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(hh, mm, 0))
        .unwrap()
}

/// 2024-06-15 is a Saturday.
fn now() -> NaiveDateTime {
    at(2024, 6, 15, 10, 30)
}

fn parse(input: &str) -> DateResult<DateExpression> {
    let line = create_line_from_string(input);
    let config = config();
    let mut parser = PrimitiveParser::new(Lexicon::builtin(), &config);
    let cur = line.first_cursor().unwrap();
    ExpressionParser::new(&mut parser).parse(cur)
}

fn debug(input: &str) -> String {
    match parse(input) {
        Ok(expr) => format!("{:?}", expr),
        Err(e) => format!("Err({:?})", e),
    }
}

fn test_dates(input: &str) -> String {
    let ll_line = create_line_from_string(input).run(&DateExpressionResolver::new(Lexicon::builtin(), config()));

    let mut display = LLLineDisplay::new(&ll_line);
    display.include::<DateExpression>();

    format!("{}", display)
}

fn range(input: &str, tense: Tense) -> Option<(NaiveDateTime, NaiveDateTime)> {
    parse(input).ok()?.to_date_range(now(), tense)
}

#[test]
fn day_range_within_months() {
    insta::assert_snapshot!(test_dates("с 1 марта по 5 мая"), @r###"
    с     1     марта     по     5     мая
    ╰────────────────────────────────────╯DateExpression(fr: Month 3; Day 1 | to: Month 5; Day 5)
    "###);
}

#[test]
fn period_phrase_inside_a_sentence() {
    insta::assert_snapshot!(test_dates("Отчёт за период с 1 по 5 марта 2023 года"), @r###"
    Отчёт     за     период     с     1     по     5     марта     2023     года
              ╰────────────────────────────────────────────────────────────────╯DateExpression(fr: Day 1 | to: Year 2023; Month 3; Day 5)
    "###);
    assert_eq!(
        range("за период с 1 по 5 марта 2023 года", Tense::Unspecified),
        Some((at(2023, 3, 1, 0, 0), at(2023, 3, 5, 0, 0)))
    );
}

#[test]
fn numeric_date_then_time() {
    insta::assert_snapshot!(test_dates("встреча 15.03.2023 в 10:30"), @r###"
    встреча     15  .  03  .  2023     в     10  :  30
                ╰────────────────────────────────────╯DateExpression(Year 2023; Month 3; Day 15; Hour 10; Minute 30)
    "###);
    let expr = parse("15.03.2023 в 10:30").unwrap();
    assert_eq!(expr.to_date(now(), Tense::Unspecified), Some(at(2023, 3, 15, 10, 30)));
}

#[test]
fn english_month_range() {
    insta::assert_snapshot!(test_dates("from March 2023 to June 2023"), @r###"
    from     March     2023     to     June     2023
    ╰──────────────────────────────────────────────╯DateExpression(fr: Year 2023; Month 3 | to: Year 2023; Month 6)
    "###);
    assert_eq!(
        range("from March 2023 to June 2023", Tense::Unspecified),
        Some((at(2023, 3, 1, 0, 0), at(2023, 6, 30, 0, 0)))
    );
}

#[test]
fn relative_days() {
    insta::assert_snapshot!(test_dates("3 дня назад"), @r###"
    3     дня     назад
    ╰─────────────────╯DateExpression(Day -3)
    "###);
    let expr = parse("3 дня назад").unwrap();
    assert_eq!(
        expr.to_date(at(2024, 1, 2, 9, 0), Tense::Unspecified),
        Some(at(2023, 12, 30, 0, 0))
    );
    insta::assert_snapshot!(debug("3 days ago"), @"DateExpression(Day -3)");
}

#[test]
fn hyphen_splits_a_year_range() {
    insta::assert_snapshot!(test_dates("2020-2023 гг."), @r###"
    2020  -  2023     гг  .
    ╰─────────────────────╯DateExpression(fr: Year 2020 | to: Year 2023)
    "###);
    assert_eq!(
        range("2020-2023 гг.", Tense::Unspecified),
        Some((at(2020, 1, 1, 0, 0), at(2023, 12, 31, 0, 0)))
    );
}

#[test]
fn bare_numbers_take_the_granule_of_the_other_side() {
    insta::assert_snapshot!(debug("с 1 по 5 марта"), @"DateExpression(fr: Day 1 | to: Month 3; Day 5)");
    insta::assert_snapshot!(debug("в 2023"), @"DateExpression(Year 2023)");
    assert_eq!(parse("в 2023").unwrap().span, SpanRef::new(2, 2));
    insta::assert_snapshot!(debug("в 10"), @"Err(NoMatch)");
}

#[test]
fn last_day_of_a_quarter() {
    insta::assert_snapshot!(
        debug("последний день 2 квартала 2024 года"),
        @"DateExpression(Year 2024; Quarter 2; Day +0 last)"
    );
    let expr = parse("последний день 2 квартала 2024 года").unwrap();
    assert_eq!(expr.to_date(now(), Tense::Unspecified), Some(at(2024, 6, 30, 0, 0)));
}

#[test]
fn last_n_days_run_up_to_today() {
    insta::assert_snapshot!(debug("последние 3 дня"), @"DateExpression(fr: Day -3 last | to: Day +0)");
    assert_eq!(
        range("последние 3 дня", Tense::Unspecified),
        Some((at(2024, 6, 12, 0, 0), at(2024, 6, 15, 0, 0)))
    );
}

#[test]
fn quarter_without_year_follows_the_tense() {
    insta::assert_snapshot!(debug("в первом квартале"), @"DateExpression(Quarter 1)");
    assert_eq!(
        range("в первом квартале", Tense::Past),
        Some((at(2024, 1, 1, 0, 0), at(2024, 3, 31, 0, 0)))
    );
    assert_eq!(
        range("в первом квартале", Tense::Future),
        Some((at(2025, 1, 1, 0, 0), at(2025, 3, 31, 0, 0)))
    );
}

#[test]
fn weekday_resolves_inside_the_current_week() {
    let expr = parse("в понедельник").unwrap();
    insta::assert_snapshot!(format!("{:?}", expr), @"DateExpression(DayOfWeek 1)");
    assert_eq!(expr.to_date(now(), Tense::Unspecified), Some(at(2024, 6, 10, 0, 0)));
}

#[test]
fn clock_time_applies_to_today() {
    let expr = parse("в 10:30").unwrap();
    insta::assert_snapshot!(format!("{:?}", expr), @"DateExpression(Hour 10; Minute 30)");
    assert_eq!(expr.to_date(at(2024, 6, 15, 8, 0), Tense::Unspecified), Some(at(2024, 6, 15, 10, 30)));
}

#[test]
fn present_time_pointer() {
    insta::assert_snapshot!(debug("в настоящее время"), @"DateExpression([Today] Day +0)");
}

#[test]
fn nonexistent_calendar_day() {
    let expr = parse("30 февраля 2023 года").unwrap();
    insta::assert_snapshot!(format!("{:?}", expr), @"DateExpression(Year 2023; Month 2; Day 30)");
    assert_eq!(expr.to_date(now(), Tense::Unspecified), None);
}

#[test]
fn rejected_phrases() {
    insta::assert_snapshot!(debug("день недели"), @"Err(NoMatch)");
    insta::assert_snapshot!(debug("последний"), @"Err(NoMatch)");
    insta::assert_snapshot!(debug("стоимость 2000 рублей"), @"Err(NoMatch)");
    assert_eq!(test_dates("5 кг"), "5     кг");
}

#[test]
fn recursion_limit_is_reported() {
    let input = format!("{}года", "прошлого ".repeat(15));
    assert_eq!(parse(&input), Err(DateError::RecursionLimitExceeded { depth: 10 }));

    // the tail of the phrase is still short enough to read
    let ll_line = create_line_from_string(&input).run(&DateExpressionResolver::new(Lexicon::builtin(), config()));
    let found: Vec<String> = ll_line
        .attrs_by::<DateExpression>()
        .iter()
        .map(|(_, expr)| format!("{:?}", expr))
        .collect();
    assert_eq!(found, vec!["DateExpression(Year -1)".to_string()]);
}

#[test]
fn speed_regime_finds_the_same_expressions() {
    let input = "Отчёт за период с 1 по 5 марта 2023 года и 3 дня назад";
    let run = |config: ParserConfig| -> Vec<String> {
        create_line_from_string(input)
            .run(&DateExpressionResolver::new(Lexicon::builtin(), config))
            .attrs_by::<DateExpression>()
            .iter()
            .map(|(span, expr)| format!("{:?} {:?}", span, expr))
            .collect()
    };
    assert_eq!(run(config()), run(config().with_speed_regime(true)));
}
