use crate::{create_line_from_string, Lexicon, ParserConfig, PrimitiveParser};

fn config() -> ParserConfig {
    ParserConfig::standard().with_reference_year(2024)
}

/// Debug form of the fragment recognized at the `nth` significant token.
fn recognize_at(input: &str, nth: usize) -> String {
    let line = create_line_from_string(input);
    let config = config();
    let mut parser = PrimitiveParser::new(Lexicon::builtin(), &config);
    let cur = line.selection().cursors().nth(nth).unwrap();
    format!("{:?}", parser.recognize(cur, &[]))
}

fn recognize(input: &str) -> String {
    recognize_at(input, 0)
}

#[test]
fn year_with_unit_word() {
    insta::assert_snapshot!(recognize("2023 году"), @"Some(Year 2023)");
    insta::assert_snapshot!(recognize("1999 г."), @"Some(Year 1999)");
}

#[test]
fn relative_offsets() {
    insta::assert_snapshot!(recognize("3 дня назад"), @"Some(Day -3)");
    insta::assert_snapshot!(recognize("3 days ago"), @"Some(Day -3)");
    insta::assert_snapshot!(recognize_at("через 2 недели", 1), @"Some(Day +14)");
}

#[test]
fn modified_units() {
    insta::assert_snapshot!(recognize("прошлом году"), @"Some(Year -1)");
    insta::assert_snapshot!(recognize("следующем месяце"), @"Some(Month +1)");
    insta::assert_snapshot!(recognize("последние 3 дня"), @"Some(Day -3 last)");
    insta::assert_snapshot!(recognize("первом квартале"), @"Some(Quarter 1)");
}

#[test]
fn day_words() {
    insta::assert_snapshot!(recognize("вчера"), @"Some(Day -1)");
    insta::assert_snapshot!(recognize("послезавтра"), @"Some(Day +2)");
}

#[test]
fn roman_numerals_before_units() {
    insta::assert_snapshot!(recognize("XIX век"), @"Some(Century 19)");
    insta::assert_snapshot!(recognize("II квартал"), @"Some(Quarter 2)");
}

#[test]
fn present_time_pointer() {
    insta::assert_snapshot!(recognize_at("в настоящее время", 1), @"Some(Pointer Today)");
}

#[test]
fn era_marker() {
    insta::assert_snapshot!(recognize("44 г. до н.э."), @"Some(Year 44 BC)");
}

#[test]
fn numbers_stay_plain_without_context() {
    insta::assert_snapshot!(recognize("15.03.2023"), @"Some(Number 15)");
    insta::assert_snapshot!(recognize("сотрудник"), @"None");
}

#[test]
fn time_of_day() {
    insta::assert_snapshot!(recognize("7 вечера"), @"Some(Hour 19)");
    insta::assert_snapshot!(recognize("12 ночи"), @"Some(Hour 0)");
}

#[test]
fn recursion_is_bounded() {
    let input = format!("{}года", "прошлого ".repeat(15));
    let line = create_line_from_string(&input);
    let config = config();
    let mut parser = PrimitiveParser::new(Lexicon::builtin(), &config);
    let cur = line.first_cursor().unwrap();
    assert_eq!(parser.recognize(cur, &[]), None);
    assert!(parser.take_recursion_exceeded());
    assert!(!parser.take_recursion_exceeded());
}

fn every_position(input: &str, config: &ParserConfig) -> Vec<String> {
    let line = create_line_from_string(input);
    let mut parser = PrimitiveParser::new(Lexicon::builtin(), config);
    if config.speed_regime {
        parser.prepare(&line);
    }
    let cursors: Vec<_> = line.selection().cursors().collect();
    cursors
        .into_iter()
        .filter_map(|cur| parser.recognize(cur, &[]))
        .map(|f| format!("{:?}", f))
        .collect()
}

#[test]
fn speed_regime_matches_fresh_recognition() {
    let input = "в 2023 году и 3 дня назад";
    let fresh = every_position(input, &config());
    let memoized = every_position(input, &config().with_speed_regime(true));
    assert_eq!(fresh, memoized);
    insta::assert_snapshot!(fresh.join(", "), @"Year 2023, Year 0, Day -3, Day -1");
}

#[test]
fn week_count_too_large_for_days_stays_a_number() {
    insta::assert_snapshot!(recognize_at("через 400000000 недель", 1), @"Some(Number 400000000)");
}
