use crate::{create_line_from_string, ChainBuilder, Lexicon, ParserConfig, PrimitiveParser};

fn chain(input: &str) -> String {
    let line = create_line_from_string(input);
    let config = ParserConfig::standard().with_reference_year(2024);
    let mut parser = PrimitiveParser::new(Lexicon::builtin(), &config);
    let cur = line.first_cursor().unwrap();
    format!("{:?}", ChainBuilder::new(&mut parser).build(cur))
}

#[test]
fn day_month_year() {
    insta::assert_snapshot!(chain("15 марта 2023 года"), @"Some([Number 15, Month 3, Year 2023])");
}

#[test]
fn clock_time_keeps_delimiters() {
    insta::assert_snapshot!(chain("10:30"), @"Some([Number 10, Delimiter ':', Number 30])");
}

#[test]
fn comma_between_month_and_year() {
    insta::assert_snapshot!(chain("март, 2023"), @"Some([Month 3, Number 2023])");
}

#[test]
fn number_after_quarter_is_a_year() {
    insta::assert_snapshot!(chain("2 квартал 2023"), @"Some([Quarter 2, Year 2023])");
}

#[test]
fn measures_and_counted_nouns_are_dropped() {
    insta::assert_snapshot!(chain("5 кг"), @"None");
    insta::assert_snapshot!(chain("2 сотрудника"), @"None");
}

#[test]
fn lone_last_needs_a_period() {
    insta::assert_snapshot!(chain("последний квартал"), @"None");
    insta::assert_snapshot!(chain("последний квартал 2024 года"), @"Some([Quarter +0 last, Year 2024])");
}

#[test]
fn crossing_a_line_break() {
    insta::assert_snapshot!(chain("марта\n2023"), @"Some([Month 3, Number 2023])");
    insta::assert_snapshot!(chain("2023\nмарта"), @"Some([Number 2023])");
}

#[test]
fn parenthesized_new_style_date() {
    insta::assert_snapshot!(
        chain("19 февраля (3 марта) 1861 г."),
        @"Some([Number 19, Month 2 new_style=[Number 3, Month 3], Year 1861])"
    );
}

#[test]
fn fragment_limit() {
    let line = create_line_from_string("15 марта 2023 года");
    let config = ParserConfig::standard().with_reference_year(2024);
    let mut parser = PrimitiveParser::new(Lexicon::builtin(), &config);
    let cur = line.first_cursor().unwrap();
    let limited = ChainBuilder::new(&mut parser).build_with_limit(cur, 2);
    insta::assert_snapshot!(format!("{:?}", limited), @"Some([Number 15, Month 3])");
}
