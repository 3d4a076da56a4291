//! Fixed lookup tables for RU, UA, EN and IT date vocabulary.
//!
//! A [`Lexicon`] is built once and handed to the line builder and the
//! parser explicitly. [`Lexicon::builtin`] is a shared, lazily built copy of
//! the standard tables.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Coarse part of speech attached to a word form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphClass {
    Noun,
    Adjective,
    Pronoun,
    Preposition,
    Adverb,
    Conjunction,
    Undefined,
}

/// What a word form means for date extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexeme {
    // calendar units
    Year,
    YearAbbr,
    HalfYear,
    Century,
    Quarter,
    Decade,
    Month,
    Day,
    DayNumber,
    Week,
    Weekend,
    Hour,
    HalfHour,
    Minute,
    Second,

    MonthName { month: u8, abbreviated: bool },
    Weekday { day: u8, abbreviated: bool },

    Today,
    Tomorrow,
    DayAfterTomorrow,
    Yesterday,
    DayBeforeYesterday,
    TomorrowAdj,
    DayAfterTomorrowAdj,
    YesterdayAdj,
    DayBeforeYesterdayAdj,

    // modifiers
    Next,
    Nearest,
    Previous,
    BeforePrevious,
    Current,
    This,
    First,
    Last,
    Penultimate,

    // relative markers
    Through,
    Later,
    Ago,
    Tomu,

    // prepositions
    From,
    To,
    In,
    Towards,
    For,
    On,
    About,

    // pointers
    Begin,
    Middle,
    End,
    AtEnd,
    Recently,
    Present,
    Time,

    Morning,
    Evening,
    Night,

    Winter,
    Spring,
    Summer,
    Autumn,

    Period,
    And,
    Unit,
    Empty,
}

/// One meaning of a word form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LexEntry {
    pub lexeme: Lexeme,
    pub class: MorphClass,
}

/// Immutable date vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashMap<String, Vec<LexEntry>>,
    new_era: Vec<Vec<String>>,
    empty_words: HashSet<String>,
}

static BUILTIN: Lazy<Lexicon> = Lazy::new(Lexicon::standard);

const ADJ_ENDINGS: &[&str] = &[
    "ЫЙ", "ИЙ", "ОЙ", "ОГО", "ЕГО", "ОМУ", "ЕМУ", "ЫМ", "ИМ", "ОМ", "ЕМ", "АЯ", "ЯЯ", "УЮ",
    "ЮЮ", "ЕЙ", "ОЕ", "ЕЕ", "ЫЕ", "ИЕ", "ЫХ", "ИХ", "ЫМИ", "ИМИ", "ІЙ", "ЬОГО", "ЬОМУ", "ІМ",
    "Я", "А", "ЬОЇ", "ОЇ", "Ю", "У", "Є", "Е", "І", "ІХ", "ІМИ",
];

impl Lexicon {
    /// Shared instance of the standard tables.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    /// Every meaning recorded for an upper-cased term.
    pub fn entries(&self, term: &str) -> &[LexEntry] {
        self.words.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, term: &str, lexeme: Lexeme) -> bool {
        self.entries(term).iter().any(|e| e.lexeme == lexeme)
    }

    pub fn is_empty_word(&self, term: &str) -> bool {
        self.empty_words.contains(term)
    }

    /// Token sequences (upper-cased terms) naming the common era.
    pub fn new_era_phrases(&self) -> &[Vec<String>] {
        &self.new_era
    }

    /// Record additional forms, e.g. for a domain-specific abbreviation.
    pub fn with_forms(mut self, class: MorphClass, lexeme: Lexeme, forms: &[&str]) -> Self {
        self.add(class, lexeme, forms);
        self
    }

    fn add(&mut self, class: MorphClass, lexeme: Lexeme, forms: &[&str]) {
        for form in forms {
            let entries = self.words.entry((*form).to_string()).or_default();
            let entry = LexEntry { lexeme, class };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
    }

    fn add_stems(&mut self, class: MorphClass, lexeme: Lexeme, stems: &[&str]) {
        for stem in stems {
            let forms: Vec<String> = ADJ_ENDINGS.iter().map(|e| format!("{}{}", stem, e)).collect();
            let forms: Vec<&str> = forms.iter().map(String::as_str).collect();
            self.add(class, lexeme, &forms);
        }
    }

    fn add_months(&mut self, month: u8, full: &[&str], abbreviations: &[&str]) {
        self.add(
            MorphClass::Noun,
            Lexeme::MonthName { month, abbreviated: false },
            full,
        );
        self.add(
            MorphClass::Noun,
            Lexeme::MonthName { month, abbreviated: true },
            abbreviations,
        );
    }

    fn add_weekday(&mut self, day: u8, full: &[&str], abbreviations: &[&str]) {
        self.add(
            MorphClass::Noun,
            Lexeme::Weekday { day, abbreviated: false },
            full,
        );
        self.add(
            MorphClass::Noun,
            Lexeme::Weekday { day, abbreviated: true },
            abbreviations,
        );
    }

    /// Build the standard RU/UA/EN/IT tables.
    pub fn standard() -> Self {
        use Lexeme as L;
        use MorphClass::*;

        let mut lx = Lexicon::default();

        lx.add_months(1, &["ЯНВАРЬ", "ЯНВАРЯ", "ЯНВАРЕ", "СІЧЕНЬ", "СІЧНЯ", "СІЧНІ", "JANUARY", "GENNAIO"], &["ЯНВ", "JAN"]);
        lx.add_months(2, &["ФЕВРАЛЬ", "ФЕВРАЛЯ", "ФЕВРАЛЕ", "ЛЮТИЙ", "ЛЮТОГО", "ЛЮТОМУ", "FEBRUARY", "FEBBRAIO"], &["ФЕВ", "ФЕВР", "FEB"]);
        lx.add_months(3, &["МАРТ", "МАРТА", "МАРТЕ", "БЕРЕЗЕНЬ", "БЕРЕЗНЯ", "БЕРЕЗНІ", "MARCH", "MARZO"], &["МАР", "MAR"]);
        lx.add_months(4, &["АПРЕЛЬ", "АПРЕЛЯ", "АПРЕЛЕ", "КВІТЕНЬ", "КВІТНЯ", "КВІТНІ", "APRIL", "APRILE"], &["АПР", "APR"]);
        lx.add_months(5, &["МАЙ", "МАЯ", "МАЕ", "ТРАВЕНЬ", "ТРАВНЯ", "ТРАВНІ", "MAY", "MAGGIO"], &[]);
        lx.add_months(6, &["ИЮНЬ", "ИЮНЯ", "ИЮНЕ", "ЧЕРВЕНЬ", "ЧЕРВНЯ", "ЧЕРВНІ", "JUNE", "GIUGNO"], &["ИЮН", "JUN"]);
        lx.add_months(7, &["ИЮЛЬ", "ИЮЛЯ", "ИЮЛЕ", "ЛИПЕНЬ", "ЛИПНЯ", "ЛИПНІ", "JULY", "LUGLIO"], &["ИЮЛ", "JUL"]);
        lx.add_months(8, &["АВГУСТ", "АВГУСТА", "АВГУСТЕ", "СЕРПЕНЬ", "СЕРПНЯ", "СЕРПНІ", "AUGUST", "AGOSTO"], &["АВГ", "AUG"]);
        lx.add_months(9, &["СЕНТЯБРЬ", "СЕНТЯБРЯ", "СЕНТЯБРЕ", "ВЕРЕСЕНЬ", "ВЕРЕСНЯ", "ВЕРЕСНІ", "SEPTEMBER", "SETTEMBRE"], &["СЕН", "СЕНТ", "SEP", "SEPT"]);
        lx.add_months(10, &["ОКТЯБРЬ", "ОКТЯБРЯ", "ОКТЯБРЕ", "ЖОВТЕНЬ", "ЖОВТНЯ", "ЖОВТНІ", "OCTOBER", "OTTOBRE"], &["ОКТ", "OCT"]);
        lx.add_months(11, &["НОЯБРЬ", "НОЯБРЯ", "НОЯБРЕ", "ЛИСТОПАД", "ЛИСТОПАДА", "ЛИСТОПАДІ", "NOVEMBER", "NOVEMBRE"], &["НОЯ", "НОЯБ", "NOV"]);
        lx.add_months(12, &["ДЕКАБРЬ", "ДЕКАБРЯ", "ДЕКАБРЕ", "ГРУДЕНЬ", "ГРУДНЯ", "ГРУДНІ", "DECEMBER", "DICEMBRE"], &["ДЕК", "DEC"]);

        lx.add_weekday(1, &["ПОНЕДЕЛЬНИК", "ПОНЕДЕЛЬНИКА", "ПОНЕДЕЛЬНИКУ", "ПОНЕДІЛОК", "ПОНЕДІЛКА", "MONDAY"], &["ПН", "ПОН", "MON"]);
        lx.add_weekday(2, &["ВТОРНИК", "ВТОРНИКА", "ВТОРНИКУ", "ВІВТОРОК", "ВІВТОРКА", "TUESDAY"], &["ВТ", "TUE"]);
        lx.add_weekday(3, &["СРЕДА", "СРЕДУ", "СРЕДЫ", "СЕРЕДА", "СЕРЕДУ", "WEDNESDAY"], &["СР", "WED"]);
        lx.add_weekday(4, &["ЧЕТВЕРГ", "ЧЕТВЕРГА", "ЧЕТВЕРГУ", "ЧЕТВЕР", "ЧЕТВЕРГОМ", "THURSDAY"], &["ЧТ", "THU"]);
        lx.add_weekday(5, &["ПЯТНИЦА", "ПЯТНИЦУ", "ПЯТНИЦЫ", "ПЯТНИЦЯ", "ПЯТНИЦЮ", "FRIDAY"], &["ПТ", "FRI"]);
        lx.add_weekday(6, &["СУББОТА", "СУББОТУ", "СУББОТЫ", "СУБОТА", "СУБОТУ", "SATURDAY"], &["СБ", "SAT"]);
        lx.add_weekday(7, &["ВОСКРЕСЕНЬЕ", "ВОСКРЕСЕНИЕ", "ВОСКРЕСЕНЬЯ", "НЕДІЛЯ", "НЕДІЛЮ", "SUNDAY"], &["ВС", "НД", "SUN"]);

        lx.add(Noun, L::Year, &["ГОД", "ГОДА", "ГОДУ", "ГОДОМ", "ГОДЕ", "ГОДЫ", "ГОДОВ", "ГОДАМ", "ЛЕТ", "РІК", "РОКУ", "РОКОМ", "РОЦІ", "РОКИ", "РОКІВ", "YEAR", "YEARS", "ANNO", "ANNI"]);
        lx.add(Noun, L::YearAbbr, &["Г", "ГГ", "Р", "РР"]);
        lx.add(Noun, L::HalfYear, &["ПОЛГОДА", "ПОЛУГОДИЕ", "ПОЛУГОДИЯ", "ПОЛУГОДИИ", "ПОЛУГОДИЮ", "ПОЛУГОДИЕМ", "ПІВРОКУ", "ПІВРІЧЧЯ", "ПІВРІЧЧІ"]);
        lx.add(Noun, L::Century, &["ВЕК", "ВЕКА", "ВЕКЕ", "ВЕКОВ", "ВЕКУ", "СТОЛЕТИЕ", "СТОЛЕТИЯ", "СТОЛЕТИИ", "ВІК", "ВІКУ", "ВІЦІ", "СТОЛІТТЯ", "СТОЛІТТІ", "CENTURY", "CENTURIES", "SECOLO"]);
        lx.add(Noun, L::Quarter, &["КВАРТАЛ", "КВАРТАЛА", "КВАРТАЛЕ", "КВАРТАЛУ", "КВАРТАЛОМ", "КВАРТАЛЫ", "КВАРТАЛОВ", "КВАРТАЛІ", "QUARTER", "QUARTERS"]);
        lx.add(Noun, L::Decade, &["ДЕСЯТИЛЕТИЕ", "ДЕСЯТИЛЕТИЯ", "ДЕСЯТИЛЕТИИ", "ДЕКАДА", "ДЕКАДЫ", "ДЕКАДЕ", "ДЕКАДУ", "ДЕСЯТИЛІТТЯ", "DECADE", "DECADES"]);
        lx.add(Noun, L::Month, &["МЕСЯЦ", "МЕСЯЦА", "МЕСЯЦЕ", "МЕСЯЦУ", "МЕСЯЦЫ", "МЕСЯЦЕВ", "МІСЯЦЬ", "МІСЯЦЯ", "МІСЯЦІ", "МІСЯЦІВ", "MONTH", "MONTHS", "MESE", "MESI"]);
        lx.add(Noun, L::Day, &["ДЕНЬ", "ДНЯ", "ДНЮ", "ДНЕМ", "ДНИ", "ДНЕЙ", "СУТКИ", "СУТОК", "ДНІ", "ДНІВ", "DAY", "DAYS", "GIORNO", "GIORNI"]);
        lx.add(Noun, L::DayNumber, &["ЧИСЛО", "ЧИСЛА", "ЧИСЛУ"]);
        lx.add(Noun, L::Week, &["НЕДЕЛЯ", "НЕДЕЛИ", "НЕДЕЛЮ", "НЕДЕЛЕ", "НЕДЕЛЬ", "ТИЖДЕНЬ", "ТИЖНЯ", "ТИЖНІ", "ТИЖНІВ", "WEEK", "WEEKS", "SETTIMANA"]);
        lx.add(Noun, L::Weekend, &["ВЫХОДНЫЕ", "ВЫХОДНЫХ", "ВЫХОДНОЙ", "ВИХІДНІ", "ВИХІДНИХ", "WEEKEND", "WEEKENDS"]);
        lx.add(Noun, L::Hour, &["ЧАС", "ЧАСА", "ЧАСУ", "ЧАСОВ", "ЧАСЫ", "ГОДИНА", "ГОДИНИ", "ГОДИН", "ГОДИНУ", "HOUR", "HOURS", "ORA", "ORE", "Ч"]);
        lx.add(Noun, L::HalfHour, &["ПОЛЧАСА", "ПІВГОДИНИ"]);
        lx.add(Noun, L::Minute, &["МИНУТА", "МИНУТЫ", "МИНУТУ", "МИНУТ", "ХВИЛИНА", "ХВИЛИНИ", "ХВИЛИН", "ХВИЛИНУ", "MINUTE", "MINUTES", "MINUTO", "MINUTI", "МИН"]);
        lx.add(Noun, L::Second, &["СЕКУНДА", "СЕКУНДЫ", "СЕКУНД", "СЕКУНДУ", "SECONDS", "СЕК"]);

        lx.add(Adverb, L::Today, &["СЕГОДНЯ", "СЬОГОДНІ", "TODAY", "OGGI"]);
        lx.add(Adverb, L::Tomorrow, &["ЗАВТРА", "TOMORROW", "DOMANI"]);
        lx.add(Adverb, L::DayAfterTomorrow, &["ПОСЛЕЗАВТРА", "ПІСЛЯЗАВТРА"]);
        lx.add(Adverb, L::Yesterday, &["ВЧЕРА", "ВЧОРА", "YESTERDAY", "IERI"]);
        lx.add(Adverb, L::DayBeforeYesterday, &["ПОЗАВЧЕРА", "ПОЗАВЧОРА"]);
        lx.add_stems(Adjective, L::TomorrowAdj, &["ЗАВТРАШН"]);
        lx.add_stems(Adjective, L::DayAfterTomorrowAdj, &["ПОСЛЕЗАВТРАШН", "ПІСЛЯЗАВТРАШН"]);
        lx.add_stems(Adjective, L::YesterdayAdj, &["ВЧЕРАШН", "ВЧОРАШН"]);
        lx.add_stems(Adjective, L::DayBeforeYesterdayAdj, &["ПОЗАВЧЕРАШН", "ПОЗАВЧОРАШН"]);

        lx.add_stems(Adjective, L::Next, &["СЛЕДУЮЩ", "БУДУЩ", "ПОСЛЕДУЮЩ", "НАСТУПН", "МАЙБУТН"]);
        lx.add(Adjective, L::Next, &["NEXT", "COMING", "PROSSIMO", "PROSSIMA"]);
        lx.add_stems(Adjective, L::Nearest, &["БЛИЖАЙШ", "НАЙБЛИЖЧ"]);
        lx.add_stems(Adjective, L::Previous, &["ПРЕДЫДУЩ", "ПРОШЛ", "ПРОШЕДШ", "МИНУВШ", "ПОПЕРЕДН", "МИНУЛ"]);
        lx.add(Adjective, L::Previous, &["PREVIOUS", "PAST", "SCORSO", "SCORSA"]);
        lx.add_stems(Adjective, L::BeforePrevious, &["ПОЗАПРОШЛ", "ПОЗАМИНУЛ"]);
        lx.add_stems(Adjective, L::Current, &["ТЕКУЩ", "ПОТОЧН", "НЫНЕШН"]);
        lx.add(Adjective, L::Current, &["CURRENT"]);
        lx.add(Pronoun, L::This, &["ЭТОТ", "ЭТОГО", "ЭТОМ", "ЭТОМУ", "ЭТА", "ЭТОЙ", "ЭТУ", "ЭТО", "ЭТИ", "ЭТИХ", "ЦЕЙ", "ЦЬОГО", "ЦЬОМУ", "ЦІЙ", "ЦЯ", "ЦІЄЇ", "ЦЮ", "ЦЕ", "ЦІ", "THIS", "QUESTO", "QUEST"]);
        lx.add_stems(Adjective, L::First, &["ПЕРВ", "ПЕРШ"]);
        lx.add(Adjective, L::First, &["FIRST"]);
        lx.add_stems(Adjective, L::Last, &["ПОСЛЕДН", "ОСТАНН"]);
        lx.add(Adjective, L::Last, &["LAST", "ULTIMO", "ULTIMA"]);
        lx.add_stems(Adjective, L::Penultimate, &["ПРЕДПОСЛЕДН", "ПЕРЕДОСТАНН"]);
        lx.add_stems(Adjective, L::Present, &["НАСТОЯЩ", "ДАН"]);

        lx.add(Preposition, L::Through, &["ЧЕРЕЗ", "AFTER"]);
        lx.add(Adverb, L::Later, &["СПУСТЯ", "LATER"]);
        lx.add(Adverb, L::Ago, &["НАЗАД", "AGO", "FA"]);
        lx.add(Adverb, L::Tomu, &["ТОМУ"]);

        lx.add(Preposition, L::From, &["С", "СО", "ОТ", "ВІД", "З", "FROM", "SINCE", "DAL", "DALL"]);
        lx.add(Preposition, L::To, &["ПО", "ДО", "TO", "TILL", "UNTIL", "AL", "FINO"]);
        lx.add(Preposition, L::In, &["В", "ВО", "У", "IN"]);
        lx.add(Preposition, L::Towards, &["К", "КО"]);
        lx.add(Preposition, L::For, &["ЗА"]);
        lx.add(Preposition, L::On, &["НА", "ON"]);
        lx.add(Preposition, L::About, &["ОКОЛО", "БІЛЯ", "ABOUT", "AROUND"]);
        lx.add(Adverb, L::About, &["ПРИМЕРНО", "ПРИБЛИЗНО", "ОК"]);

        lx.add(Noun, L::Begin, &["НАЧАЛО", "НАЧАЛА", "НАЧАЛЕ", "НАЧАЛУ", "НАЧАЛОМ", "ПОЧАТОК", "ПОЧАТКУ", "ПОЧАТКОМ", "BEGINNING", "START"]);
        lx.add(Noun, L::Middle, &["СЕРЕДИНА", "СЕРЕДИНЫ", "СЕРЕДИНЕ", "СЕРЕДИНУ", "СЕРЕДИНОЙ", "СЕРЕДИНІ", "MIDDLE", "MID"]);
        lx.add(Noun, L::End, &["КОНЕЦ", "КОНЦА", "КОНЦЕ", "КОНЦУ", "КОНЦОМ", "КІНЕЦЬ", "КІНЦЯ", "КІНЦІ", "КІНЦЕМ", "END"]);
        lx.add(Adverb, L::AtEnd, &["НАПРИКІНЦІ"]);
        lx.add(Adverb, L::Recently, &["ДОНЕДАВНА"]);
        lx.add(Noun, L::Time, &["ВРЕМЯ", "ВРЕМЕНИ", "TIME"]);

        lx.add(Noun, L::Morning, &["УТРО", "УТРА", "УТРОМ", "УТРУ", "РАНОК", "РАНКУ", "РАНКОМ", "MORNING", "AM"]);
        lx.add(Noun, L::Evening, &["ВЕЧЕР", "ВЕЧЕРА", "ВЕЧЕРОМ", "ВЕЧЕРУ", "ВЕЧІР", "ВЕЧОРА", "ВЕЧОРІ", "EVENING", "PM"]);
        lx.add(Noun, L::Night, &["НОЧЬ", "НОЧИ", "НОЧЬЮ", "НІЧ", "НОЧІ", "NIGHT"]);

        lx.add(Noun, L::Winter, &["ЗИМА", "ЗИМЫ", "ЗИМОЙ", "ЗИМУ", "ЗИМЕ", "ЗИМИ", "ЗИМОЮ", "WINTER", "INVERNO"]);
        lx.add(Noun, L::Spring, &["ВЕСНА", "ВЕСНЫ", "ВЕСНОЙ", "ВЕСНУ", "ВЕСНЕ", "ВЕСНИ", "ВЕСНОЮ", "ПРОВЕСНА", "SPRING", "PRIMAVERA"]);
        lx.add(Noun, L::Summer, &["ЛЕТО", "ЛЕТОМ", "ЛЕТА", "ЛЕТЕ", "ЛІТО", "ЛІТА", "ЛІТОМ", "SUMMER", "ESTATE"]);
        lx.add(Noun, L::Autumn, &["ОСЕНЬ", "ОСЕНИ", "ОСЕНЬЮ", "ОСІНЬ", "ОСЕНІ", "ОСІННЮ", "AUTUMN", "FALL", "AUTUNNO"]);

        lx.add(Noun, L::Period, &["ПЕРИОД", "ПЕРИОДА", "ПЕРИОДЕ", "ПЕРІОД", "ПЕРІОДУ", "PERIOD"]);
        lx.add(Conjunction, L::And, &["И", "І", "Й", "AND"]);
        lx.add(Noun, L::Unit, &["%", "КГ", "КМ", "СМ", "ММ", "ТОНН", "ТОННЫ", "РУБ", "РУБЛЕЙ", "РУБЛЯ", "РУБЛЬ", "КОП", "ГРН", "ШТ", "ШТУК", "ДОЛЛАРОВ", "ЕВРО", "USD", "EUR", "KG", "KM", "PCS", "МЕТРОВ"]);

        for word in ["IN", "SINCE", "THE", "NEL", "DEL", "IL", "OF"] {
            lx.empty_words.insert(word.to_string());
        }
        lx.add(Undefined, L::Empty, &["THE", "NEL", "DEL", "IL", "OF"]);

        let era: &[&[&str]] = &[
            &["НОВОЙ", "ЭРЫ"],
            &["НОВАЯ", "ЭРА"],
            &["НАШЕЙ", "ЭРЫ"],
            &["НАША", "ЭРА"],
            &["Н", ".", "Э", "."],
            &["НОВОЇ", "ЕРИ"],
            &["НОВА", "ЕРА"],
            &["НАШОЇ", "ЕРИ"],
            &["НАША", "ЕРА"],
            &["Н", ".", "Е", "."],
            &["РОЖДЕСТВА", "ХРИСТОВА"],
            &["РОЖДЕСТВО", "ХРИСТОВО"],
            &["Р", ".", "Х", "."],
            &["РІЗДВА", "ХРИСТОВОГО"],
        ];
        lx.new_era = era
            .iter()
            .map(|phrase| phrase.iter().map(|t| (*t).to_string()).collect())
            .collect();

        lx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_forms_across_locales() {
        let lx = Lexicon::builtin();
        for term in ["МАРТА", "БЕРЕЗНЯ", "MARCH", "MARZO"] {
            assert!(
                lx.has(term, Lexeme::MonthName { month: 3, abbreviated: false }),
                "{}",
                term
            );
        }
        assert!(lx.has("SEPT", Lexeme::MonthName { month: 9, abbreviated: true }));
    }

    #[test]
    fn adjective_stems_expand() {
        let lx = Lexicon::builtin();
        assert!(lx.has("ПРОШЛОГО", Lexeme::Previous));
        assert!(lx.has("НАСТУПНОГО", Lexeme::Next));
        assert!(lx.has("ОСТАННІЙ", Lexeme::Last));
        assert!(lx.has("ПОЗАПРОШЛОМ", Lexeme::BeforePrevious));
        assert!(!lx.has("ПОЗАПРОШЛОМ", Lexeme::Previous));
    }

    #[test]
    fn ambiguous_forms_keep_every_meaning() {
        let lx = Lexicon::builtin();
        let lexemes: Vec<Lexeme> = lx.entries("ЛЕТА").iter().map(|e| e.lexeme).collect();
        assert_eq!(lexemes, vec![Lexeme::Summer]);
        assert!(lx.has("ЛЕТ", Lexeme::Year));
        assert!(lx.is_empty_word("SINCE"));
        assert!(lx.has("SINCE", Lexeme::From));
    }

    #[test]
    fn extra_forms_can_be_injected() {
        let lx = Lexicon::standard().with_forms(MorphClass::Noun, Lexeme::Year, &["ГОДИК"]);
        assert!(lx.has("ГОДИК", Lexeme::Year));
        assert!(!Lexicon::builtin().has("ГОДИК", Lexeme::Year));
    }
}
