//! Text forms of resolved dates and relative referents.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::bridge::ReferentBridge;
use crate::fragment::{Granule, PointerKind};
use crate::referent::{ReferentArena, ReferentHandle, ReferentId};
use crate::resolver::Tense;

fn push_instant(out: &mut String, at: NaiveDateTime) {
    out.push_str(&format!("{:04}.{:02}.{:02}", at.year(), at.month(), at.day()));
    if at.hour() != 0 || at.minute() != 0 {
        out.push_str(&format!(" {:02}:{:02}", at.hour(), at.minute()));
    }
}

/// "(2023.03.01-2023.06.30 rel. 2024.06.15 10:30)".
pub fn format_resolution(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> String {
    let mut out = String::from("(");
    push_instant(&mut out, start);
    if end != start {
        out.push('-');
        push_instant(&mut out, end);
    }
    out.push_str(" rel. ");
    push_instant(&mut out, now);
    out.push(')');
    out
}

/// Resolve a stored referent against `now` and format it.
pub fn format_referent(
    arena: &ReferentArena,
    handle: ReferentHandle,
    now: NaiveDateTime,
    tense: Tense,
) -> Option<String> {
    let (start, end) = ReferentBridge::calculate_date_range(arena, handle, now, tense)?;
    Some(format_resolution(start, end, now))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

/// Nominative singular, gender, and the counted forms for 1, 2..4 and 5+.
fn unit_words(granule: Granule) -> Option<(&'static str, Gender, [&'static str; 3])> {
    use Gender::*;
    Some(match granule {
        Granule::Century => ("век", Masculine, ["век", "века", "веков"]),
        Granule::Decade => ("десятилетие", Neuter, ["десятилетие", "десятилетия", "десятилетий"]),
        Granule::Year => ("год", Masculine, ["год", "года", "лет"]),
        Granule::HalfYear => ("полугодие", Neuter, ["полугодие", "полугодия", "полугодий"]),
        Granule::Quarter => ("квартал", Masculine, ["квартал", "квартала", "кварталов"]),
        Granule::Month => ("месяц", Masculine, ["месяц", "месяца", "месяцев"]),
        Granule::Week => ("неделя", Feminine, ["неделю", "недели", "недель"]),
        Granule::Weekend => ("выходные", Masculine, ["выходные", "выходных", "выходных"]),
        Granule::Day => ("день", Masculine, ["день", "дня", "дней"]),
        Granule::Hour => ("час", Masculine, ["час", "часа", "часов"]),
        Granule::Minute => ("минута", Feminine, ["минуту", "минуты", "минут"]),
        Granule::Second => ("секунда", Feminine, ["секунду", "секунды", "секунд"]),
        Granule::Season | Granule::DayOfWeek => return None,
    })
}

fn counted(n: i32, forms: [&'static str; 3]) -> &'static str {
    let n = n.unsigned_abs();
    match (n % 10, n % 100) {
        (1, r) if r != 11 => forms[0],
        (2..=4, r) if !(12..=14).contains(&r) => forms[1],
        _ => forms[2],
    }
}

/// Endings for masculine, feminine, neuter and plural.
const HARD: [&str; 4] = ["ый", "ая", "ое", "ые"];
const HUSHING: [&str; 4] = ["ий", "ая", "ее", "ие"];
const SOFT: [&str; 4] = ["ий", "яя", "ее", "ие"];

fn adjective(stem: &str, endings: [&str; 4], gender: Gender, plural: bool) -> String {
    let i = match (plural, gender) {
        (true, _) => 3,
        (false, Gender::Masculine) => 0,
        (false, Gender::Feminine) => 1,
        (false, Gender::Neuter) => 2,
    };
    format!("{}{}", stem, endings[i])
}

fn this(gender: Gender, plural: bool) -> &'static str {
    match (plural, gender) {
        (true, _) => "эти",
        (false, Gender::Masculine) => "этот",
        (false, Gender::Feminine) => "эта",
        (false, Gender::Neuter) => "это",
    }
}

fn season_name(season: i32) -> Option<&'static str> {
    Some(match PointerKind::from_season(season) {
        PointerKind::Winter => "зима",
        PointerKind::Spring => "весна",
        PointerKind::Summer => "лето",
        PointerKind::Autumn => "осень",
        _ => return None,
    })
}

fn year_genitive(value: i32) -> String {
    match value {
        0 => "этого года".to_string(),
        1 => "следующего года".to_string(),
        -1 => "прошлого года".to_string(),
        v if v > 0 => format!("через {} {}", v, counted(v, ["год", "года", "лет"])),
        v => format!("{} {} назад", -(v as i64), counted(v, ["год", "года", "лет"])),
    }
}

fn relative_phrase(granule: Granule, value: i32, is_last: bool) -> Option<String> {
    if granule == Granule::Day {
        match value {
            0 if !is_last => return Some("сегодня".to_string()),
            1 => return Some("завтра".to_string()),
            -1 if !is_last => return Some("вчера".to_string()),
            _ => {}
        }
    }
    let (noun, gender, forms) = unit_words(granule)?;
    let plural = granule == Granule::Weekend;
    if is_last {
        return Some(match value {
            0 => format!("{} {}", adjective("последн", SOFT, gender, plural), noun),
            -1 => format!("{} {}", adjective("предпоследн", SOFT, gender, plural), noun),
            v => format!("последние {} {}", -(v as i64), counted(v, forms)),
        });
    }
    Some(match value {
        0 => format!("{} {}", this(gender, plural), noun),
        1 => format!("{} {}", adjective("следующ", HUSHING, gender, plural), noun),
        -1 => format!("{} {}", adjective("прошл", HARD, gender, plural), noun),
        v if v > 0 => format!("через {} {}", v, counted(v, forms)),
        v => format!("{} {} назад", -(v as i64), counted(v, forms)),
    })
}

/// Russian text for a relative date: "3 дня назад", "прошлый год",
/// "следующий месяц", "лето прошлого года". `None` for absolute dates.
pub fn describe(arena: &ReferentArena, id: ReferentId) -> Option<String> {
    if !arena.is_relative(id) {
        return None;
    }
    if arena.pointer(id) == PointerKind::Today && arena.date(id)?.granule.is_none() {
        return Some("настоящее время".to_string());
    }
    let (_, node) = arena.chain(id).find(|(_, node)| node.granule.is_some())?;
    let granule = node.granule?;

    if granule == Granule::Season && !node.is_relative {
        let name = season_name(node.value)?;
        return match arena.chain(id).find(|(_, n)| n.granule == Some(Granule::Year)) {
            Some((_, year)) if year.is_relative => Some(format!("{} {}", name, year_genitive(year.value))),
            _ => Some(name.to_string()),
        };
    }
    if !node.is_relative {
        return None;
    }
    relative_phrase(granule, node.value, node.is_last)
}
