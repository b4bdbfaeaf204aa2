use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Nombre de jours d'une semaine de planning (dimanche → samedi).
pub const DAYS_PER_WEEK: usize = 7;

/// Clé canonique d'une semaine : le dimanche qui ouvre la semaine
/// contenant `date`.
pub fn week_key(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Index 0..7 d'un jour dans la semaine (dimanche = 0).
pub fn day_index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}

/// Descripteur d'un jour : date pleine, jour de semaine, libellé court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayInfo {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub label: String,
}

/// Les 7 descripteurs de la semaine ouverte par `key` (clé = dimanche).
pub fn week_days(key: NaiveDate) -> Vec<DayInfo> {
    (0..DAYS_PER_WEEK)
        .map(|offset| {
            let date = key + Duration::days(offset as i64);
            DayInfo {
                date,
                weekday: date.weekday(),
                label: format!("{} {:02}/{:02}", date.weekday(), date.month(), date.day()),
            }
        })
        .collect()
}

/// Clés des `count` semaines contiguës à partir de la semaine de `start`.
pub fn week_span(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let first = week_key(start);
    (0..count.max(1))
        .map(|i| first + Duration::days((i * DAYS_PER_WEEK) as i64))
        .collect()
}
