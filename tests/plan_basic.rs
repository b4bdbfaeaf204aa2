#![forbid(unsafe_code)]
use chrono::{NaiveDate, Weekday};
use semainier::eligibility::adjusted_time;
use semainier::model::{
    merge_weeks, split_by_week, Assignment, DayWindow, Employee, Schedule, TimeRange,
};
use semainier::storage::{JsonStorage, PlanDocument, Storage};
use semainier::week::{week_days, week_key, week_span};
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn range(s: &str) -> TimeRange {
    s.parse().unwrap()
}

#[test]
fn week_key_is_sunday() {
    // 2026-08-23 est un dimanche
    let sunday = date(2026, 8, 23);
    assert_eq!(week_key(sunday), sunday);
    assert_eq!(week_key(date(2026, 8, 24)), sunday);
    assert_eq!(week_key(date(2026, 8, 29)), sunday);
    assert_eq!(week_key(date(2026, 8, 30)), date(2026, 8, 30));
}

#[test]
fn week_days_covers_seven_days_in_order() {
    let days = week_days(date(2026, 8, 23));
    assert_eq!(days.len(), 7);
    assert_eq!(days[0].weekday, Weekday::Sun);
    assert_eq!(days[6].weekday, Weekday::Sat);
    assert_eq!(days[6].date, date(2026, 8, 29));
    assert_eq!(days[1].label, "Mon 08/24");
}

#[test]
fn week_span_is_contiguous() {
    let span = week_span(date(2026, 8, 25), 3);
    assert_eq!(
        span,
        vec![date(2026, 8, 23), date(2026, 8, 30), date(2026, 9, 6)]
    );
}

#[test]
fn time_range_wire_form_roundtrip() {
    assert_eq!(range("9a-5p").to_string(), "9a-5p");
    assert_eq!(range("12p-9p").to_string(), "12p-9p");
    assert_eq!(range("12a-12p").to_string(), "12a-12p");
    assert_eq!(range("12p-9p").start(), 12);
    assert_eq!(range("12p-9p").end(), 21);
    assert!("5p-9a".parse::<TimeRange>().is_err());
    assert!("9-17".parse::<TimeRange>().is_err());
}

#[test]
fn time_range_intersection() {
    let a = range("9a-5p");
    let b = range("12p-9p");
    assert_eq!(a.intersect(&b), Some(range("12p-5p")));
    assert_eq!(range("9a-11a").intersect(&range("12p-9p")), None);
}

#[test]
fn availability_window_clips_proposed_time() {
    // Scénario : fenêtre 9-13 le lundi, proposition 9-17
    let mut e = Employee::new("ana", "Ana");
    e.roles = vec!["seller".to_string()];
    e.availability = vec![DayWindow {
        day: Weekday::Mon,
        window: range("9a-1p"),
    }];

    let clipped = adjusted_time(&e, Weekday::Mon, range("9a-5p"));
    assert_eq!(clipped, Some(range("9a-1p")));

    // recouvrement < 1h : inéligible
    let none = adjusted_time(&e, Weekday::Mon, range("1p-9p"));
    assert_eq!(none, None);

    // jour sans fenêtre : plage inchangée
    assert_eq!(adjusted_time(&e, Weekday::Tue, range("9a-5p")), Some(range("9a-5p")));
}

#[test]
fn merge_and_split_weeks_roundtrip() {
    let e = Employee::new("bob", "Bob");
    let w1 = date(2026, 8, 23);
    let w2 = date(2026, 8, 30);

    let mut s1 = Schedule::default();
    s1.insert(&e.id, date(2026, 8, 24), Assignment::new(range("9a-5p"), "openclose"));
    let mut s2 = Schedule::default();
    s2.insert(&e.id, date(2026, 8, 31), Assignment::new(range("12p-9p"), "openclose"));

    let mut weeks = BTreeMap::new();
    weeks.insert(w1, s1.clone());
    weeks.insert(w2, s2.clone());

    let working = merge_weeks(&weeks, &[w1, w2]);
    assert_eq!(working.shift_count(&e.id), 2);

    let split = split_by_week(&working);
    assert_eq!(split.len(), 2);
    assert_eq!(split[&w1], s1);
    assert_eq!(split[&w2], s2);
}

#[test]
fn plan_document_roundtrips_through_json_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planning.json");
    let storage = JsonStorage::open(&path).unwrap();

    let mut doc = PlanDocument::default();
    let mut e = Employee::new("ana", "Ana");
    e.roles = vec!["seller".to_string()];
    doc.staff.push(e.clone());
    let week = date(2026, 8, 23);
    let mut s = Schedule::default();
    s.insert(&e.id, date(2026, 8, 24), Assignment::new(range("9a-5p"), "openclose"));
    doc.schedules.insert(week, s.clone());

    storage.save(&doc).unwrap();
    let loaded = storage.load().unwrap();
    assert_eq!(loaded.staff, doc.staff);
    assert_eq!(loaded.schedules[&week], s);
    assert!(loaded.time_off.is_empty());
}

#[test]
fn schedule_counts_ignore_off_entries() {
    let e = Employee::new("eve", "Eve");
    let week = date(2026, 8, 23);
    let mut s = Schedule::default();
    s.insert(&e.id, date(2026, 8, 24), Assignment::new(range("9a-5p"), "openclose"));
    s.insert(&e.id, date(2026, 8, 25), Assignment::new(range("12a-12p"), "off"));

    assert_eq!(s.week_shift_count(&e.id, week), 1);
    assert_eq!(s.shift_count(&e.id), 1);
    assert_eq!(s.on_date(date(2026, 8, 25)).count(), 1);
}
