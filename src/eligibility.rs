use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::{Employee, Schedule, TimeOffRequest, TimeRange, MAX_WEEKLY_SHIFTS};
use crate::week::week_key;

/// Recouvrement minimal (en heures) entre la fenêtre de disponibilité
/// et la plage proposée pour rester éligible.
const MIN_OVERLAP_HOURS: u8 = 1;

/// Plage effective pour `employee` un jour donné : la plage proposée,
/// rognée à la fenêtre de disponibilité si elle existe. None si le
/// recouvrement est inférieur à une heure.
pub fn adjusted_time(employee: &Employee, day: Weekday, proposed: TimeRange) -> Option<TimeRange> {
    match employee.availability_on(day) {
        None => Some(proposed),
        Some(window) => proposed
            .intersect(&window)
            .filter(|clipped| clipped.hours() >= MIN_OVERLAP_HOURS),
    }
}

/// Décision pure d'admissibilité sur l'instantané `schedule` :
/// pas d'affectation ce jour-là, plafond hebdomadaire non atteint,
/// pas d'absence approuvée couvrant la date, et recouvrement de
/// disponibilité suffisant.
pub fn is_eligible(
    employee: &Employee,
    date: NaiveDate,
    proposed: TimeRange,
    schedule: &Schedule,
    time_off: &[TimeOffRequest],
) -> bool {
    if schedule.get(&employee.id, date).is_some() {
        return false;
    }
    if schedule.week_shift_count(&employee.id, week_key(date)) >= MAX_WEEKLY_SHIFTS {
        return false;
    }
    if time_off
        .iter()
        .any(|r| r.employee == employee.id && r.blocks(date))
    {
        return false;
    }
    adjusted_time(employee, date.weekday(), proposed).is_some()
}
