use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::ShiftRule;
use crate::eligibility::{adjusted_time, is_eligible};
use crate::fairness::{burden_score, classify, week_close_count};
use crate::model::{Assignment, Employee, MAX_WEEKLY_SHIFTS};
use crate::week::week_days;

use super::{PlanError, Planner, SlotRequest};

/// Ouvertures/fermetures : phase 1 garantit le minimum de fermetures du
/// rôle requis avant tout remplissage générique, quitte à « gaspiller »
/// un bon jour ; phase 2 pourvoit l'ouverture puis la fermeture de
/// chaque jour ouvert ; phase 3 complète la semaine du rôle requis avec
/// des ouvertures supplémentaires.
pub(super) fn generate<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    rule: &ShiftRule,
    closer_role: &str,
    min_closing_shifts: u8,
) -> Result<(), PlanError> {
    let holders: Vec<Employee> = planner
        .roster
        .iter()
        .filter(|e| e.has_role(closer_role))
        .cloned()
        .collect();

    for week in planner.weeks.clone() {
        let days = week_days(week);

        // Phase 1 : minimum de fermetures pour chaque porteur du rôle
        for employee in &holders {
            while week_close_count(&planner.working, &employee.id, week, &planner.table)
                < usize::from(min_closing_shifts)
            {
                if !assign_best_close(planner, category, rule, employee, &days) {
                    planner.warn(format!(
                        "{} cannot reach {min_closing_shifts} closing shift(s) in week of {week}",
                        employee.display_name
                    ));
                    break;
                }
            }
        }

        // Phase 2 : ouverture puis fermeture de chaque jour ouvert
        for day in &days {
            if !rule.active_on(day.weekday) {
                continue;
            }
            let Some(windows) = planner.table.windows(day.weekday).copied() else {
                continue;
            };
            if !slot_filled(planner, day.date, false) {
                let req = SlotRequest {
                    category,
                    date: day.date,
                    weekday: day.weekday,
                    time: windows.opener,
                    role_filter: None,
                };
                super::select::select_and_assign(planner, &req);
            }
            if !slot_filled(planner, day.date, true) {
                let req = SlotRequest {
                    category,
                    date: day.date,
                    weekday: day.weekday,
                    time: windows.closer,
                    role_filter: None,
                };
                super::select::select_and_assign(planner, &req);
            }
        }

        // Phase 3 : compléter le quota hebdomadaire du rôle requis
        loop {
            let mut progressed = false;
            for employee in &holders {
                if planner.working.week_shift_count(&employee.id, week) >= MAX_WEEKLY_SHIFTS {
                    continue;
                }
                let slot = days.iter().find(|d| {
                    rule.active_on(d.weekday)
                        && planner.table.is_open(d.weekday)
                        && planner.working.get(&employee.id, d.date).is_none()
                        && planner
                            .table
                            .windows(d.weekday)
                            .is_some_and(|w| {
                                is_eligible(
                                    employee,
                                    d.date,
                                    w.opener,
                                    &planner.working,
                                    planner.time_off,
                                )
                            })
                });
                let Some(day) = slot else {
                    continue;
                };
                let Some(windows) = planner.table.windows(day.weekday).copied() else {
                    continue;
                };
                let Some(adjusted) = adjusted_time(employee, day.weekday, windows.opener) else {
                    continue;
                };
                let date = day.date;
                planner
                    .working
                    .insert(&employee.id, date, Assignment::new(adjusted, category));
                planner.note(format!(
                    "assigned {} to {category} on {date} ({adjusted})",
                    employee.handle
                ));
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }
    Ok(())
}

/// Affecte à l'employé la fermeture du jour le moins pénalisant parmi
/// les jours actifs éligibles ; égalités départagées au hasard.
fn assign_best_close<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    rule: &ShiftRule,
    employee: &Employee,
    days: &[crate::week::DayInfo],
) -> bool {
    let weights = planner.config.weights;
    let mut candidates: Vec<(NaiveDate, chrono::Weekday, f64)> = Vec::new();
    {
        let history = planner.history();
        for day in days {
            if !rule.active_on(day.weekday) {
                continue;
            }
            let Some(windows) = planner.table.windows(day.weekday) else {
                continue;
            };
            let closer = windows.closer;
            if !is_eligible(employee, day.date, closer, &planner.working, planner.time_off) {
                continue;
            }
            // la plage rognée doit encore finir à l'heure de fermeture,
            // sinon l'affectation ne compterait jamais comme fermeture
            let Some(adjusted) = adjusted_time(employee, day.weekday, closer) else {
                continue;
            };
            let meta = classify(day.weekday, adjusted, &planner.table);
            if !meta.is_closing {
                continue;
            }
            let score = burden_score(&employee.id, &history, &planner.table, &weights, Some(&meta));
            candidates.push((day.date, day.weekday, score));
        }
    }
    if candidates.is_empty() {
        return false;
    }
    let best = super::select::lowest_scored(&candidates, |(_, _, s)| *s);
    let Some(&&(date, weekday, _)) = best.choose(&mut *planner.rng) else {
        return false;
    };
    let Some(windows) = planner.table.windows(weekday).copied() else {
        return false;
    };
    let Some(adjusted) = adjusted_time(employee, weekday, windows.closer) else {
        return false;
    };
    planner
        .working
        .insert(&employee.id, date, Assignment::new(adjusted, category));
    planner.note(format!(
        "assigned {} to {category} close on {date} ({adjusted})",
        employee.handle
    ));
    true
}

/// Un créneau (ouverture si `closing` est faux, fermeture sinon) est-il
/// déjà tenu ce jour-là ?
fn slot_filled<R: Rng>(planner: &Planner<'_, R>, date: NaiveDate, closing: bool) -> bool {
    planner.working.on_date(date).any(|(_, a)| {
        if a.is_off() {
            return false;
        }
        let meta = classify(chrono::Datelike::weekday(&date), a.time, &planner.table);
        if closing {
            meta.is_closing
        } else {
            meta.is_opening
        }
    })
}
