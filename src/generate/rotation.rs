use chrono::Weekday;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::ShiftRule;
use crate::eligibility::{adjusted_time, is_eligible};
use crate::model::{Assignment, Employee, MAX_WEEKLY_SHIFTS};
use crate::week::week_days;

use super::{PlanError, Planner, RoleFilter, SlotRequest};

/// Rotation de spécialistes : phase 1, les mono-rôle remplissent leur
/// semaine via un bassin de jours pondéré (samedi favorisé tant que la
/// dette de week-end court) ; phase 2, remplissage par jour en ordre de
/// priorité via le sélecteur, spécialistes d'un rôle exclusif écartés.
pub(super) fn generate<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    rule: &ShiftRule,
    specialist_role: &str,
    excluded_role: Option<&str>,
    day_priority: &[Weekday],
    daily_max: u8,
) -> Result<(), PlanError> {
    let time = planner
        .config
        .default_time(category)
        .ok_or_else(|| PlanError::MissingDefaultTime(category.to_string()))?;

    // Phase 1 : spécialistes dont c'est l'unique rôle
    let specialists: Vec<Employee> = planner
        .roster
        .iter()
        .filter(|e| {
            e.roles.len() == 1
                && e.roles[0] == specialist_role
                && e.categories.iter().any(|c| c == category)
        })
        .cloned()
        .collect();

    for week in planner.weeks.clone() {
        let days = week_days(week);
        for employee in &specialists {
            while planner.working.week_shift_count(&employee.id, week) < MAX_WEEKLY_SHIFTS {
                let saturday_debt = planner.history().saturday_count(&employee.id) < 2;
                let eligible: Vec<(usize, Weekday, chrono::NaiveDate)> = days
                    .iter()
                    .filter(|d| {
                        rule.active_on(d.weekday)
                            && is_eligible(
                                employee,
                                d.date,
                                time,
                                &planner.working,
                                planner.time_off,
                            )
                    })
                    .map(|d| (day_weight(d.weekday, saturday_debt), d.weekday, d.date))
                    .collect();
                let Some(top) = eligible.iter().map(|(w, _, _)| *w).max() else {
                    break;
                };
                let best: Vec<&(usize, Weekday, chrono::NaiveDate)> =
                    eligible.iter().filter(|(w, _, _)| *w == top).collect();
                let Some(&&(_, weekday, date)) = best.choose(&mut *planner.rng) else {
                    break;
                };
                let Some(adjusted) = adjusted_time(employee, weekday, time) else {
                    break;
                };
                planner
                    .working
                    .insert(&employee.id, date, Assignment::new(adjusted, category));
                planner.note(format!(
                    "assigned {} to {category} on {date} ({adjusted})",
                    employee.handle
                ));
            }
        }
    }

    // Phase 2 : par jour, en ordre de priorité configuré
    for week in planner.weeks.clone() {
        let days = week_days(week);
        let mut ordered: Vec<Weekday> = day_priority.to_vec();
        for day in &days {
            if rule.active_on(day.weekday) && !ordered.contains(&day.weekday) {
                ordered.push(day.weekday);
            }
        }
        for weekday in ordered {
            let Some(day) = days.iter().find(|d| d.weekday == weekday) else {
                continue;
            };
            if !rule.active_on(day.weekday) {
                continue;
            }
            loop {
                let assigned = planner
                    .working
                    .on_date(day.date)
                    .filter(|(_, a)| a.category == category)
                    .count();
                if assigned >= usize::from(daily_max) {
                    break;
                }
                let req = SlotRequest {
                    category,
                    date: day.date,
                    weekday: day.weekday,
                    time,
                    role_filter: excluded_role.map(RoleFilter::Not),
                };
                if super::select::select_and_assign(planner, &req).is_none() {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Poids d'un jour dans le bassin de la phase 1 : samedi favorisé tant
/// que l'employé compte moins de 2 samedis récents, semaine sinon.
fn day_weight(weekday: Weekday, saturday_debt: bool) -> usize {
    let is_saturday = weekday == Weekday::Sat;
    if is_saturday == saturday_debt {
        2
    } else {
        1
    }
}
