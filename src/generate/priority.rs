use chrono::NaiveDate;
use rand::Rng;

use crate::config::ShiftRule;
use crate::eligibility::{adjusted_time, is_eligible};
use crate::model::{Assignment, Employee, TimeRange};
use crate::week::week_days;

use super::{PlanError, Planner, SlotRequest};

/// Catégorie multi-créneaux : phase 1, chaque jour tente les variantes
/// horaires de la plus prioritaire à la moins prioritaire jusqu'au
/// headcount requis ; phase 2, complète la semaine des employés dont
/// c'est l'unique rôle (affectations + absences comptant comme jours
/// travaillés) avec la première combinaison jour/variante éligible.
pub(super) fn generate<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    rule: &ShiftRule,
    supporting_role: &str,
    variants: &[TimeRange],
    daily_required: u8,
) -> Result<(), PlanError> {
    // Phase 1 : remplissage par priorité de variante
    for week in planner.weeks.clone() {
        for day in week_days(week) {
            if !rule.active_on(day.weekday) {
                continue;
            }
            let required = usize::from(rule.required_on(day.weekday).unwrap_or(daily_required));
            loop {
                let assigned = planner
                    .working
                    .on_date(day.date)
                    .filter(|(_, a)| a.category == category)
                    .count();
                if assigned >= required {
                    break;
                }
                let mut progressed = false;
                for time in variants {
                    let req = SlotRequest {
                        category,
                        date: day.date,
                        weekday: day.weekday,
                        time: *time,
                        role_filter: None,
                    };
                    if super::select::select_and_assign(planner, &req).is_some() {
                        progressed = true;
                        break;
                    }
                }
                if !progressed {
                    planner.warn(format!(
                        "{category} on {}: required {required}, only {assigned} could be assigned",
                        day.date
                    ));
                    break;
                }
            }
        }
    }

    // Phase 2 : complément pour les porteurs exclusifs du rôle support
    let sole_role: Vec<Employee> = planner
        .roster
        .iter()
        .filter(|e| e.roles.len() == 1 && e.roles[0] == supporting_role)
        .cloned()
        .collect();
    loop {
        let mut progressed = false;
        for employee in &sole_role {
            for week in planner.weeks.clone() {
                if week_work_days(planner, employee, week) >= crate::model::MAX_WEEKLY_SHIFTS {
                    continue;
                }
                'scan: for day in week_days(week) {
                    if !rule.active_on(day.weekday) {
                        continue;
                    }
                    for time in variants {
                        if !is_eligible(
                            employee,
                            day.date,
                            *time,
                            &planner.working,
                            planner.time_off,
                        ) {
                            continue;
                        }
                        let Some(adjusted) = adjusted_time(employee, day.weekday, *time) else {
                            continue;
                        };
                        planner.working.insert(
                            &employee.id,
                            day.date,
                            Assignment::new(adjusted, category),
                        );
                        planner.note(format!(
                            "assigned {} to {category} on {} ({adjusted})",
                            employee.handle, day.date
                        ));
                        progressed = true;
                        break 'scan;
                    }
                }
            }
        }
        if !progressed {
            break;
        }
    }
    Ok(())
}

/// Jours « travaillés » de la semaine : toute date portant une
/// affectation (absence comprise) ou couverte par une absence approuvée.
fn week_work_days<R: Rng>(planner: &Planner<'_, R>, employee: &Employee, week: NaiveDate) -> usize {
    week_days(week)
        .iter()
        .filter(|d| {
            planner.working.get(&employee.id, d.date).is_some()
                || planner
                    .time_off
                    .iter()
                    .any(|r| r.employee == employee.id && r.blocks(d.date))
        })
        .count()
}
