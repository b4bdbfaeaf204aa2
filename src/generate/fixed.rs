use rand::Rng;

use crate::config::ShiftRule;
use crate::eligibility::{adjusted_time, is_eligible};
use crate::model::{Assignment, Employee, TimeRange, MAX_WEEKLY_SHIFTS};
use crate::week::week_days;

use super::{PlanError, Planner};

/// Catégorie à plage unique : chaque employé éligible prend le premier
/// jour actif disponible, jusqu'au plafond hebdomadaire ou épuisement.
pub(super) fn generate<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    rule: &ShiftRule,
    time: TimeRange,
) -> Result<(), PlanError> {
    let eligible: Vec<Employee> = planner
        .roster
        .iter()
        .filter(|e| e.categories.iter().any(|c| c == category))
        .cloned()
        .collect();

    for week in planner.weeks.clone() {
        for employee in &eligible {
            while planner.working.week_shift_count(&employee.id, week) < MAX_WEEKLY_SHIFTS {
                let slot = week_days(week).into_iter().find(|d| {
                    rule.active_on(d.weekday)
                        && is_eligible(employee, d.date, time, &planner.working, planner.time_off)
                });
                let Some(day) = slot else {
                    break;
                };
                let Some(adjusted) = adjusted_time(employee, day.weekday, time) else {
                    break;
                };
                planner
                    .working
                    .insert(&employee.id, day.date, Assignment::new(adjusted, category));
                planner.note(format!(
                    "assigned {} to {category} on {} ({adjusted})",
                    employee.handle, day.date
                ));
            }
        }
    }
    Ok(())
}
