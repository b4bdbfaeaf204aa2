use chrono::NaiveDate;
use rand::Rng;

use crate::config::ShiftRule;
use crate::week::week_days;

use super::{PlanError, Planner, RoleFilter, SlotRequest};

/// Catégorie à quota quotidien : remplit chaque jour actif jusqu'au
/// headcount requis, puis tente la bascule d'une ouverture/fermeture
/// existante avant de constater le manque.
pub(super) fn generate<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    rule: &ShiftRule,
    supporting_roles: &[String],
    daily_required: u8,
) -> Result<(), PlanError> {
    let time = planner
        .config
        .default_time(category)
        .ok_or_else(|| PlanError::MissingDefaultTime(category.to_string()))?;
    let open_close = planner
        .config
        .open_close_rule()
        .map(|(id, _, _, _)| id.to_string());

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
                let req = SlotRequest {
                    category,
                    date: day.date,
                    weekday: day.weekday,
                    time,
                    role_filter: Some(RoleFilter::AnyOf(supporting_roles)),
                };
                if super::select::select_and_assign(planner, &req).is_some() {
                    continue;
                }
                if flip_existing(
                    planner,
                    category,
                    supporting_roles,
                    day.date,
                    open_close.as_deref(),
                ) {
                    continue;
                }
                planner.warn(format!(
                    "{category} on {}: required {required}, only {assigned} could be assigned",
                    day.date
                ));
                break;
            }
        }
    }
    Ok(())
}

/// Repli déterministe : rebadge en `category` une ouverture/fermeture
/// non verrouillée tenue ce jour-là par un porteur de rôle support.
fn flip_existing<R: Rng>(
    planner: &mut Planner<'_, R>,
    category: &str,
    supporting_roles: &[String],
    date: NaiveDate,
    open_close: Option<&str>,
) -> bool {
    let Some(open_close) = open_close else {
        return false;
    };
    let candidate = planner.working.on_date(date).find_map(|(id, a)| {
        if a.locked || a.category != open_close {
            return None;
        }
        let employee = planner.employee(id)?;
        if supporting_roles.iter().any(|r| employee.has_role(r)) {
            Some((id.clone(), employee.handle.clone()))
        } else {
            None
        }
    });
    let Some((id, handle)) = candidate else {
        return false;
    };
    if let Some(assignment) = planner.working.get_mut(&id, date) {
        assignment.category = category.to_string();
    }
    planner.note(format!(
        "flipped {handle}'s {open_close} shift on {date} to {category}"
    ));
    true
}
