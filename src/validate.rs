use chrono::NaiveDate;

use crate::config::{Config, OpeningTable};
use crate::fairness::{classify, week_close_count};
use crate::model::{Employee, Schedule};
use crate::week::week_days;

/// Balayage post-génération : avertissements lisibles, jamais d'erreur.
/// Déterministe et idempotent — deux passes sur le même planning
/// produisent les mêmes constats dans le même ordre.
pub fn validate(
    schedule: &Schedule,
    weeks: &[NaiveDate],
    config: &Config,
    roster: &[Employee],
) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some((_, rule, closer_role, min_closing)) = config.open_close_rule() else {
        return warnings;
    };
    let table = OpeningTable::build(&config.store_hours);

    // Jours ouverts actifs sans fermeture pourvue
    for week in weeks {
        for day in week_days(*week) {
            if !rule.active_on(day.weekday) || !table.is_open(day.weekday) {
                continue;
            }
            let closed = schedule.on_date(day.date).any(|(_, a)| {
                !a.is_off() && classify(day.weekday, a.time, &table).is_closing
            });
            if !closed {
                warnings.push(format!("no closer assigned on {}", day.date));
            }
        }
    }

    // Minimum de fermetures par porteur du rôle requis
    for employee in roster.iter().filter(|e| e.has_role(closer_role)) {
        for week in weeks {
            let closes = week_close_count(schedule, &employee.id, *week, &table);
            if closes < usize::from(min_closing) {
                warnings.push(format!(
                    "{} has {closes} closing shift(s) in week of {week}, required {min_closing}",
                    employee.display_name
                ));
            }
        }
    }

    warnings
}
