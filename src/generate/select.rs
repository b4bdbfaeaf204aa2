use chrono::{NaiveDate, Weekday};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::CategoryKind;
use crate::eligibility::adjusted_time;
use crate::fairness::{burden_score, category_score, classify, week_close_count};
use crate::model::{Assignment, Employee, EmployeeId, TimeRange};
use crate::week::week_key;

use super::{pool, Planner};

/// Filtre de rôle appliqué au bassin de candidats.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RoleFilter<'r> {
    AnyOf(&'r [String]),
    Not(&'r str),
}

impl RoleFilter<'_> {
    pub(crate) fn passes(&self, employee: &Employee) -> bool {
        match self {
            RoleFilter::AnyOf(roles) => roles.iter().any(|r| employee.has_role(r)),
            RoleFilter::Not(role) => !employee.has_role(role),
        }
    }
}

/// Créneau à pourvoir : catégorie, jour, plage proposée, filtre de rôle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotRequest<'r> {
    pub category: &'r str,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub time: TimeRange,
    pub role_filter: Option<RoleFilter<'r>>,
}

/// Incrément de départage (< 0.1) proportionnel au nombre de shifts
/// déjà tenus ; trop petit pour réordonner des poids entiers.
fn tie_breaker(shift_count: usize) -> f64 {
    0.01 * shift_count.min(9) as f64
}

/// Candidats à égalité exacte sur le score minimal. La règle de
/// départage vit ici, quel que soit l'appelant.
pub(super) fn lowest_scored<T>(scored: &[T], score: impl Fn(&T) -> f64) -> Vec<&T> {
    let lowest = scored.iter().map(&score).fold(f64::INFINITY, f64::min);
    scored.iter().filter(|&item| score(item) == lowest).collect()
}

/// Sélectionne le candidat le moins chargé pour le créneau et commet
/// l'affectation (plage rognée par l'éligibilité, non verrouillée).
/// Les égalités exactes de score sont départagées uniformément au
/// hasard. Seule mutation du chemin de lecture.
pub(super) fn select_and_assign<R: Rng>(
    planner: &mut Planner<'_, R>,
    req: &SlotRequest<'_>,
) -> Option<EmployeeId> {
    let pool = pool::build_pool(
        planner.roster,
        planner.config,
        planner.time_off,
        &planner.working,
        &planner.table,
        req,
    );
    if pool.is_empty() {
        planner.warn(format!(
            "no eligible candidate for {} on {}",
            req.category, req.date
        ));
        return None;
    }

    let meta = classify(req.weekday, req.time, &planner.table);
    let rotation = matches!(
        planner.config.rule(req.category).map(|r| &r.kind),
        Some(CategoryKind::RotationDuty { .. })
    );
    let closer_role = planner
        .config
        .open_close_rule()
        .map(|(_, _, role, _)| role.to_string());
    let week = week_key(req.date);
    let weights = planner.config.weights;

    let mut scored: Vec<(EmployeeId, f64)> = Vec::with_capacity(pool.len());
    {
        let history = planner.history();
        for candidate in &pool {
            let mut score = if rotation {
                let mut s = category_score(&candidate.id, &history, req.category, &weights);
                if meta.is_saturday && history.saturday_count(&candidate.id) < 2 {
                    s += weights.weekend_debt_bonus;
                }
                s
            } else {
                burden_score(&candidate.id, &history, &planner.table, &weights, Some(&meta))
            };
            if meta.is_closing {
                let closes = week_close_count(&planner.working, &candidate.id, week, &planner.table);
                if closes == 0 {
                    // incite à satisfaire le minimum de fermetures du rôle
                    if closer_role.as_deref().is_some_and(|r| candidate.has_role(r)) {
                        score += weights.zero_close_bonus;
                    }
                } else {
                    // décourage d'empiler les fermetures d'une même semaine
                    score += weights.second_close_same_week * closes as f64;
                }
            }
            score += tie_breaker(planner.working.shift_count(&candidate.id));
            scored.push((candidate.id.clone(), score));
        }
    }

    let ties = lowest_scored(&scored, |(_, s)| *s);
    let chosen = ties.choose(&mut *planner.rng)?.0.clone();

    let employee = planner.employee(&chosen)?;
    let adjusted = adjusted_time(employee, req.weekday, req.time)?;
    let handle = employee.handle.clone();
    planner
        .working
        .insert(&chosen, req.date, Assignment::new(adjusted, req.category));
    planner.note(format!(
        "assigned {handle} to {} on {} ({adjusted})",
        req.category, req.date
    ));
    Some(chosen)
}
