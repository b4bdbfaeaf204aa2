use crate::config::{CategoryKind, Config, OpeningTable};
use crate::eligibility::is_eligible;
use crate::fairness::classify;
use crate::model::{Employee, Schedule, TimeOffRequest};

use super::select::SlotRequest;

/// Filtre de base : éligibilité à la catégorie, filtre de rôle éventuel,
/// moteur d'éligibilité. Puis resserrement par catégorie : la rotation
/// préfère les spécialistes mono-rôle, puis bi-rôle, puis les porteurs
/// du rôle support ; un créneau d'ouverture préfère le rôle priorisé.
/// Vide = « rien à affecter cette fois », jamais une erreur.
pub(super) fn build_pool<'r>(
    roster: &'r [Employee],
    config: &Config,
    time_off: &[TimeOffRequest],
    working: &Schedule,
    table: &OpeningTable,
    req: &SlotRequest<'_>,
) -> Vec<&'r Employee> {
    let base: Vec<&Employee> = roster
        .iter()
        .filter(|e| {
            e.categories.iter().any(|c| c == req.category)
                && req.role_filter.as_ref().map_or(true, |f| f.passes(e))
                && is_eligible(e, req.date, req.time, working, time_off)
        })
        .collect();

    match config.rule(req.category).map(|r| &r.kind) {
        Some(CategoryKind::RotationDuty {
            specialist_role, ..
        }) => {
            let singles: Vec<&Employee> = base
                .iter()
                .copied()
                .filter(|e| e.roles.len() == 1 && e.roles[0] == *specialist_role)
                .collect();
            if !singles.is_empty() {
                return singles;
            }
            let duals: Vec<&Employee> = base
                .iter()
                .copied()
                .filter(|e| e.roles.len() == 2 && e.has_role(specialist_role))
                .collect();
            if !duals.is_empty() {
                return duals;
            }
            base.into_iter()
                .filter(|e| e.has_role(specialist_role))
                .collect()
        }
        Some(CategoryKind::OpenClose {
            opener_priority_role: Some(role),
            ..
        }) => {
            let meta = classify(req.weekday, req.time, table);
            if meta.is_opening && !meta.is_closing {
                let preferred: Vec<&Employee> =
                    base.iter().copied().filter(|e| e.has_role(role)).collect();
                if !preferred.is_empty() {
                    return preferred;
                }
            }
            base
        }
        _ => base,
    }
}
