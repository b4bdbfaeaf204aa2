use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::{FairnessWeights, OpeningTable};
use crate::model::{Assignment, Employee, EmployeeId, Schedule, TimeRange};
use crate::week::week_key;

/// Fenêtre d'historique : jusqu'à N semaines finalisées avant la
/// semaine courante, plus le planning de travail en cours. Lecture
/// seule pendant le scoring.
#[derive(Debug)]
pub struct History<'a> {
    weeks: Vec<&'a Schedule>,
}

impl<'a> History<'a> {
    /// Sélectionne les `lookback` semaines les plus récentes strictement
    /// antérieures à `current`, puis ajoute le planning de travail.
    pub fn collect(
        past: &'a BTreeMap<NaiveDate, Schedule>,
        current: NaiveDate,
        lookback: usize,
        working: &'a Schedule,
    ) -> Self {
        let mut weeks: Vec<&Schedule> = past
            .range(..current)
            .rev()
            .take(lookback)
            .map(|(_, s)| s)
            .collect();
        weeks.reverse();
        weeks.push(working);
        Self { weeks }
    }

    pub fn assignments_of<'b>(
        &'b self,
        employee: &'b EmployeeId,
    ) -> impl Iterator<Item = (NaiveDate, &'b Assignment)> + 'b {
        self.weeks
            .iter()
            .flat_map(move |week| week.assignments_for(employee))
    }

    /// Samedis travaillés par l'employé sur toute la fenêtre.
    pub fn saturday_count(&self, employee: &EmployeeId) -> usize {
        self.assignments_of(employee)
            .filter(|(date, a)| date.weekday() == Weekday::Sat && !a.is_off())
            .count()
    }

    /// Occurrences d'une catégorie donnée sur toute la fenêtre.
    pub fn category_count(&self, employee: &EmployeeId, category: &str) -> usize {
        self.assignments_of(employee)
            .filter(|(_, a)| a.category == category)
            .count()
    }
}

/// Classification d'un créneau contre les fenêtres du jour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMeta {
    pub weekday: Weekday,
    pub is_opening: bool,
    pub is_closing: bool,
    pub is_saturday: bool,
    pub is_friday: bool,
}

/// Compare une plage aux fenêtres d'ouverture/fermeture du jour :
/// fermeture = finit à l'heure de fermeture, ouverture = commence à
/// l'heure d'ouverture.
pub fn classify(weekday: Weekday, time: TimeRange, table: &OpeningTable) -> SlotMeta {
    let (is_opening, is_closing) = match table.windows(weekday) {
        Some(w) => (
            time.start() == w.opener.start(),
            time.end() == w.closer.end(),
        ),
        None => (false, false),
    };
    SlotMeta {
        weekday,
        is_opening,
        is_closing,
        is_saturday: weekday == Weekday::Sat,
        is_friday: weekday == Weekday::Fri,
    }
}

/// Pénalité d'un créneau, par ordre de priorité : fermeture de samedi >
/// fermeture de vendredi > fermeture > samedi > ouverture > rien.
fn slot_penalty(meta: &SlotMeta, weights: &FairnessWeights) -> f64 {
    if meta.is_closing && meta.is_saturday {
        weights.saturday_close
    } else if meta.is_closing && meta.is_friday {
        weights.friday_close
    } else if meta.is_closing {
        weights.closing
    } else if meta.is_saturday {
        weights.saturday
    } else if meta.is_opening {
        weights.opening
    } else {
        0.0
    }
}

/// Score de charge (« burden ») d'un employé sur la fenêtre
/// d'historique. Plus bas = moins chargé ; le sélecteur favorise le
/// minimum. `assume` ajoute le coût marginal du créneau envisagé.
/// Les égalités sont attendues et résolues ailleurs.
pub fn burden_score(
    employee: &EmployeeId,
    history: &History<'_>,
    table: &OpeningTable,
    weights: &FairnessWeights,
    assume: Option<&SlotMeta>,
) -> f64 {
    let mut score = 0.0;
    for (date, assignment) in history.assignments_of(employee) {
        if assignment.is_off() {
            continue;
        }
        let meta = classify(date.weekday(), assignment.time, table);
        score += slot_penalty(&meta, weights);
    }
    if let Some(meta) = assume {
        score += slot_penalty(meta, weights);
    }
    score
}

/// Variante par catégorie : compte uniquement les affectations de la
/// catégorie, sans classification ouverture/fermeture.
pub fn category_score(
    employee: &EmployeeId,
    history: &History<'_>,
    category: &str,
    weights: &FairnessWeights,
) -> f64 {
    history.category_count(employee, category) as f64 * weights.duty
}

/// Fermetures tenues par l'employé dans la semaine de `week`, sur le
/// planning donné.
pub fn week_close_count(
    schedule: &Schedule,
    employee: &EmployeeId,
    week: NaiveDate,
    table: &OpeningTable,
) -> usize {
    schedule
        .assignments_for(employee)
        .filter(|(date, a)| {
            week_key(*date) == week
                && !a.is_off()
                && classify(date.weekday(), a.time, table).is_closing
        })
        .count()
}

/// Scores d'affichage par employé : (charge, score de catégorie).
/// Fonction pure de l'effectif et de l'historique, indépendante de
/// toute passe de génération.
pub fn display_scores(
    roster: &[Employee],
    history: &History<'_>,
    table: &OpeningTable,
    weights: &FairnessWeights,
    category: &str,
) -> Vec<(EmployeeId, f64, f64)> {
    roster
        .iter()
        .map(|e| {
            (
                e.id.clone(),
                burden_score(&e.id, history, table, weights, None),
                category_score(&e.id, history, category, weights),
            )
        })
        .collect()
}
