mod fixed;
mod openclose;
mod pool;
mod priority;
mod quota;
mod rotation;
mod select;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;

use crate::config::{CategoryKind, Config, OpeningTable, LOOKBACK_WEEKS};
use crate::fairness::History;
use crate::model::{merge_weeks, split_by_week, Employee, EmployeeId, Schedule, TimeOffRequest};
use crate::validate;

pub(crate) use select::{RoleFilter, SlotRequest};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("no shift rule configured for category: {0}")]
    MissingRule(String),
    #[error("no default time configured for category: {0}")]
    MissingDefaultTime(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Résultat d'une passe : plannings redécoupés par semaine, journal
/// ordonné de chaque affectation/bascule, et avertissements (manques,
/// constats du validateur). Jamais d'échec au-delà de [`PlanError`].
#[derive(Debug)]
pub struct RunOutcome {
    pub weeks: BTreeMap<NaiveDate, Schedule>,
    pub log: Vec<String>,
    pub warnings: Vec<String>,
}

/// Planificateur d'une passe de génération : possède seul le planning
/// de travail fusionné le temps de la passe. Exécution synchrone,
/// mono-thread ; la source aléatoire est injectée (graine fixable en
/// test).
pub struct Planner<'a, R: Rng> {
    pub(crate) roster: &'a [Employee],
    pub(crate) config: &'a Config,
    pub(crate) time_off: &'a [TimeOffRequest],
    pub(crate) past: &'a BTreeMap<NaiveDate, Schedule>,
    pub(crate) table: OpeningTable,
    pub(crate) weeks: Vec<NaiveDate>,
    pub(crate) working: Schedule,
    pub(crate) rng: &'a mut R,
    log: Vec<String>,
    warnings: Vec<String>,
}

impl<'a, R: Rng> Planner<'a, R> {
    pub fn new(
        roster: &'a [Employee],
        config: &'a Config,
        time_off: &'a [TimeOffRequest],
        schedules: &'a BTreeMap<NaiveDate, Schedule>,
        weeks: &[NaiveDate],
        rng: &'a mut R,
    ) -> Self {
        Self {
            roster,
            config,
            time_off,
            past: schedules,
            table: OpeningTable::build(&config.store_hours),
            weeks: weeks.to_vec(),
            working: merge_weeks(schedules, weeks),
            rng,
            log: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Déroule le générateur de la catégorie demandée sur les semaines
    /// cibles. Seule une règle absente fait échouer la catégorie ; tout
    /// autre manque se dégrade en avertissement journalisé.
    pub fn generate(&mut self, category: &str) -> Result<(), PlanError> {
        let config = self.config;
        let rule = config
            .rule(category)
            .ok_or_else(|| PlanError::MissingRule(category.to_string()))?;
        match &rule.kind {
            CategoryKind::Quota {
                supporting_roles,
                daily_required,
            } => quota::generate(self, category, rule, supporting_roles, *daily_required),
            CategoryKind::RotationDuty {
                specialist_role,
                excluded_role,
                day_priority,
                daily_max,
            } => rotation::generate(
                self,
                category,
                rule,
                specialist_role,
                excluded_role.as_deref(),
                day_priority,
                *daily_max,
            ),
            CategoryKind::PriorityMultiSlot {
                supporting_role,
                variants,
                daily_required,
            } => priority::generate(self, category, rule, supporting_role, variants, *daily_required),
            CategoryKind::FixedHours { time } => fixed::generate(self, category, rule, *time),
            CategoryKind::OpenClose {
                closer_role,
                min_closing_shifts,
                ..
            } => openclose::generate(self, category, rule, closer_role, *min_closing_shifts),
        }
    }

    /// Clôt la passe : validation du planning de travail, redécoupage
    /// par semaine.
    pub fn finish(mut self) -> RunOutcome {
        let findings = validate::validate(&self.working, &self.weeks, self.config, self.roster);
        for finding in findings {
            self.warn(finding);
        }
        let mut weeks = split_by_week(&self.working);
        for week in &self.weeks {
            weeks.entry(*week).or_default();
        }
        RunOutcome {
            weeks,
            log: self.log,
            warnings: self.warnings,
        }
    }

    pub(crate) fn history(&self) -> History<'_> {
        History::collect(self.past, self.weeks[0], LOOKBACK_WEEKS, &self.working)
    }

    pub(crate) fn employee(&self, id: &EmployeeId) -> Option<&'a Employee> {
        self.roster.iter().find(|e| &e.id == id)
    }

    pub(crate) fn note(&mut self, message: String) {
        self.log.push(message);
    }

    pub(crate) fn warn(&mut self, message: String) {
        self.log.push(message.clone());
        self.warnings.push(message);
    }
}

/// Passe complète pour une catégorie : fusion des semaines visées,
/// génération, validation, redécoupage.
pub fn run_generation<R: Rng>(
    roster: &[Employee],
    config: &Config,
    time_off: &[TimeOffRequest],
    schedules: &BTreeMap<NaiveDate, Schedule>,
    weeks: &[NaiveDate],
    category: &str,
    rng: &mut R,
) -> Result<RunOutcome, PlanError> {
    let mut planner = Planner::new(roster, config, time_off, schedules, weeks, rng);
    planner.generate(category)?;
    Ok(planner.finish())
}
