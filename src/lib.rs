#![forbid(unsafe_code)]
//! Semainier — bibliothèque de planification hebdomadaire de boutique
//! (sans BD).
//!
//! - Stockage fichiers (JSON/CSV), un document par déploiement.
//! - Affectation gloutonne par catégorie de shift, scoring d'équité sur
//!   un historique glissant, départage aléatoire injectable.
//! - Validation non bloquante : tout manque se dégrade en avertissement.

pub mod config;
pub mod eligibility;
pub mod fairness;
pub mod generate;
pub mod io;
pub mod model;
pub mod storage;
pub mod validate;
pub mod week;

pub use config::{
    CategoryKind, Config, DayHours, FairnessWeights, OpeningTable, ShiftRule, StoreHours,
    LOOKBACK_WEEKS,
};
pub use fairness::{burden_score, category_score, display_scores, History};
pub use generate::{run_generation, PlanError, Planner, RunOutcome};
pub use model::{
    materialize_time_off, merge_weeks, split_by_week, Assignment, DayWindow, Employee, EmployeeId,
    Schedule, TimeOffKind, TimeOffRequest, TimeRange, MAX_WEEKLY_SHIFTS, OFF_CATEGORY,
};
pub use storage::{JsonStorage, PlanDocument, Storage};
pub use week::{week_days, week_key, week_span, DayInfo};
