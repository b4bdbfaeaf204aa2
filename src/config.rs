use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::model::TimeRange;
use crate::week::{day_index, DAYS_PER_WEEK};

/// Profondeur de l'historique utilisé par le scoring d'équité.
pub const LOOKBACK_WEEKS: usize = 4;

/// Durées par défaut des créneaux d'ouverture et de fermeture.
const OPENER_HOURS: u8 = 8;
const CLOSER_HOURS: u8 = 9;

/// Poids de pénalité du scoring d'équité. Tous positifs ou nuls, sauf
/// les deux bonus (négatifs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessWeights {
    pub closing: f64,
    pub saturday: f64,
    pub friday_close: f64,
    pub saturday_close: f64,
    pub opening: f64,
    pub duty: f64,
    /// Incrément par fermeture déjà tenue dans la même semaine.
    pub second_close_same_week: f64,
    /// Bonus (négatif) pour le rôle fermeture obligatoire encore à zéro.
    pub zero_close_bonus: f64,
    /// Bonus (négatif) de dette de week-end pour la rotation.
    pub weekend_debt_bonus: f64,
}

impl Default for FairnessWeights {
    fn default() -> Self {
        Self {
            closing: 3.0,
            saturday: 2.0,
            friday_close: 4.0,
            saturday_close: 5.0,
            opening: 0.0,
            duty: 2.0,
            second_close_same_week: 4.0,
            zero_close_bonus: -50.0,
            weekend_debt_bonus: -3.0,
        }
    }
}

/// Headcount requis pour un jour donné.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: Weekday,
    pub count: u8,
}

/// Borne min/max par rôle, portée pour la validation externe ; le
/// moteur ne l'applique pas au-delà du filtrage d'éligibilité.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLimit {
    pub role: String,
    #[serde(default)]
    pub min: Option<u8>,
    #[serde(default)]
    pub max: Option<u8>,
}

/// Paramètres propres à chaque famille de générateur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryKind {
    /// Headcount quotidien à atteindre, avec bascule d'étiquette en repli.
    Quota {
        supporting_roles: Vec<String>,
        daily_required: u8,
    },
    /// Rotation de spécialistes avec rattrapage de week-end.
    RotationDuty {
        specialist_role: String,
        #[serde(default)]
        excluded_role: Option<String>,
        #[serde(default = "default_day_priority")]
        day_priority: Vec<Weekday>,
        daily_max: u8,
    },
    /// Variantes horaires classées par priorité décroissante.
    PriorityMultiSlot {
        supporting_role: String,
        variants: Vec<TimeRange>,
        daily_required: u8,
    },
    /// Une seule plage horaire par défaut.
    FixedHours { time: TimeRange },
    /// Créneaux d'ouverture et de fermeture de la boutique.
    OpenClose {
        closer_role: String,
        #[serde(default = "default_min_closing")]
        min_closing_shifts: u8,
        #[serde(default)]
        opener_priority_role: Option<String>,
    },
}

fn default_day_priority() -> Vec<Weekday> {
    vec![Weekday::Sat, Weekday::Fri, Weekday::Mon]
}

fn default_min_closing() -> u8 {
    1
}

/// Règle d'une catégorie de shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRule {
    /// Jours de semaine où la catégorie s'applique.
    pub days: Vec<Weekday>,
    /// Headcount requis par jour (prime sur le défaut de la famille).
    #[serde(default)]
    pub required: Vec<DayCount>,
    #[serde(default)]
    pub role_limits: Vec<RoleLimit>,
    #[serde(flatten)]
    pub kind: CategoryKind,
}

impl ShiftRule {
    pub fn active_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    pub fn required_on(&self, day: Weekday) -> Option<u8> {
        self.required
            .iter()
            .find(|r| r.day == day)
            .map(|r| r.count)
    }
}

/// Heures d'ouverture : `open >= close` ou jour absent = fermé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: Weekday,
    pub open: u8,
    pub close: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHours {
    pub days: Vec<DayHours>,
}

impl StoreHours {
    pub fn hours_on(&self, day: Weekday) -> Option<(u8, u8)> {
        self.days
            .iter()
            .find(|h| h.day == day && h.open < h.close && h.close <= 24)
            .map(|h| (h.open, h.close))
    }
}

/// Configuration complète passée en lecture seule au moteur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shift_rules: BTreeMap<String, ShiftRule>,
    #[serde(default)]
    pub store_hours: StoreHours,
    #[serde(default)]
    pub weights: FairnessWeights,
    /// Plage par défaut par catégorie (forme `"9a-5p"`).
    #[serde(default)]
    pub default_times: BTreeMap<String, TimeRange>,
    /// Nom d'affichage par rôle.
    #[serde(default)]
    pub role_names: BTreeMap<String, String>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        for (category, rule) in &self.shift_rules {
            if category.trim().is_empty() {
                bail!("category id cannot be empty");
            }
            if rule.days.is_empty() {
                bail!("category {category} must define at least one day");
            }
            match &rule.kind {
                CategoryKind::Quota {
                    supporting_roles, ..
                } if supporting_roles.is_empty() => {
                    bail!("category {category} must define supporting roles");
                }
                CategoryKind::PriorityMultiSlot { variants, .. } if variants.is_empty() => {
                    bail!("category {category} must define at least one time variant");
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn rule(&self, category: &str) -> Option<&ShiftRule> {
        self.shift_rules.get(category)
    }

    pub fn default_time(&self, category: &str) -> Option<TimeRange> {
        self.default_times.get(category).copied()
    }

    /// Catégorie ouverture/fermeture et ses paramètres, s'il y en a une.
    pub fn open_close_rule(&self) -> Option<(&str, &ShiftRule, &str, u8)> {
        self.shift_rules.iter().find_map(|(id, rule)| {
            if let CategoryKind::OpenClose {
                closer_role,
                min_closing_shifts,
                ..
            } = &rule.kind
            {
                Some((id.as_str(), rule, closer_role.as_str(), *min_closing_shifts))
            } else {
                None
            }
        })
    }
}

/// Fenêtres d'ouverture et de fermeture d'un jour ouvert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindows {
    pub opener: TimeRange,
    pub closer: TimeRange,
}

/// Fenêtres ouverture/fermeture par jour de semaine, dérivées une seule
/// fois des heures de la boutique et mémoïsées pour toute la passe.
#[derive(Debug, Clone)]
pub struct OpeningTable {
    days: [Option<DayWindows>; DAYS_PER_WEEK],
}

impl OpeningTable {
    pub fn build(hours: &StoreHours) -> Self {
        let mut days = [None; DAYS_PER_WEEK];
        for day in [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ] {
            let Some((open, close)) = hours.hours_on(day) else {
                continue;
            };
            let opener_end = close.min(open + OPENER_HOURS);
            let closer_start = open.max(close.saturating_sub(CLOSER_HOURS));
            let (Ok(opener), Ok(closer)) = (
                TimeRange::new(open, opener_end),
                TimeRange::new(closer_start, close),
            ) else {
                continue;
            };
            days[day_index(day)] = Some(DayWindows { opener, closer });
        }
        Self { days }
    }

    pub fn windows(&self, day: Weekday) -> Option<&DayWindows> {
        self.days[day_index(day)].as_ref()
    }

    pub fn is_open(&self, day: Weekday) -> bool {
        self.days[day_index(day)].is_some()
    }
}
