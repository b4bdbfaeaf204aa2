use crate::config::{Config, FairnessWeights, ShiftRule, StoreHours};
use crate::model::{Employee, Schedule, TimeOffRequest, TimeRange};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Document unique persisté par déploiement : effectif, règles, heures,
/// règles avancées, plannings par semaine (clé = premier jour), absences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub staff: Vec<Employee>,
    #[serde(default)]
    pub shift_rules: BTreeMap<String, ShiftRule>,
    #[serde(default)]
    pub store_hours: StoreHours,
    #[serde(default)]
    pub advanced_rules: AdvancedRules,
    #[serde(default)]
    pub schedules: BTreeMap<NaiveDate, Schedule>,
    #[serde(default)]
    pub time_off: Vec<TimeOffRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedRules {
    #[serde(default)]
    pub fairness: FairnessRules,
    #[serde(default)]
    pub default_times: BTreeMap<String, TimeRange>,
    #[serde(default)]
    pub role_names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FairnessRules {
    #[serde(default)]
    pub weights: FairnessWeights,
}

impl PlanDocument {
    /// Vue configuration en lecture seule pour le moteur.
    pub fn config(&self) -> Config {
        Config {
            shift_rules: self.shift_rules.clone(),
            store_hours: self.store_hours.clone(),
            weights: self.advanced_rules.fairness.weights,
            default_times: self.advanced_rules.default_times.clone(),
            role_names: self.advanced_rules.role_names.clone(),
        }
    }
}

pub trait Storage {
    /// Charge le document depuis un support.
    fn load(&self) -> anyhow::Result<PlanDocument>;
    /// Sauvegarde de manière atomique.
    fn save(&self, doc: &PlanDocument) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<PlanDocument> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let doc: PlanDocument = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(doc)
    }

    fn save(&self, doc: &PlanDocument) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(doc)?;
        let mut tmp = NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
            .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
