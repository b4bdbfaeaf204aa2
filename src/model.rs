use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::week::{week_key, DAYS_PER_WEEK};

/// Catégorie réservée aux absences approuvées (entrées verrouillées).
pub const OFF_CATEGORY: &str = "off";

/// Catégorie des shifts précis demandés puis verrouillés.
pub const REQUEST_CATEGORY: &str = "request";

/// Plafond d'affectations hors absence par employé et par semaine.
pub const MAX_WEEKLY_SHIFTS: usize = 5;

/// Identifiant fort pour Employee
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plage horaire en heures pleines, intervalle semi-ouvert `[start, end)`.
///
/// Forme texte : `"9a-5p"` (12a = minuit, 12p = midi, 9p = 21h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    start: u8,
    end: u8,
}

impl TimeRange {
    pub fn new(start: u8, end: u8) -> Result<Self, String> {
        if end <= start || end > 24 {
            return Err(format!("invalid time range: {start}-{end}"));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u8 {
        self.start
    }
    pub fn end(&self) -> u8 {
        self.end
    }
    pub fn hours(&self) -> u8 {
        self.end - self.start
    }

    /// Intersection avec `other`, ou None si vide.
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            Some(TimeRange { start, end })
        } else {
            None
        }
    }
}

fn format_hour(hour: u8) -> String {
    match hour % 24 {
        0 => "12a".to_string(),
        12 => "12p".to_string(),
        h if h < 12 => format!("{h}a"),
        h => format!("{}p", h - 12),
    }
}

fn parse_hour(raw: &str) -> Result<u8, String> {
    let raw = raw.trim();
    if raw.len() < 2 {
        return Err(format!("invalid hour: {raw}"));
    }
    let (digits, suffix) = raw.split_at(raw.len() - 1);
    let hour: u8 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid hour: {raw}"))?;
    if hour == 0 || hour > 12 {
        return Err(format!("invalid hour: {raw}"));
    }
    match suffix {
        "a" | "A" => Ok(if hour == 12 { 0 } else { hour }),
        "p" | "P" => Ok(if hour == 12 { 12 } else { hour + 12 }),
        _ => Err(format!("invalid hour suffix: {raw}")),
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hour(self.start), format_hour(self.end))
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start_raw, end_raw) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid time range: {s}"))?;
        let start = parse_hour(start_raw)?;
        let mut end = parse_hour(end_raw)?;
        // "12a" en borne de fin = minuit du jour suivant
        if end == 0 {
            end = 24;
        }
        TimeRange::new(start, end)
    }
}

impl TryFrom<String> for TimeRange {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeRange> for String {
    fn from(t: TimeRange) -> String {
        t.to_string()
    }
}

/// Fenêtre de disponibilité d'un employé pour un jour de semaine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub day: Weekday,
    pub window: TimeRange,
}

/// Employé de la boutique (lecture seule pour le moteur).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub handle: String,
    pub display_name: String,
    /// Rôles tenus (jamais vide).
    pub roles: Vec<String>,
    /// Catégories de shift auxquelles l'employé est éligible.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Jour absent de la liste = disponible toute la journée.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability: Vec<DayWindow>,
}

impl Employee {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D) -> Self {
        Self {
            id: EmployeeId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            roles: Vec::new(),
            categories: Vec::new(),
            availability: Vec::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn availability_on(&self, day: Weekday) -> Option<TimeRange> {
        self.availability
            .iter()
            .find(|w| w.day == day)
            .map(|w| w.window)
    }
}

/// Type de demande d'absence ou de shift imposé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffKind {
    /// Journée(s) non travaillée(s).
    DayOff,
    /// Shift précis demandé (sera matérialisé verrouillé).
    Shift(TimeRange),
}

/// Demande approuvée, intervalle de dates inclusif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub employee: EmployeeId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: TimeOffKind,
}

impl TimeOffRequest {
    pub fn new(
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        kind: TimeOffKind,
    ) -> Result<Self, String> {
        if end < start {
            return Err("time off end must not precede start".to_string());
        }
        Ok(Self {
            employee,
            start,
            end,
            kind,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Seules les journées complètes bloquent l'éligibilité ; une demande
    /// de shift précis devient une entrée verrouillée dans le planning.
    pub fn blocks(&self, date: NaiveDate) -> bool {
        matches!(self.kind, TimeOffKind::DayOff) && self.covers(date)
    }
}

/// Affectation d'un employé pour une date (la date est portée par la clé).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub time: TimeRange,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub locked: bool,
}

impl Assignment {
    pub fn new(time: TimeRange, category: impl Into<String>) -> Self {
        Self {
            time,
            category: category.into(),
            locked: false,
        }
    }

    pub fn is_off(&self) -> bool {
        self.category == OFF_CATEGORY
    }
}

/// Planning : employé → date → affectation.
///
/// Invariants : au plus une affectation par (employé, date) ; au plus
/// [`MAX_WEEKLY_SHIFTS`] affectations hors absence par employé et par
/// semaine. L'ordre d'itération (id puis date) fixe l'ordre des sorties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule(pub BTreeMap<EmployeeId, BTreeMap<NaiveDate, Assignment>>);

impl Schedule {
    pub fn get(&self, employee: &EmployeeId, date: NaiveDate) -> Option<&Assignment> {
        self.0.get(employee).and_then(|days| days.get(&date))
    }

    pub fn get_mut(&mut self, employee: &EmployeeId, date: NaiveDate) -> Option<&mut Assignment> {
        self.0.get_mut(employee).and_then(|days| days.get_mut(&date))
    }

    pub fn insert(&mut self, employee: &EmployeeId, date: NaiveDate, assignment: Assignment) {
        self.0
            .entry(employee.clone())
            .or_default()
            .insert(date, assignment);
    }

    /// Itère (employé, date, affectation) en ordre déterministe.
    pub fn iter(&self) -> impl Iterator<Item = (&EmployeeId, NaiveDate, &Assignment)> {
        self.0
            .iter()
            .flat_map(|(id, days)| days.iter().map(move |(date, a)| (id, *date, a)))
    }

    pub fn assignments_for(
        &self,
        employee: &EmployeeId,
    ) -> impl Iterator<Item = (NaiveDate, &Assignment)> {
        self.0
            .get(employee)
            .into_iter()
            .flat_map(|days| days.iter().map(|(date, a)| (*date, a)))
    }

    /// Affectations hors absence de l'employé dans la semaine de `week`.
    pub fn week_shift_count(&self, employee: &EmployeeId, week: NaiveDate) -> usize {
        self.assignments_for(employee)
            .filter(|(date, a)| week_key(*date) == week && !a.is_off())
            .count()
    }

    /// Total d'affectations hors absence de l'employé, toutes dates.
    pub fn shift_count(&self, employee: &EmployeeId) -> usize {
        self.assignments_for(employee)
            .filter(|(_, a)| !a.is_off())
            .count()
    }

    /// Affectations d'une date donnée, tous employés.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = (&EmployeeId, &Assignment)> {
        self.0
            .iter()
            .filter_map(move |(id, days)| days.get(&date).map(|a| (id, a)))
    }
}

/// Fusionne les semaines demandées en un planning de travail jetable.
pub fn merge_weeks(schedules: &BTreeMap<NaiveDate, Schedule>, weeks: &[NaiveDate]) -> Schedule {
    let mut merged = Schedule::default();
    for week in weeks {
        if let Some(schedule) = schedules.get(week) {
            for (id, date, assignment) in schedule.iter() {
                merged.insert(id, date, assignment.clone());
            }
        }
    }
    merged
}

/// Redécoupe un planning de travail par semaine (clé = dimanche).
pub fn split_by_week(working: &Schedule) -> BTreeMap<NaiveDate, Schedule> {
    let mut out: BTreeMap<NaiveDate, Schedule> = BTreeMap::new();
    for (id, date, assignment) in working.iter() {
        out.entry(week_key(date))
            .or_default()
            .insert(id, date, assignment.clone());
    }
    out
}

/// Matérialise les demandes approuvées en entrées verrouillées sur les
/// semaines visées : journée off ou shift imposé. À exécuter avant toute
/// génération (c'est l'importeur externe de la frontière).
pub fn materialize_time_off(
    schedules: &mut BTreeMap<NaiveDate, Schedule>,
    requests: &[TimeOffRequest],
    weeks: &[NaiveDate],
) {
    let full_day = TimeRange { start: 0, end: 24 };
    for week in weeks {
        let schedule = schedules.entry(*week).or_default();
        for offset in 0..DAYS_PER_WEEK {
            let date = *week + chrono::Duration::days(offset as i64);
            for request in requests.iter().filter(|r| r.covers(date)) {
                if schedule.get(&request.employee, date).is_some() {
                    continue;
                }
                let (time, category) = match &request.kind {
                    // plage conventionnelle, ignorée par le scoring
                    TimeOffKind::DayOff => (full_day, OFF_CATEGORY),
                    TimeOffKind::Shift(time) => (*time, REQUEST_CATEGORY),
                };
                schedule.insert(
                    &request.employee,
                    date,
                    Assignment {
                        time,
                        category: category.to_string(),
                        locked: true,
                    },
                );
            }
        }
    }
}
