use crate::model::{
    DayWindow, Employee, Schedule, TimeOffKind, TimeOffRequest, TimeRange,
};
use crate::week::week_days;
use anyhow::{bail, Context};
use chrono::{NaiveDate, Weekday};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use std::str::FromStr;

/// Import d'employés depuis CSV :
/// header `handle,display_name,roles,categories[,availability]`.
/// Rôles et catégories séparés par `|` ; disponibilité en tronçons
/// `jour=plage` séparés par `;` (ex. `mon=9a-1p;sat=12p-9p`).
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        let roles = rec.get(2).context("missing roles")?.trim();
        if handle.is_empty() || display.is_empty() || roles.is_empty() {
            bail!("invalid staff row (empty)");
        }
        let mut employee = Employee::new(handle.to_string(), display.to_string());
        employee.roles = split_list(roles);
        if let Some(categories) = rec.get(3) {
            employee.categories = split_list(categories);
        }
        if let Some(avail) = rec.get(4) {
            let avail = avail.trim();
            if !avail.is_empty() {
                employee.availability = parse_availability(avail)
                    .with_context(|| format!("invalid availability for handle {handle}"))?;
            }
        }
        out.push(employee);
    }
    Ok(out)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_availability(raw: &str) -> anyhow::Result<Vec<DayWindow>> {
    raw.split(';')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| parse_availability_chunk(chunk.trim()))
        .collect()
}

fn parse_availability_chunk(chunk: &str) -> anyhow::Result<DayWindow> {
    let (day_raw, window_raw) = chunk
        .split_once('=')
        .with_context(|| format!("expected jour=plage, got: {chunk}"))?;
    let day = Weekday::from_str(day_raw.trim())
        .map_err(|_| anyhow::anyhow!("invalid weekday: {day_raw}"))?;
    let window = TimeRange::from_str(window_raw.trim()).map_err(anyhow::Error::msg)?;
    Ok(DayWindow { day, window })
}

/// Import d'absences : header `handle,start,end[,kind]`.
/// `kind` vaut `off` (défaut) ou une plage `"9a-5p"` pour un shift
/// précis demandé. Les handles sont résolus contre l'effectif.
pub fn import_time_off_csv<P: AsRef<Path>>(
    path: P,
    staff: &[Employee],
) -> anyhow::Result<Vec<TimeOffRequest>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let start = rec.get(1).context("missing start")?.trim();
        let end = rec.get(2).context("missing end")?.trim();
        let employee = staff
            .iter()
            .find(|e| e.handle == handle)
            .with_context(|| format!("unknown handle: {handle}"))?;
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").context("start date")?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").context("end date")?;
        let kind = match rec.get(3).map(str::trim) {
            None | Some("") | Some("off") => TimeOffKind::DayOff,
            Some(raw) => TimeOffKind::Shift(TimeRange::from_str(raw).map_err(anyhow::Error::msg)?),
        };
        let request = TimeOffRequest::new(employee.id.clone(), start, end, kind)
            .map_err(anyhow::Error::msg)?;
        out.push(request);
    }
    Ok(out)
}

/// Export CSV d'une semaine :
/// header `handle,date,time,type,locked`, ordre employé puis date.
pub fn export_week_csv<P: AsRef<Path>>(
    path: P,
    week: NaiveDate,
    schedule: &Schedule,
    staff: &[Employee],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["handle", "date", "time", "type", "locked"])?;
    let days = week_days(week);
    for (id, date, assignment) in schedule.iter() {
        if !days.iter().any(|d| d.date == date) {
            continue;
        }
        let handle = staff
            .iter()
            .find(|e| &e.id == id)
            .map(|e| e.handle.as_str())
            .unwrap_or_else(|| id.as_str());
        w.write_record([
            handle,
            date.to_string().as_str(),
            assignment.time.to_string().as_str(),
            assignment.category.as_str(),
            if assignment.locked { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}
