#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::{NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use semainier::{
    config::{CategoryKind, DayHours, ShiftRule},
    fairness::History,
    io,
    model::{materialize_time_off, merge_weeks},
    storage::{JsonStorage, Storage},
    week::{week_key, week_span},
    run_generation, validate, OpeningTable, LOOKBACK_WEEKS,
};

/// CLI minimaliste de planification hebdomadaire (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du document de planning
    #[arg(long, global = true, default_value = "planning.json")]
    file: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer un document de départ (heures 9-21 lun-sam, ouverture/fermeture)
    Init,

    /// Importer des employés depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer des absences approuvées depuis un CSV
    ImportTimeOff {
        #[arg(long)]
        csv: String,
    },

    /// Générer une catégorie de shifts sur une ou plusieurs semaines
    Generate {
        #[arg(long)]
        category: String,
        /// Date quelconque de la première semaine visée (YYYY-MM-DD)
        #[arg(long)]
        week: String,
        #[arg(long, default_value_t = 1)]
        weeks: usize,
        /// Graine aléatoire pour un résultat reproductible
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Vérifier un planning existant
    Validate {
        #[arg(long)]
        week: String,
        #[arg(long, default_value_t = 1)]
        weeks: usize,
    },

    /// Scores d'équité par employé (charge, catégorie)
    Scores {
        #[arg(long)]
        week: String,
        #[arg(long)]
        category: String,
    },

    /// Lister les affectations d'une semaine
    List {
        #[arg(long)]
        week: String,
    },

    /// Exporter une semaine en CSV
    Export {
        #[arg(long)]
        week: String,
        #[arg(long)]
        out_csv: String,
    },
}

fn parse_week(raw: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    Ok(week_key(date))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        use tracing_subscriber::{fmt::Subscriber, EnvFilter};
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.file)?;
    let mut doc = storage.load().unwrap_or_default();

    let code = match cli.cmd {
        Commands::Init => {
            let open_days = [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ];
            doc.store_hours.days = open_days
                .iter()
                .map(|day| DayHours {
                    day: *day,
                    open: 9,
                    close: 21,
                })
                .collect();
            doc.shift_rules.insert(
                "openclose".to_string(),
                ShiftRule {
                    days: open_days.to_vec(),
                    required: Vec::new(),
                    role_limits: Vec::new(),
                    kind: CategoryKind::OpenClose {
                        closer_role: "APM".to_string(),
                        min_closing_shifts: 1,
                        opener_priority_role: Some("SM".to_string()),
                    },
                },
            );
            storage.save(&doc)?;
            println!("Initialized {}", cli.file);
            0
        }
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            doc.staff.extend(staff);
            storage.save(&doc)?;
            0
        }
        Commands::ImportTimeOff { csv } => {
            let requests = io::import_time_off_csv(csv, &doc.staff)?;
            doc.time_off.extend(requests);
            storage.save(&doc)?;
            0
        }
        Commands::Generate {
            category,
            week,
            weeks,
            seed,
        } => {
            let config = doc.config();
            config.validate()?;
            let span = week_span(parse_week(&week)?, weeks);
            materialize_time_off(&mut doc.schedules, &doc.time_off, &span);
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_os_rng(),
            };
            let outcome = run_generation(
                &doc.staff,
                &config,
                &doc.time_off,
                &doc.schedules,
                &span,
                &category,
                &mut rng,
            )?;
            for line in &outcome.log {
                println!("{line}");
            }
            let warned = !outcome.warnings.is_empty();
            for (week, schedule) in outcome.weeks {
                doc.schedules.insert(week, schedule);
            }
            storage.save(&doc)?;
            // Code 2 = WARNING/INCOMPLETE
            if warned {
                2
            } else {
                0
            }
        }
        Commands::Validate { week, weeks } => {
            let config = doc.config();
            let span = week_span(parse_week(&week)?, weeks);
            let working = merge_weeks(&doc.schedules, &span);
            let warnings = validate::validate(&working, &span, &config, &doc.staff);
            if warnings.is_empty() {
                println!("OK: no findings");
                0
            } else {
                for w in &warnings {
                    eprintln!("{w}");
                }
                2
            }
        }
        Commands::Scores { week, category } => {
            let config = doc.config();
            let key = parse_week(&week)?;
            let working = doc.schedules.get(&key).cloned().unwrap_or_default();
            let table = OpeningTable::build(&config.store_hours);
            let history =
                History::collect(&doc.schedules, key, LOOKBACK_WEEKS, &working);
            let scores = semainier::display_scores(
                &doc.staff,
                &history,
                &table,
                &config.weights,
                &category,
            );
            for (id, burden, category_score) in scores {
                let name = doc
                    .staff
                    .iter()
                    .find(|e| e.id == id)
                    .map(|e| e.display_name.as_str())
                    .unwrap_or("?");
                println!("{name} | burden {burden:.1} | {category} {category_score:.1}");
            }
            0
        }
        Commands::List { week } => {
            let key = parse_week(&week)?;
            let Some(schedule) = doc.schedules.get(&key) else {
                bail!("no schedule stored for week of {key}");
            };
            for (id, date, assignment) in schedule.iter() {
                let handle = doc
                    .staff
                    .iter()
                    .find(|e| &e.id == id)
                    .map(|e| e.handle.as_str())
                    .unwrap_or_else(|| id.as_str());
                println!(
                    "{date} | {handle} | {} | {}{}",
                    assignment.time,
                    assignment.category,
                    if assignment.locked { " (locked)" } else { "" }
                );
            }
            0
        }
        Commands::Export { week, out_csv } => {
            let key = parse_week(&week)?;
            let Some(schedule) = doc.schedules.get(&key) else {
                bail!("no schedule stored for week of {key}");
            };
            io::export_week_csv(out_csv, key, schedule, &doc.staff)?;
            0
        }
    };

    std::process::exit(code);
}
