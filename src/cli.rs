//! CLI interface for Seabook.
//!
//! Each subcommand is non-interactive: arguments in, human-readable output out.
//! Commands split into two groups:
//!
//! - `seabook start|status|section|period|ship-type|finalize|discard` — work on
//!   the single active draft.
//! - `seabook history|show|sections` — read-only views.
//!
//! `show` takes a full record UUID or an unambiguous prefix.

mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use uuid::Uuid;

use crate::lifecycle::SeaService;
use crate::model::{RecordStatus, SeaServiceRecord, SectionData, ServicePeriodPatch};
use crate::schema::{SECTIONS, SectionKey, ShipType, applicability_for_code};
use crate::storage::RecordStore;
use crate::summary::format_blockers;

use format::{
    format_period, format_record_header, format_record_line, format_section_lines, format_summary,
};

/// Seabook — keep your sea service record.
#[derive(Debug, Parser)]
#[command(name = "seabook", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Path to the record database.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log debug detail to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: recording a sea service period
  1. seabook start --ship-type oil-tanker --sign-on-date 2025-03-01 --sign-on-port Rotterdam
  2. seabook section vessel-identity --set shipName="Nordic Star" --set imoNumber=9321483
  3. seabook section cargo-capabilities --set cargoPumpsFitted=true --set cargoPumpDeepwell=true
  4. seabook period --sign-off-date 2025-09-15 --sign-off-port Singapore
  5. seabook status
  6. seabook finalize

Values given to --set are read as JSON when they parse (true, 3, ["a"]),
otherwise as text."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a new sea service record. Prints the record ID.
    Start {
        /// Ship type code, e.g. `GENERAL_CARGO` or `oil-tanker`.
        #[arg(long)]
        ship_type: Option<String>,

        /// Sign-on date, `YYYY-MM-DD`.
        #[arg(long)]
        sign_on_date: String,

        /// Sign-on port.
        #[arg(long)]
        sign_on_port: String,
    },

    /// Show progress of the active record.
    Status,

    /// List the sections of a record and whether they apply to a ship type.
    Sections {
        /// Ship type code to check applicability against.
        #[arg(long)]
        ship_type: Option<String>,
    },

    /// Record data for a section of the active record.
    Section {
        /// Section key, e.g. `vessel-identity`.
        section: SectionKey,

        /// Set a field: `name=value`. Can be given multiple times.
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,

        /// Clear a field. Can be given multiple times.
        #[arg(long)]
        unset: Vec<String>,
    },

    /// Update the service period of the active record.
    ///
    /// An empty value clears a field.
    Period {
        #[arg(long)]
        sign_on_date: Option<String>,
        #[arg(long)]
        sign_on_port: Option<String>,
        #[arg(long)]
        sign_off_date: Option<String>,
        #[arg(long)]
        sign_off_port: Option<String>,
    },

    /// Set the ship type of the active record.
    ShipType {
        /// Ship type code, e.g. `BULK_CARRIER`.
        code: String,
    },

    /// Finalize the active record. Final records can't be changed.
    Finalize,

    /// Delete the active record.
    Discard,

    /// List finalized records, most recent sign-on first.
    History,

    /// Show a record in full.
    Show {
        /// Record ID: full UUID or unambiguous prefix (e.g. `a3b`).
        record: String,
    },
}

/// Parses `name=value`, reading the value as JSON when possible.
fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

/// Run a parsed command, returning an error message on failure.
pub fn run<S: RecordStore>(command: Command, service: &mut SeaService<S>) -> Result<(), String> {
    match command {
        Command::Start {
            ship_type,
            sign_on_date,
            sign_on_port,
        } => cmd_start(service, ship_type.as_deref(), &sign_on_date, &sign_on_port),
        Command::Status => cmd_status(service),
        Command::Sections { ship_type } => cmd_sections(ship_type.as_deref()),
        Command::Section {
            section,
            set,
            unset,
        } => cmd_section(service, section, set, unset),
        Command::Period {
            sign_on_date,
            sign_on_port,
            sign_off_date,
            sign_off_port,
        } => cmd_period(
            service,
            ServicePeriodPatch {
                sign_on_date,
                sign_on_port,
                sign_off_date,
                sign_off_port,
            },
        ),
        Command::ShipType { code } => cmd_ship_type(service, &code),
        Command::Finalize => cmd_finalize(service),
        Command::Discard => cmd_discard(service),
        Command::History => cmd_history(service),
        Command::Show { record } => cmd_show(service, &record),
    }
}

fn cmd_start<S: RecordStore>(
    service: &mut SeaService<S>,
    ship_type: Option<&str>,
    sign_on_date: &str,
    sign_on_port: &str,
) -> Result<(), String> {
    let record = service
        .start(ship_type, sign_on_date, sign_on_port)
        .map_err(|e| format!("failed to start record: {e}"))?;

    println!("{}", record.id);
    Ok(())
}

fn cmd_status<S: RecordStore>(service: &SeaService<S>) -> Result<(), String> {
    let Some(draft) = service.active_draft() else {
        println!("No record in progress");
        return Ok(());
    };

    println!("{}", format_record_header(draft));
    println!("{}", format_period(&draft.payload.service_period));
    println!();
    for line in format_section_lines(&draft.payload) {
        println!("{line}");
    }
    println!();
    if let Some(summary) = service.summary() {
        println!("{}", format_summary(&summary));
    }
    match service.blockers() {
        Some(blockers) if blockers.is_empty() => println!("Ready to finalize."),
        Some(blockers) => println!("Not ready to finalize:\n{}", format_blockers(&blockers)),
        None => {}
    }

    Ok(())
}

fn cmd_sections(ship_type: Option<&str>) -> Result<(), String> {
    let applicable = match ship_type {
        Some(code) => {
            if ShipType::canonicalize(code).is_none() {
                eprintln!("Unrecognized ship type '{code}'; showing the default applicability");
            }
            Some(applicability_for_code(code))
        }
        None => None,
    };

    for definition in &SECTIONS {
        let note = match &applicable {
            Some(set) if !set.contains(&definition.key) => "  (not applicable)",
            _ => "",
        };
        println!(
            "{:<26}  {}{note}\n{:<26}  {}",
            definition.key.as_str(),
            definition.title,
            "",
            definition.description
        );
    }

    Ok(())
}

fn cmd_section<S: RecordStore>(
    service: &mut SeaService<S>,
    section: SectionKey,
    set: Vec<(String, Value)>,
    unset: Vec<String>,
) -> Result<(), String> {
    if set.is_empty() && unset.is_empty() {
        return Err("specify at least one --set or --unset".to_string());
    }

    let mut patch: SectionData = set.into_iter().collect();
    patch.extend(unset.into_iter().map(|field| (field, Value::Null)));

    let status = service
        .update_section(section, patch)
        .map_err(|e| format!("failed to update {section}: {e}"))?;

    eprintln!("{}: {}", section.definition().title, status.label());
    Ok(())
}

fn cmd_period<S: RecordStore>(
    service: &mut SeaService<S>,
    patch: ServicePeriodPatch,
) -> Result<(), String> {
    if patch.is_empty() {
        return Err("specify at least one service period field".to_string());
    }

    service
        .update_service_period(patch)
        .map_err(|e| format!("failed to update service period: {e}"))?;

    if let Some(draft) = service.active_draft() {
        eprintln!("{}", format_period(&draft.payload.service_period));
    }
    Ok(())
}

fn cmd_ship_type<S: RecordStore>(service: &mut SeaService<S>, code: &str) -> Result<(), String> {
    let ship_type = service
        .set_ship_type(code)
        .map_err(|e| format!("failed to set ship type: {e}"))?;

    eprintln!("Ship type set to {ship_type}");
    Ok(())
}

fn cmd_finalize<S: RecordStore>(service: &mut SeaService<S>) -> Result<(), String> {
    let record = service.finalize().map_err(|e| e.to_string())?;

    eprintln!("Record {} finalized", record.short_id());
    if let RecordStatus::Final { seal, .. } = &record.status {
        eprintln!("Seal: {seal}");
    }
    Ok(())
}

fn cmd_discard<S: RecordStore>(service: &mut SeaService<S>) -> Result<(), String> {
    let short_id = service
        .active_draft()
        .map(SeaServiceRecord::short_id)
        .ok_or("no sea service record is in progress")?;
    service
        .discard()
        .map_err(|e| format!("failed to discard record: {e}"))?;

    eprintln!("Record {short_id} discarded");
    Ok(())
}

fn cmd_history<S: RecordStore>(service: &SeaService<S>) -> Result<(), String> {
    let history = service.history();
    if history.is_empty() {
        println!("No finalized records");
        return Ok(());
    }

    for record in history {
        println!("{}", format_record_line(record));
    }
    Ok(())
}

fn cmd_show<S: RecordStore>(service: &SeaService<S>, reference: &str) -> Result<(), String> {
    let record = resolve_record(service, reference)?;

    println!("{}", format_record_header(&record));
    println!("{}", format_period(&record.payload.service_period));
    match record.verify_seal() {
        Some(true) => println!("Seal verified"),
        Some(false) => println!("SEAL MISMATCH: payload changed after finalization"),
        None => {}
    }
    println!();
    for line in format_section_lines(&record.payload) {
        println!("{line}");
    }
    println!();

    let json = serde_json::to_string_pretty(&record.payload)
        .map_err(|e| format!("failed to serialize record: {e}"))?;
    println!("{json}");
    Ok(())
}

/// Resolve a record reference (full UUID or unambiguous prefix) to a record.
fn resolve_record<S: RecordStore>(
    service: &SeaService<S>,
    reference: &str,
) -> Result<SeaServiceRecord, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return service
            .store()
            .get(id)
            .map_err(|e| format!("failed to load record: {e}"))?
            .ok_or_else(|| format!("no record {id}"));
    }

    // Try as a prefix match against the draft and the history.
    let matches: Vec<&SeaServiceRecord> = service
        .active_draft()
        .into_iter()
        .chain(service.history())
        .filter(|r| r.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no record matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|r| r.short_id()).collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {n} records: {}",
                ids.join(", ")
            ))
        }
    }
}
