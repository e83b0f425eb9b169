//! The run state machine.
//!
//! `Fetch -> Preload -> Build -> Serialize -> Package -> Archive -> [Deliver]
//! -> [Transfer] -> Prune`. A failure before the artifact exists halts every
//! remaining step except `Prune`. Archive, deliver and transfer are attempted
//! independently once the artifact exists.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use patron_delivery::{archive, deliver, prune, transfer, RemoteTransport};
use patron_package::{package_text, write_lines};
use patron_source::{
    fetch_file_name, fetch_flat_lines, fetch_persons, Address, ContactIndexes, Email, FlatLine,
    FromRow, Person, Phone, Query, QueryExecutor, UploadFileName,
};
use patron_xml::{to_xml_string, DocumentBuilder};

use crate::{Halt, Result, RunConfig, RunReport, Stage};

/// Document mode: export persons with their contacts as a zipped XML file.
pub fn run_users<E>(
    config: &RunConfig,
    source: &E,
    transport: &dyn RemoteTransport,
    now: DateTime<Local>,
) -> RunReport
where
    E: QueryExecutor + ?Sized,
{
    log::info!("Starting users export into {}", config.working_dir.display());
    let mut report = RunReport::default();
    let mut stage = Stage::Fetch;
    let produced = produce_users(config, source, now, &mut stage, &mut report);
    finish(config, transport, now, stage, produced, &mut report);
    report
}

/// Flat-line mode: export the prepared lines as a plain text file.
pub fn run_lines<E>(
    config: &RunConfig,
    source: &E,
    transport: &dyn RemoteTransport,
    now: DateTime<Local>,
) -> RunReport
where
    E: QueryExecutor + ?Sized,
{
    log::info!("Starting lines export into {}", config.working_dir.display());
    let mut report = RunReport::default();
    let mut stage = Stage::Fetch;
    let produced = produce_lines(config, source, now, &mut stage, &mut report);
    finish(config, transport, now, stage, produced, &mut report);
    report
}

fn produce_users<E>(
    config: &RunConfig,
    source: &E,
    now: DateTime<Local>,
    stage: &mut Stage,
    report: &mut RunReport,
) -> Result<PathBuf>
where
    E: QueryExecutor + ?Sized,
{
    let pidms = config.pidm_values();
    // Persons and contact groups live in disjoint views.
    let (persons, contacts) = rayon::join(
        || fetch_persons(source, pidms.as_deref()),
        || ContactIndexes::load(source),
    );
    let persons = persons?;
    report.fetched = persons.len();
    *stage = Stage::Preload;
    let contacts = contacts?;

    *stage = Stage::Build;
    let batch = DocumentBuilder::new(&contacts).build_all(&persons);
    report.built = batch.built;
    report.build_failures = batch.failures.iter().map(ToString::to_string).collect();
    if !batch.failures.is_empty() {
        log::warn!(
            "{} of {} records failed to build and were left out",
            batch.failures.len(),
            persons.len()
        );
    }

    *stage = Stage::Serialize;
    let text = to_xml_string(&batch.root)?;

    *stage = Stage::Package;
    let stem = config.artifact_stem(now.naive_local());
    let zip_path = config.working_dir.join(format!("{}.zip", stem));
    Ok(package_text(&text, &zip_path, &format!("{}.xml", stem))?)
}

fn produce_lines<E>(
    config: &RunConfig,
    source: &E,
    now: DateTime<Local>,
    stage: &mut Stage,
    report: &mut RunReport,
) -> Result<PathBuf>
where
    E: QueryExecutor + ?Sized,
{
    let provided = fetch_file_name(source)?;
    let lines = fetch_flat_lines(source)?;
    report.fetched = lines.len();

    *stage = Stage::Package;
    let name = config.flat_file_name(provided.as_deref(), now.naive_local());
    Ok(write_lines(&config.working_dir.join(name), &lines)?)
}

fn finish(
    config: &RunConfig,
    transport: &dyn RemoteTransport,
    now: DateTime<Local>,
    stage: Stage,
    produced: Result<PathBuf>,
    report: &mut RunReport,
) {
    match produced {
        Ok(artifact) => {
            report.archive = Some(archive(&artifact, &config.archive_root(), now.date_naive()));
            report.deliver = Some(deliver(&artifact, config.network_dir()));
            report.transfer = Some(transfer(&artifact, config.transfer.as_ref(), transport));
            report.artifact = Some(artifact);
        }
        Err(e) => {
            log::error!("Run halted at {}: {}", stage, e);
            report.halted = Some(Halt {
                stage,
                message: e.to_string(),
            });
        }
    }

    match prune(&config.working_dir, config.retention_days, SystemTime::from(now)) {
        Ok(summary) => report.prune = Some(summary),
        Err(e) => {
            log::warn!("Retention pass failed: {}", e);
            report.prune_error = Some(e.to_string());
        }
    }
}

/// Row count, or the failure, for one source table.
#[derive(Debug)]
pub struct TableCheck {
    pub table: String,
    pub rows: std::result::Result<usize, patron_source::Error>,
}

/// Run every shipped query shape once and report what came back.
pub fn check_source<E>(source: &E) -> Vec<TableCheck>
where
    E: QueryExecutor + ?Sized,
{
    let queries: [Query; 6] = [
        Person::query(),
        Address::query(),
        Email::query(),
        Phone::query(),
        FlatLine::query(),
        UploadFileName::query(),
    ];

    queries
        .iter()
        .map(|query| {
            let rows = source.execute(query).map(|set| set.len());
            match &rows {
                Ok(n) => log::info!("{}: {} rows", query, n),
                Err(e) => log::error!("{}: {}", query, e),
            }
            TableCheck {
                table: query.table().to_string(),
                rows,
            }
        })
        .collect()
}
