//! Patron CLI - Command-line tool for patron extracts.
//!
//! This is the main entry point for the patron command-line application.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use patron::delivery::{DEFAULT_RETENTION_DAYS, DEFAULT_TRANSFER_TIMEOUT};
use patron::prelude::*;
use patron::source::DEFAULT_QUERY_TIMEOUT;
use patron::Environment;

/// Patron - person record extract and delivery tool
#[derive(Parser)]
#[command(name = "patron")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export persons with their contacts as a zipped XML document
    Users {
        #[command(flatten)]
        run: RunArgs,

        /// Only export these PIDMs (comma separated)
        #[arg(long, env = "PATRON_PIDMS", value_delimiter = ',')]
        pidm: Vec<i64>,
    },

    /// Export the prepared flat lines as a text file
    Lines {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Query every source table and report row counts
    CheckSource {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// JSON snapshot of the source views
    #[arg(short, long, env = "PATRON_SNAPSHOT")]
    snapshot: PathBuf,

    /// Per-query timeout in seconds
    #[arg(long, env = "PATRON_QUERY_TIMEOUT", default_value_t = DEFAULT_QUERY_TIMEOUT.as_secs())]
    query_timeout: u64,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Deployment tier
    #[arg(
        long,
        env = "PATRON_ENVIRONMENT",
        value_enum,
        ignore_case = true,
        default_value_t = Tier::Dev
    )]
    environment: Tier,

    /// Directory the artifact is written to
    #[arg(short, long, env = "PATRON_WORKING_DIR")]
    working_dir: PathBuf,

    /// Archive root (defaults to <working-dir>/archive)
    #[arg(long, env = "PATRON_ARCHIVE_DIR")]
    archive_dir: Option<PathBuf>,

    /// Artifact file name prefix
    #[arg(long, env = "PATRON_PREFIX", default_value = "alma")]
    prefix: String,

    /// Extension enforced on flat-line file names
    #[arg(long, env = "PATRON_FILE_EXT", default_value = ".txt")]
    file_ext: String,

    /// Network directory to copy the artifact to
    #[arg(long, env = "PATRON_NETWORK_DIR")]
    network_dir: Option<PathBuf>,

    /// SFTP host
    #[arg(long, env = "PATRON_SFTP_HOST")]
    sftp_host: Option<String>,

    /// SFTP port
    #[arg(long, env = "PATRON_SFTP_PORT")]
    sftp_port: Option<u16>,

    /// SFTP user name
    #[arg(long, env = "PATRON_SFTP_USERNAME")]
    sftp_username: Option<String>,

    /// Private key for SFTP authentication
    #[arg(long, env = "PATRON_SFTP_PRIVATE_KEY")]
    sftp_private_key: Option<PathBuf>,

    /// Remote directory to upload into
    #[arg(long, env = "PATRON_SFTP_REMOTE_DIR")]
    sftp_remote_dir: Option<String>,

    /// Delete working-directory files older than this many days
    #[arg(long, env = "PATRON_RETENTION_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    retention_days: u64,

    /// Upload timeout in seconds
    #[arg(
        long,
        env = "PATRON_TRANSFER_TIMEOUT",
        default_value_t = DEFAULT_TRANSFER_TIMEOUT.as_secs()
    )]
    transfer_timeout: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Tier {
    #[value(name = "DEV")]
    Dev,
    #[value(name = "PREPROD")]
    Preprod,
    #[value(name = "PROD")]
    Prod,
}

impl From<Tier> for Environment {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Dev => Environment::Dev,
            Tier::Preprod => Environment::Preprod,
            Tier::Prod => Environment::Prod,
        }
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Users,
    Lines,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Users { run, pidm } => cmd_run(Mode::Users, run, pidm),
        Commands::Lines { run } => cmd_run(Mode::Lines, run, Vec::new()),
        Commands::CheckSource { source } => cmd_check_source(&source),
    }
}

fn open_source(args: &SourceArgs) -> Result<SnapshotSource> {
    let source = SnapshotSource::open(&args.snapshot)
        .with_context(|| format!("Failed to open snapshot {}", args.snapshot.display()))?;
    Ok(source.with_timeout(Duration::from_secs(args.query_timeout)))
}

fn run_config(args: RunArgs, pidm: Vec<i64>) -> RunConfig {
    let mut config = RunConfig::new(args.working_dir, args.prefix);
    config.environment = args.environment.into();
    config.archive_dir = args.archive_dir;
    config.file_ext = args.file_ext;
    config.network_dir = args.network_dir;
    config.transfer = TransferTarget::from_parts(
        args.sftp_host,
        args.sftp_port,
        args.sftp_username,
        args.sftp_private_key,
        args.sftp_remote_dir,
    );
    config.retention_days = args.retention_days;
    config.transfer_timeout = Duration::from_secs(args.transfer_timeout);
    config.pidm_filter = (!pidm.is_empty()).then_some(pidm);
    config
}

fn cmd_run(mode: Mode, args: RunArgs, pidm: Vec<i64>) -> Result<ExitCode> {
    let source = open_source(&args.source)?;
    let config = run_config(args, pidm);
    log::debug!("Run configuration: {:?}", config);
    log::info!("Environment: {:?}", config.environment);

    let transport = SftpCommand::new(config.transfer_timeout);
    let now = chrono::Local::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let start = Instant::now();
    let report = match mode {
        Mode::Users => {
            spinner.set_message("Exporting users...");
            run_users(&config, &source, &transport, now)
        }
        Mode::Lines => {
            spinner.set_message("Exporting flat lines...");
            run_lines(&config, &source, &transport, now)
        }
    };
    spinner.finish_with_message("Done");

    println!("{}", report);
    println!("Completed in {:?}", start.elapsed());

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_check_source(args: &SourceArgs) -> Result<ExitCode> {
    let source = open_source(args)?;

    let mut failed = 0;
    for check in check_source(&source) {
        match &check.rows {
            Ok(rows) => println!("{:<24} {:>8} rows", check.table, rows),
            Err(e) => {
                println!("{:<24} FAILED: {}", check.table, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        println!("{} table(s) could not be queried", failed);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
