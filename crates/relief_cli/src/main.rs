//! `relief` command-line client.
//!
//! # Responsibility
//! - Drive the reporting and tracking workflows against the embedded or
//!   remote store.
//! - Print registry projections as plain text tables.
//!
//! Store selection: `--remote` / `--db`, then `RELIEF_STORE_URL` /
//! `RELIEF_DB_PATH`, then the embedded database in the temp directory.

use clap::{Parser, Subcommand};
use log::info;
use relief_core::db::open_db;
use relief_core::ledger;
use relief_core::{
    init_logging, reload_registry, ClientConfig, HttpIncidentStore, IncidentType, Notice,
    ReliefForm, RemoteStore, ReportForm, ReportingWorkflow, Severity, SharedRegistry,
    SqliteIncidentStore, StoreTarget, TrackingWorkflow,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "relief", version)]
#[command(about = "Report disaster incidents and track relief delivery")]
struct Cli {
    /// Embedded store database file
    #[arg(long, global = true, conflicts_with = "remote")]
    db: Option<PathBuf>,

    /// Base URL of the remote incident service
    #[arg(long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List recent incidents
    List,
    /// Report a new incident
    Report {
        #[arg(long)]
        title: String,
        /// Flood, Fire, Earthquake or Cyclone
        #[arg(long = "type", default_value = "Flood")]
        kind: IncidentType,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        latitude: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        longitude: String,
        /// Low, Medium, High or Critical
        #[arg(long, default_value = "Medium")]
        severity: Severity,
    },
    /// Log a relief update against an incident
    AddUpdate {
        incident_id: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "0")]
        food_kits: String,
        #[arg(long, default_value = "0")]
        medical_kits: String,
        #[arg(long, default_value = "0")]
        people_helped: String,
    },
    /// Show relief updates across all incidents
    Ledger,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    match dispatch(config.store, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &cli.remote {
        let timeout = match config.store {
            StoreTarget::Remote { timeout, .. } => timeout,
            StoreTarget::Embedded { .. } => relief_core::store::http::DEFAULT_TIMEOUT,
        };
        config.store = StoreTarget::Remote {
            base_url: base_url.clone(),
            timeout,
        };
    } else if let Some(db_path) = &cli.db {
        config.store = StoreTarget::Embedded {
            db_path: db_path.clone(),
        };
    }
    config
}

async fn dispatch(target: StoreTarget, command: Command) -> Result<(), Box<dyn Error>> {
    match target {
        StoreTarget::Remote { base_url, timeout } => {
            info!("event=cli_start module=cli status=ok store=remote");
            let store = HttpIncidentStore::new(&base_url, timeout)?;
            run(&store, command).await
        }
        StoreTarget::Embedded { db_path } => {
            info!("event=cli_start module=cli status=ok store=embedded");
            let conn = open_db(&db_path)?;
            run(&SqliteIncidentStore::new(&conn), command).await
        }
    }
}

async fn run<S: RemoteStore>(store: S, command: Command) -> Result<(), Box<dyn Error>> {
    let registry = SharedRegistry::new();
    match command {
        Command::List => {
            reload_registry(&store, &registry).await?;
            print_incidents(&registry);
        }
        Command::Report {
            title,
            kind,
            description,
            latitude,
            longitude,
            severity,
        } => {
            let workflow = ReportingWorkflow::new(store, registry);
            let mut form = ReportForm {
                title,
                kind,
                description,
                latitude,
                longitude,
                severity,
            };
            let result = workflow.submit(&mut form).await;
            print_notice(workflow.last_notice());
            let incident = result?;
            println!("id: {}", incident.id);
        }
        Command::AddUpdate {
            incident_id,
            description,
            food_kits,
            medical_kits,
            people_helped,
        } => {
            let workflow = TrackingWorkflow::new(store, registry);
            workflow.load().await?;
            let mut form = ReliefForm {
                description,
                food_kits,
                medical_kits,
                people_helped,
            };
            let result = workflow.add_update(&incident_id, &mut form).await;
            print_notice(workflow.last_notice());
            let update = result?;
            println!("id: {}", update.id);
        }
        Command::Ledger => {
            reload_registry(&store, &registry).await?;
            print_ledger(&registry);
        }
    }
    Ok(())
}

fn print_notice(notice: Option<Notice>) {
    match notice {
        Some(notice) if notice.is_success() => println!("{}", notice.message),
        Some(notice) => eprintln!("{}", notice.message),
        None => {}
    }
}

fn print_incidents(registry: &SharedRegistry) {
    let rows = registry.with(|r| ledger::incident_rows(r.incidents()));
    if rows.is_empty() {
        println!("No incidents.");
        return;
    }
    println!(
        "{:<38} {:<28} {:<11} {:<9} {:<11} REPORTED",
        "ID", "TITLE", "TYPE", "SEVERITY", "STATUS"
    );
    for row in rows {
        println!(
            "{:<38} {:<28} {:<11} {:<9} {:<11} {}",
            row.incident_id, row.title, row.kind, row.severity, row.status, row.reported_label
        );
    }
}

fn print_ledger(registry: &SharedRegistry) {
    let rows = registry.with(|r| ledger::rows(r.incidents()));
    if rows.is_empty() {
        println!("No relief updates yet.");
        return;
    }
    println!(
        "{:<28} {:<36} {:>5} {:>7} {:>6} UPDATED",
        "INCIDENT", "UPDATE", "FOOD", "MEDICAL", "PEOPLE"
    );
    for row in rows {
        println!(
            "{:<28} {:<36} {:>5} {:>7} {:>6} {}",
            row.incident_title,
            row.text,
            row.food_kits,
            row.medical_kits,
            row.people_helped,
            row.time_label
        );
    }
}
