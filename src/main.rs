use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vms_sizer::{
    build, search_records, RequirementSizingService, SearchCriteria, SizingPolicy, SizingRecord,
    SizingRequirement, POLICY_ENV_VAR,
};

/// Command-line arguments for the VMS sizing planner.
#[derive(Debug, Parser)]
#[command(version, about = "Size video-surveillance bandwidth, storage and server hardware.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Size a requirement read from a JSON file.
    Size {
        /// JSON file holding the requirement (customer/project metadata and `camera_configs`).
        #[arg(long)]
        input: PathBuf,

        /// JSON policy file overriding the bitrate and hardware tables.
        /// Falls back to `VMS_SIZER_POLICY`, then to the built-in tables.
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Print the sizing record as JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Search stored sizing records (a JSON array) and print the matches, newest first.
    Search {
        /// JSON file holding an array of sizing records.
        #[arg(long)]
        records: PathBuf,

        /// Free text matched against customer, project, location and assigned person.
        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        customer_name: Option<String>,

        #[arg(long)]
        project_name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        assigned_person: Option<String>,

        /// Earliest `created_at`, RFC 3339 (e.g. 2024-03-01T00:00:00Z).
        #[arg(long)]
        start_date: Option<DateTime<Utc>>,

        /// Latest `created_at`, RFC 3339.
        #[arg(long)]
        end_date: Option<DateTime<Utc>>,

        /// Also print the store filter document built from the criteria.
        #[arg(long)]
        show_filter: bool,
    },
}

fn load_policy(path: Option<PathBuf>) -> anyhow::Result<SizingPolicy> {
    let path = path.or_else(|| std::env::var_os(POLICY_ENV_VAR).map(PathBuf::from));
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading sizing policy");
            Ok(SizingPolicy::from_json_file(&path)?)
        }
        None => Ok(SizingPolicy::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Size {
            input,
            policy,
            json,
        } => {
            let service = RequirementSizingService::new(load_policy(policy)?);
            let requirement: SizingRequirement = read_json(&input)?;
            let record = service.size(&requirement)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", record);
            }
        }
        Command::Search {
            records,
            query,
            customer_name,
            project_name,
            location,
            assigned_person,
            start_date,
            end_date,
            show_filter,
        } => {
            let records: Vec<SizingRecord> = read_json(&records)?;
            let criteria = SearchCriteria {
                query,
                customer_name,
                project_name,
                location,
                assigned_person,
                start_date,
                end_date,
            };
            let predicate = build(&criteria);
            if show_filter {
                println!("{}", serde_json::to_string_pretty(&predicate.to_filter_document())?);
            }
            let results = search_records(&records, &predicate);
            tracing::info!(count = results.count, "Search complete");
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vms_sizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!(error = %e, "vms-sizer failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }
}
