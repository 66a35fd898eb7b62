//! mesos-records binary entry point.

use clap::Parser;
use mesos_records::{telemetry, Config, FileStateLoader, RecordGenerator, SystemResolver};
use std::path::PathBuf;
use tracing::info;

/// Generate DNS records from a Mesos state.json snapshot.
#[derive(Parser, Debug)]
#[command(name = "mesos-records")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML).
    #[arg(short, long, default_value = "mesos-records.toml")]
    config: PathBuf,

    /// Path to the cluster state document (state.json).
    #[arg(short, long)]
    state: PathBuf,

    /// Print the frameworks -> tasks -> records tree instead of the records.
    #[arg(long)]
    enumerate: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration; the file is optional, environment wins
    let config: Config = config::Config::builder()
        .add_source(config::File::from(args.config.clone()).required(false))
        .add_source(
            config::Environment::with_prefix("MESOS_RECORDS")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("records.masters")
                .with_list_parse_key("records.ip_sources")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        config_file = %args.config.display(),
        state_file = %args.state.display(),
        domain = %config.records.domain,
        "Generating records"
    );

    let loader = FileStateLoader::new(args.state.clone());
    let generator = RecordGenerator::from_loader(&loader, &config.records, &SystemResolver)?;

    info!(
        frameworks = generator.enumeration().frameworks.len(),
        tasks = generator.enumeration().task_count(),
        diagnostics = generator.diagnostics().len(),
        "Generated records"
    );

    let output = if args.enumerate {
        serde_json::to_string_pretty(generator.enumeration())?
    } else {
        serde_json::to_string_pretty(&generator.export_all())?
    };
    println!("{output}");

    Ok(())
}
