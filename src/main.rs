//! apiswitch — probe named API endpoint profiles and pick the best one.
//!
//! The engine does the work; this binary only loads profiles, renders the
//! report, and prints the failover decision. Persisting the active profile
//! (and any environment side effects) is left to the caller's shell setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apiswitch::config::loader::load_config;
use apiswitch::config::SwitchConfig;
use apiswitch::report::{select_failover, BatchReport, FailoverReason, HealthState};
use apiswitch::scheduler::{run_batch, ProgressHook};

#[derive(Parser)]
#[command(name = "apiswitch")]
#[command(about = "Probe API endpoint profiles and pick the best one", long_about = None)]
struct Cli {
    /// Path to the profiles file.
    #[arg(short, long, default_value = "apiswitch.toml")]
    config: PathBuf,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured profiles
    List,
    /// Probe every profile and report health and latency
    Check,
    /// Probe every profile and print which one to promote
    Auto {
        /// Name of the currently active profile, if any
        #[arg(long)]
        current: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "apiswitch={}",
                    config.observability.log_level
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::List => {
            for profile in &config.profiles {
                println!("{}\t{}", profile.name, profile.base_url);
            }
        }
        Commands::Check => {
            let report = probe_all(&config, cli.json).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Auto { current } => {
            let report = probe_all(&config, cli.json).await?;
            let decision = select_failover(&report, current.as_deref());
            if cli.json {
                let combined = serde_json::json!({
                    "report": report,
                    "decision": decision,
                });
                println!("{}", serde_json::to_string_pretty(&combined)?);
            } else {
                print_report(&report);
                match (&decision.chosen, decision.reason) {
                    (Some(name), FailoverReason::CurrentHealthy) => {
                        println!("keeping current profile: {}", name);
                    }
                    (Some(name), _) => {
                        println!("switch to profile: {}", name);
                    }
                    (None, _) => {
                        println!("no healthy profile available");
                    }
                }
            }
        }
    }

    Ok(())
}

async fn probe_all(
    config: &SwitchConfig,
    json: bool,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let descriptors = config
        .profiles
        .iter()
        .map(|profile| profile.to_descriptor())
        .collect();

    // Progress lines would interleave with machine-readable output.
    let progress: Option<ProgressHook> = if json {
        None
    } else {
        Some(Arc::new(|completed, total| {
            eprintln!("probed {}/{}", completed, total);
        }))
    };

    let report = run_batch(descriptors, config.probe.to_run_options(), progress).await?;
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for entry in &report.results {
        let latency = match entry.outcome.latency {
            Some(latency) => format!("{}ms", latency.as_millis()),
            None => "-".to_string(),
        };
        let detail = match entry.state {
            HealthState::Unreachable => entry
                .outcome
                .error_kind
                .map(|kind| kind.to_string())
                .unwrap_or_default(),
            HealthState::Degraded => format!(
                "http {}",
                entry.outcome.http_status.unwrap_or_default()
            ),
            HealthState::Healthy => String::new(),
        };
        println!(
            "{:<20} {:<12} {:>8}  {}",
            entry.descriptor.name, entry.state, latency, detail
        );
    }
}
