use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use automeal::instrumentation::{GenerationLog, RunLogger};
use automeal::pipeline::prompt::build_prompt;
use automeal::plan::{read_used_titles, PlanHistoryEntry};
use automeal::{store, Config, PlanPipeline, PlanRequest};

#[derive(Parser)]
#[command(name = "automeal", about = "Weekly meal plans from your kitchen profile")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print provider attempts to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a plan and save it to the plans file
    Generate {
        /// Profile JSON (defaults to <DATA_DIR>/profile.json)
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Plans JSON used as history (defaults to <DATA_DIR>/plans.json)
        #[arg(long)]
        plans: Option<PathBuf>,
        /// Print the plan without saving it
        #[arg(long)]
        no_save: bool,
    },
    /// Print the prompt that would be sent to providers
    Prompt {
        #[arg(long)]
        profile: Option<PathBuf>,
        #[arg(long)]
        plans: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing();

    match cli.command {
        Commands::Generate {
            profile,
            plans,
            no_save,
        } => {
            let profile_path = profile.unwrap_or_else(|| config.profile_path());
            let plans_path = plans.unwrap_or_else(|| config.plans_path());

            let profile = store::load_profile(&profile_path)?;
            let request = PlanRequest::from_profile(&profile).context(
                "Please complete your profile first with location, grocery store, and budget",
            )?;
            let history = store::load_history(&plans_path);

            let pipeline = PlanPipeline::from_config(&config);
            if cli.verbose {
                eprintln!("[providers] {}", pipeline.provider_names().join(" -> "));
            }

            let generated = pipeline.generate_plan(&request, &history).await?;

            if cli.verbose {
                for attempt in &generated.attempts {
                    eprintln!(
                        "[{}] {:?} in {}ms",
                        attempt.provider, attempt.outcome, attempt.latency_ms
                    );
                }
                if generated.source.is_mock() {
                    eprintln!("[mock] no usable provider output, using the offline plan");
                }
            }

            let log = GenerationLog::from_generated(&generated);
            if let Err(e) = RunLogger::new(&config.log_dir).and_then(|logger| logger.write(&log)) {
                tracing::warn!(error = %format!("{e:#}"), "failed to record generation log");
            }

            println!("{}", serde_json::to_string_pretty(&generated.plan)?);
            eprintln!("{}", log.summary());

            if !no_save {
                let entry = PlanHistoryEntry::new(request, generated.plan);
                store::prepend_entry(&plans_path, &entry)?;
                eprintln!("Saved plan {} to {}", entry.id, plans_path.display());
            }
        }
        Commands::Prompt { profile, plans } => {
            let profile_path = profile.unwrap_or_else(|| config.profile_path());
            let plans_path = plans.unwrap_or_else(|| config.plans_path());

            let profile = store::load_profile(&profile_path)?;
            let request = PlanRequest::from_profile(&profile)?;
            let used_titles = read_used_titles(&plans_path);

            println!("{}", build_prompt(&request, &used_titles));
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // stdout carries the plan, so logs go to stderr
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
