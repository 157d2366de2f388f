use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod batch;
mod client;
mod dashboard;
mod intervention;
mod models;
mod outcome;
mod predict;
mod report;
mod session;
mod view;

use client::HttpBackend;
use models::{OutcomeUpdate, PredictionForm};
use predict::PredictionSession;
use view::{ids, Alerts, DashboardPage};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "dropout-risk")]
#[command(about = "Client for the student dropout risk prediction service", long_about = None)]
struct Cli {
    /// Base URL of the prediction backend
    #[arg(long, global = true, env = "DROPOUT_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show logged intervention statistics
    Dashboard {
        /// Also write a markdown report to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Predict dropout risk for one student
    Predict {
        #[arg(long = ids::ATTENDANCE, default_value = "")]
        attendance: String,
        #[arg(long = ids::MARKS, default_value = "")]
        internal_marks: String,
        #[arg(long = ids::QUIZ, default_value = "")]
        quiz_score: String,
        #[arg(long = ids::LOGIN, default_value = "")]
        login_frequency: String,
        #[arg(long = ids::FINANCIAL, default_value = "")]
        financial_issue: String,
        #[arg(long = ids::BACKLOG, default_value = "")]
        backlog_count: String,
        /// Log this intervention against the prediction once it succeeds
        #[arg(long = "intervention")]
        intervention: Option<String>,
    },
    /// Predict every row of a CSV file
    Batch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "predictions.csv")]
        out: PathBuf,
    },
    /// Record the observed outcome of a logged intervention
    UpdateOutcome {
        /// Timestamp of the intervention log entry
        #[arg(long)]
        timestamp: String,
        /// Improved, No Change or Dropped Out
        #[arg(long)]
        outcome: String,
    },
    /// Show prospective validation metrics
    Metrics,
    /// Interactive prompt sharing one prediction between commands
    Session,
}

/// Writes each alert once and fails with a count, so the error line does not
/// repeat the alert text.
fn report_alerts<W: std::io::Write>(alerts: &[String], mut err: W) -> anyhow::Result<()> {
    if alerts.is_empty() {
        return Ok(());
    }
    for alert in alerts {
        writeln!(err, "{alert}")?;
    }
    anyhow::bail!("{} alert(s) raised", alerts.len())
}

fn print_alerts(alerts: Vec<String>) -> anyhow::Result<()> {
    report_alerts(&alerts, std::io::stderr())
}

/// Prints `success` if it was raised, otherwise fails with the alerts.
fn confirm(alerts: Vec<String>, success: &str) -> anyhow::Result<()> {
    if alerts.iter().any(|a| a == success) {
        println!("{success}");
        return Ok(());
    }
    print_alerts(alerts)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dropout_risk_client=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let backend = HttpBackend::new(&cli.base_url).context("invalid --base-url")?;
    tracing::debug!(base_url = backend.base_url(), "backend configured");

    match cli.command {
        Commands::Dashboard { out } => {
            let mut page = DashboardPage::default();
            let summary = dashboard::load_dashboard(&backend, &mut page).await;
            print_alerts(page.alerts.drain())?;
            print!("{}", page.view);

            if let (Some(out), Some(summary)) = (out, summary) {
                let report = report::build_report(&summary, chrono::Utc::now());
                std::fs::write(&out, report)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Report written to {}.", out.display());
            }
        }
        Commands::Predict {
            attendance,
            internal_marks,
            quiz_score,
            login_frequency,
            financial_issue,
            backlog_count,
            intervention: log_as,
        } => {
            let form = PredictionForm {
                attendance,
                internal_marks,
                quiz_score,
                login_frequency,
                financial_issue,
                backlog_count,
            };
            let mut session = PredictionSession::new(&backend);
            session.submit(&form).await;
            print!("{}", session.page.result);
            if !session.page.intervention_visible {
                anyhow::bail!("prediction failed");
            }

            if let Some(selection) = log_as {
                session.log_intervention(&selection).await;
                confirm(session.page.alerts.drain(), intervention::LOGGED)?;
            }
        }
        Commands::Batch { csv, out } => {
            let input = std::fs::File::open(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let output = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let summary = batch::run_batch(&backend, input, output).await?;
            println!(
                "Predicted {} rows ({} failed) into {}.",
                summary.predicted + summary.failed,
                summary.failed,
                out.display()
            );
        }
        Commands::UpdateOutcome {
            timestamp,
            outcome: observed,
        } => {
            let mut alerts = Alerts::default();
            let update = OutcomeUpdate {
                timestamp,
                outcome: observed,
            };
            outcome::record_outcome(&backend, &update, &mut alerts).await;
            confirm(alerts.drain(), outcome::OUTCOME_UPDATED)?;
        }
        Commands::Metrics => {
            let mut alerts = Alerts::default();
            let lines = outcome::load_validation(&backend, &mut alerts).await;
            print_alerts(alerts.drain())?;
            for line in lines {
                println!("{line}");
            }
        }
        Commands::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            println!("{}", session::HELP);
            let alerts = session::run_session(&backend, stdin, std::io::stdout()).await?;
            tracing::info!(alerts, "session ended");
        }
    }

    Ok(())
}
