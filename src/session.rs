//! Line-oriented prompt that keeps one prediction slot for the whole process,
//! so `predict` followed by `log` behaves like the form page.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::client::Backend;
use crate::dashboard::load_dashboard;
use crate::models::PredictionForm;
use crate::outcome::load_validation;
use crate::predict::PredictionSession;
use crate::view::{Alerts, DashboardPage};

pub const HELP: &str = "\
commands:
  predict <attendance> <marks> <quiz> <login> <financial> <backlog>
  log <intervention>
  dashboard
  metrics
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Predict(PredictionForm),
    Log(String),
    Dashboard,
    Metrics,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "predict" => {
            let mut fields = rest.split_whitespace().map(str::to_string);
            // Missing trailing values act like blank form fields.
            let mut next = || fields.next().unwrap_or_default();
            Ok(Command::Predict(PredictionForm {
                attendance: next(),
                internal_marks: next(),
                quiz_score: next(),
                login_frequency: next(),
                financial_issue: next(),
                backlog_count: next(),
            }))
        }
        "log" => Ok(Command::Log(rest.to_string())),
        "dashboard" => Ok(Command::Dashboard),
        "metrics" => Ok(Command::Metrics),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command `{other}`")),
    }
}

/// Reads commands until `quit` or end of input. Returns the number of
/// alerts raised during the session.
pub async fn run_session<B, R, W>(backend: &B, input: R, mut out: W) -> anyhow::Result<usize>
where
    B: Backend + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = PredictionSession::new(backend);
    let mut lines = input.lines();
    let mut alert_count = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        debug!(?command, "session command");

        let mut alerts = Vec::new();
        match command {
            Command::Predict(form) => {
                session.submit(&form).await;
                write!(out, "{}", session.page.result)?;
                if session.page.intervention_visible {
                    writeln!(out, "(log <intervention> to record an action)")?;
                }
            }
            Command::Log(selection) => session.log_intervention(&selection).await,
            Command::Dashboard => {
                let mut page = DashboardPage::default();
                load_dashboard(backend, &mut page).await;
                if page.alerts.is_empty() {
                    write!(out, "{}", page.view)?;
                }
                alerts.extend(page.alerts.drain());
            }
            Command::Metrics => {
                let mut page_alerts = Alerts::default();
                for line in load_validation(backend, &mut page_alerts).await {
                    writeln!(out, "{line}")?;
                }
                alerts.extend(page_alerts.drain());
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => break,
        }

        alerts.extend(session.page.alerts.drain());
        for alert in &alerts {
            writeln!(out, "! {alert}")?;
        }
        alert_count += alerts.len();
    }

    Ok(alert_count)
}
