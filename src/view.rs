//! View models standing in for the page markup.
//!
//! Each flow mutates one of these structs instead of touching elements
//! directly. The `render_*` functions are pure so that what gets shown for a
//! given backend response can be checked without a network.

use std::fmt;

use crate::models::{DashboardSummary, Distribution, PredictionResult, ValidationMetrics};

/// Element identifiers shared with the page markup.
pub mod ids {
    pub const ATTENDANCE: &str = "attendance";
    pub const MARKS: &str = "marks";
    pub const QUIZ: &str = "quiz";
    pub const LOGIN: &str = "login";
    pub const FINANCIAL: &str = "financial";
    pub const BACKLOG: &str = "backlog";
    pub const RESULT: &str = "result";
    pub const LOADING: &str = "loading";
    pub const SUBMIT_BTN: &str = "submitBtn";
    pub const INTERVENTION_SECTION: &str = "interventionSection";
    pub const RISK_STATS: &str = "riskStats";
    pub const INTERVENTION_STATS: &str = "interventionStats";
    pub const OUTCOME_STATS: &str = "outcomeStats";
}

pub const BACKEND_ERROR_TEXT: &str = "Error connecting to backend";

/// Blocking messages shown to the user, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alerts(Vec<String>);

impl Alerts {
    pub fn raise(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub total_logs: String,
    pub risk_stats: Vec<String>,
    pub intervention_stats: Vec<String>,
    pub outcome_stats: Vec<String>,
}

#[derive(Debug, Default)]
pub struct DashboardPage {
    pub view: DashboardView,
    pub alerts: Alerts,
}

pub fn render_dashboard(summary: &DashboardSummary) -> DashboardView {
    DashboardView {
        total_logs: summary.total_logs.to_string(),
        risk_stats: list_items(&summary.risk_distribution),
        intervention_stats: list_items(&summary.intervention_distribution),
        outcome_stats: list_items(&summary.outcome_distribution),
    }
}

fn list_items(distribution: &Distribution) -> Vec<String> {
    distribution
        .iter()
        .map(|(label, count)| format!("{label}: {count}"))
        .collect()
}

impl DashboardView {
    /// The three list elements as `(element id, title, entries)`.
    pub fn lists(&self) -> [(&'static str, &'static str, &[String]); 3] {
        [
            (ids::RISK_STATS, "Risk distribution", self.risk_stats.as_slice()),
            (
                ids::INTERVENTION_STATS,
                "Interventions",
                self.intervention_stats.as_slice(),
            ),
            (ids::OUTCOME_STATS, "Outcomes", self.outcome_stats.as_slice()),
        ]
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total logs: {}", self.total_logs)?;
        for (_, title, items) in self.lists() {
            writeln!(f, "{title}:")?;
            for item in items {
                writeln!(f, "  - {item}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultBody {
    #[default]
    Empty,
    Prediction {
        percentage: String,
        risk_level: String,
        factors: Vec<String>,
    },
    Message(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPanel {
    /// Styling key, e.g. `"result high"`.
    pub class_name: String,
    pub body: ResultBody,
}

pub fn render_prediction(result: &PredictionResult) -> ResultPanel {
    ResultPanel {
        class_name: format!("result {}", result.risk_level.to_lowercase()),
        body: ResultBody::Prediction {
            percentage: format!("{}%", result.dropout_risk_percentage),
            risk_level: result.risk_level.clone(),
            factors: result.top_risk_factors.clone(),
        },
    }
}

pub fn render_backend_error() -> ResultPanel {
    ResultPanel {
        class_name: "result high-risk".to_string(),
        body: ResultBody::Message(BACKEND_ERROR_TEXT.to_string()),
    }
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ResultBody::Empty => Ok(()),
            ResultBody::Message(text) => writeln!(f, "{text}"),
            ResultBody::Prediction {
                percentage,
                risk_level,
                factors,
            } => {
                writeln!(f, "Dropout Risk: {percentage}")?;
                writeln!(f, "Risk Level: {risk_level}")?;
                writeln!(f, "Top Risk Factors:")?;
                for (i, factor) in factors.iter().enumerate() {
                    writeln!(f, "  {}. {factor}", i + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PredictionPage {
    pub result: ResultPanel,
    pub result_visible: bool,
    pub loading_visible: bool,
    pub submit_disabled: bool,
    pub intervention_visible: bool,
    pub alerts: Alerts,
}

impl PredictionPage {
    pub(crate) fn begin_submission(&mut self) {
        self.result_visible = false;
        self.intervention_visible = false;
        self.loading_visible = true;
        self.submit_disabled = true;
    }

    pub(crate) fn finish_submission(&mut self) {
        self.loading_visible = false;
        self.submit_disabled = false;
    }

    pub(crate) fn show_result(&mut self, panel: ResultPanel) {
        self.result = panel;
        self.result_visible = true;
    }

    /// Ids of the elements currently shown, in page order.
    pub fn visible_elements(&self) -> Vec<&'static str> {
        let mut shown = Vec::new();
        if self.loading_visible {
            shown.push(ids::LOADING);
        }
        if self.result_visible {
            shown.push(ids::RESULT);
        }
        if self.intervention_visible {
            shown.push(ids::INTERVENTION_SECTION);
        }
        shown
    }
}

pub fn render_validation(metrics: &ValidationMetrics) -> Vec<String> {
    match metrics {
        ValidationMetrics::Rates {
            high_risk_dropout_rate,
            non_high_risk_dropout_rate,
            total_validated_cases,
        } => vec![
            format!("High-risk dropout rate: {high_risk_dropout_rate}%"),
            format!("Non-high-risk dropout rate: {non_high_risk_dropout_rate}%"),
            format!("Validated cases: {total_validated_cases}"),
        ],
        ValidationMetrics::Unavailable { message } => vec![message.clone()],
    }
}
