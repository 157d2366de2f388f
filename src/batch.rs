use std::io::{Read, Write};

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::client::Backend;
use crate::models::PredictionForm;

#[derive(Debug, Default, Serialize)]
struct BatchRow {
    attendance: Option<f64>,
    internal_marks: Option<f64>,
    quiz_score: Option<f64>,
    login_frequency: Option<f64>,
    financial_issue: Option<f64>,
    backlog_count: Option<f64>,
    dropout_risk_percentage: Option<f64>,
    risk_level: Option<String>,
    top_risk_factors: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub predicted: usize,
    pub failed: usize,
}

/// Submits each CSV row to `/predict` in order, one request at a time, and
/// writes one result row per input row. Failed rows, including rows that do
/// not parse, carry the error text. Only I/O errors stop the batch.
pub async fn run_batch<B, R, W>(backend: &B, input: R, output: W) -> anyhow::Result<BatchSummary>
where
    B: Backend + ?Sized,
    R: Read,
    W: Write,
{
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for (index, record) in reader.deserialize::<PredictionForm>().enumerate() {
        let form = match record {
            Ok(form) => form,
            Err(err) if err.is_io_error() => {
                return Err(err).with_context(|| format!("failed to read CSV row {}", index + 1));
            }
            Err(err) => {
                warn!(row = index + 1, error = %err, "skipping malformed CSV row");
                writer.serialize(BatchRow {
                    error: Some(format!("invalid CSV row: {err}")),
                    ..Default::default()
                })?;
                summary.failed += 1;
                continue;
            }
        };
        let input = form.to_input();

        let mut row = BatchRow {
            attendance: Some(input.attendance),
            internal_marks: Some(input.internal_marks),
            quiz_score: Some(input.quiz_score),
            login_frequency: Some(input.login_frequency),
            financial_issue: Some(input.financial_issue),
            backlog_count: Some(input.backlog_count),
            ..Default::default()
        };

        match backend.predict(&input).await {
            Ok(result) => {
                row.dropout_risk_percentage = Some(result.dropout_risk_percentage);
                row.risk_level = Some(result.risk_level);
                row.top_risk_factors = Some(result.top_risk_factors.join("; "));
                summary.predicted += 1;
            }
            Err(err) => {
                warn!(row = index + 1, error = %err, "batch prediction failed");
                row.error = Some(err.to_string());
                summary.failed += 1;
            }
        }

        writer.serialize(&row)?;
    }

    writer.flush()?;
    info!(
        predicted = summary.predicted,
        failed = summary.failed,
        "batch complete"
    );
    Ok(summary)
}
