use tracing::{info, warn};

use crate::client::Backend;
use crate::models::OutcomeUpdate;
use crate::view::{render_validation, Alerts};

pub const OUTCOME_UPDATED: &str = "Outcome updated successfully";
pub const OUTCOME_FAILED: &str = "Failed to update outcome";
pub const METRICS_FAILED: &str = "Failed to load validation metrics";

/// Attaches an observed outcome to a previously logged intervention.
pub async fn record_outcome<B: Backend + ?Sized>(
    backend: &B,
    update: &OutcomeUpdate,
    alerts: &mut Alerts,
) {
    match backend.update_outcome(update).await {
        Ok(()) => {
            info!(timestamp = %update.timestamp, outcome = %update.outcome, "outcome recorded");
            alerts.raise(OUTCOME_UPDATED);
        }
        Err(err) => {
            warn!(error = %err, timestamp = %update.timestamp, "outcome update failed");
            alerts.raise(OUTCOME_FAILED);
        }
    }
}

/// Returns display lines for the validation metrics, or none after raising
/// an alert.
pub async fn load_validation<B: Backend + ?Sized>(backend: &B, alerts: &mut Alerts) -> Vec<String> {
    match backend.validation_metrics().await {
        Ok(metrics) => render_validation(&metrics),
        Err(err) => {
            warn!(error = %err, "validation metrics request failed");
            alerts.raise(METRICS_FAILED);
            Vec::new()
        }
    }
}
