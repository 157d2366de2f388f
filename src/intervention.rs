use tracing::{info, warn};

use crate::client::Backend;
use crate::models::InterventionPayload;
use crate::predict::{PredictionSession, PredictionSlot};

pub const SELECT_REQUIRED: &str = "Please select an intervention";
pub const NO_PREDICTION: &str = "Run a prediction before logging an intervention";
pub const LOGGED: &str = "Intervention logged successfully";
pub const LOG_FAILED: &str = "Failed to log intervention";

impl<B: Backend + ?Sized> PredictionSession<'_, B> {
    /// Records the selected intervention against the last prediction.
    pub async fn log_intervention(&mut self, selection: &str) {
        if selection.is_empty() {
            self.page.alerts.raise(SELECT_REQUIRED);
            return;
        }

        let Some(prediction) = self.last.value().cloned() else {
            self.page.alerts.raise(NO_PREDICTION);
            return;
        };
        if let PredictionSlot::Stale(_) = self.last {
            warn!(
                risk_level = %prediction.risk_level,
                "latest submission failed, logging against the previous prediction"
            );
        }

        let payload = InterventionPayload {
            prediction,
            intervention_taken: selection.to_string(),
        };

        match self.backend.log_intervention(&payload).await {
            Ok(()) => {
                info!(intervention = %payload.intervention_taken, "intervention logged");
                self.page.alerts.raise(LOGGED);
            }
            Err(err) => {
                warn!(error = %err, "intervention log failed");
                self.page.alerts.raise(LOG_FAILED);
            }
        }
    }
}
