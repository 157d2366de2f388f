use tracing::{debug, info, warn};

use crate::client::Backend;
use crate::models::{LastPrediction, PredictionForm};
use crate::view::{ids, render_backend_error, render_prediction, PredictionPage};

/// Single-slot, last-write-wins holder for the latest prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PredictionSlot {
    #[default]
    Empty,
    Current(LastPrediction),
    /// A later submission failed; the value is from the last success.
    Stale(LastPrediction),
}

impl PredictionSlot {
    pub fn value(&self) -> Option<&LastPrediction> {
        match self {
            PredictionSlot::Empty => None,
            PredictionSlot::Current(p) | PredictionSlot::Stale(p) => Some(p),
        }
    }

    fn mark_stale(&mut self) {
        *self = match std::mem::take(self) {
            PredictionSlot::Current(p) | PredictionSlot::Stale(p) => PredictionSlot::Stale(p),
            PredictionSlot::Empty => PredictionSlot::Empty,
        };
    }
}

/// Prediction form plus the intervention controls that depend on it.
pub struct PredictionSession<'a, B: Backend + ?Sized> {
    pub(crate) backend: &'a B,
    pub page: PredictionPage,
    pub(crate) last: PredictionSlot,
}

impl<'a, B: Backend + ?Sized> PredictionSession<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            page: PredictionPage::default(),
            last: PredictionSlot::default(),
        }
    }

    /// Handles a form submission. Loading is always cleared and the submit
    /// control re-enabled once the request settles.
    pub async fn submit(&mut self, form: &PredictionForm) {
        let input = form.to_input();
        self.page.begin_submission();
        debug!(
            visible = ?self.page.visible_elements(),
            disabled = ids::SUBMIT_BTN,
            "submitting prediction"
        );

        let outcome = self.backend.predict(&input).await;
        self.page.finish_submission();

        match outcome {
            Ok(result) => {
                info!(
                    risk_level = %result.risk_level,
                    percentage = result.dropout_risk_percentage,
                    "prediction received"
                );
                self.page.show_result(render_prediction(&result));
                self.last = PredictionSlot::Current(LastPrediction {
                    input,
                    risk_level: result.risk_level,
                });
                self.page.intervention_visible = true;
            }
            Err(err) => {
                warn!(error = %err, "prediction request failed");
                self.page.show_result(render_backend_error());
                self.last.mark_stale();
            }
        }
        debug!(visible = ?self.page.visible_elements(), "prediction settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeBackend;
    use crate::models::{PredictionInput, PredictionResult};
    use crate::view::{ResultBody, BACKEND_ERROR_TEXT};

    fn sample_form() -> PredictionForm {
        PredictionForm {
            attendance: "40".to_string(),
            internal_marks: "30".to_string(),
            quiz_score: "20".to_string(),
            login_frequency: "1".to_string(),
            financial_issue: "1".to_string(),
            backlog_count: "3".to_string(),
        }
    }

    fn high_risk() -> PredictionResult {
        PredictionResult {
            dropout_risk_percentage: 82.0,
            risk_level: "High".to_string(),
            top_risk_factors: vec!["Low attendance".to_string(), "Backlogs".to_string()],
        }
    }

    #[tokio::test]
    async fn success_renders_result_and_stores_prediction() {
        let backend = FakeBackend {
            prediction: Some(high_risk()),
            ..Default::default()
        };
        let mut session = PredictionSession::new(&backend);

        session.submit(&sample_form()).await;

        let page = &session.page;
        assert!(!page.loading_visible);
        assert!(!page.submit_disabled);
        assert!(page.result_visible);
        assert!(page.intervention_visible);
        assert_eq!(page.result.class_name, "result high");
        match &page.result.body {
            ResultBody::Prediction {
                percentage,
                risk_level,
                factors,
            } => {
                assert_eq!(percentage, "82%");
                assert_eq!(risk_level, "High");
                assert_eq!(factors.len(), 2);
            }
            other => panic!("unexpected body {other:?}"),
        }

        let expected_input = PredictionInput {
            attendance: 40.0,
            internal_marks: 30.0,
            quiz_score: 20.0,
            login_frequency: 1.0,
            financial_issue: 1.0,
            backlog_count: 3.0,
        };
        assert_eq!(backend.predicted.lock().unwrap().as_slice(), &[expected_input]);
        assert_eq!(
            &session.last,
            &PredictionSlot::Current(LastPrediction {
                input: expected_input,
                risk_level: "High".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn failure_shows_error_and_hides_interventions() {
        let backend = FakeBackend::default();
        let mut session = PredictionSession::new(&backend);
        session.page.intervention_visible = true;

        session.submit(&sample_form()).await;

        let page = &session.page;
        assert!(!page.loading_visible);
        assert!(!page.submit_disabled);
        assert!(page.result_visible);
        assert!(!page.intervention_visible);
        assert_eq!(page.result.class_name, "result high-risk");
        assert_eq!(page.result.body, ResultBody::Message(BACKEND_ERROR_TEXT.to_string()));
        assert_eq!(&session.last, &PredictionSlot::Empty);
    }

    #[tokio::test]
    async fn failure_keeps_previous_prediction_value() {
        let good = FakeBackend {
            prediction: Some(high_risk()),
            ..Default::default()
        };
        let mut session = PredictionSession::new(&good);
        session.submit(&sample_form()).await;
        let before = session.last.value().cloned();

        let failing = FakeBackend::default();
        let mut session = PredictionSession {
            backend: &failing,
            page: session.page,
            last: session.last,
        };
        let mut other = sample_form();
        other.attendance = "95".to_string();
        session.submit(&other).await;

        assert!(matches!(session.last, PredictionSlot::Stale(_)));
        assert_eq!(session.last.value().cloned(), before);
    }

    #[tokio::test]
    async fn invalid_text_is_sent_as_nan() {
        let backend = FakeBackend::default();
        let mut session = PredictionSession::new(&backend);
        let mut form = sample_form();
        form.quiz_score = "twenty".to_string();

        session.submit(&form).await;

        let sent = backend.predicted.lock().unwrap();
        assert!(sent[0].quiz_score.is_nan());
        assert_eq!(sent[0].attendance, 40.0);
    }
}
