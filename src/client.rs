use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    DashboardSummary, InterventionPayload, OutcomeUpdate, PredictionInput, PredictionResult,
    ValidationMetrics,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid backend url {0}")]
    InvalidUrl(String),
}

/// The HTTP contracts of the prediction backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn dashboard(&self) -> Result<DashboardSummary, ClientError>;
    async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, ClientError>;
    async fn log_intervention(&self, payload: &InterventionPayload) -> Result<(), ClientError>;
    async fn update_outcome(&self, update: &OutcomeUpdate) -> Result<(), ClientError>;
    async fn validation_metrics(&self) -> Result<ValidationMetrics, ClientError>;
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.client.get(self.url(path)).send().await?;
        read_json(check_status(resp).await?).await
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        check_status(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Parses the body of a response whose status was already checked.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let text = resp.text().await?;
    debug!(bytes = text.len(), "response body received");
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn dashboard(&self) -> Result<DashboardSummary, ClientError> {
        self.get_json("dashboard").await
    }

    async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, ClientError> {
        let resp = self.post("predict", input).await?;
        read_json(resp).await
    }

    async fn log_intervention(&self, payload: &InterventionPayload) -> Result<(), ClientError> {
        self.post("log-intervention", payload).await?;
        Ok(())
    }

    async fn update_outcome(&self, update: &OutcomeUpdate) -> Result<(), ClientError> {
        self.post("update-outcome", update).await?;
        Ok(())
    }

    async fn validation_metrics(&self) -> Result<ValidationMetrics, ClientError> {
        self.get_json("validation-metrics").await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::models::LastPrediction;

    type Seen = Arc<Mutex<Vec<Value>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn sample_input() -> PredictionInput {
        PredictionInput {
            attendance: 40.0,
            internal_marks: 30.0,
            quiz_score: 20.0,
            login_frequency: 1.0,
            financial_issue: 1.0,
            backlog_count: 3.0,
        }
    }

    #[tokio::test]
    async fn predict_posts_json_and_parses_result() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/predict",
                post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({
                        "dropout_risk_percentage": 82,
                        "risk_level": "High",
                        "top_risk_factors": ["Low attendance", "Backlogs"]
                    }))
                }),
            )
            .with_state(seen.clone());
        let backend = HttpBackend::new(&serve(router).await).unwrap();

        let result = backend.predict(&sample_input()).await.unwrap();
        assert_eq!(result.dropout_risk_percentage, 82.0);
        assert_eq!(result.risk_level, "High");
        assert_eq!(result.top_risk_factors.len(), 2);

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["attendance"], 40.0);
        assert_eq!(bodies[0]["backlog_count"], 3.0);
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let router = Router::new().route(
            "/predict",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "model failed"})),
                )
            }),
        );
        let backend = HttpBackend::new(&serve(router).await).unwrap();

        let err = backend.predict(&sample_input()).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn get_error_keeps_status_and_body() {
        let router = Router::new().route(
            "/validation-metrics",
            get(|| async { (StatusCode::NOT_FOUND, "missing") }),
        );
        let backend = HttpBackend::new(&serve(router).await).unwrap();

        match backend.validation_metrics().await.unwrap_err() {
            ClientError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_parse_error() {
        let router = Router::new().route("/predict", post(|| async { "<html>ok</html>" }));
        let backend = HttpBackend::new(&serve(router).await).unwrap();

        let err = backend.predict(&sample_input()).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn dashboard_without_data_is_a_parse_error() {
        let router = Router::new().route(
            "/dashboard",
            get(|| async { Json(json!({"message": "No data available"})) }),
        );
        let backend = HttpBackend::new(&serve(router).await).unwrap();

        let err = backend.dashboard().await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn log_intervention_ignores_response_body() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/log-intervention",
                post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    "logged"
                }),
            )
            .with_state(seen.clone());
        let backend = HttpBackend::new(&serve(router).await).unwrap();

        let payload = InterventionPayload {
            prediction: LastPrediction {
                input: sample_input(),
                risk_level: "High".to_string(),
            },
            intervention_taken: "Mentoring".to_string(),
        };
        backend.log_intervention(&payload).await.unwrap();

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies[0]["intervention_taken"], "Mentoring");
        assert_eq!(bodies[0]["risk_level"], "High");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = HttpBackend::new(&format!("http://{addr}")).unwrap();

        let err = backend.validation_metrics().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        let backend = HttpBackend::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:8000");
    }
}
