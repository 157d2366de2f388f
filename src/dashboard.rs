use tracing::{info, warn};

use crate::client::Backend;
use crate::models::DashboardSummary;
use crate::view::{render_dashboard, DashboardPage};

pub const LOAD_FAILED: &str = "Failed to load dashboard data";

/// Fetches the summary once and replaces the page lists. On failure the page
/// keeps what it showed before and gets a single alert.
///
/// The fetched summary is handed back for callers that also write a report.
pub async fn load_dashboard<B: Backend + ?Sized>(
    backend: &B,
    page: &mut DashboardPage,
) -> Option<DashboardSummary> {
    match backend.dashboard().await {
        Ok(summary) => {
            info!(
                total_logs = summary.total_logs,
                risk_levels = summary.risk_distribution.len(),
                "dashboard loaded"
            );
            page.view = render_dashboard(&summary);
            Some(summary)
        }
        Err(err) => {
            warn!(error = %err, "dashboard request failed");
            page.alerts.raise(LOAD_FAILED);
            None
        }
    }
}
