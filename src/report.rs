use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{DashboardSummary, Distribution};

fn write_distribution(output: &mut String, title: &str, distribution: &Distribution) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");

    if distribution.is_empty() {
        let _ = writeln!(output, "No entries recorded.");
    } else {
        for (label, count) in distribution.iter() {
            let _ = writeln!(output, "- {label}: {count}");
        }
    }
}

pub fn build_report(summary: &DashboardSummary, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Dropout Intervention Dashboard");
    let _ = writeln!(
        output,
        "Generated {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "Total logged interventions: {}", summary.total_logs);

    write_distribution(&mut output, "Risk Distribution", &summary.risk_distribution);
    write_distribution(
        &mut output,
        "Intervention Distribution",
        &summary.intervention_distribution,
    );
    write_distribution(&mut output, "Outcome Distribution", &summary.outcome_distribution);

    output
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn report_lists_every_distribution() {
        let summary = DashboardSummary {
            total_logs: 4,
            risk_distribution: Distribution(vec![("High".to_string(), 3), ("Low".to_string(), 1)]),
            intervention_distribution: Distribution(vec![("Counseling".to_string(), 4)]),
            outcome_distribution: Distribution::default(),
        };
        let generated_at = Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap();

        let report = build_report(&summary, generated_at);

        assert!(report.starts_with("# Dropout Intervention Dashboard\n"));
        assert!(report.contains("Generated 2026-02-02T09:30:00Z"));
        assert!(report.contains("Total logged interventions: 4"));
        assert!(report.contains("## Risk Distribution\n- High: 3\n- Low: 1\n"));
        assert!(report.contains("## Intervention Distribution\n- Counseling: 4\n"));
        assert!(report.contains("## Outcome Distribution\nNo entries recorded.\n"));
    }
}
