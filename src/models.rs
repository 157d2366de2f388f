use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// The six numeric fields submitted to `/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub attendance: f64,
    pub internal_marks: f64,
    pub quiz_score: f64,
    pub login_frequency: f64,
    pub financial_issue: f64,
    pub backlog_count: f64,
}

/// Raw text as typed into the prediction form, before coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PredictionForm {
    pub attendance: String,
    pub internal_marks: String,
    pub quiz_score: String,
    pub login_frequency: String,
    pub financial_issue: String,
    pub backlog_count: String,
}

impl PredictionForm {
    pub fn to_input(&self) -> PredictionInput {
        PredictionInput {
            attendance: coerce_number(&self.attendance),
            internal_marks: coerce_number(&self.internal_marks),
            quiz_score: coerce_number(&self.quiz_score),
            login_frequency: coerce_number(&self.login_frequency),
            financial_issue: coerce_number(&self.financial_issue),
            backlog_count: coerce_number(&self.backlog_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub dropout_risk_percentage: f64,
    pub risk_level: String,
    pub top_risk_factors: Vec<String>,
}

/// Input of the most recent successful prediction plus the level it was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastPrediction {
    #[serde(flatten)]
    pub input: PredictionInput,
    pub risk_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionPayload {
    #[serde(flatten)]
    pub prediction: LastPrediction,
    pub intervention_taken: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardSummary {
    pub total_logs: u64,
    pub risk_distribution: Distribution,
    pub intervention_distribution: Distribution,
    pub outcome_distribution: Distribution,
}

/// Label to count mapping that keeps the order the backend sent the keys in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution(pub Vec<(String, u64)>);

impl Distribution {
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Distribution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = Distribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category label to count")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    entries.push((label, count));
                }
                Ok(Distribution(entries))
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeUpdate {
    pub timestamp: String,
    pub outcome: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ValidationMetrics {
    Rates {
        high_risk_dropout_rate: f64,
        non_high_risk_dropout_rate: f64,
        total_validated_cases: u64,
    },
    Unavailable {
        message: String,
    },
}

/// Converts form text to a number with the same rules a browser's `Number()`
/// applies: trimmed, empty is zero, radix prefixes and `Infinity` accepted,
/// everything else is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&text[2..], radix);
    }

    // f64::from_str also takes "inf" and "nan", which Number() rejects.
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}
