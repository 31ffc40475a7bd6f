//! Keyword-based risk classification.

use crate::config::CompiledPolicy;
use serde::Serialize;
use std::fmt;

/// Severity of an intercepted prompt or payload. Ordered so higher
/// severities compare greater, leaving room for more levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "LOW",
            RiskLevel::High => "HIGH",
        })
    }
}

/// Classify text against the configured keyword list.
///
/// Case-insensitive substring scan; the first matching keyword
/// short-circuits to `High`. Empty text is `Low`.
pub fn classify(text: &str, policy: &CompiledPolicy) -> RiskLevel {
    if text.is_empty() {
        return RiskLevel::Low;
    }
    let lowered = text.to_lowercase();
    for keyword in &policy.high_risk_keywords {
        if lowered.contains(keyword.as_str()) {
            return RiskLevel::High;
        }
    }
    RiskLevel::Low
}
