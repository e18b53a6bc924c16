//! Confidence presentation helpers.
//! Probabilities stay in [0, 1] internally; callers see percentages.

use serde::{Deserialize, Serialize};

use crate::config::ConfidenceBands;

/// Render a probability as a percentage rounded to two decimals.
pub fn to_percent(probability: f64) -> f64 {
    round_to(probability * 100.0, 2)
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Coarse confidence band shown next to each condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Classify a raw probability against the configured bands.
    pub fn classify(probability: f64, bands: &ConfidenceBands) -> Self {
        if probability >= bands.high {
            ConfidenceLevel::High
        } else if probability >= bands.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        assert_eq!(to_percent(0.123456), 12.35);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
    }

    #[test]
    fn test_level_bands() {
        let bands = ConfidenceBands::default();
        assert_eq!(ConfidenceLevel::classify(0.95, &bands), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::classify(0.80, &bands), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::classify(0.60, &bands), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::classify(0.59, &bands), ConfidenceLevel::Low);
    }

    #[test]
    fn test_round_to_four() {
        assert!((round_to(0.123456, 4) - 0.1235).abs() < 1e-12);
    }
}
