//! AQI severity categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Air Quality Index tier as reported upstream, 1 (best) to 5 (worst)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AqiValue(pub i64);

impl AqiValue {
    /// Category for this index value
    #[must_use]
    pub fn category(self) -> AqiCategory {
        classify(Some(self))
    }
}

impl From<i64> for AqiValue {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for AqiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Unknown,
}

impl AqiLevel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Fair => "Fair",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
            AqiLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Color key the UI uses to render a category
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTag {
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Gray,
}

impl SeverityTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTag::Green => "green",
            SeverityTag::Yellow => "yellow",
            SeverityTag::Orange => "orange",
            SeverityTag::Red => "red",
            SeverityTag::Purple => "purple",
            SeverityTag::Gray => "gray",
        }
    }
}

impl fmt::Display for SeverityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable interpretation of an AQI value
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct AqiCategory {
    pub level: AqiLevel,
    pub description: &'static str,
    pub severity: SeverityTag,
}

impl AqiCategory {
    const fn new(level: AqiLevel, description: &'static str, severity: SeverityTag) -> Self {
        Self {
            level,
            description,
            severity,
        }
    }
}

/// Map an AQI value to its category.
///
/// Total: anything outside 1..=5, including an absent value, is `Unknown`.
#[must_use]
pub fn classify(aqi: Option<AqiValue>) -> AqiCategory {
    match aqi.map(|value| value.0) {
        Some(1) => AqiCategory::new(AqiLevel::Good, "Air quality is healthy", SeverityTag::Green),
        Some(2) => AqiCategory::new(AqiLevel::Fair, "Air quality is moderate", SeverityTag::Yellow),
        Some(3) => {
            AqiCategory::new(AqiLevel::Moderate, "Some pollutants present", SeverityTag::Orange)
        }
        Some(4) => AqiCategory::new(AqiLevel::Poor, "Air quality is unhealthy", SeverityTag::Red),
        Some(5) => AqiCategory::new(AqiLevel::VeryPoor, "Very unhealthy air", SeverityTag::Purple),
        _ => AqiCategory::new(AqiLevel::Unknown, "No data available", SeverityTag::Gray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, AqiLevel::Good, "Air quality is healthy", SeverityTag::Green)]
    #[case(2, AqiLevel::Fair, "Air quality is moderate", SeverityTag::Yellow)]
    #[case(3, AqiLevel::Moderate, "Some pollutants present", SeverityTag::Orange)]
    #[case(4, AqiLevel::Poor, "Air quality is unhealthy", SeverityTag::Red)]
    #[case(5, AqiLevel::VeryPoor, "Very unhealthy air", SeverityTag::Purple)]
    fn test_classify_known_tiers(
        #[case] aqi: i64,
        #[case] level: AqiLevel,
        #[case] description: &str,
        #[case] severity: SeverityTag,
    ) {
        let category = classify(Some(AqiValue(aqi)));
        assert_eq!(category.level, level);
        assert_eq!(category.description, description);
        assert_eq!(category.severity, severity);
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(6))]
    #[case(Some(-1))]
    #[case(Some(i64::MAX))]
    #[case(None)]
    fn test_classify_unknown(#[case] aqi: Option<i64>) {
        let category = classify(aqi.map(AqiValue));
        assert_eq!(category.level, AqiLevel::Unknown);
        assert_eq!(category.description, "No data available");
        assert_eq!(category.severity, SeverityTag::Gray);
    }

    #[test]
    fn test_category_serializes_with_labels() {
        let json = serde_json::to_value(classify(Some(AqiValue(5)))).unwrap();
        assert_eq!(json["level"], "Very Poor");
        assert_eq!(json["description"], "Very unhealthy air");
        assert_eq!(json["severity"], "purple");
    }

    #[test]
    fn test_aqi_value_category_shortcut() {
        assert_eq!(AqiValue(2).category(), classify(Some(AqiValue(2))));
        assert_eq!(AqiValue::from(3).to_string(), "3");
    }
}
