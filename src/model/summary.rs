//! Wire types for the two server aggregates.

use serde::{Deserialize, Serialize};

/// Response of `GET /summary/month`. The server sends the total as text for currency safety.
/// When the field is absent (or the payload is not an object) the total defaults to `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    #[serde(default = "zero")]
    pub total: String,
}

impl Default for MonthSummary {
    fn default() -> Self {
        Self { total: zero() }
    }
}

fn zero() -> String {
    "0".to_string()
}

/// One row of `GET /summary/by_category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(default)]
    pub category: String,
    #[serde(default = "zero")]
    pub total: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_summary_missing_total_defaults_to_zero() {
        let s: MonthSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(s.total, "0");
    }

    #[test]
    fn test_month_summary_with_total() {
        let s: MonthSummary = serde_json::from_str(r#"{"total":"123.45"}"#).unwrap();
        assert_eq!(s.total, "123.45");
    }

    #[test]
    fn test_category_total() {
        let c: CategoryTotal =
            serde_json::from_str(r#"{"category":"Food","total":"45.00"}"#).unwrap();
        assert_eq!(c.category, "Food");
        assert_eq!(c.total, "45.00");
    }
}
