use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::date::to_iso_millis;
use super::money::Money;

/// Label of the bucket collecting debits that matched no rule.
pub const UNCLASSIFIED: &str = "Unclassified";

/// An untyped ledger row. Column names come from configuration, so the row
/// stays a string map until the normalizer resolves the fields it needs.
pub type RawTransaction = HashMap<String, String>;

/// A categorized debit. `category` and `subcategory` are either both empty
/// (unclassified) or both set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedTransaction {
    pub category: String,
    pub subcategory: String,
    pub amount: Money,
    #[serde(serialize_with = "serialize_instant")]
    pub date: DateTime<Utc>,
}

impl NormalizedTransaction {
    pub fn is_classified(&self) -> bool {
        !self.category.is_empty() && !self.subcategory.is_empty()
    }

    pub fn date_iso(&self) -> String {
        to_iso_millis(&self.date)
    }
}

fn serialize_instant<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso_millis(date))
}

/// Summed spend for one (category, subcategory) pair, or for the
/// unclassified bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryTotal {
    pub category: String,
    pub subcategory: String,
    pub amount: Money,
}

impl SubcategoryTotal {
    pub fn new(category: &str, subcategory: &str) -> Self {
        Self {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            amount: Money::zero(),
        }
    }

    pub fn unclassified() -> Self {
        Self::new(UNCLASSIFIED, "")
    }

    pub fn is_unclassified(&self) -> bool {
        self.category == UNCLASSIFIED && self.subcategory.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn tx(category: &str, subcategory: &str) -> NormalizedTransaction {
        NormalizedTransaction {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            amount: Money::from_decimal(dec!(35.30)),
            date: Utc.with_ymd_and_hms(2021, 11, 2, 3, 37, 7).unwrap(),
        }
    }

    #[test]
    fn classification_requires_both_labels() {
        assert!(tx("Shop", "Amazon").is_classified());
        assert!(!tx("", "").is_classified());
    }

    #[test]
    fn date_renders_with_millis_and_z() {
        assert_eq!(tx("", "").date_iso(), "2021-11-02T03:37:07.000Z");
    }

    #[test]
    fn serializes_date_as_iso_string() {
        let json = serde_json::to_value(tx("Shop", "Amazon")).unwrap();
        assert_eq!(json["date"], "2021-11-02T03:37:07.000Z");
        assert_eq!(json["category"], "Shop");
        assert_eq!(json["subcategory"], "Amazon");
    }

    #[test]
    fn unclassified_total_starts_at_zero() {
        let total = SubcategoryTotal::unclassified();
        assert!(total.is_unclassified());
        assert!(total.amount.is_zero());
        assert!(!SubcategoryTotal::new("Shop", "Amazon").is_unclassified());
    }
}
