use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::rules::ExpenseTree;

pub const DEFAULT_CURRENCY: &str = "€";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing configuration field: {0}")]
    MissingField(&'static str),
}

/// The `Configuration` section of a tokens document.
///
/// Column names are optional here so that an incomplete document still
/// loads; [`Configuration::field_bindings`] is where absence becomes fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Configuration {
    pub amount_field: Option<String>,
    pub date_field: Option<String>,
    pub merchant_field: Option<String>,
    pub transaction_type_field: Option<String>,
    /// Display only.
    pub currency: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub ignored_statements: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub transaction_type_debit: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub date_formats: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            amount_field: None,
            date_field: None,
            merchant_field: None,
            transaction_type_field: None,
            currency: DEFAULT_CURRENCY.to_string(),
            ignored_statements: Vec::new(),
            transaction_type_debit: Vec::new(),
            date_formats: Vec::new(),
        }
    }
}

/// Ledger column names, resolved and guaranteed non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBindings {
    pub amount: String,
    pub date: String,
    pub merchant: String,
    pub transaction_type: String,
}

impl Configuration {
    pub fn field_bindings(&self) -> Result<FieldBindings, ConfigError> {
        Ok(FieldBindings {
            amount: required(&self.amount_field, "AmountField")?,
            date: required(&self.date_field, "DateField")?,
            merchant: required(&self.merchant_field, "MerchantField")?,
            transaction_type: required(&self.transaction_type_field, "TransactionTypeField")?,
        })
    }

    pub fn is_debit(&self, transaction_type: &str) -> bool {
        self.transaction_type_debit.iter().any(|t| t == transaction_type)
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingField(name))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A whole tokens document: configuration plus the expense tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokensDocument {
    #[serde(rename = "Configuration", default)]
    pub configuration: Configuration,
    #[serde(rename = "Expenses", default, deserialize_with = "null_as_empty_tree")]
    pub expenses: ExpenseTree,
}

fn null_as_empty_tree<'de, D>(deserializer: D) -> Result<ExpenseTree, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ExpenseTree>::deserialize(deserializer)?.unwrap_or_default())
}
