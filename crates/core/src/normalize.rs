use thiserror::Error;

use crate::config::{ConfigError, Configuration, FieldBindings};
use crate::date::{parse_instant, DateFormat};
use crate::money::Money;
use crate::rules::RuleTable;
use crate::text::{fold_case, strip_diacritics};
use crate::transaction::{NormalizedTransaction, RawTransaction};

/// A malformed ledger row. `row` is the 1-based position in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Row {row}: missing column {column:?}")]
    MissingColumn { row: usize, column: String },
    #[error("Row {row}: invalid amount {value:?}")]
    InvalidAmount { row: usize, value: String },
    #[error("Row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },
}

impl NormalizeError {
    pub fn row(&self) -> usize {
        match self {
            NormalizeError::MissingColumn { row, .. }
            | NormalizeError::InvalidAmount { row, .. }
            | NormalizeError::InvalidDate { row, .. } => *row,
        }
    }
}

/// What to do with a debit row that cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Fail the whole run on the first malformed row.
    #[default]
    Abort,
    /// Drop the row, log it, and report it alongside the results.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: NormalizeError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Sorted ascending by date; ties keep ledger order.
    pub transactions: Vec<NormalizedTransaction>,
    pub skipped: Vec<SkippedRow>,
}

pub struct Normalizer<'a> {
    bindings: FieldBindings,
    config: &'a Configuration,
    ignored: Vec<String>,
    rules: &'a RuleTable,
    date_formats: &'a [DateFormat],
    policy: RowPolicy,
}

impl<'a> Normalizer<'a> {
    /// Fails with [`ConfigError::MissingField`] before any row is looked at.
    pub fn new(
        config: &'a Configuration,
        rules: &'a RuleTable,
        date_formats: &'a [DateFormat],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            bindings: config.field_bindings()?,
            config,
            ignored: config.ignored_statements.iter().map(|s| fold_case(s)).collect(),
            rules,
            date_formats,
            policy: RowPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn normalize(&self, rows: &[RawTransaction]) -> Result<Normalized, NormalizeError> {
        let mut out = Normalized::default();
        let mut debits = 0usize;

        for (idx, raw) in rows.iter().enumerate() {
            if !self.is_debit(raw) {
                continue;
            }
            debits += 1;

            match self.normalize_row(idx + 1, raw) {
                Ok(Some(tx)) => out.transactions.push(tx),
                Ok(None) => {}
                Err(e) => match self.policy {
                    RowPolicy::Abort => return Err(e),
                    RowPolicy::Skip => {
                        tracing::warn!("Skipping malformed row: {e}");
                        out.skipped.push(SkippedRow {
                            row: e.row(),
                            reason: e,
                        });
                    }
                },
            }
        }

        out.transactions.sort_by_key(|tx| tx.date);

        tracing::debug!(
            rows = rows.len(),
            debits,
            kept = out.transactions.len(),
            skipped = out.skipped.len(),
            "normalized ledger"
        );
        Ok(out)
    }

    fn is_debit(&self, raw: &RawTransaction) -> bool {
        raw.get(&self.bindings.transaction_type)
            .is_some_and(|t| self.config.is_debit(t))
    }

    /// `Ok(None)` means the row was dropped as an ignored statement.
    fn normalize_row(
        &self,
        row: usize,
        raw: &RawTransaction,
    ) -> Result<Option<NormalizedTransaction>, NormalizeError> {
        let raw_amount = field(raw, &self.bindings.amount, row)?;
        let amount = raw_amount
            .parse::<Money>()
            .ok()
            .filter(|m| !m.exceeds_limit())
            .ok_or_else(|| NormalizeError::InvalidAmount {
                row,
                value: raw_amount.to_string(),
            })?
            .abs();
        let merchant = strip_diacritics(field(raw, &self.bindings.merchant, row)?);
        let raw_date = field(raw, &self.bindings.date, row)?;

        let merchant_folded = fold_case(&merchant);
        if self.ignored.iter().any(|s| merchant_folded.contains(s.as_str())) {
            return Ok(None);
        }

        let (category, subcategory) = match self.rules.find_folded(&merchant_folded) {
            Some(rule) => (rule.category.clone(), rule.subcategory.clone()),
            None => (String::new(), String::new()),
        };

        let date = parse_instant(raw_date, self.date_formats).map_err(|_| {
            NormalizeError::InvalidDate {
                row,
                value: raw_date.to_string(),
            }
        })?;

        Ok(Some(NormalizedTransaction {
            category,
            subcategory,
            amount,
            date,
        }))
    }
}

fn field<'r>(raw: &'r RawTransaction, column: &str, row: usize) -> Result<&'r str, NormalizeError> {
    raw.get(column)
        .map(String::as_str)
        .ok_or_else(|| NormalizeError::MissingColumn {
            row,
            column: column.to_string(),
        })
}
