use thiserror::Error;

use crate::aggregate::aggregate;
use crate::config::{ConfigError, Configuration};
use crate::date::DateFormat;
use crate::normalize::{NormalizeError, Normalizer, RowPolicy, SkippedRow};
use crate::rules::{ExpenseTree, Rule, RuleTable};
use crate::transaction::{NormalizedTransaction, RawTransaction, SubcategoryTotal};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub rules: Vec<Rule>,
    pub transactions: Vec<NormalizedTransaction>,
    pub totals: Vec<SubcategoryTotal>,
    /// Rows dropped under [`RowPolicy::Skip`]; always empty otherwise.
    pub skipped: Vec<SkippedRow>,
}

/// Orchestrates: rule table → normalize → aggregate.
pub struct Pipeline<'a> {
    config: &'a Configuration,
    expenses: &'a ExpenseTree,
    date_formats: Option<Vec<DateFormat>>,
    policy: RowPolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Configuration, expenses: &'a ExpenseTree) -> Self {
        Self {
            config,
            expenses,
            date_formats: None,
            policy: RowPolicy::default(),
        }
    }

    /// Overrides the `DateFormats` from configuration. An empty list selects
    /// lenient parsing.
    pub fn date_formats(mut self, formats: Vec<DateFormat>) -> Self {
        self.date_formats = Some(formats);
        self
    }

    pub fn policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn run(&self, rows: &[RawTransaction]) -> Result<Report, PipelineError> {
        let table = RuleTable::from_expenses(self.expenses);

        let formats: Vec<DateFormat> = match &self.date_formats {
            Some(formats) => formats.clone(),
            None => self
                .config
                .date_formats
                .iter()
                .map(|f| DateFormat::new(f))
                .collect(),
        };

        let normalized = Normalizer::new(self.config, &table, &formats)?
            .with_policy(self.policy)
            .normalize(rows)?;

        let totals = aggregate(&normalized.transactions);

        tracing::info!(
            rules = table.len(),
            transactions = normalized.transactions.len(),
            buckets = totals.len(),
            skipped = normalized.skipped.len(),
            "categorized ledger"
        );

        Ok(Report {
            rules: table.to_rules(),
            transactions: normalized.transactions,
            totals,
            skipped: normalized.skipped,
        })
    }
}

/// One-shot run with the default (abort) row policy. `date_formats` of `None`
/// defers to the configuration.
pub fn run(
    rows: &[RawTransaction],
    config: &Configuration,
    expenses: &ExpenseTree,
    date_formats: Option<&[DateFormat]>,
) -> Result<Report, PipelineError> {
    let mut pipeline = Pipeline::new(config, expenses);
    if let Some(formats) = date_formats {
        pipeline = pipeline.date_formats(formats.to_vec());
    }
    pipeline.run(rows)
}
