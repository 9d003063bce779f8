pub mod aggregate;
pub mod config;
pub mod date;
pub mod money;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod text;
pub mod transaction;

pub use aggregate::{aggregate, grand_total};
pub use config::{ConfigError, Configuration, FieldBindings, TokensDocument};
pub use date::{DateFormat, DateParseError};
pub use money::Money;
pub use normalize::{NormalizeError, Normalized, Normalizer, RowPolicy, SkippedRow};
pub use pipeline::{run, Pipeline, PipelineError, Report};
pub use rules::{ExpenseCategory, ExpenseSubcategory, ExpenseTree, Rule, RuleTable};
pub use transaction::{NormalizedTransaction, RawTransaction, SubcategoryTotal, UNCLASSIFIED};
