pub mod config;
pub mod csv;

pub use crate::config::{load_tokens, parse_tokens, DocumentFormat, LoadError};
pub use crate::csv::{read_ledger, write_transactions, CsvError, OUTPUT_HEADER};

pub mod import {
    use spens_core::{NormalizedTransaction, RawTransaction, TokensDocument};
    use std::path::Path;

    pub fn ledger_from_path(path: &Path) -> Result<Vec<RawTransaction>, crate::csv::CsvError> {
        crate::csv::read_ledger_file(path)
    }

    pub fn tokens_from_path(path: &Path) -> Result<TokensDocument, crate::config::LoadError> {
        crate::config::load_tokens(path)
    }

    pub fn export_transactions(
        path: &Path,
        transactions: &[NormalizedTransaction],
    ) -> Result<(), crate::csv::CsvError> {
        crate::csv::write_transactions_file(path, transactions)
    }
}
