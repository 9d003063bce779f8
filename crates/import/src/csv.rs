use spens_core::{NormalizedTransaction, RawTransaction};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Header of the categorized output file.
pub const OUTPUT_HEADER: [&str; 4] = ["category", "subcategory", "amount", "date"];

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads a ledger with a header row into string maps keyed by column name.
///
/// Header names and values are trimmed. Short rows are accepted and simply
/// lack the trailing columns.
pub fn read_ledger<R: Read>(data: R) -> Result<Vec<RawTransaction>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let row: RawTransaction = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "read ledger");
    Ok(rows)
}

pub fn read_ledger_file(path: &Path) -> Result<Vec<RawTransaction>, CsvError> {
    read_ledger(File::open(path)?)
}

/// Writes transactions in list order under [`OUTPUT_HEADER`].
pub fn write_transactions<W: Write>(
    out: W,
    transactions: &[NormalizedTransaction],
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(OUTPUT_HEADER)?;
    for tx in transactions {
        writer.write_record([
            tx.category.as_str(),
            tx.subcategory.as_str(),
            tx.amount.to_string().as_str(),
            tx.date_iso().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_transactions_file(
    path: &Path,
    transactions: &[NormalizedTransaction],
) -> Result<(), CsvError> {
    write_transactions(File::create(path)?, transactions)
}
