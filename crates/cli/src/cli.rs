use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spens",
    version,
    about = "Categorize statement debits by merchant and total them per subcategory."
)]
pub struct Cli {
    /// The CSV file containing the statement
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// The CSV file to write categorized transactions to
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// The tokens file (.yml, .yaml or .toml) mapping merchants to categories
    #[arg(short = 't', long = "token")]
    pub token: PathBuf,

    /// Currency symbol for the totals (default: the tokens file's Currency)
    #[arg(short = 'c', long = "currency")]
    pub currency: Option<String>,

    /// Candidate date format, tried in the order given (e.g. 'DD/MM/YYYY')
    #[arg(long = "date-format", value_name = "FORMAT")]
    pub date_formats: Vec<String>,

    /// Drop rows with unparsable amounts or dates instead of failing
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,

    /// Display debugging output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}
