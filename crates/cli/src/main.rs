mod cli;
mod summary;

use anyhow::{Context, Result};
use clap::Parser;
use spens_core::{DateFormat, Pipeline, RowPolicy};
use spens_import::import;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `--debug` turns on debug output for everything.
fn init_tracing(debug: bool) {
    let default = if debug {
        "debug"
    } else {
        "spens=info,spens_core=info,spens_import=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let ledger = import::ledger_from_path(&cli.file)
        .with_context(|| format!("reading ledger {}", cli.file.display()))?;
    let tokens = import::tokens_from_path(&cli.token)
        .with_context(|| format!("reading tokens {}", cli.token.display()))?;

    let policy = if cli.skip_invalid {
        RowPolicy::Skip
    } else {
        RowPolicy::Abort
    };
    let mut pipeline = Pipeline::new(&tokens.configuration, &tokens.expenses).policy(policy);
    if !cli.date_formats.is_empty() {
        pipeline = pipeline.date_formats(cli.date_formats.iter().map(|f| DateFormat::new(f)).collect());
    }

    let report = pipeline.run(&ledger).context("categorizing transactions")?;

    import::export_transactions(&cli.output, &report.transactions)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    tracing::info!(
        "Wrote {} transactions to {}",
        report.transactions.len(),
        cli.output.display()
    );
    if !report.skipped.is_empty() {
        tracing::warn!("{} malformed rows were skipped", report.skipped.len());
    }

    let currency = cli
        .currency
        .as_deref()
        .unwrap_or(&tokens.configuration.currency);
    print!("{}", summary::render_totals(&report.totals, currency));
    Ok(())
}
