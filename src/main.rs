use std::fs;
use std::path::Path;

use chrono::Local;
use clap::Parser;
use env_logger::Env;

use crate::config::Config;
use crate::vendor::VendorResolver;

mod config;
mod csv_reader;
mod html;
mod recurring;
mod transaction;
mod vendor;

/// Build an interactive checklist of recurring card subscriptions from a
/// bank CSV export, for updating payment methods on an expiring card.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Credit card transaction export (CSV)
    input: String,

    /// Checklist output path (HTML)
    output: String,

    /// TOML file with vendor billing URL overrides
    #[clap(long)]
    vendor_urls: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli: Cli = Cli::parse();

    // Captured once so billing predictions and urgency classes agree
    // within a single run.
    let today = Local::now().date_naive();

    println!("Reading transactions from: {}", cli.input);
    let transactions = csv_reader::read_transactions(Path::new(&cli.input))?;

    let subscriptions = recurring::detect(&transactions, today);
    println!(
        "Found {} recurring subscriptions ({}+ charges)",
        subscriptions.len(),
        recurring::MIN_OCCURRENCES
    );

    let config = match &cli.vendor_urls {
        Some(file) => Config::load_from_file(file)?,
        None => Config::empty(),
    };
    let resolver = VendorResolver::new(&config);

    println!("Generating HTML: {}", cli.output);
    fs::write(&cli.output, html::render(&subscriptions, &resolver, today))?;

    println!("Done! Open {} in your browser", cli.output);
    println!("  - Check off items as you update them");
    println!("  - Progress is saved automatically");

    Ok(())
}
