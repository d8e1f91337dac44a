use anyhow::Context;
use clap::Parser;
use review_stats::extract::ParseMode;
use review_stats::ingest::{ingest, IngestConfig, MAX_RECORDS, PREVIEW_LEN};
use review_stats::intern::MAX_KEY_LEN;
use review_stats::output::{write_atomically, write_products};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct CliArgs {
    #[arg(short, long, default_value = "test.txt")]
    input: PathBuf,
    /// Number of ratings echoed after the run
    #[arg(short, long, default_value_t = PREVIEW_LEN)]
    preview: usize,
    /// Upper bound on accepted ratings, 0 for no bound
    #[arg(long, default_value_t = MAX_RECORDS)]
    max_records: usize,
    #[arg(long, default_value_t = MAX_KEY_LEN)]
    max_key_len: usize,
    #[arg(short, long, value_enum, default_value_t = ParseMode::Auto)]
    mode: ParseMode,
    /// Also write the asin -> id table as JSON lines
    #[arg(long)]
    products: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();
    let config = IngestConfig {
        max_records: Some(args.max_records).filter(|&limit| limit > 0),
        max_key_len: args.max_key_len,
        mode: args.mode,
    };

    let input = File::open(&args.input)
        .with_context(|| format!("Couldn't open input file `{}`", args.input.display()))?;
    log::info!("Ingesting ratings from {}", args.input.display());
    let ingested = ingest(BufReader::new(input), &config)
        .with_context(|| format!("Error while ingesting `{}`", args.input.display()))?;

    for rating in ingested.ratings.iter().take(args.preview) {
        println!("Rating: {:.6}, ID: {}", rating.rating, rating.product);
    }
    println!(
        "Loaded {} ratings for {} distinct products",
        ingested.ratings.len(),
        ingested.products.len()
    );

    if let Some(path) = &args.products {
        write_atomically(path, |file| write_products(file, &ingested.products))
            .with_context(|| format!("Couldn't write `{}`", path.display()))?;
        log::info!("Wrote product table to {}", path.display());
    }
    Ok(())
}
