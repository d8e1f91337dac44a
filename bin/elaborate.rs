use anyhow::Context;
use clap::Parser;
use review_stats::classify::ELABORATE_MIN_WORDS;
use review_stats::extract::ParseMode;
use review_stats::output::write_atomically;
use review_stats::tally::{scan_reviews, write_reviewers, CounterConfig, MIN_ELABORATE_REVIEWS};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct CliArgs {
    #[arg(short, long, default_value = "Electronics_5.json")]
    input: PathBuf,
    #[arg(short, long, default_value = "elaborate_reviewers.txt")]
    output: PathBuf,
    #[arg(long, default_value_t = ELABORATE_MIN_WORDS)]
    min_words: usize,
    #[arg(long, default_value_t = MIN_ELABORATE_REVIEWS)]
    min_reviews: u32,
    #[arg(short, long, value_enum, default_value_t = ParseMode::Auto)]
    mode: ParseMode,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();
    let config = CounterConfig {
        min_words: args.min_words,
        min_reviews: args.min_reviews,
        mode: args.mode,
    };

    let input = File::open(&args.input)
        .with_context(|| format!("Couldn't open input file `{}`", args.input.display()))?;
    log::info!("Counting elaborate reviews in {}", args.input.display());
    let scan = scan_reviews(BufReader::new(input), &config)
        .with_context(|| format!("Error while reading `{}`", args.input.display()))?;

    let reviewers = scan.tally.qualifying(config.min_reviews);
    write_atomically(&args.output, |file| write_reviewers(file, &reviewers))
        .with_context(|| format!("Couldn't write `{}`", args.output.display()))?;

    println!(
        "Total number of reviewers with {} or more elaborate reviews: {}",
        config.min_reviews,
        reviewers.len()
    );
    println!(
        "Please look into the {} file for the list of elaborate reviewers!",
        args.output.display()
    );
    Ok(())
}
