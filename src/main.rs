use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tweet_stats::{init_tracing_once, TweetStats, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};

/// Count posts, authors and languages in a JSONL tweet dump and split post ids by month.
#[derive(Parser, Debug)]
#[command(name = "tweet-stats", version, about)]
struct Cli {
    /// Dump to read: .jsonl, .jsonl.zst, or a directory of dumps.
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory for general_stats.txt, tweets_by_language.txt and monthly_tweet_ids/.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Hide progress bars.
    #[arg(long)]
    no_progress: bool,

    /// BufReader capacity in bytes.
    #[arg(long, default_value_t = 256 * 1024)]
    read_buffer: usize,

    /// BufWriter capacity in bytes.
    #[arg(long, default_value_t = 64 * 1024)]
    write_buffer: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_once();

    let job = TweetStats::new()
        .input(&cli.input)
        .output_dir(&cli.output)
        .progress(!cli.no_progress)
        .io_buffers(cli.read_buffer, cli.write_buffer);

    println!("Processing JSONL file...");
    let stats = job.aggregate()?;

    println!("Writing monthly files...");
    let months = job.write_monthly(&stats)?;

    println!("Writing statistics...");
    job.write_statistics(&stats)?;

    println!(
        "Processing complete! {} tweets, {} months, {} lines skipped",
        stats.total(),
        months.len(),
        stats.skipped().total() - stats.skipped().blank
    );
    Ok(())
}
