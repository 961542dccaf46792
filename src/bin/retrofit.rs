//! Retrofit CLI
//!
//! Loads word vectors and a lexicon, retrofits in the background while
//! reporting progress, filters well-aligned words and optionally exports
//! the result.

use clap::Parser;
use futures::StreamExt;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use retrofitter::{FilterConfig, FilterOutcome, RetrofitConfig, RetrofitError, Workspace};

/// Retrofit word vectors to a semantic lexicon
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Word-vector file (`word c1 c2 ...` per line)
    #[arg(short, long)]
    vectors: PathBuf,

    /// Lexicon file (`word neighbor1 neighbor2 ...` per line)
    #[arg(short, long)]
    lexicon: PathBuf,

    /// Number of retrofitting iterations
    #[arg(short = 'n', long, default_value_t = 10)]
    iterations: usize,

    /// Weight on each word's original vector
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Weight on each neighbor's vector
    #[arg(long, default_value_t = 1.0)]
    beta: f64,

    /// Minimum original/retrofitted cosine similarity for the filter
    #[arg(short, long, default_value_t = 0.8)]
    threshold: f64,

    /// Number of best-aligned words to print
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Write retrofitted vectors to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print pre/post similarity for every lexicon edge
    #[arg(long, default_value_t = false)]
    compare: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("retrofitter=info".parse()?))
        .init();

    let args = Args::parse();

    let config = RetrofitConfig::new(args.iterations, args.alpha, args.beta);
    let filter_config = FilterConfig::default()
        .with_threshold(args.threshold)
        .with_top_n(args.top);

    let workspace = Workspace::open(&args.vectors, &args.lexicon)?;
    info!(
        words = workspace.original().len(),
        lexicon = workspace.lexicon().len(),
        "Inputs loaded"
    );

    let mut task = workspace.start_retrofit(config)?;

    let token = task.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current iteration");
            token.cancel();
        }
    });

    {
        let mut progress = task.progress_stream();
        while let Some(p) = progress.next().await {
            info!(
                "Retrofitting {:.0}% ({}/{})",
                p.fraction() * 100.0,
                p.iteration,
                p.total
            );
        }
    }

    let run = match task.join().await {
        Ok(run) => run,
        Err(RetrofitError::Cancelled) => {
            warn!("Retrofitting cancelled; nothing written");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", run.report.summary());

    if args.compare {
        if let Some(comparison) = workspace.comparison() {
            for pair in comparison.pairs() {
                if let Some(after) = pair.after {
                    println!(
                        "{} -> {}: pre {:.4}, post {:.4}, difference {:+.4}",
                        pair.word,
                        pair.neighbor,
                        pair.before,
                        after,
                        after - pair.before
                    );
                }
            }
            if let Some(mean) = comparison.mean_difference() {
                println!("Mean similarity change over {} edges: {:+.4}", comparison.len(), mean);
            }
        }
    }

    match workspace.filter(filter_config.threshold).await? {
        FilterOutcome::Matched(matches) => {
            println!(
                "{} of {} words meet threshold {:.2} (average similarity {:.4})",
                matches.len(),
                matches.examined,
                matches.threshold,
                matches.average
            );
            for (word, similarity) in matches.top(filter_config.top_n) {
                println!("  {:<24} {:.4}", word, similarity);
            }
        }
        FilterOutcome::NoMatches { threshold, examined } => {
            println!(
                "No words met the similarity threshold {:.2} ({} compared)",
                threshold, examined
            );
        }
    }

    if let Some(output) = &args.output {
        let written = workspace.export(output)?;
        println!("Wrote {} vectors to {}", written, output.display());
    }

    info!("{}", workspace.metrics().summary());
    Ok(())
}
