use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use matcher::ingest::load_path;
use matcher::{search, Corpus, MatchError, RankedResult};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index resumes and match them against job descriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the resumes, then read job descriptions from stdin until `quit`
    Match {
        /// Resume file or directory (.txt, .json, .jsonl)
        #[arg(long, default_value = "./resumes")]
        resumes: String,
        /// Number of results to print per query
        #[arg(long, default_value_t = 3)]
        top: usize,
    },
    /// Run a single search, optionally refined with one relevant resume
    Query {
        #[arg(long, default_value = "./resumes")]
        resumes: String,
        /// Job description text
        #[arg(long)]
        text: String,
        /// Id of the resume marked as relevant
        #[arg(long)]
        feedback: Option<String>,
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Print the full outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Index the resumes and print corpus statistics
    Stats {
        #[arg(long, default_value = "./resumes")]
        resumes: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Match { resumes, top } => run_match(&resumes, top),
        Commands::Query { resumes, text, feedback, top, json } => run_query(&resumes, &text, feedback.as_deref(), top, json),
        Commands::Stats { resumes } => run_stats(&resumes),
    }
}

fn index(resumes: &str) -> Result<Corpus> {
    let ingested = load_path(Path::new(resumes)).with_context(|| format!("reading resumes from {resumes}"))?;
    let corpus = Corpus::build(ingested.documents);
    if !corpus.is_indexed() {
        tracing::warn!(resumes, "no resumes found, search will not work");
    }
    Ok(corpus)
}

fn run_match(resumes: &str, top: usize) -> Result<()> {
    let corpus = index(resumes)?;
    if !corpus.is_indexed() {
        println!("No resumes found in '{resumes}'. Please add sample resumes.");
        return Ok(());
    }
    println!("Indexed {} resumes.", corpus.len());
    println!("\n--- Resume Matcher Activated ---");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nPaste a job description (or type 'quit' to exit):\n> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        let outcome = search(&corpus, &line, None)?;
        println!("\n--- Top Matching Resumes ---");
        print_ranking(&outcome.initial, top);
        println!("----------------------------------------");
    }
    Ok(())
}

fn run_query(resumes: &str, text: &str, feedback: Option<&str>, top: usize, json: bool) -> Result<()> {
    let corpus = index(resumes)?;
    let outcome = match search(&corpus, text, feedback) {
        Ok(outcome) => outcome,
        Err(MatchError::EmptyCorpus) => {
            println!("Search unavailable: no resumes indexed.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    println!("--- Initial Results ---");
    print_ranking(&outcome.initial, top);
    if let (Some(refined), Some(id)) = (&outcome.refined, &outcome.feedback) {
        println!("\n--- Refined Results (feedback: {id}) ---");
        print_ranking(refined, top);
    } else if let Some(id) = feedback {
        tracing::info!(id, "feedback resume not indexed, showing initial results only");
    }
    Ok(())
}

fn run_stats(resumes: &str) -> Result<()> {
    let ingested = load_path(Path::new(resumes))?;
    let rejected = ingested.rejected;
    let corpus = Corpus::build(ingested.documents);
    println!("documents:  {}", corpus.len());
    println!("vocabulary: {}", corpus.vocabulary_size());
    println!("skipped:    {}", corpus.skipped().len() + rejected.len());
    for err in rejected.iter().chain(corpus.skipped()) {
        println!("  {err}");
    }
    Ok(())
}

fn print_ranking(results: &[RankedResult], top: usize) {
    for (i, r) in results.iter().take(top).enumerate() {
        println!("Rank {}: {} (Score: {:.4})", i + 1, r.document_id, r.score);
    }
}
