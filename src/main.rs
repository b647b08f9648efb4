use anyhow::{Context, Result};
use clap::Parser;
use job_matcher::config::DEFAULT_CONFIG_FILE;
use job_matcher::{
    CorpusStore, Filters, RankOptions, ResolvedQuery, SearchOutcome, Settings, SortBy, build_index,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Rank job postings against a query or a resume.
#[derive(Parser, Debug)]
#[command(name = "job-matcher", version, about)]
struct Cli {
    /// Skills or job title to match
    query: Option<String>,

    /// PDF or DOCX resume to extract skills from (takes precedence over QUERY)
    #[arg(long)]
    resume: Option<PathBuf>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    skill_level: Option<String>,

    /// relevance, date or company
    #[arg(long)]
    sort: Option<String>,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<usize>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Re-scrape the job boards instead of using the snapshot
    #[arg(long)]
    refresh: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

fn print_outcome(outcome: &SearchOutcome) {
    println!("Results for: {}", outcome.label);
    if let Some(message) = &outcome.message {
        println!("{message}");
        return;
    }

    for (rank, result) in outcome.results.iter().enumerate() {
        let job = &result.record;
        match result.similarity {
            Some(score) => println!("{:>2}. [{:.4}] {}", rank + 1, score, job.title),
            None => println!("{:>2}. [title match] {}", rank + 1, job.title),
        }
        println!(
            "    {} | {} | {} | {}",
            job.company, job.location, job.skill_level, job.date_posted
        );
        println!("    {} ({})", job.link, job.source);
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let query = match ResolvedQuery::resolve(cli.query.as_deref(), cli.resume.as_deref()) {
        Ok(query) => query,
        Err(e) if e.is_user_error() => {
            eprintln!("{e}");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    let store = CorpusStore::from_settings(&settings)?;
    let index = build_index(&settings, &store, cli.refresh).await;

    let options = RankOptions {
        top_n: cli.limit.unwrap_or(settings.search.default_limit),
        filters: Filters {
            location: cli.location,
            company: cli.company,
            skill_level: cli.skill_level,
        },
        sort_by: SortBy::parse_lenient(
            cli.sort.as_deref().or(Some(settings.search.default_sort.as_str())),
        ),
        fallback_scope: settings.search.fallback_scope,
    };

    let outcome = index.search(&query, &options)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(ExitCode::SUCCESS)
}
