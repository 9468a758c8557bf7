use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gleaner::{Disposition, Document, DocumentProcessor, TargetConfig, TracingReporter};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "gleaner", about = "Declarative field extraction for fetched web documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a target file and report what it resolves to
    Validate {
        /// Path to the target YAML file
        #[arg(short, long, default_value = "target.yaml")]
        config: PathBuf,
    },
    /// Run the pipeline over pre-fetched documents and write the output
    Run {
        /// Path to the target YAML file
        #[arg(short, long, default_value = "target.yaml")]
        config: PathBuf,
        /// JSON-lines manifest of fetched pages ({url, html, response_time, depth})
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// One fetched page as delivered by the external fetch engine.
#[derive(Debug, Deserialize)]
struct FetchedPage {
    url: String,
    html: String,
    #[serde(default)]
    response_time: f64,
    #[serde(default)]
    depth: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run { config, input } => run(&config, &input),
    }
}

fn validate(config_path: &PathBuf) -> Result<()> {
    let config = TargetConfig::load(config_path, &TracingReporter);
    info!(
        "job `{}`: {} start URLs, {} fields, {} exclusion rules, output `{}`",
        config.job_name,
        config.start_urls.len(),
        config.fields.len(),
        config.exclude_if.len(),
        config.output.file
    );
    for spec in config.fields.values() {
        debug!(
            "field `{}`: selector `{}`, {} ops",
            spec.name,
            spec.selector,
            spec.transformations.len()
        );
    }
    Ok(())
}

fn run(config_path: &PathBuf, input: &PathBuf) -> Result<()> {
    let config = TargetConfig::load(config_path, &TracingReporter);
    let processor = DocumentProcessor::new(config, TracingReporter)?;

    let file = std::fs::File::open(input)
        .with_context(|| format!("opening input manifest {}", input.display()))?;

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.context("reading input manifest")?;
        if line.trim().is_empty() {
            continue;
        }
        let page: FetchedPage = serde_json::from_str(&line)
            .with_context(|| format!("parsing manifest line {}", lineno + 1))?;

        let doc = Document::new(page.url, &page.html, page.response_time, page.depth);
        let disposition = processor.process(&doc);
        if disposition == Disposition::PageLimitReached {
            break;
        }
        if disposition.follow_links() {
            for link in processor.link_policy().eligible_links(&doc) {
                debug!("eligible link: {link}");
            }
        }
    }

    if let Some(path) = processor.finish()? {
        info!("output written to {}", path.display());
    }
    Ok(())
}
