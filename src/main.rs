//! Command-line entry point.
//!
//! ```bash
//! GOOGLE_API_KEY=... company-extractor --input essay.txt
//! RUST_LOG=debug OPENAI_API_KEY=sk-... company-extractor --provider openai --agent < essay.txt
//! ```

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use company_extractor::pipeline::{process_essay, process_with_agent, split_paragraphs};
use company_extractor::{CompanyTable, ExtractorConfig, LlmExtractor, Provider};

const DEMO_ESSAY: &str = "
Google LLC was founded on September 4, 1998, by Larry Page and Sergey Brin while they were Ph.D. students at Stanford University. It evolved from a research project into a global leader in search technology.
Microsoft was established in 1975 by Bill Gates and Paul Allen. The company played a pivotal role in the personal computing revolution with its development of the MS-DOS operating system.
Amazon, founded by Jeff Bezos in July 1994, began as an online bookstore and has since expanded into a vast e-commerce and cloud computing empire.
";

#[derive(Debug, Parser)]
#[command(name = "company-extractor", version, about = "Extract company founding details into a numbered CSV table")]
struct Cli {
    /// Essay to process, one paragraph per line; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Also save every paragraph through the CSV_Writer agent
    #[arg(long)]
    agent: bool,

    /// Skip the direct write path
    #[arg(long)]
    no_direct: bool,

    /// Primary table [env: EXTRACTOR_OUTPUT, default: company_info.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Agent table [env: EXTRACTOR_AGENT_OUTPUT, default: company_info_agent.csv]
    #[arg(long)]
    agent_output: Option<PathBuf>,

    /// openai, anthropic or gemini [env: EXTRACTOR_PROVIDER]
    #[arg(long)]
    provider: Option<Provider>,

    /// Model name [env: EXTRACTOR_MODEL]
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ExtractorConfig::from_env().context("loading configuration")?;
    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(agent_output) = cli.agent_output {
        config.agent_output = agent_output;
    }

    let essay = read_essay(cli.input.as_ref())?;
    let llm = config.build_llm()?;
    let agent_config = config.agent_config();
    let extractor = LlmExtractor::new(llm.clone(), agent_config.clone());

    if !cli.no_direct {
        let table = CompanyTable::new(&config.output);
        let outcomes = process_essay(&extractor, &essay, &table).await;
        let saved = outcomes.iter().filter(|o| o.result.is_ok()).count();

        for outcome in &outcomes {
            match &outcome.result {
                Ok(row) => println!(
                    "[{}] S.No. {}: {} | {} | {}",
                    outcome.index, row.serial_number, row.name, row.founding_date, row.founders
                ),
                Err(e) => println!("[{}] skipped: {}", outcome.index, e),
            }
        }
        println!("CSV file '{}' updated: {}/{} rows saved", table.path().display(), saved, outcomes.len());
    }

    if cli.agent {
        let table = CompanyTable::new(&config.agent_output);
        for (i, paragraph) in split_paragraphs(&essay).into_iter().enumerate() {
            match process_with_agent(&extractor, llm.clone(), &agent_config, paragraph, &table).await {
                Ok(outcome) => match outcome.row {
                    Some(row) => println!("[agent {}] S.No. {}: {} | {}", i + 1, row.serial_number, row.name, outcome.answer.trim()),
                    None => println!("[agent {}] nothing saved: {}", i + 1, outcome.answer.trim()),
                },
                Err(e) => {
                    tracing::error!(paragraph = i + 1, error = %e, "agent run failed");
                    println!("[agent {}] failed: {}", i + 1, e);
                }
            }
        }
    }

    Ok(())
}

fn read_essay(input: Option<&PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = input {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        tracing::info!("no input given, using the built-in demo essay");
        return Ok(DEMO_ESSAY.to_string());
    }

    let mut essay = String::new();
    stdin.lock().read_to_string(&mut essay).context("reading stdin")?;
    if essay.trim().is_empty() {
        tracing::info!("stdin was empty, using the built-in demo essay");
        return Ok(DEMO_ESSAY.to_string());
    }
    Ok(essay)
}
