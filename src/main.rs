mod cli;
mod convert;
mod error;
mod github;
mod pacing;
mod tasklist;
mod url;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use convert::{ConversionReport, Converter};
use github::GitHubClient;
use pacing::FixedDelay;
use tracing_subscriber::EnvFilter;

use error::{Error, Result};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(report) => {
            for reference in &report.references {
                println!(
                    "Created a reference issue for: {}, reference issue: {}",
                    reference.original, reference.reference
                );
            }
            for issue_url in &report.linked {
                println!("Linked issue as sub-issue: {issue_url}");
            }
            for failure in &report.failures {
                eprintln!("[ERROR]: {failure}");
            }
            if let Some(e) = &report.update_error {
                eprintln!("[ERROR]: {e}");
            }
            println!("{}", report.summary(&cli.issue_url));

            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("[ERROR]: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ConversionReport> {
    let reference_repo = cli
        .ref_repo
        .as_deref()
        .map(url::split_github_repo_url)
        .transpose()
        .context("Invalid --refrepo value")?;

    let mut converter = Converter::new(
        GitHubClient::new(cli.token.as_str()),
        cli.issue_url.as_str(),
        reference_repo,
        FixedDelay::default(),
    );

    converter
        .create_sub_issues()
        .await
        .with_context(|| format!("Unable to convert tasklist on {}", cli.issue_url))
}
