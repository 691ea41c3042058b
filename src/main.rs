mod auth;
mod cli;
mod collections;
mod config;
mod environment;
mod error;
mod http;
mod logging;
mod suites;
mod testing;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, OutputFormat};
use config::RunnerConfig;
use http::client::build_client;
use testing::Runner;
use testing::report::{JsonReporter, Reporter, TextReporter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing();

    // Every case is built and validated before the first request goes out.
    let config = RunnerConfig::from_cli(&cli)?;
    let mut cases = suites::build_all(&cli.selected_suites(), &config)?;
    if let Some(path) = &cli.collection {
        let collection = collections::load_collection(path)?;
        cases.extend(collection.into_cases(&config)?);
    }

    info!(
        base_url = %config.base_url,
        cases = cases.len(),
        include_destructive = config.include_destructive,
        "starting smoke run"
    );

    let runner = Runner::new(build_client()?).with_destructive(config.include_destructive);
    let result = runner.run_suite(&cases).await;

    let reporter: Box<dyn Reporter> = match cli.format {
        OutputFormat::Text => Box::new(TextReporter {
            show_body: cli.show_body,
        }),
        OutputFormat::Json => Box::new(JsonReporter),
    };
    reporter.write(&result, &mut io::stdout().lock())?;

    Ok(ExitCode::from(result.exit_code()))
}
