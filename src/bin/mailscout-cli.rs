#[path = "mailscout-cli/args.rs"]
mod args;
#[path = "mailscout-cli/input.rs"]
mod input;
#[path = "mailscout-cli/logging.rs"]
mod logging;
#[path = "mailscout-cli/output.rs"]
mod output;

use std::pin::pin;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use mailscout::{BulkResult, NameInput, Scout};

use crate::args::{Cli, Commands};
use crate::output::Sink;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("erreur: {err:#}");
            ExitCode::from(1)
        }
    }
}

// codes de sortie : 0 tout trouvé, 2 au moins un domaine sans résultat, 1 fatal
async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.scout.to_config()?;
    let sink = Sink::new(&cli.format, cli.out.as_deref())?;
    let scout = Scout::system(config);
    let mut rows = Vec::new();

    match cli.cmd {
        Commands::Probe { email } => {
            let result = scout.probe_address(&email).await;
            let row = BulkResult {
                domain: result.domain.clone(),
                names: NameInput::default(),
                result,
            };
            sink.progress(&row)?;
            rows.push(row);
        }
        Commands::Find { domain, names } => {
            let names = args::names_input(&names);
            let result = scout.search_domain(&domain, &names).await;
            let row = BulkResult {
                domain,
                names,
                result,
            };
            sink.progress(&row)?;
            rows.push(row);
        }
        Commands::Bulk { input } => {
            let requests = input::read_requests(input.as_deref())?;
            tracing::info!(requests = requests.len(), "bulk search started");
            let mut results = pin!(scout.search_bulk_stream(requests));
            while let Some(row) = results.next().await {
                sink.progress(&row)?;
                rows.push(row);
            }
        }
    }

    sink.finish(&rows)?;
    if output::all_found(&rows) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
