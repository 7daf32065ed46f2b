use std::path::PathBuf;
use std::process::ExitCode;

use airq::{AirqConfig, QueryState, live_pipeline, logging, web};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airq", version, about = "Current air quality for any city")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the current air quality for a city
    Search {
        /// City name, passed to the geocoder as-is
        city: String,
    },
    /// Serve the lookup over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = AirqConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Search { city } => {
            let pipeline = live_pipeline(&config)?;
            let mut state = QueryState::new();
            pipeline.search(&mut state, &city).await;

            if let Some(report) = state.report() {
                print!("{report}");
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!(
                    "Error: {}",
                    state.last_error().unwrap_or("Search did not complete")
                );
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Serve { port } => {
            let pipeline = live_pipeline(&config)?;
            web::run(pipeline, port.unwrap_or(config.server.port)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
