use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use genquakeml::apis::eatws::EatwsClient;
use genquakeml::config::Config;
use genquakeml::infra::http_client::ReqwestHttp;
use genquakeml::logging::{self, LOG_LEVELS};
use genquakeml::pipeline::output::{write_atomically, OutputFormat};
use genquakeml::pipeline::run_conversion;

#[derive(Parser)]
#[command(name = "genquakeml")]
#[command(about = "Convert a key = value earthquake description into QuakeML")]
#[command(version)]
struct Cli {
    /// Log level for this program's messages
    #[arg(long, global = true, default_value = "info", value_parser = clap::builder::PossibleValuesParser::new(LOG_LEVELS))]
    log: String,

    /// Configuration file (defaults to ./genquakeml.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one event description file
    Convert {
        /// Input file of key = value lines
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (defaults to <eventid>.xml next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Download details of the first EATWS event in a time window as JSON
    Fetch {
        /// Window start, UTC (YYYY-MM-DDTHH:MM:SS)
        #[arg(long, default_value = "2020-06-24T09:27:00", value_parser = parse_window_instant)]
        start: NaiveDateTime,
        /// Window end, UTC (YYYY-MM-DDTHH:MM:SS)
        #[arg(long, default_value = "2021-06-24T09:27:00", value_parser = parse_window_instant)]
        end: NaiveDateTime,
        /// Where to write the aggregated JSON
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_window_instant(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS: {}", e))
}

async fn fetch(config: &Config, start: NaiveDateTime, end: NaiveDateTime, output: &Path) -> anyhow::Result<()> {
    if start > end {
        anyhow::bail!("window start {} is after its end {}", start, end);
    }

    let http = ReqwestHttp::new(Duration::from_secs(config.eatws.timeout_seconds))?;
    let client = EatwsClient::new(http, &config.eatws);
    let trace_directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    match client.fetch_event_information(&start, &end, &trace_directory).await? {
        Some(information) => {
            let bytes = serde_json::to_vec_pretty(&information)?;
            write_atomically(output, &bytes)?;
            println!("{}", output.display());
        }
        None => {
            info!("No events between {} and {}", start, end);
            println!("No events between {} and {}", start, end);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = logging::init_logging(&cli.log, config.logging.directory.as_deref());

    match cli.command {
        Commands::Convert { input, output, format } => {
            match run_conversion(&input, output.as_deref(), format, &config) {
                Ok(result) => {
                    println!("{}", result.output_file.display());
                }
                Err(e) => {
                    error!("Conversion failed: {}", e);
                    return Err(e).with_context(|| format!("Could not convert {}", input.display()));
                }
            }
        }
        Commands::Fetch { start, end, output } => {
            fetch(&config, start, end, &output).await?;
        }
    }

    Ok(())
}
