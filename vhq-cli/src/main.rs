use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use vhq_api::api::download::post::OutputFormat;
use vhq_cli::commands::{self, Tickers};
use vhq_cli::transport::{ReqwestTransport, TokioTicker};
use vhq_client::ApiClient;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root URI of the server, overrides the configuration
    #[arg(long, value_parser = vhq_cli::cfg::parse_base_url)]
    base_url: Option<http::Uri>,

    /// Log debug messages
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum Format {
    #[default]
    Video,
    Audio,
}

impl From<Format> for OutputFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Video => Self::Video,
            Format::Audio => Self::Audio,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a video and list its qualities
    Analyze { url: String },
    /// Request the download of a video
    Download {
        url: String,
        /// One of the qualities listed by `analyze`, the first one by default
        #[arg(short, long)]
        quality: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// Fetch the transcript of a video
    Transcript {
        url: String,
        /// Write the transcript to this file, or to a timestamped file in this directory
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Detect the platform of a video and list its enhancement tiers. With a quality, pass the
    /// gate of the tier and wait for the enhanced video.
    Process {
        url: String,
        #[arg(short, long)]
        quality: Option<String>,
    },
    /// Show the status of a processing job
    Status { process_id: String },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = vhq_cli::cfg::get_config(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.client.base_url = base_url;
    }
    init_tracing(args.debug || config.debug);
    tracing::debug!(?config, "Loaded configuration");

    let transport = ReqwestTransport::new(&config.client.base_url, config.client.request_timeout)?;
    let client = ApiClient::new(transport);
    let timing = &config.client.timing;
    let base_url = &config.client.base_url;

    // The client is not Send: everything runs on the current thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Building the tokio runtime")?;

    let mut out = std::io::stdout().lock();
    runtime.block_on(async {
        match args.command {
            Command::Analyze { url } => commands::analyze(&client, &url, &mut out).await,
            Command::Download {
                url,
                quality,
                format,
            } => {
                let quality = quality.as_deref();
                commands::download(&client, base_url, &url, quality, format.into(), &mut out).await
            }
            Command::Transcript { url, export } => {
                commands::transcript(&client, &url, export.as_deref(), &mut out).await
            }
            Command::Process { url, quality } => {
                let mut poll = TokioTicker::new(timing.poll_interval);
                let mut ad = TokioTicker::new(timing.ad_tick);
                let tickers = Tickers {
                    poll: &mut poll,
                    ad: &mut ad,
                };
                let quality = quality.as_deref();
                commands::process(&client, base_url, tickers, &url, quality, &mut out).await
            }
            Command::Status { process_id } => {
                commands::status(&client, base_url, &process_id, &mut out).await
            }
        }
    })
}
