use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use reel_extractor::client::{self, ExtractionClient};
use reel_extractor::config::Settings;
use reel_extractor::server;
use reel_extractor::transport::HttpTransport;
use reel_extractor::ui::{Session, TerminalSurface};

#[derive(Parser)]
#[command(name = "reel-extractor", version, about = "Resolve an Instagram reel URL to a direct video URL")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the extraction backend for the reel's direct video URL
    Extract {
        url: String,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Try public oEmbed endpoints and show the first raw answer
    Probe {
        url: String,
        /// Characters of the answer to show before truncating
        #[arg(long)]
        budget: Option<usize>,
        /// Extra proxy prefix tried before the defaults (repeatable)
        #[arg(long = "proxy")]
        proxies: Vec<String>,
    },
    /// POST the input untouched and dump the backend's status and JSON
    Check {
        url: String,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Serve the app shell from a directory through the asset cache
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
        #[arg(long, default_value = "frontend")]
        root: PathBuf,
    },
}

#[derive(Args)]
struct BackendArgs {
    /// Backend address, used unless one was baked in at build time
    #[arg(long)]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("reel-extractor error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Extract { url, backend } => {
            let settings = Settings::load(backend.backend.as_deref(), None, &[])?;
            let extractor = ExtractionClient::new(
                HttpTransport::new(settings.insecure_tls)?,
                settings.backend_url,
            );
            tracing::info!(backend = %extractor.backend(), "using backend");
            let mut session = Session::new(TerminalSurface::stdio());
            let outcome = client::run_extract(&extractor, &mut session, &url).await;
            Ok(exit_code(outcome.is_ok()))
        }
        Command::Probe {
            url,
            budget,
            proxies,
        } => {
            let settings = Settings::load(None, budget, &proxies)?;
            let transport = HttpTransport::new(settings.insecure_tls)?;
            let mut session = Session::new(TerminalSurface::stdio());
            let hit = client::run_probe(
                &transport,
                &settings.probe_endpoints,
                settings.display_budget,
                &mut session,
                &url,
            )
            .await;
            Ok(exit_code(matches!(hit, Ok(Some(_)))))
        }
        Command::Check { url, backend } => {
            let settings = Settings::load(backend.backend.as_deref(), None, &[])?;
            let extractor = ExtractionClient::new(
                HttpTransport::new(settings.insecure_tls)?,
                settings.backend_url,
            );
            let report = extractor.check(&url).await?;
            println!("status = {}", report.status);
            match report.json {
                Some(json) => println!("json = {}", serde_json::to_string_pretty(&json)?),
                None => println!("json = null"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { addr, root } => {
            server::serve(addr, root).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
