//! # ModernRAG Demo CLI (`rag-demo`)
//!
//! ## Usage
//!
//! ```bash
//! rag-demo [--config ./config/rag.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rag-demo serve` | Start the HTTP query handler |
//! | `rag-demo ask "<query>"` | Submit one query and print the rendered result |
//! | `rag-demo samples` | List the sample queries with canned answers |

use anyhow::bail;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use rag_demo::client::{HttpTransport, PageController, TerminalView};
use rag_demo::{config, logging, samples, server};

/// ModernRAG demo: canned RAG answers with a chat-completion fallback.
///
/// The config file is optional; without it built-in defaults are used and
/// only the provider API key (`OPENAI_API_KEY`) needs to be set.
#[derive(Parser)]
#[command(name = "rag-demo", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/rag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Serves `POST /api/rag-query` and `GET /health` on `[server].bind`.
    Serve,

    /// Submit a query the way the demo page does.
    ///
    /// Posts to the endpoint; if that fails, answers from the sample table
    /// or a simulated placeholder instead.
    Ask {
        /// The query text. Surrounding whitespace is trimmed.
        query: String,

        /// Override `[client].endpoint`.
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// List the sample queries.
    Samples,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Samples => {
            for query in samples::sample_queries() {
                println!("{}", query);
            }
        }
        Commands::Serve => {
            let cfg = config::load_config_or_default(&cli.config)?;
            server::run_server(&cfg).await?;
        }
        Commands::Ask { query, endpoint } => {
            let cfg = config::load_config_or_default(&cli.config)?;
            let endpoint = endpoint.unwrap_or(cfg.client.endpoint);
            let transport = HttpTransport::new(endpoint)?;
            let view = TerminalView::new(std::io::stdout());
            let mut controller = PageController::new(transport, view, StdRng::from_os_rng());

            if !controller.on_submit(&query).await {
                bail!("query must not be empty");
            }
            if let Some(message) = controller.view().error() {
                bail!("{}", message);
            }
        }
    }

    Ok(())
}
