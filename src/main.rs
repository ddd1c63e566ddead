use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use requirement_analyzer::api::{self, ServerOptions};
use requirement_analyzer::config::AnalyzerConfig;
use requirement_analyzer::corpus::DocumentCorpus;
use requirement_analyzer::orchestrator::AnalyzeOrchestrator;
use requirement_analyzer::retrieval::{EvidenceRetriever, IndexedCorpus};

#[derive(Parser)]
#[command(name = "reqan")]
#[command(about = "Evidence-grounded proposal synthesis for free-text requirements")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference corpus JSON file
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analyzer HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the corpus evidence ranked for a query
    Search {
        query: String,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "requirement_analyzer=debug,tower_http=debug".into()),
    );

    // stdout stays clean for `search` output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_index(config: &AnalyzerConfig) -> anyhow::Result<Arc<IndexedCorpus>> {
    let corpus = DocumentCorpus::load(&config.corpus_path)?;
    Ok(Arc::new(IndexedCorpus::build(corpus, config.max_features)))
}

async fn serve(config: AnalyzerConfig) -> anyhow::Result<()> {
    let indexed = load_index(&config)?;
    let orchestrator = AnalyzeOrchestrator::from_config(&config, indexed)?;
    let app = api::create_router(orchestrator, ServerOptions::from(&config));

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Requirement analyzer listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn search(config: &AnalyzerConfig, query: &str, top_k: Option<usize>) -> anyhow::Result<()> {
    let retriever = EvidenceRetriever::new(load_index(config)?)
        .with_top_k(top_k.unwrap_or(config.top_k))
        .with_snippet_chars(config.snippet_chars);

    let hits = retriever.retrieve(query);
    if hits.is_empty() {
        println!("No evidence (corpus is empty or has no vocabulary).");
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("{}. [{}] {} (score {:.4})", rank + 1, hit.id, hit.title, hit.score);
        println!("   {}", hit.snippet.replace('\n', " "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AnalyzerConfig::load(cli.config.as_deref())?;
    if let Some(corpus) = cli.corpus {
        config.corpus_path = corpus;
    }

    match cli.command {
        Some(Commands::Search { query, top_k }) => search(&config, &query, top_k)?,
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}
