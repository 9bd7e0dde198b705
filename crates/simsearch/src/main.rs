use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use simsearch_common::{logger, AppConfig};
use simsearch_embed::create_embedder;
use simsearch_vector::{rank, read_corpus_path, AccuracyHarness, EmbeddingTable, ScoredCorpus};
use std::path::PathBuf;
use std::time::Duration;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "simsearch")]
#[command(about = "SimSearch - embedding similarity search service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Bearer token clients must present
        #[arg(long)]
        auth_token: Option<String>,
    },

    /// Embed an `id,text` CSV into an `id,embedding` table
    Encode {
        /// Input corpus CSV
        input: PathBuf,

        /// Output table CSV
        output: PathBuf,
    },

    /// Rank a local table against a query text
    Query {
        /// Table CSV (`id,embedding`)
        table: PathBuf,

        /// Query text
        text: String,

        /// Maximum number of matches
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Score candidate corpora against a labeled test set
    Accuracy {
        /// Labeled test cases (`id,text`)
        test_cases: PathBuf,

        /// Directory of candidate `id,text` corpora, embedded before scoring
        candidates_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // AppConfig::from_env() also loads .env, but CLI overrides must land on top of it
    load_dotenv_from_project_root();

    if let Some(Commands::Serve { host, port, auth_token }) = &cli.command {
        if let Some(host) = host {
            std::env::set_var("SERVER_HOST", host);
        }
        if let Some(port) = port {
            std::env::set_var("SERVER_PORT", port.to_string());
        }
        if let Some(token) = auth_token {
            std::env::set_var("AUTH_TOKEN", token);
        }
    }

    let config = AppConfig::from_env()?;
    logger::setup_logging(config.log_dir.as_deref(), &config.log_level)?;
    config.validate()?;

    match cli.command {
        Some(Commands::Serve { .. }) | None => serve(config).await,
        Some(Commands::Encode { input, output }) => encode(&config, input, output).await,
        Some(Commands::Query { table, text, limit }) => query(&config, table, &text, limit).await,
        Some(Commands::Accuracy {
            test_cases,
            candidates_dir,
        }) => accuracy(&config, test_cases, candidates_dir).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    tracing::info!("SimSearch starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Tables: {}", config.table_base_url);
    tracing::info!("  Scratch: {}", config.scratch_dir.display());
    tracing::info!("  Embedder: {} ({})", config.embedder_provider, config.embedding_model);

    let embedder = create_embedder(&config)?;

    println!("Server listening on http://{}", config.server_bind_address());

    simsearch_server::start_server(config, embedder).await?;
    Ok(())
}

async fn encode(config: &AppConfig, input: PathBuf, output: PathBuf) -> Result<()> {
    let corpus = read_corpus_path(&input)
        .with_context(|| format!("Failed to read corpus {}", input.display()))?;
    let embedder = create_embedder(config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Embedding {} texts with {}", corpus.len(), embedder.name()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let table = EmbeddingTable::build(&corpus, embedder.as_ref()).await;
    pb.finish_and_clear();
    let table = table?;

    table.save_path(&output)?;
    tracing::info!("Wrote {} records to {}", table.len(), output.display());

    println!("{}", table.content_hash()?);
    Ok(())
}

async fn query(config: &AppConfig, table: PathBuf, text: &str, limit: usize) -> Result<()> {
    let table = EmbeddingTable::load_path(&table)
        .with_context(|| format!("Failed to load table {}", table.display()))?;
    let embedder = create_embedder(config)?;

    let query = embedder.embed(text).await?;
    for m in rank(&query, &table, limit)? {
        println!("{}\t{:.4}", m.id, m.score);
    }
    Ok(())
}

async fn accuracy(config: &AppConfig, test_cases: PathBuf, candidates_dir: PathBuf) -> Result<()> {
    let cases = read_corpus_path(&test_cases)
        .with_context(|| format!("Failed to read test cases {}", test_cases.display()))?;
    let embedder = create_embedder(config)?;

    let test_set = ScoredCorpus::build(&cases, embedder.as_ref()).await?;
    let harness = AccuracyHarness::new(test_set);

    for report in harness.run(&candidates_dir, embedder.as_ref()).await? {
        println!("{}: {}%", report.name, report.accuracy);
    }
    Ok(())
}
