use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;
mod shell;

use config::Config;
use pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "webask")]
#[command(version)]
#[command(about = "Answer questions with live web context (search -> fetch -> extract -> complete)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single query and exit.
    Ask(AskCmd),
    /// Start the interactive search shell.
    Shell(ShellCmd),
}

#[derive(clap::Args, Debug)]
struct AskCmd {
    /// The question to answer.
    #[arg(required = true)]
    query: Vec<String>,
    /// Completion backend. Allowed: gemini, ollama
    #[arg(long, default_value = "gemini")]
    backend: String,
    /// Search backend. Allowed: duckduckgo, google
    #[arg(long, default_value = "duckduckgo")]
    search: String,
    /// Model name (API model id for gemini, local model name for ollama).
    #[arg(long)]
    model: Option<String>,
    /// Number of web results to fetch.
    #[arg(long, default_value_t = 3)]
    results: usize,
    /// Print the assembled context before generating the answer.
    #[arg(long)]
    show_context: bool,
    /// Config file path (default: ./webask.toml, then the user config dir).
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ShellCmd {
    /// Completion backend. Allowed: gemini, ollama
    #[arg(long, default_value = "gemini")]
    backend: String,
    /// Search backend. Allowed: duckduckgo, google
    #[arg(long, default_value = "duckduckgo")]
    search: String,
    /// Default model name for the session.
    #[arg(long)]
    model: Option<String>,
    /// Default number of web results per query.
    #[arg(long, default_value_t = 3)]
    results: usize,
    /// Config file path (default: ./webask.toml, then the user config dir).
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

async fn run_ask(cmd: AskCmd) -> Result<()> {
    let query = cmd.query.join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("please provide a search query");
    }

    let cfg = Config::load(cmd.config.as_deref())?;
    let pipeline = Pipeline::build(&cfg, &cmd.search, &cmd.backend, cmd.model.as_deref())?;

    println!("Searching web using model '{}'...", pipeline.model());
    let context = pipeline.assemble(&query, cmd.results).await;

    if cmd.show_context {
        println!("\nContext gathered from web:");
        println!("{context}");
        println!("\nGenerating response...");
    }

    let answer = pipeline.answer(&query, &context).await;
    println!("\nResponse:");
    println!("{answer}");
    Ok(())
}

async fn run_shell(cmd: ShellCmd) -> Result<()> {
    let cfg = Config::load(cmd.config.as_deref())?;
    let shell = shell::Shell::new(cfg, cmd.search, cmd.backend, cmd.results, cmd.model)?;
    shell.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ask(cmd) => run_ask(cmd).await,
        Commands::Shell(cmd) => run_shell(cmd).await,
    }
}
