// Debate arena entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config
// 4. Build the model provider once
// 5. `print`: run one debate to stdout and exit
//    otherwise: spawn the app loop and run the TUI until the user quits

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use debate_arena::app::{self, AppState, DebateEngine};
use debate_arena::{print, tui};
use debate_core::config;
use debate_core::debate::{DebateOrchestrator, Evaluator};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Skeptic vs. advocate debate over a claim, judged by a keyword heuristic.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Run one debate and print it to stdout
    Print {
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Claim to debate (defaults to `[debate] default_claim`)
        claim: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing()?;
    info!("Debate arena starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        backend = config.model.backend.as_str(),
        model = %config.model.name,
        "Config loaded"
    );

    let provider = debate_llm::build_provider(&config);
    let evaluator = Evaluator::from_config(&config.evaluation);
    info!(keywords = ?evaluator.keywords(), "Evidence keywords loaded");

    match args.command {
        Some(Command::Print { json, claim }) => {
            let provider = provider.context("failed to load model provider")?;
            let orchestrator = DebateOrchestrator::from_config(provider, &config);
            let claim = print::resolve_claim(&claim, &config.debate.default_claim);
            let mut stdout = std::io::stdout();
            print::run(&orchestrator, &evaluator, &claim, json, &mut stdout).await?;
        }
        None => run_interactive(provider, evaluator, &config).await?,
    }

    info!("Debate arena shut down cleanly");
    Ok(())
}

async fn run_interactive(
    provider: Result<Arc<dyn debate_core::ModelProvider>, debate_core::LoadError>,
    evaluator: Evaluator,
    config: &config::Config,
) -> anyhow::Result<()> {
    if let Err(e) = &provider {
        error!("Model provider failed to load: {}", e);
    }
    let engine = DebateEngine::from_provider(provider, config);

    let (debate_tx, debate_rx) = mpsc::channel(16);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(64);

    let state = AppState::new(engine, evaluator, debate_tx);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(debate_rx, cmd_rx, ui_tx, state).await {
            error!("Application loop error: {}", e);
        }
    });

    // Blocks until the user quits.
    let tui_result = tui::run(ui_rx, cmd_tx, &config.debate.default_claim).await;
    if let Err(e) = &tui_result {
        error!("TUI error: {}", e);
    }

    // cmd_tx is gone once the TUI returns, so the app loop exits on its own.
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;
    tui_result
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI or
/// to print-mode output).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("debate-arena.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("debate_arena=info,debate_core=info,debate_llm=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
