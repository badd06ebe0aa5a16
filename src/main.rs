use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use screenpilot::agent::history::StepHistory;
use screenpilot::agent::runner::Runner;
use screenpilot::agent::state::RunOutcome;
use screenpilot::config;
use screenpilot::executor::input::Cliclick;
use screenpilot::llm::brain::BrainModel;
use screenpilot::llm::client::ChatClient;
use screenpilot::llm::locator::GuiLocator;
use screenpilot::perception::screenshot::FocusCapture;

/// Two-model GUI automation: a vision brain decides the next step, a locator
/// model resolves targets to coordinates, cliclick executes.
#[derive(Debug, Parser)]
#[command(name = "screenpilot", version)]
struct Cli {
    /// Natural-language task goal, e.g. "open the weather page and search"
    goal: String,

    /// Step budget for the run
    #[arg(default_value_t = 20)]
    max_steps: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };
    let api_key = config::resolve_api_key(&cfg);
    if api_key.is_empty() {
        tracing::warn!("no API key configured (SCREENPILOT_API_KEY), model calls will fail");
    }

    let client = Arc::new(ChatClient::new(cfg.models.api_base.clone(), api_key));
    let brain = BrainModel::new(client.clone(), cfg.models.brain_model.clone());
    let locator = GuiLocator::new(client, cfg.models.locator_model.clone());
    let screen = FocusCapture::new(cfg.capture.clone(), &cfg.timing);
    let input = Cliclick::new(&cfg.timing);

    let mut runner = Runner::new(
        cli.goal,
        cli.max_steps,
        cfg.timing,
        StepHistory::new(),
        Box::new(screen),
        Box::new(brain),
        Box::new(locator),
        Box::new(input),
    );

    match runner.run().await {
        Ok(result) => match result.outcome {
            RunOutcome::Succeeded => ExitCode::SUCCESS,
            RunOutcome::Failed | RunOutcome::BudgetExhausted => ExitCode::FAILURE,
        },
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}
