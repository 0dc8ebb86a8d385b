//! Portfolio assistant CLI
//!
//! Uploads a holdings CSV to a hosted agent, asks it one or more questions
//! and prints the answers. Charts drawn by the agent are saved locally.
//!
//! # Usage
//!
//! ```bash
//! export PROJECT_CONNECTION_STRING="<HostName>;<SubscriptionId>;<ResourceGroup>;<ProjectName>"
//! export MODEL_DEPLOYMENT_NAME="gpt-4o-mini"
//!
//! cargo run --bin portfolio-agent -- --portfolio portfolio.csv
//! ```

use agent_runtime::{
    ContentDispatcher, DispatchedContent, PollPolicy, RunObserver, RunOutcome, Session,
    SessionConfig,
};
use agent_service::{HttpAgentService, RequiredToolCall, Run};
use agent_stock::{Portfolio, PriceLookupTool, StockConfig};
use agent_tools::FunctionRegistry;
use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_PROMPTS: [&str; 2] = [
    "What is the latest closing price for Microsoft?",
    "Show a pie chart of my investments",
];

#[derive(Parser, Debug)]
#[command(name = "portfolio-agent")]
#[command(about = "Ask a hosted agent about your stock portfolio", long_about = None)]
struct Args {
    /// Holdings CSV (symbol,average_cost,quantity)
    #[arg(long, default_value = "portfolio.csv")]
    portfolio: PathBuf,

    /// Where charts produced by the agent are saved
    #[arg(long, default_value = "portfolio_chart.png")]
    chart_path: PathBuf,

    /// Seconds between run status checks
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Give up on a run after this many seconds (0 waits indefinitely)
    #[arg(long, default_value_t = 600)]
    max_wait: u64,

    /// Question to ask; repeat for several (defaults to a price and a chart question)
    #[arg(long = "prompt")]
    prompts: Vec<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

impl Args {
    fn prompts(&self) -> Vec<String> {
        if self.prompts.is_empty() {
            DEFAULT_PROMPTS.iter().map(ToString::to_string).collect()
        } else {
            self.prompts.clone()
        }
    }

    fn poll_policy(&self) -> anyhow::Result<PollPolicy> {
        let builder = PollPolicy::builder().interval(Duration::from_secs(self.poll_interval));
        let builder = if self.max_wait == 0 {
            builder.unbounded()
        } else {
            builder.max_wait(Duration::from_secs(self.max_wait))
        };
        builder.build().context("Invalid polling options")
    }
}

/// Prints run progress the way the agent service reports it
struct ConsoleObserver;

#[async_trait]
impl RunObserver for ConsoleObserver {
    async fn on_status(&self, run: &Run) {
        println!("Current run status: {}", run.status);
    }

    async fn on_tool_output(&self, call: &RequiredToolCall, output: &str) {
        println!("  {}({}) -> {output}", call.function.name, call.function.arguments);
    }
}

fn print_portfolio(portfolio: &Portfolio) {
    println!("Portfolio: {}", portfolio.path().display());
    for holding in portfolio.holdings() {
        println!(
            "  {:<8} {:>10.2} x {:>8} = {:>12.2}",
            holding.symbol,
            holding.average_cost,
            holding.quantity,
            holding.cost_basis()
        );
    }
    println!("  Total cost basis: {:.2}", portfolio.total_cost_basis());
    println!();
}

fn print_content(items: &[DispatchedContent]) {
    for item in items {
        match item {
            DispatchedContent::Text { role, text } => println!("{role}: {text}"),
            DispatchedContent::Image { role, file_id, path } => {
                println!("{role}: [image {file_id} saved to {}]", path.display());
            }
            DispatchedContent::Other { role, repr } => println!("{role}: {repr}"),
        }
    }
}

async fn ask(
    session: &Session,
    dispatcher: &ContentDispatcher,
    prompt: &str,
) -> anyhow::Result<()> {
    println!("> {prompt}");
    let outcome = session.ask(prompt).await?;

    match outcome {
        RunOutcome::Completed { messages, .. } => {
            let items = dispatcher.dispatch(&messages).await?;
            print_content(&items);
        }
        RunOutcome::Failed {
            run_id,
            status,
            last_error,
            message,
        } => {
            println!("Run {run_id} ended with status {status}");
            if let Some(error) = last_error {
                println!("  Error: {error}");
            }
            if let Some(message) = message {
                println!("  Last message: {message}");
            }
        }
        RunOutcome::TimedOut {
            run_id,
            status,
            waited,
        } => {
            println!(
                "Run {run_id} still {status} after {}s, giving up",
                waited.as_secs()
            );
        }
    }
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    agent_utils::init_tracing();

    let args = Args::parse();
    info!("Starting portfolio-agent");

    agent_utils::load_env_file(args.env_file.as_deref())?;

    // Settings first: nothing remote happens without them
    let service = HttpAgentService::from_env().context("Failed to configure agent service")?;
    let session_config = SessionConfig::builder()
        .with_env()
        .portfolio_path(&args.portfolio)
        .poll_policy(args.poll_policy()?)
        .build()
        .context("Failed to configure session")?;
    let stock_config = StockConfig::builder()
        .with_env()
        .build()
        .context("Failed to configure price lookups")?;

    let portfolio = Portfolio::load(&args.portfolio).context("Failed to load portfolio")?;
    if portfolio.is_empty() {
        warn!(path = %args.portfolio.display(), "Portfolio has no holdings");
    }
    print_portfolio(&portfolio);

    println!("Endpoint: {}", service.config().endpoint);
    println!("Model: {}", session_config.model);
    println!();

    let service = Arc::new(service);
    let registry = Arc::new(
        FunctionRegistry::builder()
            .register(Arc::new(PriceLookupTool::yahoo(&stock_config)))
            .build(),
    );

    let session = Session::start(service.clone(), registry, session_config)
        .await
        .context("Failed to start agent session")?
        .with_observer(Arc::new(ConsoleObserver));
    println!(
        "Created agent {} and thread {}\n",
        session.agent().id,
        session.thread().id
    );

    let dispatcher = ContentDispatcher::new(service, &args.chart_path);

    let mut result = Ok(());
    for prompt in args.prompts() {
        if let Err(e) = ask(&session, &dispatcher, &prompt).await {
            result = Err(e);
            break;
        }
    }

    // Clean up even when a question failed
    let closed = session.close().await.context("Failed to clean up agent session");
    result?;
    closed?;

    println!("Done.");
    Ok(())
}
