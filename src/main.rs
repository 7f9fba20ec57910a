//! Stepwise CLI - runs one query through the step protocol
//!
//! Usage: `stepwise <query...>`. Steps are logged to stderr as they are
//! emitted; the final result is printed to stdout.

use std::sync::Arc;
use stepwise::llm::{LlmConfig, LoggingService, OpenAIService};
use stepwise::system_prompt::build_system_prompt;
use stepwise::{FnObserver, Session, Step, ToolRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepwise=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("usage: stepwise <query>");
        std::process::exit(2);
    }

    // Configuration
    let config = LlmConfig::from_env();
    if !config.has_api_key() {
        tracing::warn!("No API key configured. Set STEPWISE_API_KEY or OPENAI_API_KEY.");
    }

    let tools = ToolRegistry::standard().with_timeout(config.tool_timeout);
    let system_prompt = build_system_prompt(&tools);

    let transport = OpenAIService::new(
        config.api_key.clone().unwrap_or_default(),
        config.base_url.as_deref(),
    )?;
    let llm = LoggingService::new(Arc::new(transport));

    let mut session = Session::new(config.session_config(), system_prompt, llm, tools);
    tracing::info!(
        model = %config.generation.model,
        tools = ?session.tools().names(),
        "Session ready"
    );

    let printer = FnObserver(|step: &Step| {
        eprintln!("[{}] {}", step.kind(), step.content());
    });
    let outcome = session.run_with_observer(&query, &printer).await;

    println!("{}", outcome.result);
    if outcome.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
