//! docforge - Document Pipeline Entry Point
//!
//! Runs the extract/generate/review pipeline over a request given on the
//! command line and prints the run result as JSON.

use docforge::store::MarkdownStore;
use docforge::{DocumentPipeline, PipelineConfig, RunState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let request: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if request.trim().is_empty() {
        anyhow::bail!("usage: docforge <request>, e.g. docforge create report.docx about Q3 sales");
    }

    // Load configuration
    let config = PipelineConfig::from_env()?;
    info!(
        "Loaded configuration: pass_threshold={}, max_iterations={}",
        config.pass_threshold, config.max_iterations
    );

    let out_dir = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string());
    let pipeline = DocumentPipeline::new(config).with_store(Box::new(MarkdownStore::new(out_dir)));

    let result = pipeline.run(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.state == RunState::AwaitingClarification {
        info!("Run halted on clarification questions; re-run with more detail or AUTO_CONFIRM=1");
    }

    Ok(())
}
