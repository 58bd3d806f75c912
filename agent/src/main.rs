//! Replay driver for the Pioneer instrumentation pipeline.
//!
//! Fetches the collector's version and configuration, resolves exporters,
//! then replays a scripted notebook session through the full binding and
//! publishing path. Useful for exercising a collector deployment end to end
//! without a notebook host.
//!
//! Configuration via environment:
//! - PIONEER_COLLECTOR_URL: Base URL of the collector (default: http://localhost:8890)

mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pioneer_core::resolve_exporters;
use pioneer_router::{BindingController, EventPublisher, HttpTransport};
use pioneer_session::{Cell, NotebookDocument, SessionTracker};
use script::ScriptStep;

/// Replay a scripted notebook session against a collector.
#[derive(Parser)]
#[command(name = "pioneer-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Collector base URL
    #[arg(
        long,
        env = "PIONEER_COLLECTOR_URL",
        default_value = "http://localhost:8890"
    )]
    collector_url: String,

    /// JSONL activity script to replay
    #[arg(long)]
    script: PathBuf,

    /// Notebook path reported in every envelope
    #[arg(long, default_value = "replay.ipynb")]
    notebook_path: String,

    /// Delay between script steps, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PIONEER_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let steps = script::load_script(&cli.script)?;
    tracing::info!(steps = steps.len(), script = %cli.script.display(), "script loaded");

    // Startup configuration fetch. Failure here is fatal: the engine never
    // runs with a partial configuration.
    let transport = HttpTransport::new(cli.collector_url.clone());
    let version = transport
        .fetch_version()
        .await
        .context("collector version fetch failed; aborting activation")?;
    tracing::info!(collector = %cli.collector_url, %version, "collector reachable");

    let config = transport
        .fetch_config()
        .await
        .context("collector config fetch failed; aborting activation")?;
    let exporters = resolve_exporters(config.active_events.as_deref(), config.exporters);
    tracing::info!(exporters = exporters.len(), "configuration resolved");
    for exporter in &exporters {
        let kinds: Vec<&str> = exporter
            .active_events
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        tracing::info!(exporter = %exporter.label(), active_events = ?kinds, "exporter");
    }

    let publisher = Arc::new(EventPublisher::new(Arc::new(transport)));
    let controller = BindingController::new(exporters, publisher);
    let (tracker, arrivals) = SessionTracker::channel();
    let engine = tokio::spawn(controller.run(arrivals));

    // Open the replay session and let the controller bind it.
    let document = NotebookDocument::new(vec![
        Cell::markdown("m1", "# Replay session"),
        Cell::code("c1", "print('hello')"),
    ]);
    let session = tracker.open(&cli.notebook_path, document);
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(cli.delay_ms)).await;

    for step in steps {
        match step {
            ScriptStep::Emit { activity } => {
                let delivered = session.emit(activity.clone());
                tracing::debug!(kind = %activity.kind(), listeners = delivered, "activity emitted");
            }
            ScriptStep::EditCell { index, source } => {
                session
                    .update_document(|document| document.set_cell_source(index, source))
                    .await;
            }
            ScriptStep::Scroll { position } => {
                session.set_scroll_position(position).await;
            }
            ScriptStep::Pause { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
        tokio::time::sleep(Duration::from_millis(cli.delay_ms)).await;
    }

    // Let in-flight exports drain, then tear the session down.
    tokio::time::sleep(Duration::from_millis(cli.delay_ms.max(200))).await;
    session.close();
    drop(tracker);
    engine.await?;

    tracing::info!("replay complete");
    Ok(())
}

/// Initialize the tracing subscriber.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
