//! Caption burn-in worker binary.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vcap_caption::{CaptionConfig, CaptionGenerator};
use vcap_media::OverlayScript;
use vcap_queue::{JobQueue, QueueConfig};
use vcap_storage::StorageConfig;
use vcap_worker::{JobPipeline, QueueConsumer, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();

    init_tracing()?;

    info!("Starting vcap-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Some(port) = config.metrics_port {
        vcap_worker::metrics::install_exporter(port)?;
        info!("Serving metrics on port {}", port);
    }

    let queue_config = QueueConfig::from_env();
    info!(
        "Queue {} at {} (pop timeout {}s)",
        queue_config.queue_name,
        queue_config.redis_url,
        queue_config.pop_timeout.as_secs()
    );
    let queue = JobQueue::new(queue_config.clone()).context("Failed to create job queue")?;

    let storage_config = StorageConfig::from_env().context("Invalid storage configuration")?;
    let store = vcap_storage::connect(storage_config);

    let caption_config = CaptionConfig::from_env();
    info!("Caption config: {:?}", caption_config);
    let captioner =
        CaptionGenerator::from_config(&caption_config).context("Failed to create caption generator")?;

    if !config.ffmpeg_script.exists() {
        warn!(
            "Overlay script {} does not exist; every job will fail at transcode",
            config.ffmpeg_script.display()
        );
    }
    let transcoder = OverlayScript::new(&config.ffmpeg_script);

    let pipeline = JobPipeline::new(store, Arc::new(captioner), Arc::new(transcoder), &config);
    let consumer = Arc::new(QueueConsumer::new(Arc::new(queue), pipeline, &queue_config));

    let signal_consumer = Arc::clone(&consumer);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, finishing current pop and job");
            signal_consumer.shutdown();
        }
    });

    consumer.run().await;

    info!("Worker shutdown complete");
    Ok(())
}

/// Colored output for dev, JSON for production.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("vcap=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}
