use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use envconfig::Envconfig;
use tokio::io::AsyncReadExt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use apm_ingest::config::Config;
use apm_ingest::ingest;
use apm_ingest::sinks::PrintProcessor;

async fn shutdown() {
    let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");

    let mut interrupt = signal::unix::signal(signal::unix::SignalKind::interrupt())
        .expect("failed to register SIGINT handler");

    tokio::select! {
        _ = term.recv() => {},
        _ = interrupt.recv() => {},
    };

    tracing::info!("Shutting down, cancelling in-flight batches");
}

async fn read_input(path: &str) -> anyhow::Result<Bytes> {
    let data = if path == "-" {
        let mut data = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut data)
            .await
            .context("failed to read stdin")?;
        data
    } else {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {path}"))?
    };
    Ok(Bytes::from(data))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init_from_env().context("Invalid configuration")?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();
    let log_layer = if config.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_filter(filter)
            .boxed()
    };
    tracing_subscriber::registry().with(log_layer).init();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        shutdown().await;
        on_signal.cancel();
    });

    let input = read_input(&config.input_path).await?;
    ingest(
        input,
        config.input_format,
        Arc::new(PrintProcessor {}),
        config.max_concurrent_batches,
        &cancel,
    )
    .await?;

    tracing::info!("done");
    Ok(())
}
