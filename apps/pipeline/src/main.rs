mod config;
mod errors;
mod etl;
mod llm;
mod models;
mod pipeline;
mod timeline;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{PipelineConfig, ServiceConfig};
use crate::llm::enrichment::LlmEnricher;
use crate::llm::extraction::LlmExtractor;
use crate::llm::{LlmClient, RetryPolicy};
use crate::models::TwinResult;
use crate::pipeline::PipelineRunner;

/// Fallback when `RUST_LOG` is unset. Tracing targets carry the module
/// path, so the directive needs the underscored crate name, not the
/// hyphenated package name.
const DEFAULT_LOG_FILTER: &str = concat!(env!("CARGO_CRATE_NAME"), "=info");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (input_path, write_artifacts) = parse_args()?;
    let raw = read_input(input_path.as_deref())?;

    let services = ServiceConfig::from_env()?;
    let config = PipelineConfig::from_env()?;
    info!(
        "Starting cv-pipeline v{} (ceiling {} chars)",
        env!("CARGO_PKG_VERSION"),
        config.max_input_chars
    );

    let retry = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        base_backoff: Duration::from_millis(config.retry_base_backoff_ms),
    };
    let client = LlmClient::new(services.base_url.clone(), services.api_key.clone());
    let extractor = LlmExtractor::new(client.clone(), services.extraction_model, retry.clone());
    let enricher = LlmEnricher::new(client, services.enrichment_model, retry);

    let runner = PipelineRunner::new(&config, &extractor, &enricher);
    let twin = match runner.run(&raw).await {
        Ok(twin) => twin,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(if e.is_rejection() { 2 } else { 1 });
        }
    };

    println!("{}", serde_json::to_string_pretty(&twin)?);

    if write_artifacts {
        if let Some(path) = &input_path {
            write_twin_artifacts(path, &twin)?;
        }
    }
    Ok(())
}

/// `cv-pipeline [FILE] [--write]`. With no FILE the text comes from stdin;
/// `--write` persists the twin as two artifacts beside FILE.
fn parse_args() -> Result<(Option<PathBuf>, bool)> {
    let mut path = None;
    let mut write_artifacts = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--write" => write_artifacts = true,
            "--help" | "-h" => {
                println!("Usage: cv-pipeline [FILE] [--write]");
                std::process::exit(0);
            }
            other if path.is_none() => path = Some(PathBuf::from(other)),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }
    if write_artifacts && path.is_none() {
        anyhow::bail!("--write requires a FILE argument");
    }
    Ok((path, write_artifacts))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Persists the twin as two artifacts sharing the run id: the factual
/// record and the advisory record (when present).
fn write_twin_artifacts(input: &Path, twin: &TwinResult) -> Result<()> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| twin.id.to_string());
    let dir = input.parent().unwrap_or_else(|| Path::new("."));

    let cv_path = dir.join(format!("{stem}.cv.json"));
    std::fs::write(&cv_path, serde_json::to_string_pretty(&twin.source)?)
        .with_context(|| format!("failed to write {}", cv_path.display()))?;
    info!("wrote {}", cv_path.display());

    if let Some(enrichment) = &twin.enrichment {
        let insights_path = dir.join(format!("{stem}.insights.json"));
        std::fs::write(&insights_path, serde_json::to_string_pretty(enrichment)?)
            .with_context(|| format!("failed to write {}", insights_path.display()))?;
        info!("wrote {}", insights_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_matches_crate_module_path() {
        let crate_root = module_path!().split("::").next().unwrap();
        assert_eq!(DEFAULT_LOG_FILTER, format!("{crate_root}=info"));
        assert!(!DEFAULT_LOG_FILTER.contains('-'));
    }
}
