//! Task generation: turns a project description and a work/life ratio into a
//! list of plain-text tasks, either through a remote completion endpoint or
//! from offline templates.

pub mod completion;
pub mod offline;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

pub use completion::CompletionClient;
pub use offline::TemplateGenerator;

/// The only error a generator hands back. The underlying cause is logged at
/// the service boundary and deliberately not carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("failed to generate tasks")]
    Failed,
}

/// Produces tasks for a project. One call is one attempt; implementations do
/// not retry.
#[async_trait]
pub trait TaskGenerator: Send + Sync {
    async fn generate(&self, project: &str, ratio: f64) -> Result<Vec<String>, GenerationError>;
}

/// Clamps a work ratio into `[0, 1]`. NaN is treated as an even split.
pub fn normalize_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.5
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Splits a raw response into trimmed, non-empty lines, keeping their order.
pub fn parse_task_lines(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Picks the generator variant for this run.
pub fn create_generator(config: &Config, offline: bool) -> anyhow::Result<Arc<dyn TaskGenerator>> {
    if offline {
        log::debug!("create_generator: offline templates requested");
        return Ok(Arc::new(TemplateGenerator::default()));
    }
    if !config.has_remote() {
        log::warn!("No API key configured (AITODO_API_KEY); falling back to offline templates");
        return Ok(Arc::new(TemplateGenerator::default()));
    }
    log::debug!("create_generator: remote model {} at {}", config.model, config.base_url);
    Ok(Arc::new(CompletionClient::from_config(config)?))
}
