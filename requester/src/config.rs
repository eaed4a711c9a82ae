use std::{path::Path, time::Duration};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tokio::fs;

const USER_AGENT: &str = concat!("POSTWoman/", env!("CARGO_PKG_VERSION"));

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    pub user_agent: String,
    /// Whole-request timeout in seconds, so every run settles.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
    /// 0 disables redirect following.
    pub max_redirects: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

impl RunnerConfig {
    pub async fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let file = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&file)?;
        if config.timeout.is_zero() {
            return Err(anyhow::anyhow!("timeout must be at least one second"));
        }
        Ok(config)
    }
}
