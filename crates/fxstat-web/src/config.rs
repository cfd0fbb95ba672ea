//! Process configuration for the `fxstat` binary.
//!
//! Every option can be given as a flag or through its environment variable.
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--bind` | `FXSTAT_BIND` | `0.0.0.0:8000` |
//! | `--api-key` | `EXCHANGE_RATE_API_KEY` | none (remote tiers skipped) |
//! | `--base-url` | `FXSTAT_BASE_URL` | `https://api.exchangerate.host` |
//! | `--fallback-file` | `FXSTAT_FALLBACK_FILE` | `data/sample_api.json` |
//! | `--deadline-ms` | `FXSTAT_DEADLINE_MS` | none |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use fxstat_core::{RateRouter, RateRouterBuilder, DEFAULT_BASE_URL, DEFAULT_DATASET_PATH};

/// Exchange-rate statistics service with tiered fallback.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fxstat",
    version,
    about = "Exchange-rate statistics service with tiered fallback"
)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    #[arg(long, env = "FXSTAT_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// exchangerate.host access key.
    #[arg(long, env = "EXCHANGE_RATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the remote rates API.
    #[arg(long, env = "FXSTAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Local dataset served when every remote tier fails.
    #[arg(long, env = "FXSTAT_FALLBACK_FILE", default_value = DEFAULT_DATASET_PATH)]
    pub fallback_file: PathBuf,

    /// Overall budget in milliseconds for the remote tiers of one request.
    #[arg(long, env = "FXSTAT_DEADLINE_MS")]
    pub deadline_ms: Option<u64>,
}

impl Config {
    pub fn build_router(&self) -> RateRouter {
        RateRouterBuilder::new()
            .with_api_key(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_fallback_path(self.fallback_file.clone())
            .with_deadline(self.deadline_ms.map(Duration::from_millis))
            .build()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}
