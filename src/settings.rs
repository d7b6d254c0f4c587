use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

const ENV_PREFIX: &str = "REVIEWS";
const CONFIG_FILE: &str = "review_insights";

pub const DEFAULT_MODEL_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";

/// Runtime settings: defaults, then an optional `review_insights.*` file,
/// then `REVIEWS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub data_path: PathBuf,
    pub year: i32,
    pub max_products: usize,
    pub max_testimonials: usize,
    /// Resource-constrained environment: skip the model load entirely.
    pub low_memory: bool,
    pub model_endpoint: Option<String>,
    pub model_token: Option<String>,
    pub max_input_chars: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        Self::from_config(builder.build().context("Failed to read configuration")?)
    }

    pub fn from_config(cfg: Config) -> Result<Self> {
        cfg.try_deserialize().context("Invalid configuration")
    }

    pub(crate) fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("base_url", "https://web-scraping.dev")?
            .set_default("timeout_secs", 10)?
            .set_default("data_path", "scraped_data.json")?
            .set_default("year", 2023)?
            .set_default("max_products", 10)?
            .set_default("max_testimonials", 5)?
            .set_default("low_memory", false)?
            .set_default("model_endpoint", DEFAULT_MODEL_ENDPOINT)?
            .set_default("max_input_chars", 512)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
