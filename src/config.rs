use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::crosscheck::CrossCheckQuery;
use crate::domain::Source;
use crate::error::MiningError;
use crate::retrieval::{RateLimit, RetryPolicy};

pub const CONFIG_FILE_NAME: &str = "leader-genes.json";
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_ORGANISM: &str = "9606[Taxonomy ID]";
/// Entrez never returns more than this many ids per search.
pub const DEFAULT_SEARCH_LIMIT: usize = 100_000;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub entrez: EntrezConfig,
    #[serde(default)]
    pub organism: Option<String>,
    #[serde(default)]
    pub search_limit: Option<usize>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub reference_table: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cross_check: CrossCheckConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EntrezConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub server_error_delay_secs: Option<u64>,
    #[serde(default)]
    pub rate_limit_delay_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub every: Option<u64>,
    #[serde(default)]
    pub pause_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CrossCheckConfig {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub field_tag: Option<String>,
    #[serde(default)]
    pub quote_symbol: Option<bool>,
    #[serde(default)]
    pub group_phenotype: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EntrezSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub tool: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CrossCheckSettings {
    pub limit: usize,
    pub query: CrossCheckQuery,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub entrez: EntrezSettings,
    pub organism: String,
    pub search_limit: usize,
    pub sources: Vec<Source>,
    pub reference_table: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimit,
    pub cross_check: CrossCheckSettings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the explicit path, else `leader-genes.json` in the working
    /// directory, else the user config directory, else built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, MiningError> {
        let config_path = match path {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(MiningError::MissingConfig(path));
                }
                Some(path)
            }
            None => Self::discover(),
        };

        let Some(config_path) = config_path else {
            return Ok(Self::resolve_config(Config::default()));
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| MiningError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| MiningError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("leader-genes").join("config.json"))
            .filter(|path| path.exists())
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let api_key = config
            .entrez
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("NCBI_API_KEY").ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let entrez = EntrezSettings {
            base_url: config
                .entrez
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            email: config.entrez.email.filter(|email| !email.trim().is_empty()),
            tool: config
                .entrez
                .tool
                .unwrap_or_else(|| "leader-genes".to_string()),
            timeout: Duration::from_secs(config.entrez.timeout_secs.unwrap_or(60)),
        };

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: config.retry.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            server_error_delay: config
                .retry
                .server_error_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.server_error_delay),
            rate_limit_delay: config
                .retry
                .rate_limit_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_delay),
        };

        let limit_defaults = RateLimit::default();
        let rate_limit = RateLimit {
            every: config.rate_limit.every.unwrap_or(limit_defaults.every).max(1),
            pause: config
                .rate_limit
                .pause_ms
                .map(Duration::from_millis)
                .unwrap_or(limit_defaults.pause),
        };

        let query_defaults = CrossCheckQuery::default();
        let cross_check = CrossCheckSettings {
            limit: config.cross_check.limit.unwrap_or(10),
            query: CrossCheckQuery {
                field_tag: config
                    .cross_check
                    .field_tag
                    .unwrap_or(query_defaults.field_tag),
                quote_symbol: config
                    .cross_check
                    .quote_symbol
                    .unwrap_or(query_defaults.quote_symbol),
                group_phenotype: config
                    .cross_check
                    .group_phenotype
                    .unwrap_or(query_defaults.group_phenotype),
            },
        };

        let sources = match config.sources {
            Some(sources) if !sources.is_empty() => dedup_sources(sources),
            _ => Source::ALL.to_vec(),
        };

        ResolvedConfig {
            entrez,
            organism: config
                .organism
                .unwrap_or_else(|| DEFAULT_ORGANISM.to_string()),
            search_limit: config.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            sources,
            reference_table: Utf8PathBuf::from(
                config
                    .reference_table
                    .unwrap_or_else(|| "library/test_condition_gene.txt".to_string()),
            ),
            output_dir: Utf8PathBuf::from(config.output_dir.unwrap_or_else(|| "data".to_string())),
            retry,
            rate_limit,
            cross_check,
        }
    }
}

fn dedup_sources(sources: Vec<Source>) -> Vec<Source> {
    let mut unique = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}
