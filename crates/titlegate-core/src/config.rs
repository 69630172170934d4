//! Environment-driven engine configuration.
//!
//! Every knob has a default; malformed values fall back rather than abort.

use std::time::Duration;

use crate::result_cache::DEFAULT_RESULT_CACHE_CAPACITY;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lexical-stage score at or above which a title is rejected outright.
    pub lexical_reject_threshold: f64,
    /// Ensemble (and early-exit lexical) rejection threshold.
    pub ensemble_reject_threshold: f64,
    /// Minimum cosine similarity for the vector search to return a match.
    pub vector_match_threshold: f64,
    /// Top-k for the vector search.
    pub vector_match_count: usize,
    /// Timeout for the embedding call and the vector RPC.
    pub semantic_rpc_timeout: Duration,
    /// Timeout for corpus-store reads and writes.
    pub store_timeout: Duration,
    /// Page size for the startup corpus pull.
    pub bootstrap_page_size: usize,
    /// Capacity of the verdict cache.
    pub result_cache_capacity: usize,
    /// Extra periodicity vocabulary, merged with the built-in set.
    pub extra_periodicity_terms: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lexical_reject_threshold: 82.0,
            ensemble_reject_threshold: 70.0,
            vector_match_threshold: 0.35,
            vector_match_count: 5,
            semantic_rpc_timeout: Duration::from_secs(3),
            store_timeout: Duration::from_secs(10),
            bootstrap_page_size: 1_000,
            result_cache_capacity: DEFAULT_RESULT_CACHE_CAPACITY,
            extra_periodicity_terms: vec![],
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment, falling back to the
    /// defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lexical_reject_threshold: env_f64(
                "LEXICAL_REJECT_THRESHOLD",
                defaults.lexical_reject_threshold,
            ),
            ensemble_reject_threshold: env_f64(
                "ENSEMBLE_REJECT_THRESHOLD",
                defaults.ensemble_reject_threshold,
            ),
            vector_match_threshold: env_f64(
                "VECTOR_MATCH_THRESHOLD",
                defaults.vector_match_threshold,
            ),
            vector_match_count: env_usize("VECTOR_MATCH_COUNT", defaults.vector_match_count),
            semantic_rpc_timeout: env_duration_secs(
                "SEMANTIC_RPC_TIMEOUT_SECONDS",
                defaults.semantic_rpc_timeout,
            ),
            store_timeout: env_duration_secs("STORE_TIMEOUT_SECONDS", defaults.store_timeout),
            bootstrap_page_size: env_usize("BOOTSTRAP_PAGE_SIZE", defaults.bootstrap_page_size),
            result_cache_capacity: env_usize(
                "RESULT_CACHE_CAPACITY",
                defaults.result_cache_capacity,
            ),
            extra_periodicity_terms: env_list("EXTRA_PERIODICITY_TERMS"),
        }
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_duration_secs(name: &str, default: Duration) -> Duration {
    match std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
    {
        Some(secs) if secs.is_finite() && secs >= 0.0 => Duration::from_secs_f64(secs),
        _ => default,
    }
}

fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|value| {
            value
                .split(',')
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
