//! `RuntimeFlags` — process-level knobs read once from the environment
//! (spec §6). Unlike the JSON blobs, these are deployment knobs, not
//! corpus data, so they're read with `std::env::var` rather than routed
//! through `ConfigProvider`.

use std::time::Duration;

/// Token-scanning strategy (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Aho,
    Fallback,
    Hybrid,
}

impl ScanMode {
    fn parse(raw: &str) -> Self {
        match raw {
            "aho" => ScanMode::Aho,
            "fallback" => ScanMode::Fallback,
            _ => ScanMode::Hybrid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeFlags {
    /// Whether the NLI fit gate's ONNX cross-encoder is attempted at all
    /// (spec §4.11). Falls back to the rules-only backstop when `false` or
    /// when the crate was built without the `onnx` feature.
    pub nli_enabled: bool,
    pub nli_timeout: Duration,
    pub nli_single_retry: bool,
    /// Default MMR diversification lambda, overridable per context by the
    /// caller (spec §4.12 step 9).
    pub mmr_lambda: f64,
    pub request_cache_ttl: Duration,
    pub request_cache_eviction_fraction: f64,
    pub scan_mode: ScanMode,
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

impl RuntimeFlags {
    /// Read all flags from the process environment once. Callers should
    /// construct this at startup and hold onto it; it does not re-poll.
    pub fn from_env() -> Self {
        let flags = Self {
            nli_enabled: env_bool("TONE_ENGINE_NLI_ENABLED", true),
            nli_timeout: Duration::from_millis(env_u64("TONE_ENGINE_NLI_TIMEOUT_MS", 150)),
            nli_single_retry: env_bool("TONE_ENGINE_NLI_SINGLE_RETRY", true),
            mmr_lambda: env_f64("TONE_ENGINE_MMR_LAMBDA", 0.5),
            request_cache_ttl: Duration::from_secs(env_u64(
                "TONE_ENGINE_REQUEST_CACHE_TTL_SECS",
                1800,
            )),
            request_cache_eviction_fraction: env_f64(
                "TONE_ENGINE_REQUEST_CACHE_EVICTION_FRACTION",
                0.2,
            ),
            scan_mode: ScanMode::parse(
                &std::env::var("TONE_ENGINE_SCAN_MODE").unwrap_or_default(),
            ),
        };
        tracing::info!(
            nli_enabled = flags.nli_enabled,
            nli_timeout_ms = flags.nli_timeout.as_millis() as u64,
            mmr_lambda = flags.mmr_lambda,
            scan_mode = ?flags.scan_mode,
            "config.runtime_flags.loaded"
        );
        flags
    }
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self {
            nli_enabled: true,
            nli_timeout: Duration::from_millis(150),
            nli_single_retry: true,
            mmr_lambda: 0.5,
            request_cache_ttl: Duration::from_secs(1800),
            request_cache_eviction_fraction: 0.2,
            scan_mode: ScanMode::Hybrid,
        }
    }
}
