use clap::Parser;
use std::time::Duration;

use crate::error::ConfigError;
use crate::rate_limit::Quota;
use crate::validation::DEFAULT_MAX_TEXT_LENGTH;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "ai-dashboard-gateway")]
#[command(about = "Rate-limited gateway for AI dashboard features")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Generation backends (comma-separated)
    // Example: "localhost:11434,localhost:11435"
    #[arg(short, long, default_value = "localhost:11434")]
    pub backends: String,

    // Model name sent with every generation request
    #[arg(short, long, default_value = "llama3")]
    pub model: String,

    // Response cache TTL in seconds
    #[arg(short, long, default_value_t = 30)]
    pub cache_ttl: u64,

    // Max requests per window on AI generation routes
    #[arg(long, default_value_t = 20)]
    pub rate_limit: u32,

    // Window for AI generation routes, in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Max requests per window on file analysis routes
    #[arg(long, default_value_t = 5)]
    pub file_rate_limit: u32,

    // Window for file analysis routes, in seconds
    #[arg(long, default_value_t = 60)]
    pub file_rate_window: u64,

    // Upper bound on tracked rate limit keys (0 = unbounded)
    #[arg(long, default_value_t = 100_000)]
    pub rate_max_entries: usize,

    // How often expired rate limit and cache entries are dropped, in seconds
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,

    // Health check interval
    #[arg(long, default_value_t = 30)]
    pub health_interval: u64,

    // Pending generation jobs before callers wait
    #[arg(long, default_value_t = 100)]
    pub queue_capacity: usize,

    // Max characters accepted in a prompt
    #[arg(long, default_value_t = DEFAULT_MAX_TEXT_LENGTH)]
    pub max_text_length: usize,

    // Max seconds to wait on one backend generation call
    #[arg(long, default_value_t = 120)]
    pub backend_timeout: u64,
}

impl Default for Args {
    fn default() -> Self {
        Self::parse_from(["ai-dashboard-gateway"])
    }
}

// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub backends: Vec<String>,
    pub model: String,
    pub cache_ttl: Duration,
    pub generation_quota: Quota,
    pub file_quota: Quota,
    pub rate_max_entries: usize,
    pub sweep_interval: Duration,
    pub health_interval: Duration,
    pub queue_capacity: usize,
    pub max_text_length: usize,
    pub backend_timeout: Duration,
}

// Parse "host:port,http://host:port" into full URLs
pub fn parse_backends(backends: &str) -> Vec<String> {
    backends
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|url| {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.trim_end_matches('/').to_string()
            } else {
                format!("http://{}", url.trim_end_matches('/'))
            }
        })
        .collect()
}

fn non_zero_secs(value: u64, name: &'static str) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroValue(name));
    }
    Ok(Duration::from_secs(value))
}

impl Args {
    pub fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        let backends = parse_backends(&self.backends);
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroValue("queue capacity"));
        }
        if self.max_text_length == 0 {
            return Err(ConfigError::ZeroValue("max text length"));
        }

        Ok(GatewayConfig {
            port: self.port,
            backends,
            model: self.model,
            cache_ttl: Duration::from_secs(self.cache_ttl),
            generation_quota: Quota::new(self.rate_limit, Duration::from_secs(self.rate_window))?,
            file_quota: Quota::new(
                self.file_rate_limit,
                Duration::from_secs(self.file_rate_window),
            )?,
            rate_max_entries: self.rate_max_entries,
            sweep_interval: non_zero_secs(self.sweep_interval, "sweep interval")?,
            health_interval: non_zero_secs(self.health_interval, "health interval")?,
            queue_capacity: self.queue_capacity,
            max_text_length: self.max_text_length,
            backend_timeout: non_zero_secs(self.backend_timeout, "backend timeout")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_quotas() {
        let config = Args::default().into_config().unwrap();

        assert_eq!(config.generation_quota.limit(), 20);
        assert_eq!(config.generation_quota.window(), Duration::from_secs(60));
        assert_eq!(config.file_quota.limit(), 5);
        assert_eq!(config.file_quota.window(), Duration::from_secs(60));
        assert_eq!(config.backends, vec!["http://localhost:11434".to_string()]);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "ai-dashboard-gateway",
            "--rate-limit",
            "3",
            "--file-rate-window",
            "10",
            "-b",
            "gpu-1:11434, https://gpu-2/",
        ]);
        let config = args.into_config().unwrap();

        assert_eq!(config.generation_quota.limit(), 3);
        assert_eq!(config.file_quota.window(), Duration::from_secs(10));
        assert_eq!(
            config.backends,
            vec!["http://gpu-1:11434".to_string(), "https://gpu-2".to_string()]
        );
    }

    #[test]
    fn zero_quota_is_rejected_at_startup() {
        let args = Args::parse_from(["ai-dashboard-gateway", "--rate-limit", "0"]);
        assert_eq!(args.into_config().unwrap_err(), ConfigError::ZeroLimit);

        let args = Args::parse_from(["ai-dashboard-gateway", "--file-rate-window", "0"]);
        assert_eq!(args.into_config().unwrap_err(), ConfigError::ZeroWindow);
    }

    #[test]
    fn empty_backend_list_is_rejected() {
        let args = Args::parse_from(["ai-dashboard-gateway", "--backends", " , "]);
        assert_eq!(args.into_config().unwrap_err(), ConfigError::NoBackends);
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let args = Args::parse_from(["ai-dashboard-gateway", "--sweep-interval", "0"]);
        assert_eq!(
            args.into_config().unwrap_err(),
            ConfigError::ZeroValue("sweep interval")
        );
    }

    #[test]
    fn backend_timeout_defaults_and_rejects_zero() {
        let config = Args::default().into_config().unwrap();
        assert_eq!(config.backend_timeout, Duration::from_secs(120));
        assert_eq!(config.max_text_length, DEFAULT_MAX_TEXT_LENGTH);

        let args = Args::parse_from(["ai-dashboard-gateway", "--backend-timeout", "0"]);
        assert_eq!(
            args.into_config().unwrap_err(),
            ConfigError::ZeroValue("backend timeout")
        );
    }
}
