use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/sand-monitor";
pub const DEFAULT_SENSOR_URL: &str = "http://192.168.0.106";

/// Environment variable holding the upstream sensor address.
pub const SENSOR_URL_ENV: &str = "SENSOR_API_URL";
pub const CONFIG_PATH_ENV: &str = "SAND_MONITOR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub proxy: ProxySettings,
    pub polling: PollingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    Ingest,
    Upstream,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxySettings {
    pub mode: ProxyMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    pub interval_ms: u64,
    pub timeout_ms: u64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub filter: String,
}

impl MonitorConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.polling.timeout_ms)
    }

    /// Where the controller polls: the sensor itself unless `polling.url`
    /// points somewhere else.
    pub fn poll_url(&self) -> String {
        self.polling
            .url
            .clone()
            .unwrap_or_else(|| self.upstream.url.clone())
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let positive = [
            ("upstream.timeout_ms", self.upstream.timeout_ms),
            ("polling.interval_ms", self.polling.interval_ms),
            ("polling.timeout_ms", self.polling.timeout_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        parse_http_url("upstream.url", &self.upstream.url)?;
        if let Some(raw) = &self.polling.url {
            let url = parse_http_url("polling.url", raw)?;
            // Our own /api answers with placeholder readings, which the
            // dashboard would record as live sensor data.
            if self.is_local_proxy(&url) {
                return Err(ConfigError::Invalid {
                    key: "polling.url",
                    reason: format!("'{}' is this service's own proxy, poll the sensor instead", raw),
                });
            }
        }

        Ok(self)
    }

    fn is_local_proxy(&self, url: &Url) -> bool {
        let local_host = match url.host_str() {
            Some("localhost" | "127.0.0.1" | "[::1]" | "::1" | "0.0.0.0") => true,
            Some(host) => host == self.server.host,
            None => false,
        };
        local_host && url.port_or_known_default() == Some(self.server.port)
    }
}

fn parse_http_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { key, reason };
    let url = Url::parse(raw).map_err(|e| invalid(format!("'{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("'{}' uses unsupported scheme '{}'", raw, other))),
    }
}

/// Load configuration from defaults, `config/sand-monitor.{toml,...}` (or the
/// path in `SAND_MONITOR_CONFIG`), `SAND_MONITOR__*` variables and finally
/// `SENSOR_API_URL`.
pub fn load_monitor_config() -> Result<MonitorConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let sensor_url = std::env::var(SENSOR_URL_ENV).ok().filter(|url| !url.trim().is_empty());

    build_monitor_config(&path, sensor_url)
}

pub fn build_monitor_config(
    path: &str,
    sensor_url: Option<String>,
) -> Result<MonitorConfig, ConfigError> {
    let settings = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("upstream.url", DEFAULT_SENSOR_URL)?
        .set_default("upstream.timeout_ms", 10_000)?
        .set_default("proxy.mode", "ingest")?
        .set_default("polling.interval_ms", 10_000)?
        .set_default("polling.timeout_ms", 5_000)?
        .set_default("logging.filter", "info")?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("SAND_MONITOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("upstream.url", sensor_url)?
        .build()?;

    let parsed: MonitorConfig = settings.try_deserialize()?;
    parsed.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn defaults() -> MonitorConfig {
        build_monitor_config("config/does-not-exist", None).unwrap()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = defaults();
        assert_eq!(config.upstream.url, DEFAULT_SENSOR_URL);
        assert_eq!(config.proxy.mode, ProxyMode::Ingest);
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_sensor_url_override() {
        let config =
            build_monitor_config("config/does-not-exist", Some("http://10.0.0.7".to_string()))
                .unwrap();
        assert_eq!(config.upstream.url, "http://10.0.0.7");
    }

    #[test]
    fn test_poll_url_defaults_to_sensor() {
        let mut config =
            build_monitor_config("config/does-not-exist", Some("http://10.0.0.7".to_string()))
                .unwrap();
        assert_eq!(config.poll_url(), "http://10.0.0.7");

        config.polling.url = Some("http://192.168.0.106/reading".to_string());
        assert_eq!(config.poll_url(), "http://192.168.0.106/reading");
    }

    fn write_config(contents: &str) -> std::path::PathBuf {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "sand-monitor-test-{}-{}.toml",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::SeqCst)
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_file_values_apply() {
        let path = write_config(
            "[polling]\ninterval_ms = 1000\nurl = \"http://192.168.0.106\"\n\n[proxy]\nmode = \"upstream\"\n",
        );
        let config = build_monitor_config(path.to_str().unwrap(), None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.proxy.mode, ProxyMode::Upstream);
        assert_eq!(config.poll_url(), "http://192.168.0.106");
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_zero_interval_and_bad_urls() {
        let path = write_config("[polling]\ninterval_ms = 0\n");
        let result = build_monitor_config(path.to_str().unwrap(), None);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "polling.interval_ms", .. })
        ));

        let result = build_monitor_config("config/does-not-exist", Some("192.168.0.106".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "upstream.url", .. })));
    }

    #[test]
    fn test_rejects_urls_that_do_not_parse() {
        for url in ["http://", "http://exa mple.com", "ftp://192.168.0.106"] {
            let result = build_monitor_config("config/does-not-exist", Some(url.to_string()));
            assert!(
                matches!(result, Err(ConfigError::Invalid { key: "upstream.url", .. })),
                "{} should be rejected",
                url
            );
        }
    }

    #[test]
    fn test_rejects_polling_own_proxy() {
        for url in [
            "http://127.0.0.1:8080/api",
            "http://localhost:8080/api",
            "http://0.0.0.0:8080/api",
        ] {
            let path = write_config(&format!("[polling]\nurl = \"{}\"\n", url));
            let result = build_monitor_config(path.to_str().unwrap(), None);
            std::fs::remove_file(&path).ok();
            assert!(
                matches!(result, Err(ConfigError::Invalid { key: "polling.url", .. })),
                "{} should be rejected",
                url
            );
        }

        // Same host on another port is a different service
        let path = write_config("[polling]\nurl = \"http://127.0.0.1:9090/api\"\n");
        let result = build_monitor_config(path.to_str().unwrap(), None);
        std::fs::remove_file(&path).ok();
        assert!(result.is_ok());
    }
}
