use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::lens::rdap::DEFAULT_BASE_URL;

pub struct SpyglassConfig {
    /// RDAP registry endpoint for IP network records
    pub rdap_base_url: String,

    /// Minimum spacing between outbound RDAP requests in milliseconds
    /// (default: 200)
    pub throttle_interval_ms: u64,

    /// Per-attempt HTTP timeout in seconds (default: 15)
    pub request_timeout_secs: u64,
}

const EMPTY_CONFIG: &str = r#"### spyglass configuration file

### RDAP registry endpoint for IP network records
# rdap_base_url = "https://rdap.arin.net/registry/ip/"

### minimum spacing between outbound requests (milliseconds)
# throttle_interval_ms = 200

### per-attempt HTTP timeout (seconds)
# request_timeout_secs = 15
"#;

impl Default for SpyglassConfig {
    fn default() -> Self {
        Self {
            rdap_base_url: DEFAULT_BASE_URL.to_string(),
            throttle_interval_ms: 200,
            request_timeout_secs: 15,
        }
    }
}

impl SpyglassConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<SpyglassConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.spyglass/spyglass.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        // Config dir
        let spyglass_dir = format!("{}/.spyglass", home_dir.as_str());

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(spyglass_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create spyglass directory: {}", e))?;
                let p = format!("{}/spyglass.toml", spyglass_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of SPYGLASS)
        // E.g., `SPYGLASS_RDAP_BASE_URL=http://localhost:8080/ip/ ./spyglass`
        // would point lookups at a local registry
        builder = builder.add_source(config::Environment::with_prefix("SPYGLASS"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let defaults = SpyglassConfig::default();

        // Parse registry base URL
        let rdap_base_url = config
            .get("rdap_base_url")
            .cloned()
            .unwrap_or(defaults.rdap_base_url);

        // Parse throttle interval (default: 200 ms)
        let throttle_interval_ms = config
            .get("throttle_interval_ms")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.throttle_interval_ms);

        // Parse per-attempt timeout (default: 15 s)
        let request_timeout_secs = config
            .get("request_timeout_secs")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        Ok(SpyglassConfig {
            rdap_base_url,
            throttle_interval_ms,
            request_timeout_secs,
        })
    }

    /// Get the request throttle interval as Duration
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    /// Get the per-attempt timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.spyglass/spyglass.toml", home_dir)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let lines = vec![
            format!("RDAP Base URL:      {}", self.rdap_base_url),
            format!("Throttle Interval:  {} ms", self.throttle_interval_ms),
            format!("Request Timeout:    {} seconds", self.request_timeout_secs),
        ];
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpyglassConfig::default();
        assert_eq!(config.rdap_base_url, "https://rdap.arin.net/registry/ip/");
        assert_eq!(config.throttle_interval_ms, 200);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_durations() {
        let config = SpyglassConfig {
            rdap_base_url: "http://localhost:8080/ip/".to_string(),
            throttle_interval_ms: 500,
            request_timeout_secs: 30,
        };

        assert_eq!(config.throttle_interval(), Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spyglass.toml");
        std::fs::write(
            &path,
            "rdap_base_url = \"http://localhost:9090/ip/\"\nthrottle_interval_ms = 50\n",
        )
        .unwrap();

        let config =
            SpyglassConfig::new(&Some(path.to_str().unwrap().to_string())).unwrap();
        assert_eq!(config.rdap_base_url, "http://localhost:9090/ip/");
        assert_eq!(config.throttle_interval_ms, 50);
        // unset keys fall back to defaults
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_missing_config_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.toml");

        let config =
            SpyglassConfig::new(&Some(path.to_str().unwrap().to_string())).unwrap();
        assert!(path.exists());
        assert_eq!(config.rdap_base_url, "https://rdap.arin.net/registry/ip/");
    }
}
