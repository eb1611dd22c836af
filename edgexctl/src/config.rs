//! CLI configuration management
//!
//! Handles loading and saving `~/.edgex-cli/config.yaml` and resolving the
//! endpoint of each EdgeX service.

use anyhow::{Context, Result};
use edgex_core::{ClientEndpoint, Service};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Host running the EdgeX services
    pub host: String,

    /// URL scheme used for every service without an explicit endpoint
    pub protocol: String,

    /// Default output format
    pub output_format: String,

    /// Print whole HTTP responses by default
    pub verbose: bool,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Per-service endpoint overrides, keyed by service key
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub clients: BTreeMap<String, ClientEndpoint>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            protocol: "http".to_string(),
            output_format: "table".to_string(),
            verbose: false,
            timeout: 10,
            clients: BTreeMap::new(),
        }
    }
}

impl CliConfig {
    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        edgex_core::default_config_path()
    }

    /// Load configuration from `path`, or the defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        for key in config.clients.keys() {
            Service::from_str(key)
                .with_context(|| format!("Invalid client entry in {}", path.display()))?;
        }

        Ok(config)
    }

    /// Save configuration to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize CLI config")?;

        std::fs::write(path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Endpoint of `service`: the configured override, else the shared host
    /// and protocol with the service's default port
    pub fn endpoint(&self, service: Service) -> ClientEndpoint {
        self.clients
            .get(service.key())
            .cloned()
            .unwrap_or_else(|| ClientEndpoint::for_service(service, &self.protocol, &self.host))
    }

    /// Base URL of `service`
    pub fn service_url(&self, service: Service) -> String {
        self.endpoint(service).url()
    }

    /// Update one configuration value from its textual form.
    ///
    /// Keys are `host`, `protocol`, `format`, `verbose`, `timeout`, or a
    /// service key (e.g. `core-data`) whose value is a base URL such as
    /// `http://10.0.0.5:48080`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "host" => {
                ConfigBuilder::validate_host(value)?;
                self.host = value.to_string();
            }
            "protocol" => {
                ConfigBuilder::validate_protocol(value)?;
                self.protocol = value.to_string();
            }
            "format" | "output_format" => {
                ConfigBuilder::validate_output_format(value)?;
                self.output_format = value.to_string();
            }
            "verbose" => {
                self.verbose = parse_bool(value)
                    .ok_or_else(|| anyhow::anyhow!("Invalid boolean '{}'", value))?;
            }
            "timeout" => {
                let timeout = value
                    .parse()
                    .with_context(|| format!("Invalid timeout '{}'", value))?;
                ConfigBuilder::validate_timeout(timeout)?;
                self.timeout = timeout;
            }
            other => {
                let service = Service::from_str(other).map_err(|_| {
                    anyhow::anyhow!(
                        "Unknown configuration key '{}'. Valid keys: host, protocol, format, verbose, timeout, or a service name",
                        other
                    )
                })?;
                let endpoint = parse_endpoint(value)?;
                self.clients.insert(service.key().to_string(), endpoint);
            }
        }
        Ok(())
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Parse `protocol://host:port` into an endpoint
fn parse_endpoint(value: &str) -> Result<ClientEndpoint> {
    let url = reqwest::Url::parse(value).with_context(|| format!("Invalid URL '{}'", value))?;
    ConfigBuilder::validate_protocol(url.scheme())?;

    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("URL '{}' has no host", value))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| anyhow::anyhow!("URL '{}' has no port", value))?;

    Ok(ClientEndpoint {
        protocol: url.scheme().to_string(),
        host: host.to_string(),
        port,
    })
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    host: Option<String>,
    protocol: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    timeout: Option<u64>,
    clients: BTreeMap<String, ClientEndpoint>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set host (with validation)
    pub fn with_host(mut self, host: impl Into<String>) -> Result<Self> {
        let host = host.into();
        Self::validate_host(&host)?;
        self.host = Some(host);
        Ok(self)
    }

    /// Set protocol (with validation)
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Result<Self> {
        let protocol = protocol.into();
        Self::validate_protocol(&protocol)?;
        self.protocol = Some(protocol);
        Ok(self)
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set timeout (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Load configuration from file
    ///
    /// A missing file leaves the builder unchanged; a malformed one is an error.
    pub fn with_config_file(self, path: &Path) -> Result<Self> {
        let config = CliConfig::load_from(path)?;

        let mut clients = config.clients;
        clients.extend(self.clients);

        // Only use file values if they weren't already set (preserving priority)
        Ok(Self {
            host: self.host.or(Some(config.host)),
            protocol: self.protocol.or(Some(config.protocol)),
            output_format: self.output_format.or(Some(config.output_format)),
            verbose: self.verbose.or(Some(config.verbose)),
            timeout: self.timeout.or(Some(config.timeout)),
            clients,
        })
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        // Invalid values are skipped so a stray variable cannot break every command
        if let Ok(host) = std::env::var("EDGEX_HOST") {
            if Self::validate_host(&host).is_ok() {
                self.host = Some(host);
            }
        }

        if let Ok(protocol) = std::env::var("EDGEX_PROTOCOL") {
            if Self::validate_protocol(&protocol).is_ok() {
                self.protocol = Some(protocol);
            }
        }

        if let Ok(format) = std::env::var("EDGEX_FORMAT") {
            if Self::validate_output_format(&format).is_ok() {
                self.output_format = Some(format);
            }
        }

        if let Ok(verbose) = std::env::var("EDGEX_VERBOSE") {
            if let Some(verbose) = parse_bool(&verbose) {
                self.verbose = Some(verbose);
            }
        }

        if let Ok(timeout) = std::env::var("EDGEX_TIMEOUT") {
            if let Ok(timeout) = timeout.parse() {
                if Self::validate_timeout(timeout).is_ok() {
                    self.timeout = Some(timeout);
                }
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let host = self.host.unwrap_or(defaults.host);
        let protocol = self.protocol.unwrap_or(defaults.protocol);
        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        // Validate final values
        Self::validate_host(&host)?;
        Self::validate_protocol(&protocol)?;
        Self::validate_output_format(&output_format)?;
        Self::validate_timeout(timeout)?;

        Ok(CliConfig {
            host,
            protocol,
            output_format,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout,
            clients: self.clients,
        })
    }

    /// Validate host name
    fn validate_host(host: &str) -> Result<()> {
        if host.is_empty() {
            return Err(anyhow::anyhow!("Host cannot be empty"));
        }

        if host.contains("://") || host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!(
                "Host must be a bare host name or address, got '{}'",
                host
            ));
        }

        Ok(())
    }

    /// Validate URL scheme
    fn validate_protocol(protocol: &str) -> Result<()> {
        match protocol {
            "http" | "https" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid protocol '{}'. Must be 'http' or 'https'",
                protocol
            )),
        }
    }

    /// Validate output format
    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                format
            )),
        }
    }

    /// Validate timeout value
    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > 300 {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to 300 seconds"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: [&str; 5] = [
        "EDGEX_HOST",
        "EDGEX_PROTOCOL",
        "EDGEX_FORMAT",
        "EDGEX_VERBOSE",
        "EDGEX_TIMEOUT",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.output_format, "table");
        assert!(!config.verbose);
        assert_eq!(config.timeout, 10);
        assert!(config.clients.is_empty());
    }

    #[test]
    fn test_endpoint_defaults_to_service_port() {
        let config = CliConfig::default();
        assert_eq!(
            config.service_url(Service::CoreData),
            "http://localhost:48080"
        );
        assert_eq!(
            config.service_url(Service::Notifications),
            "http://localhost:48060"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = CliConfig::default();
        config
            .set_value("core-metadata", "https://meta.example.com:9443")
            .unwrap();

        assert_eq!(
            config.service_url(Service::CoreMetadata),
            "https://meta.example.com:9443"
        );
        // Other services keep the shared host
        assert_eq!(
            config.service_url(Service::CoreData),
            "http://localhost:48080"
        );
    }

    #[test]
    fn test_set_value_validation() {
        let mut config = CliConfig::default();
        assert!(config.set_value("host", "edgex.local").is_ok());
        assert!(config.set_value("timeout", "30").is_ok());
        assert!(config.set_value("verbose", "yes").is_ok());
        assert!(config.set_value("format", "json").is_ok());

        assert_eq!(config.host, "edgex.local");
        assert_eq!(config.timeout, 30);
        assert!(config.verbose);
        assert_eq!(config.output_format, "json");

        assert!(config.set_value("host", "http://edgex.local").is_err());
        assert!(config.set_value("timeout", "0").is_err());
        assert!(config.set_value("timeout", "soon").is_err());
        assert!(config.set_value("format", "xml").is_err());
        assert!(config.set_value("core-magic", "http://x:1").is_err());
        assert!(config.set_value("core-data", "ftp://x:1").is_err());
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = CliConfig::default();
        config.host = "10.0.0.5".to_string();
        config
            .set_value("support-scheduler", "http://sched:48085")
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliConfig::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(loaded, CliConfig::default());
    }

    #[test]
    fn test_load_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "host: edgex.lan\nclients:\n  core-data:\n    protocol: http\n    host: data.lan\n    port: 8080\n",
        )
        .unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.host, "edgex.lan");
        assert_eq!(loaded.timeout, 10);
        assert_eq!(loaded.service_url(Service::CoreData), "http://data.lan:8080");
        assert_eq!(
            loaded.service_url(Service::CoreMetadata),
            "http://edgex.lan:48081"
        );
    }

    #[test]
    fn test_load_rejects_unknown_client() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "clients:\n  core-magic:\n    protocol: http\n    host: x\n    port: 1\n",
        )
        .unwrap();

        assert!(CliConfig::load_from(&path).is_err());
    }

    // ConfigBuilder tests

    #[test]
    fn test_builder_with_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_builder_with_custom_values() {
        let config = ConfigBuilder::new()
            .with_host("edgex.example.com")
            .unwrap()
            .with_protocol("https")
            .unwrap()
            .with_output_format("json")
            .unwrap()
            .with_verbose(true)
            .with_timeout(30)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.host, "edgex.example.com");
        assert_eq!(config.protocol, "https");
        assert_eq!(config.output_format, "json");
        assert!(config.verbose);
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_builder_validation() {
        assert!(ConfigBuilder::new().with_host("").is_err());
        assert!(ConfigBuilder::new().with_host("edge x").is_err());
        assert!(ConfigBuilder::new().with_protocol("ftp").is_err());
        assert!(ConfigBuilder::new().with_output_format("csv").is_err());
        assert!(ConfigBuilder::new().with_timeout(0).is_err());
        assert!(ConfigBuilder::new().with_timeout(301).is_err());

        assert!(ConfigBuilder::new().with_host("192.168.1.20").is_ok());
        assert!(ConfigBuilder::new().with_timeout(300).is_ok());
    }

    #[test]
    fn test_builder_file_values_do_not_override_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "host: from-file\ntimeout: 42\n").unwrap();

        let config = ConfigBuilder::new()
            .with_host("from-cli")
            .unwrap()
            .with_config_file(&path)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.host, "from-cli");
        assert_eq!(config.timeout, 42);
    }

    #[test]
    fn test_builder_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "timeout: [not, a, number]\n").unwrap();

        assert!(ConfigBuilder::new().with_config_file(&path).is_err());
    }

    #[test]
    #[serial]
    fn test_builder_with_env_overrides() {
        clear_env();
        std::env::set_var("EDGEX_HOST", "env.example.com");
        std::env::set_var("EDGEX_PROTOCOL", "https");
        std::env::set_var("EDGEX_FORMAT", "json");
        std::env::set_var("EDGEX_VERBOSE", "1");
        std::env::set_var("EDGEX_TIMEOUT", "25");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config.host, "env.example.com");
        assert_eq!(config.protocol, "https");
        assert_eq!(config.output_format, "json");
        assert!(config.verbose);
        assert_eq!(config.timeout, 25);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_priority_chain() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "host: from-file\ntimeout: 42\nprotocol: https\n").unwrap();

        std::env::set_var("EDGEX_HOST", "from-env");
        std::env::set_var("EDGEX_TIMEOUT", "25");

        // defaults -> file -> env -> CLI, as main applies them
        let config = ConfigBuilder::new()
            .with_config_file(&path)
            .unwrap()
            .with_env_overrides()
            .with_host("from-cli")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.host, "from-cli");
        assert_eq!(config.timeout, 25);
        assert_eq!(config.protocol, "https");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_invalid_env_values_ignored() {
        clear_env();
        std::env::set_var("EDGEX_TIMEOUT", "invalid");
        std::env::set_var("EDGEX_FORMAT", "xml");
        std::env::set_var("EDGEX_HOST", "http://nope");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config.timeout, 10);
        assert_eq!(config.output_format, "table");
        assert_eq!(config.host, "localhost");

        clear_env();
    }
}
