//! Server configuration

use petal_classifier::{InferenceConfig, ModelConfig};
use petal_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::cli::Cli;

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ListenConfig,

    /// Model artifact and class names
    #[serde(default)]
    pub model: ModelConfig,

    /// Optional inference limits
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(&cli.config).exists() {
            let content = std::fs::read_to_string(&cli.config)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(model) = &cli.model {
            config.model.path = model.clone();
        }

        if let Some(listen) = &cli.listen {
            config.server.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.server.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML without validating it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid configuration file: {}", e)))
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;
        self.model.validate()?;
        self.inference.validate()
    }
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ListenConfig {
    /// Address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen, self.port)
            .parse()
            .map_err(|e| Error::config(format!("invalid listen address '{}': {}", self.listen, e)))
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Install the Prometheus recorder and serve `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("petal-server").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.listen, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("iris_knn_model.onnx"));
        assert!(config.telemetry.metrics_enabled);
        assert!(config.inference.max_in_flight.is_none());
        assert!(config.inference.timeout_ms.is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = ServerConfig::load(&cli(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_yaml_file_then_cli_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("petal.yaml");
        std::fs::write(
            &path,
            r#"
server:
  listen: 127.0.0.1
  port: 8080
model:
  path: models/iris.onnx
  intra_threads: 2
inference:
  max_in_flight: 8
  timeout_ms: 250
telemetry:
  metrics_enabled: false
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&cli(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.server.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.model.path, PathBuf::from("models/iris.onnx"));
        assert_eq!(config.model.intra_threads, Some(2));
        assert_eq!(config.inference.max_in_flight, Some(8));
        assert_eq!(config.inference.timeout_ms, Some(250));
        assert!(!config.telemetry.metrics_enabled);

        let overridden = ServerConfig::load(&cli(&[
            "--config",
            path.to_str().unwrap(),
            "--port",
            "9000",
            "--model",
            "other.onnx",
        ]))
        .unwrap();
        assert_eq!(overridden.server.port, 9000);
        assert_eq!(overridden.server.listen, "127.0.0.1");
        assert_eq!(overridden.model.path, PathBuf::from("other.onnx"));
    }

    #[test]
    fn test_invalid_sections_are_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");

        for yaml in [
            "model:\n  classes: []\n",
            "model:\n  classes: [a, a, b]\n",
            "model:\n  input_width: 5\n",
            "inference:\n  max_in_flight: 0\n",
            "server:\n  listen: not an address\n",
            "server: [",
        ] {
            std::fs::write(&path, yaml).unwrap();
            let result = ServerConfig::load(&cli(&["--config", path.to_str().unwrap()]));
            assert!(matches!(result, Err(Error::Config(_))), "accepted {:?}", yaml);
        }
    }
}
