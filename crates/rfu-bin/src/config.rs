// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration file loading.
//!
//! ```yaml
//! client:
//!   endpoint: "opc.tcp://192.168.0.1:4840"
//!   endpoint_selection:
//!     strategy: no_security
//!   session_timeout: 30m
//! device:
//!   device_namespace: "http://www.sick.com/RFU6xx/"
//!   read_tag_method: 7004
//! trust:
//!   mode: allow_list
//!   certificates: ["pki/trusted/rfu.der"]
//! ```
//!
//! Every section is optional. The endpoint resolves in this order: the
//! `--endpoint` flag, the `RFU_ENDPOINT` variable, the file, the built-in
//! default.

use std::path::{Path, PathBuf};

use rfu_opcua::{DeviceProfile, OpcUaConfig, TrustMode};
use serde::{Deserialize, Serialize};

use crate::error::{BinError, BinResult};

/// Configuration file looked up in the working directory when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = "rfu-client.yaml";

// =============================================================================
// AppConfig
// =============================================================================

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OPC UA client settings.
    pub client: OpcUaConfig,

    /// Device namespaces and node ids.
    pub device: DeviceProfile,

    /// Server certificate trust.
    pub trust: TrustMode,
}

/// Configuration together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed configuration.
    pub config: AppConfig,

    /// Source file, `None` when built-in defaults are used.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Parses configuration from YAML text.
    pub fn from_yaml(text: &str) -> BinResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> BinResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BinError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text).map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Replaces the endpoint when an override is given.
    pub fn with_endpoint(mut self, endpoint: Option<&str>) -> Self {
        if let Some(endpoint) = endpoint {
            self.client.endpoint = endpoint.to_string();
        }
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BinResult<()> {
        self.client.validate()?;

        for uri in self.device.required_namespaces() {
            if uri.trim().is_empty() {
                return Err(BinError::config("device namespace URIs must not be empty"));
            }
        }

        if let TrustMode::AllowList { certificates } = &self.trust {
            if certificates.is_empty() {
                return Err(BinError::config(
                    "trust mode allow_list needs at least one certificate",
                ));
            }
        }

        Ok(())
    }

    /// Returns non-fatal findings about the configuration.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if matches!(self.trust, TrustMode::AcceptAll) {
            warnings.push("Server certificates are accepted without verification".to_string());
        }

        if let TrustMode::AllowList { certificates } = &self.trust {
            for path in certificates.iter().filter(|p| !p.exists()) {
                warnings.push(format!("Trusted certificate not found: {}", path.display()));
            }
        }

        warnings
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Loads the configuration.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is used
/// when present and built-in defaults otherwise.
pub fn load(path: Option<&Path>, endpoint: Option<&str>) -> BinResult<LoadedConfig> {
    let source = match path {
        Some(path) if !path.exists() => {
            return Err(BinError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    let config = match &source {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration");
            AppConfig::from_file(path)?
        }
        None => {
            tracing::debug!("No configuration file, using defaults");
            AppConfig::default()
        }
    };

    Ok(LoadedConfig {
        config: config.with_endpoint(endpoint),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rfu_opcua::EndpointSelection;

    use super::*;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.client.endpoint, rfu_opcua::DEFAULT_ENDPOINT);
        assert_eq!(config.device, DeviceProfile::rfu6xx());
        assert_eq!(config.trust, TrustMode::AcceptAll);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_yaml(
            r#"
client:
  endpoint: "opc.tcp://10.0.0.5:4840"
  session_timeout: 5m
device:
  read_tag_method: 9004
trust:
  mode: reject_all
"#,
        )
        .unwrap();

        assert_eq!(config.client.endpoint, "opc.tcp://10.0.0.5:4840");
        assert_eq!(config.client.session_timeout.as_secs(), 300);
        assert_eq!(config.client.endpoint_selection, EndpointSelection::default());
        assert_eq!(config.device.read_tag_method, 9004);
        assert_eq!(config.device.write_tag_method, 7005);
        assert_eq!(config.trust, TrustMode::RejectAll);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = AppConfig::from_yaml("client: [1, 2").unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_load_explicit_file_with_override() {
        let file = write_config("client:\n  endpoint: \"opc.tcp://file:4840\"\n");

        let loaded = load(Some(file.path()), None).unwrap();
        assert_eq!(loaded.config.client.endpoint, "opc.tcp://file:4840");
        assert_eq!(loaded.source.as_deref(), Some(file.path()));

        let loaded = load(Some(file.path()), Some("opc.tcp://flag:4840")).unwrap();
        assert_eq!(loaded.config.client.endpoint, "opc.tcp://flag:4840");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(load(Some(&missing), None).is_err());
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let bad = AppConfig::default().with_endpoint(Some("http://rfu:4840"));
        assert!(bad.validate().is_err());

        let empty_allow_list = AppConfig {
            trust: TrustMode::AllowList {
                certificates: Vec::new(),
            },
            ..Default::default()
        };
        assert!(empty_allow_list.validate().is_err());
    }

    #[test]
    fn test_warnings() {
        assert_eq!(AppConfig::default().warnings().len(), 1);

        let config = AppConfig {
            trust: TrustMode::AllowList {
                certificates: vec![PathBuf::from("/nonexistent/rfu.der")],
            },
            ..Default::default()
        };
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("/nonexistent/rfu.der"));
    }
}
