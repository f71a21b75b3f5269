// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

use crate::error::LogsConfigError;

pub const DEFAULT_LOGS_HOME_DIR: &str = "/var/db/newrelic-infra/newrelic-integrations/logging";

/// Proxy settings copied verbatim into the output plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub ignore_system_proxy: bool,
    pub proxy: Option<String>,
    pub ca_bundle_file: Option<String>,
    pub ca_bundle_dir: Option<String>,
    pub validate_certs: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            ignore_system_proxy: false,
            proxy: None,
            ca_bundle_file: None,
            ca_bundle_dir: None,
            validate_certs: true,
        }
    }
}

/// Agent-side settings shared by every log block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogForwardConfig {
    /// Directory holding the Fluent Bit state database
    pub home_dir: PathBuf,
    /// License key, also used to detect the account region
    pub license: String,
    /// Ship to the staging ingest endpoint
    pub is_staging: bool,
    pub proxy: ProxyConfig,
}

impl Default for LogForwardConfig {
    fn default() -> Self {
        Self {
            home_dir: PathBuf::from(DEFAULT_LOGS_HOME_DIR),
            license: String::new(),
            is_staging: false,
            proxy: ProxyConfig::default(),
        }
    }
}

impl LogForwardConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, LogsConfigError> {
        let home_dir = non_empty_var("NRIA_LOGS_HOME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_HOME_DIR));
        let license = env::var("NRIA_LICENSE_KEY")
            .map(|val| val.trim().to_string())
            .unwrap_or_default();
        let is_staging = bool_var("NRIA_STAGING").unwrap_or(false);

        let proxy = ProxyConfig {
            ignore_system_proxy: bool_var("NRIA_IGNORE_SYSTEM_PROXY").unwrap_or(false),
            proxy: non_empty_var("NRIA_PROXY").or_else(|| non_empty_var("HTTPS_PROXY")),
            ca_bundle_file: non_empty_var("NRIA_CA_BUNDLE_FILE"),
            ca_bundle_dir: non_empty_var("NRIA_CA_BUNDLE_DIR"),
            validate_certs: bool_var("NRIA_PROXY_VALIDATE_CERTIFICATES").unwrap_or(true),
        };

        let config = Self {
            home_dir,
            license,
            is_staging,
            proxy,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LogsConfigError> {
        if self.license.trim().is_empty() {
            return Err(LogsConfigError::InvalidConfig(
                "NRIA_LICENSE_KEY cannot be empty".to_string(),
            ));
        }

        if self.home_dir.as_os_str().is_empty() {
            return Err(LogsConfigError::InvalidConfig(
                "NRIA_LOGS_HOME_DIR cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the Fluent Bit state database under the logs home directory.
    pub fn db_path(&self) -> PathBuf {
        self.home_dir.join(crate::constants::FLUENT_BIT_DB_NAME)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn bool_var(key: &str) -> Option<bool> {
    non_empty_var(key).and_then(|val| match val.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => {
            tracing::warn!("Ignoring invalid boolean value '{}' for {}", val, key);
            None
        }
    })
}
