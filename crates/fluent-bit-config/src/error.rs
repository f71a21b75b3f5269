// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that abort a log-forwarder configuration pass.
///
/// Every variant is fatal: the caller must refuse to enable log forwarding rather than run
/// with a partial configuration.
#[derive(Debug, thiserror::Error)]
pub enum LogsConfigError {
    #[error("Invalid log integration config for block '{name}': {reason}")]
    MalformedBlock { name: String, reason: String },

    #[error("{source_kind}: wrong uri format {uri}")]
    InvalidUri {
        source_kind: &'static str,
        uri: String,
    },

    #[error("Invalid EventId or range format: '{0}'")]
    InvalidRangeToken(String),

    #[error("Cannot write log-forwarder template: {0}")]
    TemplateRender(#[from] std::fmt::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot decode logs configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LogsConfigError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedBlock {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_uri(source_kind: &'static str, uri: &str) -> Self {
        Self::InvalidUri {
            source_kind,
            uri: uri.to_string(),
        }
    }
}
