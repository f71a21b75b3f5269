// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Non-fatal findings produced while compiling a configuration.
//!
//! The compiler never logs on its own; it hands these back with the result so callers decide
//! where they go. [`Diagnostic::emit`] forwards one to `tracing` at warn level.

use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A second external Fluent Bit configuration was declared; only the first one is kept.
    DuplicateExternalConfig { block: String },
    /// A user attribute used a reserved key and was dropped.
    ReservedAttributeIgnored { block: String, attribute: String },
    /// A pattern was set on a source that cannot be filtered by it.
    PatternIgnored { block: String, reason: &'static str },
}

impl Diagnostic {
    pub fn block(&self) -> &str {
        match self {
            Diagnostic::DuplicateExternalConfig { block }
            | Diagnostic::ReservedAttributeIgnored { block, .. }
            | Diagnostic::PatternIgnored { block, .. } => block,
        }
    }

    pub fn emit(&self) {
        match self {
            Diagnostic::ReservedAttributeIgnored { block, attribute } => {
                warn!(block = %block, attribute = %attribute, "{}", self);
            }
            _ => warn!(block = %self.block(), "{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateExternalConfig { .. } => write!(
                f,
                "External Fluent Bit configuration specified more than once. Only first one is considered, please remove any duplicates from the configuration."
            ),
            Diagnostic::ReservedAttributeIgnored { .. } => write!(
                f,
                "attribute name is a reserved keyword and will be ignored, please use a different name"
            ),
            Diagnostic::PatternIgnored { reason, .. } => {
                write!(f, "pattern is ignored: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_block_name() {
        let diagnostic = Diagnostic::ReservedAttributeIgnored {
            block: "nginx".to_string(),
            attribute: "hostname".to_string(),
        };
        assert_eq!(diagnostic.block(), "nginx");
    }

    #[test]
    #[traced_test]
    fn test_emit_duplicate_external_config() {
        Diagnostic::DuplicateExternalConfig {
            block: "fb-second".to_string(),
        }
        .emit();

        assert!(logs_contain("specified more than once"));
        assert!(logs_contain("fb-second"));
    }

    #[test]
    #[traced_test]
    fn test_emit_reserved_attribute() {
        Diagnostic::ReservedAttributeIgnored {
            block: "nginx".to_string(),
            attribute: "fb.input".to_string(),
        }
        .emit();

        assert!(logs_contain("reserved keyword"));
        assert!(logs_contain("fb.input"));
    }
}
