// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Assembly of the whole Fluent Bit configuration from the ordered block list.
//!
//! ```text
//!   LogBlock, LogBlock, ...
//!         │ translate (fail-fast)
//!         v
//!   inputs + filters + first external ref
//!         │
//!         v
//!   global record_modifier (Match *)  +  newrelic output
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::LogForwardConfig;
use crate::constants::{
    ATTR_ENTITY_GUID, ATTR_HOSTNAME, ATTR_PLUGIN_TYPE, MATCH_ALL, PLUGIN_TYPE_SOURCE,
};
use crate::diagnostics::Diagnostic;
use crate::error::LogsConfigError;
use crate::license;
use crate::model::{
    Endpoint, ExternalConfigRef, FilterDescriptor, FilterKind, InputDescriptor, LogBlock,
    OutputDescriptor,
};
use crate::translate::{translate, Translation};

/// The assembled Fluent Bit configuration model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FluentBitConfig {
    pub inputs: Vec<InputDescriptor>,
    pub filters: Vec<FilterDescriptor>,
    pub external: Option<ExternalConfigRef>,
    pub output: Option<OutputDescriptor>,
}

impl FluentBitConfig {
    /// Nothing to forward: no inputs and no external configuration.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.external.is_none()
    }
}

/// A compiled configuration together with the non-fatal findings collected on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub config: FluentBitConfig,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the configuration for `blocks`.
///
/// The first block that fails to translate aborts the whole pass; no partial configuration is
/// ever returned. An empty block list, or one that produces neither inputs nor an external
/// reference, yields an empty configuration.
pub fn assemble(
    blocks: &[LogBlock],
    logs_config: &LogForwardConfig,
    entity_guid: &str,
    hostname: &str,
) -> Result<Assembly, LogsConfigError> {
    let db_path = logs_config.db_path();
    let mut config = FluentBitConfig::default();
    let mut diagnostics = Vec::new();

    for block in blocks {
        match translate(block, &db_path, &mut diagnostics)? {
            Translation::Input { input, filters } => {
                config.inputs.push(input);
                config.filters.extend(filters);
            }
            Translation::External(external) => {
                if config.external.is_some() {
                    diagnostics.push(Diagnostic::DuplicateExternalConfig {
                        block: block.name.clone(),
                    });
                } else {
                    config.external = Some(external);
                }
            }
        }
    }

    if config.is_empty() {
        debug!("No log inputs configured, nothing to forward");
        return Ok(Assembly {
            config,
            diagnostics,
        });
    }

    // Common attributes for every forwarded record
    config
        .filters
        .push(global_record_modifier(entity_guid, hostname));
    config.output = Some(new_output(logs_config));

    debug!(
        "Assembled log-forwarder config with {} inputs and {} filters",
        config.inputs.len(),
        config.filters.len()
    );

    Ok(Assembly {
        config,
        diagnostics,
    })
}

fn global_record_modifier(entity_guid: &str, hostname: &str) -> FilterDescriptor {
    let records = BTreeMap::from([
        (ATTR_ENTITY_GUID.to_string(), entity_guid.to_string()),
        (ATTR_PLUGIN_TYPE.to_string(), PLUGIN_TYPE_SOURCE.to_string()),
        (ATTR_HOSTNAME.to_string(), hostname.to_string()),
    ]);
    FilterDescriptor {
        match_tag: MATCH_ALL.to_string(),
        kind: FilterKind::RecordModifier { records },
    }
}

fn new_output(logs_config: &LogForwardConfig) -> OutputDescriptor {
    OutputDescriptor {
        match_tag: MATCH_ALL.to_string(),
        license_key: logs_config.license.clone(),
        endpoint: select_endpoint(
            logs_config.is_staging,
            license::is_region_eu(&logs_config.license),
        ),
        proxy: logs_config.proxy.clone(),
    }
}

/// EU region wins over the staging flag, which wins over the default endpoint.
pub fn select_endpoint(is_staging: bool, is_eu: bool) -> Endpoint {
    if is_eu {
        Endpoint::Eu
    } else if is_staging {
        Endpoint::Staging
    } else {
        Endpoint::Default
    }
}
