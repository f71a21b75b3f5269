// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Text rendering of a [`FluentBitConfig`] in the Fluent Bit classic configuration format.
//!
//! ```text
//! [INPUT]
//!     Name tail
//!     Path /var/log/app.log
//!     Buffer_Max_Size 128k
//!     Skip_Long_Lines On
//!     Tag log-file
//!     DB /var/db/newrelic-infra/newrelic-integrations/logging/fb.db
//!
//! [FILTER]
//!     Name record_modifier
//!     Match log-file
//!     Record fb.input tail
//!
//! [OUTPUT]
//!     Name newrelic
//!     Match *
//!     licenseKey ${LICENSE}
//! ```
//!
//! Only the keys that apply to a section's plugin are written.

use std::fmt::{self, Write};

use crate::assemble::FluentBitConfig;
use crate::constants::OUTPUT_PLUGIN_NAME;
use crate::error::LogsConfigError;
use crate::model::{
    ExternalConfigRef, FilterDescriptor, FilterKind, InputDescriptor, InputPlugin,
    OutputDescriptor, SyslogEndpoint,
};

/// Rendered configuration text plus the external files the supervisor must merge in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub external: Option<ExternalConfigRef>,
}

impl FluentBitConfig {
    pub fn render(&self) -> Result<Rendered, LogsConfigError> {
        let mut text = String::new();
        write_config(&mut text, self)?;
        Ok(Rendered {
            text,
            external: self.external.clone(),
        })
    }
}

impl Rendered {
    /// Single Fluent Bit file: the rendered sections, then the directives that merge the
    /// external configuration pair when one is present.
    ///
    /// ```text
    /// [SERVICE]
    ///     Parsers_File /etc/fb/parsers.conf
    ///
    /// @INCLUDE /etc/fb/fluent-bit.conf
    /// ```
    pub fn document(&self) -> Result<String, LogsConfigError> {
        let mut document = self.text.clone();
        if let Some(external) = &self.external {
            write_external(&mut document, external)?;
        }
        Ok(document)
    }
}

fn write_config(out: &mut impl Write, config: &FluentBitConfig) -> fmt::Result {
    for input in &config.inputs {
        write_input(out, input)?;
    }
    for filter in &config.filters {
        write_filter(out, filter)?;
    }
    if let Some(output) = &config.output {
        write_output(out, output)?;
    }
    Ok(())
}

fn field(out: &mut impl Write, key: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(out, "    {key} {value}")
}

fn optional_field(out: &mut impl Write, key: &str, value: Option<&str>) -> fmt::Result {
    match value {
        Some(value) if !value.is_empty() => field(out, key, value),
        _ => Ok(()),
    }
}

fn write_input(out: &mut impl Write, input: &InputDescriptor) -> fmt::Result {
    writeln!(out, "[INPUT]")?;
    field(out, "Name", input.kind())?;

    match &input.plugin {
        InputPlugin::Tail(tail) => {
            field(out, "Path", &tail.path)?;
            field(out, "Buffer_Max_Size", &tail.buffer_max_size)?;
            if tail.skip_long_lines {
                field(out, "Skip_Long_Lines", "On")?;
            }
        }
        InputPlugin::Systemd { filter } => field(out, "Systemd_Filter", filter)?,
        InputPlugin::Winlog { channels } => field(out, "Channels", channels)?,
        InputPlugin::Syslog(syslog) => {
            field(out, "Mode", syslog.mode.as_str())?;
            match &syslog.endpoint {
                SyslogEndpoint::Network { listen, port } => {
                    field(out, "Listen", listen)?;
                    field(out, "Port", port)?;
                }
                SyslogEndpoint::UnixSocket { path, permissions } => {
                    field(out, "Path", path)?;
                    optional_field(out, "Unix_Perm", permissions.as_deref())?;
                }
            }
            field(out, "Parser", &syslog.parser)?;
            optional_field(out, "Buffer_Max_Size", syslog.buffer_max_size.as_deref())?;
            optional_field(out, "Buffer_Chunk_Size", syslog.buffer_chunk_size.as_deref())?;
        }
        InputPlugin::Tcp(tcp) => {
            field(out, "Listen", &tcp.listen)?;
            field(out, "Port", tcp.port)?;
            optional_field(out, "Format", tcp.format.as_deref())?;
            optional_field(out, "Separator", tcp.separator.as_deref())?;
            field(out, "Buffer_Size", tcp.buffer_size)?;
        }
    }

    field(out, "Tag", &input.tag)?;
    if let Some(db) = &input.db {
        field(out, "DB", db.display())?;
    }
    writeln!(out)
}

fn write_filter(out: &mut impl Write, filter: &FilterDescriptor) -> fmt::Result {
    writeln!(out, "[FILTER]")?;
    field(out, "Name", filter.plugin_name())?;
    field(out, "Match", &filter.match_tag)?;

    match &filter.kind {
        FilterKind::Grep { include, exclude } => {
            if let Some(rule) = include {
                field(out, "Regex", rule)?;
            }
            if let Some(rule) = exclude {
                field(out, "Exclude", rule)?;
            }
        }
        FilterKind::RecordModifier { records } => {
            for (key, value) in records {
                writeln!(out, "    Record {key} {value}")?;
            }
        }
    }
    writeln!(out)
}

fn write_output(out: &mut impl Write, output: &OutputDescriptor) -> fmt::Result {
    writeln!(out, "[OUTPUT]")?;
    field(out, "Name", OUTPUT_PLUGIN_NAME)?;
    field(out, "Match", &output.match_tag)?;
    field(out, "licenseKey", &output.license_key)?;
    optional_field(out, "endpoint", output.endpoint.url())?;
    optional_field(out, "proxy", output.proxy.proxy.as_deref())?;
    field(out, "ignoreSystemProxy", output.proxy.ignore_system_proxy)?;
    optional_field(out, "caBundleFile", output.proxy.ca_bundle_file.as_deref())?;
    optional_field(out, "caBundleDir", output.proxy.ca_bundle_dir.as_deref())?;
    field(out, "validateProxyCerts", output.proxy.validate_certs)
}

fn write_external(out: &mut String, external: &ExternalConfigRef) -> fmt::Result {
    if !out.is_empty() && !out.ends_with("\n\n") {
        writeln!(out)?;
    }
    writeln!(out, "[SERVICE]")?;
    optional_field(out, "Parsers_File", Some(&external.parsers_file))?;
    writeln!(out)?;
    if !external.config_file.is_empty() {
        writeln!(out, "@INCLUDE {}", external.config_file)?;
    }
    Ok(())
}
