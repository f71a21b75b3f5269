// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Typed model of the log-forwarder compiler.
//!
//! The input side is [`LogBlock`], one user-declared log source whose kind is fixed once at
//! decode time by [`LogSource`]. The output side is the set of Fluent Bit descriptors
//! ([`InputDescriptor`], [`FilterDescriptor`], [`OutputDescriptor`]) plus an optional
//! [`ExternalConfigRef`] that points at user-supplied native configuration files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::config::ProxyConfig;

/// Buffer size in kilobytes used when a block does not set `max_line_kb`.
pub const DEFAULT_BUFFER_MAX_SIZE_KB: u32 = 128;

/// One user-declared log source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBlock {
    pub name: String,
    pub source: LogSource,
    pub pattern: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub max_line_kb: Option<u32>,
}

impl LogBlock {
    pub fn new(name: impl Into<String>, source: LogSource) -> Self {
        Self {
            name: name.into(),
            source,
            pattern: None,
            attributes: BTreeMap::new(),
            max_line_kb: None,
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_max_line_kb(mut self, max_line_kb: u32) -> Self {
        self.max_line_kb = Some(max_line_kb);
        self
    }

    /// Non-empty grep pattern, if any.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// Line buffer size in kilobytes, falling back to the default when unset or zero.
    pub fn buffer_size_kb(&self) -> u32 {
        match self.max_line_kb {
            Some(kb) if kb > 0 => kb,
            _ => DEFAULT_BUFFER_MAX_SIZE_KB,
        }
    }
}

/// The single source kind of a [`LogBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    File(String),
    Folder(String),
    Systemd(String),
    EventLog(String),
    Syslog(SyslogSource),
    Tcp(TcpSource),
    Winlog(WinlogSource),
    External(ExternalConfigRef),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyslogSource {
    pub uri: String,
    pub parser: Option<String>,
    pub unix_permissions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcpSource {
    pub uri: String,
    pub format: Option<String>,
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinlogSource {
    pub channel: String,
    pub collect_event_ids: Vec<String>,
    pub exclude_event_ids: Vec<String>,
}

/// Native Fluent Bit configuration files merged verbatim by the supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalConfigRef {
    pub config_file: String,
    pub parsers_file: String,
}

/// Fluent Bit input plugin kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Tail,
    Systemd,
    Winlog,
    Syslog,
    Tcp,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Tail => "tail",
            InputKind::Systemd => "systemd",
            InputKind::Winlog => "winlog",
            InputKind::Syslog => "syslog",
            InputKind::Tcp => "tcp",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `[INPUT]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub tag: String,
    pub db: Option<PathBuf>,
    pub plugin: InputPlugin,
}

impl InputDescriptor {
    pub fn kind(&self) -> InputKind {
        match self.plugin {
            InputPlugin::Tail(_) => InputKind::Tail,
            InputPlugin::Systemd { .. } => InputKind::Systemd,
            InputPlugin::Winlog { .. } => InputKind::Winlog,
            InputPlugin::Syslog(_) => InputKind::Syslog,
            InputPlugin::Tcp(_) => InputKind::Tcp,
        }
    }
}

/// Kind-specific fields of an input section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPlugin {
    Tail(TailInput),
    Systemd { filter: String },
    Winlog { channels: String },
    Syslog(SyslogInput),
    Tcp(TcpInput),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailInput {
    pub path: String,
    pub buffer_max_size: String,
    pub skip_long_lines: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyslogMode {
    Tcp,
    Udp,
    UnixTcp,
    UnixUdp,
}

impl SyslogMode {
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "tcp" => Some(SyslogMode::Tcp),
            "udp" => Some(SyslogMode::Udp),
            "unix_tcp" => Some(SyslogMode::UnixTcp),
            "unix_udp" => Some(SyslogMode::UnixUdp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyslogMode::Tcp => "tcp",
            SyslogMode::Udp => "udp",
            SyslogMode::UnixTcp => "unix_tcp",
            SyslogMode::UnixUdp => "unix_udp",
        }
    }

    /// Datagram modes size their buffer by chunk instead of by maximum.
    pub fn is_datagram(self) -> bool {
        matches!(self, SyslogMode::Udp | SyslogMode::UnixUdp)
    }

    pub fn is_unix_socket(self) -> bool {
        matches!(self, SyslogMode::UnixTcp | SyslogMode::UnixUdp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyslogEndpoint {
    Network {
        listen: String,
        port: u16,
    },
    UnixSocket {
        path: String,
        permissions: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogInput {
    pub mode: SyslogMode,
    pub endpoint: SyslogEndpoint,
    pub parser: String,
    pub buffer_max_size: Option<String>,
    pub buffer_chunk_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpInput {
    pub listen: String,
    pub port: u16,
    pub format: Option<String>,
    pub separator: Option<String>,
    /// Plain kilobyte count: the tcp plugin takes `Buffer_Size` without a unit suffix.
    pub buffer_size: u32,
}

/// One `[FILTER]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub match_tag: String,
    pub kind: FilterKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Grep {
        include: Option<GrepRule>,
        exclude: Option<GrepRule>,
    },
    RecordModifier {
        records: BTreeMap<String, String>,
    },
}

impl FilterDescriptor {
    pub fn plugin_name(&self) -> &'static str {
        match self.kind {
            FilterKind::Grep { .. } => "grep",
            FilterKind::RecordModifier { .. } => "record_modifier",
        }
    }

    pub fn is_grep(&self) -> bool {
        matches!(self.kind, FilterKind::Grep { .. })
    }

    pub fn records(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            FilterKind::RecordModifier { records } => Some(records),
            FilterKind::Grep { .. } => None,
        }
    }
}

/// `<field> <regex>` pair of a grep filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepRule {
    pub field: String,
    pub regex: String,
}

impl fmt::Display for GrepRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.regex)
    }
}

/// Ingest endpoint the output plugin ships to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Production US endpoint, implied by the plugin when no endpoint is set.
    Default,
    Staging,
    Eu,
}

impl Endpoint {
    pub fn url(self) -> Option<&'static str> {
        match self {
            Endpoint::Default => None,
            Endpoint::Staging => Some(crate::constants::STAGING_ENDPOINT),
            Endpoint::Eu => Some(crate::constants::EU_ENDPOINT),
        }
    }
}

/// The single `[OUTPUT]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub match_tag: String,
    pub license_key: String,
    pub endpoint: Endpoint,
    pub proxy: ProxyConfig,
}
