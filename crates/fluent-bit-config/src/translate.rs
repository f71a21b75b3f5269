// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-source translation of a [`LogBlock`] into Fluent Bit descriptors.
//!
//! Every source kind lowers to exactly one input section, one record modifier that tags the
//! records with the input kind and the user attributes, and optionally one grep filter. The
//! external kind is a passthrough and yields only the referenced file pair.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{
    is_reserved_attribute, ATTR_FB_INPUT, DEFAULT_SYSLOG_PARSER, GREP_FIELD_SYSLOG,
    GREP_FIELD_SYSTEMD, GREP_FIELD_TAIL, GREP_FIELD_TCP_PLAIN, GREP_FIELD_WINLOG_EVENT_ID,
    TCP_FORMAT_NONE,
};
use crate::diagnostics::Diagnostic;
use crate::error::LogsConfigError;
use crate::model::{
    ExternalConfigRef, FilterDescriptor, FilterKind, GrepRule, InputDescriptor, InputKind,
    InputPlugin, LogBlock, LogSource, SyslogEndpoint, SyslogInput, SyslogMode, SyslogSource,
    TailInput, TcpInput, TcpSource, WinlogSource,
};
use crate::range;

/// Result of translating one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Input {
        input: InputDescriptor,
        filters: Vec<FilterDescriptor>,
    },
    External(ExternalConfigRef),
}

struct UriGrammar {
    syslog: Regex,
    network: Regex,
    unix_socket: Regex,
    tcp: Regex,
}

#[allow(clippy::expect_used)]
fn uri_grammar() -> &'static UriGrammar {
    static GRAMMAR: OnceLock<UriGrammar> = OnceLock::new();
    GRAMMAR.get_or_init(|| UriGrammar {
        syslog: Regex::new(r"^(tcp|udp|unix_tcp|unix_udp)://").expect("syslog regex is valid"),
        network: Regex::new(r"^(?:tcp|udp)://((?:[0-9]{1,3}\.){3}[0-9]{1,3}):([0-9]+)$")
            .expect("network regex is valid"),
        unix_socket: Regex::new(r"^unix_(?:udp|tcp)://(/.*)$").expect("unix socket regex is valid"),
        tcp: Regex::new(r"^tcp://((?:[0-9]{1,3}\.){3}[0-9]{1,3}):([0-9]+)$")
            .expect("tcp regex is valid"),
    })
}

/// Translates one block.
///
/// `db_path` is the Fluent Bit state database shared by the inputs that track read offsets.
/// Non-fatal findings are pushed to `diagnostics`.
pub fn translate(
    block: &LogBlock,
    db_path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Translation, LogsConfigError> {
    validate_block(block)?;

    let (input, filters) = match &block.source {
        LogSource::External(external) => return Ok(Translation::External(external.clone())),
        LogSource::File(file) => parse_file_input(block, file, db_path, diagnostics),
        LogSource::Folder(folder) => parse_folder_input(block, folder, db_path, diagnostics),
        LogSource::Systemd(unit) => parse_systemd_input(block, unit, db_path, diagnostics),
        LogSource::EventLog(channel) => parse_event_log_input(block, channel, db_path, diagnostics),
        LogSource::Syslog(syslog) => parse_syslog_input(block, syslog, diagnostics)?,
        LogSource::Tcp(tcp) => parse_tcp_input(block, tcp, diagnostics)?,
        LogSource::Winlog(winlog) => parse_winlog_input(block, winlog, db_path, diagnostics)?,
    };

    Ok(Translation::Input { input, filters })
}

/// Rejects blocks that would produce an empty or structurally broken section.
fn validate_block(block: &LogBlock) -> Result<(), LogsConfigError> {
    if block.name.trim().is_empty() {
        return Err(LogsConfigError::malformed(&block.name, "missing block name"));
    }

    let source = match &block.source {
        LogSource::File(value)
        | LogSource::Folder(value)
        | LogSource::Systemd(value)
        | LogSource::EventLog(value) => Some(value.as_str()),
        LogSource::Winlog(winlog) => Some(winlog.channel.as_str()),
        LogSource::Syslog(_) | LogSource::Tcp(_) | LogSource::External(_) => None,
    };
    if source.is_some_and(|value| value.trim().is_empty()) {
        return Err(LogsConfigError::malformed(&block.name, "empty log source"));
    }

    // Every value ends up on a single `Key value` line of the rendered file
    let mut values = vec![block.name.as_str()];
    values.extend(source);
    values.extend(block.pattern.as_deref());
    match &block.source {
        LogSource::Syslog(syslog) => {
            values.push(&syslog.uri);
            values.extend(syslog.parser.as_deref());
            values.extend(syslog.unix_permissions.as_deref());
        }
        LogSource::Tcp(tcp) => {
            values.push(&tcp.uri);
            values.extend(tcp.format.as_deref());
            values.extend(tcp.separator.as_deref());
        }
        LogSource::External(external) => {
            values.push(&external.config_file);
            values.push(&external.parsers_file);
        }
        _ => {}
    }
    for (key, value) in &block.attributes {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(LogsConfigError::malformed(
                &block.name,
                "attribute keys must be non-empty and contain no whitespace",
            ));
        }
        values.push(key);
        values.push(value);
    }
    if values
        .iter()
        .any(|value| value.chars().any(char::is_control))
    {
        return Err(LogsConfigError::malformed(
            &block.name,
            "values must not contain control characters",
        ));
    }

    Ok(())
}

fn parse_file_input(
    block: &LogBlock,
    file: &str,
    db_path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> (InputDescriptor, Vec<FilterDescriptor>) {
    let input = new_tail_input(block, file.to_string(), db_path);
    let filters = tagged_filters(block, InputKind::Tail, Some(GREP_FIELD_TAIL), diagnostics);
    (input, filters)
}

// /path/to/folder results in /path/to/folder/*
fn parse_folder_input(
    block: &LogBlock,
    folder: &str,
    db_path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> (InputDescriptor, Vec<FilterDescriptor>) {
    let input = new_tail_input(block, folder_glob(folder), db_path);
    let filters = tagged_filters(block, InputKind::Tail, Some(GREP_FIELD_TAIL), diagnostics);
    (input, filters)
}

fn parse_systemd_input(
    block: &LogBlock,
    unit: &str,
    db_path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> (InputDescriptor, Vec<FilterDescriptor>) {
    let input = InputDescriptor {
        tag: block.name.clone(),
        db: Some(db_path.to_path_buf()),
        plugin: InputPlugin::Systemd {
            filter: format!("_SYSTEMD_UNIT={unit}.service"),
        },
    };
    let filters = tagged_filters(
        block,
        InputKind::Systemd,
        Some(GREP_FIELD_SYSTEMD),
        diagnostics,
    );
    (input, filters)
}

fn parse_event_log_input(
    block: &LogBlock,
    channel: &str,
    db_path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> (InputDescriptor, Vec<FilterDescriptor>) {
    if block.pattern().is_some() {
        diagnostics.push(Diagnostic::PatternIgnored {
            block: block.name.clone(),
            reason: "eventlog sources do not support pattern matching",
        });
    }
    let input = new_winlog_input(block, channel, db_path);
    let filters = tagged_filters(block, InputKind::Winlog, None, diagnostics);
    (input, filters)
}

fn parse_winlog_input(
    block: &LogBlock,
    winlog: &WinlogSource,
    db_path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(InputDescriptor, Vec<FilterDescriptor>), LogsConfigError> {
    let input = new_winlog_input(block, &winlog.channel, db_path);
    let mut filters = tagged_filters(block, InputKind::Winlog, None, diagnostics);

    if !winlog.collect_event_ids.is_empty() || !winlog.exclude_event_ids.is_empty() {
        let include = range::compile(&winlog.collect_event_ids)?;
        let exclude = range::compile(&winlog.exclude_event_ids)?;
        filters.push(new_grep_filter(
            &block.name,
            GREP_FIELD_WINLOG_EVENT_ID,
            include.as_str(),
            exclude.as_str(),
        ));
    }

    Ok((input, filters))
}

fn parse_syslog_input(
    block: &LogBlock,
    syslog: &SyslogSource,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(InputDescriptor, Vec<FilterDescriptor>), LogsConfigError> {
    let input = new_syslog_input(block, syslog)?;
    let filters = tagged_filters(
        block,
        InputKind::Syslog,
        Some(GREP_FIELD_SYSLOG),
        diagnostics,
    );
    Ok((input, filters))
}

fn parse_tcp_input(
    block: &LogBlock,
    tcp: &TcpSource,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(InputDescriptor, Vec<FilterDescriptor>), LogsConfigError> {
    let input = new_tcp_input(block, tcp)?;

    // Only raw lines carry a plain-text field the pattern can be matched against
    let grep_field = if is_plain_tcp(tcp) {
        Some(GREP_FIELD_TCP_PLAIN)
    } else {
        if block.pattern().is_some() {
            diagnostics.push(Diagnostic::PatternIgnored {
                block: block.name.clone(),
                reason: "pattern matching is only supported for tcp format 'none'",
            });
        }
        None
    };
    let filters = tagged_filters(block, InputKind::Tcp, grep_field, diagnostics);
    Ok((input, filters))
}

fn new_tail_input(block: &LogBlock, path: String, db_path: &Path) -> InputDescriptor {
    InputDescriptor {
        tag: block.name.clone(),
        db: Some(db_path.to_path_buf()),
        plugin: InputPlugin::Tail(TailInput {
            path,
            buffer_max_size: format!("{}k", block.buffer_size_kb()),
            skip_long_lines: true,
        }),
    }
}

fn new_winlog_input(block: &LogBlock, channel: &str, db_path: &Path) -> InputDescriptor {
    InputDescriptor {
        tag: block.name.clone(),
        db: Some(db_path.to_path_buf()),
        plugin: InputPlugin::Winlog {
            channels: channel.to_string(),
        },
    }
}

fn new_syslog_input(
    block: &LogBlock,
    syslog: &SyslogSource,
) -> Result<InputDescriptor, LogsConfigError> {
    let grammar = uri_grammar();
    let uri = syslog.uri.as_str();

    let mode = grammar
        .syslog
        .captures(uri)
        .and_then(|captures| captures.get(1))
        .and_then(|scheme| SyslogMode::from_scheme(scheme.as_str()))
        .ok_or_else(|| LogsConfigError::invalid_uri("syslog", uri))?;

    let endpoint = if mode.is_unix_socket() {
        let captures = grammar
            .unix_socket
            .captures(uri)
            .ok_or_else(|| LogsConfigError::invalid_uri("syslog", uri))?;
        SyslogEndpoint::UnixSocket {
            path: captures[1].to_string(),
            permissions: syslog
                .unix_permissions
                .clone()
                .filter(|perm| !perm.is_empty()),
        }
    } else {
        let (listen, port) = parse_listen_port(&grammar.network, uri)
            .ok_or_else(|| LogsConfigError::invalid_uri("syslog", uri))?;
        SyslogEndpoint::Network { listen, port }
    };

    let buffer = format!("{}k", block.buffer_size_kb());
    let (buffer_max_size, buffer_chunk_size) = if mode.is_datagram() {
        (None, Some(buffer))
    } else {
        (Some(buffer), None)
    };

    Ok(InputDescriptor {
        tag: block.name.clone(),
        db: None,
        plugin: InputPlugin::Syslog(SyslogInput {
            mode,
            endpoint,
            parser: syslog
                .parser
                .clone()
                .filter(|parser| !parser.is_empty())
                .unwrap_or_else(|| DEFAULT_SYSLOG_PARSER.to_string()),
            buffer_max_size,
            buffer_chunk_size,
        }),
    })
}

fn new_tcp_input(block: &LogBlock, tcp: &TcpSource) -> Result<InputDescriptor, LogsConfigError> {
    let (listen, port) = parse_listen_port(&uri_grammar().tcp, &tcp.uri)
        .ok_or_else(|| LogsConfigError::invalid_uri("tcp", &tcp.uri))?;

    let separator = if is_plain_tcp(tcp) {
        tcp.separator.as_deref().map(unescape_separator)
    } else {
        None
    };

    Ok(InputDescriptor {
        tag: block.name.clone(),
        db: None,
        plugin: InputPlugin::Tcp(TcpInput {
            listen,
            port,
            format: tcp.format.clone().filter(|format| !format.is_empty()),
            separator,
            buffer_size: block.buffer_size_kb(),
        }),
    })
}

fn is_plain_tcp(tcp: &TcpSource) -> bool {
    tcp.format.as_deref() == Some(TCP_FORMAT_NONE)
}

/// Collapses doubled backslashes so `\\n` from YAML reaches Fluent Bit as the `\n` escape.
fn unescape_separator(separator: &str) -> String {
    separator.replace(r"\\", r"\")
}

fn parse_listen_port(grammar: &Regex, uri: &str) -> Option<(String, u16)> {
    let captures = grammar.captures(uri)?;
    let port = captures[2].parse::<u16>().ok()?;
    Some((captures[1].to_string(), port))
}

fn folder_glob(folder: &str) -> String {
    let trimmed = folder.trim_end_matches(['/', '\\']);
    format!("{trimmed}/*")
}

/// Record modifier for the block plus the optional pattern grep on `grep_field`.
fn tagged_filters(
    block: &LogBlock,
    kind: InputKind,
    grep_field: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<FilterDescriptor> {
    let mut filters = vec![new_record_modifier_filter(block, kind, diagnostics)];
    if let (Some(field), Some(pattern)) = (grep_field, block.pattern()) {
        filters.push(new_grep_filter(&block.name, field, Some(pattern), None));
    }
    filters
}

fn new_record_modifier_filter(
    block: &LogBlock,
    kind: InputKind,
    diagnostics: &mut Vec<Diagnostic>,
) -> FilterDescriptor {
    let mut records = BTreeMap::new();
    records.insert(ATTR_FB_INPUT.to_string(), kind.as_str().to_string());

    for (key, value) in &block.attributes {
        if is_reserved_attribute(key) {
            diagnostics.push(Diagnostic::ReservedAttributeIgnored {
                block: block.name.clone(),
                attribute: key.clone(),
            });
            continue;
        }
        records.insert(key.clone(), value.clone());
    }

    FilterDescriptor {
        match_tag: block.name.clone(),
        kind: FilterKind::RecordModifier { records },
    }
}

fn new_grep_filter(
    tag: &str,
    field: &str,
    include: Option<&str>,
    exclude: Option<&str>,
) -> FilterDescriptor {
    let rule = |regex: &str| GrepRule {
        field: field.to_string(),
        regex: regex.to_string(),
    };
    FilterDescriptor {
        match_tag: tag.to_string(),
        kind: FilterKind::Grep {
            include: include.filter(|r| !r.is_empty()).map(rule),
            exclude: exclude.filter(|r| !r.is_empty()).map(rule),
        },
    }
}
