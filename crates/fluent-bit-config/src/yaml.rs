// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! YAML model of the user-facing logs configuration.
//!
//! ```yaml
//! logs:
//!   - name: nginx
//!     file: /var/log/nginx/access.log
//!     pattern: 'GET|POST'
//!     attributes:
//!       team: web
//!   - name: security
//!     winlog:
//!       channel: Security
//!       collect-eventids: ["4624", "4700-4799"]
//!   - name: external
//!     fluentbit:
//!       config_file: /etc/fluent-bit/custom.conf
//!       parsers_file: /etc/fluent-bit/parsers.conf
//! ```
//!
//! Every raw block is decoded once into a [`LogBlock`]; the source kind is decided here and
//! never re-inspected downstream.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::LogsConfigError;
use crate::model::{
    ExternalConfigRef, LogBlock, LogSource, SyslogSource, TcpSource, WinlogSource,
};

/// Top-level document of a logs configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogsYaml {
    pub logs: Vec<RawLogBlock>,
}

/// One entry of the `logs` list as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawLogBlock {
    pub name: String,
    pub file: Option<String>,
    pub max_line_kb: Option<u32>,
    pub folder: Option<String>,
    pub systemd: Option<String>,
    pub eventlog: Option<String>,
    pub pattern: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub syslog: Option<RawSyslog>,
    pub tcp: Option<RawTcp>,
    pub fluentbit: Option<RawExternal>,
    pub winlog: Option<RawWinlog>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSyslog {
    pub uri: String,
    pub parser: Option<String>,
    pub unix_permissions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawTcp {
    pub uri: String,
    pub format: Option<String>,
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawExternal {
    pub config_file: String,
    pub parsers_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawWinlog {
    pub channel: String,
    #[serde(rename = "collect-eventids")]
    pub collect_event_ids: Vec<String>,
    #[serde(rename = "exclude-eventids")]
    pub exclude_event_ids: Vec<String>,
}

impl LogsYaml {
    pub fn parse(content: &str) -> Result<Self, LogsConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Decodes every raw block, stopping at the first malformed one.
    pub fn into_blocks(self) -> Result<Vec<LogBlock>, LogsConfigError> {
        self.logs.into_iter().map(LogBlock::try_from).collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<RawLogBlock> for LogBlock {
    type Error = LogsConfigError;

    fn try_from(raw: RawLogBlock) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(LogsConfigError::malformed(&raw.name, "missing block name"));
        }

        let source = if let Some(external) = raw.fluentbit {
            // External configuration makes every other source field irrelevant
            LogSource::External(ExternalConfigRef {
                config_file: external.config_file,
                parsers_file: external.parsers_file,
            })
        } else {
            let mut sources: Vec<LogSource> = [
                non_empty(raw.file).map(LogSource::File),
                non_empty(raw.folder).map(LogSource::Folder),
                non_empty(raw.systemd).map(LogSource::Systemd),
                non_empty(raw.eventlog).map(LogSource::EventLog),
                raw.syslog.map(|s| {
                    LogSource::Syslog(SyslogSource {
                        uri: s.uri,
                        parser: s.parser,
                        unix_permissions: s.unix_permissions,
                    })
                }),
                raw.tcp.map(|t| {
                    LogSource::Tcp(TcpSource {
                        uri: t.uri,
                        format: t.format,
                        separator: t.separator,
                    })
                }),
                raw.winlog.map(|w| {
                    LogSource::Winlog(WinlogSource {
                        channel: w.channel,
                        collect_event_ids: w.collect_event_ids,
                        exclude_event_ids: w.exclude_event_ids,
                    })
                }),
            ]
            .into_iter()
            .flatten()
            .collect();

            match sources.len() {
                1 => sources.remove(0),
                0 => {
                    return Err(LogsConfigError::malformed(
                        &raw.name,
                        "no log source declared",
                    ))
                }
                _ => {
                    return Err(LogsConfigError::malformed(
                        &raw.name,
                        "more than one log source declared",
                    ))
                }
            }
        };

        Ok(LogBlock {
            name: raw.name,
            source,
            pattern: non_empty(raw.pattern),
            attributes: raw.attributes,
            max_line_kb: raw.max_line_kb,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(content: &str) -> Result<Vec<LogBlock>, LogsConfigError> {
        LogsYaml::parse(content)?.into_blocks()
    }

    #[test]
    fn test_decode_all_sources() {
        let blocks = decode(
            r#"
logs:
  - name: file
    file: /var/log/app.log
    max_line_kb: 256
    pattern: ERROR
    attributes:
      team: platform
  - name: folder
    folder: /var/log/app
  - name: service
    systemd: cron
  - name: app-events
    eventlog: Application
  - name: syslog
    syslog:
      uri: udp://127.0.0.1:5140
      parser: rfc5424
  - name: tcp
    tcp:
      uri: tcp://0.0.0.0:9000
      format: none
      separator: \\n
  - name: security
    winlog:
      channel: Security
      collect-eventids: ["4624", "4700-4799"]
      exclude-eventids: ["4701"]
  - name: external
    fluentbit:
      config_file: /etc/fb/custom.conf
      parsers_file: /etc/fb/parsers.conf
"#,
        )
        .unwrap();

        assert_eq!(blocks.len(), 8);
        assert_eq!(blocks[0].source, LogSource::File("/var/log/app.log".into()));
        assert_eq!(blocks[0].max_line_kb, Some(256));
        assert_eq!(blocks[0].pattern(), Some("ERROR"));
        assert_eq!(
            blocks[0].attributes.get("team"),
            Some(&"platform".to_string())
        );
        assert_eq!(blocks[1].source, LogSource::Folder("/var/log/app".into()));
        assert_eq!(blocks[2].source, LogSource::Systemd("cron".into()));
        assert_eq!(blocks[3].source, LogSource::EventLog("Application".into()));
        assert_eq!(
            blocks[4].source,
            LogSource::Syslog(SyslogSource {
                uri: "udp://127.0.0.1:5140".to_string(),
                parser: Some("rfc5424".to_string()),
                unix_permissions: None,
            })
        );
        assert_eq!(
            blocks[5].source,
            LogSource::Tcp(TcpSource {
                uri: "tcp://0.0.0.0:9000".to_string(),
                format: Some("none".to_string()),
                separator: Some(r"\\n".to_string()),
            })
        );
        assert_eq!(
            blocks[6].source,
            LogSource::Winlog(WinlogSource {
                channel: "Security".to_string(),
                collect_event_ids: vec!["4624".to_string(), "4700-4799".to_string()],
                exclude_event_ids: vec!["4701".to_string()],
            })
        );
        assert!(matches!(blocks[7].source, LogSource::External(_)));
    }

    #[test]
    fn test_external_wins_over_other_sources() {
        let blocks = decode(
            r#"
logs:
  - name: mixed
    file: /var/log/app.log
    fluentbit:
      config_file: /etc/fb/custom.conf
      parsers_file: /etc/fb/parsers.conf
"#,
        )
        .unwrap();
        assert_eq!(
            blocks[0].source,
            LogSource::External(ExternalConfigRef {
                config_file: "/etc/fb/custom.conf".to_string(),
                parsers_file: "/etc/fb/parsers.conf".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_source_is_malformed() {
        let result = decode("logs:\n  - name: nothing\n    pattern: x\n");
        assert!(matches!(
            result,
            Err(LogsConfigError::MalformedBlock { ref name, .. }) if name == "nothing"
        ));
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let result = decode("logs:\n  - file: /var/log/app.log\n");
        assert!(matches!(result, Err(LogsConfigError::MalformedBlock { .. })));
    }

    #[test]
    fn test_multiple_sources_are_malformed() {
        let result = decode("logs:\n  - name: both\n    file: /a.log\n    systemd: cron\n");
        assert!(matches!(result, Err(LogsConfigError::MalformedBlock { .. })));
    }

    #[test]
    fn test_empty_document() {
        assert!(decode("logs: []").unwrap().is_empty());
        assert!(decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            LogsYaml::parse("logs: [unterminated"),
            Err(LogsConfigError::Yaml(_))
        ));
    }
}
