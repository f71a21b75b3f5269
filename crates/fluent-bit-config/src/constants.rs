// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

// Output plugin
pub const OUTPUT_PLUGIN_NAME: &str = "newrelic";
pub const EU_ENDPOINT: &str = "https://log-api.eu.newrelic.com/log/v1";
pub const STAGING_ENDPOINT: &str = "https://staging-log-api.newrelic.com/log/v1";

// Fluent Bit state database file, placed under the logs home directory
pub const FLUENT_BIT_DB_NAME: &str = "fb.db";

// Match-all tag used by the global record modifier and the output
pub const MATCH_ALL: &str = "*";

pub const DEFAULT_SYSLOG_PARSER: &str = "rfc3164";
pub const TCP_FORMAT_NONE: &str = "none";

// Reserved record attributes
pub const ATTR_ENTITY_GUID: &str = "entity.guid.INFRA";
pub const ATTR_FB_INPUT: &str = "fb.input";
pub const ATTR_PLUGIN_TYPE: &str = "plugin.type";
pub const ATTR_HOSTNAME: &str = "hostname";

pub const RESERVED_ATTRIBUTES: [&str; 4] = [
    ATTR_ENTITY_GUID,
    ATTR_FB_INPUT,
    ATTR_PLUGIN_TYPE,
    ATTR_HOSTNAME,
];

// Value of `plugin.type` on every forwarded record
pub const PLUGIN_TYPE_SOURCE: &str = "nri-agent";

// Grep fields per input kind
pub const GREP_FIELD_TAIL: &str = "log";
pub const GREP_FIELD_SYSTEMD: &str = "MESSAGE";
pub const GREP_FIELD_SYSLOG: &str = "message";
pub const GREP_FIELD_TCP_PLAIN: &str = "log";
pub const GREP_FIELD_WINLOG_EVENT_ID: &str = "EventID";

pub fn is_reserved_attribute(key: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&key)
}
