// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod hostname;

use std::{env, fs, process::ExitCode};

use anyhow::Context;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use fluent_bit_config::{assemble, yaml::LogsYaml, LogForwardConfig};

const LOGS_CONFIG_FILE_ENV: &str = "NRIA_LOGS_CONFIG_FILE";
const ENTITY_GUID_ENV: &str = "NRIA_ENTITY_GUID";

pub fn main() -> ExitCode {
    let log_level = env::var("NRIA_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the rendered configuration, logs go to stderr
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    debug!("Logging subsystem enabled");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Log forwarding will not be enabled: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let logs_config = LogForwardConfig::from_env()?;

    let config_path = env::var(LOGS_CONFIG_FILE_ENV)
        .with_context(|| format!("{LOGS_CONFIG_FILE_ENV} environment variable is not set"))?;
    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("cannot read logs configuration {config_path}"))?;

    let blocks = LogsYaml::parse(&content)?.into_blocks()?;
    let entity_guid = env::var(ENTITY_GUID_ENV).unwrap_or_default();
    let hostname = hostname::get_hostname();

    let assembly = assemble(&blocks, &logs_config, &entity_guid, &hostname)?;
    for diagnostic in &assembly.diagnostics {
        diagnostic.emit();
    }

    if assembly.config.is_empty() {
        info!("No log sources configured in {}, nothing to forward", config_path);
        return Ok(());
    }

    let rendered = assembly.config.render()?;
    if let Some(external) = &rendered.external {
        info!(
            config_file = %external.config_file,
            parsers_file = %external.parsers_file,
            "Merging external Fluent Bit configuration"
        );
    }
    print!("{}", rendered.document()?);

    info!(
        "Rendered log-forwarder configuration with {} inputs",
        assembly.config.inputs.len()
    );
    Ok(())
}
