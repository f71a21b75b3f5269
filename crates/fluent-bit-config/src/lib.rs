// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log-forwarder configuration compiler.
//!
//! Turns the logical log blocks declared by users into a Fluent Bit configuration:
//!
//! 1. [`yaml`] decodes each raw block into a typed [`LogBlock`]
//! 2. [`translate`] lowers one block into an input and its filters
//! 3. [`assemble`] merges every block and adds the global filter and output
//! 4. [`FluentBitConfig::render`] writes the classic Fluent Bit text format
//!
//! The pipeline performs no I/O and non-fatal findings are returned
//! as [`Diagnostic`]s instead of being logged.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod assemble;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod license;
pub mod model;
pub mod range;
pub mod render;
pub mod translate;
pub mod yaml;

pub use assemble::{assemble, Assembly, FluentBitConfig};
pub use config::{LogForwardConfig, ProxyConfig};
pub use diagnostics::Diagnostic;
pub use error::LogsConfigError;
pub use model::LogBlock;
pub use render::Rendered;
