// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod errors;

pub use errors::{Error, ExitCode, MachineError, Result};

pub const CRATE_NAME: &str = "nouns-reasons-core";

pub const ENV_REASONS_LOG_JSON: &str = "REASONS_LOG_JSON";
pub const ENV_REASONS_OTEL_ENABLED: &str = "REASONS_OTEL_ENABLED";
