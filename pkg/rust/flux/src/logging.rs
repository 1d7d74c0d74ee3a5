// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Installs the process-wide `tracing` subscriber.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};

pub use crate::config::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// Filter directive used when `RUST_LOG` is not set, e.g. `info` or
	/// `flux_execute=debug,warn`.
	pub level: String,
	pub format: LogFormat,
	pub ansi: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Text,
			ansi: true,
		}
	}
}

impl LoggingConfig {
	pub fn level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	pub fn json(mut self) -> Self {
		self.format = LogFormat::Json;
		self.ansi = false;
		self
	}

	fn filter(&self) -> EnvFilter {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
	}
}

/// Installs a `fmt` subscriber for `config`. Returns `false` when a global
/// subscriber was already installed, in which case nothing changes.
pub fn init(config: &LoggingConfig) -> bool {
	let builder = fmt().with_env_filter(config.filter()).with_ansi(config.ansi);
	let installed = match config.format {
		LogFormat::Text => builder.try_init().is_ok(),
		LogFormat::Json => builder.json().try_init().is_ok(),
	};
	if installed {
		tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
	}
	installed
}
