// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::Time;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

pub const DEFAULT_RESULT_BUFFER: usize = 16;

/// Settings shared by every program a [`Compiler`](crate::Compiler) builds.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxConfig {
	/// Bytes a query may hold in table buffers at once; unlimited when unset.
	pub memory_limit: Option<usize>,
	/// Tables buffered per result before the producing source blocks.
	pub result_buffer: usize,
	/// Fixes `now` for every program, overriding `option now`.
	pub now: Option<Time>,
	pub logging: Option<LoggingConfig>,
}

impl Default for FluxConfig {
	fn default() -> Self {
		Self {
			memory_limit: None,
			result_buffer: DEFAULT_RESULT_BUFFER,
			now: None,
			logging: None,
		}
	}
}

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Text,
	Json,
}
