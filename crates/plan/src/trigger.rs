// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use flux_type::Duration;
use serde::{Deserialize, Serialize};

/// When a wide transformation emits its buffered tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSpec {
	/// Fires once the watermark passes the table's `_stop` plus the lateness.
	AfterWatermark {
		allowed_lateness: Duration,
	},
	/// Fires once processing time passes the table's `_stop` plus the duration.
	AfterProcessingTime {
		duration: Duration,
	},
	AfterAtLeastCount {
		count: usize,
	},
	/// Re-arms the inner trigger after every firing.
	Repeated(Box<TriggerSpec>),
	/// Fires on `main` until `finally` fires, then finishes.
	OrFinally {
		main: Box<TriggerSpec>,
		finally: Box<TriggerSpec>,
	},
	/// Emits every table as soon as it is processed.
	Narrow,
}

impl Default for TriggerSpec {
	fn default() -> Self {
		TriggerSpec::AfterWatermark {
			allowed_lateness: Duration::ZERO,
		}
	}
}

impl Display for TriggerSpec {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TriggerSpec::AfterWatermark {
				allowed_lateness,
			} => write!(f, "afterWatermark({})", allowed_lateness),
			TriggerSpec::AfterProcessingTime {
				duration,
			} => write!(f, "afterProcessingTime({})", duration),
			TriggerSpec::AfterAtLeastCount {
				count,
			} => write!(f, "afterAtLeastCount({})", count),
			TriggerSpec::Repeated(inner) => write!(f, "repeated({})", inner),
			TriggerSpec::OrFinally {
				main,
				finally,
			} => write!(f, "orFinally({}, {})", main, finally),
			TriggerSpec::Narrow => f.write_str("narrow"),
		}
	}
}
