// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Routes `tracing` output through the test harness's captured writer.
/// `RUST_LOG` selects the level; without it only warnings are shown.
/// Calling it more than once is harmless.
pub fn init_test_logging() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_init_twice() {
		init_test_logging();
		init_test_logging();
		tracing::warn!("logged through the test writer");
	}
}
