// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fixtures shared by the integration tests of the flux crates.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod decoder;
pub mod fixture;
pub mod logging;
pub mod parser;
pub mod wait;

pub use decoder::{InfiniteDecoder, Script, ScriptedDecoder};
pub use fixture::TableFixture;
pub use logging::init_test_logging;
pub use parser::StaticParser;
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, wait_for, wait_for_condition};
