// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod clock;
pub mod context;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use context::{CancellationToken, Context};
