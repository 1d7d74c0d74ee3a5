// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! VM core: the interpreter and its execution state.

pub mod builtin;
pub mod call_stack;
pub mod closure;
pub mod host;
pub mod machine;
pub mod scope;

pub use builtin::{BuiltinRegistry, UNIVERSE};
pub use call_stack::{CallFrame, CallStack};
pub use closure::Closure;
pub use host::Host;
pub use machine::{DispatchResult, Machine, VmConfig};
pub use scope::Scope;
