// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compile flux programs and run them as streaming queries.
//!
//! ```ignore
//! let compiler = FluxBuilder::new(parser).memory_limit(64 << 20).build()?;
//! let program = compiler.compile(source)?;
//! let query = program.start(&Context::new(), compiler.allocator())?;
//! for result in query.results().iter() {
//!     for table in result.tables() {
//!         // ...
//!     }
//! }
//! query.done();
//! ```

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod builder;
mod compiler;
mod config;
mod host;
pub mod logging;

pub use builder::FluxBuilder;
pub use compiler::{Compiler, Program};
pub use config::{DEFAULT_RESULT_BUFFER, FluxConfig, LogFormat};
pub use flux_builtin as builtin;
pub use flux_column as column;
pub use flux_execute as execute;
pub use flux_execute::{Query, QueryResult, Statistics};
pub use flux_plan as plan;
pub use flux_runtime as runtime;
pub use flux_runtime::Context;
pub use flux_type as r#type;
pub use flux_type::{Error, ErrorKind, Result, Time, Value};
pub use flux_vm as vm;
pub use flux_vm::ast::Parser;
pub use logging::LoggingConfig;
