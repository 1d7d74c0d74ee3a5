// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Query synthesis and the bytecode machine.
//!
//! The synthesizer lowers a checked [`ast::Package`] into a
//! [`CompiledProgram`]: one chunk of bytecode for the program body and one
//! chunk per function literal. The program body always has the same shape:
//!
//! ```text
//! <options>            OPTION_SET for every `option` statement
//! PROGRAM_START        freezes `now`
//! CONS_SIDE_EFFECTS
//! <statements>         each expression statement ends in APPEND_SIDE_EFFECT
//! EXECUTE_FLUX         hands the side effects to the host
//! STOP
//! ```
//!
//! The [`Machine`] interprets a program on an operand stack. Closures are
//! values implementing [`flux_type::Function`] and run on a fresh machine,
//! so the executor can call them from any thread.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod ast;
pub mod bytecode;
pub mod compile;
pub mod error;
mod handler;
pub mod vmcore;

pub use bytecode::{
	explain::disassemble,
	instruction::{BytecodeReader, BytecodeWriter},
	opcode::Opcode,
	program::{Chunk, ChunkParam, CompiledProgram, Import, SideEffectSite},
};
pub use compile::{CompileOptions, Synthesizer};
pub use error::{CompileError, VmError};
pub use vmcore::{
	BuiltinRegistry, CallFrame, CallStack, Closure, DispatchResult, Host, Machine, Scope, UNIVERSE, VmConfig,
};
