// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bytecode format: opcodes, the append-only writer and the program pools.

pub mod explain;
pub mod instruction;
pub mod opcode;
pub mod program;
