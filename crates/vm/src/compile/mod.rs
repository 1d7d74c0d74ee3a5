// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Synthesis: lowers a checked package into bytecode.

mod expr;
mod stmt;

use flux_type::{Time, Value};
use tracing::debug;

use crate::{
	ast::{Package, Statement},
	bytecode::{
		instruction::BytecodeWriter,
		opcode::Opcode,
		program::{Chunk, CompiledProgram, Import, MAIN_CHUNK, SideEffectSite},
	},
	error::CompileError,
};

type Result<T> = std::result::Result<T, CompileError>;

pub const NOW_OPTION: &str = "now";

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
	/// Binds the `now` option, overriding any `option now = ...` statement.
	pub now: Option<Time>,
}

impl CompileOptions {
	pub fn with_now(now: Time) -> Self {
		Self {
			now: Some(now),
		}
	}
}

pub struct Synthesizer {
	pub(crate) program: CompiledProgram,
	pub(crate) writer: BytecodeWriter,
}

impl Synthesizer {
	fn new() -> Self {
		Self {
			program: CompiledProgram::new(),
			writer: BytecodeWriter::new(),
		}
	}

	/// Compiles the package body into the main chunk and every function
	/// literal into its own chunk.
	pub fn synthesize(package: &Package, options: &CompileOptions) -> Result<CompiledProgram> {
		let mut synthesizer = Self::new();
		synthesizer.program.add_chunk(Chunk {
			name: package.name.clone(),
			params: Vec::new(),
			bytecode: Vec::new(),
		})?;
		synthesizer.program.imports = package
			.imports
			.iter()
			.map(|import| Import {
				path: import.path.clone(),
				name: import.alias.clone().unwrap_or_else(|| {
					import.path.rsplit('/').next().unwrap_or(import.path.as_str()).to_string()
				}),
			})
			.collect();

		for statement in &package.body {
			if let Statement::Option {
				name,
				value,
			} = statement
			{
				synthesizer.compile_expr(value)?;
				synthesizer.emit_named(Opcode::OptionSet, name)?;
			}
		}
		if let Some(now) = options.now {
			synthesizer.emit_load(Value::time(now))?;
			synthesizer.emit_named(Opcode::OptionSet, NOW_OPTION)?;
		}

		synthesizer.program.side_effects = package
			.body
			.iter()
			.enumerate()
			.filter_map(|(statement, s)| match s {
				Statement::Expression(e) => Some(SideEffectSite {
					statement,
					description: e.describe(),
				}),
				_ => None,
			})
			.collect();
		let sites = u16::try_from(synthesizer.program.side_effects.len()).map_err(|_| CompileError::PoolOverflow {
			pool: "side effect",
			limit: u16::MAX as usize,
		})?;
		synthesizer.writer.emit_opcode(Opcode::ProgramStart);
		synthesizer.writer.emit_u16(sites);
		synthesizer.writer.emit_opcode(Opcode::ConsSideEffects);

		for statement in &package.body {
			synthesizer.compile_program_statement(statement)?;
		}

		synthesizer.writer.emit_opcode(Opcode::ExecuteFlux);
		synthesizer.writer.emit_opcode(Opcode::Stop);

		let Synthesizer {
			mut program,
			writer,
		} = synthesizer;
		program.chunks[MAIN_CHUNK as usize].bytecode = writer.finish();
		debug!(
			chunks = program.chunks.len(),
			constants = program.constants.len(),
			side_effects = program.side_effects.len(),
			"program synthesized"
		);
		Ok(program)
	}

	pub(crate) fn emit_load(&mut self, value: Value) -> Result<()> {
		let index = self.program.add_constant(value)?;
		self.writer.emit_opcode(Opcode::LoadValue);
		self.writer.emit_u16(index);
		Ok(())
	}

	pub(crate) fn emit_named(&mut self, opcode: Opcode, name: &str) -> Result<()> {
		let index = self.program.add_name(name)?;
		self.writer.emit_opcode(opcode);
		self.writer.emit_u16(index);
		Ok(())
	}
}
