// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::{Nature, Value};

use super::{Result, Synthesizer};
use crate::{
	ast::{FunctionBody, Statement},
	bytecode::opcode::Opcode,
	error::CompileError,
};

impl Synthesizer {
	/// A statement of the program body. Options were hoisted in front of
	/// `PROGRAM_START`.
	pub(crate) fn compile_program_statement(&mut self, statement: &Statement) -> Result<()> {
		match statement {
			Statement::Expression(expression) => {
				self.compile_expr(expression)?;
				self.writer.emit_opcode(Opcode::AppendSideEffect);
			}
			Statement::Variable {
				name,
				init,
			} => {
				self.compile_expr(init)?;
				self.emit_named(Opcode::ScopeSet, name)?;
			}
			Statement::Option {
				..
			} => {}
			Statement::Return(_) => return Err(CompileError::ReturnOutsideFunction),
		}
		Ok(())
	}

	/// Body of a function chunk; always ends in `RET`.
	pub(crate) fn compile_function_body(&mut self, body: &FunctionBody) -> Result<()> {
		match body {
			FunctionBody::Expression(expression) => {
				self.compile_expr(expression)?;
				self.writer.emit_opcode(Opcode::Ret);
			}
			FunctionBody::Block(statements) => {
				for statement in statements {
					match statement {
						Statement::Expression(expression) => {
							self.compile_expr(expression)?;
							self.writer.emit_opcode(Opcode::Pop);
						}
						Statement::Variable {
							name,
							init,
						} => {
							self.compile_expr(init)?;
							self.emit_named(Opcode::ScopeSet, name)?;
						}
						Statement::Option {
							name,
							value,
						} => {
							self.compile_expr(value)?;
							self.emit_named(Opcode::OptionSet, name)?;
						}
						Statement::Return(expression) => {
							self.compile_expr(expression)?;
							self.writer.emit_opcode(Opcode::Ret);
							return Ok(());
						}
					}
				}
				self.emit_load(Value::null(Nature::Invalid))?;
				self.writer.emit_opcode(Opcode::Ret);
			}
		}
		Ok(())
	}
}
