// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::{Nature, Value};

use super::{Result, Synthesizer};
use crate::{
	ast::{Expression, FunctionBody, FunctionParam, LogicalOp},
	bytecode::{
		instruction::BytecodeWriter,
		opcode::{Opcode, encode_binary, encode_unary},
		program::{Chunk, ChunkParam, PIPE_ARGUMENT},
	},
	error::CompileError,
};

impl Synthesizer {
	pub(crate) fn compile_expr(&mut self, expr: &Expression) -> Result<()> {
		match expr {
			Expression::Literal(value) => self.emit_load(value.clone())?,
			Expression::Identifier(name) => self.emit_named(Opcode::ScopeLookup, name)?,
			Expression::Member {
				object,
				property,
			} => {
				self.compile_expr(object)?;
				self.emit_named(Opcode::GetMember, property)?;
			}
			Expression::Index {
				array,
				index,
			} => {
				self.compile_expr(array)?;
				self.compile_expr(index)?;
				self.writer.emit_opcode(Opcode::GetIndex);
			}
			Expression::Binary {
				op,
				left,
				right,
			} => {
				self.compile_expr(left)?;
				self.compile_expr(right)?;
				self.writer.emit_opcode(Opcode::Binary);
				self.writer.emit_u8(encode_binary(*op));
			}
			Expression::Unary {
				op,
				operand,
			} => {
				self.compile_expr(operand)?;
				self.writer.emit_opcode(Opcode::Unary);
				self.writer.emit_u8(encode_unary(*op));
			}
			Expression::Logical {
				op,
				left,
				right,
			} => self.compile_logical(*op, left, right)?,
			Expression::Conditional {
				test,
				consequent,
				alternate,
			} => {
				self.compile_expr(test)?;
				let to_alternate = self.writer.emit_jump(Opcode::JumpIfFalse);
				self.compile_expr(consequent)?;
				let to_end = self.writer.emit_jump(Opcode::Jump);
				self.writer.patch_jump(to_alternate);
				self.compile_expr(alternate)?;
				self.writer.patch_jump(to_end);
			}
			Expression::Call {
				callee,
				arguments,
			} => self.compile_call(callee, None, arguments)?,
			Expression::Pipe {
				argument,
				call,
			} => {
				let Expression::Call {
					callee,
					arguments,
				} = call.as_ref()
				else {
					return Err(CompileError::PipeTargetNotCall(call.describe()));
				};
				self.compile_call(callee, Some(argument), arguments)?;
			}
			Expression::Record {
				with,
				properties,
			} => {
				if let Some(base) = with {
					self.compile_expr(base)?;
				}
				let mut names = Vec::with_capacity(properties.len());
				for (name, value) in properties {
					self.compile_expr(value)?;
					names.push(name.clone());
				}
				let list = self.program.add_name_list(names)?;
				self.writer.emit_opcode(if with.is_some() {
					Opcode::RecordWith
				} else {
					Opcode::MakeRecord
				});
				self.writer.emit_u16(list);
			}
			Expression::Array(elements) => {
				for element in elements {
					self.compile_expr(element)?;
				}
				self.writer.emit_opcode(Opcode::MakeArray);
				self.writer.emit_u16(count(elements.len(), "array element")?);
			}
			Expression::Dict(entries) => {
				for (key, value) in entries {
					self.compile_expr(key)?;
					self.compile_expr(value)?;
				}
				self.writer.emit_opcode(Opcode::MakeDict);
				self.writer.emit_u16(count(entries.len(), "dict entry")?);
			}
			Expression::Function {
				params,
				body,
			} => self.compile_function(params, body)?,
			Expression::FindRecord {
				table,
				predicate,
				index,
			} => {
				self.compile_expr(table)?;
				match predicate {
					Some(predicate) => self.compile_expr(predicate)?,
					None => self.emit_load(Value::null(Nature::Function))?,
				}
				self.compile_expr(index)?;
				self.writer.emit_opcode(Opcode::FindRecord);
			}
		}
		Ok(())
	}

	/// `a and b` leaves `a` when it is false, otherwise `b`; `or` mirrors it.
	fn compile_logical(&mut self, op: LogicalOp, left: &Expression, right: &Expression) -> Result<()> {
		self.compile_expr(left)?;
		self.writer.emit_opcode(Opcode::Dup);
		match op {
			LogicalOp::And => {
				let to_end = self.writer.emit_jump(Opcode::JumpIfFalse);
				self.writer.emit_opcode(Opcode::Pop);
				self.compile_expr(right)?;
				self.writer.patch_jump(to_end);
			}
			LogicalOp::Or => {
				let to_right = self.writer.emit_jump(Opcode::JumpIfFalse);
				let to_end = self.writer.emit_jump(Opcode::Jump);
				self.writer.patch_jump(to_right);
				self.writer.emit_opcode(Opcode::Pop);
				self.compile_expr(right)?;
				self.writer.patch_jump(to_end);
			}
		}
		Ok(())
	}

	fn compile_call(
		&mut self,
		callee: &Expression,
		piped: Option<&Expression>,
		arguments: &[(String, Expression)],
	) -> Result<()> {
		self.compile_expr(callee)?;
		let mut names = Vec::with_capacity(arguments.len() + 1);
		if let Some(piped) = piped {
			self.compile_expr(piped)?;
			names.push(PIPE_ARGUMENT.to_string());
		}
		for (name, value) in arguments {
			self.compile_expr(value)?;
			names.push(name.clone());
		}
		let arity = u8::try_from(names.len()).map_err(|_| CompileError::PoolOverflow {
			pool: "call argument",
			limit: u8::MAX as usize,
		})?;
		let list = self.program.add_name_list(names)?;
		self.writer.emit_opcode(Opcode::Call);
		self.writer.emit_u8(arity);
		self.writer.emit_u16(list);
		Ok(())
	}

	/// Compiles the body into a new chunk, then emits the defaults and
	/// `MAKE_CLOSURE` in the enclosing chunk.
	fn compile_function(&mut self, params: &[FunctionParam], body: &FunctionBody) -> Result<()> {
		let outer = std::mem::replace(&mut self.writer, BytecodeWriter::new());
		let compiled = self.compile_function_body(body);
		let inner = std::mem::replace(&mut self.writer, outer);
		compiled?;

		let chunk = self.program.add_chunk(Chunk {
			name: format!("fn#{}", self.program.chunks.len()),
			params: params
				.iter()
				.map(|p| ChunkParam {
					name: p.name.clone(),
					ty: p.ty.clone(),
					has_default: p.default.is_some(),
					pipe: p.pipe,
				})
				.collect(),
			bytecode: inner.finish(),
		})?;

		for default in params.iter().filter_map(|p| p.default.as_ref()) {
			self.compile_expr(default)?;
		}
		self.writer.emit_opcode(Opcode::MakeClosure);
		self.writer.emit_u16(chunk);
		Ok(())
	}
}

fn count(len: usize, pool: &'static str) -> Result<u16> {
	u16::try_from(len).map_err(|_| CompileError::PoolOverflow {
		pool,
		limit: u16::MAX as usize,
	})
}
