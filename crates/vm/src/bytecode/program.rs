// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::{Param, Type, Value};

use crate::error::{CompileError, Result, VmError};

pub const MAIN_CHUNK: u16 = 0;

/// Name passed for the piped argument of a call; resolved to the callee's
/// pipe parameter at call time.
pub const PIPE_ARGUMENT: &str = "<-";

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkParam {
	pub name: String,
	pub ty: Type,
	pub has_default: bool,
	pub pipe: bool,
}

/// Bytecode of the program body or of one function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
	pub name: String,
	pub params: Vec<ChunkParam>,
	pub bytecode: Vec<u8>,
}

impl Chunk {
	pub fn ty(&self) -> Type {
		let params = self
			.params
			.iter()
			.map(|p| {
				let mut param = match (p.pipe, p.has_default) {
					(true, _) => Param::pipe(&p.name),
					(false, true) => Param::optional(&p.name, p.ty.clone()),
					(false, false) => Param::required(&p.name, p.ty.clone()),
				};
				param.ty = p.ty.clone();
				param
			})
			.collect();
		Type::function(params, Type::Var(0))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
	pub path: String,
	/// Identifier the package is bound to.
	pub name: String,
}

/// A root expression statement whose value may become a query output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectSite {
	pub statement: usize,
	pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledProgram {
	pub constants: Vec<Value>,
	pub names: Vec<String>,
	pub name_lists: Vec<Vec<String>>,
	pub chunks: Vec<Chunk>,
	pub imports: Vec<Import>,
	pub side_effects: Vec<SideEffectSite>,
}

fn pool_index(len: usize, pool: &'static str) -> std::result::Result<u16, CompileError> {
	u16::try_from(len).map_err(|_| CompileError::PoolOverflow {
		pool,
		limit: u16::MAX as usize,
	})
}

impl CompiledProgram {
	pub fn new() -> Self {
		Self::default()
	}

	/// Scalar constants are shared; compound values always get a new slot.
	pub fn add_constant(&mut self, value: Value) -> std::result::Result<u16, CompileError> {
		let shareable = matches!(
			value,
			Value::Bool(_)
				| Value::Int(_)
				| Value::UInt(_)
				| Value::String(_)
				| Value::Time(_)
				| Value::Duration(_)
				| Value::Null(_)
		);
		if shareable {
			if let Some(existing) = self.constants.iter().position(|c| same_constant(c, &value)) {
				return pool_index(existing, "constant");
			}
		}
		let index = pool_index(self.constants.len(), "constant")?;
		self.constants.push(value);
		Ok(index)
	}

	pub fn add_name(&mut self, name: &str) -> std::result::Result<u16, CompileError> {
		if let Some(existing) = self.names.iter().position(|n| n == name) {
			return pool_index(existing, "name");
		}
		let index = pool_index(self.names.len(), "name")?;
		self.names.push(name.to_string());
		Ok(index)
	}

	pub fn add_name_list(&mut self, names: Vec<String>) -> std::result::Result<u16, CompileError> {
		if let Some(existing) = self.name_lists.iter().position(|n| *n == names) {
			return pool_index(existing, "name list");
		}
		let index = pool_index(self.name_lists.len(), "name list")?;
		self.name_lists.push(names);
		Ok(index)
	}

	pub fn add_chunk(&mut self, chunk: Chunk) -> std::result::Result<u16, CompileError> {
		let index = pool_index(self.chunks.len(), "chunk")?;
		self.chunks.push(chunk);
		Ok(index)
	}

	pub fn constant(&self, index: u16) -> Result<&Value> {
		self.constants.get(index as usize).ok_or(VmError::InvalidConstant(index))
	}

	pub fn name(&self, index: u16) -> Result<&str> {
		self.names.get(index as usize).map(String::as_str).ok_or(VmError::InvalidName(index))
	}

	pub fn name_list(&self, index: u16) -> Result<&[String]> {
		self.name_lists.get(index as usize).map(Vec::as_slice).ok_or(VmError::InvalidName(index))
	}

	pub fn chunk(&self, index: u16) -> Result<&Chunk> {
		self.chunks.get(index as usize).ok_or(VmError::InvalidChunk(index))
	}

	pub fn main(&self) -> Result<&Chunk> {
		self.chunk(MAIN_CHUNK)
	}
}

fn same_constant(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Null(x), Value::Null(y)) => x == y,
		(Value::Null(_), _) | (_, Value::Null(_)) => false,
		_ => a.nature() == b.nature() && a == b,
	}
}

#[cfg(test)]
mod tests {
	use flux_type::Nature;

	use super::*;

	#[test]
	fn test_scalar_constants_are_shared() {
		let mut program = CompiledProgram::new();
		let a = program.add_constant(Value::int(1)).unwrap();
		let b = program.add_constant(Value::int(1)).unwrap();
		let c = program.add_constant(Value::float(1.0)).unwrap();
		assert_eq!(a, b);
		assert_ne!(a, c);

		let n1 = program.add_constant(Value::null(Nature::Int)).unwrap();
		let n2 = program.add_constant(Value::null(Nature::String)).unwrap();
		assert_ne!(n1, n2);
		assert_eq!(program.add_constant(Value::null(Nature::Int)).unwrap(), n1);
	}

	#[test]
	fn test_missing_pool_entries() {
		let program = CompiledProgram::new();
		assert!(matches!(program.constant(3), Err(VmError::InvalidConstant(3))));
		assert!(matches!(program.main(), Err(VmError::InvalidChunk(0))));
	}
}
