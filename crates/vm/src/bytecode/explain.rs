// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Human-readable listing of a compiled program.

use std::fmt::Write;

use crate::bytecode::{
	instruction::BytecodeReader,
	opcode::{Opcode, Operand, decode_binary, decode_unary},
	program::{Chunk, CompiledProgram},
};

/// Renders every chunk, one instruction per line with resolved operands:
///
/// ```text
/// chunk 0 main()
///   0000  PROGRAM_START 1
///   0003  CONS_SIDE_EFFECTS
///   0004  SCOPE_LOOKUP 0 ; from
/// ```
pub fn disassemble(program: &CompiledProgram) -> String {
	let mut output = String::new();
	for (index, chunk) in program.chunks.iter().enumerate() {
		write_chunk(&mut output, program, index, chunk);
	}
	output
}

fn write_chunk(output: &mut String, program: &CompiledProgram, index: usize, chunk: &Chunk) {
	let params: Vec<String> = chunk
		.params
		.iter()
		.map(|p| {
			let mut rendered = p.name.clone();
			if p.pipe {
				rendered.push_str("=<-");
			} else if p.has_default {
				rendered.push('?');
			}
			rendered
		})
		.collect();
	let _ = writeln!(output, "chunk {} {}({})", index, chunk.name, params.join(", "));

	let mut reader = BytecodeReader::new(&chunk.bytecode);
	while !reader.is_at_end() {
		let offset = reader.position();
		let opcode = match reader.read_opcode() {
			Ok(opcode) => opcode,
			Err(err) => {
				let _ = writeln!(output, "  {:04}  <{}>", offset, err);
				return;
			}
		};
		let mut operands = Vec::new();
		for operand in opcode.operands() {
			let value = match operand {
				Operand::U8 => reader.read_u8().map(u32::from),
				Operand::U16 => reader.read_u16().map(u32::from),
				Operand::U32 => reader.read_u32(),
			};
			match value {
				Ok(value) => operands.push(value),
				Err(err) => {
					let _ = writeln!(output, "  {:04}  {} <{}>", offset, opcode, err);
					return;
				}
			}
		}

		let _ = write!(output, "  {:04}  {}", offset, opcode);
		for operand in &operands {
			let _ = write!(output, " {}", operand);
		}
		if let Some(comment) = resolve(program, opcode, &operands) {
			let _ = write!(output, " ; {}", comment);
		}
		output.push('\n');
	}
}

fn resolve(program: &CompiledProgram, opcode: Opcode, operands: &[u32]) -> Option<String> {
	let first = *operands.first()?;
	match opcode {
		Opcode::LoadValue => program.constants.get(first as usize).map(|v| v.to_string()),
		Opcode::ScopeLookup | Opcode::ScopeSet | Opcode::OptionSet | Opcode::GetMember => {
			program.names.get(first as usize).cloned()
		}
		Opcode::MakeRecord | Opcode::RecordWith => program.name_lists.get(first as usize).map(|n| n.join(", ")),
		Opcode::Call => program.name_lists.get(*operands.get(1)? as usize).map(|n| n.join(", ")),
		Opcode::MakeClosure => program.chunks.get(first as usize).map(|c| c.name.clone()),
		Opcode::Binary => decode_binary(first as u8).ok().map(|op| op.to_string()),
		Opcode::Unary => decode_unary(first as u8).ok().map(|op| op.to_string()),
		_ => None,
	}
}
