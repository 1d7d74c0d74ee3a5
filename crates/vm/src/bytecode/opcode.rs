// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use flux_type::{BinaryOp, UnaryOp};

use crate::error::VmError;

/// Width of an inline operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
	U8,
	U16,
	U32,
}

impl Operand {
	pub fn width(&self) -> usize {
		match self {
			Operand::U8 => 1,
			Operand::U16 => 2,
			Operand::U32 => 4,
		}
	}
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
	/// `u16` number of side-effect sites.
	ProgramStart = 0x01,
	ConsSideEffects = 0x02,
	AppendSideEffect = 0x03,
	ExecuteFlux = 0x04,
	FindRecord = 0x05,
	Stop = 0x06,

	/// `u16` constant index.
	LoadValue = 0x10,
	Pop = 0x11,
	Dup = 0x12,

	/// `u16` name index.
	ScopeLookup = 0x20,
	ScopeSet = 0x21,
	OptionSet = 0x22,

	/// `u8` arity, `u16` name list index.
	Call = 0x30,
	Ret = 0x31,
	/// `u16` chunk index.
	MakeClosure = 0x32,

	/// `u16` name list index.
	MakeRecord = 0x40,
	RecordWith = 0x41,
	/// `u16` element count.
	MakeArray = 0x42,
	/// `u16` entry count.
	MakeDict = 0x43,
	/// `u16` name index.
	GetMember = 0x44,
	GetIndex = 0x45,

	/// `u8` operator.
	Binary = 0x50,
	Unary = 0x51,

	/// `u32` absolute target.
	Jump = 0x60,
	JumpIfFalse = 0x61,
}

impl Opcode {
	pub fn name(&self) -> &'static str {
		match self {
			Opcode::ProgramStart => "PROGRAM_START",
			Opcode::ConsSideEffects => "CONS_SIDE_EFFECTS",
			Opcode::AppendSideEffect => "APPEND_SIDE_EFFECT",
			Opcode::ExecuteFlux => "EXECUTE_FLUX",
			Opcode::FindRecord => "FIND_RECORD",
			Opcode::Stop => "STOP",
			Opcode::LoadValue => "LOAD_VALUE",
			Opcode::Pop => "POP",
			Opcode::Dup => "DUP",
			Opcode::ScopeLookup => "SCOPE_LOOKUP",
			Opcode::ScopeSet => "SCOPE_SET",
			Opcode::OptionSet => "OPTION_SET",
			Opcode::Call => "CALL",
			Opcode::Ret => "RET",
			Opcode::MakeClosure => "MAKE_CLOSURE",
			Opcode::MakeRecord => "MAKE_RECORD",
			Opcode::RecordWith => "RECORD_WITH",
			Opcode::MakeArray => "MAKE_ARRAY",
			Opcode::MakeDict => "MAKE_DICT",
			Opcode::GetMember => "GET_MEMBER",
			Opcode::GetIndex => "GET_INDEX",
			Opcode::Binary => "BINARY",
			Opcode::Unary => "UNARY",
			Opcode::Jump => "JUMP",
			Opcode::JumpIfFalse => "JUMP_IF_FALSE",
		}
	}

	pub fn operands(&self) -> &'static [Operand] {
		match self {
			Opcode::ProgramStart
			| Opcode::LoadValue
			| Opcode::ScopeLookup
			| Opcode::ScopeSet
			| Opcode::OptionSet
			| Opcode::MakeClosure
			| Opcode::MakeRecord
			| Opcode::RecordWith
			| Opcode::MakeArray
			| Opcode::MakeDict
			| Opcode::GetMember => &[Operand::U16],
			Opcode::Call => &[Operand::U8, Operand::U16],
			Opcode::Binary | Opcode::Unary => &[Operand::U8],
			Opcode::Jump | Opcode::JumpIfFalse => &[Operand::U32],
			Opcode::ConsSideEffects
			| Opcode::AppendSideEffect
			| Opcode::ExecuteFlux
			| Opcode::FindRecord
			| Opcode::Stop
			| Opcode::Pop
			| Opcode::Dup
			| Opcode::Ret
			| Opcode::GetIndex => &[],
		}
	}

	/// Encoded size including operands.
	pub fn size(&self) -> usize {
		1 + self.operands().iter().map(Operand::width).sum::<usize>()
	}
}

impl TryFrom<u8> for Opcode {
	type Error = VmError;

	fn try_from(byte: u8) -> Result<Self, Self::Error> {
		let opcode = match byte {
			0x01 => Opcode::ProgramStart,
			0x02 => Opcode::ConsSideEffects,
			0x03 => Opcode::AppendSideEffect,
			0x04 => Opcode::ExecuteFlux,
			0x05 => Opcode::FindRecord,
			0x06 => Opcode::Stop,
			0x10 => Opcode::LoadValue,
			0x11 => Opcode::Pop,
			0x12 => Opcode::Dup,
			0x20 => Opcode::ScopeLookup,
			0x21 => Opcode::ScopeSet,
			0x22 => Opcode::OptionSet,
			0x30 => Opcode::Call,
			0x31 => Opcode::Ret,
			0x32 => Opcode::MakeClosure,
			0x40 => Opcode::MakeRecord,
			0x41 => Opcode::RecordWith,
			0x42 => Opcode::MakeArray,
			0x43 => Opcode::MakeDict,
			0x44 => Opcode::GetMember,
			0x45 => Opcode::GetIndex,
			0x50 => Opcode::Binary,
			0x51 => Opcode::Unary,
			0x60 => Opcode::Jump,
			0x61 => Opcode::JumpIfFalse,
			other => return Err(VmError::InvalidOpcode(other)),
		};
		Ok(opcode)
	}
}

impl Display for Opcode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

const BINARY_OPS: [BinaryOp; 13] = [
	BinaryOp::Add,
	BinaryOp::Sub,
	BinaryOp::Mul,
	BinaryOp::Div,
	BinaryOp::Mod,
	BinaryOp::Eq,
	BinaryOp::Neq,
	BinaryOp::Lt,
	BinaryOp::Lte,
	BinaryOp::Gt,
	BinaryOp::Gte,
	BinaryOp::RegexMatch,
	BinaryOp::RegexNotMatch,
];

const UNARY_OPS: [UnaryOp; 3] = [UnaryOp::Neg, UnaryOp::Not, UnaryOp::Exists];

pub fn encode_binary(op: BinaryOp) -> u8 {
	BINARY_OPS.iter().position(|o| *o == op).unwrap_or_default() as u8
}

pub fn decode_binary(byte: u8) -> Result<BinaryOp, VmError> {
	BINARY_OPS.get(byte as usize).copied().ok_or(VmError::InvalidOpcode(byte))
}

pub fn encode_unary(op: UnaryOp) -> u8 {
	UNARY_OPS.iter().position(|o| *o == op).unwrap_or_default() as u8
}

pub fn decode_unary(byte: u8) -> Result<UnaryOp, VmError> {
	UNARY_OPS.get(byte as usize).copied().ok_or(VmError::InvalidOpcode(byte))
}
