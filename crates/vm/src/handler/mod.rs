// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Opcode handlers. Each handler reads its operands, updates the machine
//! and tells the dispatch loop how to continue.

mod call;
mod compound;
mod flux;
mod jumps;
mod ops;
mod scope;
mod stack;

use std::sync::Arc;

use flux_type::Value;

use crate::{
	bytecode::{instruction::BytecodeReader, opcode::Opcode},
	error::Result,
	vmcore::{
		machine::{DispatchResult, Machine},
		scope::Scope,
	},
};

pub(crate) struct HandlerContext<'m, 'r, 'b> {
	pub vm: &'m mut Machine,
	pub reader: &'r mut BytecodeReader<'b>,
	pub opcode: Opcode,
}

impl HandlerContext<'_, '_, '_> {
	pub fn read_u8(&mut self) -> Result<u8> {
		self.reader.read_u8()
	}

	pub fn read_u16(&mut self) -> Result<u16> {
		self.reader.read_u16()
	}

	pub fn read_u32(&mut self) -> Result<u32> {
		self.reader.read_u32()
	}

	pub fn pop(&mut self) -> Result<Value> {
		self.vm.pop(self.opcode.name())
	}

	pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>> {
		self.vm.pop_n(n, self.opcode.name())
	}

	pub fn push(&mut self, value: Value) -> Result<()> {
		self.vm.push(value)
	}

	pub fn scope(&self) -> Result<Arc<Scope>> {
		self.vm.scope()
	}
}

pub(crate) fn dispatch(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	match ctx.opcode {
		Opcode::ProgramStart => flux::program_start(ctx),
		Opcode::ConsSideEffects => flux::cons_side_effects(ctx),
		Opcode::AppendSideEffect => flux::append_side_effect(ctx),
		Opcode::ExecuteFlux => flux::execute_flux(ctx),
		Opcode::FindRecord => flux::find_record(ctx),
		Opcode::Stop => flux::stop(ctx),
		Opcode::LoadValue => stack::load_value(ctx),
		Opcode::Pop => stack::pop(ctx),
		Opcode::Dup => stack::dup(ctx),
		Opcode::ScopeLookup => scope::scope_lookup(ctx),
		Opcode::ScopeSet => scope::scope_set(ctx),
		Opcode::OptionSet => scope::option_set(ctx),
		Opcode::Call => call::call(ctx),
		Opcode::Ret => call::ret(ctx),
		Opcode::MakeClosure => call::make_closure(ctx),
		Opcode::MakeRecord => compound::make_record(ctx),
		Opcode::RecordWith => compound::record_with(ctx),
		Opcode::MakeArray => compound::make_array(ctx),
		Opcode::MakeDict => compound::make_dict(ctx),
		Opcode::GetMember => compound::get_member(ctx),
		Opcode::GetIndex => compound::get_index(ctx),
		Opcode::Binary => ops::binary(ctx),
		Opcode::Unary => ops::unary(ctx),
		Opcode::Jump => jumps::jump(ctx),
		Opcode::JumpIfFalse => jumps::jump_if_false(ctx),
	}
}
