// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_runtime::Context;
use flux_type::{Time, Value};
use tracing::{instrument, trace};

use crate::{
	bytecode::{
		instruction::BytecodeReader,
		program::{CompiledProgram, MAIN_CHUNK},
	},
	error::{Result, VmError},
	handler::{HandlerContext, dispatch},
	vmcore::{
		builtin::BuiltinRegistry,
		call_stack::{CallFrame, CallStack},
		host::Host,
		scope::Scope,
	},
};

#[derive(Debug, Clone, Copy)]
pub struct VmConfig {
	/// Maximum operand stack height per machine.
	pub max_stack: usize,
}

impl Default for VmConfig {
	fn default() -> Self {
		Self {
			max_stack: 1024,
		}
	}
}

/// Outcome of executing one instruction.
#[derive(Debug)]
pub enum DispatchResult {
	Continue,
	/// `RET` left the current frame with a value.
	Return(Value),
	/// `STOP` ended the program with the value on top of the stack.
	Stop(Value),
}

/// State shared by a machine and every closure it creates.
#[derive(Clone, Default)]
pub(crate) struct Environment {
	pub host: Option<Arc<dyn Host>>,
	pub ctx: Option<Context>,
	pub config: VmConfig,
	pub now: Option<Time>,
}

pub struct Machine {
	pub(crate) program: Arc<CompiledProgram>,
	pub(crate) env: Environment,
	pub(crate) stack: Vec<Value>,
	pub(crate) frames: CallStack,
	globals: Arc<Scope>,
}

impl Machine {
	/// A machine for `program` whose global scope holds the universe
	/// package and the program's imports.
	pub fn new(program: Arc<CompiledProgram>, builtins: &BuiltinRegistry) -> flux_type::Result<Self> {
		let globals = Scope::child(&builtins.prelude());
		for import in &program.imports {
			let Some(package) = builtins.package(&import.path) else {
				return Err(VmError::UndefinedIdentifier(import.path.clone()).into());
			};
			globals.set(import.name.clone(), Value::record(package));
		}
		Ok(Self::with_env(program, Environment::default(), globals))
	}

	pub(crate) fn with_env(program: Arc<CompiledProgram>, env: Environment, globals: Arc<Scope>) -> Self {
		Self {
			program,
			env,
			stack: Vec::new(),
			frames: CallStack::new(),
			globals,
		}
	}

	pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
		self.env.host = Some(host);
		self
	}

	/// Cancelling `ctx` stops the machine before its next instruction.
	pub fn with_context(mut self, ctx: Context) -> Self {
		self.env.ctx = Some(ctx);
		self
	}

	pub fn with_config(mut self, config: VmConfig) -> Self {
		self.env.config = config;
		self
	}

	pub fn globals(&self) -> &Arc<Scope> {
		&self.globals
	}

	/// The frozen `now`, once `PROGRAM_START` ran.
	pub fn now(&self) -> Option<Time> {
		self.env.now
	}

	pub fn program(&self) -> &Arc<CompiledProgram> {
		&self.program
	}

	/// Runs the program body; returns the value `STOP` left, the result
	/// stream of the query.
	#[instrument(name = "vm::run", level = "debug", skip(self))]
	pub fn run(&mut self) -> flux_type::Result<Value> {
		let globals = Arc::clone(&self.globals);
		Ok(self.execute(MAIN_CHUNK, globals)?)
	}

	/// Interprets `chunk` in `scope` until it returns or stops.
	pub(crate) fn execute(&mut self, chunk: u16, scope: Arc<Scope>) -> Result<Value> {
		let program = Arc::clone(&self.program);
		let bytecode = &program.chunk(chunk)?.bytecode;
		self.frames.push(CallFrame {
			chunk,
			frame_pointer: self.stack.len(),
			scope,
		});

		let mut reader = BytecodeReader::new(bytecode);
		loop {
			if let Some(ctx) = &self.env.ctx {
				ctx.check()?;
			}
			if reader.is_at_end() {
				return Err(VmError::UnexpectedEnd {
					position: reader.position(),
				});
			}
			let opcode = reader.read_opcode()?;
			trace!(chunk, position = reader.position() - 1, %opcode, depth = self.stack.len(), "dispatch");
			let mut ctx = HandlerContext {
				vm: self,
				reader: &mut reader,
				opcode,
			};
			match dispatch(&mut ctx)? {
				DispatchResult::Continue => {}
				DispatchResult::Return(value) | DispatchResult::Stop(value) => return Ok(value),
			}
		}
	}

	pub(crate) fn push(&mut self, value: Value) -> Result<()> {
		if self.stack.len() >= self.env.config.max_stack {
			return Err(VmError::StackOverflow {
				limit: self.env.config.max_stack,
			});
		}
		self.stack.push(value);
		Ok(())
	}

	/// Pops one operand; the current frame's operands are the only ones
	/// visible.
	pub(crate) fn pop(&mut self, opcode: &'static str) -> Result<Value> {
		let floor = self.frames.current().map(|f| f.frame_pointer).unwrap_or(0);
		if self.stack.len() <= floor {
			return Err(VmError::StackUnderflow {
				opcode,
			});
		}
		self.stack.pop().ok_or(VmError::StackUnderflow {
			opcode,
		})
	}

	/// Pops `n` operands, returned in push order.
	pub(crate) fn pop_n(&mut self, n: usize, opcode: &'static str) -> Result<Vec<Value>> {
		let floor = self.frames.current().map(|f| f.frame_pointer).unwrap_or(0);
		if self.stack.len() < floor + n {
			return Err(VmError::StackUnderflow {
				opcode,
			});
		}
		Ok(self.stack.split_off(self.stack.len() - n))
	}

	pub(crate) fn peek(&self, opcode: &'static str) -> Result<&Value> {
		let floor = self.frames.current().map(|f| f.frame_pointer).unwrap_or(0);
		if self.stack.len() <= floor {
			return Err(VmError::StackUnderflow {
				opcode,
			});
		}
		self.stack.last().ok_or(VmError::StackUnderflow {
			opcode,
		})
	}

	pub(crate) fn scope(&self) -> Result<Arc<Scope>> {
		self.frames.current().map(|f| Arc::clone(&f.scope)).ok_or(VmError::StackUnderflow {
			opcode: "SCOPE",
		})
	}
}
