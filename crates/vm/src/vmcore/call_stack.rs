// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use crate::vmcore::scope::Scope;

#[derive(Debug, Clone)]
pub struct CallFrame {
	pub chunk: u16,
	/// Operand stack height when the frame was entered.
	pub frame_pointer: usize,
	pub scope: Arc<Scope>,
}

#[derive(Debug, Default)]
pub struct CallStack {
	frames: Vec<CallFrame>,
}

impl CallStack {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, frame: CallFrame) {
		self.frames.push(frame);
	}

	pub fn pop(&mut self) -> Option<CallFrame> {
		self.frames.pop()
	}

	pub fn current(&self) -> Option<&CallFrame> {
		self.frames.last()
	}

	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
}
