// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	bytecode::opcode::Opcode,
	error::{Result, VmError},
};

/// Append-only bytecode buffer. Operands are little endian. The only
/// in-place edit is back-patching a forward jump target.
#[derive(Debug, Default)]
pub struct BytecodeWriter {
	buf: Vec<u8>,
}

impl BytecodeWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn position(&self) -> usize {
		self.buf.len()
	}

	pub fn emit_opcode(&mut self, opcode: Opcode) {
		self.buf.push(opcode as u8);
	}

	pub fn emit_u8(&mut self, value: u8) {
		self.buf.push(value);
	}

	pub fn emit_u16(&mut self, value: u16) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	pub fn emit_u32(&mut self, value: u32) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	/// Emits `opcode` with a placeholder target; returns the placeholder
	/// position for [`BytecodeWriter::patch_jump`].
	pub fn emit_jump(&mut self, opcode: Opcode) -> usize {
		self.emit_opcode(opcode);
		let at = self.position();
		self.emit_u32(u32::MAX);
		at
	}

	/// Points the jump placeholder at `at` to the current position.
	pub fn patch_jump(&mut self, at: usize) {
		let target = (self.buf.len() as u32).to_le_bytes();
		self.buf[at..at + 4].copy_from_slice(&target);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

pub struct BytecodeReader<'a> {
	bytes: &'a [u8],
	position: usize,
}

impl<'a> BytecodeReader<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
			position: 0,
		}
	}

	pub fn position(&self) -> usize {
		self.position
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub fn is_at_end(&self) -> bool {
		self.position >= self.bytes.len()
	}

	pub fn seek(&mut self, target: usize) -> Result<()> {
		if target > self.bytes.len() {
			return Err(VmError::InvalidJump {
				target,
				len: self.bytes.len(),
			});
		}
		self.position = target;
		Ok(())
	}

	fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
		let end = self.position + N;
		let Some(slice) = self.bytes.get(self.position..end) else {
			return Err(VmError::UnexpectedEnd {
				position: self.position,
			});
		};
		let mut out = [0u8; N];
		out.copy_from_slice(slice);
		self.position = end;
		Ok(out)
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.take::<1>()?[0])
	}

	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.take::<2>()?))
	}

	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.take::<4>()?))
	}

	pub fn read_opcode(&mut self) -> Result<Opcode> {
		Opcode::try_from(self.read_u8()?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_patch_forward_jump() {
		let mut writer = BytecodeWriter::new();
		let at = writer.emit_jump(Opcode::JumpIfFalse);
		writer.emit_opcode(Opcode::Pop);
		writer.patch_jump(at);
		let bytes = writer.finish();

		let mut reader = BytecodeReader::new(&bytes);
		assert_eq!(reader.read_opcode().unwrap(), Opcode::JumpIfFalse);
		assert_eq!(reader.read_u32().unwrap(), 6);
		assert_eq!(reader.read_opcode().unwrap(), Opcode::Pop);
		assert!(reader.is_at_end());
	}

	#[test]
	fn test_truncated_operand() {
		let mut reader = BytecodeReader::new(&[Opcode::LoadValue as u8, 0x01]);
		reader.read_opcode().unwrap();
		assert!(matches!(
			reader.read_u16(),
			Err(VmError::UnexpectedEnd {
				position: 1
			})
		));
	}

	#[test]
	fn test_seek_past_end() {
		let mut reader = BytecodeReader::new(&[0; 4]);
		assert!(reader.seek(4).is_ok());
		assert!(matches!(
			reader.seek(5),
			Err(VmError::InvalidJump {
				target: 5,
				len: 4
			})
		));
	}
}
