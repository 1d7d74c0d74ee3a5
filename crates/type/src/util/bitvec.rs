// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Debug, Formatter};

/// Growable bitmap, one bit per row.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitVec {
	bits: Vec<u8>,
	len: usize,
}

impl BitVec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			bits: Vec::with_capacity(capacity.div_ceil(8)),
			len: 0,
		}
	}

	pub fn repeat(len: usize, value: bool) -> Self {
		let fill = if value { 0xFF } else { 0x00 };
		let mut result = Self {
			bits: vec![fill; len.div_ceil(8)],
			len,
		};
		result.clear_tail();
		result
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn push(&mut self, bit: bool) {
		let byte = self.len / 8;
		if byte == self.bits.len() {
			self.bits.push(0);
		}
		if bit {
			self.bits[byte] |= 1 << (self.len % 8);
		}
		self.len += 1;
	}

	pub fn get(&self, idx: usize) -> bool {
		assert!(idx < self.len, "bit index {} out of range for length {}", idx, self.len);
		self.bits[idx / 8] & (1 << (idx % 8)) != 0
	}

	pub fn set(&mut self, idx: usize, bit: bool) {
		assert!(idx < self.len, "bit index {} out of range for length {}", idx, self.len);
		let mask = 1 << (idx % 8);
		if bit {
			self.bits[idx / 8] |= mask;
		} else {
			self.bits[idx / 8] &= !mask;
		}
	}

	pub fn extend(&mut self, other: &BitVec) {
		for bit in other.iter() {
			self.push(bit);
		}
	}

	pub fn truncate(&mut self, len: usize) {
		if len >= self.len {
			return;
		}
		self.len = len;
		self.bits.truncate(len.div_ceil(8));
		self.clear_tail();
	}

	pub fn clear(&mut self) {
		self.bits.clear();
		self.len = 0;
	}

	pub fn count_ones(&self) -> usize {
		self.bits.iter().map(|b| b.count_ones() as usize).sum()
	}

	pub fn all_ones(&self) -> bool {
		self.count_ones() == self.len
	}

	pub fn iter(&self) -> BitVecIter<'_> {
		BitVecIter {
			inner: self,
			pos: 0,
		}
	}

	/// Size of the backing storage in bytes.
	pub fn byte_size(&self) -> usize {
		self.bits.len()
	}

	fn clear_tail(&mut self) {
		let rem = self.len % 8;
		if rem != 0 {
			if let Some(last) = self.bits.last_mut() {
				*last &= (1u8 << rem) - 1;
			}
		}
	}
}

impl Debug for BitVec {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str("BitVec[")?;
		for bit in self.iter() {
			f.write_str(if bit { "1" } else { "0" })?;
		}
		f.write_str("]")
	}
}

impl FromIterator<bool> for BitVec {
	fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
		let mut result = BitVec::new();
		for bit in iter {
			result.push(bit);
		}
		result
	}
}

pub struct BitVecIter<'a> {
	inner: &'a BitVec,
	pos: usize,
}

impl Iterator for BitVecIter<'_> {
	type Item = bool;

	fn next(&mut self) -> Option<Self::Item> {
		if self.pos >= self.inner.len {
			return None;
		}
		let bit = self.inner.get(self.pos);
		self.pos += 1;
		Some(bit)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.inner.len - self.pos;
		(remaining, Some(remaining))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_push_and_get() {
		let mut bv = BitVec::new();
		for i in 0..20 {
			bv.push(i % 3 == 0);
		}
		assert_eq!(bv.len(), 20);
		assert!(bv.get(0));
		assert!(!bv.get(1));
		assert!(bv.get(18));
		assert_eq!(bv.count_ones(), 7);
	}

	#[test]
	fn test_repeat_and_truncate() {
		let mut bv = BitVec::repeat(11, true);
		assert!(bv.all_ones());
		bv.truncate(3);
		assert_eq!(bv.len(), 3);
		assert_eq!(bv.count_ones(), 3);
		bv.set(1, false);
		assert_eq!(bv.iter().collect::<Vec<_>>(), vec![true, false, true]);
	}
}
