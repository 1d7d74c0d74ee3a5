// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use flux_type::Nature;
use serde::{Deserialize, Serialize};

/// The types a table column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColType {
	Bool,
	Int,
	UInt,
	Float,
	String,
	Time,
}

impl ColType {
	pub fn from_nature(nature: Nature) -> Option<ColType> {
		match nature {
			Nature::Bool => Some(ColType::Bool),
			Nature::Int => Some(ColType::Int),
			Nature::UInt => Some(ColType::UInt),
			Nature::Float => Some(ColType::Float),
			Nature::String => Some(ColType::String),
			Nature::Time => Some(ColType::Time),
			_ => None,
		}
	}

	pub fn nature(&self) -> Nature {
		match self {
			ColType::Bool => Nature::Bool,
			ColType::Int => Nature::Int,
			ColType::UInt => Nature::UInt,
			ColType::Float => Nature::Float,
			ColType::String => Nature::String,
			ColType::Time => Nature::Time,
		}
	}

	pub fn as_str(&self) -> &'static str {
		self.nature().as_str()
	}
}

impl Display for ColType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColMeta {
	pub label: String,
	pub ty: ColType,
}

impl ColMeta {
	pub fn new(label: impl Into<String>, ty: ColType) -> Self {
		Self {
			label: label.into(),
			ty,
		}
	}
}

impl Display for ColMeta {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.label, self.ty)
	}
}
