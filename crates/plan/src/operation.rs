// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	fmt::{Debug, Display, Formatter},
	sync::Arc,
};

use serde::{Deserialize, Serialize};

/// Kind-specific parameters of one operation, as written by the user.
pub trait OperationSpec: Debug + Send + Sync {
	fn kind(&self) -> &str;

	fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub String);

impl OperationId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for OperationId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for OperationId {
	fn from(value: &str) -> Self {
		OperationId(value.to_string())
	}
}

#[derive(Debug, Clone)]
pub struct Operation {
	pub id: OperationId,
	pub spec: Arc<dyn OperationSpec>,
}

/// Data flows from `parent` to `child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
	pub parent: OperationId,
	pub child: OperationId,
}
