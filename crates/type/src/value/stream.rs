// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{any::Any, fmt::Debug, sync::Arc};

/// A value that produces tables asynchronously, such as a running query.
/// Consumers downcast to the concrete stream type.
pub trait Stream: Debug + Send + Sync {
	fn as_any(&self) -> &dyn Any;

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
