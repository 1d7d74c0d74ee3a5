// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Glue shared by the builtin registrations.

use std::sync::Arc;

use flux_execute::{
	CreateContext, Dataset, NarrowProcess, NarrowTransformation, Transformation, WideProcess, WideTransformation,
};
use flux_plan::{OperationSpec, ProcedureSpec};
use flux_type::{Result, internal_err};

pub(crate) type Created = (Arc<dyn Transformation>, Arc<dyn Dataset>);

/// Implements [`OperationSpec`](flux_plan::OperationSpec) for a spec type with a fixed kind.
macro_rules! operation_spec {
	($ty:ty, $kind:expr) => {
		impl flux_plan::OperationSpec for $ty {
			fn kind(&self) -> &str {
				$kind
			}

			fn as_any(&self) -> &dyn std::any::Any {
				self
			}
		}
	};
}

pub(crate) use operation_spec;

/// Lowers an operation spec that doubles as its own procedure spec.
pub(crate) fn lower<T>(spec: &dyn OperationSpec) -> Result<Box<dyn ProcedureSpec>>
where
	T: ProcedureSpec + Clone + 'static,
{
	match spec.as_any().downcast_ref::<T>() {
		Some(spec) => Ok(Box::new(spec.clone())),
		None => internal_err!("operation {} cannot be lowered", spec.kind()),
	}
}

pub(crate) fn narrow<P: NarrowProcess + 'static>(create: &CreateContext<'_>, body: P) -> Result<Created> {
	let transformation =
		Arc::new(NarrowTransformation::new(create.id.clone(), create.parents.clone(), body, create.exec.clone()));
	let dataset = transformation.dataset();
	Ok((transformation as Arc<dyn Transformation>, dataset as Arc<dyn Dataset>))
}

pub(crate) fn wide<P: WideProcess + 'static>(create: &CreateContext<'_>, body: P) -> Result<Created> {
	let transformation = Arc::new(WideTransformation::new(
		create.id.clone(),
		create.parents.clone(),
		create.trigger.clone(),
		body,
		create.exec.clone(),
	));
	let dataset = transformation.dataset();
	Ok((transformation as Arc<dyn Transformation>, dataset as Arc<dyn Dataset>))
}
