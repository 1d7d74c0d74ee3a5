// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use flux_plan::{Bounds, ProcedureKind, ProcedureSpec, TriggerSpec};
use flux_type::{Result, error::diagnostic::query::transformation_not_found, internal_err, return_error};

use crate::{
	context::ExecutionContext,
	dataset::{Dataset, DatasetId},
	source::Source,
	transformation::Transformation,
};

/// Everything a factory needs to instantiate one plan node.
pub struct CreateContext<'a> {
	pub id: DatasetId,
	pub spec: &'a dyn ProcedureSpec,
	pub parents: Vec<DatasetId>,
	pub trigger: TriggerSpec,
	pub bounds: Option<Bounds>,
	pub exec: &'a ExecutionContext,
}

impl CreateContext<'_> {
	/// Downcasts the procedure spec to the concrete type a factory expects.
	pub fn spec<T: 'static>(&self) -> Result<&T> {
		match self.spec.as_any().downcast_ref::<T>() {
			Some(spec) => Ok(spec),
			None => internal_err!(
				"procedure {} has an unexpected spec type for {}",
				self.spec.kind(),
				self.id
			),
		}
	}
}

pub type CreateSource = Arc<dyn Fn(&CreateContext<'_>) -> Result<Box<dyn Source>> + Send + Sync>;

pub type CreateTransformation =
	Arc<dyn Fn(&CreateContext<'_>) -> Result<(Arc<dyn Transformation>, Arc<dyn Dataset>)> + Send + Sync>;

/// Factories for sources and transformations, keyed by procedure kind.
#[derive(Default, Clone)]
pub struct TransformationRegistry {
	sources: HashMap<ProcedureKind, CreateSource>,
	transformations: HashMap<ProcedureKind, CreateTransformation>,
}

impl TransformationRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register_source<F>(&mut self, kind: impl Into<ProcedureKind>, create: F)
	where
		F: Fn(&CreateContext<'_>) -> Result<Box<dyn Source>> + Send + Sync + 'static,
	{
		self.sources.insert(kind.into(), Arc::new(create));
	}

	pub fn register_transformation<F>(&mut self, kind: impl Into<ProcedureKind>, create: F)
	where
		F: Fn(&CreateContext<'_>) -> Result<(Arc<dyn Transformation>, Arc<dyn Dataset>)> + Send + Sync + 'static,
	{
		self.transformations.insert(kind.into(), Arc::new(create));
	}

	pub fn has_source(&self, kind: &ProcedureKind) -> bool {
		self.sources.contains_key(kind)
	}

	pub fn create_source(&self, create: &CreateContext<'_>) -> Result<Box<dyn Source>> {
		let kind = create.spec.kind();
		match self.sources.get(&kind) {
			Some(factory) => factory(create),
			None => return_error!(transformation_not_found(kind.as_str())),
		}
	}

	pub fn create_transformation(
		&self,
		create: &CreateContext<'_>,
	) -> Result<(Arc<dyn Transformation>, Arc<dyn Dataset>)> {
		let kind = create.spec.kind();
		match self.transformations.get(&kind) {
			Some(factory) => factory(create),
			None => return_error!(transformation_not_found(kind.as_str())),
		}
	}

	/// Registered kinds, sources first, each group sorted.
	pub fn kinds(&self) -> Vec<ProcedureKind> {
		let mut sources: Vec<_> = self.sources.keys().cloned().collect();
		sources.sort();
		let mut transformations: Vec<_> = self.transformations.keys().cloned().collect();
		transformations.sort();
		sources.extend(transformations);
		sources
	}
}
