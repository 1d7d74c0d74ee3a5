// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Rule based planning.
//!
//! Planning runs in two phases. The logical phase lowers the operation
//! spec into a plan mirroring the operation DAG and rewrites it with the
//! logical rules. The physical phase marks nodes physical, rewrites them
//! with the physical rules, then finalizes the plan: bounds, implicit
//! yields and triggers.
//!
//! Both phases drive their rules to a fixed point. The planner walks the
//! plan from its roots and tries every rule, in registration order, on
//! every node its pattern matches. As soon as one rule changes the plan
//! the walk restarts from the roots. Each rule declares a [`Measure`] and
//! the planner checks that every change strictly decreases it, so planning
//! always terminates.

use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};

use flux_type::{
	Result,
	error::diagnostic::plan::{duplicate_rule, iteration_limit, missing_kind_rank, rule_not_terminating},
	return_error,
};
use tracing::{debug, trace};

use crate::{
	plan::PlanSpec,
	procedure::{ProcedureKind, ProcedureSpec},
	registry::OperationRegistry,
	rule::{Measure, Rule},
	spec::Spec,
	trigger::TriggerSpec,
};

mod logical;
mod physical;

pub type PhysicalConverter = Arc<dyn Fn(&dyn ProcedureSpec) -> Result<Box<dyn ProcedureSpec>> + Send + Sync>;

const DEFAULT_ITERATION_LIMIT: usize = 10_000;

pub struct PlannerBuilder {
	logical_rules: Vec<Arc<dyn Rule>>,
	physical_rules: Vec<Arc<dyn Rule>>,
	kind_ranks: HashMap<ProcedureKind, u64>,
	converters: HashMap<ProcedureKind, PhysicalConverter>,
	physical_kinds: Option<HashSet<ProcedureKind>>,
	default_trigger: TriggerSpec,
	disable_physical_validation: bool,
	iteration_limit: usize,
}

impl Default for PlannerBuilder {
	fn default() -> Self {
		Self {
			logical_rules: Vec::new(),
			physical_rules: Vec::new(),
			kind_ranks: HashMap::new(),
			converters: HashMap::new(),
			physical_kinds: None,
			default_trigger: TriggerSpec::default(),
			disable_physical_validation: false,
			iteration_limit: DEFAULT_ITERATION_LIMIT,
		}
	}
}

impl PlannerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn logical_rule(mut self, rule: Arc<dyn Rule>) -> Self {
		self.logical_rules.push(rule);
		self
	}

	pub fn logical_rules(mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Self {
		self.logical_rules.extend(rules);
		self
	}

	pub fn physical_rule(mut self, rule: Arc<dyn Rule>) -> Self {
		self.physical_rules.push(rule);
		self
	}

	pub fn physical_rules(mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Self {
		self.physical_rules.extend(rules);
		self
	}

	pub fn kind_rank(mut self, kind: impl Into<ProcedureKind>, rank: u64) -> Self {
		self.kind_ranks.insert(kind.into(), rank);
		self
	}

	/// Replaces the procedure spec of `kind` when it becomes physical.
	pub fn physical_converter(mut self, kind: impl Into<ProcedureKind>, converter: PhysicalConverter) -> Self {
		self.converters.insert(kind.into(), converter);
		self
	}

	/// Kinds the executor can run; physical validation rejects any other.
	pub fn physical_kinds(mut self, kinds: impl IntoIterator<Item = ProcedureKind>) -> Self {
		self.physical_kinds = Some(kinds.into_iter().collect());
		self
	}

	pub fn default_trigger(mut self, trigger: TriggerSpec) -> Self {
		self.default_trigger = trigger;
		self
	}

	pub fn disable_physical_validation(mut self) -> Self {
		self.disable_physical_validation = true;
		self
	}

	pub fn iteration_limit(mut self, limit: usize) -> Self {
		self.iteration_limit = limit;
		self
	}

	pub fn build(self) -> Result<Planner> {
		let mut names = HashSet::new();
		for rule in self.logical_rules.iter().chain(self.physical_rules.iter()) {
			if !names.insert(rule.name().to_string()) {
				return_error!(duplicate_rule(rule.name()));
			}
			if rule.measure() == Measure::KindRank {
				let kind = rule.pattern().root_kind().cloned();
				match kind {
					Some(kind) if self.kind_ranks.contains_key(&kind) => {}
					Some(kind) => return_error!(missing_kind_rank(rule.name(), kind.as_str())),
					None => return_error!(missing_kind_rank(rule.name(), "<any>")),
				}
			}
		}
		Ok(Planner {
			logical_rules: self.logical_rules,
			physical_rules: self.physical_rules,
			kind_ranks: self.kind_ranks,
			converters: self.converters,
			physical_kinds: self.physical_kinds,
			default_trigger: self.default_trigger,
			disable_physical_validation: self.disable_physical_validation,
			iteration_limit: self.iteration_limit,
		})
	}
}

pub struct Planner {
	logical_rules: Vec<Arc<dyn Rule>>,
	physical_rules: Vec<Arc<dyn Rule>>,
	kind_ranks: HashMap<ProcedureKind, u64>,
	converters: HashMap<ProcedureKind, PhysicalConverter>,
	physical_kinds: Option<HashSet<ProcedureKind>>,
	default_trigger: TriggerSpec,
	disable_physical_validation: bool,
	iteration_limit: usize,
}

impl Planner {
	pub fn builder() -> PlannerBuilder {
		PlannerBuilder::new()
	}

	/// Logical then physical planning.
	pub fn plan(&self, spec: &Spec, registry: &OperationRegistry) -> Result<PlanSpec> {
		let mut plan = self.plan_logical(spec, registry)?;
		self.plan_physical(&mut plan)?;
		Ok(plan)
	}

	pub fn plan_logical(&self, spec: &Spec, registry: &OperationRegistry) -> Result<PlanSpec> {
		let mut plan = logical::lower(spec, registry)?;
		self.apply_rules(&mut plan, &self.logical_rules, "logical")?;
		Ok(plan)
	}

	pub fn plan_physical(&self, plan: &mut PlanSpec) -> Result<()> {
		physical::convert(plan, &self.converters)?;
		self.apply_rules(plan, &self.physical_rules, "physical")?;
		physical::finalize(plan, &self.default_trigger)?;
		if !self.disable_physical_validation {
			physical::validate(plan, self.physical_kinds.as_ref())?;
		}
		Ok(())
	}

	fn apply_rules(&self, plan: &mut PlanSpec, rules: &[Arc<dyn Rule>], phase: &str) -> Result<()> {
		let mut rewrites = 0;
		'fixed_point: loop {
			for idx in plan.walk_from_roots() {
				for rule in rules {
					if !rule.pattern().matches(plan, idx) {
						continue;
					}
					let measure = rule.measure();
					let before = measure.evaluate(plan, &self.kind_ranks);
					if !rule.rewrite(plan, idx)? {
						continue;
					}
					let after = measure.evaluate(plan, &self.kind_ranks);
					if after >= before {
						return_error!(rule_not_terminating(rule.name(), &measure.to_string(), before, after));
					}
					rewrites += 1;
					debug!(phase, rule = rule.name(), node = %idx, before, after, "rule applied");
					if rewrites >= self.iteration_limit {
						return_error!(iteration_limit(self.iteration_limit));
					}
					continue 'fixed_point;
				}
			}
			break;
		}
		trace!(phase, rewrites, nodes = plan.len(), "fixed point reached");
		Ok(())
	}
}
