// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod explain;
pub mod operation;
pub mod pattern;
pub mod plan;
pub mod planner;
pub mod procedure;
pub mod registry;
pub mod rule;
pub mod spec;
pub mod trigger;

pub use explain::explain;
pub use operation::{Edge, Operation, OperationId, OperationSpec};
pub use pattern::Pattern;
pub use plan::{NodeIdx, NodeKind, PlanNode, PlanSpec};
pub use planner::{Planner, PlannerBuilder};
pub use procedure::{Bounds, Cost, ProcedureKind, ProcedureSpec, YIELD_KIND, YieldProcedureSpec};
pub use registry::{CreateOperationSpec, CreateProcedureSpec, OperationRegistry};
pub use rule::{Measure, Rule};
pub use spec::Spec;
pub use trigger::TriggerSpec;
