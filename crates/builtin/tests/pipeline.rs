// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_builtin::Library;
use flux_column::{Allocator, Table};
use flux_execute::Executor;
use flux_plan::{Spec, explain};
use flux_runtime::{Context, FixedClock};
use flux_type::{
	Arguments, Array, BinaryOp, Duration, Param, Record, Result, TableObject, Time, Type, Value, binary,
};
use flux_vm::UNIVERSE;

fn library() -> Library {
	Library::standard(Arc::new(FixedClock::new(Time::from_secs(100))))
}

fn call(library: &Library, package: &str, name: &str, args: Vec<(&str, Value)>) -> Value {
	let record = library.functions.package(package).unwrap();
	let function = record.get(name).unwrap().as_function().unwrap().clone();
	let args = Arguments::new(name, args.into_iter().collect::<Record>());
	let value = function.call(&args).unwrap();
	args.check_unused().unwrap();
	value
}

fn rows(library: &Library, rows: Vec<(&str, i64, i64)>) -> Value {
	let records = rows
		.into_iter()
		.map(|(host, t, v)| {
			let record: Record = [
				("host", Value::string(host)),
				("_time", Value::time(Time::from_secs(t))),
				("_value", Value::int(v)),
			]
			.into_iter()
			.collect();
			Value::record(record)
		})
		.collect();
	call(library, "array", "from", vec![("rows", Value::array(Array::from_values(records)))])
}

/// Lambda `(r) => <body>` as a native function.
#[derive(Debug)]
struct Lambda(fn(&Record) -> Result<Value>);

impl flux_type::Function for Lambda {
	fn name(&self) -> &str {
		"lambda"
	}

	fn ty(&self) -> Type {
		Type::function(vec![Param::required("r", Type::Var(0))], Type::Var(1))
	}

	fn call(&self, args: &Arguments) -> Result<Value> {
		(self.0)(&args.get_required_record("r")?)
	}
}

fn lambda(body: fn(&Record) -> Result<Value>) -> Value {
	Value::function(Arc::new(Lambda(body)))
}

struct Run {
	results: Vec<(String, Vec<Table>)>,
	plan: String,
}

fn run(library: &Library, roots: Vec<Value>) -> Run {
	let objects: Vec<Arc<TableObject>> = roots.iter().map(|v| v.as_table_object().unwrap().clone()).collect();
	let spec = Spec::from_table_objects(&objects, Time::from_secs(100), &library.operations).unwrap();
	let planner = library.planner().build().unwrap();
	let plan = planner.plan(&spec, &library.operations).unwrap();
	let rendered = explain(&plan);

	let alloc = Allocator::shared(None);
	let executor = Executor::new(Arc::new(library.transformations.clone()));
	let query = executor.execute(&Context::new(), &plan, alloc.clone()).unwrap();
	let mut results = Vec::new();
	for result in query.results().iter() {
		let tables: Vec<Table> = result.tables().collect();
		results.push((result.name().to_string(), tables));
	}
	query.done();
	assert!(query.err().is_none(), "query failed: {:?}", query.err());
	Run {
		results,
		plan: rendered,
	}
}

fn column(table: &Table, label: &str) -> Vec<Value> {
	let idx = table.index(label).unwrap();
	table.rows().map(|row| row[idx].clone()).collect()
}

#[test]
fn test_range_filter_map_pipeline() {
	let library = library();
	let source = rows(&library, vec![("a", 10, 1), ("a", 20, 2), ("a", 30, 3), ("a", 200, 4)]);
	let ranged = call(
		&library,
		UNIVERSE,
		"range",
		vec![("tables", source), ("start", Value::duration(Duration::from_secs(-95)))],
	);
	let filtered = call(
		&library,
		UNIVERSE,
		"filter",
		vec![
			("tables", ranged),
			(
				"fn",
				lambda(|r| binary(BinaryOp::Gt, r.get("_value").unwrap_or(&Value::int(0)), &Value::int(1))),
			),
		],
	);
	let mapped = call(
		&library,
		UNIVERSE,
		"map",
		vec![
			("tables", filtered),
			(
				"fn",
				lambda(|r| {
					let v = r.get("_value").cloned().unwrap_or(Value::int(0));
					Ok(Value::record(r.set("v2", binary(BinaryOp::Mul, &v, &Value::int(2))?)))
				}),
			),
		],
	);

	let run = run(&library, vec![mapped]);
	// range and filter were folded into the source
	assert!(!run.plan.contains("range"), "{}", run.plan);
	assert!(!run.plan.contains("filter"), "{}", run.plan);

	assert_eq!(run.results.len(), 1);
	let (name, tables) = &run.results[0];
	assert_eq!(name, "_result");
	assert_eq!(tables.len(), 1);
	assert_eq!(column(&tables[0], "v2"), vec![Value::int(4), Value::int(6)]);
	assert_eq!(tables[0].key().label_value("_start"), Some(&Value::time(Time::from_secs(5))));
}

#[test]
fn test_group_splits_by_host() {
	let library = library();
	let source = rows(&library, vec![("a", 1, 1), ("b", 2, 2), ("a", 3, 3)]);
	let columns = Value::array(Array::from_values(vec![Value::string("host")]));
	let grouped = call(&library, UNIVERSE, "group", vec![("tables", source), ("columns", columns)]);

	let run = run(&library, vec![grouped]);
	let tables = &run.results[0].1;
	assert_eq!(tables.len(), 2);
	let mut sizes: Vec<_> = tables.iter().map(|t| (t.key().to_string(), t.nrows())).collect();
	sizes.sort();
	assert_eq!(sizes, vec![("{host=a}".to_string(), 2), ("{host=b}".to_string(), 1)]);
}

#[test]
fn test_chain_emits_first_then_second() {
	let library = library();
	let first = rows(&library, vec![("a", 1, 1), ("a", 2, 2)]);
	let second = rows(&library, vec![("b", 3, 3)]);
	let chained = call(&library, UNIVERSE, "chain", vec![("first", first), ("second", second)]);

	let run = run(&library, vec![chained]);
	let values: Vec<_> = run.results[0].1.iter().flat_map(|t| column(t, "_value")).collect();
	assert_eq!(values, vec![Value::int(1), Value::int(2), Value::int(3)]);
}

#[test]
fn test_named_yields_and_union() {
	let library = library();
	let left = rows(&library, vec![("a", 1, 1)]);
	let right = rows(&library, vec![("b", 2, 2)]);
	let both = Value::array(Array::from_values(vec![left, right]));
	let merged = call(&library, UNIVERSE, "union", vec![("tables", both)]);
	let limited = call(&library, UNIVERSE, "limit", vec![("tables", merged), ("n", Value::int(1))]);
	let named = call(&library, UNIVERSE, "yield", vec![("tables", limited), ("name", Value::string("first"))]);

	let run = run(&library, vec![named]);
	assert_eq!(run.results.len(), 1);
	assert_eq!(run.results[0].0, "first");
	let rows: usize = run.results[0].1.iter().map(Table::nrows).sum();
	assert_eq!(rows, 2);
}

#[test]
fn test_keep_pushed_into_source() {
	let library = library();
	let source = rows(&library, vec![("a", 1, 1)]);
	let columns = Value::array(Array::from_values(vec![Value::string("_value")]));
	let kept = call(&library, UNIVERSE, "keep", vec![("tables", source), ("columns", columns)]);

	let run = run(&library, vec![kept]);
	assert!(!run.plan.contains("keep"), "{}", run.plan);
	let table = &run.results[0].1[0];
	assert_eq!(table.ncols(), 1);
	assert_eq!(column(table, "_value"), vec![Value::int(1)]);
}

#[test]
fn test_unknown_argument_rejected_when_planning() {
	let library = library();
	let object = TableObject::new(
		"limit",
		[("n", Value::int(1)), ("bogus", Value::int(1))].into_iter().collect(),
		vec![],
	);
	let err = Spec::from_table_objects(&[Arc::new(object)], Time(0), &library.operations).unwrap_err();
	assert_eq!(err.code(), "VALUE_005");
}
