// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::{
		Arc,
		atomic::{AtomicI64, Ordering},
	},
};

use flux_type::{
	Arguments, BinaryOp, ErrorKind, Function, Nature, Param, Record, Result, TableObject, Time, Type, Value,
};
use flux_vm::{
	BuiltinRegistry, CompileOptions, Host, Machine, Synthesizer, UNIVERSE,
	ast::{Expression, FunctionParam, LogicalOp, Package, Statement},
};
use parking_lot::Mutex;

struct Native {
	name: &'static str,
	ty: Type,
	body: Box<dyn Fn(&Arguments) -> Result<Value> + Send + Sync>,
}

impl Native {
	fn new<F>(name: &'static str, params: Vec<Param>, body: F) -> Arc<dyn Function>
	where
		F: Fn(&Arguments) -> Result<Value> + Send + Sync + 'static,
	{
		Arc::new(Self {
			name,
			ty: Type::function(params, Type::Stream),
			body: Box::new(body),
		})
	}
}

impl Debug for Native {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name)
	}
}

impl Function for Native {
	fn name(&self) -> &str {
		self.name
	}

	fn ty(&self) -> Type {
		self.ty.clone()
	}

	fn call(&self, args: &Arguments) -> Result<Value> {
		(self.body)(args)
	}
}

#[derive(Default)]
struct RecordingHost {
	calls: Mutex<Vec<(Vec<Arc<TableObject>>, Time)>>,
}

impl Host for RecordingHost {
	fn execute(&self, side_effects: Vec<Arc<TableObject>>, now: Time) -> Result<Value> {
		self.calls.lock().push((side_effects, now));
		Ok(Value::null(Nature::Stream))
	}
}

fn builtins() -> BuiltinRegistry {
	let mut registry = BuiltinRegistry::new();
	registry
		.register_function(
			UNIVERSE,
			Native::new("source", vec![], |_| Ok(Value::table_object(TableObject::new("source", Record::new(), vec![])))),
		)
		.register_function(
			UNIVERSE,
			Native::new("limit", vec![Param::pipe("tables"), Param::required("n", Type::INT)], |args| {
				let parent = args.get_required_table_object("tables")?;
				let n = args.get_required_int("n")?;
				let record: Record = [("n", Value::int(n))].into_iter().collect();
				Ok(Value::table_object(TableObject::new("limit", record, vec![parent])))
			}),
		)
		.register("math", "two", Value::int(2));
	registry
}

fn run(package: Package, options: CompileOptions) -> (Machine, Arc<RecordingHost>, Result<Value>) {
	let program = Arc::new(Synthesizer::synthesize(&package, &options).unwrap());
	let host = Arc::new(RecordingHost::default());
	let mut machine = Machine::new(program, &builtins()).unwrap().with_host(host.clone());
	let result = machine.run();
	(machine, host, result)
}

fn at(secs: i64) -> CompileOptions {
	CompileOptions::with_now(Time::from_secs(secs))
}

fn add_fields() -> Expression {
	Expression::function(
		vec![FunctionParam::new("r")],
		Expression::binary(
			BinaryOp::Add,
			Expression::member(Expression::ident("r"), "a"),
			Expression::member(Expression::ident("r"), "b"),
		),
	)
}

#[test]
fn test_missing_and_null_fields_propagate_null() {
	let package = Package::new(vec![
		Statement::var("f", add_fields()),
		Statement::var(
			"missing",
			Expression::call(Expression::ident("f"), vec![("r", Expression::record(vec![("a", Expression::literal(4i64))]))]),
		),
		Statement::var(
			"null",
			Expression::call(
				Expression::ident("f"),
				vec![(
					"r",
					Expression::record(vec![
						("a", Expression::literal(4i64)),
						("b", Expression::literal(Value::null(Nature::Int))),
					]),
				)],
			),
		),
		Statement::var(
			"full",
			Expression::call(
				Expression::ident("f"),
				vec![(
					"r",
					Expression::record(vec![("a", Expression::literal(4i64)), ("b", Expression::literal(5i64))]),
				)],
			),
		),
	]);
	let (machine, _, result) = run(package, at(0));
	result.unwrap();

	let globals = machine.globals();
	assert!(globals.lookup("missing").unwrap().is_null());
	assert!(globals.lookup("null").unwrap().is_null());
	assert_eq!(globals.lookup("full"), Some(Value::int(9)));
}

#[test]
fn test_record_with_merges_overrides() {
	let package = Package::new(vec![
		Statement::var(
			"base",
			Expression::record(vec![("a", Expression::literal(1i64)), ("b", Expression::literal(2i64))]),
		),
		Statement::var(
			"merged",
			Expression::record_with(
				Expression::ident("base"),
				vec![("b", Expression::literal(3i64)), ("c", Expression::literal(4i64))],
			),
		),
	]);
	let (machine, _, result) = run(package, at(0));
	result.unwrap();

	let expected: Record = [("a", Value::int(1)), ("b", Value::int(3)), ("c", Value::int(4))].into_iter().collect();
	assert_eq!(machine.globals().lookup("merged"), Some(Value::record(expected)));
}

#[test]
fn test_record_with_null_base_fails() {
	let package = Package::new(vec![
		Statement::var("base", Expression::record(vec![("a", Expression::literal(1i64))])),
		Statement::var(
			"merged",
			Expression::record_with(
				Expression::member(Expression::ident("base"), "missing"),
				vec![("b", Expression::literal(2i64))],
			),
		),
	]);
	let (_, _, result) = run(package, at(0));
	let err = result.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Invalid);
	assert_eq!(err.code(), "VALUE_002");
}

#[test]
fn test_now_is_frozen_at_program_start() {
	let ticks = Arc::new(AtomicI64::new(100));
	let clock = {
		let ticks = ticks.clone();
		Native::new("clock", vec![], move |_| Ok(Value::time(Time::from_secs(ticks.fetch_add(1, Ordering::SeqCst)))))
	};
	let mut registry = builtins();
	registry.register_function(UNIVERSE, clock);

	let package = Package::new(vec![
		Statement::option("now", Expression::ident("clock")),
		Statement::var("a", Expression::call(Expression::ident("now"), vec![])),
		Statement::var("b", Expression::call(Expression::ident("now"), vec![])),
		Statement::expr(Expression::call(Expression::ident("source"), vec![])),
	]);
	let program = Arc::new(Synthesizer::synthesize(&package, &CompileOptions::default()).unwrap());
	let host = Arc::new(RecordingHost::default());
	let mut machine = Machine::new(program, &registry).unwrap().with_host(host.clone());
	machine.run().unwrap();

	assert_eq!(ticks.load(Ordering::SeqCst), 101);
	let expected = Time::from_secs(100);
	assert_eq!(machine.now(), Some(expected));
	assert_eq!(machine.globals().lookup("a"), Some(Value::time(expected)));
	assert_eq!(machine.globals().lookup("b"), Some(Value::time(expected)));
	assert_eq!(host.calls.lock()[0].1, expected);
}

#[test]
fn test_bound_now_overrides_option() {
	let package = Package::new(vec![
		Statement::option("now", Expression::literal(Time::from_secs(1))),
		Statement::var("a", Expression::call(Expression::ident("now"), vec![])),
	]);
	let (machine, host, result) = run(package, at(7));
	result.unwrap();
	assert_eq!(machine.globals().lookup("a"), Some(Value::time(Time::from_secs(7))));
	assert_eq!(host.calls.lock()[0].1, Time::from_secs(7));
}

#[test]
fn test_only_table_expression_statements_are_side_effects() {
	let package = Package::new(vec![
		Statement::var("t", Expression::call(Expression::ident("source"), vec![])),
		Statement::expr(Expression::binary(BinaryOp::Add, Expression::literal(1i64), Expression::literal(2i64))),
		Statement::expr(Expression::call(Expression::ident("source"), vec![])),
		Statement::expr(Expression::ident("t")),
	]);
	let (_, host, result) = run(package, at(0));
	result.unwrap();

	let calls = host.calls.lock();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].0.len(), 2);
	assert!(calls[0].0.iter().all(|object| object.kind == "source"));
}

#[test]
fn test_pipe_binds_pipe_parameter() {
	let package = Package::new(vec![Statement::expr(Expression::pipe(
		Expression::call(Expression::ident("source"), vec![]),
		Expression::call(Expression::ident("limit"), vec![("n", Expression::literal(3i64))]),
	))]);
	let (_, host, result) = run(package, at(0));
	result.unwrap();

	let calls = host.calls.lock();
	let limit = &calls[0].0[0];
	assert_eq!(limit.kind, "limit");
	assert_eq!(limit.args.get("n"), Some(&Value::int(3)));
	assert_eq!(limit.parents[0].kind, "source");
}

#[test]
fn test_unused_argument_is_rejected() {
	let package = Package::new(vec![Statement::expr(Expression::call(
		Expression::ident("source"),
		vec![("bogus", Expression::literal(1i64))],
	))]);
	let (_, _, result) = run(package, at(0));
	assert_eq!(result.unwrap_err().code(), "VALUE_005");
}

#[test]
fn test_closure_defaults_and_scope_capture() {
	let package = Package::new(vec![
		Statement::var("base", Expression::literal(10i64)),
		Statement::var(
			"add",
			Expression::function(
				vec![FunctionParam::new("x"), FunctionParam::new("y").with_default(Expression::literal(1i64))],
				Expression::binary(
					BinaryOp::Add,
					Expression::ident("base"),
					Expression::binary(BinaryOp::Add, Expression::ident("x"), Expression::ident("y")),
				),
			),
		),
		Statement::var("a", Expression::call(Expression::ident("add"), vec![("x", Expression::literal(2i64))])),
		Statement::var(
			"b",
			Expression::call(
				Expression::ident("add"),
				vec![("x", Expression::literal(2i64)), ("y", Expression::literal(5i64))],
			),
		),
	]);
	let (machine, _, result) = run(package, at(0));
	result.unwrap();
	assert_eq!(machine.globals().lookup("a"), Some(Value::int(13)));
	assert_eq!(machine.globals().lookup("b"), Some(Value::int(17)));
}

#[test]
fn test_logical_operators_short_circuit() {
	let logical = |op: LogicalOp, left: bool| Expression::Logical {
		op,
		left: Box::new(Expression::literal(left)),
		right: Box::new(Expression::ident("undefined")),
	};
	let package = Package::new(vec![
		Statement::var("and", logical(LogicalOp::And, false)),
		Statement::var("or", logical(LogicalOp::Or, true)),
		Statement::var(
			"choice",
			Expression::Conditional {
				test: Box::new(Expression::literal(Value::null(Nature::Bool))),
				consequent: Box::new(Expression::literal(1i64)),
				alternate: Box::new(Expression::literal(2i64)),
			},
		),
	]);
	let (machine, _, result) = run(package, at(0));
	result.unwrap();
	assert_eq!(machine.globals().lookup("and"), Some(Value::bool(false)));
	assert_eq!(machine.globals().lookup("or"), Some(Value::bool(true)));
	assert_eq!(machine.globals().lookup("choice"), Some(Value::int(2)));
}

#[test]
fn test_imports_bind_package_records() {
	let package = Package::new(vec![Statement::var("x", Expression::member(Expression::ident("math"), "two"))])
		.import("math");
	let (machine, _, result) = run(package, at(0));
	result.unwrap();
	assert_eq!(machine.globals().lookup("x"), Some(Value::int(2)));

	let unknown = Package::new(vec![]).import("nope");
	let program = Arc::new(Synthesizer::synthesize(&unknown, &CompileOptions::default()).unwrap());
	let err = Machine::new(program, &builtins()).err().unwrap();
	assert_eq!(err.code(), "RUNTIME_001");
}

#[test]
fn test_undefined_identifier() {
	let package = Package::new(vec![Statement::expr(Expression::ident("nope"))]);
	let (_, _, result) = run(package, at(0));
	let err = result.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Invalid);
	assert_eq!(err.code(), "RUNTIME_001");
}

#[test]
fn test_missing_now_and_host() {
	let package = Package::new(vec![]);
	let program = Arc::new(Synthesizer::synthesize(&package, &CompileOptions::default()).unwrap());
	let err = Machine::new(program, &builtins()).unwrap().run().unwrap_err();
	assert_eq!(err.code(), "RUNTIME_007");

	let program = Arc::new(Synthesizer::synthesize(&package, &at(0)).unwrap());
	let err = Machine::new(program, &builtins()).unwrap().run().unwrap_err();
	assert_eq!(err.code(), "RUNTIME_008");
}

#[test]
fn test_calling_a_non_function() {
	let package = Package::new(vec![Statement::expr(Expression::call(Expression::literal(1i64), vec![]))]);
	let (_, _, result) = run(package, at(0));
	assert_eq!(result.unwrap_err().kind(), ErrorKind::Invalid);
}
