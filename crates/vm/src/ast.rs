// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Checked syntax tree consumed by the synthesizer.
//!
//! The tree is produced by an external parser and type checker. Every
//! expression has already been checked, so the synthesizer only lowers it.

use flux_type::{BinaryOp, Result, Type, UnaryOp, Value};

/// Turns program text into a checked package.
pub trait Parser: Send + Sync {
	fn parse(&self, source: &str) -> Result<Package>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
	pub name: String,
	pub imports: Vec<ImportDecl>,
	pub body: Vec<Statement>,
}

impl Package {
	pub fn new(body: Vec<Statement>) -> Self {
		Self {
			name: "main".to_string(),
			imports: Vec::new(),
			body,
		}
	}

	pub fn import(mut self, path: impl Into<String>) -> Self {
		self.imports.push(ImportDecl {
			path: path.into(),
			alias: None,
		});
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
	pub path: String,
	pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
	Expression(Expression),
	/// `name = init`
	Variable {
		name: String,
		init: Expression,
	},
	/// `option name = value`
	Option {
		name: String,
		value: Expression,
	},
	Return(Expression),
}

impl Statement {
	pub fn expr(expression: Expression) -> Self {
		Statement::Expression(expression)
	}

	pub fn var(name: impl Into<String>, init: Expression) -> Self {
		Statement::Variable {
			name: name.into(),
			init,
		}
	}

	pub fn option(name: impl Into<String>, value: Expression) -> Self {
		Statement::Option {
			name: name.into(),
			value,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
	And,
	Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
	pub name: String,
	pub ty: Type,
	pub default: Option<Expression>,
	pub pipe: bool,
}

impl FunctionParam {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: Type::Var(0),
			default: None,
			pipe: false,
		}
	}

	pub fn with_default(mut self, default: Expression) -> Self {
		self.default = Some(default);
		self
	}

	pub fn piped(mut self) -> Self {
		self.pipe = true;
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
	Expression(Box<Expression>),
	Block(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
	Literal(Value),
	Identifier(String),
	Member {
		object: Box<Expression>,
		property: String,
	},
	Index {
		array: Box<Expression>,
		index: Box<Expression>,
	},
	Binary {
		op: BinaryOp,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	Unary {
		op: UnaryOp,
		operand: Box<Expression>,
	},
	Logical {
		op: LogicalOp,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	Conditional {
		test: Box<Expression>,
		consequent: Box<Expression>,
		alternate: Box<Expression>,
	},
	Call {
		callee: Box<Expression>,
		arguments: Vec<(String, Expression)>,
	},
	/// `argument |> call`; `call` must be a [`Expression::Call`].
	Pipe {
		argument: Box<Expression>,
		call: Box<Expression>,
	},
	Record {
		with: Option<Box<Expression>>,
		properties: Vec<(String, Expression)>,
	},
	Array(Vec<Expression>),
	Dict(Vec<(Expression, Expression)>),
	Function {
		params: Vec<FunctionParam>,
		body: FunctionBody,
	},
	/// Extracts one record from the output of a table expression.
	FindRecord {
		table: Box<Expression>,
		predicate: Option<Box<Expression>>,
		index: Box<Expression>,
	},
}

impl Expression {
	pub fn literal(value: impl Into<Value>) -> Self {
		Expression::Literal(value.into())
	}

	pub fn ident(name: impl Into<String>) -> Self {
		Expression::Identifier(name.into())
	}

	pub fn member(object: Expression, property: impl Into<String>) -> Self {
		Expression::Member {
			object: Box::new(object),
			property: property.into(),
		}
	}

	pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
		Expression::Binary {
			op,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn call(callee: Expression, arguments: Vec<(&str, Expression)>) -> Self {
		Expression::Call {
			callee: Box::new(callee),
			arguments: arguments.into_iter().map(|(name, value)| (name.to_string(), value)).collect(),
		}
	}

	pub fn pipe(argument: Expression, call: Expression) -> Self {
		Expression::Pipe {
			argument: Box::new(argument),
			call: Box::new(call),
		}
	}

	pub fn record(properties: Vec<(&str, Expression)>) -> Self {
		Expression::Record {
			with: None,
			properties: properties.into_iter().map(|(name, value)| (name.to_string(), value)).collect(),
		}
	}

	pub fn record_with(base: Expression, properties: Vec<(&str, Expression)>) -> Self {
		Expression::Record {
			with: Some(Box::new(base)),
			properties: properties.into_iter().map(|(name, value)| (name.to_string(), value)).collect(),
		}
	}

	/// A function literal whose body is a single expression.
	pub fn function(params: Vec<FunctionParam>, body: Expression) -> Self {
		Expression::Function {
			params,
			body: FunctionBody::Expression(Box::new(body)),
		}
	}

	/// Short label used in side-effect listings.
	pub fn describe(&self) -> String {
		match self {
			Expression::Literal(value) => format!("literal {}", value.nature()),
			Expression::Identifier(name) => format!("identifier {}", name),
			Expression::Member {
				property,
				..
			} => format!("member {}", property),
			Expression::Index {
				..
			} => "index".to_string(),
			Expression::Binary {
				op,
				..
			} => format!("binary {}", op),
			Expression::Unary {
				op,
				..
			} => format!("unary {}", op),
			Expression::Logical {
				..
			} => "logical".to_string(),
			Expression::Conditional {
				..
			} => "conditional".to_string(),
			Expression::Call {
				callee,
				..
			} => format!("call {}", callee.callee_name()),
			Expression::Pipe {
				call,
				..
			} => format!("pipe {}", call.callee_name()),
			Expression::Record {
				..
			} => "record".to_string(),
			Expression::Array(_) => "array".to_string(),
			Expression::Dict(_) => "dict".to_string(),
			Expression::Function {
				..
			} => "function".to_string(),
			Expression::FindRecord {
				..
			} => "find record".to_string(),
		}
	}

	fn callee_name(&self) -> String {
		match self {
			Expression::Identifier(name) => name.clone(),
			Expression::Member {
				object,
				property,
			} => format!("{}.{}", object.callee_name(), property),
			Expression::Call {
				callee,
				..
			} => callee.callee_name(),
			_ => "<expr>".to_string(),
		}
	}
}
