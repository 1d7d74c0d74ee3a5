// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::{
	Diagnostic, ErrorKind, Nature,
	error::diagnostic::{
		IntoDiagnostic,
		internal::internal,
		runtime::{invalid_jump, no_host, no_now, not_callable, stack_underflow, undefined_identifier, unimplemented},
	},
};

pub type Result<T> = std::result::Result<T, VmError>;

/// Failures raised while interpreting bytecode.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
	#[error("stack underflow in {opcode}")]
	StackUnderflow {
		opcode: &'static str,
	},

	#[error("operand stack exceeded {limit} values")]
	StackOverflow {
		limit: usize,
	},

	#[error("invalid opcode 0x{0:02x}")]
	InvalidOpcode(u8),

	#[error("unexpected end of bytecode at {position}")]
	UnexpectedEnd {
		position: usize,
	},

	#[error("constant {0} does not exist")]
	InvalidConstant(u16),

	#[error("name {0} does not exist")]
	InvalidName(u16),

	#[error("chunk {0} does not exist")]
	InvalidChunk(u16),

	#[error("jump target {target} outside bytecode of length {len}")]
	InvalidJump {
		target: usize,
		len: usize,
	},

	#[error("undefined identifier {0}")]
	UndefinedIdentifier(String),

	#[error("value of nature {0} is not callable")]
	NotCallable(Nature),

	#[error("function {function} has no pipe parameter")]
	NoPipeParameter {
		function: String,
	},

	#[error("PROGRAM_START executed twice")]
	DuplicateProgramStart,

	#[error("now is not defined")]
	NoNow,

	#[error("no host to execute queries")]
	NoHost,

	#[error(transparent)]
	Flux(#[from] flux_type::Error),
}

impl IntoDiagnostic for VmError {
	fn into_diagnostic(self) -> Diagnostic {
		match self {
			VmError::StackUnderflow {
				opcode,
			} => stack_underflow(opcode),
			VmError::InvalidJump {
				target,
				len,
			} => invalid_jump(target, len),
			VmError::UndefinedIdentifier(name) => undefined_identifier(&name),
			VmError::NotCallable(nature) => not_callable(nature.as_str()),
			VmError::NoNow => no_now(),
			VmError::NoHost => no_host(),
			VmError::NoPipeParameter {
				function,
			} => Diagnostic::new(ErrorKind::Invalid, "RUNTIME_010", format!("function {} has no pipe parameter", function))
				.with_help("only functions declaring a `<-` parameter can be the target of `|>`"),
			VmError::Flux(err) => err.diagnostic(),
			other => internal(other.to_string()),
		}
	}
}

impl From<VmError> for flux_type::Error {
	fn from(err: VmError) -> Self {
		flux_type::Error::new(err.into_diagnostic())
	}
}

/// Failures raised while lowering the syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
	#[error("return outside of a function body")]
	ReturnOutsideFunction,

	#[error("pipe target must be a call, found {0}")]
	PipeTargetNotCall(String),

	#[error("too many {pool} entries, at most {limit}")]
	PoolOverflow {
		pool: &'static str,
		limit: usize,
	},

	#[error("unsupported expression: {0}")]
	Unsupported(String),
}

impl IntoDiagnostic for CompileError {
	fn into_diagnostic(self) -> Diagnostic {
		match self {
			CompileError::Unsupported(what) => unimplemented(&what),
			CompileError::PoolOverflow {
				..
			} => internal(self.to_string()),
			other => Diagnostic::new(ErrorKind::Invalid, "COMPILE_001", other.to_string()),
		}
	}
}

impl From<CompileError> for flux_type::Error {
	fn from(err: CompileError) -> Self {
		flux_type::Error::new(err.into_diagnostic())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flux_errors_pass_through() {
		let original = flux_type::Error::new(flux_type::error::diagnostic::value::division_by_zero());
		let err: flux_type::Error = VmError::from(original.clone()).into();
		assert_eq!(err, original);
	}

	#[test]
	fn test_structural_failures_are_internal() {
		let err: flux_type::Error = VmError::StackUnderflow {
			opcode: "POP",
		}
		.into();
		assert_eq!(err.kind(), ErrorKind::Internal);
		assert_eq!(err.code(), "RUNTIME_002");

		let err: flux_type::Error = VmError::InvalidOpcode(0xff).into();
		assert_eq!(err.kind(), ErrorKind::Internal);
	}

	#[test]
	fn test_not_callable_names_nature() {
		let err: flux_type::Error = VmError::NotCallable(Nature::Int).into();
		assert_eq!(err.kind(), ErrorKind::Invalid);
		assert!(err.to_string().contains("int"));
	}
}
