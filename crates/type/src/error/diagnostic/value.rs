// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorKind, diagnostic::Diagnostic},
	value::Nature,
};

/// The value has a different nature than the operation expects.
pub fn kind_mismatch(expected: Nature, actual: Nature) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_001".to_string(),
		message: format!("expected {} but found {}", expected, actual),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// The operation cannot be applied to a null value.
pub fn null_operand(operation: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_002".to_string(),
		message: format!("cannot apply {} to a null value", operation),
		label: None,
		help: Some("check the value for null before using it".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn out_of_bounds(index: i64, len: usize) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_003".to_string(),
		message: format!("index out of bounds: {} is not in [0, {})", index, len),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn operator_not_applicable(operator: &str, left: Nature, right: Option<Nature>) -> Diagnostic {
	let message = match right {
		Some(right) => format!("operator {} is not defined for {} and {}", operator, left, right),
		None => format!("operator {} is not defined for {}", operator, left),
	};
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_004".to_string(),
		message,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn unused_arguments(function: &str, names: &[String]) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_005".to_string(),
		message: format!("unused arguments in call to {}: {}", function, names.join(", ")),
		label: None,
		help: Some("remove the arguments or check their spelling".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn missing_argument(function: &str, name: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_006".to_string(),
		message: format!("missing required argument {} in call to {}", name, function),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn argument_type(function: &str, name: &str, expected: Nature, actual: Nature) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_007".to_string(),
		message: format!(
			"argument {} of {} has the wrong type: expected {} but found {}",
			name, function, expected, actual
		),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// The argument has the right type but a value the function rejects.
pub fn invalid_argument(function: &str, name: &str, reason: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_013".to_string(),
		message: format!("invalid argument {} of {}: {}", name, function, reason),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn division_by_zero() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_008".to_string(),
		message: "division by zero".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_regexp(pattern: &str, reason: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_009".to_string(),
		message: format!("invalid regular expression {:?}: {}", pattern, reason),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn dict_key_mismatch(expected: Nature, actual: Nature) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_010".to_string(),
		message: format!("dictionary keys must share one type: expected {} but found {}", expected, actual),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_duration(text: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_011".to_string(),
		message: format!("invalid duration literal {:?}", text),
		label: None,
		help: Some("durations look like 1h30m, 5s or 1mo".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn arithmetic_overflow(operator: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "VALUE_012".to_string(),
		message: format!("arithmetic overflow in {}", operator),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
