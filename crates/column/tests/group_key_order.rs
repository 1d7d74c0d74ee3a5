// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_column::{ColMeta, ColType, GroupKey, GroupKeyBuilder};
use flux_type::{Nature, Value};

#[test]
fn test_sorted_view_and_declared_display() {
	let key = GroupKey::new(
		vec![ColMeta::new("a", ColType::String), ColMeta::new("b", ColType::Int)],
		vec![Value::string("x"), Value::int(7)],
	)
	.unwrap();

	let sorted: Vec<_> = key.sorted().map(|(col, value)| (col.label.clone(), value.clone())).collect();
	assert_eq!(sorted, vec![("a".to_string(), Value::string("x")), ("b".to_string(), Value::int(7))]);
	assert_eq!(key.to_string(), "{a=x,b=7}");
}

#[test]
fn test_sorting_keys() {
	let mut keys = Vec::new();
	for host in [Value::string("b"), Value::null(Nature::String), Value::string("a")] {
		let mut builder = GroupKeyBuilder::new();
		builder.add_key_value("host", host);
		keys.push(builder.build().unwrap());
	}
	keys.sort();
	let rendered: Vec<_> = keys.iter().map(ToString::to_string).collect();
	assert_eq!(rendered, vec!["{host=null}", "{host=a}", "{host=b}"]);
}
