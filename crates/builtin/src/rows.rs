// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_column::{ColMeta, ColType, ColumnTableBuilder};
use flux_type::{Record, Result, error::diagnostic::table::unsupported_column_value, return_error};

/// Appends `record` as one row. Fields seen for the first time add a column
/// in field order; earlier rows read as null in it. Columns the record lacks
/// get a null cell. A null field of unknown type adds no column.
pub(crate) fn append_record(builder: &mut ColumnTableBuilder, record: &Record) -> Result<()> {
	for (label, value) in record.iter() {
		if builder.index(label).is_some() {
			continue;
		}
		match ColType::from_nature(value.nature()) {
			Some(ty) => {
				builder.add_col(ColMeta::new(label, ty))?;
			}
			None if value.is_null() => {}
			None => return_error!(unsupported_column_value(label, value.nature().as_str())),
		}
	}
	for col in 0..builder.ncols() {
		match record.get(&builder.cols()[col].label).cloned() {
			Some(value) => builder.append_value(col, &value)?,
			None => builder.append_nil(col)?,
		}
	}
	Ok(())
}
