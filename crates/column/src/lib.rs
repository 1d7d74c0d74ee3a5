// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod alloc;
pub mod builder;
pub mod cache;
pub mod column;
pub mod group_key;
pub mod meta;
pub mod table;

pub use alloc::{Allocator, SharedAllocator};
pub use builder::ColumnTableBuilder;
pub use cache::TableBuilderCache;
pub use column::{Column, ColumnData};
pub use group_key::{GroupKey, GroupKeyBuilder, range_key};
pub use meta::{ColMeta, ColType};
pub use table::{Chunk, Table};
