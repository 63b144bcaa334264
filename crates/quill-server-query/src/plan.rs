// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query plan composition.
//!
//! [`QueryPlan::compose`] reduces a raw parameter map to the subset the
//! [`QuerySpec`] declares, in a fixed order. It cannot fail: client filters
//! are advisory, so anything unrecognized or malformed is dropped (logged at
//! debug level) rather than rejected.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::spec::{Direction, MatchMode, QuerySpec};

/// Parameter name carrying the free-text search term.
pub const SEARCH_PARAM: &str = "search";

/// Parameter name carrying the requested ordering.
pub const ORDERING_PARAM: &str = "ordering";

/// Parameter names for pagination.
pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// A single resolved filter operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
	/// Exact value equality.
	Eq(String),
	/// Case-insensitive substring match.
	IContains(String),
	/// Numeric lower bound (inclusive).
	Gte(i64),
	/// Numeric upper bound (inclusive).
	Lte(i64),
}

/// A filter clause bound to a declared field.
///
/// The field name always comes from the spec table, never from the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterClause {
	pub field: String,
	pub op: FilterOp,
}

/// Resolved ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ordering {
	pub field: String,
	pub direction: Direction,
}

/// Resolved pagination. `number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
	pub number: u32,
	pub size: u32,
}

/// A deterministic, whitelisted description of one collection query.
///
/// Execution applies the parts in declaration order: filters (AND), search,
/// ordering, pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
	pub filters: Vec<FilterClause>,
	pub search: Option<String>,
	/// Fields the search term consults, copied from the spec at composition
	/// time so execution does not need the spec again.
	searched_fields: Vec<String>,
	pub order: Ordering,
	pub page: Page,
}

impl QueryPlan {
	/// Compose a plan from untrusted request parameters against a spec.
	pub fn compose(spec: &QuerySpec, params: &BTreeMap<String, String>) -> QueryPlan {
		let mut filters = Vec::new();

		for (name, raw) in params {
			let value = raw.trim();
			if value.is_empty() {
				continue;
			}

			match name.as_str() {
				SEARCH_PARAM | ORDERING_PARAM | PAGE_PARAM | PAGE_SIZE_PARAM => continue,
				_ => {}
			}

			let Some(declared) = spec.filter_for(name) else {
				debug!(param = %name, "ignoring undeclared filter parameter");
				continue;
			};

			let op = match declared.mode {
				MatchMode::Exact => FilterOp::Eq(value.to_string()),
				MatchMode::IContains => FilterOp::IContains(value.to_string()),
				MatchMode::NumericGte | MatchMode::NumericLte => {
					let Ok(number) = value.parse::<i64>() else {
						debug!(param = %name, "ignoring non-numeric range value");
						continue;
					};
					if declared.mode == MatchMode::NumericGte {
						FilterOp::Gte(number)
					} else {
						FilterOp::Lte(number)
					}
				}
			};

			filters.push(FilterClause {
				field: declared.field.to_string(),
				op,
			});
		}

		let search = params
			.get(SEARCH_PARAM)
			.map(|s| s.trim())
			.filter(|s| !s.is_empty())
			.map(str::to_string);

		let order = compose_ordering(spec, params.get(ORDERING_PARAM).map(String::as_str));
		let page = compose_page(spec, params);

		QueryPlan {
			filters,
			search,
			searched_fields: spec.search_fields.iter().map(|s| s.to_string()).collect(),
			order,
			page,
		}
	}

	/// Fields consulted by the search term.
	pub fn search_fields(&self) -> &[String] {
		&self.searched_fields
	}

	/// Row offset implied by the page.
	pub fn offset(&self) -> u64 {
		u64::from(self.page.number - 1) * u64::from(self.page.size)
	}

	/// Row limit implied by the page.
	pub fn limit(&self) -> u32 {
		self.page.size
	}
}

fn compose_ordering(spec: &QuerySpec, requested: Option<&str>) -> Ordering {
	let default = Ordering {
		field: spec.default_order.field.to_string(),
		direction: spec.default_order.direction,
	};

	let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
		return default;
	};

	let (field, direction) = match requested.strip_prefix('-') {
		Some(field) => (field, Direction::Desc),
		None => (requested, Direction::Asc),
	};

	if !spec.is_sortable(field) {
		debug!(field = %field, "ignoring unlisted ordering field");
		return default;
	}

	Ordering {
		field: field.to_string(),
		direction,
	}
}

fn compose_page(spec: &QuerySpec, params: &BTreeMap<String, String>) -> Page {
	let number = params
		.get(PAGE_PARAM)
		.and_then(|v| v.trim().parse::<u32>().ok())
		.filter(|n| *n >= 1)
		.unwrap_or(1);

	let size = params
		.get(PAGE_SIZE_PARAM)
		.and_then(|v| v.trim().parse::<u32>().ok())
		.filter(|n| *n >= 1)
		.unwrap_or(spec.default_page_size)
		.min(spec.max_page_size);

	Page { number, size }
}
