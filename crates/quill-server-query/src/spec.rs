// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declared query specifications.
//!
//! Every filterable collection declares, at compile time, exactly which
//! parameters it accepts and how each one matches. Lookups never reach a
//! field that is not in these tables.

use serde::Serialize;

/// How a declared filter parameter matches against its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
	/// Exact value equality.
	Exact,
	/// Case-insensitive substring match.
	IContains,
	/// Numeric lower bound (inclusive).
	NumericGte,
	/// Numeric upper bound (inclusive).
	NumericLte,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	Asc,
	Desc,
}

/// A declared filter: request parameter name, target field, match mode.
///
/// Related-entity fields use the `entity__field` naming convention
/// (e.g. `author__name`); the executing layer resolves them through a join
/// or the snapshot's field accessor.
#[derive(Debug, Clone, Copy)]
pub struct FieldFilter {
	pub param: &'static str,
	pub field: &'static str,
	pub mode: MatchMode,
}

/// Default ordering for a collection.
#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
	pub field: &'static str,
	pub direction: Direction,
}

/// The complete declared query surface of one collection.
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec {
	/// Accepted filter parameters.
	pub filters: &'static [FieldFilter],
	/// Fields consulted by free-text search (`search` parameter); a record
	/// matches if ANY of them case-insensitively contains the term.
	pub search_fields: &'static [&'static str],
	/// Fields accepted by the `ordering` parameter. Anything else is ignored.
	pub sortable: &'static [&'static str],
	/// Applied when no (valid) ordering is requested.
	pub default_order: OrderBy,
	/// Page size when the request does not specify one.
	pub default_page_size: u32,
	/// Upper bound on the requested page size.
	pub max_page_size: u32,
}

impl QuerySpec {
	/// Look up a declared filter by parameter name.
	pub fn filter_for(&self, param: &str) -> Option<&FieldFilter> {
		self.filters.iter().find(|f| f.param == param)
	}

	/// Returns true if the field may be sorted on.
	pub fn is_sortable(&self, field: &str) -> bool {
		self.sortable.contains(&field)
	}
}

static POSTS: QuerySpec = QuerySpec {
	filters: &[
		FieldFilter {
			param: "title",
			field: "title",
			mode: MatchMode::IContains,
		},
		FieldFilter {
			param: "title__icontains",
			field: "title",
			mode: MatchMode::IContains,
		},
		FieldFilter {
			param: "author__username",
			field: "author__username",
			mode: MatchMode::IContains,
		},
		FieldFilter {
			param: "published",
			field: "published",
			mode: MatchMode::Exact,
		},
	],
	search_fields: &["title", "content", "author__username"],
	sortable: &["created_at", "updated_at", "title"],
	default_order: OrderBy {
		field: "created_at",
		direction: Direction::Desc,
	},
	default_page_size: 20,
	max_page_size: 100,
};

static BOOKS: QuerySpec = QuerySpec {
	filters: &[
		FieldFilter {
			param: "title",
			field: "title",
			mode: MatchMode::IContains,
		},
		FieldFilter {
			param: "title__icontains",
			field: "title",
			mode: MatchMode::IContains,
		},
		FieldFilter {
			param: "publication_year",
			field: "publication_year",
			mode: MatchMode::Exact,
		},
		FieldFilter {
			param: "publication_year__gte",
			field: "publication_year",
			mode: MatchMode::NumericGte,
		},
		FieldFilter {
			param: "publication_year__lte",
			field: "publication_year",
			mode: MatchMode::NumericLte,
		},
		FieldFilter {
			param: "author__name",
			field: "author__name",
			mode: MatchMode::IContains,
		},
	],
	search_fields: &["title", "author__name"],
	sortable: &["title", "publication_year", "created_at"],
	default_order: OrderBy {
		field: "title",
		direction: Direction::Asc,
	},
	default_page_size: 20,
	max_page_size: 100,
};

static USERS: QuerySpec = QuerySpec {
	filters: &[
		FieldFilter {
			param: "username",
			field: "username",
			mode: MatchMode::IContains,
		},
		FieldFilter {
			param: "role",
			field: "role",
			mode: MatchMode::Exact,
		},
	],
	search_fields: &["username", "email", "bio"],
	sortable: &["username", "created_at"],
	default_order: OrderBy {
		field: "username",
		direction: Direction::Asc,
	},
	default_page_size: 20,
	max_page_size: 100,
};

/// Query surface of the post collection.
pub fn posts() -> &'static QuerySpec {
	&POSTS
}

/// Query surface of the book catalog.
pub fn books() -> &'static QuerySpec {
	&BOOKS
}

/// Query surface of the user directory.
pub fn users() -> &'static QuerySpec {
	&USERS
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filter_lookup_finds_declared_params() {
		let spec = books();
		assert_eq!(
			spec.filter_for("publication_year__gte").map(|f| f.mode),
			Some(MatchMode::NumericGte)
		);
		assert!(spec.filter_for("password").is_none());
	}

	#[test]
	fn sortable_is_a_whitelist() {
		let spec = posts();
		assert!(spec.is_sortable("created_at"));
		assert!(!spec.is_sortable("password_hash"));
	}

	#[test]
	fn every_default_order_field_is_sortable() {
		for spec in [posts(), books(), users()] {
			assert!(spec.is_sortable(spec.default_order.field));
		}
	}

	#[test]
	fn page_size_bounds_are_sane() {
		for spec in [posts(), books(), users()] {
			assert!(spec.default_page_size <= spec.max_page_size);
			assert!(spec.default_page_size > 0);
		}
	}
}
