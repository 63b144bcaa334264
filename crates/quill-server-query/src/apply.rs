// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory plan execution.
//!
//! Snapshot types expose their fields through [`Queryable`]; [`apply`] then
//! runs a [`QueryPlan`] over a slice of snapshots in the fixed composition
//! order: filters, search, ordering, pagination. The total count is taken
//! after filtering and search but before pagination, which is what the
//! pagination metadata reports.

use std::cmp::Ordering as CmpOrdering;

use crate::plan::{FilterOp, QueryPlan};
use crate::spec::Direction;

/// A field value produced by a snapshot accessor.
///
/// `Null` represents an absent field (including undeclared names, so a stale
/// spec entry degrades to matching nothing rather than panicking).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	Text(String),
	Int(i64),
	Bool(bool),
	Null,
}

impl FieldValue {
	fn as_search_text(&self) -> Option<String> {
		match self {
			FieldValue::Text(s) => Some(s.to_lowercase()),
			FieldValue::Int(i) => Some(i.to_string()),
			FieldValue::Bool(b) => Some(b.to_string()),
			FieldValue::Null => None,
		}
	}
}

/// A snapshot that can be queried by field name.
pub trait Queryable {
	/// The value of the named field, `Null` when absent.
	fn field(&self, name: &str) -> FieldValue;
}

/// One page of results plus the pre-pagination total.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<T> {
	pub items: Vec<T>,
	pub total: u64,
}

/// Execute a plan over in-memory snapshots.
pub fn apply<T: Queryable + Clone>(plan: &QueryPlan, items: &[T]) -> QueryPage<T> {
	let mut matched: Vec<&T> = items
		.iter()
		.filter(|item| matches_filters(plan, *item) && matches_search(plan, *item))
		.collect();

	matched.sort_by(|a, b| {
		let ordering = compare_values(
			&a.field(&plan.order.field),
			&b.field(&plan.order.field),
		);
		match plan.order.direction {
			Direction::Asc => ordering,
			Direction::Desc => ordering.reverse(),
		}
	});

	let total = matched.len() as u64;
	let offset = plan.offset() as usize;
	let limit = plan.limit() as usize;

	let items = if offset >= matched.len() {
		Vec::new()
	} else {
		matched[offset..]
			.iter()
			.take(limit)
			.map(|item| (*item).clone())
			.collect()
	};

	QueryPage { items, total }
}

fn matches_filters<T: Queryable>(plan: &QueryPlan, item: &T) -> bool {
	plan.filters.iter().all(|clause| {
		let value = item.field(&clause.field);
		match &clause.op {
			FilterOp::Eq(expected) => match &value {
				FieldValue::Text(s) => s == expected,
				FieldValue::Int(i) => expected.parse::<i64>() == Ok(*i),
				FieldValue::Bool(b) => expected.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
				FieldValue::Null => false,
			},
			FilterOp::IContains(needle) => match &value {
				FieldValue::Text(s) => s.to_lowercase().contains(&needle.to_lowercase()),
				_ => false,
			},
			FilterOp::Gte(bound) => matches!(value, FieldValue::Int(i) if i >= *bound),
			FilterOp::Lte(bound) => matches!(value, FieldValue::Int(i) if i <= *bound),
		}
	})
}

fn matches_search<T: Queryable>(plan: &QueryPlan, item: &T) -> bool {
	let Some(term) = &plan.search else {
		return true;
	};
	let needle = term.to_lowercase();

	plan
		.search_fields()
		.iter()
		.any(|field| match item.field(field).as_search_text() {
			Some(haystack) => haystack.contains(&needle),
			None => false,
		})
}

/// Total order over heterogeneous field values: Null sorts first, then
/// booleans, then numbers, then text (case-insensitively, with a
/// case-sensitive tiebreak for stability).
fn compare_values(a: &FieldValue, b: &FieldValue) -> CmpOrdering {
	fn rank(v: &FieldValue) -> u8 {
		match v {
			FieldValue::Null => 0,
			FieldValue::Bool(_) => 1,
			FieldValue::Int(_) => 2,
			FieldValue::Text(_) => 3,
		}
	}

	match (a, b) {
		(FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
		(FieldValue::Int(x), FieldValue::Int(y)) => x.cmp(y),
		(FieldValue::Text(x), FieldValue::Text(y)) => x
			.to_lowercase()
			.cmp(&y.to_lowercase())
			.then_with(|| x.cmp(y)),
		_ => rank(a).cmp(&rank(b)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::plan::QueryPlan;
	use crate::spec::{books, posts};
	use std::collections::BTreeMap;

	#[derive(Debug, Clone, PartialEq)]
	struct Book {
		title: String,
		publication_year: i64,
		author_name: String,
	}

	impl Queryable for Book {
		fn field(&self, name: &str) -> FieldValue {
			match name {
				"title" => FieldValue::Text(self.title.clone()),
				"publication_year" => FieldValue::Int(self.publication_year),
				"author__name" => FieldValue::Text(self.author_name.clone()),
				_ => FieldValue::Null,
			}
		}
	}

	fn library() -> Vec<Book> {
		vec![
			Book {
				title: "Harry Potter and the Chamber of Secrets".to_string(),
				publication_year: 1998,
				author_name: "J.K. Rowling".to_string(),
			},
			Book {
				title: "Harry Potter and the Philosopher's Stone".to_string(),
				publication_year: 1997,
				author_name: "J.K. Rowling".to_string(),
			},
		]
	}

	fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn icontains_filter_selects_matching_title() {
		let plan = QueryPlan::compose(books(), &params(&[("title__icontains", "Chamber")]));
		let page = apply(&plan, &library());

		assert_eq!(page.total, 1);
		assert_eq!(page.items.len(), 1);
		assert!(page.items[0].title.contains("Chamber"));
	}

	#[test]
	fn icontains_is_case_insensitive() {
		let plan = QueryPlan::compose(books(), &params(&[("title__icontains", "chamber")]));
		assert_eq!(apply(&plan, &library()).total, 1);
	}

	#[test]
	fn descending_year_puts_newest_first() {
		let plan = QueryPlan::compose(books(), &params(&[("ordering", "-publication_year")]));
		let page = apply(&plan, &library());

		assert_eq!(page.items[0].publication_year, 1998);
		assert_eq!(page.items[1].publication_year, 1997);
	}

	#[test]
	fn related_entity_filter_with_no_match_is_empty_not_error() {
		let plan = QueryPlan::compose(books(), &params(&[("author__name", "Tolkien")]));
		let page = apply(&plan, &library());

		assert_eq!(page.total, 0);
		assert!(page.items.is_empty());
	}

	#[test]
	fn inverted_range_yields_empty_not_error() {
		let plan = QueryPlan::compose(
			books(),
			&params(&[
				("publication_year__gte", "2000"),
				("publication_year__lte", "1990"),
			]),
		);
		let page = apply(&plan, &library());

		assert_eq!(page.total, 0);
	}

	#[test]
	fn valid_range_is_inclusive() {
		let plan = QueryPlan::compose(
			books(),
			&params(&[
				("publication_year__gte", "1997"),
				("publication_year__lte", "1997"),
			]),
		);
		let page = apply(&plan, &library());

		assert_eq!(page.total, 1);
		assert_eq!(page.items[0].publication_year, 1997);
	}

	#[test]
	fn search_matches_any_declared_field() {
		let plan = QueryPlan::compose(books(), &params(&[("search", "rowling")]));
		assert_eq!(apply(&plan, &library()).total, 2);

		let plan = QueryPlan::compose(books(), &params(&[("search", "philosopher")]));
		assert_eq!(apply(&plan, &library()).total, 1);

		let plan = QueryPlan::compose(books(), &params(&[("search", "dune")]));
		assert_eq!(apply(&plan, &library()).total, 0);
	}

	#[test]
	fn out_of_range_page_is_empty_with_total_intact() {
		let plan = QueryPlan::compose(books(), &params(&[("page", "99")]));
		let page = apply(&plan, &library());

		assert!(page.items.is_empty());
		assert_eq!(page.total, 2);
	}

	#[test]
	fn pagination_slices_after_ordering() {
		let plan = QueryPlan::compose(
			books(),
			&params(&[("ordering", "-publication_year"), ("page_size", "1")]),
		);
		let page = apply(&plan, &library());
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].publication_year, 1998);

		let plan = QueryPlan::compose(
			books(),
			&params(&[
				("ordering", "-publication_year"),
				("page_size", "1"),
				("page", "2"),
			]),
		);
		let page = apply(&plan, &library());
		assert_eq!(page.items[0].publication_year, 1997);
	}

	#[test]
	fn filters_compose_with_and_semantics() {
		let plan = QueryPlan::compose(
			books(),
			&params(&[("title", "harry"), ("publication_year", "1997")]),
		);
		let page = apply(&plan, &library());
		assert_eq!(page.total, 1);
		assert_eq!(page.items[0].publication_year, 1997);
	}

	#[test]
	fn undeclared_snapshot_field_matches_nothing() {
		// The posts spec declares fields Book snapshots do not expose;
		// a filter over them degrades to an empty result.
		let plan = QueryPlan::compose(posts(), &params(&[("published", "true")]));
		let page = apply(&plan, &library());
		assert_eq!(page.total, 0);
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
				#[test]
				fn application_never_panics_on_arbitrary_params(
						entries in proptest::collection::btree_map("[a-z_]{1,20}", "[ -~]{0,20}", 0..8)
				) {
						let plan = QueryPlan::compose(books(), &entries);
						let _ = apply(&plan, &library());
				}

				#[test]
				fn page_never_exceeds_requested_size(
						size in 1u32..10,
						page in 1u32..5,
				) {
						let entries: BTreeMap<String, String> = [
								("page_size".to_string(), size.to_string()),
								("page".to_string(), page.to_string()),
						]
						.into_iter()
						.collect();
						let plan = QueryPlan::compose(books(), &entries);
						let result = apply(&plan, &library());
						prop_assert!(result.items.len() <= size as usize);
				}
		}
	}
}
