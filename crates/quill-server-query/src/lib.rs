// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Safe query composition for Quill collections.
//!
//! Untrusted query parameters (a string-to-string map) are translated into a
//! deterministic [`QueryPlan`] against a declared [`QuerySpec`] whitelist:
//!
//! - Field filters with declared match modes (exact, case-insensitive
//!   contains, numeric gte/lte)
//! - Free-text search over a declared field list
//! - Ordering restricted to a declared sortable set (`-` prefix descends)
//! - Bounded pagination
//!
//! Client-supplied parameters are advisory: unknown names, malformed
//! numbers, and unlisted sort fields are ignored, never errors. Composition
//! order is fixed - filters, then search, then ordering, then pagination -
//! so the same input map always yields the same result sequence.
//!
//! Plans are executed either in memory via [`apply`] over any [`Queryable`]
//! snapshot type, or as SQL by the repository layer. Field names in a plan
//! come from the spec tables, never from the request, which closes the
//! injection surface of attribute-name lookup.

mod apply;
mod plan;
mod spec;

pub use apply::{apply, FieldValue, Queryable, QueryPage};
pub use plan::{FilterClause, FilterOp, Ordering, Page, QueryPlan};
pub use spec::{books, posts, users, Direction, FieldFilter, MatchMode, OrderBy, QuerySpec};
