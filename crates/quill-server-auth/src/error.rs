// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The access-decision error taxonomy.
//!
//! These kinds are surfaced directly to the routing collaborator, which owns
//! the mapping to user-visible responses (401/403/404/400/503). The core
//! never renders user-facing text itself.

use thiserror::Error;

/// Why an operation was refused (or could not be evaluated).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
	/// No valid credential was presented where one is required.
	#[error("authentication required")]
	Unauthenticated,

	/// The subject is authenticated but lacks capability or ownership.
	#[error("permission denied")]
	Forbidden,

	/// The target resource id does not resolve.
	#[error("not found")]
	NotFound,

	/// The request is structurally invalid (e.g. self-follow).
	#[error("invalid operation: {0}")]
	InvalidOperation(String),

	/// The backing store timed out or is unreachable.
	#[error("store unavailable: {0}")]
	StoreUnavailable(String),
}
