// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use quill_server_auth::AccessError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for AccessError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::NotFound(_) => AccessError::NotFound,
			other => AccessError::StoreUnavailable(other.to_string()),
		}
	}
}

/// Returns true if the error is a UNIQUE constraint violation mentioning
/// the given column (e.g. `users.email`).
pub(crate) fn is_unique_violation(err: &sqlx::Error, column: &str) -> bool {
	match err {
		sqlx::Error::Database(db) => {
			let message = db.message();
			message.contains("UNIQUE constraint failed") && message.contains(column)
		}
		_ => false,
	}
}
