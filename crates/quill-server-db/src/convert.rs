// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row-to-domain conversion helpers.
//!
//! Timestamps are persisted as RFC 3339 text and ids as UUID strings; a row
//! that fails to parse indicates corruption and surfaces as an internal error.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("malformed timestamp {value:?}: {e}")))
}

pub(crate) fn uuid(value: &str) -> Result<Uuid, DbError> {
	Uuid::parse_str(value).map_err(|e| DbError::Internal(format!("malformed id {value:?}: {e}")))
}
