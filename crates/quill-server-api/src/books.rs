// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::validation::ValidationErrors;

const TITLE_MAX: usize = 200;

/// Request to add a book to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateBookRequest {
	pub title: String,
	pub publication_year: i64,
	pub author_name: String,
}

impl CreateBookRequest {
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();

		if self.title.trim().is_empty() {
			errors.add("title", "Title is required");
		} else if self.title.len() > TITLE_MAX {
			errors.add("title", format!("Title must be at most {TITLE_MAX} characters"));
		}
		if self.publication_year > i64::from(Utc::now().year()) {
			errors.add("publication_year", "Publication year cannot be in the future");
		}
		if self.author_name.trim().is_empty() {
			errors.add("author_name", "Author name is required");
		}

		errors.into_result()
	}
}

/// Request to update a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateBookRequest {
	pub title: String,
	pub publication_year: i64,
}

impl UpdateBookRequest {
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		CreateBookRequest {
			title: self.title.clone(),
			publication_year: self.publication_year,
			author_name: "unchanged".to_string(),
		}
		.validate()
	}
}

/// A catalog book in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookResponse {
	pub id: String,
	pub title: String,
	pub publication_year: i64,
	pub author_name: String,
	pub created_at: DateTime<Utc>,
}

/// A page of the catalog with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookListResponse {
	pub books: Vec<BookResponse>,
	pub total: u64,
}
