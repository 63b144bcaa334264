// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::validation::ValidationErrors;

const TITLE_MAX: usize = 200;
const TAG_MAX: usize = 50;
const COMMENT_MAX: usize = 1000;

fn validate_tags(tags: &[String], errors: &mut ValidationErrors) {
	for tag in tags {
		if tag.trim().is_empty() {
			errors.add("tags", "Tags must not be blank");
		} else if tag.len() > TAG_MAX {
			errors.add("tags", format!("Tag \"{tag}\" is too long (max {TAG_MAX} characters)"));
		}
	}
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreatePostRequest {
	pub title: String,
	pub content: String,
	#[serde(default)]
	pub published: bool,
	#[serde(default)]
	pub tags: Vec<String>,
}

impl CreatePostRequest {
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();

		if self.title.trim().is_empty() {
			errors.add("title", "Title is required");
		} else if self.title.len() > TITLE_MAX {
			errors.add("title", format!("Title must be at most {TITLE_MAX} characters"));
		}
		if self.content.trim().is_empty() {
			errors.add("content", "Content is required");
		}
		validate_tags(&self.tags, &mut errors);

		errors.into_result()
	}
}

/// Request to update a post's content fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdatePostRequest {
	pub title: String,
	pub content: String,
	#[serde(default)]
	pub tags: Vec<String>,
}

impl UpdatePostRequest {
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		CreatePostRequest {
			title: self.title.clone(),
			content: self.content.clone(),
			published: false,
			tags: self.tags.clone(),
		}
		.validate()
	}
}

/// Request to add a comment to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCommentRequest {
	pub content: String,
}

impl CreateCommentRequest {
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		if self.content.trim().is_empty() {
			errors.add("content", "Comment must not be empty");
		} else if self.content.len() > COMMENT_MAX {
			errors.add(
				"content",
				format!("Comment must be at most {COMMENT_MAX} characters"),
			);
		}
		errors.into_result()
	}
}

/// A tag in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TagResponse {
	pub name: String,
	pub slug: String,
}

/// A comment in API responses, with the author handle nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CommentResponse {
	pub id: String,
	pub post_id: String,
	pub author_id: String,
	pub author_username: String,
	pub content: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A post in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PostResponse {
	pub id: String,
	pub author_id: String,
	pub author_username: String,
	pub title: String,
	pub content: String,
	pub published: bool,
	pub comment_count: u32,
	pub tags: Vec<TagResponse>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A page of posts with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PostListResponse {
	pub posts: Vec<PostResponse>,
	pub total: u64,
}
