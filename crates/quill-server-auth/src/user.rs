// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User management types and operations.
//!
//! This module provides:
//! - [`User`] - core user entity with a platform role and profile fields
//! - [`UserProfile`] - public view of a user (never carries the login email)
//! - Username validation helpers
//!
//! The password credential is intentionally absent from [`User`]: the argon2
//! digest lives only in the users table and is verified by the repository
//! layer. The entity is safe to serialize into API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Reserved usernames that cannot be used.
/// These are reserved for system use, common services, or could cause confusion.
pub const RESERVED_USERNAMES: &[&str] = &[
	// System/admin
	"root",
	"admin",
	"administrator",
	"system",
	"support",
	"help",
	"info",
	"noreply",
	"no-reply",
	// Quill-specific
	"quill",
	"librarian",
	"library",
	"catalog",
	"post",
	"posts",
	"book",
	"books",
	"tag",
	"tags",
	"feed",
	"api",
	"auth",
	"login",
	"logout",
	"signup",
	"register",
	"settings",
	"profile",
	"account",
	// Common paths
	"www",
	"static",
	"assets",
	"search",
	"explore",
	"new",
	"edit",
	"delete",
	// Misc reserved
	"null",
	"undefined",
	"none",
	"anonymous",
	"guest",
	"user",
	"users",
	"test",
	"about",
	"terms",
	"privacy",
];

/// Check if a username is reserved.
pub fn is_username_reserved(username: &str) -> bool {
	let lower = username.to_lowercase();
	RESERVED_USERNAMES.iter().any(|&reserved| reserved == lower)
}

/// A user in the system.
///
/// The email address is the unique login key; the username is the unique
/// public handle used in profile URLs and follow relationships.
///
/// # PII Handling
///
/// `email` is user-provided PII and should be redacted in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Unique public handle.
	pub username: String,

	/// Unique login key. Receives notifications.
	pub email: String,

	/// Short free-text self description.
	pub bio: Option<String>,

	/// URL to the user's avatar image.
	pub avatar_url: Option<String>,

	/// Single-valued platform role.
	pub role: Role,

	/// When the user was created.
	pub created_at: DateTime<Utc>,

	/// When the user was last updated.
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Returns true if this user holds the admin role.
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	/// Returns true if this user holds the librarian role.
	pub fn is_librarian(&self) -> bool {
		self.role == Role::Librarian
	}

	/// Returns true if this user holds the member role.
	pub fn is_member(&self) -> bool {
		self.role == Role::Member
	}

	/// Creates a public profile view of this user.
	/// The login email is never exposed here.
	pub fn to_profile(&self) -> UserProfile {
		UserProfile {
			id: self.id,
			username: self.username.clone(),
			bio: self.bio.clone(),
			avatar_url: self.avatar_url.clone(),
		}
	}
}

/// Public view of a user profile.
///
/// Only includes information safe to share with other users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Unique public handle.
	pub username: String,

	/// Short free-text self description.
	pub bio: Option<String>,

	/// URL to the user's avatar image.
	pub avatar_url: Option<String>,
}

/// Validates a username.
/// Rules:
/// - 3-39 characters
/// - Alphanumeric and underscores only
/// - Cannot start with underscore
/// - Cannot be all numeric
/// - Cannot be a reserved username
pub fn validate_username(username: &str) -> Result<(), &'static str> {
	if username.len() < 3 {
		return Err("Username must be at least 3 characters");
	}
	if username.len() > 39 {
		return Err("Username must be at most 39 characters");
	}
	if !username
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '_')
	{
		return Err("Username can only contain letters, numbers, and underscores");
	}
	if username.starts_with('_') {
		return Err("Username cannot start with underscore");
	}
	if username.chars().all(|c| c.is_ascii_digit()) {
		return Err("Username cannot be all numbers");
	}
	if is_username_reserved(username) {
		return Err("This username is reserved");
	}
	Ok(())
}
