// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::validation::ValidationErrors;
use quill_server_auth::user::validate_username;
use quill_server_auth::{User, UserProfile};

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RegisterRequest {
	pub username: String,
	pub email: String,
	pub password: String,
	pub bio: Option<String>,
}

impl RegisterRequest {
	/// Field-level validation; uniqueness is enforced later by the store.
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();

		if let Err(message) = validate_username(&self.username) {
			errors.add("username", message);
		}
		if self.email.trim().is_empty() {
			errors.add("email", "Email is required");
		} else if !self.email.contains('@') {
			errors.add("email", "Enter a valid email address");
		}
		if self.password.len() < 8 {
			errors.add("password", "Password must be at least 8 characters");
		}
		if let Some(bio) = &self.bio {
			if bio.len() > 500 {
				errors.add("bio", "Bio must be at most 500 characters");
			}
		}

		errors.into_result()
	}
}

/// Request to log in with the account's login key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

impl LoginRequest {
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		if self.email.trim().is_empty() {
			errors.add("email", "Email is required");
		}
		if self.password.is_empty() {
			errors.add("password", "Password is required");
		}
		errors.into_result()
	}
}

/// A public user profile in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserProfileResponse {
	pub id: String,
	pub username: String,
	pub bio: Option<String>,
	pub avatar_url: Option<String>,
}

impl From<UserProfile> for UserProfileResponse {
	fn from(profile: UserProfile) -> Self {
		Self {
			id: profile.id.to_string(),
			username: profile.username,
			bio: profile.bio,
			avatar_url: profile.avatar_url,
		}
	}
}

/// Extended profile for the current user. The only response that carries
/// the login email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CurrentUserResponse {
	pub id: String,
	pub username: String,
	pub email: String,
	pub role: String,
	pub bio: Option<String>,
	pub avatar_url: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<User> for CurrentUserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.id.to_string(),
			username: user.username,
			email: user.email,
			role: user.role.to_string(),
			bio: user.bio,
			avatar_url: user.avatar_url,
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

/// Successful registration or login: the profile plus the opaque token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AuthResponse {
	pub user: UserProfileResponse,
	pub token: String,
}

/// A page of the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserListResponse {
	pub users: Vec<UserProfileResponse>,
	pub total: u64,
}
