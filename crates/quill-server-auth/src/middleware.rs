// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware for extracting and validating user credentials.
//!
//! This module provides:
//! - [`CurrentUser`] - authenticated user context extracted from requests
//! - [`AuthContext`] - auth state for request processing
//! - [`AuthConfig`] - configuration for authentication behavior
//! - Helper functions for extracting session cookies and bearer tokens
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Extract Token/Cookie → Hash → Session lookup → AuthContext
//!                │
//!                ├── Session Cookie (quill_session) → Session lookup
//!                └── Bearer Token (qt_*) → Session lookup
//! ```
//!
//! # Security Notes
//!
//! - Session tokens are extracted from cookies (HttpOnly, Secure recommended)
//! - Bearer tokens are extracted from the Authorization header
//! - Token values are never logged

use crate::token::ACCESS_TOKEN_PREFIX;
use crate::types::SessionId;
use crate::user::User;
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "quill_session";

/// Environment variable to enable dev mode (bypass authentication).
pub const DEV_MODE_ENV_VAR: &str = "QUILL_SERVER_AUTH_DEV_MODE";
pub const QUILL_ENV_VAR: &str = "QUILL_SERVER_ENV";

/// The currently authenticated user, extracted from request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	/// The authenticated user.
	pub user: User,
	/// Session ID if authenticated via session cookie or bearer token.
	pub session_id: Option<SessionId>,
}

impl CurrentUser {
	/// Create a new CurrentUser from a session-based authentication.
	pub fn from_session(user: User, session_id: SessionId) -> Self {
		Self {
			user,
			session_id: Some(session_id),
		}
	}

	/// Returns true if authenticated via a stored session.
	pub fn is_session_auth(&self) -> bool {
		self.session_id.is_some()
	}
}

/// Authentication context for request processing.
///
/// This struct is used to pass authentication state through the request pipeline.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	/// Whether the request is authenticated.
	pub is_authenticated: bool,
	/// The current user, if authenticated.
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	/// Create a new unauthenticated context.
	pub fn unauthenticated() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
		}
	}

	/// Create a new authenticated context.
	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
		}
	}

	/// Get the current user, if authenticated.
	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// Require authentication, returning the current user or an error.
	pub fn require_user(&self) -> Result<&CurrentUser, crate::error::AccessError> {
		self
			.current_user
			.as_ref()
			.ok_or(crate::error::AccessError::Unauthenticated)
	}
}

/// Configuration for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Enable dev mode (bypass authentication when QUILL_SERVER_AUTH_DEV_MODE=1).
	pub dev_mode: bool,
	/// Name of the session cookie.
	pub session_cookie_name: String,
	/// Disable new user signups (existing users can still log in).
	pub signups_disabled: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
			signups_disabled: false,
		}
	}
}

impl AuthConfig {
	/// Create a new AuthConfig with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create AuthConfig from environment variables.
	///
	/// Reads `QUILL_SERVER_AUTH_DEV_MODE` to determine if dev mode should be enabled.
	///
	/// # Panics
	///
	/// Panics if both `QUILL_SERVER_AUTH_DEV_MODE=1` and `QUILL_SERVER_ENV=production`
	/// are set, as dev mode must never be enabled in production environments.
	pub fn from_env() -> Self {
		let dev_mode = std::env::var(DEV_MODE_ENV_VAR)
			.map(|v| v == "1" || v.to_lowercase() == "true")
			.unwrap_or(false);

		let quill_env = std::env::var(QUILL_ENV_VAR).unwrap_or_default();

		if dev_mode && quill_env.to_lowercase() == "production" {
			panic!(
                "FATAL: QUILL_SERVER_AUTH_DEV_MODE=1 is set while QUILL_SERVER_ENV=production. \
                 Dev mode authentication bypass MUST NOT be enabled in production. \
                 Remove QUILL_SERVER_AUTH_DEV_MODE or set QUILL_SERVER_ENV to a non-production value."
            );
		}

		Self {
			dev_mode,
			..Default::default()
		}
	}

	/// Set dev mode.
	pub fn with_dev_mode(mut self, enabled: bool) -> Self {
		self.dev_mode = enabled;
		self
	}

	/// Set the session cookie name.
	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	/// Set signups disabled.
	pub fn with_signups_disabled(mut self, disabled: bool) -> Self {
		self.signups_disabled = disabled;
		self
	}
}

/// A credential presented by a request, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
	/// Opaque token from the session cookie.
	SessionCookie(String),
	/// Opaque `qt_*` token from the Authorization header.
	Bearer(String),
}

impl Credential {
	/// The raw token value. Treat as a secret; never log.
	pub fn token(&self) -> &str {
		match self {
			Credential::SessionCookie(token) | Credential::Bearer(token) => token,
		}
	}
}

/// Extract the request credential, preferring the bearer token over the
/// session cookie when both are present.
pub fn extract_credential(headers: &HeaderMap, cookie_name: &str) -> Option<Credential> {
	if let Some(token) = extract_bearer_token(headers) {
		return Some(Credential::Bearer(token));
	}
	extract_session_cookie_with_name(headers, cookie_name).map(Credential::SessionCookie)
}

/// Extract the session token from the Cookie header.
///
/// Parses the Cookie header to find the session cookie (default: `quill_session`).
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
	extract_session_cookie_with_name(headers, SESSION_COOKIE_NAME)
}

/// Extract the session token from the Cookie header with a custom cookie name.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get(COOKIE)?
		.to_str()
		.ok()?
		.split(';')
		.find_map(|cookie| {
			let cookie = cookie.trim();
			let (name, value) = cookie.split_once('=')?;

			if name == cookie_name {
				Some(value.to_string())
			} else {
				None
			}
		})
}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`
#[instrument(level = "trace", skip_all, fields(has_auth_header))]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_header = headers.get(AUTHORIZATION)?;
	let auth_str = auth_header.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(|token| token.to_string())
}

/// Check if a token is a Quill access token (starts with `qt_`).
pub fn is_access_token(token: &str) -> bool {
	token.starts_with(ACCESS_TOKEN_PREFIX)
}
