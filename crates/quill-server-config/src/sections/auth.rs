// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.

use serde::Deserialize;

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Enable dev mode (bypass authentication). Must never be on in
	/// production; the auth middleware enforces that at startup.
	pub dev_mode: bool,
	/// Name of the session cookie.
	pub session_cookie_name: String,
	/// Disable new user signups (existing users can still log in).
	pub signups_disabled: bool,
	/// Session lifetime in hours.
	pub session_ttl_hours: u32,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			session_cookie_name: "quill_session".to_string(),
			signups_disabled: false,
			session_ttl_hours: 24 * 14,
		}
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	#[serde(default)]
	pub signups_disabled: Option<bool>,
	#[serde(default)]
	pub session_ttl_hours: Option<u32>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.signups_disabled.is_some() {
			self.signups_disabled = other.signups_disabled;
		}
		if other.session_ttl_hours.is_some() {
			self.session_ttl_hours = other.session_ttl_hours;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let defaults = AuthConfig::default();
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(defaults.dev_mode),
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or(defaults.session_cookie_name),
			signups_disabled: self.signups_disabled.unwrap_or(defaults.signups_disabled),
			session_ttl_hours: self.session_ttl_hours.unwrap_or(defaults.session_ttl_hours),
		}
	}
}
