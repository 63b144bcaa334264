// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Field-level validation errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A structured map of field name to validation messages.
///
/// Serializes as `{"field": ["message", ...], ...}`, which is what API
/// clients render next to the offending inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValidationErrors {
	errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
	/// Create an empty error map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a message against a field.
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self
			.errors
			.entry(field.into())
			.or_default()
			.push(message.into());
	}

	/// Returns true if no field has errors.
	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	/// The messages recorded for a field.
	pub fn field(&self, field: &str) -> &[String] {
		self
			.errors
			.get(field)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// `Ok(())` when empty, otherwise the error map itself.
	pub fn into_result(self) -> Result<(), ValidationErrors> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(self)
		}
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let fields: Vec<&str> = self.errors.keys().map(String::as_str).collect();
		write!(f, "validation failed for: {}", fields.join(", "))
	}
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_map_is_ok() {
		assert!(ValidationErrors::new().into_result().is_ok());
	}

	#[test]
	fn messages_group_by_field() {
		let mut errors = ValidationErrors::new();
		errors.add("username", "too short");
		errors.add("username", "reserved");
		errors.add("email", "already registered");

		assert_eq!(errors.field("username").len(), 2);
		assert_eq!(errors.field("email"), &["already registered".to_string()]);
		assert!(errors.field("password").is_empty());
	}

	#[test]
	fn serializes_as_a_plain_map() {
		let mut errors = ValidationErrors::new();
		errors.add("title", "must not be empty");

		let json = serde_json::to_string(&errors).unwrap();
		assert_eq!(json, r#"{"title":["must not be empty"]}"#);
	}

	#[test]
	fn display_names_the_fields() {
		let mut errors = ValidationErrors::new();
		errors.add("email", "invalid");
		errors.add("password", "too short");
		assert_eq!(errors.to_string(), "validation failed for: email, password");
	}
}
