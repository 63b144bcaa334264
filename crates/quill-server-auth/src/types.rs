// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! This module defines the foundational types used throughout the auth system:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for different entity types
//!   ([`UserId`], [`PostId`], etc.) preventing accidental mixing
//! - **Roles**: The single-valued platform role ([`Role`]) carried by every user
//! - **Capabilities**: Named (action, resource-kind) permission grants
//!   ([`Capability`]) evaluated by the ABAC engine
//!
//! All ID types implement transparent serde serialization (as UUID strings) and
//! provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SessionId, "Unique identifier for a session.");
define_id_type!(PostId, "Unique identifier for a post.");
define_id_type!(CommentId, "Unique identifier for a comment.");
define_id_type!(BookId, "Unique identifier for a catalog book.");
define_id_type!(AuthorId, "Unique identifier for a catalog author.");
define_id_type!(TagId, "Unique identifier for a tag.");

// =============================================================================
// Roles
// =============================================================================

/// Platform role carried by every user. Single-valued.
///
/// Roles expand into a fixed capability set via [`Role::capabilities`];
/// additional fine-grained grants are stored per user and merged by the
/// ABAC engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Full platform access, manages users and capability grants.
	Admin,
	/// Curates the book catalog.
	Librarian,
	/// Standard member access.
	Member,
}

impl Role {
	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[Role::Admin, Role::Librarian, Role::Member]
	}

	/// The capabilities this role grants implicitly.
	pub fn capabilities(&self) -> Vec<Capability> {
		match self {
			Role::Admin => {
				let mut caps = Vec::new();
				for kind in ResourceKind::all() {
					for action in Action::all() {
						caps.push(Capability::new(*action, *kind));
					}
				}
				caps
			}
			Role::Librarian => vec![
				Capability::new(Action::Create, ResourceKind::Book),
				Capability::new(Action::Edit, ResourceKind::Book),
			],
			Role::Member => Vec::new(),
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "admin"),
			Role::Librarian => write!(f, "librarian"),
			Role::Member => write!(f, "member"),
		}
	}
}

impl FromStr for Role {
	type Err = ParseRoleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(Role::Admin),
			"librarian" => Ok(Role::Librarian),
			"member" => Ok(Role::Member),
			other => Err(ParseRoleError(other.to_string())),
		}
	}
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

// =============================================================================
// Resource kinds and actions
// =============================================================================

/// Kinds of resources protected by the ABAC engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	Post,
	Comment,
	Book,
	User,
}

impl ResourceKind {
	/// Returns all resource kinds.
	pub fn all() -> &'static [ResourceKind] {
		&[
			ResourceKind::Post,
			ResourceKind::Comment,
			ResourceKind::Book,
			ResourceKind::User,
		]
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::Post => write!(f, "post"),
			ResourceKind::Comment => write!(f, "comment"),
			ResourceKind::Book => write!(f, "book"),
			ResourceKind::User => write!(f, "user"),
		}
	}
}

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	View,
	Create,
	Edit,
	Delete,
	Publish,
	Follow,
}

impl Action {
	/// Returns all actions.
	pub fn all() -> &'static [Action] {
		&[
			Action::View,
			Action::Create,
			Action::Edit,
			Action::Delete,
			Action::Publish,
			Action::Follow,
		]
	}

	/// Safe actions are read-only and eligible for anonymous access.
	pub fn is_safe(&self) -> bool {
		matches!(self, Action::View)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::View => write!(f, "view"),
			Action::Create => write!(f, "create"),
			Action::Edit => write!(f, "edit"),
			Action::Delete => write!(f, "delete"),
			Action::Publish => write!(f, "publish"),
			Action::Follow => write!(f, "follow"),
		}
	}
}

impl FromStr for Action {
	type Err = ParseCapabilityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"view" => Ok(Action::View),
			"create" => Ok(Action::Create),
			"edit" => Ok(Action::Edit),
			"delete" => Ok(Action::Delete),
			"publish" => Ok(Action::Publish),
			"follow" => Ok(Action::Follow),
			other => Err(ParseCapabilityError(other.to_string())),
		}
	}
}

// =============================================================================
// Capabilities
// =============================================================================

/// A named permission: the ability to perform an action on a resource kind.
///
/// Serialized as `"<resource>.<action>"` (e.g. `"book.edit"`,
/// `"post.publish"`), which is also the storage format for per-user grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability {
	pub action: Action,
	pub resource: ResourceKind,
}

impl Capability {
	/// Create a capability for an action on a resource kind.
	pub fn new(action: Action, resource: ResourceKind) -> Self {
		Self { action, resource }
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.resource, self.action)
	}
}

impl FromStr for Capability {
	type Err = ParseCapabilityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (resource, action) = s
			.split_once('.')
			.ok_or_else(|| ParseCapabilityError(s.to_string()))?;
		let resource = match resource {
			"post" => ResourceKind::Post,
			"comment" => ResourceKind::Comment,
			"book" => ResourceKind::Book,
			"user" => ResourceKind::User,
			_ => return Err(ParseCapabilityError(s.to_string())),
		};
		Ok(Capability::new(action.parse()?, resource))
	}
}

impl Serialize for Capability {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Capability {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Error returned when parsing a malformed capability string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct ParseCapabilityError(pub String);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn id_types_round_trip_through_uuid() {
		let uuid = Uuid::new_v4();
		let id = UserId::new(uuid);
		assert_eq!(id.into_inner(), uuid);
		assert_eq!(Uuid::from(id), uuid);
		assert_eq!(id.to_string(), uuid.to_string());
	}

	#[test]
	fn id_types_serialize_transparently() {
		let id = PostId::generate();
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, format!("\"{}\"", id));
	}

	mod role {
		use super::*;

		#[test]
		fn parses_and_displays() {
			for role in Role::all() {
				let parsed: Role = role.to_string().parse().unwrap();
				assert_eq!(parsed, *role);
			}
			assert!("superuser".parse::<Role>().is_err());
		}

		#[test]
		fn admin_holds_every_capability() {
			let caps = Role::Admin.capabilities();
			for kind in ResourceKind::all() {
				for action in Action::all() {
					assert!(caps.contains(&Capability::new(*action, *kind)));
				}
			}
		}

		#[test]
		fn librarian_curates_books_only() {
			let caps = Role::Librarian.capabilities();
			assert!(caps.contains(&Capability::new(Action::Create, ResourceKind::Book)));
			assert!(caps.contains(&Capability::new(Action::Edit, ResourceKind::Book)));
			assert!(!caps.contains(&Capability::new(Action::Delete, ResourceKind::Book)));
			assert!(!caps.iter().any(|c| c.resource == ResourceKind::Post));
		}

		#[test]
		fn member_has_no_implicit_capabilities() {
			assert!(Role::Member.capabilities().is_empty());
		}
	}

	mod capability {
		use super::*;

		#[test]
		fn displays_as_resource_dot_action() {
			let cap = Capability::new(Action::Publish, ResourceKind::Post);
			assert_eq!(cap.to_string(), "post.publish");
		}

		#[test]
		fn parses_storage_format() {
			let cap: Capability = "book.edit".parse().unwrap();
			assert_eq!(cap, Capability::new(Action::Edit, ResourceKind::Book));
		}

		#[test]
		fn rejects_malformed_strings() {
			assert!("".parse::<Capability>().is_err());
			assert!("book".parse::<Capability>().is_err());
			assert!("book.fly".parse::<Capability>().is_err());
			assert!("spaceship.edit".parse::<Capability>().is_err());
		}

		#[test]
		fn serde_round_trip() {
			let cap = Capability::new(Action::Delete, ResourceKind::Book);
			let json = serde_json::to_string(&cap).unwrap();
			assert_eq!(json, "\"book.delete\"");
			let back: Capability = serde_json::from_str(&json).unwrap();
			assert_eq!(back, cap);
		}
	}

	mod action {
		use super::*;

		#[test]
		fn only_view_is_safe() {
			assert!(Action::View.is_safe());
			assert!(!Action::Create.is_safe());
			assert!(!Action::Edit.is_safe());
			assert!(!Action::Delete.is_safe());
			assert!(!Action::Publish.is_safe());
			assert!(!Action::Follow.is_safe());
		}
	}
}
