// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for ABAC policy evaluation.
//!
//! This module defines the core data structures for Attribute-Based Access Control:
//!
//! - [`Subject`]: The requester - anonymous, or an authenticated [`SubjectAttrs`]
//! - [`ResourceAttrs`]: Describes the resource being accessed (kind, owner, state)
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: All attributes are computed before policy evaluation
//! 2. **No database access**: Policy functions are pure; all data is pre-loaded
//! 3. **Explicit attributes**: Every relevant fact is an explicit field, not derived
//! 4. **Explicit identity**: The subject is always passed as a parameter, never
//!    read from ambient request state

use crate::types::{Action, Capability, ResourceKind, Role, UserId};
use serde::{Deserialize, Serialize};

/// The requester on whose behalf an action is evaluated.
///
/// Anonymous is a valid resolution for read-only paths; every mutation
/// requires the authenticated variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
	/// No credential presented.
	Anonymous,
	/// A resolved, credentialed user.
	Authenticated(SubjectAttrs),
}

impl Subject {
	/// The authenticated attributes, if any.
	pub fn attrs(&self) -> Option<&SubjectAttrs> {
		match self {
			Subject::Anonymous => None,
			Subject::Authenticated(attrs) => Some(attrs),
		}
	}

	/// The authenticated user id, if any.
	pub fn user_id(&self) -> Option<UserId> {
		self.attrs().map(|a| a.user_id)
	}

	/// Returns true if no credential was presented.
	pub fn is_anonymous(&self) -> bool {
		matches!(self, Subject::Anonymous)
	}
}

/// Attributes describing an authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAttrs {
	pub user_id: UserId,
	pub role: Role,
	/// Fine-grained grants beyond the role, administered explicitly.
	pub grants: Vec<Capability>,
}

impl SubjectAttrs {
	/// Creates a new subject with the member role and no explicit grants.
	pub fn new(user_id: UserId) -> Self {
		Self {
			user_id,
			role: Role::Member,
			grants: Vec::new(),
		}
	}

	/// Builder: set the role.
	pub fn with_role(mut self, role: Role) -> Self {
		self.role = role;
		self
	}

	/// Builder: add an explicit capability grant.
	pub fn with_grant(mut self, capability: Capability) -> Self {
		self.grants.push(capability);
		self
	}

	/// Returns true if the subject holds the admin role.
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	/// Returns true if the subject holds the librarian role.
	pub fn is_librarian(&self) -> bool {
		self.role == Role::Librarian
	}

	/// Returns true if the subject may perform the action on the resource
	/// kind, via role expansion or an explicit grant.
	pub fn has_capability(&self, action: Action, resource: ResourceKind) -> bool {
		let capability = Capability::new(action, resource);
		self.grants.contains(&capability) || self.role.capabilities().contains(&capability)
	}
}

/// Attributes describing the resource being accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAttrs {
	pub kind: ResourceKind,
	/// The owning identity, fixed at creation. Catalog books carry none.
	pub owner_id: Option<UserId>,
	/// Lifecycle flag for content with a draft/published distinction.
	pub published: Option<bool>,
}

impl ResourceAttrs {
	/// Creates resource attributes for a draft post.
	pub fn post(owner_id: UserId) -> Self {
		Self {
			kind: ResourceKind::Post,
			owner_id: Some(owner_id),
			published: Some(false),
		}
	}

	/// Creates resource attributes for a comment.
	pub fn comment(owner_id: UserId) -> Self {
		Self {
			kind: ResourceKind::Comment,
			owner_id: Some(owner_id),
			published: None,
		}
	}

	/// Creates resource attributes for a catalog book.
	pub fn book() -> Self {
		Self {
			kind: ResourceKind::Book,
			owner_id: None,
			published: None,
		}
	}

	/// Creates resource attributes for a user profile.
	pub fn user(user_id: UserId) -> Self {
		Self {
			kind: ResourceKind::User,
			owner_id: Some(user_id),
			published: None,
		}
	}

	/// Builder: set the published flag.
	pub fn with_published(mut self, published: bool) -> Self {
		self.published = Some(published);
		self
	}

	/// Returns true if the resource is readable without a credential.
	///
	/// Draft posts are the only non-public reads in this model: published
	/// posts, catalog books, comments (listed beneath an already-authorized
	/// post), and user profiles are all world-readable.
	pub fn publicly_readable(&self) -> bool {
		match self.kind {
			ResourceKind::Post => self.published == Some(true),
			ResourceKind::Comment | ResourceKind::Book | ResourceKind::User => true,
		}
	}
}
