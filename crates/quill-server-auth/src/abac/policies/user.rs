// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User resource access policies.
//!
//! Profiles are world-readable. A user modifies only their own profile;
//! the `user.edit` / `user.delete` capabilities cover administrative
//! account management. Follow is open to any authenticated user - the
//! follow graph itself rejects self-follow as an invalid operation, not
//! a permission failure.

use crate::abac::{ResourceAttrs, SubjectAttrs};
use crate::types::{Action, ResourceKind};

/// Evaluates user resource access policies.
pub fn evaluate(subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
	let is_self = resource
		.owner_id
		.map(|id| id == subject.user_id)
		.unwrap_or(false);

	match action {
		Action::View => true,
		Action::Edit | Action::Delete => {
			is_self || subject.has_capability(action, ResourceKind::User)
		}
		Action::Follow => true,
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Role, UserId};
	use uuid::Uuid;

	fn test_user_id() -> UserId {
		UserId::new(Uuid::new_v4())
	}

	#[test]
	fn user_can_modify_self() {
		let user_id = test_user_id();
		let subject = SubjectAttrs::new(user_id);
		let resource = ResourceAttrs::user(user_id);

		assert!(evaluate(&subject, Action::Edit, &resource));
		assert!(evaluate(&subject, Action::Delete, &resource));
	}

	#[test]
	fn cannot_modify_other_users() {
		let subject = SubjectAttrs::new(test_user_id());
		let resource = ResourceAttrs::user(test_user_id());

		assert!(!evaluate(&subject, Action::Edit, &resource));
		assert!(!evaluate(&subject, Action::Delete, &resource));
	}

	#[test]
	fn admin_can_manage_accounts() {
		let subject = SubjectAttrs::new(test_user_id()).with_role(Role::Admin);
		let resource = ResourceAttrs::user(test_user_id());

		assert!(evaluate(&subject, Action::Edit, &resource));
		assert!(evaluate(&subject, Action::Delete, &resource));
	}

	#[test]
	fn any_authenticated_user_can_follow() {
		let subject = SubjectAttrs::new(test_user_id());
		let resource = ResourceAttrs::user(test_user_id());

		assert!(evaluate(&subject, Action::Follow, &resource));
	}

	#[test]
	fn profiles_are_viewable() {
		let subject = SubjectAttrs::new(test_user_id());
		assert!(evaluate(&subject, Action::View, &ResourceAttrs::user(test_user_id())));
	}
}
