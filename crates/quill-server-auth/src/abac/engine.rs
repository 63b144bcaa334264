// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC policy evaluation engine.
//!
//! This module contains the core [`authorize`] function that evaluates access
//! decisions. It implements a three-phase evaluation:
//!
//! 1. **Safe-action check**: read-only actions on publicly readable resources
//!    are allowed unconditionally, anonymous requesters included
//! 2. **Authentication check**: every other action requires a credentialed
//!    subject and fails with `Unauthenticated` otherwise
//! 3. **Resource-specific policy**: delegates to specialized policy modules,
//!    mapping a policy refusal to `Forbidden`
//!
//! All policy decisions are pure functions with no side effects, making them
//! easy to test and reason about. Ownership rules take precedence over role
//! grants for mutation of owned content: no role alone edits or deletes
//! another identity's post or comment.

use super::policies::{book, post, user};
use super::types::{ResourceAttrs, Subject};
use crate::error::AccessError;
use crate::types::{Action, ResourceKind};
use tracing::instrument;

/// Evaluates whether a subject is allowed to perform an action on a resource.
///
/// This is the main entry point for ABAC policy evaluation.
///
/// # Arguments
///
/// * `subject` - The requester (anonymous or resolved attributes)
/// * `action` - The operation being attempted
/// * `resource` - Attributes of the resource being accessed
///
/// # Returns
///
/// `Ok(())` when allowed; [`AccessError::Unauthenticated`] when a credential
/// is required and absent; [`AccessError::Forbidden`] otherwise. A denial is
/// always surfaced, never silently dropped.
///
/// # Tracing
///
/// The decision and all relevant attributes are logged at debug level for
/// audit purposes.
#[instrument(
	level = "debug",
	skip(subject, resource),
	fields(
		user_id = ?subject.user_id(),
		action = ?action,
		resource_kind = ?resource.kind,
	)
)]
pub fn authorize(
	subject: &Subject,
	action: Action,
	resource: &ResourceAttrs,
) -> Result<(), AccessError> {
	if action.is_safe() && resource.publicly_readable() {
		return Ok(());
	}

	let attrs = subject.attrs().ok_or(AccessError::Unauthenticated)?;

	let allowed = match resource.kind {
		ResourceKind::Post => post::evaluate_post(attrs, action, resource),
		ResourceKind::Comment => post::evaluate_comment(attrs, action, resource),
		ResourceKind::Book => book::evaluate(attrs, action, resource),
		ResourceKind::User => user::evaluate(attrs, action, resource),
	};

	if allowed {
		Ok(())
	} else {
		Err(AccessError::Forbidden)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::abac::SubjectAttrs;
	use crate::types::{Capability, Role, UserId};
	use uuid::Uuid;

	fn test_user_id() -> UserId {
		UserId::new(Uuid::new_v4())
	}

	fn member(user_id: UserId) -> Subject {
		Subject::Authenticated(SubjectAttrs::new(user_id))
	}

	fn with_role(role: Role) -> Subject {
		Subject::Authenticated(SubjectAttrs::new(test_user_id()).with_role(role))
	}

	mod anonymous_access {
		use super::*;

		#[test]
		fn anonymous_can_view_published_post() {
			let resource = ResourceAttrs::post(test_user_id()).with_published(true);
			assert!(authorize(&Subject::Anonymous, Action::View, &resource).is_ok());
		}

		#[test]
		fn anonymous_can_view_books_and_profiles() {
			assert!(authorize(&Subject::Anonymous, Action::View, &ResourceAttrs::book()).is_ok());
			assert!(
				authorize(&Subject::Anonymous, Action::View, &ResourceAttrs::user(test_user_id()))
					.is_ok()
			);
		}

		#[test]
		fn anonymous_cannot_view_draft() {
			let resource = ResourceAttrs::post(test_user_id());
			assert_eq!(
				authorize(&Subject::Anonymous, Action::View, &resource),
				Err(AccessError::Unauthenticated)
			);
		}

		#[test]
		fn anonymous_write_is_unauthenticated_never_partial() {
			let owner = test_user_id();
			for (action, resource) in [
				(Action::Create, ResourceAttrs::post(owner)),
				(Action::Edit, ResourceAttrs::post(owner).with_published(true)),
				(Action::Delete, ResourceAttrs::post(owner)),
				(Action::Create, ResourceAttrs::book()),
				(Action::Follow, ResourceAttrs::user(owner)),
			] {
				assert_eq!(
					authorize(&Subject::Anonymous, action, &resource),
					Err(AccessError::Unauthenticated),
					"{action:?} on {:?}",
					resource.kind
				);
			}
		}
	}

	mod ownership {
		use super::*;

		#[test]
		fn owner_can_edit_own_draft() {
			let owner = test_user_id();
			let resource = ResourceAttrs::post(owner);
			assert!(authorize(&member(owner), Action::Edit, &resource).is_ok());
		}

		#[test]
		fn owner_needs_publish_capability_once_published() {
			let owner = test_user_id();
			let resource = ResourceAttrs::post(owner).with_published(true);

			assert_eq!(
				authorize(&member(owner), Action::Edit, &resource),
				Err(AccessError::Forbidden)
			);

			let publisher = Subject::Authenticated(
				SubjectAttrs::new(owner)
					.with_grant(Capability::new(Action::Publish, ResourceKind::Post)),
			);
			assert!(authorize(&publisher, Action::Edit, &resource).is_ok());
		}

		#[test]
		fn role_grants_never_mutate_anothers_post() {
			let owner = test_user_id();
			let resource = ResourceAttrs::post(owner).with_published(true);

			for role in Role::all() {
				assert_eq!(
					authorize(&with_role(*role), Action::Edit, &resource),
					Err(AccessError::Forbidden),
					"role {role}"
				);
				assert_eq!(
					authorize(&with_role(*role), Action::Delete, &resource),
					Err(AccessError::Forbidden),
					"role {role}"
				);
			}
		}
	}

	mod capability_grants {
		use super::*;

		#[test]
		fn librarian_curates_catalog() {
			let librarian = with_role(Role::Librarian);
			assert!(authorize(&librarian, Action::Create, &ResourceAttrs::book()).is_ok());
			assert!(authorize(&librarian, Action::Edit, &ResourceAttrs::book()).is_ok());
			assert_eq!(
				authorize(&librarian, Action::Delete, &ResourceAttrs::book()),
				Err(AccessError::Forbidden)
			);
		}

		#[test]
		fn member_cannot_curate_catalog() {
			let subject = member(test_user_id());
			assert_eq!(
				authorize(&subject, Action::Create, &ResourceAttrs::book()),
				Err(AccessError::Forbidden)
			);
		}

		#[test]
		fn admin_curates_catalog_fully() {
			let admin = with_role(Role::Admin);
			assert!(authorize(&admin, Action::Delete, &ResourceAttrs::book()).is_ok());
		}
	}

	mod follow {
		use super::*;

		#[test]
		fn authenticated_user_can_follow() {
			let subject = member(test_user_id());
			let target = ResourceAttrs::user(test_user_id());
			assert!(authorize(&subject, Action::Follow, &target).is_ok());
		}

		#[test]
		fn anonymous_cannot_follow() {
			let target = ResourceAttrs::user(test_user_id());
			assert_eq!(
				authorize(&Subject::Anonymous, Action::Follow, &target),
				Err(AccessError::Unauthenticated)
			);
		}
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		fn arb_role() -> impl Strategy<Value = Role> {
			prop_oneof![Just(Role::Admin), Just(Role::Librarian), Just(Role::Member)]
		}

		fn arb_mutation() -> impl Strategy<Value = Action> {
			prop_oneof![Just(Action::Edit), Just(Action::Delete)]
		}

		proptest! {
				#[test]
				fn non_owner_without_grants_never_mutates_posts(
						subject_uuid in any::<u128>(),
						owner_uuid in any::<u128>(),
						role in arb_role(),
						action in arb_mutation(),
						published in any::<bool>(),
				) {
						prop_assume!(subject_uuid != owner_uuid);

						let subject = Subject::Authenticated(
								SubjectAttrs::new(UserId::new(Uuid::from_u128(subject_uuid))).with_role(role),
						);
						let resource = ResourceAttrs::post(UserId::new(Uuid::from_u128(owner_uuid)))
								.with_published(published);

						prop_assert_eq!(authorize(&subject, action, &resource), Err(AccessError::Forbidden));
				}

				#[test]
				fn owner_mutates_own_draft(
						owner_uuid in any::<u128>(),
						role in arb_role(),
						action in arb_mutation(),
				) {
						let owner = UserId::new(Uuid::from_u128(owner_uuid));
						let subject = Subject::Authenticated(SubjectAttrs::new(owner).with_role(role));
						let resource = ResourceAttrs::post(owner);

						prop_assert!(authorize(&subject, action, &resource).is_ok());
				}

				#[test]
				fn published_posts_are_readable_by_anyone(
						owner_uuid in any::<u128>(),
				) {
						let resource = ResourceAttrs::post(UserId::new(Uuid::from_u128(owner_uuid)))
								.with_published(true);
						prop_assert!(authorize(&Subject::Anonymous, Action::View, &resource).is_ok());
				}

				#[test]
				fn evaluation_is_deterministic(
						subject_uuid in any::<u128>(),
						owner_uuid in any::<u128>(),
						role in arb_role(),
						published in any::<bool>(),
				) {
						let subject = Subject::Authenticated(
								SubjectAttrs::new(UserId::new(Uuid::from_u128(subject_uuid))).with_role(role),
						);
						let resource = ResourceAttrs::post(UserId::new(Uuid::from_u128(owner_uuid)))
								.with_published(published);

						for action in Action::all() {
								prop_assert_eq!(
										authorize(&subject, *action, &resource),
										authorize(&subject, *action, &resource)
								);
						}
				}
		}
	}
}
