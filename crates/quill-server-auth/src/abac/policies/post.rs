// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post and comment access policies.
//!
//! Posts and comments are owned content: mutation belongs to the author.
//! Role grants never extend to editing or deleting another author's work.
//! The one escalation is the publish gate - once a post is published, even
//! its author needs the `post.publish` capability to edit or delete it.

use crate::abac::{ResourceAttrs, SubjectAttrs};
use crate::types::{Action, ResourceKind};

/// Evaluates post access policies.
pub fn evaluate_post(subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
	let is_owner = resource
		.owner_id
		.map(|id| id == subject.user_id)
		.unwrap_or(false);
	let published = resource.published.unwrap_or(false);

	match action {
		// Drafts reach the policy (published posts are world-readable and
		// never get here): visible to the author and to capability holders.
		Action::View => is_owner || subject.has_capability(Action::View, ResourceKind::Post),
		// Any authenticated user may author posts.
		Action::Create => true,
		Action::Edit | Action::Delete => {
			if !is_owner {
				return false;
			}
			!published || subject.has_capability(Action::Publish, ResourceKind::Post)
		}
		Action::Publish => subject.has_capability(Action::Publish, ResourceKind::Post),
		_ => false,
	}
}

/// Evaluates comment access policies.
pub fn evaluate_comment(subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
	let is_owner = resource
		.owner_id
		.map(|id| id == subject.user_id)
		.unwrap_or(false);

	match action {
		Action::View => true,
		Action::Create => true,
		Action::Edit | Action::Delete => is_owner,
		_ => false,
	}
}
