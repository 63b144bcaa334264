// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog book access policies.
//!
//! Books are capability-driven, not ownership-driven: the catalog is curated
//! by whoever holds the matching `book.*` capability (librarians via role,
//! anyone else via an explicit grant). Creating a catalog entry confers no
//! special rights over it.

use crate::abac::{ResourceAttrs, SubjectAttrs};
use crate::types::{Action, ResourceKind};

/// Evaluates book access policies.
pub fn evaluate(subject: &SubjectAttrs, action: Action, _resource: &ResourceAttrs) -> bool {
	match action {
		Action::View => true,
		Action::Create | Action::Edit | Action::Delete => {
			subject.has_capability(action, ResourceKind::Book)
		}
		_ => false,
	}
}
