// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::users::UserProfileResponse;

/// Outcome of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum FollowState {
	/// The edge was created (now following).
	Added,
	/// The edge was removed (no longer following).
	Removed,
}

/// Response to a follow toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FollowToggleResponse {
	pub state: FollowState,
	pub followers_count: u64,
}

/// Relationship state between the requester and another user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RelationshipResponse {
	pub is_following: bool,
	pub followers_count: u64,
	pub following_count: u64,
}

/// A list of follower or following profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FollowListResponse {
	pub users: Vec<UserProfileResponse>,
	pub total: u64,
}
