// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The directed follow graph.
//!
//! Edges live in a table keyed by (follower, followed), so the store itself
//! guarantees set semantics: at most one edge per ordered pair, and no
//! self-loops (CHECK constraint). The toggle runs inside one transaction -
//! delete-if-present, else insert-or-ignore - which serializes concurrent
//! duplicate toggles on the edge key; counts are always computed from the
//! edge set, so they cannot drift.

use async_trait::async_trait;
use chrono::Utc;
use quill_server_auth::{AccessError, UserId, UserProfile};
use sqlx::sqlite::SqlitePool;

use crate::error::Result;
use crate::user::UserRepository;

/// Outcome of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
	/// The edge was created (now following).
	Added,
	/// The edge was removed (no longer following).
	Removed,
}

/// The follow graph operations exposed to the action layer.
#[async_trait]
pub trait FollowGraph: Send + Sync {
	/// Follow if not following, unfollow otherwise. Self-follow is an
	/// invalid operation; a missing target is not found.
	async fn toggle(
		&self,
		follower: UserId,
		target: UserId,
	) -> std::result::Result<FollowChange, AccessError>;

	/// Whether `follower` currently follows `target`.
	async fn is_following(
		&self,
		follower: UserId,
		target: UserId,
	) -> std::result::Result<bool, AccessError>;

	/// Number of users following `user`.
	async fn followers_count(&self, user: UserId) -> std::result::Result<u64, AccessError>;

	/// Number of users `user` follows.
	async fn following_count(&self, user: UserId) -> std::result::Result<u64, AccessError>;
}

/// Repository for follow-edge database operations.
#[derive(Clone)]
pub struct FollowRepository {
	pool: SqlitePool,
	users: UserRepository,
}

impl FollowRepository {
	/// Create a new repository from an existing pool.
	pub fn new(pool: SqlitePool) -> Self {
		let users = UserRepository::new(pool.clone());
		Self { pool, users }
	}

	/// Profiles of the users following `user`, by username.
	pub async fn followers(&self, user: UserId) -> Result<Vec<UserProfile>> {
		let rows: Vec<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
			r#"
			SELECT u.id, u.username, u.bio, u.avatar_url
			FROM follows f
			JOIN users u ON u.id = f.follower_id
			WHERE f.followed_id = ?
			ORDER BY u.username
			"#,
		)
		.bind(user.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows
			.into_iter()
			.map(|(id, username, bio, avatar_url)| {
				Ok(UserProfile {
					id: UserId::new(crate::convert::uuid(&id)?),
					username,
					bio,
					avatar_url,
				})
			})
			.collect()
	}

	/// Profiles of the users `user` follows, by username.
	pub async fn following(&self, user: UserId) -> Result<Vec<UserProfile>> {
		let rows: Vec<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
			r#"
			SELECT u.id, u.username, u.bio, u.avatar_url
			FROM follows f
			JOIN users u ON u.id = f.followed_id
			WHERE f.follower_id = ?
			ORDER BY u.username
			"#,
		)
		.bind(user.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows
			.into_iter()
			.map(|(id, username, bio, avatar_url)| {
				Ok(UserProfile {
					id: UserId::new(crate::convert::uuid(&id)?),
					username,
					bio,
					avatar_url,
				})
			})
			.collect()
	}
}

#[async_trait]
impl FollowGraph for FollowRepository {
	#[tracing::instrument(skip(self))]
	async fn toggle(
		&self,
		follower: UserId,
		target: UserId,
	) -> std::result::Result<FollowChange, AccessError> {
		if follower == target {
			return Err(AccessError::InvalidOperation(
				"users cannot follow themselves".to_string(),
			));
		}

		if self.users.get(target).await?.is_none() {
			return Err(AccessError::NotFound);
		}

		// One transaction per toggle: SQLite's write lock serializes
		// concurrent toggles on the same edge key, and the primary key
		// keeps the edge set a proper set under any interleaving.
		let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

		let deleted = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followed_id = ?")
			.bind(follower.to_string())
			.bind(target.to_string())
			.execute(&mut *tx)
			.await
			.map_err(crate::error::DbError::from)?
			.rows_affected();

		let change = if deleted > 0 {
			FollowChange::Removed
		} else {
			sqlx::query(
				"INSERT OR IGNORE INTO follows (follower_id, followed_id, created_at) VALUES (?, ?, ?)",
			)
			.bind(follower.to_string())
			.bind(target.to_string())
			.bind(Utc::now().to_rfc3339())
			.execute(&mut *tx)
			.await
			.map_err(crate::error::DbError::from)?;
			FollowChange::Added
		};

		tx.commit().await.map_err(crate::error::DbError::from)?;

		tracing::debug!(?change, "follow toggled");
		Ok(change)
	}

	async fn is_following(
		&self,
		follower: UserId,
		target: UserId,
	) -> std::result::Result<bool, AccessError> {
		let row: Option<(i64,)> =
			sqlx::query_as("SELECT 1 FROM follows WHERE follower_id = ? AND followed_id = ?")
				.bind(follower.to_string())
				.bind(target.to_string())
				.fetch_optional(&self.pool)
				.await
				.map_err(crate::error::DbError::from)?;
		Ok(row.is_some())
	}

	async fn followers_count(&self, user: UserId) -> std::result::Result<u64, AccessError> {
		let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE followed_id = ?")
			.bind(user.to_string())
			.fetch_one(&self.pool)
			.await
			.map_err(crate::error::DbError::from)?;
		Ok(count as u64)
	}

	async fn following_count(&self, user: UserId) -> std::result::Result<u64, AccessError> {
		let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
			.bind(user.to_string())
			.fetch_one(&self.pool)
			.await
			.map_err(crate::error::DbError::from)?;
		Ok(count as u64)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_follow_test_pool;
	use crate::user::NewUser;
	use quill_server_auth::Role;

	async fn seed_user(pool: &SqlitePool, username: &str) -> UserId {
		UserRepository::new(pool.clone())
			.create(NewUser {
				username: username.to_string(),
				email: format!("{username}@example.com"),
				password: "correct horse battery staple".to_string(),
				bio: None,
				avatar_url: None,
				role: Role::Member,
			})
			.await
			.unwrap()
			.id
	}

	#[tokio::test]
	async fn toggle_adds_then_removes() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let bob = seed_user(&pool, "bob").await;
		let graph = FollowRepository::new(pool);

		assert_eq!(graph.toggle(alice, bob).await.unwrap(), FollowChange::Added);
		assert!(graph.is_following(alice, bob).await.unwrap());

		assert_eq!(graph.toggle(alice, bob).await.unwrap(), FollowChange::Removed);
		assert!(!graph.is_following(alice, bob).await.unwrap());
	}

	#[tokio::test]
	async fn double_toggle_restores_original_state() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let bob = seed_user(&pool, "bob").await;
		let graph = FollowRepository::new(pool);

		let before = graph.is_following(alice, bob).await.unwrap();
		graph.toggle(alice, bob).await.unwrap();
		graph.toggle(alice, bob).await.unwrap();
		assert_eq!(graph.is_following(alice, bob).await.unwrap(), before);
	}

	#[tokio::test]
	async fn self_follow_is_invalid_operation() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let graph = FollowRepository::new(pool);

		let err = graph.toggle(alice, alice).await.unwrap_err();
		assert!(matches!(err, AccessError::InvalidOperation(_)));
	}

	#[tokio::test]
	async fn follow_missing_user_is_not_found() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let graph = FollowRepository::new(pool);

		let err = graph.toggle(alice, UserId::generate()).await.unwrap_err();
		assert_eq!(err, AccessError::NotFound);
	}

	#[tokio::test]
	async fn follow_is_directed() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let bob = seed_user(&pool, "bob").await;
		let graph = FollowRepository::new(pool);

		graph.toggle(alice, bob).await.unwrap();
		assert!(graph.is_following(alice, bob).await.unwrap());
		assert!(!graph.is_following(bob, alice).await.unwrap());
	}

	#[tokio::test]
	async fn counts_track_the_edge_set() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let bob = seed_user(&pool, "bob").await;
		let carol = seed_user(&pool, "carol").await;
		let dave = seed_user(&pool, "dave").await;
		let graph = FollowRepository::new(pool);

		graph.toggle(bob, alice).await.unwrap();
		graph.toggle(carol, alice).await.unwrap();
		graph.toggle(dave, alice).await.unwrap();
		assert_eq!(graph.followers_count(alice).await.unwrap(), 3);

		graph.toggle(carol, alice).await.unwrap();
		assert_eq!(graph.followers_count(alice).await.unwrap(), 2);

		graph.toggle(alice, bob).await.unwrap();
		assert_eq!(graph.following_count(alice).await.unwrap(), 1);
		assert_eq!(graph.followers_count(bob).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn follower_listings_are_profiles_by_username() {
		let pool = create_follow_test_pool().await;
		let alice = seed_user(&pool, "alice").await;
		let bob = seed_user(&pool, "bob").await;
		let carol = seed_user(&pool, "carol").await;
		let graph = FollowRepository::new(pool);

		graph.toggle(carol, alice).await.unwrap();
		graph.toggle(bob, alice).await.unwrap();

		let followers = graph.followers(alice).await.unwrap();
		let names: Vec<_> = followers.iter().map(|p| p.username.as_str()).collect();
		assert_eq!(names, vec!["bob", "carol"]);

		let following = graph.following(bob).await.unwrap();
		assert_eq!(following.len(), 1);
		assert_eq!(following[0].username, "alice");
	}
}
