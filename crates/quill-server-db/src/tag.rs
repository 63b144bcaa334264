// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tags and their derived slugs.
//!
//! [`TagRepository::ensure_tag`] is the explicit get-or-create operation
//! invoked before a post is saved, so validation stays decoupled from
//! persistence side effects. The slug is derived from the name exactly once,
//! at first save, and never changes afterwards.

use chrono::Utc;
use quill_server_auth::{PostId, TagId};
use sqlx::sqlite::SqlitePool;

use crate::convert;
use crate::error::{DbError, Result};

/// A tag: unique name plus URL-safe slug.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Tag {
	pub id: TagId,
	pub name: String,
	pub slug: String,
}

/// Derive the URL-safe slug for a tag name: lowercase alphanumerics with
/// single dashes in place of every other run of characters.
pub fn slugify(name: &str) -> String {
	let mut slug = String::with_capacity(name.len());
	let mut pending_dash = false;

	for c in name.chars() {
		if c.is_ascii_alphanumeric() {
			if pending_dash && !slug.is_empty() {
				slug.push('-');
			}
			pending_dash = false;
			slug.push(c.to_ascii_lowercase());
		} else {
			pending_dash = true;
		}
	}

	slug
}

#[derive(sqlx::FromRow)]
struct TagRow {
	id: String,
	name: String,
	slug: String,
}

impl TagRow {
	fn into_tag(self) -> Result<Tag> {
		Ok(Tag {
			id: TagId::new(convert::uuid(&self.id)?),
			name: self.name,
			slug: self.slug,
		})
	}
}

/// Repository for tag database operations.
#[derive(Clone)]
pub struct TagRepository {
	pool: SqlitePool,
}

impl TagRepository {
	/// Create a new repository from an existing pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get or create the tag with this name, returning a stable reference.
	///
	/// Two distinct names can collide on one slug ("Rust!" and "rust");
	/// that surfaces as a conflict rather than silently reusing the slug.
	#[tracing::instrument(skip(self))]
	pub async fn ensure_tag(&self, name: &str) -> Result<Tag> {
		let now = Utc::now().to_rfc3339();

		sqlx::query("INSERT OR IGNORE INTO tags (id, name, slug, created_at) VALUES (?, ?, ?, ?)")
			.bind(TagId::generate().to_string())
			.bind(name)
			.bind(slugify(name))
			.bind(&now)
			.execute(&self.pool)
			.await?;

		let row: Option<TagRow> = sqlx::query_as("SELECT id, name, slug FROM tags WHERE name = ?")
			.bind(name)
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some(row) => row.into_tag(),
			// INSERT OR IGNORE swallowed a slug collision with a different name.
			None => Err(DbError::Conflict(format!(
				"slug {:?} already belongs to another tag",
				slugify(name)
			))),
		}
	}

	/// Fetch a tag by slug.
	pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
		let row: Option<TagRow> = sqlx::query_as("SELECT id, name, slug FROM tags WHERE slug = ?")
			.bind(slug)
			.fetch_optional(&self.pool)
			.await?;
		row.map(TagRow::into_tag).transpose()
	}

	/// Replace the tag set of a post. Tags are ensured (created if missing)
	/// before the association is rewritten.
	#[tracing::instrument(skip(self, names), fields(count = names.len()))]
	pub async fn set_post_tags(&self, post_id: PostId, names: &[&str]) -> Result<Vec<Tag>> {
		let mut tags = Vec::with_capacity(names.len());
		for name in names {
			tags.push(self.ensure_tag(name).await?);
		}

		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
			.bind(post_id.to_string())
			.execute(&mut *tx)
			.await?;

		for tag in &tags {
			sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
				.bind(post_id.to_string())
				.bind(tag.id.to_string())
				.execute(&mut *tx)
				.await?;
		}

		tx.commit().await?;
		Ok(tags)
	}

	/// Tags attached to a post, by name.
	pub async fn tags_for_post(&self, post_id: PostId) -> Result<Vec<Tag>> {
		let rows: Vec<TagRow> = sqlx::query_as(
			r#"
			SELECT t.id, t.name, t.slug
			FROM post_tags pt
			JOIN tags t ON t.id = pt.tag_id
			WHERE pt.post_id = ?
			ORDER BY t.name
			"#,
		)
		.bind(post_id.to_string())
		.fetch_all(&self.pool)
		.await?;
		rows.into_iter().map(TagRow::into_tag).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::post::{NewPost, PostRepository};
	use crate::testing::create_post_test_pool;
	use crate::user::{NewUser, UserRepository};
	use quill_server_auth::{Role, UserId};

	mod slugify {
		use super::*;

		#[test]
		fn lowercases_and_dashes() {
			assert_eq!(slugify("Rust"), "rust");
			assert_eq!(slugify("Web Development"), "web-development");
			assert_eq!(slugify("C++ Tips & Tricks"), "c-tips-tricks");
		}

		#[test]
		fn collapses_runs_and_trims_edges() {
			assert_eq!(slugify("  hello   world  "), "hello-world");
			assert_eq!(slugify("--already--dashed--"), "already-dashed");
		}

		#[test]
		fn is_deterministic() {
			assert_eq!(slugify("Django & Rust"), slugify("Django & Rust"));
		}

		#[test]
		fn degenerate_names_become_empty() {
			assert_eq!(slugify("!!!"), "");
			assert_eq!(slugify(""), "");
		}
	}

	async fn seed_post(pool: &SqlitePool) -> PostId {
		let author: UserId = UserRepository::new(pool.clone())
			.create(NewUser {
				username: "alice".to_string(),
				email: "alice@example.com".to_string(),
				password: "correct horse battery staple".to_string(),
				bio: None,
				avatar_url: None,
				role: Role::Member,
			})
			.await
			.unwrap()
			.id;

		PostRepository::new(pool.clone())
			.create(
				author,
				NewPost {
					title: "Tagged".to_string(),
					content: "...".to_string(),
					published: true,
				},
			)
			.await
			.unwrap()
			.id
	}

	#[tokio::test]
	async fn ensure_tag_is_idempotent() {
		let repo = TagRepository::new(create_post_test_pool().await);

		let first = repo.ensure_tag("Rust").await.unwrap();
		let second = repo.ensure_tag("Rust").await.unwrap();
		assert_eq!(first, second);
		assert_eq!(first.slug, "rust");
	}

	#[tokio::test]
	async fn slug_is_immutable_once_created() {
		let repo = TagRepository::new(create_post_test_pool().await);

		let tag = repo.ensure_tag("Web Development").await.unwrap();
		assert_eq!(tag.slug, "web-development");

		// Re-ensuring with the same name never re-derives the slug.
		let again = repo.ensure_tag("Web Development").await.unwrap();
		assert_eq!(again.slug, "web-development");
		assert_eq!(repo.get_by_slug("web-development").await.unwrap(), Some(tag));
	}

	#[tokio::test]
	async fn colliding_slug_is_a_conflict() {
		let repo = TagRepository::new(create_post_test_pool().await);

		repo.ensure_tag("rust").await.unwrap();
		let err = repo.ensure_tag("Rust!").await.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)));
	}

	#[tokio::test]
	async fn set_post_tags_replaces_the_set() {
		let pool = create_post_test_pool().await;
		let post_id = seed_post(&pool).await;
		let repo = TagRepository::new(pool);

		repo.set_post_tags(post_id, &["rust", "web"]).await.unwrap();
		let names: Vec<_> = repo
			.tags_for_post(post_id)
			.await
			.unwrap()
			.into_iter()
			.map(|t| t.name)
			.collect();
		assert_eq!(names, vec!["rust", "web"]);

		repo.set_post_tags(post_id, &["web", "testing"]).await.unwrap();
		let names: Vec<_> = repo
			.tags_for_post(post_id)
			.await
			.unwrap()
			.into_iter()
			.map(|t| t.name)
			.collect();
		assert_eq!(names, vec!["testing", "web"]);
	}

	#[tokio::test]
	async fn clearing_tags_leaves_tag_entities_in_place() {
		let pool = create_post_test_pool().await;
		let post_id = seed_post(&pool).await;
		let repo = TagRepository::new(pool);

		repo.set_post_tags(post_id, &["rust"]).await.unwrap();
		repo.set_post_tags(post_id, &[]).await.unwrap();

		assert!(repo.tags_for_post(post_id).await.unwrap().is_empty());
		assert!(repo.get_by_slug("rust").await.unwrap().is_some());
	}
}
