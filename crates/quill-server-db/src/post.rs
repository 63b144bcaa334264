// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post and comment repository.
//!
//! Posts carry a draft/published lifecycle flag; the author is fixed at
//! creation and never transfers. Listing executes a composed
//! [`QueryPlan`] over joined snapshots so that filter, search, ordering,
//! and pagination semantics live in one place (quill-server-query).

use chrono::{DateTime, Utc};
use quill_server_auth::{CommentId, PostId, ResourceAttrs, UserId};
use quill_server_query::{apply, FieldValue, QueryPage, QueryPlan, Queryable};
use sqlx::sqlite::SqlitePool;

use crate::convert;
use crate::error::{DbError, Result};

/// A stored post.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Post {
	pub id: PostId,
	pub author_id: UserId,
	pub title: String,
	pub content: String,
	pub published: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Post {
	/// Attribute snapshot for the ABAC engine.
	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::post(self.author_id).with_published(self.published)
	}
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
	pub title: String,
	pub content: String,
	pub published: bool,
}

/// A post as it appears in listings: nested author handle plus comment count.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PostSummary {
	pub id: PostId,
	pub author_id: UserId,
	pub author_username: String,
	pub title: String,
	pub content: String,
	pub published: bool,
	pub comment_count: u32,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Queryable for PostSummary {
	fn field(&self, name: &str) -> FieldValue {
		match name {
			"title" => FieldValue::Text(self.title.clone()),
			"content" => FieldValue::Text(self.content.clone()),
			"author__username" => FieldValue::Text(self.author_username.clone()),
			"published" => FieldValue::Bool(self.published),
			// RFC 3339 text orders chronologically.
			"created_at" => FieldValue::Text(self.created_at.to_rfc3339()),
			"updated_at" => FieldValue::Text(self.updated_at.to_rfc3339()),
			_ => FieldValue::Null,
		}
	}
}

/// A stored comment, with the author handle joined in for serialization.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Comment {
	pub id: CommentId,
	pub post_id: PostId,
	pub author_id: UserId,
	pub author_username: String,
	pub content: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Comment {
	/// Attribute snapshot for the ABAC engine.
	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::comment(self.author_id)
	}
}

#[derive(sqlx::FromRow)]
struct PostRow {
	id: String,
	author_id: String,
	title: String,
	content: String,
	published: i64,
	created_at: String,
	updated_at: String,
}

impl PostRow {
	fn into_post(self) -> Result<Post> {
		Ok(Post {
			id: PostId::new(convert::uuid(&self.id)?),
			author_id: UserId::new(convert::uuid(&self.author_id)?),
			title: self.title,
			content: self.content,
			published: self.published != 0,
			created_at: convert::timestamp(&self.created_at)?,
			updated_at: convert::timestamp(&self.updated_at)?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
	id: String,
	author_id: String,
	author_username: String,
	title: String,
	content: String,
	published: i64,
	comment_count: i64,
	created_at: String,
	updated_at: String,
}

impl PostSummaryRow {
	fn into_summary(self) -> Result<PostSummary> {
		Ok(PostSummary {
			id: PostId::new(convert::uuid(&self.id)?),
			author_id: UserId::new(convert::uuid(&self.author_id)?),
			author_username: self.author_username,
			title: self.title,
			content: self.content,
			published: self.published != 0,
			comment_count: self.comment_count as u32,
			created_at: convert::timestamp(&self.created_at)?,
			updated_at: convert::timestamp(&self.updated_at)?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct CommentRow {
	id: String,
	post_id: String,
	author_id: String,
	author_username: String,
	content: String,
	created_at: String,
	updated_at: String,
}

impl CommentRow {
	fn into_comment(self) -> Result<Comment> {
		Ok(Comment {
			id: CommentId::new(convert::uuid(&self.id)?),
			post_id: PostId::new(convert::uuid(&self.post_id)?),
			author_id: UserId::new(convert::uuid(&self.author_id)?),
			author_username: self.author_username,
			content: self.content,
			created_at: convert::timestamp(&self.created_at)?,
			updated_at: convert::timestamp(&self.updated_at)?,
		})
	}
}

/// Repository for post and comment database operations.
#[derive(Clone)]
pub struct PostRepository {
	pool: SqlitePool,
}

impl PostRepository {
	/// Create a new repository from an existing pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get the underlying database pool.
	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Create a post owned by the given author.
	#[tracing::instrument(skip(self, new_post), fields(title = %new_post.title))]
	pub async fn create(&self, author_id: UserId, new_post: NewPost) -> Result<Post> {
		let id = PostId::generate();
		let now = Utc::now().to_rfc3339();

		sqlx::query(
			r#"
			INSERT INTO posts (id, author_id, title, content, published, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(author_id.to_string())
		.bind(&new_post.title)
		.bind(&new_post.content)
		.bind(new_post.published as i64)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!(post_id = %id, "post created");

		self
			.get(id)
			.await?
			.ok_or_else(|| DbError::Internal("post not found after insert".to_string()))
	}

	/// Fetch a post by id.
	pub async fn get(&self, id: PostId) -> Result<Option<Post>> {
		let row: Option<PostRow> = sqlx::query_as(
			"SELECT id, author_id, title, content, published, created_at, updated_at FROM posts WHERE id = ?",
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;
		row.map(PostRow::into_post).transpose()
	}

	/// Update a post's content fields. The author never changes.
	pub async fn update(&self, id: PostId, title: &str, content: &str) -> Result<bool> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query("UPDATE posts SET title = ?, content = ?, updated_at = ? WHERE id = ?")
			.bind(title)
			.bind(content)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Move a post between the draft and published states.
	#[tracing::instrument(skip(self))]
	pub async fn set_published(&self, id: PostId, published: bool) -> Result<bool> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query("UPDATE posts SET published = ?, updated_at = ? WHERE id = ?")
			.bind(published as i64)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete a post along with its comments and tag links.
	#[tracing::instrument(skip(self))]
	pub async fn delete(&self, id: PostId) -> Result<bool> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM comments WHERE post_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		let result = sqlx::query("DELETE FROM posts WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(result.rows_affected() > 0)
	}

	/// Execute a post listing plan over joined snapshots.
	#[tracing::instrument(skip(self, plan))]
	pub async fn list(&self, plan: &QueryPlan) -> Result<QueryPage<PostSummary>> {
		let rows: Vec<PostSummaryRow> = sqlx::query_as(
			r#"
			SELECT
				p.id,
				p.author_id,
				u.username AS author_username,
				p.title,
				p.content,
				p.published,
				(SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
				p.created_at,
				p.updated_at
			FROM posts p
			JOIN users u ON u.id = p.author_id
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let snapshots = rows
			.into_iter()
			.map(PostSummaryRow::into_summary)
			.collect::<Result<Vec<_>>>()?;

		Ok(apply(plan, &snapshots))
	}

	/// Add a comment to an existing post.
	#[tracing::instrument(skip(self, content))]
	pub async fn add_comment(
		&self,
		post_id: PostId,
		author_id: UserId,
		content: &str,
	) -> Result<Comment> {
		if self.get(post_id).await?.is_none() {
			return Err(DbError::NotFound(format!("post {post_id}")));
		}

		let id = CommentId::generate();
		let now = Utc::now().to_rfc3339();

		sqlx::query(
			r#"
			INSERT INTO comments (id, post_id, author_id, content, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(post_id.to_string())
		.bind(author_id.to_string())
		.bind(content)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		self
			.get_comment(id)
			.await?
			.ok_or_else(|| DbError::Internal("comment not found after insert".to_string()))
	}

	/// Fetch a comment by id.
	pub async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
		let row: Option<CommentRow> = sqlx::query_as(
			r#"
			SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
			       c.content, c.created_at, c.updated_at
			FROM comments c
			JOIN users u ON u.id = c.author_id
			WHERE c.id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;
		row.map(CommentRow::into_comment).transpose()
	}

	/// Comments on a post, newest first.
	pub async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>> {
		let rows: Vec<CommentRow> = sqlx::query_as(
			r#"
			SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
			       c.content, c.created_at, c.updated_at
			FROM comments c
			JOIN users u ON u.id = c.author_id
			WHERE c.post_id = ?
			ORDER BY c.created_at DESC, c.id DESC
			"#,
		)
		.bind(post_id.to_string())
		.fetch_all(&self.pool)
		.await?;
		rows.into_iter().map(CommentRow::into_comment).collect()
	}

	/// Update a comment's content.
	pub async fn update_comment(&self, id: CommentId, content: &str) -> Result<bool> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
			.bind(content)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete a comment.
	pub async fn delete_comment(&self, id: CommentId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM comments WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}
