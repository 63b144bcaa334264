// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Book catalog repository.
//!
//! Catalog entries record who created them, but books are curated by
//! capability, not owned: creation confers no special rights. Listing
//! executes a composed [`QueryPlan`] over snapshots joined with the author
//! entity, which is what makes `author__name` filtering work.

use chrono::{DateTime, Utc};
use quill_server_auth::{AuthorId, BookId, ResourceAttrs, UserId};
use quill_server_query::{apply, FieldValue, QueryPage, QueryPlan, Queryable};
use sqlx::sqlite::SqlitePool;

use crate::convert;
use crate::error::{DbError, Result};

/// A catalog author entity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Author {
	pub id: AuthorId,
	pub name: String,
}

/// A catalog book, with the author entity joined in.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Book {
	pub id: BookId,
	pub title: String,
	pub publication_year: i64,
	pub author_id: AuthorId,
	pub author_name: String,
	pub created_by: Option<UserId>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Book {
	/// Attribute snapshot for the ABAC engine.
	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::book()
	}
}

impl Queryable for Book {
	fn field(&self, name: &str) -> FieldValue {
		match name {
			"title" => FieldValue::Text(self.title.clone()),
			"publication_year" => FieldValue::Int(self.publication_year),
			"author__name" => FieldValue::Text(self.author_name.clone()),
			// RFC 3339 text orders chronologically.
			"created_at" => FieldValue::Text(self.created_at.to_rfc3339()),
			_ => FieldValue::Null,
		}
	}
}

/// Input for creating a book.
#[derive(Debug, Clone)]
pub struct NewBook {
	pub title: String,
	pub publication_year: i64,
	pub author_id: AuthorId,
	pub created_by: Option<UserId>,
}

#[derive(sqlx::FromRow)]
struct BookRow {
	id: String,
	title: String,
	publication_year: i64,
	author_id: String,
	author_name: String,
	created_by: Option<String>,
	created_at: String,
	updated_at: String,
}

impl BookRow {
	fn into_book(self) -> Result<Book> {
		Ok(Book {
			id: BookId::new(convert::uuid(&self.id)?),
			title: self.title,
			publication_year: self.publication_year,
			author_id: AuthorId::new(convert::uuid(&self.author_id)?),
			author_name: self.author_name,
			created_by: self
				.created_by
				.as_deref()
				.map(|id| convert::uuid(id).map(UserId::new))
				.transpose()?,
			created_at: convert::timestamp(&self.created_at)?,
			updated_at: convert::timestamp(&self.updated_at)?,
		})
	}
}

const BOOK_SELECT: &str = r#"
	SELECT b.id, b.title, b.publication_year, b.author_id, a.name AS author_name,
	       b.created_by, b.created_at, b.updated_at
	FROM books b
	JOIN authors a ON a.id = b.author_id
"#;

/// Repository for book catalog database operations.
#[derive(Clone)]
pub struct BookRepository {
	pool: SqlitePool,
}

impl BookRepository {
	/// Create a new repository from an existing pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get the underlying database pool.
	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Get or create the author entity with this name, returning a stable
	/// reference either way.
	#[tracing::instrument(skip(self))]
	pub async fn ensure_author(&self, name: &str) -> Result<Author> {
		let now = Utc::now().to_rfc3339();

		sqlx::query("INSERT OR IGNORE INTO authors (id, name, created_at) VALUES (?, ?, ?)")
			.bind(AuthorId::generate().to_string())
			.bind(name)
			.bind(&now)
			.execute(&self.pool)
			.await?;

		let (id, name): (String, String) =
			sqlx::query_as("SELECT id, name FROM authors WHERE name = ?")
				.bind(name)
				.fetch_one(&self.pool)
				.await?;

		Ok(Author {
			id: AuthorId::new(convert::uuid(&id)?),
			name,
		})
	}

	/// Create a catalog entry.
	#[tracing::instrument(skip(self, new_book), fields(title = %new_book.title))]
	pub async fn create(&self, new_book: NewBook) -> Result<Book> {
		let id = BookId::generate();
		let now = Utc::now().to_rfc3339();

		sqlx::query(
			r#"
			INSERT INTO books (id, title, publication_year, author_id, created_by, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(&new_book.title)
		.bind(new_book.publication_year)
		.bind(new_book.author_id.to_string())
		.bind(new_book.created_by.map(|u| u.to_string()))
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!(book_id = %id, "book created");

		self
			.get(id)
			.await?
			.ok_or_else(|| DbError::Internal("book not found after insert".to_string()))
	}

	/// Fetch a book by id.
	pub async fn get(&self, id: BookId) -> Result<Option<Book>> {
		let row: Option<BookRow> = sqlx::query_as(&format!("{BOOK_SELECT} WHERE b.id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(BookRow::into_book).transpose()
	}

	/// Update a book's catalog fields.
	pub async fn update(&self, id: BookId, title: &str, publication_year: i64) -> Result<bool> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query(
			"UPDATE books SET title = ?, publication_year = ?, updated_at = ? WHERE id = ?",
		)
		.bind(title)
		.bind(publication_year)
		.bind(&now)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete a book.
	#[tracing::instrument(skip(self))]
	pub async fn delete(&self, id: BookId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM books WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Execute a catalog listing plan over author-joined snapshots.
	#[tracing::instrument(skip(self, plan))]
	pub async fn list(&self, plan: &QueryPlan) -> Result<QueryPage<Book>> {
		let rows: Vec<BookRow> = sqlx::query_as(BOOK_SELECT).fetch_all(&self.pool).await?;
		let snapshots = rows
			.into_iter()
			.map(BookRow::into_book)
			.collect::<Result<Vec<_>>>()?;
		Ok(apply(plan, &snapshots))
	}
}
