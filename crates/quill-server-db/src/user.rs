// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for account, credential, and capability-grant operations.
//!
//! The argon2 password digest never leaves this module: entity queries select
//! every column except `password_hash`, and credential checks compare inside
//! [`UserRepository::verify_credentials`].

use quill_server_auth::password::{hash_password, verify_password};
use quill_server_auth::{Capability, Role, SubjectAttrs, User, UserId, UserProfile};
use quill_server_query::{apply, FieldValue, QueryPage, QueryPlan, Queryable};
use sqlx::sqlite::SqlitePool;

use crate::convert;
use crate::error::{is_unique_violation, DbError, Result};

const USER_COLUMNS: &str = "id, username, email, bio, avatar_url, role, created_at, updated_at";

/// Input for creating a user. The password arrives in clear exactly once
/// and is hashed before it touches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
	pub username: String,
	pub email: String,
	pub password: String,
	pub bio: Option<String>,
	pub avatar_url: Option<String>,
	pub role: Role,
}

#[derive(sqlx::FromRow)]
struct UserRow {
	id: String,
	username: String,
	email: String,
	bio: Option<String>,
	avatar_url: Option<String>,
	role: String,
	created_at: String,
	updated_at: String,
}

impl UserRow {
	fn into_user(self) -> Result<User> {
		Ok(User {
			id: UserId::new(convert::uuid(&self.id)?),
			username: self.username,
			email: self.email,
			bio: self.bio,
			avatar_url: self.avatar_url,
			role: self
				.role
				.parse()
				.map_err(|e| DbError::Internal(format!("malformed role: {e}")))?,
			created_at: convert::timestamp(&self.created_at)?,
			updated_at: convert::timestamp(&self.updated_at)?,
		})
	}
}

/// Directory snapshot used when executing user listing plans.
#[derive(Debug, Clone)]
struct UserSnapshot(User);

impl Queryable for UserSnapshot {
	fn field(&self, name: &str) -> FieldValue {
		match name {
			"username" => FieldValue::Text(self.0.username.clone()),
			"email" => FieldValue::Text(self.0.email.clone()),
			"bio" => match &self.0.bio {
				Some(bio) => FieldValue::Text(bio.clone()),
				None => FieldValue::Null,
			},
			"role" => FieldValue::Text(self.0.role.to_string()),
			// RFC 3339 text orders chronologically.
			"created_at" => FieldValue::Text(self.0.created_at.to_rfc3339()),
			_ => FieldValue::Null,
		}
	}
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository from an existing pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get the underlying database pool.
	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Create a user. Uniqueness of the login email and the username is
	/// enforced by the store and surfaced as a conflict.
	#[tracing::instrument(skip(self, new_user), fields(username = %new_user.username))]
	pub async fn create(&self, new_user: NewUser) -> Result<User> {
		let id = UserId::generate();
		let now = chrono::Utc::now().to_rfc3339();
		let password_hash = hash_password(&new_user.password)
			.map_err(|e| DbError::Internal(format!("password hashing failed: {e}")))?;

		sqlx::query(
			r#"
			INSERT INTO users (id, username, email, password_hash, bio, avatar_url, role, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(&new_user.username)
		.bind(&new_user.email)
		.bind(&password_hash)
		.bind(&new_user.bio)
		.bind(&new_user.avatar_url)
		.bind(new_user.role.to_string())
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await
		.map_err(|e| {
			if is_unique_violation(&e, "users.username") {
				DbError::Conflict("username already taken".to_string())
			} else if is_unique_violation(&e, "users.email") {
				DbError::Conflict("email already registered".to_string())
			} else {
				DbError::Sqlx(e)
			}
		})?;

		tracing::debug!(user_id = %id, "user created");

		self
			.get(id)
			.await?
			.ok_or_else(|| DbError::Internal("user not found after insert".to_string()))
	}

	/// Fetch a user by id.
	pub async fn get(&self, id: UserId) -> Result<Option<User>> {
		let row: Option<UserRow> =
			sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
				.bind(id.to_string())
				.fetch_optional(&self.pool)
				.await?;
		row.map(UserRow::into_user).transpose()
	}

	/// Fetch a user by username.
	pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
		let row: Option<UserRow> =
			sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
				.bind(username)
				.fetch_optional(&self.pool)
				.await?;
		row.map(UserRow::into_user).transpose()
	}

	/// Fetch a user by login email.
	pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
		let row: Option<UserRow> =
			sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
				.bind(email)
				.fetch_optional(&self.pool)
				.await?;
		row.map(UserRow::into_user).transpose()
	}

	/// Check a login credential. Returns the user on success, `None` on an
	/// unknown email or a wrong password - indistinguishable to the caller.
	#[tracing::instrument(skip(self, password))]
	pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
		let row: Option<(String, String)> =
			sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
				.bind(email)
				.fetch_optional(&self.pool)
				.await?;

		let Some((id, stored_hash)) = row else {
			return Ok(None);
		};

		let valid = verify_password(password, &stored_hash)
			.map_err(|e| DbError::Internal(format!("stored credential unreadable: {e}")))?;
		if !valid {
			return Ok(None);
		}

		self.get(UserId::new(convert::uuid(&id)?)).await
	}

	/// Update the mutable profile fields.
	pub async fn update_profile(
		&self,
		id: UserId,
		bio: Option<&str>,
		avatar_url: Option<&str>,
	) -> Result<bool> {
		let now = chrono::Utc::now().to_rfc3339();
		let result = sqlx::query("UPDATE users SET bio = ?, avatar_url = ?, updated_at = ? WHERE id = ?")
			.bind(bio)
			.bind(avatar_url)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Replace the user's role. Administrative action.
	#[tracing::instrument(skip(self))]
	pub async fn set_role(&self, id: UserId, role: Role) -> Result<bool> {
		let now = chrono::Utc::now().to_rfc3339();
		let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
			.bind(role.to_string())
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete a user account.
	pub async fn delete(&self, id: UserId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Grant a capability beyond the user's role. Idempotent.
	#[tracing::instrument(skip(self))]
	pub async fn grant_capability(&self, id: UserId, capability: Capability) -> Result<()> {
		let now = chrono::Utc::now().to_rfc3339();
		sqlx::query(
			"INSERT OR IGNORE INTO capability_grants (user_id, capability, created_at) VALUES (?, ?, ?)",
		)
		.bind(id.to_string())
		.bind(capability.to_string())
		.bind(&now)
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Revoke an explicit capability grant. Idempotent.
	#[tracing::instrument(skip(self))]
	pub async fn revoke_capability(&self, id: UserId, capability: Capability) -> Result<bool> {
		let result = sqlx::query("DELETE FROM capability_grants WHERE user_id = ? AND capability = ?")
			.bind(id.to_string())
			.bind(capability.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// The user's explicit capability grants (role expansion excluded).
	pub async fn capabilities(&self, id: UserId) -> Result<Vec<Capability>> {
		let rows: Vec<(String,)> =
			sqlx::query_as("SELECT capability FROM capability_grants WHERE user_id = ? ORDER BY capability")
				.bind(id.to_string())
				.fetch_all(&self.pool)
				.await?;

		rows
			.into_iter()
			.map(|(raw,)| {
				raw
					.parse()
					.map_err(|e| DbError::Internal(format!("malformed capability grant: {e}")))
			})
			.collect()
	}

	/// Build the ABAC subject attributes for a user: role plus explicit grants.
	pub async fn subject_attrs(&self, id: UserId) -> Result<Option<SubjectAttrs>> {
		let Some(user) = self.get(id).await? else {
			return Ok(None);
		};
		let grants = self.capabilities(id).await?;
		Ok(Some(SubjectAttrs {
			user_id: user.id,
			role: user.role,
			grants,
		}))
	}

	/// Execute a user-directory listing plan. Returns public profiles; the
	/// login email is searchable but never part of the result.
	#[tracing::instrument(skip(self, plan))]
	pub async fn list(&self, plan: &QueryPlan) -> Result<QueryPage<UserProfile>> {
		let rows: Vec<UserRow> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users"))
			.fetch_all(&self.pool)
			.await?;

		let snapshots = rows
			.into_iter()
			.map(|row| row.into_user().map(UserSnapshot))
			.collect::<Result<Vec<_>>>()?;

		let page = apply(plan, &snapshots);
		Ok(QueryPage {
			items: page.items.into_iter().map(|s| s.0.to_profile()).collect(),
			total: page.total,
		})
	}
}
