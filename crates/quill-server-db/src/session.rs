// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session repository and subject resolution.
//!
//! A session stores only the SHA-256 digest of its opaque token; the raw
//! token is returned exactly once, at creation. Resolution is pure lookup
//! over stored credentials: an absent credential resolves to the anonymous
//! subject, a present-but-invalid one fails with `Unauthenticated`.

use chrono::{Duration, Utc};
use quill_server_auth::middleware::Credential;
use quill_server_auth::token::{generate_access_token, hash_token};
use quill_server_auth::{AccessError, CurrentUser, SessionId, Subject, UserId};
use sqlx::sqlite::SqlitePool;

use crate::convert;
use crate::error::{DbError, Result};
use crate::user::UserRepository;

/// A stored session. The token digest is deliberately not part of this view.
#[derive(Debug, Clone)]
pub struct Session {
	pub id: SessionId,
	pub user_id: UserId,
	pub created_at: chrono::DateTime<Utc>,
	pub last_used_at: chrono::DateTime<Utc>,
	pub expires_at: chrono::DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
	id: String,
	user_id: String,
	created_at: String,
	last_used_at: String,
	expires_at: String,
}

impl SessionRow {
	fn into_session(self) -> Result<Session> {
		Ok(Session {
			id: SessionId::new(convert::uuid(&self.id)?),
			user_id: UserId::new(convert::uuid(&self.user_id)?),
			created_at: convert::timestamp(&self.created_at)?,
			last_used_at: convert::timestamp(&self.last_used_at)?,
			expires_at: convert::timestamp(&self.expires_at)?,
		})
	}
}

/// Repository for session database operations.
#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
	users: UserRepository,
}

impl SessionRepository {
	/// Create a new repository from an existing pool.
	pub fn new(pool: SqlitePool) -> Self {
		let users = UserRepository::new(pool.clone());
		Self { pool, users }
	}

	/// Open a session for a user. Returns the stored session and the raw
	/// token - the only time the token exists outside the client.
	#[tracing::instrument(skip(self))]
	pub async fn create(&self, user_id: UserId, ttl: Duration) -> Result<(Session, String)> {
		let id = SessionId::generate();
		let token = generate_access_token();
		let now = Utc::now();

		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, token_hash, created_at, last_used_at, expires_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(user_id.to_string())
		.bind(hash_token(&token))
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.bind((now + ttl).to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(session_id = %id, "session created");

		let session = self
			.get(id)
			.await?
			.ok_or_else(|| DbError::Internal("session not found after insert".to_string()))?;
		Ok((session, token))
	}

	/// Fetch a session by id.
	pub async fn get(&self, id: SessionId) -> Result<Option<Session>> {
		let row: Option<SessionRow> = sqlx::query_as(
			"SELECT id, user_id, created_at, last_used_at, expires_at FROM sessions WHERE id = ?",
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;
		row.map(SessionRow::into_session).transpose()
	}

	/// Resolve an optional request credential to a subject.
	///
	/// No credential is a valid anonymous resolution; a presented credential
	/// that does not check out is an authentication failure, so protected
	/// writes stop before touching anything.
	pub async fn resolve(&self, credential: Option<&Credential>) -> std::result::Result<Subject, AccessError> {
		match credential {
			None => Ok(Subject::Anonymous),
			Some(credential) => self.resolve_token(credential.token()).await,
		}
	}

	/// Resolve a raw token to an authenticated subject.
	#[tracing::instrument(skip(self, token))]
	pub async fn resolve_token(&self, token: &str) -> std::result::Result<Subject, AccessError> {
		let session = self
			.lookup_live_session(token)
			.await
			.map_err(AccessError::from)?
			.ok_or(AccessError::Unauthenticated)?;

		let attrs = self
			.users
			.subject_attrs(session.user_id)
			.await
			.map_err(AccessError::from)?
			.ok_or(AccessError::Unauthenticated)?;

		Ok(Subject::Authenticated(attrs))
	}

	/// Resolve a raw token to the full current-user context.
	pub async fn resolve_current_user(
		&self,
		token: &str,
	) -> std::result::Result<CurrentUser, AccessError> {
		let session = self
			.lookup_live_session(token)
			.await
			.map_err(AccessError::from)?
			.ok_or(AccessError::Unauthenticated)?;

		let user = self
			.users
			.get(session.user_id)
			.await
			.map_err(AccessError::from)?
			.ok_or(AccessError::Unauthenticated)?;

		Ok(CurrentUser::from_session(user, session.id))
	}

	/// Close a session (logout). Idempotent.
	#[tracing::instrument(skip(self))]
	pub async fn revoke(&self, id: SessionId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete all expired sessions, returning how many were removed.
	#[tracing::instrument(skip(self))]
	pub async fn purge_expired(&self) -> Result<u64> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected())
	}

	async fn lookup_live_session(&self, token: &str) -> Result<Option<Session>> {
		let row: Option<SessionRow> = sqlx::query_as(
			r#"
			SELECT id, user_id, created_at, last_used_at, expires_at
			FROM sessions
			WHERE token_hash = ? AND expires_at > ?
			"#,
		)
		.bind(hash_token(token))
		.bind(Utc::now().to_rfc3339())
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let session = row.into_session()?;

		sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
			.bind(Utc::now().to_rfc3339())
			.bind(session.id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(Some(session))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_session_test_pool;
	use crate::user::NewUser;
	use quill_server_auth::Role;

	async fn seed_user(pool: &SqlitePool) -> UserId {
		UserRepository::new(pool.clone())
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
			.id
	}

	#[tokio::test]
	async fn create_then_resolve_round_trip() {
		let pool = create_session_test_pool().await;
		let user_id = seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let (session, token) = sessions.create(user_id, Duration::hours(1)).await.unwrap();
		assert_eq!(session.user_id, user_id);
		assert!(token.starts_with("qt_"));

		let subject = sessions.resolve_token(&token).await.unwrap();
		assert_eq!(subject.user_id(), Some(user_id));
	}

	#[tokio::test]
	async fn raw_token_is_never_stored() {
		let pool = create_session_test_pool().await;
		let user_id = seed_user(&pool).await;
		let sessions = SessionRepository::new(pool.clone());

		let (_, token) = sessions.create(user_id, Duration::hours(1)).await.unwrap();

		let (stored,): (String,) = sqlx::query_as("SELECT token_hash FROM sessions")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_ne!(stored, token);
		assert_eq!(stored, hash_token(&token));
	}

	#[tokio::test]
	async fn invalid_token_is_unauthenticated() {
		let pool = create_session_test_pool().await;
		seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let err = sessions.resolve_token("qt_forged").await.unwrap_err();
		assert_eq!(err, AccessError::Unauthenticated);
	}

	#[tokio::test]
	async fn expired_session_is_unauthenticated() {
		let pool = create_session_test_pool().await;
		let user_id = seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let (_, token) = sessions
			.create(user_id, Duration::seconds(-1))
			.await
			.unwrap();
		let err = sessions.resolve_token(&token).await.unwrap_err();
		assert_eq!(err, AccessError::Unauthenticated);
	}

	#[tokio::test]
	async fn missing_credential_resolves_anonymous() {
		let pool = create_session_test_pool().await;
		seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let subject = sessions.resolve(None).await.unwrap();
		assert!(subject.is_anonymous());
	}

	#[tokio::test]
	async fn revoked_session_no_longer_resolves() {
		let pool = create_session_test_pool().await;
		let user_id = seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let (session, token) = sessions.create(user_id, Duration::hours(1)).await.unwrap();
		assert!(sessions.revoke(session.id).await.unwrap());
		assert!(!sessions.revoke(session.id).await.unwrap());

		assert_eq!(
			sessions.resolve_token(&token).await.unwrap_err(),
			AccessError::Unauthenticated
		);
	}

	#[tokio::test]
	async fn purge_removes_only_expired_sessions() {
		let pool = create_session_test_pool().await;
		let user_id = seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let (_, live) = sessions.create(user_id, Duration::hours(1)).await.unwrap();
		sessions.create(user_id, Duration::seconds(-1)).await.unwrap();

		assert_eq!(sessions.purge_expired().await.unwrap(), 1);
		assert!(sessions.resolve_token(&live).await.is_ok());
	}

	#[tokio::test]
	async fn resolve_current_user_carries_session_id() {
		let pool = create_session_test_pool().await;
		let user_id = seed_user(&pool).await;
		let sessions = SessionRepository::new(pool);

		let (session, token) = sessions.create(user_id, Duration::hours(1)).await.unwrap();
		let current = sessions.resolve_current_user(&token).await.unwrap();
		assert_eq!(current.user.id, user_id);
		assert_eq!(current.session_id, Some(session.id));
	}
}
