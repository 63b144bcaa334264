// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_users_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS users (
			id TEXT PRIMARY KEY,
			username TEXT UNIQUE NOT NULL,
			email TEXT UNIQUE NOT NULL,
			password_hash TEXT NOT NULL,
			bio TEXT,
			avatar_url TEXT,
			role TEXT NOT NULL DEFAULT 'member',
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_capability_grants_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS capability_grants (
			user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			capability TEXT NOT NULL,
			created_at TEXT NOT NULL,
			PRIMARY KEY (user_id, capability)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_sessions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS sessions (
			id TEXT PRIMARY KEY,
			user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			token_hash TEXT NOT NULL,
			created_at TEXT NOT NULL,
			last_used_at TEXT NOT NULL,
			expires_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_token_hash ON sessions(token_hash)")
		.execute(pool)
		.await
		.unwrap();
}

pub async fn create_posts_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS posts (
			id TEXT PRIMARY KEY,
			author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			title TEXT NOT NULL,
			content TEXT NOT NULL,
			published INTEGER NOT NULL DEFAULT 0,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_comments_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS comments (
			id TEXT PRIMARY KEY,
			post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
			author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			content TEXT NOT NULL,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_authors_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS authors (
			id TEXT PRIMARY KEY,
			name TEXT UNIQUE NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_books_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS books (
			id TEXT PRIMARY KEY,
			title TEXT NOT NULL,
			publication_year INTEGER NOT NULL,
			author_id TEXT NOT NULL REFERENCES authors(id),
			created_by TEXT REFERENCES users(id),
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_follows_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS follows (
			follower_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			followed_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			created_at TEXT NOT NULL,
			PRIMARY KEY (follower_id, followed_id),
			CHECK (follower_id <> followed_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_tags_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS tags (
			id TEXT PRIMARY KEY,
			name TEXT UNIQUE NOT NULL,
			slug TEXT UNIQUE NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_post_tags_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS post_tags (
			post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
			tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
			PRIMARY KEY (post_id, tag_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_user_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_users_table(&pool).await;
	create_capability_grants_table(&pool).await;
	pool
}

pub async fn create_session_test_pool() -> SqlitePool {
	let pool = create_user_test_pool().await;
	create_sessions_table(&pool).await;
	pool
}

pub async fn create_post_test_pool() -> SqlitePool {
	let pool = create_user_test_pool().await;
	create_posts_table(&pool).await;
	create_comments_table(&pool).await;
	create_tags_table(&pool).await;
	create_post_tags_table(&pool).await;
	pool
}

pub async fn create_book_test_pool() -> SqlitePool {
	let pool = create_user_test_pool().await;
	create_authors_table(&pool).await;
	create_books_table(&pool).await;
	pool
}

pub async fn create_follow_test_pool() -> SqlitePool {
	let pool = create_user_test_pool().await;
	create_follows_table(&pool).await;
	pool
}

/// Full schema, for end-to-end scenarios.
pub async fn create_platform_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_users_table(&pool).await;
	create_capability_grants_table(&pool).await;
	create_sessions_table(&pool).await;
	create_posts_table(&pool).await;
	create_comments_table(&pool).await;
	create_authors_table(&pool).await;
	create_books_table(&pool).await;
	create_follows_table(&pool).await;
	create_tags_table(&pool).await;
	create_post_tags_table(&pool).await;
	pool
}
