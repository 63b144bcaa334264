// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for Quill.
//!
//! Repository structs own a [`sqlx::SqlitePool`] and expose the operations
//! the routing layer composes with the auth engine:
//!
//! - [`UserRepository`] - accounts, credentials, capability grants
//! - [`SessionRepository`] - opaque-token sessions and subject resolution
//! - [`PostRepository`] - posts and comments
//! - [`BookRepository`] - the book catalog and its authors
//! - [`FollowRepository`] - the directed follow graph
//! - [`TagRepository`] - tags with derived slugs
//!
//! Collection listings execute a [`quill_server_query::QueryPlan`], so every
//! filter/search/order/page behavior has exactly one implementation.
//!
//! The store is assumed to enforce uniqueness constraints and atomic
//! single-row mutation; outages surface as
//! [`AccessError::StoreUnavailable`](quill_server_auth::AccessError).

pub mod book;
mod convert;
pub mod error;
pub mod follow;
pub mod pool;
pub mod post;
pub mod session;
pub mod tag;
pub mod testing;
pub mod user;

pub use book::{Author, Book, BookRepository, NewBook};
pub use error::{DbError, Result};
pub use follow::{FollowChange, FollowGraph, FollowRepository};
pub use pool::create_pool;
pub use post::{Comment, NewPost, Post, PostRepository, PostSummary};
pub use session::{Session, SessionRepository};
pub use tag::{slugify, Tag, TagRepository};
pub use user::{NewUser, UserRepository};
