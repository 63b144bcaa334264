// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API request/response types for Quill.
//!
//! This crate holds the DTO layer the routing collaborator serializes over
//! the wire, plus field-level request validation. Write-path validation
//! failures are reported as a structured map of field name to messages
//! ([`ValidationErrors`]), one entry per offending field, never a single
//! opaque string.
//!
//! With the `openapi` feature enabled, every type derives
//! [`utoipa::ToSchema`] for API documentation.

pub mod books;
pub mod posts;
pub mod social;
pub mod users;
pub mod validation;

pub use validation::ValidationErrors;
