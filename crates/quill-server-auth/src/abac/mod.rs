// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC (Attribute-Based Access Control) for Quill.
//!
//! Policy evaluation is a pure function over three inputs: a [`Subject`]
//! snapshot (who is asking), an [`Action`](crate::types::Action), and a
//! [`ResourceAttrs`] snapshot (what is being acted on). All attributes are
//! loaded before evaluation; policies never touch the database.

mod engine;
pub mod policies;
mod types;

pub use engine::authorize;
pub use types::{ResourceAttrs, Subject, SubjectAttrs};
