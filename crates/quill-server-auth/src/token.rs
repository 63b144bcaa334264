// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Opaque bearer tokens.
//!
//! Tokens are 32 random bytes, hex encoded, carrying the `qt_` prefix so
//! they are recognizable in Authorization headers. Only the SHA-256 digest
//! of a token is persisted; the raw value exists exactly once, in the
//! response that hands it to the client. Token values are never logged.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix identifying Quill access tokens.
pub const ACCESS_TOKEN_PREFIX: &str = "qt_";

/// Generate a fresh access token.
pub fn generate_access_token() -> String {
	let mut bytes = [0u8; 32];
	rand::thread_rng().fill_bytes(&mut bytes);
	format!("{}{}", ACCESS_TOKEN_PREFIX, hex::encode(bytes))
}

/// Digest a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
	hex::encode(Sha256::digest(token.as_bytes()))
}
