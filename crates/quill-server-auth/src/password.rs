// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2 password hashing.
//!
//! This module provides a centralized Argon2 instance that uses:
//! - Production-strength parameters in release builds
//! - Fast, reduced-cost parameters in tests for performance
//!
//! # Security Note
//!
//! Production parameters use Argon2id with strong defaults:
//! - Memory: 19456 KiB (~19 MiB)
//! - Iterations: 2
//! - Parallelism: 1
//!
//! Test parameters are intentionally weak and MUST NOT be used in production.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};
use thiserror::Error;

/// Errors from password hashing and verification.
#[derive(Debug, Error)]
pub enum PasswordError {
	#[error("password hashing failed: {0}")]
	Hash(String),

	#[error("stored password hash is malformed: {0}")]
	Malformed(String),
}

/// Returns an Argon2 instance configured appropriately for the build context.
#[inline]
fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		// Fast, insecure parameters for tests ONLY.
		let params = Params::new(
			1024, // memory_kib: 1 MiB
			1,    // iterations
			1,    // parallelism
			None, // output length = default
		)
		.expect("valid Argon2 params for tests");
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
	}

	#[cfg(not(test))]
	{
		// Production: Argon2id with memory=19456 KiB, iterations=2, parallelism=1
		Argon2::default()
	}
}

/// Hash a password for storage. The output is a PHC-format string carrying
/// algorithm, parameters, and salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|e| PasswordError::Hash(e.to_string()))?;
	Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
	let parsed = PasswordHash::new(stored_hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;
	Ok(argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok())
}
