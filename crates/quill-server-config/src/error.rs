// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io {
		path: String,
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	Parse {
		path: String,
		source: toml::de::Error,
	},

	#[error("invalid configuration: {0}")]
	Invalid(String),
}
