// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Quill server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`QUILL_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use quill_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod error;
pub mod sections;

pub use error::ConfigError;
pub use sections::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the server config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/quill/server.toml";

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Partial server configuration, as parsed from one source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: HttpConfigLayer,
	#[serde(default)]
	pub database: DatabaseConfigLayer,
	#[serde(default)]
	pub auth: AuthConfigLayer,
	#[serde(default)]
	pub logging: LoggingConfigLayer,
}

impl ServerConfigLayer {
	/// Merge another layer over this one, field by field.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		self.http.merge(other.http);
		self.database.merge(other.database);
		self.auth.merge(other.auth);
		self.logging.merge(other.logging);
	}

	/// Resolve the layer into runtime configuration, defaults filled in.
	pub fn finalize(self) -> ServerConfig {
		ServerConfig {
			http: self.http.finalize(),
			database: self.database.finalize(),
			auth: self.auth.finalize(),
			logging: self.logging.finalize(),
		}
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`QUILL_SERVER_*`)
/// 2. Config file (`/etc/quill/server.toml`, if present)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_config_with_file(DEFAULT_CONFIG_PATH)
}

/// Load configuration with a custom config file path. A missing file is not
/// an error; a present-but-malformed one is.
pub fn load_config_with_file(
	config_path: impl Into<PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let path = config_path.into();
	let mut merged = ServerConfigLayer::default();

	if path.exists() {
		debug!(path = %path.display(), "loading configuration file");
		merged.merge(load_toml_layer(&path)?);
	}

	merged.merge(env_layer()?);
	Ok(merged.finalize())
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(env_layer()?);
	Ok(merged.finalize())
}

fn load_toml_layer(path: &Path) -> Result<ServerConfigLayer, ConfigError> {
	let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.display().to_string(),
		source,
	})?;
	toml::from_str(&raw).map_err(|source| ConfigError::Parse {
		path: path.display().to_string(),
		source,
	})
}

fn env_layer() -> Result<ServerConfigLayer, ConfigError> {
	fn var(name: &str) -> Option<String> {
		std::env::var(name).ok().filter(|v| !v.is_empty())
	}

	fn parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
	where
		T::Err: std::fmt::Display,
	{
		var(name)
			.map(|v| {
				v.parse()
					.map_err(|e| ConfigError::Invalid(format!("{name}={v}: {e}")))
			})
			.transpose()
	}

	fn flag(name: &str) -> Option<bool> {
		var(name).map(|v| v == "1" || v.to_lowercase() == "true")
	}

	let format = match var("QUILL_SERVER_LOG_FORMAT").as_deref() {
		None => None,
		Some("json") => Some(LogFormat::Json),
		Some("text") => Some(LogFormat::Text),
		Some(other) => {
			return Err(ConfigError::Invalid(format!(
				"QUILL_SERVER_LOG_FORMAT={other}: expected \"text\" or \"json\""
			)))
		}
	};

	Ok(ServerConfigLayer {
		http: HttpConfigLayer {
			host: var("QUILL_SERVER_HTTP_HOST"),
			port: parse("QUILL_SERVER_HTTP_PORT")?,
		},
		database: DatabaseConfigLayer {
			url: var("QUILL_SERVER_DATABASE_URL"),
		},
		auth: AuthConfigLayer {
			dev_mode: flag("QUILL_SERVER_AUTH_DEV_MODE"),
			session_cookie_name: var("QUILL_SERVER_AUTH_SESSION_COOKIE"),
			signups_disabled: flag("QUILL_SERVER_AUTH_SIGNUPS_DISABLED"),
			session_ttl_hours: parse("QUILL_SERVER_AUTH_SESSION_TTL_HOURS")?,
		},
		logging: LoggingConfigLayer {
			level: var("QUILL_SERVER_LOG_LEVEL"),
			format,
		},
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn defaults_resolve_without_any_source() {
		let config = ServerConfigLayer::default().finalize();
		assert_eq!(config.socket_addr(), "127.0.0.1:8080");
		assert_eq!(config.database.url, "sqlite:./quill.db");
		assert!(!config.auth.dev_mode);
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn toml_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
			[http]
			port = 9000

			[database]
			url = "sqlite:/tmp/quill-test.db"

			[logging]
			level = "debug"
			format = "json"
			"#
		)
		.unwrap();

		let config = load_config_with_file(file.path()).unwrap();
		assert_eq!(config.http.port, 9000);
		assert_eq!(config.http.host, "127.0.0.1");
		assert_eq!(config.database.url, "sqlite:/tmp/quill-test.db");
		assert_eq!(config.logging.level, "debug");
		assert_eq!(config.logging.format, LogFormat::Json);
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let config = load_config_with_file("/nonexistent/quill/server.toml").unwrap();
		assert_eq!(config.http.port, 8080);
	}

	#[test]
	fn malformed_file_is_a_parse_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "http = \"not a table\"").unwrap();

		let err = load_config_with_file(file.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Parse { .. }));
	}

	#[test]
	fn layers_merge_with_last_writer_wins() {
		let mut base: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			host = "0.0.0.0"
			port = 80
			"#,
		)
		.unwrap();
		let overlay: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			port = 8443
			"#,
		)
		.unwrap();

		base.merge(overlay);
		let config = base.finalize();
		assert_eq!(config.http.host, "0.0.0.0");
		assert_eq!(config.http.port, 8443);
	}
}
