//! Configuration for the interpreter
//!
//! Language options and resource limits are plain values threaded through the
//! parser, resolver and VM. `Config::load` layers them from defaults, an
//! optional TOML file, `.env` and `EVERYONE_*` environment variables.
//!
//! ```toml
//! # everyone.toml
//! [options]
//! lenient_syntax = true
//! bounded_integers = false
//!
//! [limits]
//! max_visits = 100000
//! timeout_secs = 10
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "everyone.toml";

/// Prefix for environment overrides, e.g. `EVERYONE_OPTIONS__LENIENT_SYNTAX=true`
pub const ENV_PREFIX: &str = "EVERYONE";

/* ===================== Options ===================== */

/// Language options shared by the parser, validator, resolver and VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Uppercase every variable name and reject references that are not uppercase
    pub require_uppercase_variable_names: bool,
    /// Uppercase every label name; also picks the `#GENERAL` return spelling
    pub require_uppercase_label_names: bool,
    /// Drop the guard that reserves the name EVERYONE
    pub allow_unsafe_variable_names: bool,
    /// Accept the permissive spellings of each statement
    pub lenient_syntax: bool,
    /// Allow else-if chains
    pub language_extensions: bool,
    /// Wrap integers at 64 bits instead of growing them without bound
    pub bounded_integers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            require_uppercase_variable_names: false,
            require_uppercase_label_names: false,
            allow_unsafe_variable_names: false,
            lenient_syntax: false,
            language_extensions: false,
            bounded_integers: true,
        }
    }
}

impl Options {
    pub fn lenient() -> Self {
        Self {
            lenient_syntax: true,
            ..Self::default()
        }
    }

    pub fn extended() -> Self {
        Self {
            language_extensions: true,
            ..Self::default()
        }
    }
}

/* ===================== Limits ===================== */

/// Resource ceilings for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Ceiling for each jump site's visit counter, the call stack depth and
    /// the number of prints
    pub max_visits: usize,
    /// Wall-clock budget enforced by the CLI watchdog
    pub timeout_secs: u64,
}

impl Limits {
    pub const DEFAULT_MAX_VISITS: usize = 16_777_216;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_visits: Self::DEFAULT_MAX_VISITS,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/* ===================== Config ===================== */

/// Everything a run needs besides the program itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: Options,
    pub limits: Limits,
}

impl Config {
    /// Load configuration
    ///
    /// Later sources win: defaults, then the TOML file (`path`, or
    /// `everyone.toml` if it exists), then `EVERYONE_*` environment variables.
    /// A `.env` file in the working directory is loaded into the environment
    /// first.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().context("Failed to read configuration")?;
        let config: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}
