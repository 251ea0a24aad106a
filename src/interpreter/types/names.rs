//! Validated variable and label names
//!
//! Both are normalized at construction according to the active [`Options`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Options;
use crate::interpreter::errors::{Fault, FaultResult};

/// The aggregate pseudo-variable
pub const EVERYONE: &str = "EVERYONE";

/// Python-style `isupper`: at least one cased character and no lowercase ones
pub fn is_uppercase_name(name: &str) -> bool {
    let mut cased = false;
    for c in name.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/* ===================== Variable names ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarName(String);

impl VarName {
    /// Validate and normalize a variable name
    ///
    /// `what` names the field in error messages ("variable name", "lhs", ...).
    pub fn new(raw: &str, what: &str, options: &Options) -> FaultResult<Self> {
        if raw.is_empty() {
            return Err(Fault::InvalidName(format!("{} cannot be empty", what)));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(Fault::InvalidName(format!("{} cannot have spaces", what)));
        }

        if options.require_uppercase_variable_names {
            return Ok(Self(raw.to_uppercase()));
        }

        if !options.allow_unsafe_variable_names {
            if raw == "everyone" || raw == EVERYONE {
                return Ok(Self::everyone());
            }
            if raw.to_uppercase() == EVERYONE {
                return Err(Fault::InvalidName(format!("Invalid variable name {:?}", raw)));
            }
        }

        Ok(Self(raw.to_string()))
    }

    pub fn everyone() -> Self {
        Self(EVERYONE.to_string())
    }

    pub fn is_everyone(&self) -> bool {
        self.0 == EVERYONE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/* ===================== Label names ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelName(String);

impl LabelName {
    /// Validate a label name and normalize its case
    ///
    /// Shape: hyphen-separated groups of digits and underscores, optionally
    /// followed by a word that starts with a letter and is entirely lowercase
    /// or entirely uppercase (it may itself contain hyphens), e.g. `1`,
    /// `10-2-loop`, `0-MAIN-2`.
    pub fn new(raw: &str, options: &Options) -> FaultResult<Self> {
        if raw.is_empty() {
            return Err(Fault::InvalidName("label name cannot be empty".to_string()));
        }
        if !has_label_shape(raw) {
            return Err(Fault::InvalidName(format!("{:?} is not a valid label name", raw)));
        }

        let normalized = if options.require_uppercase_label_names {
            raw.to_uppercase()
        } else {
            raw.to_lowercase()
        };
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_label_shape(name: &str) -> bool {
    let segments: Vec<&str> = name.split('-').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return false;
    }

    let is_numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit() || c == '_');
    let word_start = segments
        .iter()
        .position(|s| s.starts_with(|c: char| c.is_ascii_alphabetic()));

    let Some(start) = word_start else {
        return segments.iter().all(|s| is_numeric(s));
    };
    if start == 0 || !segments[..start].iter().all(|s| is_numeric(s)) {
        return false;
    }

    let word = &segments[start..];
    let lower = word.iter().all(|s| {
        s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    });
    let upper = word.iter().all(|s| {
        s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    });
    lower || upper
}
