//! File extension value type.
//!
//! # Invariants
//! - The stored string is exactly the caller input (no trimming).
//! - The stored string is not blank and starts with `.`.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Dot-prefixed file extension, e.g. `.txt`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileExtension(String);

impl FileExtension {
    /// Validates and wraps one extension string.
    ///
    /// # Errors
    /// - `ExtensionError::Empty` when `value` is empty or whitespace-only.
    /// - `ExtensionError::MissingDotPrefix` when `value` does not start with `.`.
    pub fn parse(value: impl Into<String>) -> Result<Self, ExtensionError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ExtensionError::Empty);
        }
        if !value.starts_with('.') {
            return Err(ExtensionError::MissingDotPrefix(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileExtension {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extension validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    Empty,
    MissingDotPrefix(String),
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "file extension must not be empty"),
            Self::MissingDotPrefix(value) => write!(
                f,
                "{value} is not a valid file extension; it must start with \".\""
            ),
        }
    }
}

impl Error for ExtensionError {}
