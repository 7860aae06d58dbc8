//! Hierarchical key/value store contracts.
//!
//! # Responsibility
//! - Define the two write operations the registrar consumes.
//! - Keep registry API details inside backend modules.
//!
//! # Invariants
//! - Both writes are idempotent and create missing intermediate keys.
//! - Paths use `\` as the key separator and are relative to a root.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
#[cfg(windows)]
pub mod windows;

pub type StoreResult<T> = Result<T, StoreError>;

/// Top-level namespace of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistryRoot {
    /// `HKEY_CURRENT_USER`.
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`.
    LocalMachine,
}

impl RegistryRoot {
    /// Stable name used in logs and dry-run output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
        }
    }
}

impl Display for RegistryRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WOW64 registry view used when opening keys.
///
/// 32-bit and 64-bit processes see different `Software` subtrees on 64-bit
/// Windows unless a view is forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryView {
    /// Whatever view the current process gets by default.
    Native,
    /// Force the 32-bit view (`KEY_WOW64_32KEY`).
    #[default]
    Registry32,
    /// Force the 64-bit view (`KEY_WOW64_64KEY`).
    Registry64,
}

impl RegistryView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Registry32 => "32",
            Self::Registry64 => "64",
        }
    }

    /// Parses `native|32|64`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" => Some(Self::Native),
            "32" => Some(Self::Registry32),
            "64" => Some(Self::Registry64),
            _ => None,
        }
    }
}

/// One planned write against a store root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    /// Sets the unnamed value of `path`.
    DefaultValue { path: String, value: String },
    /// Sets the value called `name` under `path`.
    NamedValue {
        path: String,
        name: String,
        value: String,
    },
}

impl StoreWrite {
    pub fn path(&self) -> &str {
        match self {
            Self::DefaultValue { path, .. } | Self::NamedValue { path, .. } => path,
        }
    }
}

impl Display for StoreWrite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefaultValue { path, value } => write!(f, "{path} (default) = \"{value}\""),
            Self::NamedValue { path, name, value } => {
                write!(f, "{path} [{name}] = \"{value}\"")
            }
        }
    }
}

/// Store write failures, surfaced to callers unchanged.
#[derive(Debug)]
pub enum StoreError {
    Io {
        root: RegistryRoot,
        path: String,
        source: std::io::Error,
    },
    /// Rejected by `InMemoryStore`; `name` is empty for the default value.
    Injected {
        root: RegistryRoot,
        path: String,
        name: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { root, path, .. } => write!(f, "failed to write `{root}\\{path}`"),
            Self::Injected { root, path, name } if name.is_empty() => {
                write!(f, "write of default value of `{root}\\{path}` was rejected")
            }
            Self::Injected { root, path, name } => {
                write!(f, "write of `{name}` under `{root}\\{path}` was rejected")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Injected { .. } => None,
        }
    }
}

/// Write-only view of a hierarchical key/value store.
pub trait KeyValueStore {
    fn write_default_value(&self, root: RegistryRoot, path: &str, value: &str)
        -> StoreResult<()>;

    fn write_named_value(
        &self,
        root: RegistryRoot,
        path: &str,
        name: &str,
        value: &str,
    ) -> StoreResult<()>;

    /// Executes one planned write.
    fn apply(&self, root: RegistryRoot, write: &StoreWrite) -> StoreResult<()> {
        match write {
            StoreWrite::DefaultValue { path, value } => {
                self.write_default_value(root, path, value)
            }
            StoreWrite::NamedValue { path, name, value } => {
                self.write_named_value(root, path, name, value)
            }
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn write_default_value(
        &self,
        root: RegistryRoot,
        path: &str,
        value: &str,
    ) -> StoreResult<()> {
        (**self).write_default_value(root, path, value)
    }

    fn write_named_value(
        &self,
        root: RegistryRoot,
        path: &str,
        name: &str,
        value: &str,
    ) -> StoreResult<()> {
        (**self).write_named_value(root, path, name, value)
    }
}
