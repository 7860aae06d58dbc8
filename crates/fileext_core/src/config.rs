//! Association manifest loading.
//!
//! # Responsibility
//! - Describe one extension association as a JSON document.
//! - Convert a loaded manifest into an `ExtensionRegistrar`.
//!
//! # Invariants
//! - Unknown keys are rejected instead of ignored.
//! - The extension is validated during conversion, not during parsing.

use crate::model::extension::{ExtensionError, FileExtension};
use crate::registrar::ExtensionRegistrar;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const WELL_KNOWN_PERCEIVED_TYPES: &[&str] = &[
    "folder",
    "text",
    "image",
    "audio",
    "video",
    "compressed",
    "document",
    "system",
    "application",
    "gamemedia",
    "contacts",
];

/// Perceived type values documented by the Windows shell.
pub fn well_known_perceived_types() -> &'static [&'static str] {
    WELL_KNOWN_PERCEIVED_TYPES
}

/// Returns whether `value` is a documented perceived type (case-insensitive).
pub fn is_well_known_perceived_type(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    WELL_KNOWN_PERCEIVED_TYPES.contains(&normalized.as_str())
}

/// Declarative description of one association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationManifest {
    pub extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perceived_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_program_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub open_with_program_ids: Vec<String>,
}

impl AssociationManifest {
    pub fn from_json_str(raw: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(raw).map_err(ManifestError::Parse)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Builds a registrar carrying every manifest field.
    pub fn into_registrar(self) -> Result<ExtensionRegistrar, ManifestError> {
        let extension =
            FileExtension::parse(self.extension).map_err(ManifestError::InvalidExtension)?;
        let mut registrar = ExtensionRegistrar::from_extension(extension);
        registrar.content_type = self.content_type;
        registrar.perceived_type = self.perceived_type;
        registrar.default_program_id = self.default_program_id;
        registrar.open_with_program_ids = self.open_with_program_ids;
        Ok(registrar)
    }
}

/// Manifest loading errors.
#[derive(Debug)]
pub enum ManifestError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidExtension(ExtensionError),
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "failed to read manifest `{}`", path.display()),
            Self::Parse(_) => write!(f, "invalid manifest json"),
            Self::InvalidExtension(_) => write!(f, "invalid manifest extension"),
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidExtension(err) => Some(err),
        }
    }
}
