//! File extension association registrar.
//!
//! # Responsibility
//! - Hold the semantic fields of one extension association.
//! - Translate them into an ordered sequence of store writes under
//!   `Software\Classes`.
//! - Gate machine-wide writes behind an administrator check.
//!
//! # Invariants
//! - The default value write always happens, with `""` when no default
//!   program id is set.
//! - Blank content/perceived types are never written.
//! - Open-with ids are written in caller order.
//! - A failed write stops the sequence; earlier writes are not rolled back.
//! - Non-administrators get `PermissionDenied` before any write.

use crate::model::extension::{ExtensionError, FileExtension};
use crate::privilege::PrivilegeCheck;
use crate::store::{KeyValueStore, RegistryRoot, StoreError, StoreWrite};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const CLASSES_ROOT_PATH: &str = "Software\\Classes";
const OPEN_WITH_PROGIDS_KEY: &str = "OpenWithProgids";
/// Value name for the MIME type.
pub const CONTENT_TYPE_VALUE_NAME: &str = "Content Type";
/// Value name for the perceived type.
pub const PERCEIVED_TYPE_VALUE_NAME: &str = "PerceivedType";

pub type RegistrarResult<T> = Result<T, RegistrarError>;

/// Registrar errors.
#[derive(Debug)]
pub enum RegistrarError {
    InvalidArgument(ExtensionError),
    PermissionDenied,
    Store(StoreError),
}

impl Display for RegistrarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(_) => write!(f, "invalid argument"),
            Self::PermissionDenied => write!(
                f,
                "registering for all users requires an elevated administrator process"
            ),
            Self::Store(_) => write!(f, "store write failed"),
        }
    }
}

impl Error for RegistrarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::PermissionDenied => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ExtensionError> for RegistrarError {
    fn from(value: ExtensionError) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<StoreError> for RegistrarError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Association of one file extension with its handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRegistrar {
    extension: FileExtension,
    /// MIME type, e.g. `text/plain`.
    pub content_type: Option<String>,
    /// Coarse category, e.g. `text`.
    pub perceived_type: Option<String>,
    /// Program id opened by default.
    pub default_program_id: Option<String>,
    /// Other program ids offered in "Open with".
    pub open_with_program_ids: Vec<String>,
}

impl ExtensionRegistrar {
    /// Creates a registrar for `extension` with every other field unset.
    ///
    /// # Errors
    /// - `RegistrarError::InvalidArgument` when `extension` is blank or not
    ///   dot-prefixed.
    pub fn new(extension: impl Into<String>) -> RegistrarResult<Self> {
        Ok(Self::from_extension(FileExtension::parse(extension)?))
    }

    pub fn from_extension(extension: FileExtension) -> Self {
        Self {
            extension,
            content_type: None,
            perceived_type: None,
            default_program_id: None,
            open_with_program_ids: Vec::new(),
        }
    }

    pub fn extension(&self) -> &FileExtension {
        &self.extension
    }

    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn with_perceived_type(mut self, value: impl Into<String>) -> Self {
        self.perceived_type = Some(value.into());
        self
    }

    pub fn with_default_program_id(mut self, value: impl Into<String>) -> Self {
        self.default_program_id = Some(value.into());
        self
    }

    pub fn with_open_with_program_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.open_with_program_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one id to the open-with list.
    pub fn add_open_with_program_id(&mut self, id: impl Into<String>) {
        self.open_with_program_ids.push(id.into());
    }

    /// `Software\Classes\<extension>`.
    pub fn extension_key_path(&self) -> String {
        format!("{CLASSES_ROOT_PATH}\\{}", self.extension)
    }

    /// `Software\Classes\<extension>\OpenWithProgids`.
    pub fn open_with_key_path(&self) -> String {
        format!("{}\\{OPEN_WITH_PROGIDS_KEY}", self.extension_key_path())
    }

    /// Returns the writes an apply call performs, in execution order.
    pub fn write_plan(&self) -> Vec<StoreWrite> {
        let key_path = self.extension_key_path();
        let mut plan = vec![StoreWrite::DefaultValue {
            path: key_path.clone(),
            value: self.default_program_id.clone().unwrap_or_default(),
        }];

        if let Some(content_type) = non_blank(&self.content_type) {
            plan.push(StoreWrite::NamedValue {
                path: key_path.clone(),
                name: CONTENT_TYPE_VALUE_NAME.to_string(),
                value: content_type.to_string(),
            });
        }

        if let Some(perceived_type) = non_blank(&self.perceived_type) {
            plan.push(StoreWrite::NamedValue {
                path: key_path,
                name: PERCEIVED_TYPE_VALUE_NAME.to_string(),
                value: perceived_type.to_string(),
            });
        }

        if !self.open_with_program_ids.is_empty() {
            let open_with_path = self.open_with_key_path();
            for program_id in &self.open_with_program_ids {
                // The value name carries the registration; its data stays empty.
                plan.push(StoreWrite::NamedValue {
                    path: open_with_path.clone(),
                    name: program_id.clone(),
                    value: String::new(),
                });
            }
        }

        plan
    }

    /// Writes the association under `HKEY_CURRENT_USER`.
    ///
    /// # Errors
    /// - `RegistrarError::Store` with the first failing write; earlier writes
    ///   remain in the store.
    pub fn apply_for_current_user(&self, store: &impl KeyValueStore) -> RegistrarResult<()> {
        self.apply_to_root(store, RegistryRoot::CurrentUser)
    }

    /// Writes the association under `HKEY_LOCAL_MACHINE`.
    ///
    /// `privilege` is queried exactly once, before any write.
    ///
    /// # Errors
    /// - `RegistrarError::PermissionDenied` when the caller is not an
    ///   administrator. Nothing is written in that case.
    /// - `RegistrarError::Store` with the first failing write.
    pub fn apply_for_all_users(
        &self,
        store: &impl KeyValueStore,
        privilege: &impl PrivilegeCheck,
    ) -> RegistrarResult<()> {
        if !privilege.is_administrator() {
            warn!(
                "event=association_apply module=registrar status=denied scope={} extension={} error_code=permission_denied",
                RegistryRoot::LocalMachine,
                self.extension
            );
            return Err(RegistrarError::PermissionDenied);
        }
        self.apply_to_root(store, RegistryRoot::LocalMachine)
    }

    fn apply_to_root(
        &self,
        store: &impl KeyValueStore,
        root: RegistryRoot,
    ) -> RegistrarResult<()> {
        let started_at = Instant::now();
        let plan = self.write_plan();
        info!(
            "event=association_apply module=registrar status=start scope={} extension={} writes={}",
            root,
            self.extension,
            plan.len()
        );

        for (index, write) in plan.iter().enumerate() {
            if let Err(err) = store.apply(root, write) {
                error!(
                    "event=association_apply module=registrar status=error scope={} extension={} completed_writes={} duration_ms={} error_code=store_write_failed error={}",
                    root,
                    self.extension,
                    index,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        }

        info!(
            "event=association_apply module=registrar status=ok scope={} extension={} writes={} duration_ms={}",
            root,
            self.extension,
            plan.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|raw| !raw.trim().is_empty())
}
