//! Core logic for registering file extension associations.
//! This crate owns the mapping from association fields to registry writes.

pub mod config;
pub mod logging;
pub mod model;
pub mod privilege;
pub mod registrar;
pub mod store;

pub use config::{
    is_well_known_perceived_type, well_known_perceived_types, AssociationManifest, ManifestError,
};
pub use logging::{
    default_log_level, flush_logging, init_logging, logging_status, LoggingError,
};
pub use model::extension::{ExtensionError, FileExtension};
pub use privilege::{PrivilegeCheck, ProcessPrivilege, StaticPrivilege};
pub use registrar::{
    ExtensionRegistrar, RegistrarError, RegistrarResult, CONTENT_TYPE_VALUE_NAME,
    PERCEIVED_TYPE_VALUE_NAME,
};
pub use store::memory::{InMemoryStore, RecordedWrite};
#[cfg(windows)]
pub use store::windows::WinRegistryStore;
pub use store::{KeyValueStore, RegistryRoot, RegistryView, StoreError, StoreResult, StoreWrite};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
