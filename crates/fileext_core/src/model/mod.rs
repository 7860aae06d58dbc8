//! Domain model for file-extension associations.
//!
//! # Responsibility
//! - Define validated value types shared by registrar, config and CLI layers.
//!
//! # Invariants
//! - A `FileExtension` is never constructed from blank or undotted input.

pub mod extension;
