//! Composition engine for AI coding-agent configuration documents.
//!
//! A document binds agents and task categories to models, optional model
//! variants, and free-form advanced settings. This crate owns the in-memory
//! edit session between loading a stored document and submitting it back:
//! key registration, lazy JSON validation, batch model replacement, import
//! folding, and final document assembly. The GUI layer on top and the exact
//! persistence backend behind [`ConfigStore`] are out of scope here.

mod advanced;
mod catalog;
mod codec;
mod import;
mod registry;
mod replace;
mod session;
mod storage;
mod types;

pub use catalog::{BuiltinCatalog, CatalogDef, CatalogSection, ModelCatalog, CATALOG_VERSION};
pub use import::ImportFragment;
pub use registry::KeyRegistry;
pub use session::{EditSession, SessionState};
pub use storage::{ConfigStore, JsonFileStore};
pub use types::{
    AgentEntry, BatchReplaceSpec, ComposeError, ConfigDocument, Dimension, ImportSummary,
    ModelBinding, ReplaceOutcome,
};
