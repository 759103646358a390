//! Kernel primitives shared by every Bookly crate: layered settings, the
//! [`Module`] contract, and the [`ModuleRegistry`] that drives module lifecycle.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
