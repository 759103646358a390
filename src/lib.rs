//! Bookly application library
//!
//! The books module plus the composition root shared by the server binary and the CLI.

pub mod bootstrap;
pub mod modules;

pub use modules::*;
