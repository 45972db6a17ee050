// LogTriage - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform or app. Never opens files itself; discovery
// reads directory metadata only.

pub mod aggregate;
pub mod classify;
pub mod discovery;
pub mod export;
pub mod literal;
pub mod model;
