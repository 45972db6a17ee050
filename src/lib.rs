// LogTriage - lib.rs
//
// Library entry point, exposing all modules for integration testing and for
// callers that want the classification pass without the CLI.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
