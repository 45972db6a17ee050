// LogTriage - app/mod.rs
//
// Application layer: wires discovery, classification, and output writing
// into a single run. Depends on core, platform, and util.

pub mod run;
