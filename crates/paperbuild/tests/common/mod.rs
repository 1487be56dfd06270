//! Shared test utilities for paperbuild integration tests.
//!
//! - `TestHarness` lays out a project in a temp directory and builds documents in it
//! - `ScriptedToolchain` stands in for pdflatex/biber
//! - `ConfigBuilder` creates configurations programmatically

pub mod builders;
pub mod harness;
pub mod toolchain;

pub use builders::*;
pub use harness::TestHarness;
pub use toolchain::ScriptedToolchain;
