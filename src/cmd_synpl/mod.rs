//! Subcommand modules for the `synpl` binary.

pub mod filter;
pub mod run;
