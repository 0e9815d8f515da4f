//! # duality-cli
//!
//! Thin command-line driver for the Duality kernel (`duality-core`).
//!
//! All argument parsing and dispatch logic lives in [`cli::run_cli`]; the
//! binary (`src/main.rs`) only forwards its exit code. There is no surface
//! parser behind this crate — checking and evaluating raw source text is
//! limited to the handful of worked programs the kernel's specification
//! names verbatim (see [`programs`]) until a translator exists upstream.

pub mod cli;
pub mod error;
pub mod programs;

pub use cli::run_cli;
pub use error::CliError;
