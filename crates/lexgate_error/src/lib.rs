//! Error types for the lexgate admission-control engine.
//!
//! This crate provides the foundation error types used throughout the lexgate
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use lexgate_error::{ConfigError, LexgateResult};
//!
//! fn load_settings() -> LexgateResult<String> {
//!     Err(ConfigError::new("Missing required field"))?
//! }
//!
//! match load_settings() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod server;

pub use config::ConfigError;
pub use error::{LexgateError, LexgateErrorKind, LexgateResult};
pub use server::{ServerError, ServerErrorKind};
