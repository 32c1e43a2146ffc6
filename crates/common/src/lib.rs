//! Common utilities and shared types for neighborly.
//!
//! This crate provides foundational components used across all neighborly crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: UUID-based identifiers via [`IdGenerator`]
//! - **Clock**: Injectable time source via [`Clock`], for TTL and rate-limit windows
//! - **Sanitizer**: HTML stripping for user-submitted text
//!
//! # Example
//!
//! ```no_run
//! use neighborly_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod sanitize;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use sanitize::{sanitize_text, truncate_chars};
