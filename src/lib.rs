//! # tmdb-rest - authenticated REST client for TMDB
//!
//! A blocking Rust client for The Movie Database REST API. It takes care of
//! obtaining a session token, renewing it shortly before it expires, and
//! turning every HTTP or JSON failure into a single error type.
//!
//! ## Features
//!
//! - Generic GET/POST calls returning the decoded JSON payload
//! - Session token renewal two minutes ahead of expiry, safe to share across threads
//! - Authenticated raw downloads for images and other files
//! - `tracing` instrumentation that keeps the API key out of logs by default
//!
//! ## Basic Usage
//!
//! ```no_run
//! use tmdb_rest::{Param, TmdbApi};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Movie {
//!     id: u64,
//!     title: String,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = TmdbApi::new("my-api-key")?;
//!
//!     let response = api.get("movie/550", &Param::new())?;
//!     let movie: Movie = response.apply()?;
//!
//!     println!("Movie: {} ({})", movie.title, movie.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use tmdb_rest::{Config, TmdbApi};
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_safe_logging(false)
//!     .with_timeout(Duration::from_secs(10));
//!
//! let api = TmdbApi::with_config("my-api-key", config)?;
//! # Ok::<(), tmdb_rest::TmdbError>(())
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod logging;
pub mod response;
pub mod rest;
mod token;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use api::TmdbApi;
pub use client::{Config, SUPPORTED_API_VERSIONS};
pub use error::{Result, TmdbError};
pub use response::{Param, Response};
pub use rest::{RestContext, DEFAULT_TOP};
pub use token::RENEWAL_MARGIN_SECS;

// Re-export serde_json for convenience
pub use serde_json::json;
