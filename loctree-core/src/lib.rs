//! Loctree Core - Shared data structures for the loctree analysis service
//!
//! This module defines the data model, error types, and logging setup shared
//! by the statistics engine, the repository fetcher, and the web server.

pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;
