//! Route handlers for the HTTP API
//!
//! Handlers are organized by domain:
//! - [`system`]: Identity, health, capabilities, OpenAPI
//! - [`media`]: Metadata extraction and search
//! - [`download`]: Streamed download jobs

mod download;
mod media;
mod system;

pub use download::*;
pub use media::*;
pub use system::*;
