//! HTTP API module.
//!
//! Server, HTML pages, multipart form reading and JSON types for the intake page.

pub mod form;
pub mod pages;
pub mod server;
pub mod types;

pub use server::{create_router, start_server, AppState, SESSION_COOKIE};
pub use types::*;
