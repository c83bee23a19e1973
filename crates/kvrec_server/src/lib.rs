//! # kvrec Server
//!
//! HTTP query server for kvrec collections.
//!
//! This crate provides:
//! - A single query endpoint that runs named collection operations
//! - Health and statistics endpoints
//! - Error mapping from engine errors to HTTP status codes
//!
//! # Protocol
//!
//! ```text
//! POST /query   {"operation": "createTodo", "args": {"title": "x"}}
//!           ->  200 {"data": {"id": "...", "title": "x", "completed": false}}
//!           ->  400 {"error": {"kind": "validation", "message": "..."}}
//!           ->  404 {"error": {"kind": "not_found", "message": "..."}}
//!           ->  500 {"error": {"kind": "storage", "message": "..."}}
//! GET  /health
//! GET  /stats
//! ```
//!
//! Operation names follow the query/mutation naming of
//! [`kvrec_core::Request::from_operation_name`]. Store calls are blocking
//! and run on tokio's blocking pool.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{build_router, AppState, QueryRequest, QueryResponse};
pub use server::QueryServer;
