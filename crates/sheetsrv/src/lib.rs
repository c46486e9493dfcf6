//! HTTP server exposing spreadsheet operations as REST endpoints.
pub mod args;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod server;
