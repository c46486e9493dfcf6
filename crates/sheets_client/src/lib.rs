//! Client side of the spreadsheet service.
//!
//! [`operations::Operations`] is the entry point used by the server. It asks a
//! [`provider::ClientProvider`] for a [`spreadsheet::SpreadsheetClient`] and
//! makes one call with it.
pub mod client;
pub mod credentials;
pub mod errors;
pub mod google;
pub mod memory;
pub mod operations;
pub mod provider;
pub mod spreadsheet;
pub mod types;

#[cfg(test)]
mod testutil;
