// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # MapR-DB REST client
//!
//! A small async client for the MapR-DB JSON REST gateway: token-based
//! authentication, table create/drop, insert-or-replace, point reads, OJAI
//! filtered queries, `$set` updates and deletes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use maprdb_client::client::MapRDbClient;
//! use maprdb_client::types::User;
//!
//! #[tokio::main]
//! async fn main() -> maprdb_client::error::Result<()> {
//!     let mut client = MapRDbClient::new("http://localhost:8085")?;
//!     client.authenticate("mapr", "mapr").await?;
//!     let users: Vec<User> = client.find("/apps/employee", r#"{"$eq":{"last_name":"Doe"}}"#).await?;
//!     println!("{} users", users.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] — Session state, authentication, and HTTP transport.
//! - [`config`] — Explicit connection settings.
//! - [`table`] — Table create and drop.
//! - [`document`] — Insert-or-replace, read, update and delete by `_id`.
//! - [`query`] — OJAI condition queries.
//! - [`types`] — Wire types (token, user record, document stream, mutation).
//! - [`error`] — Error types and the crate-level `Result` alias.

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod table;
pub mod types;

pub use client::MapRDbClient;
pub use config::ClientConfig;
pub use error::{MapRDbError, Result};
pub use table::TableAction;
pub use types::{Mutation, Token, User};
