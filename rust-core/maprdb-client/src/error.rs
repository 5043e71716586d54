// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the MapR-DB REST client.
//!
//! Every fallible operation returns [`Result<T>`], an alias for
//! `std::result::Result<T, MapRDbError>`. HTTP failures are classified by the
//! kind of operation that produced them (authentication, table management,
//! reads, writes) and always keep the status code and the raw response body,
//! so a caller can print exactly what the gateway answered.

use thiserror::Error;

use crate::table::TableAction;

/// Process exit code used for failures that carry no HTTP status.
pub const GENERIC_FAILURE_EXIT_CODE: i32 = 1;

/// Error type for MapR-DB REST operations.
#[derive(Error, Debug)]
pub enum MapRDbError {
    /// The token endpoint rejected the credentials or returned no token.
    #[error("Authentication failed (HTTP {status}): {body}")]
    Auth {
        /// HTTP status code returned by `/auth/v2/token`.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A table could not be created or dropped (already exists, absent, ...).
    #[error("Table {action} failed (HTTP {status}): {body}")]
    TableOp {
        /// The attempted action.
        action: TableAction,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The requested document does not exist.
    #[error("Document not found (HTTP {status}): {body}")]
    NotFound {
        /// HTTP status code (404).
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A point read or filtered query failed (e.g. malformed condition).
    #[error("Read failed (HTTP {status}): {body}")]
    Read {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// An insert, replace, update or delete failed.
    #[error("Write failed (HTTP {status}): {body}")]
    Write {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A bearer-authenticated operation was called before `authenticate`.
    #[error("Session is not authenticated; call authenticate first")]
    Unauthenticated,

    /// Transport failure from `reqwest` (DNS, connection refused, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON encoding of a request or decoding of a response failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client-side validation failed before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl MapRDbError {
    /// HTTP status code of the failing response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            MapRDbError::Auth { status, .. }
            | MapRDbError::TableOp { status, .. }
            | MapRDbError::NotFound { status, .. }
            | MapRDbError::Read { status, .. }
            | MapRDbError::Write { status, .. } => Some(*status),
            MapRDbError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body of the failing response, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            MapRDbError::Auth { body, .. }
            | MapRDbError::TableOp { body, .. }
            | MapRDbError::NotFound { body, .. }
            | MapRDbError::Read { body, .. }
            | MapRDbError::Write { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether this is a missing-document error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MapRDbError::NotFound { .. })
    }

    /// Exit code a fail-fast driver should terminate with: the HTTP status
    /// when there is one, [`GENERIC_FAILURE_EXIT_CODE`] otherwise.
    pub fn exit_code(&self) -> i32 {
        self.status()
            .map(i32::from)
            .unwrap_or(GENERIC_FAILURE_EXIT_CODE)
    }
}

/// Crate-level result alias using [`MapRDbError`].
pub type Result<T> = std::result::Result<T, MapRDbError>;
