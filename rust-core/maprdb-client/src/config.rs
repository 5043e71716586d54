// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MapRDbError, Result};

/// Default REST gateway address.
pub const DEFAULT_SERVER: &str = "http://localhost:8085";
/// Default MapR user.
pub const DEFAULT_USERNAME: &str = "mapr";
/// Default table path used by the demo.
pub const DEFAULT_TABLE: &str = "/apps/employee";

/// Connection and demo settings, passed explicitly to the client constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST gateway
    pub server: String,
    /// Username for the token exchange
    pub username: String,
    /// Password for the token exchange
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Table path the demo operates on
    pub table: String,
    /// Default OJAI condition for filtered queries (empty = no filter)
    pub condition: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            table: DEFAULT_TABLE.to_string(),
            condition: String::new(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Check that the server URL parses and a table is named.
    ///
    /// Returns the parsed base URL.
    pub fn validate(&self) -> Result<Url> {
        let url = parse_base_url(&self.server)?;
        if self.table.is_empty() {
            return Err(MapRDbError::Validation("Table name must not be empty".into()));
        }
        Ok(url)
    }
}

/// Parse a gateway base URL. Only `http` and `https` are accepted.
pub(crate) fn parse_base_url(server: &str) -> Result<Url> {
    let url = Url::parse(server)
        .map_err(|e| MapRDbError::Validation(format!("Invalid base URL '{server}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(MapRDbError::Validation(format!(
            "Unsupported URL scheme '{other}' in '{server}'"
        ))),
    }
}
