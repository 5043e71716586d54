// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Table management: create and drop JSON tables.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::client::{MapRDbClient, OperationKind};
use crate::error::Result;

/// Table-level action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAction {
    /// `PUT /api/v2/table/{table}`
    Create,
    /// `DELETE /api/v2/table/{table}`
    Drop,
}

impl TableAction {
    /// HTTP method the gateway expects for this action.
    pub fn method(self) -> Method {
        match self {
            TableAction::Create => Method::PUT,
            TableAction::Drop => Method::DELETE,
        }
    }
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableAction::Create => write!(f, "create"),
            TableAction::Drop => write!(f, "drop"),
        }
    }
}

impl FromStr for TableAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(TableAction::Create),
            "drop" => Ok(TableAction::Drop),
            other => Err(format!("Unknown table action '{other}'. Valid actions: create, drop")),
        }
    }
}

impl MapRDbClient {
    /// Create or drop `table`.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::TableOp`](crate::error::MapRDbError::TableOp)
    /// when the gateway refuses, e.g. the table already exists on create or is
    /// absent on drop.
    #[instrument(skip(self))]
    pub async fn table_operation(&self, table: &str, action: TableAction) -> Result<()> {
        let url = self.table_url(table)?;
        self.send::<()>(action.method(), url, None, OperationKind::Table(action))
            .await?;
        info!(table, %action, "table operation completed");
        Ok(())
    }

    /// Create a new JSON table at `table`.
    pub async fn create_table(&self, table: &str) -> Result<()> {
        self.table_operation(table, TableAction::Create).await
    }

    /// Drop the table at `table` and all its documents.
    pub async fn drop_table(&self, table: &str) -> Result<()> {
        self.table_operation(table, TableAction::Drop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_methods() {
        assert_eq!(TableAction::Create.method(), Method::PUT);
        assert_eq!(TableAction::Drop.method(), Method::DELETE);
    }

    #[test]
    fn test_action_parse_and_display() {
        assert_eq!("DROP".parse::<TableAction>().unwrap(), TableAction::Drop);
        assert_eq!(TableAction::Create.to_string(), "create");
        assert!("truncate".parse::<TableAction>().is_err());
    }
}
