// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Filtered queries with OJAI conditions.
//!
//! A condition is a JSON filter in the gateway's query language, for example
//! `{"$eq":{"last_name":"Doe"}}` or `{"$ge":{"age":30}}`. It is passed through
//! opaquely as the `condition` query parameter; an empty condition scans the
//! whole table.

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::client::{decode, MapRDbClient, OperationKind};
use crate::error::Result;
use crate::types::DocumentStream;

impl MapRDbClient {
    /// `/api/v2/table/{table}[?condition=...]`
    pub(crate) fn query_url(&self, table: &str, condition: &str) -> Result<Url> {
        let mut url = self.table_url(table)?;
        if !condition.is_empty() {
            url.query_pairs_mut().append_pair("condition", condition);
        }
        Ok(url)
    }

    /// Return every document of `table` matching `condition`.
    ///
    /// Documents come back in server order.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::Read`](crate::error::MapRDbError::Read) if the
    /// gateway rejects the query, e.g. for a malformed condition.
    #[instrument(skip(self))]
    pub async fn find<T: DeserializeOwned>(&self, table: &str, condition: &str) -> Result<Vec<T>> {
        let url = self.query_url(table, condition)?;
        let body = self
            .send::<()>(Method::GET, url, None, OperationKind::Query)
            .await?;
        let stream: DocumentStream<T> = decode(&body)?;
        debug!(count = stream.documents.len(), "query returned");
        Ok(stream.into_documents())
    }

    /// Return every document of `table`.
    pub async fn find_all<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        self.find(table, "").await
    }
}
