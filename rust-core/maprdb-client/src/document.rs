// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Document operations keyed by `_id`.
//!
//! Writes are insert-or-replace on the server: posting a document whose `_id`
//! already exists replaces it. All methods are generic over the record type,
//! so any `serde` struct with an `_id` field works; the demo uses
//! [`User`](crate::types::User).

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::client::{decode, MapRDbClient, OperationKind};
use crate::error::{MapRDbError, Result};
use crate::types::Mutation;

impl MapRDbClient {
    /// Insert or replace a batch of documents in one request.
    ///
    /// The batch is sent as a JSON array to `/api/v2/table/{table}`.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::Write`] on a non-2xx status.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn insert_or_replace_many<T: Serialize>(
        &self,
        table: &str,
        documents: &[T],
    ) -> Result<()> {
        let url = self.table_url(table)?;
        self.send(Method::POST, url, Some(documents), OperationKind::Write)
            .await?;
        debug!("documents inserted or replaced");
        Ok(())
    }

    /// Insert or replace a single document.
    ///
    /// Unlike [`insert_or_replace_many`](Self::insert_or_replace_many), the
    /// body is one JSON object rather than an array.
    #[instrument(skip(self, document))]
    pub async fn insert_or_replace<T: Serialize>(&self, table: &str, document: &T) -> Result<()> {
        let url = self.table_url(table)?;
        self.send(Method::POST, url, Some(document), OperationKind::Write)
            .await?;
        Ok(())
    }

    /// Fetch one document by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::NotFound`] if no document has this `_id`, and
    /// [`MapRDbError::Read`] for any other failure status.
    #[instrument(skip(self))]
    pub async fn find_by_id<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<T> {
        let url = self.document_url(table, id)?;
        let body = self
            .send::<()>(Method::GET, url, None, OperationKind::Lookup)
            .await?;
        decode(&body)
    }

    /// Apply an OJAI mutation to the document `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::Validation`] for an empty mutation, and
    /// [`MapRDbError::Write`] when the gateway rejects the update.
    #[instrument(skip(self, mutation))]
    pub async fn update(&self, table: &str, id: &str, mutation: &Mutation) -> Result<()> {
        if mutation.is_empty() {
            return Err(MapRDbError::Validation(
                "Mutation must set at least one field".into(),
            ));
        }
        let url = self.document_url(table, id)?;
        self.send(Method::POST, url, Some(mutation), OperationKind::Write)
            .await?;
        Ok(())
    }

    /// Set a single field of document `id` to `value`.
    pub async fn set_field(
        &self,
        table: &str,
        id: &str,
        field: &str,
        value: impl Into<serde_json::Value>,
    ) -> Result<()> {
        let mutation = Mutation::new().set(field, value);
        self.update(table, id, &mutation).await
    }

    /// Delete the document `id`.
    #[instrument(skip(self))]
    pub async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let url = self.document_url(table, id)?;
        self.send::<()>(Method::DELETE, url, None, OperationKind::Write)
            .await?;
        Ok(())
    }
}
