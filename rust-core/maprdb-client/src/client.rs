// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Session state, authentication, and the HTTP transport layer.
//!
//! [`MapRDbClient`] owns the gateway base URL, the `reqwest` client and the
//! bearer token obtained from [`MapRDbClient::authenticate`]. Table, document
//! and query operations are defined as `impl MapRDbClient` blocks in their
//! own modules and all funnel through [`MapRDbClient::send`].

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{parse_base_url, ClientConfig};
use crate::error::{MapRDbError, Result};
use crate::table::TableAction;
use crate::types::Token;

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// What a request was for; decides which error a non-2xx status becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    /// Token exchange.
    Auth,
    /// Table create or drop.
    Table(TableAction),
    /// Point read of one document; 404 means the document is absent.
    Lookup,
    /// Filtered query over a table.
    Query,
    /// Insert, replace, update or delete.
    Write,
}

impl OperationKind {
    fn into_error(self, status: u16, body: String) -> MapRDbError {
        match self {
            OperationKind::Auth => MapRDbError::Auth { status, body },
            OperationKind::Table(action) => MapRDbError::TableOp {
                action,
                status,
                body,
            },
            OperationKind::Lookup if status == 404 => MapRDbError::NotFound { status, body },
            OperationKind::Lookup | OperationKind::Query => MapRDbError::Read { status, body },
            OperationKind::Write => MapRDbError::Write { status, body },
        }
    }
}

/// Status and fully-read body of a successful response.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

// ---------------------------------------------------------------------------
// MapRDbClient
// ---------------------------------------------------------------------------

/// A session against one MapR-DB REST gateway.
///
/// # Examples
///
/// ```rust,no_run
/// use maprdb_client::client::MapRDbClient;
///
/// # #[tokio::main]
/// # async fn main() -> maprdb_client::error::Result<()> {
/// let mut client = MapRDbClient::new("http://localhost:8085")?;
/// client.authenticate("mapr", "mapr").await?;
/// let user: maprdb_client::types::User =
///     client.find_by_id("/apps/employee", "user003").await?;
/// println!("{}", user.first_name);
/// # Ok(())
/// # }
/// ```
pub struct MapRDbClient {
    /// Parsed base URL of the gateway (e.g. `http://localhost:8085`).
    base_url: Url,
    /// Underlying `reqwest` client.
    http: reqwest::Client,
    /// Bearer token, present once `authenticate` succeeded.
    token: Option<Token>,
    /// Per-request timeout, if any.
    timeout: Option<Duration>,
}

impl MapRDbClient {
    // -- Constructors -------------------------------------------------------

    /// Create an unauthenticated client pointing at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::Validation`] if `base_url` cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    /// Create an unauthenticated client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Self::build(&config.server, config.timeout)
    }

    /// Create a client that reuses an already issued bearer token.
    pub fn with_token(base_url: &str, token: Token) -> Result<Self> {
        let mut client = Self::build(base_url, None)?;
        client.token = Some(token);
        Ok(client)
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url = parse_base_url(base_url)?;
        base_url.set_query(None);
        base_url.set_fragment(None);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(MapRDbError::Network)?;

        Ok(Self {
            base_url,
            http,
            token: None,
            timeout,
        })
    }

    // -- Accessors ----------------------------------------------------------

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The current bearer token, if authenticated.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    // -- Authentication -----------------------------------------------------

    /// Exchange HTTP Basic credentials for a bearer token.
    ///
    /// On success the token is stored in the session and also returned. Any
    /// previously held token is discarded first, so a failed call leaves the
    /// session unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`MapRDbError::Auth`] on a non-2xx status or when the gateway
    /// answers with an empty token.
    #[instrument(skip(self, password), fields(server = %self.base_url))]
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<Token> {
        self.token = None;

        let url = self.endpoint(&["auth", "v2", "token"])?;
        debug!(method = %Method::POST, %url, "sending request");
        let request = self
            .http
            .request(Method::POST, url)
            .basic_auth(username, Some(password));
        let response = self.dispatch(request, OperationKind::Auth).await?;

        let token: Token = decode(&response.body)?;
        if token.is_empty() {
            warn!("token endpoint returned an empty token");
            return Err(MapRDbError::Auth {
                status: response.status,
                body: response.body,
            });
        }

        info!(user = username, "authenticated");
        self.token = Some(token.clone());
        Ok(token)
    }

    // -- URL building -------------------------------------------------------

    /// Append `segments` to the base URL path, percent-encoding each one as a
    /// single path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                MapRDbError::Validation(format!("Base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/api/v2/table/{table}`
    pub(crate) fn table_url(&self, table: &str) -> Result<Url> {
        check_segment("Table name", table)?;
        self.endpoint(&["api", "v2", "table", table])
    }

    /// `/api/v2/table/{table}/document/{id}`
    pub(crate) fn document_url(&self, table: &str, id: &str) -> Result<Url> {
        check_segment("Table name", table)?;
        check_segment("Document id", id)?;
        self.endpoint(&["api", "v2", "table", table, "document", id])
    }

    // -- Transport ----------------------------------------------------------

    /// Send one bearer-authenticated request and return the full body.
    ///
    /// `body`, when present, is serialized as JSON. Fails with
    /// [`MapRDbError::Unauthenticated`] without touching the network if the
    /// session holds no token.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        kind: OperationKind,
    ) -> Result<String> {
        let token = self.token.as_ref().ok_or(MapRDbError::Unauthenticated)?;

        debug!(%method, %url, ?kind, "sending request");
        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(MapRDbError::Serialization)?;
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        let response = self.dispatch(request, kind).await?;
        Ok(response.body)
    }

    /// Execute a request, read the whole body, and classify the status.
    async fn dispatch(&self, request: RequestBuilder, kind: OperationKind) -> Result<RawResponse> {
        let response = request.send().await.map_err(MapRDbError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(MapRDbError::Network)?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.is_success() {
            Ok(RawResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            warn!(status = status.as_u16(), ?kind, "request failed");
            Err(kind.into_error(status.as_u16(), body))
        }
    }
}

/// Deserialize a JSON response body.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(MapRDbError::Serialization)
}

/// Reject names that cannot be addressed as one URL path segment.
fn check_segment(what: &str, value: &str) -> Result<()> {
    match value {
        "" => Err(MapRDbError::Validation(format!("{what} must not be empty"))),
        "." | ".." => Err(MapRDbError::Validation(format!(
            "{what} '{value}' cannot be used as a path segment"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn client() -> MapRDbClient {
        MapRDbClient::new("http://localhost:8085").unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.base_url().as_str(), "http://localhost:8085/");
        assert!(!client.is_authenticated());
        assert!(client.timeout().is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            MapRDbClient::new("localhost:8085"),
            Err(MapRDbError::Validation(_))
        ));
    }

    #[test]
    fn test_with_token_is_authenticated() {
        let client = MapRDbClient::with_token("http://localhost:8085", Token::new("t")).unwrap();
        assert!(client.is_authenticated());
        assert_eq!(client.token().unwrap().as_str(), "t");
    }

    #[test]
    fn test_from_config_carries_timeout() {
        let config = ClientConfig {
            timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let client = MapRDbClient::from_config(&config).unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_auth_endpoint() {
        let url = client().endpoint(&["auth", "v2", "token"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8085/auth/v2/token");
    }

    #[test]
    fn test_table_path_is_escaped_as_one_segment() {
        let url = client().table_url("/apps/employee").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8085/api/v2/table/%2Fapps%2Femployee");
    }

    #[test]
    fn test_document_id_is_escaped_like_table() {
        let url = client().document_url("/apps/employee", "a/b c").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8085/api/v2/table/%2Fapps%2Femployee/document/a%2Fb%20c"
        );
    }

    #[test]
    fn test_base_path_prefix_preserved() {
        for base in ["http://gw:8085/maprdb", "http://gw:8085/maprdb/"] {
            let client = MapRDbClient::new(base).unwrap();
            let url = client.document_url("t", "user001").unwrap();
            assert_eq!(url.as_str(), "http://gw:8085/maprdb/api/v2/table/t/document/user001");
        }
    }

    #[test]
    fn test_unaddressable_segments_rejected() {
        let client = client();
        for id in ["", ".", ".."] {
            assert!(matches!(
                client.document_url("t", id),
                Err(MapRDbError::Validation(_))
            ));
        }
        assert!(matches!(client.table_url(""), Err(MapRDbError::Validation(_))));
    }

    #[test]
    fn test_error_classification() {
        let body = || "oops".to_string();
        assert!(matches!(
            OperationKind::Lookup.into_error(404, body()),
            MapRDbError::NotFound { status: 404, .. }
        ));
        assert!(matches!(
            OperationKind::Lookup.into_error(500, body()),
            MapRDbError::Read { status: 500, .. }
        ));
        assert!(matches!(
            OperationKind::Query.into_error(404, body()),
            MapRDbError::Read { status: 404, .. }
        ));
        assert!(matches!(
            OperationKind::Write.into_error(401, body()),
            MapRDbError::Write { status: 401, .. }
        ));
        assert!(matches!(
            OperationKind::Auth.into_error(401, body()),
            MapRDbError::Auth { status: 401, .. }
        ));
        assert!(matches!(
            OperationKind::Table(TableAction::Create).into_error(409, body()),
            MapRDbError::TableOp {
                action: TableAction::Create,
                status: 409,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_send_without_token_fails_locally() {
        let client = client();
        let url = client.table_url("t").unwrap();
        let result = client
            .send::<()>(Method::GET, url, None, OperationKind::Query)
            .await;
        assert!(matches!(result, Err(MapRDbError::Unauthenticated)));
    }

    proptest! {
        #[test]
        fn test_ids_always_map_to_one_segment(
            table in "[a-zA-Z0-9/_ ?#.-]{1,16}",
            id in "[a-zA-Z0-9/_ ?#.-]{1,16}"
        ) {
            prop_assume!(table != "." && table != "..");
            prop_assume!(id != "." && id != "..");

            let url = client().document_url(&table, &id).unwrap();
            let segments: Vec<&str> = url.path_segments().unwrap().collect();
            prop_assert_eq!(segments.len(), 6);
            prop_assert_eq!(segments[4], "document");
            prop_assert!(url.query().is_none());
            prop_assert!(url.fragment().is_none());
        }
    }
}
