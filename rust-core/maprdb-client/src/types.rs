// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Wire types for the MapR-DB JSON REST gateway.
//!
//! These mirror the JSON bodies the gateway sends and accepts: the token
//! envelope, the demo `User` record, the `DocumentStream` envelope of a
//! filtered query, and OJAI mutation objects.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Bearer token returned by `/auth/v2/token`.
///
/// The token is opaque and never refreshed by this client. `Debug` output is
/// redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    token: String,
}

impl Token {
    /// Wrap an existing token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw token value, as sent in `Authorization: Bearer <token>`.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token").field("token", &"<redacted>").finish()
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Sample record stored by the demo: one JSON document per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Document identifier (`_id`), unique within the table.
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: i64,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentStream<T>
// ---------------------------------------------------------------------------

/// Envelope returned by a table scan / filtered query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStream<T> {
    /// Matching documents, in the order the server returned them.
    #[serde(rename = "DocumentStream", default = "Vec::new")]
    pub documents: Vec<T>,
}

impl<T> DocumentStream<T> {
    pub fn into_documents(self) -> Vec<T> {
        self.documents
    }
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// OJAI document mutation, serialized as `{"$set": {field: value, ...}}`.
///
/// ```rust
/// use maprdb_client::types::Mutation;
///
/// let mutation = Mutation::new().set("age", 44);
/// assert_eq!(
///     serde_json::to_string(&mutation).unwrap(),
///     r#"{"$set":{"age":44}}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    #[serde(rename = "$set")]
    set: Map<String, Value>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) a `$set` of `field` to `value`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The fields this mutation sets.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.set.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_uses_underscore_id_on_the_wire() {
        let user = User::new("user999", "Peter", "Parker", 23);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({"_id": "user999", "first_name": "Peter", "last_name": "Parker", "age": 23})
        );
    }

    #[test]
    fn test_document_stream_missing_field_is_empty() {
        let stream: DocumentStream<User> = serde_json::from_str("{}").unwrap();
        assert!(stream.documents.is_empty());
    }

    #[test]
    fn test_document_stream_keeps_server_order() {
        let body = r#"{"DocumentStream":[
            {"_id":"user002","first_name":"Jane","last_name":"Doe","age":30},
            {"_id":"user001","first_name":"John","last_name":"Doe","age":28}
        ]}"#;
        let stream: DocumentStream<User> = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = stream.into_documents().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["user002", "user001"]);
    }

    #[test]
    fn test_mutation_multiple_fields() {
        let mutation = Mutation::new().set("age", 44).set("last_name", "Stark");
        assert_eq!(
            serde_json::to_value(&mutation).unwrap(),
            json!({"$set": {"age": 44, "last_name": "Stark"}})
        );
        assert_eq!(mutation.fields().count(), 2);
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("secret-jwt");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret-jwt"));
        assert_eq!(token.as_str(), "secret-jwt");
    }

    #[test]
    fn test_token_decodes_from_gateway_body() {
        let token: Token = serde_json::from_str(r#"{"token":"abc.def.ghi"}"#).unwrap();
        assert_eq!(token.as_str(), "abc.def.ghi");
        assert!(!token.is_empty());
    }
}
