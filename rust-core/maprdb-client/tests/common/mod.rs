// SPDX-License-Identifier: PMPL-1.0-or-later
//! Shared setup for the integration tests: the fake gateway plus a session
//! that is already authenticated and has the test table created.

#![allow(dead_code)]

use maprdb_client::MapRDbClient;

pub use maprdb_fake_gateway::*;

pub async fn connected_client(gateway: &FakeGateway) -> MapRDbClient {
    let mut client = MapRDbClient::new(&gateway.base_url).unwrap();
    client.authenticate(USERNAME, PASSWORD).await.unwrap();
    client.create_table(TABLE).await.unwrap();
    client
}
