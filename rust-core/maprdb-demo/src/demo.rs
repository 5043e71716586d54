// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//!
//! The scripted demo run: authenticate, then either a single table action or
//! the full insert / query / update / delete walkthrough.
//!
//! Steps run strictly one after another; the first failure stops the run and
//! is handed back to `main`, which decides the exit code.

use colored::Colorize;
use maprdb_client::{ClientConfig, MapRDbClient, Result, TableAction, User};
use tracing::info;

use crate::formatter::{format_user, format_users, OutputFormat};

/// Identifier of the user created, updated and deleted by the walkthrough.
pub const NEW_USER_ID: &str = "user999";
/// Age `NEW_USER_ID` is updated to.
pub const UPDATED_AGE: i64 = 44;

/// What this invocation does after authenticating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Create or drop the configured table, then stop.
    Table(TableAction),
    /// Full document walkthrough.
    Walkthrough,
}

/// The four users bulk-inserted at the start of the walkthrough.
pub fn sample_users() -> Vec<User> {
    vec![
        User::new("user001", "John", "Doe", 28),
        User::new("user002", "Jane", "Doe", 30),
        User::new("user003", "Simon", "Davis", 43),
        User::new("user004", "Paul", "Duran", 37),
    ]
}

/// Authenticate against `config.server` and run `mode`.
pub async fn run(config: &ClientConfig, mode: RunMode, format: OutputFormat) -> Result<()> {
    println!();
    println!("{}", "====  Start Application ====".bright_cyan().bold());
    println!("  {} {}", "Server:".dimmed(), config.server);

    let mut client = MapRDbClient::from_config(config)?;
    client.authenticate(&config.username, &config.password).await?;

    match mode {
        RunMode::Table(action) => {
            step(&format!("Table {action}"));
            client.table_operation(&config.table, action).await?;
            println!("  Table {} {}", config.table.bright_yellow(), past_tense(action));
        }
        RunMode::Walkthrough => {
            walkthrough(&client, config, format).await?;
            println!();
            println!("{}", "====  End of Application ====".bright_cyan().bold());
        }
    }
    Ok(())
}

async fn walkthrough(client: &MapRDbClient, config: &ClientConfig, format: OutputFormat) -> Result<()> {
    let table = config.table.as_str();

    step("Insert or replace sample users");
    let users = sample_users();
    client.insert_or_replace_many(table, &users).await?;
    println!("  {} users inserted/updated", users.len());

    show_user(client, table, "user003", format).await?;
    show_users(client, table, &config.condition, format).await?;

    step("Insert or replace a new user");
    let new_user = User::new(NEW_USER_ID, "Peter", "Parker", 23);
    client.insert_or_replace(table, &new_user).await?;
    show_user(client, table, NEW_USER_ID, format).await?;

    step(&format!("Update age of {NEW_USER_ID} to {UPDATED_AGE}"));
    client.set_field(table, NEW_USER_ID, "age", UPDATED_AGE).await?;
    show_user(client, table, NEW_USER_ID, format).await?;

    step(&format!("Delete {NEW_USER_ID}"));
    client.delete(table, NEW_USER_ID).await?;
    info!(id = NEW_USER_ID, "user deleted");

    show_users(client, table, &config.condition, format).await?;
    Ok(())
}

async fn show_user(client: &MapRDbClient, table: &str, id: &str, format: OutputFormat) -> Result<()> {
    step(&format!("Get user {id}"));
    let user: User = client.find_by_id(table, id).await?;
    println!("{}", format_user(&user, format));
    Ok(())
}

async fn show_users(
    client: &MapRDbClient,
    table: &str,
    condition: &str,
    format: OutputFormat,
) -> Result<()> {
    step("Get multiple users");
    if !condition.is_empty() {
        println!("  {} {condition}", "Condition:".dimmed());
    }
    let users: Vec<User> = client.find(table, condition).await?;
    println!("{}", format_users(&users, format));
    Ok(())
}

fn step(title: &str) {
    println!();
    println!("{}", format!("=== {title}").bright_green().bold());
}

fn past_tense(action: TableAction) -> &'static str {
    match action {
        TableAction::Create => "created",
        TableAction::Drop => "dropped",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maprdb_fake_gateway::{spawn_gateway, FakeGateway, PASSWORD, TABLE};
    use serde_json::json;

    const TABLE_PATH: &str = "/api/v2/table/%2Fapps%2Femployee";

    fn gateway_config(gateway: &FakeGateway) -> ClientConfig {
        ClientConfig {
            server: gateway.base_url.clone(),
            password: PASSWORD.to_string(),
            ..Default::default()
        }
    }

    fn request_lines(gateway: &FakeGateway) -> Vec<String> {
        gateway.requests().iter().map(|r| r.line()).collect()
    }

    #[test]
    fn test_sample_users_have_unique_ids() {
        let users = sample_users();
        let mut ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(!ids.contains(&NEW_USER_ID));
    }

    #[test]
    fn test_past_tense() {
        assert_eq!(past_tense(TableAction::Create), "created");
        assert_eq!(past_tense(TableAction::Drop), "dropped");
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_with_generic_code() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig {
            server: format!("http://{addr}"),
            ..Default::default()
        };
        let err = run(&config, RunMode::Walkthrough, OutputFormat::Table)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_walkthrough_request_sequence() {
        let gateway = spawn_gateway().await;
        let config = gateway_config(&gateway);

        run(&config, RunMode::Table(TableAction::Create), OutputFormat::Table)
            .await
            .unwrap();
        run(&config, RunMode::Walkthrough, OutputFormat::Json)
            .await
            .unwrap();

        let document = format!("{TABLE_PATH}/document/{NEW_USER_ID}");
        let expected = vec![
            "POST /auth/v2/token".to_string(),
            format!("POST {TABLE_PATH}"),
            format!("GET {TABLE_PATH}/document/user003"),
            format!("GET {TABLE_PATH}"),
            format!("POST {TABLE_PATH}"),
            format!("GET {document}"),
            format!("POST {document}"),
            format!("GET {document}"),
            format!("DELETE {document}"),
            format!("GET {TABLE_PATH}"),
        ];
        let lines = request_lines(&gateway);
        assert_eq!(lines[..2], ["POST /auth/v2/token".to_string(), format!("PUT {TABLE_PATH}")]);
        assert_eq!(lines[2..], expected[..]);

        let requests = gateway.requests();
        assert!(requests[3].body.as_ref().unwrap().is_array());
        assert!(requests[6].body.as_ref().unwrap().is_object());
        assert_eq!(requests[5].query, None);
        assert_eq!(requests[11].query, None);
        assert_eq!(
            requests[8].body,
            Some(json!({ "$set": { "age": UPDATED_AGE } }))
        );

        let ids: Vec<String> = gateway
            .documents(TABLE)
            .unwrap()
            .iter()
            .map(|d| d["_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["user001", "user002", "user003", "user004"]);
    }

    #[tokio::test]
    async fn test_drop_run_sends_one_delete() {
        let gateway = spawn_gateway().await;
        let config = gateway_config(&gateway);

        run(&config, RunMode::Table(TableAction::Create), OutputFormat::Table)
            .await
            .unwrap();
        run(&config, RunMode::Table(TableAction::Drop), OutputFormat::Table)
            .await
            .unwrap();

        assert_eq!(
            request_lines(&gateway),
            [
                "POST /auth/v2/token".to_string(),
                format!("PUT {TABLE_PATH}"),
                "POST /auth/v2/token".to_string(),
                format!("DELETE {TABLE_PATH}"),
            ]
        );
        assert!(gateway.documents(TABLE).is_none());
    }

    #[tokio::test]
    async fn test_walkthrough_stops_at_first_failure() {
        let gateway = spawn_gateway().await;

        // Table was never created, so the bulk insert is the last request.
        let err = run(&gateway_config(&gateway), RunMode::Walkthrough, OutputFormat::Table)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            request_lines(&gateway),
            ["POST /auth/v2/token".to_string(), format!("POST {TABLE_PATH}")]
        );
    }
}
