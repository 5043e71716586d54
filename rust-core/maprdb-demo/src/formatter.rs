// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//!
//! Rendering of user records for the demo output.
//!
//! - **Table**: `comfy-table` grid, one row per user.
//! - **JSON**: pretty-printed documents as the gateway stores them.
//! - **CSV**: header plus one line per user (RFC 4180 quoting).

use std::borrow::Cow;

use clap::ValueEnum;
use comfy_table::{Cell, ContentArrangement, Table};
use maprdb_client::User;

/// How user listings are printed. Selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Bordered grid.
    #[default]
    Table,
    /// Pretty-printed documents.
    Json,
    /// Header line plus one record per line.
    Csv,
}

const COLUMNS: [&str; 4] = ["_id", "first_name", "last_name", "age"];

/// Render a result set.
pub fn format_users(users: &[User], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => users_table(users),
        OutputFormat::Json => {
            serde_json::to_string_pretty(users).unwrap_or_else(|e| format!("<{e}>"))
        }
        OutputFormat::Csv => users_csv(users),
    }
}

/// Render one user as a Field | Value table, or as JSON / CSV.
pub fn format_user(user: &User, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![Cell::new("Field"), Cell::new("Value")]);
            for (column, value) in COLUMNS.iter().zip(row(user)) {
                table.add_row(vec![Cell::new(column), Cell::new(value)]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(user).unwrap_or_else(|e| format!("<{e}>"))
        }
        OutputFormat::Csv => users_csv(std::slice::from_ref(user)),
    }
}

fn row(user: &User) -> [String; 4] {
    [
        user.id.clone(),
        user.first_name.clone(),
        user.last_name.clone(),
        user.age.to_string(),
    ]
}

fn users_table(users: &[User]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(COLUMNS.iter().map(Cell::new));
    for user in users {
        table.add_row(row(user).into_iter().map(Cell::new));
    }

    let count = users.len();
    format!("{table}\n({count} user{})", if count == 1 { "" } else { "s" })
}

fn users_csv(users: &[User]) -> String {
    let mut output = COLUMNS.join(",");
    output.push('\n');
    for user in users {
        let fields = row(user);
        let line: Vec<Cow<'_, str>> = fields.iter().map(|f| csv_field(f)).collect();
        output.push_str(&line.join(","));
        output.push('\n');
    }
    output
}

/// A field that holds a delimiter, quote or line break is wrapped in quotes
/// with inner quotes doubled. Anything else is borrowed as is.
fn csv_field(field: &str) -> Cow<'_, str> {
    if !field.contains([',', '"', '\n', '\r']) {
        return Cow::Borrowed(field);
    }
    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push('"');
    for ch in field.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<User> {
        vec![
            User::new("user001", "John", "Doe", 28),
            User::new("user002", "Jane", "Doe", 30),
        ]
    }

    #[test]
    fn test_table_lists_every_user() {
        let out = format_users(&users(), OutputFormat::Table);
        assert!(out.contains("user001"));
        assert!(out.contains("Jane"));
        assert!(out.contains("(2 users)"));
    }

    #[test]
    fn test_empty_result_set() {
        let out = format_users(&[], OutputFormat::Table);
        assert!(out.contains("(0 users)"));
        assert_eq!(format_users(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let out = format_users(&users(), OutputFormat::Json);
        assert!(out.contains("\"_id\": \"user001\""));
    }

    #[test]
    fn test_csv_rows() {
        let out = format_users(&users(), OutputFormat::Csv);
        assert_eq!(
            out,
            "_id,first_name,last_name,age\nuser001,John,Doe,28\nuser002,Jane,Doe,30\n"
        );
    }

    #[test]
    fn test_csv_quoting() {
        assert!(matches!(csv_field("Parker"), Cow::Borrowed("Parker")));
        assert_eq!(csv_field("Parker, Jr."), "\"Parker, Jr.\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\r\nbreak"), "\"line\r\nbreak\"");

        let out = format_user(&User::new("user005", "Mary Jane", "Watson, MJ", 22), OutputFormat::Csv);
        assert!(out.ends_with("user005,Mary Jane,\"Watson, MJ\",22\n"));
    }

    #[test]
    fn test_single_user_table() {
        let out = format_user(&User::new("user999", "Peter", "Parker", 44), OutputFormat::Table);
        assert!(out.contains("Field"));
        assert!(out.contains("Parker"));
        assert!(out.contains("44"));
    }
}
