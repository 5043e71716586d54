// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//!
//! maprdb-demo — scripted walkthrough of the MapR-DB JSON REST gateway.
//!
//! Authenticates, then either creates/drops the table (`--create`, `--drop`)
//! or runs the insert, query, update and delete walkthrough. On failure the
//! gateway's response body is printed and the process exits with the HTTP
//! status code (1 for failures without one).
//!
//! Unix only keeps the low 8 bits of an exit status, so the shell sees the
//! HTTP status modulo 256: 401 arrives as 145 and 404 as 148. The full
//! status is always in the printed error line.

mod demo;
mod formatter;

use clap::Parser;
use colored::Colorize;
use maprdb_client::config::{DEFAULT_SERVER, DEFAULT_TABLE, DEFAULT_USERNAME};
use maprdb_client::{ClientConfig, MapRDbError, TableAction};

use demo::RunMode;
use formatter::OutputFormat;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// Demo client for the MapR-DB JSON REST API.
#[derive(Parser, Debug)]
#[command(name = "maprdb-demo", version, about = "MapR-DB REST API demo client")]
struct Cli {
    /// MapR-DB REST API server.
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Username.
    #[arg(long, default_value = DEFAULT_USERNAME)]
    user: String,

    /// Password.
    #[arg(long, default_value = "")]
    password: String,

    /// Table path.
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// OJAI JSON condition used when listing users.
    #[arg(long, default_value = "")]
    condition: String,

    /// Create the table and exit.
    #[arg(long)]
    create: bool,

    /// Drop the table and exit. Takes precedence over --create.
    #[arg(long)]
    drop: bool,

    /// Output format for user listings.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            server: self.server.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            table: self.table.clone(),
            condition: self.condition.clone(),
            timeout: None,
        }
    }

    fn mode(&self) -> RunMode {
        if self.drop {
            RunMode::Table(TableAction::Drop)
        } else if self.create {
            RunMode::Table(TableAction::Create)
        } else {
            RunMode::Walkthrough
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match demo::run(&cli.config(), cli.mode(), cli.format).await {
        Ok(()) => 0,
        Err(err) => {
            report(&err);
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn report(err: &MapRDbError) {
    match (err.status(), err.body()) {
        (Some(status), Some(body)) => {
            eprintln!("{} {status} {body}", "Error".red().bold());
        }
        _ => eprintln!("{} {err}", "Error:".red().bold()),
    }
}
