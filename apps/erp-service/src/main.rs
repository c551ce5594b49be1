//! # Quire Operations CLI
//!
//! Prints the read-only reports and storage health as JSON for back-office
//! scripts.
//!
//! ## Usage
//! ```bash
//! quire-service outstanding [BRANCH_ID]
//! quire-service daybook [YYYY-MM-DD]        # default: today (UTC)
//! quire-service low-stock [WAREHOUSE_ID]
//! quire-service health                      # exits non-zero when unhealthy
//! ```
//!
//! Configuration comes from `QUIRE_*` variables (see `config`). Reports run
//! as the system actor (user 0, ADMIN).

use std::env;

use chrono::{NaiveDate, Utc};
use tracing::info;

use quire_core::{Actor, Role};
use quire_service::commands::{inventory, report};
use quire_service::config::ErpConfig;
use quire_service::{telemetry, Erp};

const SYSTEM_USER_ID: i64 = 0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ErpConfig::load()?;
    telemetry::init_tracing(&config.log_filter);

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");
    let argument = args.get(1).map(String::as_str);

    if matches!(command, "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let erp = Erp::open(config).await?;
    let actor = Actor::new(SYSTEM_USER_ID, Role::Admin);
    info!(command, "Running command");

    let output = match command {
        "outstanding" => {
            let branch_id = argument.map(str::parse::<i64>).transpose()?;
            serde_json::to_string_pretty(&report::outstanding_report(&erp, &actor, branch_id).await?)?
        }
        "daybook" => {
            let date = match argument {
                Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")?,
                None => Utc::now().date_naive(),
            };
            serde_json::to_string_pretty(&report::daybook(&erp, &actor, date).await?)?
        }
        "low-stock" => {
            let warehouse_id = argument.map(str::parse::<i64>).transpose()?;
            serde_json::to_string_pretty(
                &inventory::low_stock_alerts(&erp, &actor, warehouse_id).await?,
            )?
        }
        "health" => {
            let health = erp.health().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
            erp.shutdown().await;
            if !health.is_healthy() {
                return Err("database is not healthy".into());
            }
            return Ok(());
        }
        other => {
            erp.shutdown().await;
            print_help();
            return Err(format!("unknown command '{other}'").into());
        }
    };

    println!("{output}");
    erp.shutdown().await;
    Ok(())
}

fn print_help() {
    println!("Quire ERP operations");
    println!();
    println!("Usage: quire-service <COMMAND> [ARG]");
    println!();
    println!("Commands:");
    println!("  outstanding [BRANCH_ID]     Receivables per customer");
    println!("  daybook [YYYY-MM-DD]        Invoices raised on a day (UTC)");
    println!("  low-stock [WAREHOUSE_ID]    Rows at or below their minimum");
    println!("  health                      Database reachability and migrations");
}
