// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::TransactionRow;
use crate::services::transactions::{self, TransactionFilter};
use crate::services::{accounts, categories};
use crate::session::Session;
use crate::utils::fmt_timestamp;
use anyhow::{bail, Result};
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, session, sub),
        _ => Ok(()),
    }
}

/// Oldest first, so the file reads as a journal.
fn rows(conn: &Connection, session: &Session) -> Result<Vec<TransactionRow>> {
    let user_id = session.user_id();
    let accts: HashMap<i64, String> = accounts::list(conn, user_id)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let cats: HashMap<i64, String> = categories::list(conn, user_id, None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let lookup = |map: &HashMap<i64, String>, id: Option<i64>| {
        id.and_then(|i| map.get(&i).cloned()).unwrap_or_default()
    };
    let mut txs = transactions::list(conn, user_id, &TransactionFilter::default())?;
    txs.reverse();
    Ok(txs
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: fmt_timestamp(&t.occurred_at),
            kind: t.kind.tag().to_string(),
            amount: t.amount.to_string(),
            from: lookup(&accts, t.kind.from_account()),
            to: lookup(&accts, t.kind.to_account()),
            category: lookup(&cats, t.kind.category()),
            description: t.description.unwrap_or_default(),
        })
        .collect())
}

fn export_transactions(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim().to_string();

    match fmt.as_str() {
        "csv" => {
            let data = rows(conn, session)?;
            let mut wtr = csv::Writer::from_path(&out)?;
            for row in &data {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            let data = rows(conn, session)?;
            std::fs::write(&out, serde_json::to_string_pretty(&data)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
