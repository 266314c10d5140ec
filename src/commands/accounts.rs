// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::services::accounts;
use crate::session::Session;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
            let ccy = sub.get_one::<String>("currency").map(|s| s.as_str());
            let acct = accounts::create(conn, session.user_id(), name, balance, ccy)?;
            println!(
                "Added account '{}' (id {}, {} {})",
                acct.name, acct.id, acct.balance, acct.currency
            );
        }
        Some(("list", sub)) => {
            let data = accounts::list(conn, session.user_id())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.name.clone(),
                            a.currency.clone(),
                            format!("{:.2}", a.balance),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Currency", "Balance"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let acct = session.account(conn, id)?;
            accounts::delete(conn, acct.id)?;
            println!("Removed account '{}'", acct.name);
        }
        _ => {}
    }
    Ok(())
}
