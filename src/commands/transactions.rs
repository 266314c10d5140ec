// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::ledger::{Ledger, Posting};
use crate::models::{KindTag, Transaction};
use crate::services::transactions::{self, TransactionFilter};
use crate::services::{accounts, categories};
use crate::session::Session;
use crate::utils::{fmt_timestamp, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use chrono::{Days, NaiveTime};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("income", sub)) => record(conn, session, sub, KindTag::Income)?,
        Some(("expense", sub)) => record(conn, session, sub, KindTag::Expense)?,
        Some(("transfer", sub)) => record(conn, session, sub, KindTag::Transfer)?,
        Some(("edit", sub)) => edit(conn, session, sub)?,
        Some(("rm", sub)) => remove(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn posting_from(sub: &clap::ArgMatches) -> Result<Posting> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let mut posting = Posting::new(amount);
    if let Some(d) = sub.get_one::<String>("description") {
        posting = posting.describe(d.as_str());
    }
    if let Some(raw) = sub.get_one::<String>("date") {
        posting = posting.on(parse_date(raw)?.and_time(NaiveTime::MIN));
    }
    Ok(posting)
}

fn record(
    conn: &mut Connection,
    session: &Session,
    sub: &clap::ArgMatches,
    kind: KindTag,
) -> Result<()> {
    let posting = posting_from(sub)?;
    let category = sub.try_get_one::<i64>("category").ok().flatten().copied();
    let mut ledger = Ledger::new(conn);
    let saved = match kind {
        KindTag::Income => {
            let to = *sub.get_one::<i64>("to").unwrap();
            ledger.record_income(&session.user, to, category, posting)
        }
        KindTag::Expense => {
            let from = *sub.get_one::<i64>("from").unwrap();
            ledger.record_expense(&session.user, from, category, posting)
        }
        KindTag::Transfer => {
            let from = *sub.get_one::<i64>("from").unwrap();
            let to = *sub.get_one::<i64>("to").unwrap();
            ledger.record_transfer(&session.user, from, to, posting)
        }
    }
    .with_context(|| format!("Could not record {}", kind))?;
    println!(
        "Recorded {} #{} of {} on {}",
        kind,
        saved.id,
        saved.amount,
        fmt_timestamp(&saved.occurred_at)
    );
    Ok(())
}

fn edit(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let existing = session.transaction(conn, id)?;
    // Without --description the current one is kept.
    let description = sub
        .get_one::<String>("description")
        .cloned()
        .or(existing.description);
    let edited = Ledger::new(conn)
        .edit_transaction(id, amount, description.as_deref())
        .with_context(|| format!("Could not edit transaction {}", id))?;
    println!("Updated transaction #{} to {}", edited.id, edited.amount);
    Ok(())
}

fn remove(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    session.transaction(conn, id)?;
    let removed = Ledger::new(conn)
        .delete_transaction(id)
        .with_context(|| format!("Could not delete transaction {}", id))?;
    println!(
        "Removed {} #{} of {}",
        removed.kind.tag(),
        removed.id,
        removed.amount
    );
    Ok(())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.from.clone(),
                    r.to.clone(),
                    r.category.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Amount", "From", "To", "Category", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub from: String,
    pub to: String,
    pub category: String,
    pub description: String,
}

pub fn filter_from(sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let mut filter = TransactionFilter::default();
    if let Some(k) = sub.get_one::<String>("kind") {
        filter.kind = Some(k.parse::<KindTag>()?);
    }
    filter.category = sub.get_one::<i64>("category").copied();
    filter.account = sub.get_one::<i64>("account").copied();
    if let Some(s) = sub.get_one::<String>("since") {
        filter.since = Some(parse_date(s)?.and_time(NaiveTime::MIN));
    }
    if let Some(u) = sub.get_one::<String>("until") {
        let day_after = parse_date(u)?
            .checked_add_days(Days::new(1))
            .context("--until is out of range")?;
        filter.until = Some(day_after.and_time(NaiveTime::MIN));
    }
    filter.limit = sub.get_one::<usize>("limit").copied();
    Ok(filter)
}

pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let filter = filter_from(sub)?;
    let txs = transactions::list(conn, session.user_id(), &filter)?;
    let account_names: HashMap<i64, String> = accounts::list(conn, session.user_id())?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let category_names: HashMap<i64, String> = categories::list(conn, session.user_id(), None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let name = |map: &HashMap<i64, String>, id: Option<i64>| {
        id.and_then(|i| map.get(&i).cloned()).unwrap_or_default()
    };
    Ok(txs
        .into_iter()
        .map(|t: Transaction| TransactionRow {
            id: t.id,
            date: fmt_timestamp(&t.occurred_at),
            kind: t.kind.tag().to_string(),
            amount: format!("{:.2}", t.amount),
            from: name(&account_names, t.kind.from_account()),
            to: name(&account_names, t.kind.to_account()),
            category: name(&category_names, t.kind.category()),
            description: t.description.unwrap_or_default(),
        })
        .collect())
}
