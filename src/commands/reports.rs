// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::ledger::{checked, sum_amounts};
use crate::models::{CategoryKind, KindTag, Transaction};
use crate::services::transactions::{self, TransactionFilter};
use crate::services::{accounts, categories};
use crate::session::Session;
use crate::utils::{fmt_timestamp, maybe_print_json, month_bounds, parse_month, pretty_table};
use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub const UNCATEGORIZED: &str = "(uncategorized)";

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary_cmd(conn, session, sub)?,
        Some(("dashboard", sub)) => dashboard_cmd(conn, session, sub)?,
        Some(("by-category", sub)) => by_category_cmd(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub transfer: Decimal,
    /// income - expense; transfers move money without changing it.
    pub net: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_balance: Decimal,
    pub accounts: usize,
    pub month_income: Decimal,
    pub month_expense: Decimal,
    pub last_transaction: Option<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

fn month_transactions(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u32,
    kind: Option<KindTag>,
) -> Result<Vec<Transaction>> {
    let (since, until) = month_bounds(year, month)?;
    let filter = TransactionFilter {
        kind,
        since: Some(since),
        until: Some(until),
        ..Default::default()
    };
    Ok(transactions::list(conn, user_id, &filter)?)
}

pub fn monthly_summary(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<MonthlySummary> {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut transfer = Decimal::ZERO;
    for t in month_transactions(conn, user_id, year, month, None)? {
        let bucket = match t.kind.tag() {
            KindTag::Income => &mut income,
            KindTag::Expense => &mut expense,
            KindTag::Transfer => &mut transfer,
        };
        *bucket = checked(bucket.checked_add(t.amount))?;
    }
    Ok(MonthlySummary {
        income,
        expense,
        transfer,
        net: checked(income.checked_sub(expense))?,
    })
}

pub fn dashboard(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Dashboard> {
    let accts = accounts::list(conn, user_id)?;
    let summary = monthly_summary(conn, user_id, today.year(), today.month())?;
    let latest = transactions::list(
        conn,
        user_id,
        &TransactionFilter {
            limit: Some(1),
            ..Default::default()
        },
    )?;
    Ok(Dashboard {
        total_balance: sum_amounts(accts.iter().map(|a| a.balance))?,
        accounts: accts.len(),
        month_income: summary.income,
        month_expense: summary.expense,
        last_transaction: latest.into_iter().next(),
    })
}

/// Largest first. Rows without a surviving category are grouped together.
pub fn by_category(
    conn: &Connection,
    user_id: i64,
    kind: CategoryKind,
    year: i32,
    month: u32,
) -> Result<Vec<CategoryTotal>> {
    let tag = match kind {
        CategoryKind::Income => KindTag::Income,
        CategoryKind::Expense => KindTag::Expense,
    };
    let names: HashMap<i64, String> = categories::list(conn, user_id, Some(kind))?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let mut agg: HashMap<String, Decimal> = HashMap::new();
    for t in month_transactions(conn, user_id, year, month, Some(tag))? {
        let cat = t
            .kind
            .category()
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let total = agg.entry(cat).or_insert(Decimal::ZERO);
        *total = checked(total.checked_add(t.amount))?;
    }
    let mut items: Vec<CategoryTotal> = agg
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    items.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    Ok(items)
}

fn summary_cmd(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let s = monthly_summary(conn, session.user_id(), year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = vec![
            vec!["Income".into(), format!("{:.2}", s.income)],
            vec!["Expense".into(), format!("{:.2}", s.expense)],
            vec!["Transfers".into(), format!("{:.2}", s.transfer)],
            vec!["Net".into(), format!("{:.2}", s.net)],
        ];
        let period = format!("{}-{:02}", year, month);
        println!("{}", pretty_table(&[period.as_str(), "Amount"], rows));
    }
    Ok(())
}

fn dashboard_cmd(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let d = dashboard(conn, session.user_id(), Utc::now().date_naive())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        let last = match &d.last_transaction {
            Some(t) => format!(
                "{} {:.2} on {}",
                t.kind.tag(),
                t.amount,
                fmt_timestamp(&t.occurred_at)
            ),
            None => "-".into(),
        };
        let rows = vec![
            vec!["Total balance".into(), format!("{:.2}", d.total_balance)],
            vec!["Accounts".into(), d.accounts.to_string()],
            vec!["Income this month".into(), format!("{:.2}", d.month_income)],
            vec!["Expense this month".into(), format!("{:.2}", d.month_expense)],
            vec!["Last transaction".into(), last],
        ];
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}

fn by_category_cmd(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let kind = sub.get_one::<String>("kind").unwrap().parse::<CategoryKind>()?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let items = by_category(conn, session.user_id(), kind, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let rows = items
            .iter()
            .map(|c| vec![c.category.clone(), format!("{:.2}", c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Total"], rows));
    }
    Ok(())
}
