// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::ledger::sum_amounts;
use crate::models::Account;
use crate::utils::{decimal_col, get_default_currency, normalize_currency};

const COLUMNS: &str = "id, user_id, name, opening_balance, balance, currency";

fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        opening_balance: decimal_col(r, 3)?,
        balance: decimal_col(r, 4)?,
        currency: r.get(5)?,
    })
}

/// Creates an account whose balance starts at `opening_balance`. Names may
/// repeat within a user. `currency` falls back to the `default_currency`
/// setting.
pub fn create(
    conn: &Connection,
    user_id: i64,
    name: &str,
    opening_balance: Decimal,
    currency: Option<&str>,
) -> Result<Account> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation("Account name must not be empty".into()));
    }
    let ccy = match currency {
        Some(c) => normalize_currency(c)?,
        None => get_default_currency(conn)?,
    };
    conn.execute(
        "INSERT INTO accounts(user_id, name, opening_balance, balance, currency)
         VALUES (?1, ?2, ?3, ?3, ?4)",
        params![user_id, name, opening_balance.to_string(), ccy],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(account_id = id, user_id, "created account");
    get(conn, id)
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts WHERE user_id=?1 ORDER BY name, id",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<Account>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM accounts WHERE id=?1", COLUMNS),
            params![id],
            from_row,
        )
        .optional()?)
}

pub fn get(conn: &Connection, id: i64) -> Result<Account> {
    find(conn, id)?.ok_or_else(|| LedgerError::NotFound(format!("account {}", id)))
}

/// Loads an account only if it belongs to `user_id`. A missing account is
/// treated the same as a foreign one.
pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Account> {
    match find(conn, id)? {
        Some(a) if a.user_id == user_id => Ok(a),
        _ => Err(LedgerError::Validation(format!(
            "account {} does not belong to user {}",
            id, user_id
        ))),
    }
}

/// Removes the account. Transactions keep their rows with the reference
/// nulled; no balances elsewhere are touched.
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::NotFound(format!("account {}", id)));
    }
    tracing::info!(account_id = id, "deleted account");
    Ok(())
}

pub fn total_balance(conn: &Connection, user_id: i64) -> Result<Decimal> {
    sum_amounts(list(conn, user_id)?.iter().map(|a| a.balance))
}
