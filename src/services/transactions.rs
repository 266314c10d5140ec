// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::models::{KindTag, StoredKind, Transaction};
use crate::utils::{decimal_col, fmt_timestamp, timestamp_col};

pub(crate) const COLUMNS: &str = "id, user_id, type, amount, description, category_id, \
                                   from_account_id, to_account_id, transaction_date";

pub(crate) fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let tag: String = r.get(2)?;
    let tag = tag.parse::<KindTag>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        amount: decimal_col(r, 3)?,
        description: r.get(4)?,
        kind: StoredKind::from_columns(tag, r.get(5)?, r.get(6)?, r.get(7)?),
        occurred_at: timestamp_col(r, 8)?,
    })
}

/// Narrows [`list`]. Dates are inclusive of `since`, exclusive of `until`.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<KindTag>,
    pub category: Option<i64>,
    /// Matches either side of the transaction.
    pub account: Option<i64>,
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub limit: Option<usize>,
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM transactions WHERE id=?1", COLUMNS),
            params![id],
            from_row,
        )
        .optional()?)
}

pub fn get(conn: &Connection, id: i64) -> Result<Transaction> {
    find(conn, id)?.ok_or_else(|| LedgerError::NotFound(format!("transaction {}", id)))
}

/// Newest first.
pub fn list(conn: &Connection, user_id: i64, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE user_id=?", COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

    if let Some(kind) = filter.kind {
        sql.push_str(" AND type=?");
        params_vec.push(Box::new(kind.as_str()));
    }
    if let Some(cat) = filter.category {
        sql.push_str(" AND category_id=?");
        params_vec.push(Box::new(cat));
    }
    if let Some(acct) = filter.account {
        sql.push_str(" AND (from_account_id=? OR to_account_id=?)");
        params_vec.push(Box::new(acct));
        params_vec.push(Box::new(acct));
    }
    if let Some(since) = filter.since {
        sql.push_str(" AND transaction_date>=?");
        params_vec.push(Box::new(fmt_timestamp(&since)));
    }
    if let Some(until) = filter.until {
        sql.push_str(" AND transaction_date<?");
        params_vec.push(Box::new(fmt_timestamp(&until)));
    }
    sql.push_str(" ORDER BY transaction_date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
        from_row,
    )?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
