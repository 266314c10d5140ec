// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::session::Session;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Balances that disagree with opening balance + transaction history
    for d in ledger::verify(conn, session.user_id())? {
        rows.push(vec![
            "balance_drift".into(),
            format!(
                "#{} {}: stored {:.2}, expected {:.2}",
                d.account_id, d.name, d.actual, d.expected
            ),
        ]);
    }

    // 2) Transactions whose accounts were deleted out from under them
    let mut stmt = conn.prepare(
        "SELECT id, type FROM transactions
         WHERE user_id=?1 AND (
            (type='income' AND to_account_id IS NULL) OR
            (type='expense' AND from_account_id IS NULL) OR
            (type='transfer' AND (from_account_id IS NULL OR to_account_id IS NULL)))
         ORDER BY id",
    )?;
    let mut cur = stmt.query([session.user_id()])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let kind: String = r.get(1)?;
        rows.push(vec![
            "orphaned_transaction".into(),
            format!("#{} ({}) references a deleted account", id, kind),
        ]);
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
