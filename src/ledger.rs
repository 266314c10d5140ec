// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance-affecting operations.
//!
//! Every operation runs inside one SQLite transaction: the balance updates and
//! the transaction-row write commit together or not at all. For every account
//! that still exists, `balance == opening_balance + sum(contributions)`, where
//! income adds to its destination, expense subtracts from its source and a
//! transfer does both. [`verify`] recomputes that sum and reports drift.

use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::models::{CategoryKind, StoredKind, Transaction, TransactionKind, User};
use crate::services::{accounts, categories, transactions};
use crate::utils::{decimal_col, fmt_timestamp};

/// Points inside an operation where [`Ledger::interrupt_at`] can abort it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Account balances are updated, the transaction row is not yet touched.
    BalancesApplied,
    /// The transaction row is inserted, updated or deleted; commit is next.
    RowWritten,
}

/// Amount and free-form details of a new transaction.
#[derive(Debug, Clone)]
pub struct Posting {
    pub amount: Decimal,
    pub description: Option<String>,
    /// Defaults to the current UTC time.
    pub occurred_at: Option<NaiveDateTime>,
}

impl Posting {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            description: None,
            occurred_at: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = clean_description(&description.into());
        self
    }

    pub fn on(mut self, at: NaiveDateTime) -> Self {
        self.occurred_at = Some(at);
        self
    }
}

pub struct Ledger<'c> {
    conn: &'c mut Connection,
    interrupt: Option<Step>,
}

impl<'c> Ledger<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self {
            conn,
            interrupt: None,
        }
    }

    /// Makes every subsequent operation fail with [`LedgerError::Integrity`]
    /// once it reaches `step`. Used to exercise rollback.
    pub fn interrupt_at(mut self, step: Step) -> Self {
        self.interrupt = Some(step);
        self
    }

    pub fn record_income(
        &mut self,
        user: &User,
        to_account: i64,
        category: Option<i64>,
        posting: Posting,
    ) -> Result<Transaction> {
        self.record(
            user,
            TransactionKind::Income {
                to: to_account,
                category,
            },
            posting,
        )
    }

    pub fn record_expense(
        &mut self,
        user: &User,
        from_account: i64,
        category: Option<i64>,
        posting: Posting,
    ) -> Result<Transaction> {
        self.record(
            user,
            TransactionKind::Expense {
                from: from_account,
                category,
            },
            posting,
        )
    }

    pub fn record_transfer(
        &mut self,
        user: &User,
        from_account: i64,
        to_account: i64,
        posting: Posting,
    ) -> Result<Transaction> {
        if from_account == to_account {
            return Err(LedgerError::Validation(
                "Cannot transfer from an account to itself".into(),
            ));
        }
        self.record(
            user,
            TransactionKind::Transfer {
                from: from_account,
                to: to_account,
            },
            posting,
        )
    }

    fn record(&mut self, user: &User, kind: TransactionKind, posting: Posting) -> Result<Transaction> {
        ensure_positive(posting.amount)?;
        let interrupt = self.interrupt;
        let saved = self.atomically("record", |tx| {
            match kind {
                TransactionKind::Income { to, category } => {
                    accounts::get_owned(tx, user.id, to)?;
                    check_category(tx, user, category, CategoryKind::Income)?;
                }
                TransactionKind::Expense { from, category } => {
                    accounts::get_owned(tx, user.id, from)?;
                    check_category(tx, user, category, CategoryKind::Expense)?;
                }
                TransactionKind::Transfer { from, to } => {
                    accounts::get_owned(tx, user.id, from)?;
                    accounts::get_owned(tx, user.id, to)?;
                }
            }

            let stored = StoredKind::from(kind);
            for (account, delta) in stored.contributions(posting.amount) {
                apply_delta(tx, account, delta)?;
            }
            checkpoint(interrupt, Step::BalancesApplied)?;

            let at = posting
                .occurred_at
                .unwrap_or_else(|| Utc::now().naive_utc());
            tx.execute(
                "INSERT INTO transactions(user_id, type, amount, description, category_id,
                                          from_account_id, to_account_id, transaction_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user.id,
                    stored.tag().as_str(),
                    posting.amount.to_string(),
                    posting.description,
                    stored.category(),
                    stored.from_account(),
                    stored.to_account(),
                    fmt_timestamp(&at),
                ],
            )?;
            let id = tx.last_insert_rowid();
            checkpoint(interrupt, Step::RowWritten)?;
            transactions::get(tx, id)
        })?;
        tracing::info!(
            transaction_id = saved.id,
            kind = %saved.kind.tag(),
            amount = %saved.amount,
            "recorded transaction"
        );
        Ok(saved)
    }

    /// Replaces the amount and description, moving balances by the
    /// difference on whichever referenced accounts still exist.
    pub fn edit_transaction(
        &mut self,
        id: i64,
        new_amount: Decimal,
        new_description: Option<&str>,
    ) -> Result<Transaction> {
        ensure_positive(new_amount)?;
        let interrupt = self.interrupt;
        let description = new_description.and_then(clean_description);
        let edited = self.atomically("edit", |tx| {
            let old = transactions::get(tx, id)?;
            let delta = checked(new_amount.checked_sub(old.amount))?;
            for (account, d) in old.kind.contributions(delta) {
                apply_delta(tx, account, d)?;
            }
            checkpoint(interrupt, Step::BalancesApplied)?;

            tx.execute(
                "UPDATE transactions SET amount=?1, description=?2 WHERE id=?3",
                params![new_amount.to_string(), description, id],
            )?;
            checkpoint(interrupt, Step::RowWritten)?;
            transactions::get(tx, id)
        })?;
        tracing::info!(transaction_id = id, amount = %edited.amount, "edited transaction");
        Ok(edited)
    }

    /// Reverses the transaction's contributions and removes it. Returns the
    /// removed row. A second delete of the same id is [`LedgerError::NotFound`].
    pub fn delete_transaction(&mut self, id: i64) -> Result<Transaction> {
        let interrupt = self.interrupt;
        let removed = self.atomically("delete", |tx| {
            let old = transactions::get(tx, id)?;
            for (account, d) in old.kind.contributions(old.amount) {
                apply_delta(tx, account, -d)?;
            }
            checkpoint(interrupt, Step::BalancesApplied)?;

            tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
            checkpoint(interrupt, Step::RowWritten)?;
            Ok(old)
        })?;
        tracing::info!(transaction_id = id, "deleted transaction");
        Ok(removed)
    }

    fn atomically<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let tx = self.conn.transaction()?;
        match f(&tx) {
            Ok(v) => {
                tx.commit()
                    .map_err(|e| LedgerError::Integrity(format!("{} commit failed: {}", op, e)))?;
                Ok(v)
            }
            Err(err) => {
                if let Err(rb) = tx.rollback() {
                    tracing::error!(op, error = %rb, "rollback failed");
                }
                tracing::warn!(op, error = %err, "rolled back");
                // A store failure part way through is reported as an aborted unit.
                Err(match err {
                    LedgerError::Storage(e) => {
                        LedgerError::Integrity(format!("{} aborted: {}", op, e))
                    }
                    other => other,
                })
            }
        }
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

/// Maps an overflowed checked operation to a validation failure.
pub(crate) fn checked(sum: Option<Decimal>) -> Result<Decimal> {
    sum.ok_or_else(|| LedgerError::Validation("amount out of range".into()))
}

/// Overflow-safe sum.
pub(crate) fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, a| checked(acc.checked_add(a)))
}

fn clean_description(raw: &str) -> Option<String> {
    let d = raw.trim();
    if d.is_empty() { None } else { Some(d.to_string()) }
}

fn checkpoint(interrupt: Option<Step>, step: Step) -> Result<()> {
    if interrupt == Some(step) {
        return Err(LedgerError::Integrity(format!("interrupted at {:?}", step)));
    }
    Ok(())
}

fn check_category(
    conn: &Connection,
    user: &User,
    category: Option<i64>,
    expected: CategoryKind,
) -> Result<()> {
    let Some(id) = category else {
        return Ok(());
    };
    match categories::find(conn, id)? {
        Some(c) if c.user_id == user.id && c.kind == expected => Ok(()),
        Some(c) if c.user_id == user.id => Err(LedgerError::Validation(format!(
            "category '{}' is {}, expected {}",
            c.name, c.kind, expected
        ))),
        _ => Err(LedgerError::Validation(format!(
            "category {} does not belong to user {}",
            id, user.id
        ))),
    }
}

fn apply_delta(conn: &Connection, account: i64, delta: Decimal) -> Result<()> {
    let Some(current) = accounts::find(conn, account)?.map(|a| a.balance) else {
        return Err(LedgerError::Integrity(format!(
            "account {} vanished mid-operation",
            account
        )));
    };
    conn.execute(
        "UPDATE accounts SET balance=?1 WHERE id=?2",
        params![checked(current.checked_add(delta))?.to_string(), account],
    )?;
    Ok(())
}

/// An account whose stored balance disagrees with its transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub account_id: i64,
    pub name: String,
    pub expected: Decimal,
    pub actual: Decimal,
}

/// Recomputes every account balance of `user_id` from its opening balance
/// and transaction history. An empty result means the ledger is consistent.
pub fn verify(conn: &Connection, user_id: i64) -> Result<Vec<Drift>> {
    let mut sums: HashMap<i64, Decimal> = HashMap::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions WHERE user_id=?1",
        transactions::COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], transactions::from_row)?;
    for row in rows {
        let t = row?;
        for (account, d) in t.kind.contributions(t.amount) {
            let total = sums.entry(account).or_insert(Decimal::ZERO);
            *total = checked(total.checked_add(d))?;
        }
    }

    let mut drifts = Vec::new();
    let mut accts = conn.prepare(
        "SELECT id, name, opening_balance, balance FROM accounts WHERE user_id=?1 ORDER BY id",
    )?;
    let mut cur = accts.query(params![user_id])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let opening = decimal_col(r, 2)?;
        let actual = decimal_col(r, 3)?;
        let history = sums.get(&id).copied().unwrap_or(Decimal::ZERO);
        let expected = checked(opening.checked_add(history))?;
        if expected != actual {
            drifts.push(Drift {
                account_id: id,
                name: r.get(1)?,
                expected,
                actual,
            });
        }
    }
    if !drifts.is_empty() {
        tracing::warn!(user_id, accounts = drifts.len(), "ledger drift detected");
    }
    Ok(drifts)
}
