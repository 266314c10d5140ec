// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::reports::{self, CategoryTotal, UNCATEGORIZED};
use pennywise::db;
use pennywise::ledger::{Ledger, Posting};
use pennywise::models::{CategoryKind, KindTag, User};
use pennywise::services::{accounts, categories};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(m: u32, dd: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, m, dd)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn setup() -> (Connection, User) {
    let mut conn = db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users(username, password_hash) VALUES ('alice', 'x')",
        [],
    )
    .unwrap();
    let user = User {
        id: conn.last_insert_rowid(),
        username: "alice".into(),
    };
    let main = accounts::create(&conn, user.id, "Main", d("100"), Some("USD")).unwrap();
    let spare = accounts::create(&conn, user.id, "Spare", Decimal::ZERO, Some("USD")).unwrap();
    let salary = categories::create(&conn, user.id, "Salary", CategoryKind::Income).unwrap();
    let food = categories::create(&conn, user.id, "Food", CategoryKind::Expense).unwrap();
    let fun = categories::create(&conn, user.id, "Fun", CategoryKind::Expense).unwrap();

    let mut ledger = Ledger::new(&mut conn);
    ledger
        .record_income(&user, main.id, Some(salary.id), Posting::new(d("1000")).on(day(3, 1)))
        .unwrap();
    ledger
        .record_expense(&user, main.id, Some(food.id), Posting::new(d("45.50")).on(day(3, 2)))
        .unwrap();
    ledger
        .record_expense(&user, main.id, Some(food.id), Posting::new(d("20")).on(day(3, 9)))
        .unwrap();
    ledger
        .record_expense(&user, main.id, Some(fun.id), Posting::new(d("80")).on(day(3, 15)))
        .unwrap();
    ledger
        .record_expense(&user, main.id, None, Posting::new(d("5")).on(day(3, 31)))
        .unwrap();
    ledger
        .record_transfer(&user, main.id, spare.id, Posting::new(d("200")).on(day(3, 20)))
        .unwrap();
    // Outside the month.
    ledger
        .record_expense(&user, main.id, Some(fun.id), Posting::new(d("999")).on(day(4, 1)))
        .unwrap();
    drop(ledger);
    (conn, user)
}

#[test]
fn monthly_summary_splits_by_kind() {
    let (conn, user) = setup();
    let s = reports::monthly_summary(&conn, user.id, 2025, 3).unwrap();
    assert_eq!(s.income, d("1000"));
    assert_eq!(s.expense, d("150.50"));
    assert_eq!(s.transfer, d("200"));
    assert_eq!(s.net, d("849.50"));

    let empty = reports::monthly_summary(&conn, user.id, 2025, 2).unwrap();
    assert!(empty.income.is_zero() && empty.expense.is_zero());
}

#[test]
fn by_category_groups_and_sorts() {
    let (conn, user) = setup();
    let expenses = reports::by_category(&conn, user.id, CategoryKind::Expense, 2025, 3).unwrap();
    assert_eq!(
        expenses,
        vec![
            CategoryTotal {
                category: "Fun".into(),
                total: d("80")
            },
            CategoryTotal {
                category: "Food".into(),
                total: d("65.50")
            },
            CategoryTotal {
                category: UNCATEGORIZED.into(),
                total: d("5")
            },
        ]
    );

    let income = reports::by_category(&conn, user.id, CategoryKind::Income, 2025, 3).unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].category, "Salary");
}

#[test]
fn dashboard_totals_current_month() {
    let (conn, user) = setup();
    let dash = reports::dashboard(&conn, user.id, NaiveDate::from_ymd_opt(2025, 3, 28).unwrap())
        .unwrap();
    // 100 + 1000 - 45.50 - 20 - 80 - 5 - 999 across both accounts
    assert_eq!(dash.total_balance, d("-49.50"));
    assert_eq!(dash.accounts, 2);
    assert_eq!(dash.month_income, d("1000"));
    assert_eq!(dash.month_expense, d("150.50"));
    let last = dash.last_transaction.unwrap();
    assert_eq!(last.kind.tag(), KindTag::Expense);
    assert_eq!(last.amount, d("999"));
}
