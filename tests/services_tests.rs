// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::db;
use pennywise::error::LedgerError;
use pennywise::ledger::{Ledger, Posting};
use pennywise::models::{CategoryKind, KindTag};
use pennywise::services::categories::DEFAULT_CATEGORIES;
use pennywise::services::transactions::TransactionFilter;
use pennywise::services::{accounts, auth, categories, transactions};
use pennywise::session::Session;
use pennywise::utils::set_default_currency;
use rust_decimal::Decimal;

fn at(y: i32, m: u32, day: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn register_then_login() {
    let conn = db::open_in_memory().unwrap();
    let user = auth::register(&conn, " alice ", "correct horse").unwrap();
    assert_eq!(user.username, "alice");

    let stored: String = conn
        .query_row("SELECT password_hash FROM users WHERE id=?1", [user.id], |r| {
            r.get(0)
        })
        .unwrap();
    assert!(stored.starts_with("$argon2id$"));
    assert!(!stored.contains("correct horse"));

    assert_eq!(auth::login(&conn, "alice", "correct horse").unwrap(), user);
    assert!(matches!(
        auth::login(&conn, "alice", "wrong").unwrap_err(),
        LedgerError::Auth
    ));
    assert!(matches!(
        auth::login(&conn, "nobody", "correct horse").unwrap_err(),
        LedgerError::Auth
    ));
}

#[test]
fn duplicate_and_blank_registrations_fail() {
    let conn = db::open_in_memory().unwrap();
    auth::register(&conn, "alice", "pw").unwrap();
    assert!(matches!(
        auth::register(&conn, "alice", "other").unwrap_err(),
        LedgerError::Duplicate(_)
    ));
    assert!(matches!(
        auth::register(&conn, "  ", "pw").unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(matches!(
        auth::register(&conn, "bob", "").unwrap_err(),
        LedgerError::Validation(_)
    ));
}

#[test]
fn login_seeds_defaults_once_and_resumes() {
    let conn = db::open_in_memory().unwrap();
    auth::register(&conn, "alice", "pw").unwrap();

    let session = Session::login(&conn, "alice", "pw").unwrap();
    let cats = categories::list(&conn, session.user_id(), None).unwrap();
    assert_eq!(cats.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(
        categories::list(&conn, session.user_id(), Some(CategoryKind::Income))
            .unwrap()
            .len(),
        3
    );

    categories::delete(&conn, cats[0].id).unwrap();
    Session::login(&conn, "alice", "pw").unwrap();
    assert_eq!(
        categories::list(&conn, session.user_id(), None).unwrap().len(),
        DEFAULT_CATEGORIES.len() - 1
    );

    let resumed = Session::resume(&conn).unwrap().unwrap();
    assert_eq!(resumed.user, session.user);
    Session::logout(&conn).unwrap();
    assert!(Session::resume(&conn).unwrap().is_none());
}

#[test]
fn category_names_are_unique_per_user_and_kind() {
    let conn = db::open_in_memory().unwrap();
    let alice = auth::register(&conn, "alice", "pw").unwrap();
    let bob = auth::register(&conn, "bob", "pw").unwrap();

    categories::create(&conn, alice.id, "Gifts", CategoryKind::Income).unwrap();
    let err = categories::create(&conn, alice.id, "Gifts", CategoryKind::Income).unwrap_err();
    assert!(err.is_duplicate());

    categories::create(&conn, alice.id, "Gifts", CategoryKind::Expense).unwrap();
    categories::create(&conn, bob.id, "Gifts", CategoryKind::Income).unwrap();
    assert!(matches!(
        categories::create(&conn, alice.id, "   ", CategoryKind::Income).unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(matches!(
        categories::delete(&conn, 999).unwrap_err(),
        LedgerError::NotFound(_)
    ));
}

#[test]
fn accounts_allow_duplicate_names_and_use_default_currency() {
    let conn = db::open_in_memory().unwrap();
    let user = auth::register(&conn, "alice", "pw").unwrap();

    let first = accounts::create(&conn, user.id, "Card", Decimal::ZERO, None).unwrap();
    assert_eq!(first.currency, "RUB");

    set_default_currency(&conn, "eur").unwrap();
    let second = accounts::create(&conn, user.id, "Card", Decimal::new(1050, 2), None).unwrap();
    assert_eq!(second.currency, "EUR");
    assert_eq!(second.opening_balance, Decimal::new(1050, 2));
    assert_eq!(second.balance, second.opening_balance);

    assert_eq!(accounts::list(&conn, user.id).unwrap().len(), 2);
    assert!(matches!(
        accounts::create(&conn, user.id, "Bad", Decimal::ZERO, Some("euro")).unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert_eq!(
        accounts::total_balance(&conn, user.id).unwrap(),
        Decimal::new(1050, 2)
    );
}

#[test]
fn deleting_category_keeps_transactions() {
    let mut conn = db::open_in_memory().unwrap();
    let user = auth::register(&conn, "alice", "pw").unwrap();
    let acc = accounts::create(&conn, user.id, "A", Decimal::ZERO, Some("USD")).unwrap();
    let cat = categories::create(&conn, user.id, "Food", CategoryKind::Expense).unwrap();
    let t = Ledger::new(&mut conn)
        .record_expense(&user, acc.id, Some(cat.id), Posting::new(Decimal::ONE))
        .unwrap();

    categories::delete(&conn, cat.id).unwrap();
    let kept = transactions::get(&conn, t.id).unwrap();
    assert_eq!(kept.kind.category(), None);
    assert_eq!(kept.kind.from_account(), Some(acc.id));
}

#[test]
fn list_filters_by_kind_account_and_date() {
    let mut conn = db::open_in_memory().unwrap();
    let user = auth::register(&conn, "alice", "pw").unwrap();
    let a = accounts::create(&conn, user.id, "A", Decimal::ZERO, Some("USD")).unwrap();
    let b = accounts::create(&conn, user.id, "B", Decimal::ZERO, Some("USD")).unwrap();
    {
        let mut ledger = Ledger::new(&mut conn);
        ledger
            .record_income(&user, a.id, None, Posting::new(Decimal::TEN).on(at(2025, 1, 5)))
            .unwrap();
        ledger
            .record_expense(&user, a.id, None, Posting::new(Decimal::ONE).on(at(2025, 2, 1)))
            .unwrap();
        ledger
            .record_transfer(&user, a.id, b.id, Posting::new(Decimal::TWO).on(at(2025, 2, 20)))
            .unwrap();
    }

    let all = transactions::list(&conn, user.id, &TransactionFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].kind.tag(), KindTag::Transfer);

    let feb = TransactionFilter {
        since: Some(at(2025, 2, 1).date().and_hms_opt(0, 0, 0).unwrap()),
        until: Some(at(2025, 3, 1).date().and_hms_opt(0, 0, 0).unwrap()),
        ..Default::default()
    };
    assert_eq!(transactions::list(&conn, user.id, &feb).unwrap().len(), 2);

    let on_b = TransactionFilter {
        account: Some(b.id),
        ..Default::default()
    };
    assert_eq!(transactions::list(&conn, user.id, &on_b).unwrap().len(), 1);

    let incomes = TransactionFilter {
        kind: Some(KindTag::Income),
        limit: Some(5),
        ..Default::default()
    };
    let rows = transactions::list(&conn, user.id, &incomes).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].occurred_at, at(2025, 1, 5));
}
