// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Storage format for `transaction_date`, matching SQLite's `datetime('now')`.
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub opening_balance: Decimal,
    pub balance: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(LedgerError::Validation(format!(
                "Unknown category type '{}', expected income|expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: CategoryKind,
}

/// What a new transaction moves and where. Each variant carries exactly the
/// references its kind may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income { to: i64, category: Option<i64> },
    Expense { from: i64, category: Option<i64> },
    Transfer { from: i64, to: i64 },
}

impl TransactionKind {
    pub fn tag(&self) -> KindTag {
        match self {
            TransactionKind::Income { .. } => KindTag::Income,
            TransactionKind::Expense { .. } => KindTag::Expense,
            TransactionKind::Transfer { .. } => KindTag::Transfer,
        }
    }
}

/// Discriminant of a transaction, as stored in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindTag {
    Income,
    Expense,
    Transfer,
}

impl KindTag {
    pub fn as_str(self) -> &'static str {
        match self {
            KindTag::Income => "income",
            KindTag::Expense => "expense",
            KindTag::Transfer => "transfer",
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindTag {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(KindTag::Income),
            "expense" => Ok(KindTag::Expense),
            "transfer" => Ok(KindTag::Transfer),
            other => Err(LedgerError::Validation(format!(
                "Unknown transaction type '{}', expected income|expense|transfer",
                other
            ))),
        }
    }
}

/// A persisted transaction's references. Account and category deletes null
/// their foreign keys, so every reference may have gone missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredKind {
    Income {
        to: Option<i64>,
        category: Option<i64>,
    },
    Expense {
        from: Option<i64>,
        category: Option<i64>,
    },
    Transfer {
        from: Option<i64>,
        to: Option<i64>,
    },
}

impl StoredKind {
    pub fn from_columns(
        tag: KindTag,
        category: Option<i64>,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Self {
        match tag {
            KindTag::Income => StoredKind::Income { to, category },
            KindTag::Expense => StoredKind::Expense { from, category },
            KindTag::Transfer => StoredKind::Transfer { from, to },
        }
    }

    pub fn tag(&self) -> KindTag {
        match self {
            StoredKind::Income { .. } => KindTag::Income,
            StoredKind::Expense { .. } => KindTag::Expense,
            StoredKind::Transfer { .. } => KindTag::Transfer,
        }
    }

    pub fn category(&self) -> Option<i64> {
        match *self {
            StoredKind::Income { category, .. } | StoredKind::Expense { category, .. } => category,
            StoredKind::Transfer { .. } => None,
        }
    }

    pub fn from_account(&self) -> Option<i64> {
        match *self {
            StoredKind::Expense { from, .. } | StoredKind::Transfer { from, .. } => from,
            StoredKind::Income { .. } => None,
        }
    }

    pub fn to_account(&self) -> Option<i64> {
        match *self {
            StoredKind::Income { to, .. } | StoredKind::Transfer { to, .. } => to,
            StoredKind::Expense { .. } => None,
        }
    }

    /// Signed balance effect of `amount` on each referenced account that
    /// still exists.
    pub fn contributions(&self, amount: Decimal) -> Vec<(i64, Decimal)> {
        match *self {
            StoredKind::Income { to, .. } => to.map(|a| (a, amount)).into_iter().collect(),
            StoredKind::Expense { from, .. } => from.map(|a| (a, -amount)).into_iter().collect(),
            StoredKind::Transfer { from, to } => from
                .map(|a| (a, -amount))
                .into_iter()
                .chain(to.map(|a| (a, amount)))
                .collect(),
        }
    }
}

impl From<TransactionKind> for StoredKind {
    fn from(k: TransactionKind) -> Self {
        match k {
            TransactionKind::Income { to, category } => StoredKind::Income {
                to: Some(to),
                category,
            },
            TransactionKind::Expense { from, category } => StoredKind::Expense {
                from: Some(from),
                category,
            },
            TransactionKind::Transfer { from, to } => StoredKind::Transfer {
                from: Some(from),
                to: Some(to),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub kind: StoredKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub occurred_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn transfer_contributes_to_both_sides() {
        let kind = StoredKind::Transfer {
            from: Some(1),
            to: Some(2),
        };
        assert_eq!(
            kind.contributions(Decimal::new(40, 0)),
            vec![(1, Decimal::new(-40, 0)), (2, Decimal::new(40, 0))]
        );
    }

    #[test]
    fn orphaned_references_contribute_nothing() {
        let kind = StoredKind::Expense {
            from: None,
            category: Some(3),
        };
        assert!(kind.contributions(Decimal::ONE).is_empty());
        let half = StoredKind::Transfer {
            from: None,
            to: Some(9),
        };
        assert_eq!(half.contributions(Decimal::TEN), vec![(9, Decimal::TEN)]);
    }

    #[test]
    fn kind_tags_parse_case_insensitively() {
        assert_eq!(" Transfer ".parse::<KindTag>().unwrap(), KindTag::Transfer);
        assert_eq!("EXPENSE".parse::<CategoryKind>().unwrap(), CategoryKind::Expense);
        assert!("refund".parse::<KindTag>().is_err());
    }
}
