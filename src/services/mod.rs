// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read/write facades over the store. Balance-affecting writes live in
//! [`crate::ledger`]; everything here is a single statement or a read.

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod transactions;
