// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Account records and their credit bookkeeping.
//!
//! The cached `credits` balance and the `credit_usage` ledger are written
//! together by every mutator; `credits` always equals the negated sum of
//! `credits_used` over the ledger.

use crate::base::{AccountId, ReferralCode};
use crate::entry::{ConversionJob, ConversionRecord, LedgerEntry};
use crate::error::LedgerError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A registered user and its credit/usage state.
///
/// Created once at signup, mutated only through the ledger engine and
/// written back via [`AccountStore::replace`](crate::AccountStore::replace),
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Unique across the store, case-sensitive as stored.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Cached balance; kept consistent with `credit_usage` by every mutator.
    pub credits: i64,
    pub referral_code: ReferralCode,
    pub join_date: DateTime<Utc>,
    /// Date the daily login bonus was last claimed.
    pub last_daily_bonus: Option<NaiveDate>,
    /// Completed conversions, newest first.
    pub convert_history: Vec<ConversionRecord>,
    /// Credit grants and debits, newest first.
    pub credit_usage: Vec<LedgerEntry>,
}

impl Account {
    /// Credits granted to every new account.
    pub const SIGNUP_GRANT: i64 = 25;
    /// Ledger label of the signup grant.
    pub const WELCOME_LABEL: &'static str = "Welcome Bonus";

    pub(crate) fn new(name: &str, email: &str, password_hash: &str) -> Self {
        let now = Utc::now();
        let mut account = Self {
            id: AccountId::new(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            credits: 0,
            referral_code: ReferralCode::generate(),
            join_date: now,
            last_daily_bonus: None,
            convert_history: Vec::new(),
            credit_usage: Vec::new(),
        };
        account.grant(Self::WELCOME_LABEL, Self::SIGNUP_GRANT, now.date_naive());
        account
    }

    /// Balance implied by the ledger alone.
    pub fn ledger_balance(&self) -> i64 {
        -self
            .credit_usage
            .iter()
            .map(|entry| entry.credits_used)
            .sum::<i64>()
    }

    /// Total credits spent on conversions.
    pub fn credits_spent(&self) -> i64 {
        self.credit_usage
            .iter()
            .filter(|entry| entry.credits_used > 0)
            .map(|entry| entry.credits_used)
            .sum()
    }

    /// Total credits granted by signup, referrals, and bonuses.
    pub fn credits_earned(&self) -> i64 {
        -self
            .credit_usage
            .iter()
            .filter(|entry| entry.credits_used < 0)
            .map(|entry| entry.credits_used)
            .sum::<i64>()
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.credits >= 0,
            "Invariant violated: credit balance went negative: {}",
            self.credits
        );
        debug_assert_eq!(
            self.credits,
            self.ledger_balance(),
            "Invariant violated: cached balance diverged from ledger"
        );
    }

    /// Grants `amount` credits with an `Earned` ledger entry.
    pub(crate) fn grant(&mut self, label: &str, amount: i64, date: NaiveDate) {
        self.credit_usage
            .insert(0, LedgerEntry::earned(label, amount, date));
        self.credits += amount;
        self.assert_invariants();
    }

    /// Applies a conversion batch: all-or-nothing.
    ///
    /// If the batch costs more than the available balance, fails with
    /// [`LedgerError::InsufficientCredits`] and leaves the account
    /// untouched. Otherwise prepends one conversion record and one ledger
    /// entry per file (batch in input order, newest block first) and debits
    /// the total cost.
    pub(crate) fn apply_conversion(
        &mut self,
        jobs: &[ConversionJob],
        date: NaiveDate,
    ) -> Result<(), LedgerError> {
        let total_cost: i64 = jobs.iter().map(ConversionJob::cost).sum();
        if self.credits < total_cost {
            return Err(LedgerError::InsufficientCredits);
        }

        self.convert_history.splice(
            0..0,
            jobs.iter()
                .map(|job| ConversionRecord::completed(&job.file_name, job.pages, date)),
        );
        self.credit_usage.splice(
            0..0,
            jobs.iter()
                .map(|job| LedgerEntry::conversion(&job.file_name, job.pages, date)),
        );
        self.credits -= total_cost;
        self.assert_invariants();
        Ok(())
    }
}
