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

//! Credit ledger engine.
//!
//! The [`LedgerEngine`] enforces the rule that converting a file costs
//! exactly one credit per page, updating balance and history together.
//!
//! # Conversion Processing
//!
//! - **Conversions**: debit one credit per page, all-or-nothing per batch.
//! - **Referral bonus**: explicit +15 grant to a referrer.
//! - **Daily bonus**: +5 grant, at most once per calendar day.
//!
//! # Exclusivity
//!
//! Only one conversion batch may be in flight at a time. The engine
//! enforces this itself through [`LedgerEngine::begin_conversion`]; a
//! batch that has begun always finishes, applied or failed atomically,
//! before the next may begin.

use crate::account::Account;
use crate::base::AccountId;
use crate::entry::ConversionJob;
use crate::error::LedgerError;
use crate::store::AccountStore;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Proof that the single conversion slot has been acquired.
///
/// Consumed by [`LedgerEngine::apply_conversion`]; the slot is released
/// when the ticket is dropped, whether the batch applied or failed.
#[derive(Debug)]
pub struct ConversionTicket<'a> {
    engine: &'a LedgerEngine,
}

impl Drop for ConversionTicket<'_> {
    fn drop(&mut self) {
        self.engine.conversion_in_flight.store(false, Ordering::Release);
    }
}

/// Credit ledger engine operating on top of an [`AccountStore`].
///
/// # Invariants
///
/// - A conversion batch applies as one unit or not at all.
/// - At most one conversion batch is in flight at a time.
/// - The cached balance and the usage ledger are written together; the
///   engine is the sole writer of both.
#[derive(Debug)]
pub struct LedgerEngine {
    store: Arc<AccountStore>,
    conversion_in_flight: AtomicBool,
}

impl LedgerEngine {
    /// Credits granted per converted referral.
    pub const REFERRAL_BONUS: i64 = 15;
    /// Credits granted by the daily login bonus.
    pub const DAILY_BONUS: i64 = 5;
    /// Ledger label of the referral grant.
    pub const REFERRAL_LABEL: &'static str = "Referral Bonus";
    /// Ledger label of the daily grant.
    pub const DAILY_BONUS_LABEL: &'static str = "Daily Login Bonus";

    pub fn new(store: Arc<AccountStore>) -> Self {
        Self {
            store,
            conversion_in_flight: AtomicBool::new(false),
        }
    }

    /// Acquires the single conversion slot.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ConversionInFlight`] — another batch holds the slot.
    pub fn begin_conversion(&self) -> Result<ConversionTicket<'_>, LedgerError> {
        if self
            .conversion_in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(LedgerError::ConversionInFlight);
        }
        Ok(ConversionTicket { engine: self })
    }

    /// Applies a conversion batch to an account, all-or-nothing.
    ///
    /// Debits `sum(pages)` credits and prepends one conversion record and
    /// one ledger entry per file, then persists via
    /// [`AccountStore::replace`]. No half-applied state is ever visible.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] — no account with this id.
    /// - [`LedgerError::InsufficientCredits`] — the batch costs more than
    ///   the available balance; the account is unchanged.
    /// - [`LedgerError::Storage`] — the updated account could not be saved.
    pub fn apply_conversion(
        &self,
        ticket: ConversionTicket<'_>,
        account_id: AccountId,
        jobs: &[ConversionJob],
    ) -> Result<Account, LedgerError> {
        // Slot stays held until this batch is fully applied or rejected.
        let _ticket = ticket;

        let mut account = self.store.find_by_id(&account_id)?;
        account.apply_conversion(jobs, Utc::now().date_naive())?;
        self.store.replace(account.clone())?;

        info!(
            account = %account.id,
            files = jobs.len(),
            cost = jobs.iter().map(ConversionJob::cost).sum::<i64>(),
            remaining = account.credits,
            "conversion batch applied"
        );
        Ok(account)
    }

    /// Credits the referrer for a converted referral.
    ///
    /// Explicit operation: nothing in the crate triggers it automatically;
    /// the caller decides when a referral counts.
    pub fn grant_referral_bonus(&self, referrer_id: AccountId) -> Result<Account, LedgerError> {
        let mut account = self.store.find_by_id(&referrer_id)?;
        account.grant(
            Self::REFERRAL_LABEL,
            Self::REFERRAL_BONUS,
            Utc::now().date_naive(),
        );
        self.store.replace(account.clone())?;
        info!(account = %account.id, "referral bonus granted");
        Ok(account)
    }

    /// Grants the daily login bonus, at most once per calendar day.
    ///
    /// Returns `Ok(None)` when the bonus was already claimed for `today`.
    pub fn claim_daily_bonus(
        &self,
        account_id: AccountId,
        today: NaiveDate,
    ) -> Result<Option<Account>, LedgerError> {
        let mut account = self.store.find_by_id(&account_id)?;
        if account.last_daily_bonus == Some(today) {
            return Ok(None);
        }
        account.last_daily_bonus = Some(today);
        account.grant(Self::DAILY_BONUS_LABEL, Self::DAILY_BONUS, today);
        self.store.replace(account.clone())?;
        info!(account = %account.id, %today, "daily bonus granted");
        Ok(Some(account))
    }
}
