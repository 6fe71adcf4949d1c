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

//! Durable account store.
//!
//! The store is the single source of truth for identity and credit
//! balances. Accounts are mutated by read-copy-modify and written back
//! through [`AccountStore::replace`], the only sanctioned mutation path.
//! Backing state is a JSON file holding the accounts ordered by join date;
//! a store opened without a path keeps everything in memory.

use crate::account::Account;
use crate::base::{AccountId, ReferralCode};
use crate::error::LedgerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// On-disk shape of the account collection.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedUsers {
    users: Vec<Account>,
}

/// Durable collection of all accounts.
///
/// Lookups go through a concurrent index; mutations are serialized so the
/// email-uniqueness check and the insert happen as one step, then saved to
/// the backing file before returning.
#[derive(Debug)]
pub struct AccountStore {
    /// Accounts indexed by id.
    accounts: DashMap<AccountId, Account>,
    /// Backing file; `None` keeps the store in memory only.
    path: Option<PathBuf>,
    /// Serializes mutations and saves.
    write_gate: Mutex<()>,
}

impl AccountStore {
    /// Creates a store with no backing file. State is lost on drop.
    pub fn in_memory() -> Self {
        Self {
            accounts: DashMap::new(),
            path: None,
            write_gate: Mutex::new(()),
        }
    }

    /// Opens a store backed by the JSON file at `path`.
    ///
    /// A missing file yields an empty store; an unreadable or corrupt file
    /// is a [`LedgerError::Storage`] error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let accounts = DashMap::new();
        if path.exists() {
            let data = fs::read_to_string(&path)?;
            let saved: SavedUsers = serde_json::from_str(&data)?;
            for account in saved.users {
                accounts.insert(account.id, account);
            }
        }
        debug!(accounts = accounts.len(), path = %path.display(), "account store opened");
        Ok(Self {
            accounts,
            path: Some(path),
            write_gate: Mutex::new(()),
        })
    }

    /// Creates a new account with the signup grant applied.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::EmailTaken`] — an account with this email exists.
    /// - [`LedgerError::Storage`] — the backing file could not be written.
    pub fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, LedgerError> {
        let _gate = self.write_gate.lock();
        if self.accounts.iter().any(|entry| entry.email == email) {
            return Err(LedgerError::EmailTaken);
        }
        let account = Account::new(name, email, password_hash);
        self.accounts.insert(account.id, account.clone());
        self.save()?;
        debug!(account = %account.id, email, "account created");
        Ok(account)
    }

    /// Looks up an account by its exact email.
    pub fn find_by_email(&self, email: &str) -> Result<Account, LedgerError> {
        self.accounts
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone())
            .ok_or(LedgerError::UserNotFound)
    }

    /// Looks up an account by id.
    pub fn find_by_id(&self, id: &AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(LedgerError::NotFound)
    }

    /// Looks up the account that owns a referral code.
    pub fn find_by_referral_code(&self, code: &ReferralCode) -> Result<Account, LedgerError> {
        self.accounts
            .iter()
            .find(|entry| entry.referral_code == *code)
            .map(|entry| entry.value().clone())
            .ok_or(LedgerError::UserNotFound)
    }

    /// Overwrites the stored record matching `account.id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] — no stored record has this id.
    /// - [`LedgerError::Storage`] — the backing file could not be written.
    pub fn replace(&self, account: Account) -> Result<(), LedgerError> {
        let _gate = self.write_gate.lock();
        match self.accounts.entry(account.id) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(account);
            }
            Entry::Vacant(_) => return Err(LedgerError::NotFound),
        }
        self.save()
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Writes all accounts to the backing file, ordered by join date.
    ///
    /// Callers must hold `write_gate`.
    fn save(&self) -> Result<(), LedgerError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut users: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| a.join_date.cmp(&b.join_date).then(a.id.cmp(&b.id)));

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&SavedUsers { users })?;
        fs::write(path, json)?;
        Ok(())
    }
}
