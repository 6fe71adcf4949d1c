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

//! Session management: who is logged in right now.
//!
//! The session holds a *cached copy* of the active account; the
//! [`AccountStore`] holds the authoritative one. Every mutation writes
//! through the store first, then the cache is refreshed — never the
//! reverse. Persisted session state is only the active account id;
//! [`SessionManager::restore`] always re-fetches the authoritative record
//! and fails closed when it no longer exists.

use crate::account::Account;
use crate::auth;
use crate::base::AccountId;
use crate::error::LedgerError;
use crate::store::AccountStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// On-disk shape of the persisted session.
#[derive(Debug, Serialize, Deserialize)]
struct SavedSession {
    account_id: AccountId,
}

/// Tracks the account that is currently logged in.
pub struct SessionManager {
    store: Arc<AccountStore>,
    /// Session file; `None` keeps the session in memory only.
    path: Option<PathBuf>,
    /// Cached copy of the active account.
    current: Mutex<Option<Account>>,
}

impl SessionManager {
    /// Minimum accepted password length at signup.
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn new(store: Arc<AccountStore>, path: Option<PathBuf>) -> Self {
        Self {
            store,
            path,
            current: Mutex::new(None),
        }
    }

    /// Restores a previously saved session, if any.
    ///
    /// Re-fetches the authoritative account from the store; a stale saved
    /// id (account gone) clears the session file and restores nothing.
    pub fn restore(&self) -> Option<Account> {
        let path = self.path.as_ref()?;
        let data = fs::read_to_string(path).ok()?;
        let saved: SavedSession = serde_json::from_str(&data).ok()?;
        match self.store.find_by_id(&saved.account_id) {
            Ok(account) => {
                *self.current.lock() = Some(account.clone());
                debug!(account = %account.id, "session restored");
                Some(account)
            }
            Err(_) => {
                debug!(account = %saved.account_id, "saved session is stale, clearing");
                let _ = fs::remove_file(path);
                None
            }
        }
    }

    /// Logs in with email and password.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::MissingFields`] — email or password empty.
    /// - [`LedgerError::UserNotFound`] — no account with this email.
    /// - [`LedgerError::WrongPassword`] — password verification failed.
    ///
    /// Neither failure mutates the store.
    pub fn login(&self, email: &str, password: &str) -> Result<Account, LedgerError> {
        if email.is_empty() || password.is_empty() {
            return Err(LedgerError::MissingFields);
        }
        let account = self.store.find_by_email(email)?;
        if !auth::verify_password(password, &account.password_hash)? {
            return Err(LedgerError::WrongPassword);
        }
        self.activate(account)
    }

    /// Creates an account and logs it in.
    ///
    /// Validation order decides which single message a user sees and is
    /// part of the contract: empty fields, then password mismatch, then
    /// password length, then duplicate email.
    pub fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Account, LedgerError> {
        if name.is_empty() || email.is_empty() || password.is_empty() || confirm_password.is_empty()
        {
            return Err(LedgerError::MissingFields);
        }
        if password != confirm_password {
            return Err(LedgerError::PasswordMismatch);
        }
        if password.len() < Self::MIN_PASSWORD_LEN {
            return Err(LedgerError::PasswordTooShort);
        }
        let password_hash = auth::hash_password(password)?;
        let account = self.store.create_account(name, email, &password_hash)?;
        self.activate(account)
    }

    /// Clears the active session. Does not delete the account.
    pub fn logout(&self) {
        *self.current.lock() = None;
        if let Some(path) = &self.path {
            let _ = fs::remove_file(path);
        }
    }

    /// The cached copy of the active account.
    pub fn current(&self) -> Option<Account> {
        self.current.lock().clone()
    }

    /// Re-reads the active account from the store into the cache.
    ///
    /// Call after every ledger mutation. Logs out if the account has
    /// disappeared from the store.
    pub fn refresh(&self) -> Option<Account> {
        let id = self.current.lock().as_ref().map(|account| account.id)?;
        match self.store.find_by_id(&id) {
            Ok(account) => {
                *self.current.lock() = Some(account.clone());
                Some(account)
            }
            Err(_) => {
                self.logout();
                None
            }
        }
    }

    /// Marks the session active and persists it.
    fn activate(&self, account: Account) -> Result<Account, LedgerError> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let json = serde_json::to_string_pretty(&SavedSession {
                account_id: account.id,
            })?;
            fs::write(path, json)?;
        }
        *self.current.lock() = Some(account.clone());
        debug!(account = %account.id, "session active");
        Ok(account)
    }
}
