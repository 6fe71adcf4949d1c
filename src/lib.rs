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

//! # Statement Credits
//!
//! This library provides the account and credit ledger for a PDF
//! statement-to-Excel conversion service: signup, login, session restore,
//! per-page credit debits, immutable usage history, and bonus grants. The
//! conversion itself is simulated; no document parsing occurs.
//!
//! ## Core Components
//!
//! - [`AccountStore`]: durable collection of accounts, the single source
//!   of truth for identity and balances
//! - [`SessionManager`]: tracks who is logged in, restores saved sessions
//! - [`LedgerEngine`]: all-or-nothing conversion debits and bonus grants
//! - [`ConversionSimulator`]: fabricated page counts and batch delay
//! - [`LedgerError`]: user-facing error taxonomy
//!
//! ## Example
//!
//! ```
//! use statement_credits_rs::{AccountStore, ConversionJob, LedgerEngine, SessionManager};
//! use std::sync::Arc;
//!
//! let store = Arc::new(AccountStore::in_memory());
//! let session = SessionManager::new(Arc::clone(&store), None);
//!
//! // Sign up: 25 free credits.
//! let account = session
//!     .signup("Jane", "jane@example.com", "secret1", "secret1")
//!     .unwrap();
//! assert_eq!(account.credits, 25);
//!
//! // Convert a 5-page statement: 1 credit per page.
//! let engine = LedgerEngine::new(Arc::clone(&store));
//! let ticket = engine.begin_conversion().unwrap();
//! let jobs = vec![ConversionJob {
//!     file_name: "statement.pdf".into(),
//!     pages: 5,
//! }];
//! let account = engine.apply_conversion(ticket, account.id, &jobs).unwrap();
//! assert_eq!(account.credits, 20);
//! ```
//!
//! ## Ownership
//!
//! The session holds a cached copy of the active account; the store holds
//! the authoritative one. Mutations write through the store first, then
//! the session cache is refreshed — never the reverse.

pub mod account;
mod auth;
mod base;
mod engine;
mod entry;
pub mod error;
mod session;
mod simulator;
mod store;

pub use account::Account;
pub use base::{AccountId, EntryId, ReferralCode, UploadId};
pub use engine::{ConversionTicket, LedgerEngine};
pub use entry::{ConversionJob, ConversionRecord, ConversionStatus, EntryKind, LedgerEntry};
pub use error::LedgerError;
pub use session::SessionManager;
pub use simulator::{ConversionSimulator, PendingUpload};
pub use store::AccountStore;
