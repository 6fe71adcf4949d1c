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

//! Error types for account, session, and ledger operations.

use thiserror::Error;

/// Account and ledger processing errors.
///
/// Every variant is recoverable and user-facing; display messages are the
/// strings shown to the user by the view layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An account with this email already exists
    #[error("email already registered, please login")]
    EmailTaken,

    /// No account matches the given email
    #[error("user not found, please sign up first")]
    UserNotFound,

    /// Password verification failed
    #[error("incorrect password")]
    WrongPassword,

    /// A required signup field was left empty
    #[error("please fill in all fields")]
    MissingFields,

    /// Password and confirmation do not match
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password is shorter than the minimum length
    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    /// Conversion batch costs more credits than the account holds
    #[error("insufficient credits")]
    InsufficientCredits,

    /// No stored account matches the given id
    #[error("account not found")]
    NotFound,

    /// A conversion batch is already being processed
    #[error("a conversion is already in progress")]
    ConversionInFlight,

    /// Password hashing or hash parsing failed
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Durable store could not be read or written
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for LedgerError {
    fn from(err: argon2::password_hash::Error) -> Self {
        LedgerError::PasswordHash(err.to_string())
    }
}
