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

//! Immutable ledger entries and conversion records.
//!
//! Sign convention for [`LedgerEntry::credits_used`]:
//! negative = credit granted, positive = credit spent.

use crate::base::EntryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Credits granted (signup, referral, daily bonus).
    Earned,
    /// Credits spent on a conversion.
    Conversion,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Earned => write!(f, "earned"),
            EntryKind::Conversion => write!(f, "conversion"),
        }
    }
}

/// One immutable record of a credit grant or debit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: EntryId,
    /// File name for conversions, or a synthetic label such as
    /// `"Welcome Bonus"` for grants.
    pub label: String,
    pub date: NaiveDate,
    /// Negative = granted, positive = spent.
    pub credits_used: i64,
    pub kind: EntryKind,
}

impl LedgerEntry {
    /// Entry for `amount` credits granted to the account.
    pub fn earned(label: &str, amount: i64, date: NaiveDate) -> Self {
        Self {
            id: EntryId::new(),
            label: label.to_string(),
            date,
            credits_used: -amount,
            kind: EntryKind::Earned,
        }
    }

    /// Entry for a conversion that spent one credit per page.
    pub fn conversion(file_name: &str, pages: u32, date: NaiveDate) -> Self {
        Self {
            id: EntryId::new(),
            label: file_name.to_string(),
            date,
            credits_used: i64::from(pages),
            kind: EntryKind::Conversion,
        }
    }
}

/// Status of a conversion.
///
/// Recorded conversions are always `Completed`; `Pending` only appears on
/// simulator output while the batch delay is running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Pending,
    Completed,
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStatus::Pending => write!(f, "pending"),
            ConversionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One immutable record of a completed file conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionRecord {
    pub id: EntryId,
    pub file_name: String,
    pub date: NaiveDate,
    pub pages: u32,
    /// Always equal to `pages` (1 credit = 1 page).
    pub credits: u32,
    pub status: ConversionStatus,
}

impl ConversionRecord {
    pub fn completed(file_name: &str, pages: u32, date: NaiveDate) -> Self {
        Self {
            id: EntryId::new(),
            file_name: file_name.to_string(),
            date,
            pages,
            credits: pages,
            status: ConversionStatus::Completed,
        }
    }
}

/// Input to the ledger engine: one file with its fabricated page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub file_name: String,
    pub pages: u32,
}

impl ConversionJob {
    /// Credit cost of converting this file.
    pub fn cost(&self) -> i64 {
        i64::from(self.pages)
    }
}
