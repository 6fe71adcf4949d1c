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

//! Conversion simulator.
//!
//! Stands in for real document parsing: fabricates a page count per
//! uploaded file and imposes a fixed delay before the ledger engine is
//! invoked. A real implementation would replace this module wholesale and
//! keep its output shape.

use crate::base::UploadId;
use crate::entry::{ConversionJob, ConversionStatus};
use rand::Rng;
use std::time::Duration;

/// An uploaded file waiting for its batch to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub id: UploadId,
    pub file_name: String,
    pub size_bytes: u64,
    /// Fabricated page count.
    pub pages: u32,
    /// `Pending` until the simulated delay completes.
    pub status: ConversionStatus,
}

impl PendingUpload {
    /// Credit cost of converting this upload.
    pub fn cost(&self) -> i64 {
        i64::from(self.pages)
    }

    /// The shape the ledger engine consumes.
    pub fn into_job(self) -> ConversionJob {
        ConversionJob {
            file_name: self.file_name,
            pages: self.pages,
        }
    }
}

/// Fabricates conversion results.
#[derive(Debug, Clone)]
pub struct ConversionSimulator {
    delay: Duration,
}

impl ConversionSimulator {
    pub const MIN_PAGES: u32 = 1;
    pub const MAX_PAGES: u32 = 5;
    /// Fixed batch delay, not proportional to page count or file size.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    pub fn new() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
        }
    }

    /// Simulator with a custom delay, so tests and demos need not sleep.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Produces a pending upload with a fabricated page count in
    /// [`MIN_PAGES`](Self::MIN_PAGES)..=[`MAX_PAGES`](Self::MAX_PAGES).
    pub fn inspect(&self, file_name: &str, size_bytes: u64) -> PendingUpload {
        let pages = rand::thread_rng().gen_range(Self::MIN_PAGES..=Self::MAX_PAGES);
        PendingUpload {
            id: UploadId::new(),
            file_name: file_name.to_string(),
            size_bytes,
            pages,
            status: ConversionStatus::Pending,
        }
    }

    /// How long a batch takes before its ledger effect applies.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ConversionSimulator {
    fn default() -> Self {
        Self::new()
    }
}
