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

use clap::{Parser, Subcommand};
use csv::Writer;
use statement_credits_rs::{
    Account, AccountStore, ConversionRecord, ConversionSimulator, LedgerEngine, PendingUpload,
    ReferralCode, SessionManager,
};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Statement Credits - account and credit ledger for simulated PDF
/// statement conversions.
///
/// State lives under a data directory: accounts in `users.json`, the
/// active session in `session.json`.
#[derive(Parser, Debug)]
#[command(name = "statement-credits-rs")]
#[command(about = "Credit ledger for a PDF statement conversion service", long_about = None)]
struct Args {
    /// Directory holding account and session state
    #[arg(long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (25 free credits) and log in
    Signup {
        name: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    /// Log in with email and password
    Login { email: String, password: String },
    /// Log out of the active session
    Logout,
    /// Show the active account
    Whoami,
    /// Convert files (simulated), debiting one credit per page
    Convert {
        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Skip the simulated conversion delay
        #[arg(long)]
        no_wait: bool,
    },
    /// Show conversion history
    History {
        /// Write history as CSV to stdout
        #[arg(long)]
        csv: bool,
    },
    /// Show credit balance and usage
    Credits,
    /// Claim the daily login bonus
    Bonus,
    /// Credit the owner of a referral code for a converted referral
    Referral {
        /// Referral code of the referrer
        code: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let store = match AccountStore::open(args.data_dir.join("users.json")) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error opening account store: {}", e);
            process::exit(1);
        }
    };
    let session = SessionManager::new(
        Arc::clone(&store),
        Some(args.data_dir.join("session.json")),
    );
    let engine = LedgerEngine::new(Arc::clone(&store));
    session.restore();

    if let Err(e) = run(args.command, &store, &session, &engine) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(
    command: Command,
    store: &AccountStore,
    session: &SessionManager,
    engine: &LedgerEngine,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let account = session.signup(&name, &email, &password, &confirm_password)?;
            println!(
                "Account created for {} <{}>. You received {} free credits!",
                account.name, account.email, account.credits
            );
        }
        Command::Login { email, password } => {
            let account = session.login(&email, &password)?;
            println!(
                "Logged in as {} <{}> ({} credits)",
                account.name, account.email, account.credits
            );
        }
        Command::Logout => {
            session.logout();
            println!("Logged out");
        }
        Command::Whoami => {
            let account = require_login(session);
            println!("{} <{}>", account.name, account.email);
            println!("Credits:       {}", account.credits);
            println!("Referral code: {}", account.referral_code);
            println!("Member since:  {}", account.join_date.date_naive());
        }
        Command::Convert { files, no_wait } => {
            let account = require_login(session);
            let simulator = if no_wait {
                ConversionSimulator::with_delay(Duration::ZERO)
            } else {
                ConversionSimulator::new()
            };

            let uploads: Vec<PendingUpload> = files
                .iter()
                .map(|path| {
                    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                    simulator.inspect(&display_name(path), size)
                })
                .collect();

            let total_cost: i64 = uploads.iter().map(PendingUpload::cost).sum();
            for upload in &uploads {
                println!(
                    "{}  {} page(s)  {} credit(s)  [{}]",
                    upload.file_name, upload.pages, upload.cost(), upload.status
                );
            }
            println!("Total credits needed: {}", total_cost);

            let ticket = engine.begin_conversion()?;
            thread::sleep(simulator.delay());

            let jobs: Vec<_> = uploads.into_iter().map(PendingUpload::into_job).collect();
            let updated = engine.apply_conversion(ticket, account.id, &jobs)?;
            session.refresh();

            println!(
                "Converted {} file(s) ({} pages). {} credits remaining.",
                jobs.len(),
                total_cost,
                updated.credits
            );
        }
        Command::History { csv } => {
            let account = require_login(session);
            if csv {
                write_history(&account.convert_history, std::io::stdout())?;
            } else if account.convert_history.is_empty() {
                println!("No conversions yet");
            } else {
                for record in &account.convert_history {
                    println!(
                        "{}  {}  {} page(s)  {} credit(s)  {}",
                        record.date, record.file_name, record.pages, record.credits, record.status
                    );
                }
            }
        }
        Command::Credits => {
            let account = require_login(session);
            println!("Balance:        {}", account.credits);
            println!("Total spent:    {}", account.credits_spent());
            println!("Total earned:   {}", account.credits_earned());
            println!();
            for entry in &account.credit_usage {
                println!(
                    "{}  {:+}  {}  ({})",
                    entry.date, -entry.credits_used, entry.label, entry.kind
                );
            }
        }
        Command::Bonus => {
            let account = require_login(session);
            let today = chrono::Utc::now().date_naive();
            match engine.claim_daily_bonus(account.id, today)? {
                Some(updated) => {
                    session.refresh();
                    println!(
                        "Daily bonus claimed: +{} credits ({} total)",
                        LedgerEngine::DAILY_BONUS,
                        updated.credits
                    );
                }
                None => println!("Daily bonus already claimed today"),
            }
        }
        Command::Referral { code } => {
            let referrer = store.find_by_referral_code(&ReferralCode(code))?;
            let updated = engine.grant_referral_bonus(referrer.id)?;
            session.refresh();
            println!(
                "Credited {} with +{} referral credits ({} total)",
                updated.email,
                LedgerEngine::REFERRAL_BONUS,
                updated.credits
            );
        }
    }
    Ok(())
}

/// Returns the active account or exits with a login hint.
fn require_login(session: &SessionManager) -> Account {
    match session.current() {
        Some(account) => account,
        None => {
            eprintln!("Please log in first (see `signup` and `login`)");
            process::exit(1);
        }
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write conversion records to a CSV writer, newest first.
///
/// # CSV Format
///
/// Columns: `id, file_name, date, pages, credits, status`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_history<W: Write>(records: &[ConversionRecord], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statement_credits_rs::ConversionJob;

    fn converted_account() -> Account {
        let store = Arc::new(AccountStore::in_memory());
        let account = store.create_account("Jane", "jane@x.com", "hash").unwrap();
        let engine = LedgerEngine::new(Arc::clone(&store));
        let ticket = engine.begin_conversion().unwrap();
        engine
            .apply_conversion(
                ticket,
                account.id,
                &[
                    ConversionJob {
                        file_name: "a.pdf".into(),
                        pages: 2,
                    },
                    ConversionJob {
                        file_name: "b.pdf".into(),
                        pages: 3,
                    },
                ],
            )
            .unwrap()
    }

    #[test]
    fn history_csv_has_header_and_rows() {
        let account = converted_account();

        let mut output = Vec::new();
        write_history(&account.convert_history, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        let mut lines = output_str.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,file_name,date,pages,credits,status"
        );
        assert_eq!(lines.count(), 2);
        assert!(output_str.contains("a.pdf"));
        assert!(output_str.contains("completed"));
    }

    #[test]
    fn display_name_strips_directories() {
        assert_eq!(
            display_name(std::path::Path::new("uploads/march.pdf")),
            "march.pdf"
        );
    }
}
