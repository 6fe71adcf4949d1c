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

//! Session manager public API integration tests.

use statement_credits_rs::{AccountStore, EntryKind, LedgerError, SessionManager};
use std::sync::Arc;

// === Helper Functions ===

fn setup() -> (Arc<AccountStore>, SessionManager) {
    let store = Arc::new(AccountStore::in_memory());
    let session = SessionManager::new(Arc::clone(&store), None);
    (store, session)
}

// === Signup Tests ===

#[test]
fn signup_grants_signup_credits_and_logs_in() {
    let (_store, session) = setup();

    let account = session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();

    assert_eq!(account.credits, 25);
    assert_eq!(account.credit_usage.len(), 1);
    assert_eq!(account.credit_usage[0].kind, EntryKind::Earned);
    assert_eq!(account.credit_usage[0].credits_used, -25);

    let current = session.current().expect("signed up account is logged in");
    assert_eq!(current.id, account.id);
}

#[test]
fn signup_stores_a_hash_not_the_password() {
    let (store, session) = setup();
    session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();

    let stored = store.find_by_email("jane@x.com").unwrap();
    assert_ne!(stored.password_hash, "secret1");
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[test]
fn signup_rejects_empty_fields_first() {
    let (_store, session) = setup();

    // Empty fields win over every later check.
    assert_eq!(
        session.signup("", "jane@x.com", "abc", "xyz").err(),
        Some(LedgerError::MissingFields)
    );
    assert_eq!(
        session.signup("Jane", "", "secret1", "secret1").err(),
        Some(LedgerError::MissingFields)
    );
    assert_eq!(
        session.signup("Jane", "jane@x.com", "", "").err(),
        Some(LedgerError::MissingFields)
    );
}

#[test]
fn signup_rejects_mismatch_before_length() {
    let (_store, session) = setup();

    // Both too short and mismatched: mismatch is reported.
    assert_eq!(
        session.signup("Jane", "jane@x.com", "abc", "xyz").err(),
        Some(LedgerError::PasswordMismatch)
    );
}

#[test]
fn signup_rejects_short_password() {
    let (_store, session) = setup();

    assert_eq!(
        session.signup("Jane", "jane@x.com", "abc", "abc").err(),
        Some(LedgerError::PasswordTooShort)
    );
}

#[test]
fn signup_rejects_duplicate_email_last() {
    let (_store, session) = setup();
    session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();

    assert_eq!(
        session
            .signup("Other", "jane@x.com", "different9", "different9")
            .err(),
        Some(LedgerError::EmailTaken)
    );
}

#[test]
fn failed_signup_does_not_create_an_account() {
    let (store, session) = setup();

    let _ = session.signup("Jane", "jane@x.com", "abc", "abc");
    assert!(store.is_empty());
}

// === Login Tests ===

#[test]
fn login_with_correct_credentials() {
    let (_store, session) = setup();
    let account = session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();
    session.logout();

    let logged_in = session.login("jane@x.com", "secret1").unwrap();
    assert_eq!(logged_in.id, account.id);
    assert_eq!(session.current().unwrap().id, account.id);
}

#[test]
fn login_with_wrong_password_fails() {
    let (store, session) = setup();
    session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();
    session.logout();

    let before = store.find_by_email("jane@x.com").unwrap();
    assert_eq!(
        session.login("jane@x.com", "wrong").err(),
        Some(LedgerError::WrongPassword)
    );
    assert!(session.current().is_none());
    // The failed attempt did not mutate the store.
    assert_eq!(store.find_by_email("jane@x.com").unwrap(), before);
}

#[test]
fn login_with_unknown_email_fails() {
    let (store, session) = setup();

    assert_eq!(
        session.login("nobody@x.com", "secret1").err(),
        Some(LedgerError::UserNotFound)
    );
    assert!(store.is_empty());
}

#[test]
fn login_with_empty_fields_fails() {
    let (_store, session) = setup();

    assert_eq!(
        session.login("", "secret1").err(),
        Some(LedgerError::MissingFields)
    );
    assert_eq!(
        session.login("jane@x.com", "").err(),
        Some(LedgerError::MissingFields)
    );
}

// === Logout Tests ===

#[test]
fn logout_clears_session_but_keeps_account() {
    let (store, session) = setup();
    session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();

    session.logout();
    assert!(session.current().is_none());
    assert!(store.find_by_email("jane@x.com").is_ok());
}

// === Restore Tests ===

#[test]
fn restore_recovers_a_saved_session() {
    let dir = tempfile::tempdir().unwrap();
    let users_path = dir.path().join("users.json");
    let session_path = dir.path().join("session.json");

    let account = {
        let store = Arc::new(AccountStore::open(&users_path).unwrap());
        let session = SessionManager::new(Arc::clone(&store), Some(session_path.clone()));
        session
            .signup("Jane", "jane@x.com", "secret1", "secret1")
            .unwrap()
    };

    // Fresh process: restore without re-entering credentials.
    let store = Arc::new(AccountStore::open(&users_path).unwrap());
    let session = SessionManager::new(Arc::clone(&store), Some(session_path));
    let restored = session.restore().expect("session restores");
    assert_eq!(restored.id, account.id);
    assert_eq!(session.current().unwrap().id, account.id);
}

#[test]
fn restore_fails_closed_on_stale_account() {
    let dir = tempfile::tempdir().unwrap();
    let users_path = dir.path().join("users.json");
    let session_path = dir.path().join("session.json");

    {
        let store = Arc::new(AccountStore::open(&users_path).unwrap());
        let session = SessionManager::new(Arc::clone(&store), Some(session_path.clone()));
        session
            .signup("Jane", "jane@x.com", "secret1", "secret1")
            .unwrap();
    }

    // The account store is gone; the saved session id no longer resolves.
    std::fs::remove_file(&users_path).unwrap();
    let store = Arc::new(AccountStore::open(&users_path).unwrap());
    let session = SessionManager::new(Arc::clone(&store), Some(session_path.clone()));

    assert!(session.restore().is_none());
    assert!(session.current().is_none());
    // The stale session file was cleared.
    assert!(!session_path.exists());
}

#[test]
fn restore_without_saved_state_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AccountStore::open(dir.path().join("users.json")).unwrap());
    let session = SessionManager::new(Arc::clone(&store), Some(dir.path().join("session.json")));
    assert!(session.restore().is_none());
}

#[test]
fn in_memory_session_never_restores() {
    let (_store, session) = setup();
    assert!(session.restore().is_none());
}

// === Refresh Tests ===

#[test]
fn refresh_picks_up_store_changes() {
    let (store, session) = setup();
    let mut account = session
        .signup("Jane", "jane@x.com", "secret1", "secret1")
        .unwrap();

    account.name = "Jane Doe".to_string();
    store.replace(account).unwrap();

    // Cache still holds the stale copy until refreshed.
    assert_eq!(session.current().unwrap().name, "Jane");
    assert_eq!(session.refresh().unwrap().name, "Jane Doe");
    assert_eq!(session.current().unwrap().name, "Jane Doe");
}
