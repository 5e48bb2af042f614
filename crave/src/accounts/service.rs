// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::store::AccountStore;
use super::types::{
    Account, AccountError, AccountMutation, AccountMutationResult, AccountsData,
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, oneshot};

// Type aliases for complex channel types
type MutationRequest = (
    AccountMutation,
    oneshot::Sender<Result<AccountMutationResult, AccountError>>,
);
type MutationSender = mpsc::UnboundedSender<MutationRequest>;
type MutationReceiver = mpsc::UnboundedReceiver<MutationRequest>;

/// Credential store front. Reads are served from an in-memory view; all
/// mutations are serialized through a background task and persist through
/// the store before the view is swapped, so a failed save never leaves the
/// view ahead of the file.
#[derive(Clone)]
pub struct AccountService {
    accounts_data: Arc<RwLock<AccountsData>>,
    mutation_sender: MutationSender,
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    /// Initialize the account service with a backing store.
    /// Loads accounts from the store and starts the mutation task.
    pub fn new(store: Arc<dyn AccountStore>) -> Result<Self, AccountError> {
        let accounts = store.load()?;
        let accounts_data = Arc::new(RwLock::new(accounts));

        let (mutation_sender, mut mutation_receiver): (MutationSender, MutationReceiver) =
            mpsc::unbounded_channel();

        let accounts_data_clone = accounts_data.clone();
        let store_clone = store.clone();

        tokio::spawn(async move {
            while let Some((mutation, response_sender)) = mutation_receiver.recv().await {
                let result = Self::handle_mutation(&mutation, &accounts_data_clone, &store_clone);
                let _ = response_sender.send(result);
            }
        });

        Ok(AccountService {
            accounts_data,
            mutation_sender,
            store,
        })
    }

    fn reload_from_store(
        accounts_data: &Arc<RwLock<AccountsData>>,
        store: &Arc<dyn AccountStore>,
    ) -> Result<(), AccountError> {
        let accounts = store.load()?;
        match accounts_data.write() {
            Ok(mut guard) => {
                *guard = accounts;
                accounts_data.clear_poison();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("Accounts lock poisoned during reload; recovering");
                let mut guard = poisoned.into_inner();
                *guard = accounts;
                accounts_data.clear_poison();
                Ok(())
            }
        }
    }

    fn with_accounts_read<T>(
        &self,
        f: impl FnOnce(&AccountsData) -> Result<T, AccountError>,
    ) -> Result<T, AccountError> {
        match self.accounts_data.read() {
            Ok(guard) => f(&guard),
            Err(_) => {
                log::error!("Accounts lock poisoned on read; reloading from store");
                Self::reload_from_store(&self.accounts_data, &self.store)?;
                let guard = self.accounts_data.read().map_err(|_| {
                    AccountError::FileError(
                        "Accounts lock poisoned after recovery attempt".to_string(),
                    )
                })?;
                f(&guard)
            }
        }
    }

    fn with_accounts_write<T>(
        accounts_data: &Arc<RwLock<AccountsData>>,
        store: &Arc<dyn AccountStore>,
        f: impl FnOnce(&mut AccountsData) -> Result<T, AccountError>,
    ) -> Result<T, AccountError> {
        let mut guard = match accounts_data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Accounts lock poisoned on write; reloading from store");
                let mut guard = poisoned.into_inner();
                let accounts = store.load()?;
                *guard = accounts;
                accounts_data.clear_poison();
                guard
            }
        };

        f(&mut guard)
    }

    /// Handle an account mutation (runs on the mutation task)
    fn handle_mutation(
        mutation: &AccountMutation,
        accounts_data: &Arc<RwLock<AccountsData>>,
        store: &Arc<dyn AccountStore>,
    ) -> Result<AccountMutationResult, AccountError> {
        match mutation {
            AccountMutation::Create { account } => {
                Self::with_accounts_write(accounts_data, store, |accounts| {
                    // The insert is the uniqueness authority; the handler's
                    // earlier lookup is only a convenience check.
                    if accounts.contains_key(&account.email) {
                        return Err(AccountError::DuplicateEmail(account.email.clone()));
                    }

                    let mut updated = accounts.clone();
                    updated.insert(account.email.clone(), account.clone());

                    store.save(&updated)?;
                    *accounts = updated;
                    Ok(AccountMutationResult::Created(account.clone()))
                })
            }
            AccountMutation::MarkEmailVerified { id } => {
                Self::with_accounts_write(accounts_data, store, |accounts| {
                    let mut updated = accounts.clone();
                    let account = match updated.values_mut().find(|account| account.id == *id) {
                        Some(account) => account,
                        None => return Err(AccountError::AccountNotFound(id.clone())),
                    };
                    account.email_verified = true;

                    store.save(&updated)?;
                    *accounts = updated;
                    Ok(AccountMutationResult::Updated)
                })
            }
            AccountMutation::SetRefreshToken {
                email,
                refresh_token,
            } => Self::with_accounts_write(accounts_data, store, |accounts| {
                let mut updated = accounts.clone();
                let account = match updated.get_mut(email) {
                    Some(account) => account,
                    None => return Err(AccountError::AccountNotFound(email.clone())),
                };
                account.refresh_token = refresh_token.clone();

                store.save(&updated)?;
                *accounts = updated;
                Ok(AccountMutationResult::Updated)
            }),
            AccountMutation::SetOtp {
                email,
                otp,
                expires_at,
            } => Self::with_accounts_write(accounts_data, store, |accounts| {
                let mut updated = accounts.clone();
                let account = match updated.get_mut(email) {
                    Some(account) => account,
                    None => return Err(AccountError::AccountNotFound(email.clone())),
                };
                account.otp = Some(otp.clone());
                account.otp_expires_at = Some(*expires_at);

                store.save(&updated)?;
                *accounts = updated;
                Ok(AccountMutationResult::Updated)
            }),
            AccountMutation::ReplacePassword {
                email,
                password_hash,
            } => Self::with_accounts_write(accounts_data, store, |accounts| {
                let mut updated = accounts.clone();
                let account = match updated.get_mut(email) {
                    Some(account) => account,
                    None => return Err(AccountError::AccountNotFound(email.clone())),
                };
                account.password_hash = password_hash.clone();
                account.otp = None;
                account.otp_expires_at = None;

                store.save(&updated)?;
                *accounts = updated;
                Ok(AccountMutationResult::Updated)
            }),
        }
    }

    async fn apply(&self, mutation: AccountMutation) -> Result<AccountMutationResult, AccountError> {
        let (response_sender, response_receiver) = oneshot::channel();

        self.mutation_sender
            .send((mutation, response_sender))
            .map_err(|_| AccountError::ServiceNotInitialized)?;

        response_receiver
            .await
            .map_err(|_| AccountError::ServiceNotInitialized)?
    }

    /// Look up an account by email (synchronous read operation)
    pub fn get_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        log::debug!("Looking up account by email: {}", email);
        self.with_accounts_read(|accounts| Ok(accounts.get(email).cloned()))
    }

    /// Look up an account by id (synchronous read operation)
    pub fn get_by_id(&self, id: &str) -> Result<Option<Account>, AccountError> {
        log::debug!("Looking up account by id: {}", id);
        self.with_accounts_read(|accounts| {
            Ok(accounts.values().find(|account| account.id == id).cloned())
        })
    }

    /// Persist a new account (async mutation operation)
    pub async fn create(&self, account: Account) -> Result<Account, AccountError> {
        match self.apply(AccountMutation::Create { account }).await? {
            AccountMutationResult::Created(created) => Ok(created),
            AccountMutationResult::Updated => Err(AccountError::ServiceNotInitialized),
        }
    }

    /// Flip the email-verified flag. Harmless to repeat.
    pub async fn mark_email_verified(&self, id: &str) -> Result<(), AccountError> {
        self.apply(AccountMutation::MarkEmailVerified { id: id.to_string() })
            .await
            .map(|_| ())
    }

    /// Overwrite the stored refresh token; `None` clears it (logout).
    pub async fn set_refresh_token(
        &self,
        email: &str,
        refresh_token: Option<String>,
    ) -> Result<(), AccountError> {
        self.apply(AccountMutation::SetRefreshToken {
            email: email.to_string(),
            refresh_token,
        })
        .await
        .map(|_| ())
    }

    /// Store a password-reset OTP with its expiry. Both fields travel together.
    pub async fn set_otp(
        &self,
        email: &str,
        otp: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        self.apply(AccountMutation::SetOtp {
            email: email.to_string(),
            otp: otp.to_string(),
            expires_at,
        })
        .await
        .map(|_| ())
    }

    /// Replace the password hash and clear the OTP pair.
    pub async fn replace_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<(), AccountError> {
        self.apply(AccountMutation::ReplacePassword {
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
        .await
        .map(|_| ())
    }
}
