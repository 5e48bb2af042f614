// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{AccountError, AccountsData};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait AccountStore: Send + Sync {
    fn load(&self) -> Result<AccountsData, AccountError>;
    fn save(&self, accounts: &AccountsData) -> Result<(), AccountError>;
}

pub struct FileAccountStore {
    accounts_file: PathBuf,
}

impl FileAccountStore {
    pub fn new(accounts_file: PathBuf) -> Result<Self, AccountError> {
        if accounts_file.as_os_str().is_empty() {
            return Err(AccountError::FileError(
                "Accounts file path is empty".to_string(),
            ));
        }

        Ok(Self { accounts_file })
    }

    fn parse_accounts(content: &str) -> Result<AccountsData, AccountError> {
        if content.trim().is_empty() {
            return Ok(AccountsData::new());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AccountError::ParseError(format!("Failed to parse accounts file: {}", e)))
    }

    fn serialize_accounts(accounts: &AccountsData) -> Result<String, AccountError> {
        serde_yaml::to_string(accounts)
            .map_err(|e| AccountError::ParseError(format!("Failed to serialize accounts: {}", e)))
    }

    fn read_accounts_file(&self) -> Result<String, AccountError> {
        std::fs::read_to_string(&self.accounts_file)
            .map_err(|e| AccountError::FileError(format!("Failed to read accounts file: {}", e)))
    }

    fn write_accounts_file(&self, content: &str) -> Result<(), AccountError> {
        let parent = self.accounts_file.parent().ok_or_else(|| {
            AccountError::FileError("Accounts file path has no parent directory".to_string())
        })?;
        let file_name = self.accounts_file.file_name().ok_or_else(|| {
            AccountError::FileError("Accounts file path has no file name".to_string())
        })?;
        let (mut file, temp_path) = create_temp_file(parent, file_name)?;

        if let Ok(metadata) = std::fs::metadata(&self.accounts_file) {
            #[cfg(unix)]
            {
                if let Err(err) = std::fs::set_permissions(&temp_path, metadata.permissions()) {
                    let _ = std::fs::remove_file(&temp_path);
                    return Err(AccountError::FileError(format!(
                        "Failed to set temp accounts file permissions: {}",
                        err
                    )));
                }
            }
        }

        if let Err(err) = file.write_all(content.as_bytes()) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(AccountError::FileError(format!(
                "Failed to write accounts temp file: {}",
                err
            )));
        }
        if let Err(err) = file.sync_all() {
            let _ = std::fs::remove_file(&temp_path);
            return Err(AccountError::FileError(format!(
                "Failed to sync accounts temp file: {}",
                err
            )));
        }

        if let Err(err) = std::fs::rename(&temp_path, &self.accounts_file) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(AccountError::FileError(format!(
                "Failed to replace accounts file: {}",
                err
            )));
        }

        #[cfg(unix)]
        {
            if let Err(err) = sync_parent_dir(parent) {
                log::warn!("Accounts directory sync failed: {}", err);
            }
        }

        Ok(())
    }
}

fn create_temp_file(
    dir: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(std::fs::File, PathBuf), AccountError> {
    use std::fs::OpenOptions;
    const MAX_ATTEMPTS: u32 = 100;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(AccountError::FileError(format!(
                    "Failed to create temp accounts file: {}",
                    err
                )));
            }
        }
    }
    Err(AccountError::FileError(
        "Failed to create temp accounts file after repeated attempts".to_string(),
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), AccountError> {
    let dir = std::fs::File::open(parent).map_err(|err| {
        AccountError::FileError(format!(
            "Failed to open accounts directory for sync: {}",
            err
        ))
    })?;
    dir.sync_all().map_err(|err| {
        AccountError::FileError(format!("Failed to sync accounts directory: {}", err))
    })
}

impl AccountStore for FileAccountStore {
    fn load(&self) -> Result<AccountsData, AccountError> {
        let content = self.read_accounts_file()?;
        Self::parse_accounts(&content)
    }

    fn save(&self, accounts: &AccountsData) -> Result<(), AccountError> {
        let content = Self::serialize_accounts(accounts)?;
        self.write_accounts_file(&content)
    }
}

#[cfg(test)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<AccountsData>>,
}

#[cfg(test)]
impl MemoryAccountStore {
    pub fn new(initial: AccountsData) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn empty() -> Self {
        Self::new(AccountsData::new())
    }
}

#[cfg(test)]
impl AccountStore for MemoryAccountStore {
    fn load(&self) -> Result<AccountsData, AccountError> {
        match self.accounts.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => {
                log::error!("MemoryAccountStore lock poisoned on read; recovering");
                Ok(poisoned.into_inner().clone())
            }
        }
    }

    fn save(&self, accounts: &AccountsData) -> Result<(), AccountError> {
        match self.accounts.write() {
            Ok(mut guard) => {
                *guard = accounts.clone();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("MemoryAccountStore lock poisoned on write; recovering");
                let mut guard = poisoned.into_inner();
                *guard = accounts.clone();
                Ok(())
            }
        }
    }
}
