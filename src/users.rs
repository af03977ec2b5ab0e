use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use supply_sdk::alloy::primitives::Address;
use supply_sdk::alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

const USERS_FILE: &str = "local_users.json";
const BUNDLED_USERS: &str = include_str!("../resources/local_users.json");

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Failed to read users file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse users: {0}")]
    Parse(String),

    #[error("Invalid private key for user {id}: {reason}")]
    InvalidKey { id: u32, reason: String },

    #[error("Duplicate user id {0}")]
    DuplicateId(u32),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: u32,
    name: String,
    role: String,
    private_key: String,
}

/// A selectable identity able to sign transactions.
#[derive(Clone)]
pub struct LocalUser {
    pub id: u32,
    pub name: String,
    pub role: String,
    signer: PrivateKeySigner,
}

impl std::fmt::Debug for LocalUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl LocalUser {
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            address: self.address().to_checksum(None),
        }
    }
}

/// What the frontend sees of a user. Never carries key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub address: String,
}

pub fn parse_users(json: &str) -> Result<Vec<LocalUser>, UserError> {
    let records: Vec<UserRecord> =
        serde_json::from_str(json).map_err(|e| UserError::Parse(e.to_string()))?;

    let mut users: Vec<LocalUser> = Vec::with_capacity(records.len());
    for record in records {
        if users.iter().any(|u| u.id == record.id) {
            return Err(UserError::DuplicateId(record.id));
        }
        let signer: PrivateKeySigner =
            record
                .private_key
                .trim()
                .parse()
                .map_err(|e| UserError::InvalidKey {
                    id: record.id,
                    reason: format!("{e}"),
                })?;
        users.push(LocalUser {
            id: record.id,
            name: record.name,
            role: record.role,
            signer,
        });
    }
    Ok(users)
}

/// Users from `local_users.json` in the app data dir, or the bundled
/// development accounts when no such file exists.
pub fn load_users(app_data_dir: &Path) -> Result<Vec<LocalUser>, UserError> {
    let path = app_data_dir.join(USERS_FILE);
    if path.exists() {
        let contents = fs::read_to_string(&path)?;
        return parse_users(&contents);
    }
    bundled_users()
}

pub fn bundled_users() -> Result<Vec<LocalUser>, UserError> {
    parse_users(BUNDLED_USERS)
}
