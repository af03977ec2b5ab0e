use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use supply_sdk::ChainConfig;
use thiserror::Error;

use crate::users::{self, LocalUser, UserSummary};

const CHAIN_CONFIG_FILE: &str = "chain_config.json";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Unknown user id {0}")]
    UnknownUser(u32),

    #[error("No user selected")]
    NoUserSelected,

    #[error("Invalid chain config: {0}")]
    InvalidConfig(#[from] supply_sdk::ConfigError),

    #[error("Failed to save config: {0}")]
    Persist(String),
}

// ============================================================================
// App state (sent to frontend)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub rpc_url: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub revision: u64,
    pub users: Vec<UserSummary>,
    pub current_user: Option<UserSummary>,
    pub chain: ChainStatus,
}

// ============================================================================
// App state manager
// ============================================================================

/// Holds the selectable identities and chain settings. The selected user is
/// read out explicitly by each submission; nothing below the command layer
/// consults it.
pub struct AppStateManager {
    app_data_dir: PathBuf,
    users: Vec<LocalUser>,
    current_user: Option<u32>,
    chain_config: ChainConfig,
    revision: u64,
}

impl AppStateManager {
    pub fn new(app_data_dir: PathBuf) -> Self {
        let users = users::load_users(&app_data_dir).unwrap_or_else(|e| {
            log::error!("{e}; falling back to bundled users");
            users::bundled_users().unwrap_or_default()
        });
        let chain_config = Self::load_chain_config(&app_data_dir);
        Self::with_parts(app_data_dir, users, chain_config)
    }

    pub fn with_parts(app_data_dir: PathBuf, users: Vec<LocalUser>, chain_config: ChainConfig) -> Self {
        // Default to the first user
        let current_user = users.first().map(|u| u.id);
        Self {
            app_data_dir,
            users,
            current_user,
            chain_config,
            revision: 0,
        }
    }

    pub fn users(&self) -> Vec<UserSummary> {
        self.users.iter().map(LocalUser::summary).collect()
    }

    pub fn current_user(&self) -> Option<&LocalUser> {
        let id = self.current_user?;
        self.users.iter().find(|u| u.id == id)
    }

    /// The selected user, for operations that need a signer.
    pub fn require_current_user(&self) -> Result<&LocalUser, StateError> {
        self.current_user().ok_or(StateError::NoUserSelected)
    }

    pub fn select_user(&mut self, id: u32) -> Result<UserSummary, StateError> {
        let user = self
            .users
            .iter()
            .find(|u| u.id == id)
            .ok_or(StateError::UnknownUser(id))?;
        let summary = user.summary();
        if self.current_user != Some(id) {
            self.current_user = Some(id);
            self.bump_revision();
        }
        Ok(summary)
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    pub fn set_chain_config(&mut self, config: ChainConfig) -> Result<AppState, StateError> {
        config.rpc_url()?;
        self.save_chain_config(&config)?;
        self.chain_config = config;
        self.bump_revision();
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> AppState {
        AppState {
            revision: self.revision,
            users: self.users(),
            current_user: self.current_user().map(LocalUser::summary),
            chain: ChainStatus {
                rpc_url: self.chain_config.rpc_url.clone(),
                contract_address: self.chain_config.contract_address.to_checksum(None),
            },
        }
    }

    pub fn bump_revision(&mut self) {
        self.revision += 1;
    }

    // --- Persistence helpers ---

    fn load_chain_config(dir: &Path) -> ChainConfig {
        let path = dir.join(CHAIN_CONFIG_FILE);
        let config = if path.exists() {
            ChainConfig::load(&path).unwrap_or_else(|e| {
                log::warn!("ignoring {}: {e}", path.display());
                ChainConfig::default()
            })
        } else {
            ChainConfig::default()
        };
        match config.clone().with_env_overrides() {
            Ok(c) => c,
            Err(e) => {
                log::warn!("ignoring chain env overrides: {e}");
                config
            }
        }
    }

    fn save_chain_config(&self, config: &ChainConfig) -> Result<(), StateError> {
        let path = self.app_data_dir.join(CHAIN_CONFIG_FILE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::Persist(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(config).map_err(|e| StateError::Persist(e.to_string()))?;
        fs::write(path, json).map_err(|e| StateError::Persist(e.to_string()))
    }
}
