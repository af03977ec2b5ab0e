use std::collections::BTreeMap;

use alloy::primitives::TxHash;
use serde::Serialize;
use thiserror::Error;

/// Draft fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Unit,
    UnitPrice,
    Date,
    Documents,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Unit => "unit",
            Field::UnitPrice => "unitPrice",
            Field::Date => "date",
            Field::Documents => "documents",
        }
    }
}

/// Field-level validation failures, one message per field, in form order.
///
/// Serializes as a plain `{ "field": "message" }` object so the frontend can
/// render each message next to its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid contract draft")?;
        let mut sep = ": ";
        for (field, message) in self.iter() {
            write!(f, "{sep}{}: {message}", field.as_str())?;
            sep = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors returned by the external RPC/wallet capability.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Node error response, message kept verbatim.
    #[error("{0}")]
    Revert(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out")]
    Timeout,
}

/// Failure to decode a log entry against the contract interface.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("log has no topics")]
    Anonymous,

    #[error("log topic {0} is not an event of this interface")]
    UnknownEvent(String),

    #[error("malformed event data: {0}")]
    Malformed(String),
}

/// Why a sent transaction did not yield a usable receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum ConfirmationFailure {
    Timeout,
    Reverted,
    Rpc(String),
}

impl std::fmt::Display for ConfirmationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationFailure::Timeout => write!(f, "timed out waiting for inclusion"),
            ConfirmationFailure::Reverted => write!(f, "reverted on-chain"),
            ConfirmationFailure::Rpc(e) => write!(f, "{e}"),
        }
    }
}

/// Whether a failed submission may have changed chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Nothing was broadcast; resubmitting is safe.
    None,
    /// A transaction may or may not be on-chain; query the chain before resubmitting.
    Unknown,
    /// The transaction was mined.
    Committed,
}

/// Errors produced by the contract submission flow.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("simulation failed: {0}")]
    Simulation(String),

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("confirmation failed for {tx_hash}: {failure}")]
    Confirmation {
        tx_hash: TxHash,
        failure: ConfirmationFailure,
    },

    #[error("ContractCreated event not found in {logs_scanned} log(s) of {tx_hash}")]
    EventNotFound { tx_hash: TxHash, logs_scanned: usize },
}

impl SubmitError {
    pub fn outcome(&self) -> SideEffect {
        match self {
            SubmitError::Simulation(_) => SideEffect::None,
            SubmitError::Submission(_) => SideEffect::Unknown,
            SubmitError::Confirmation {
                failure: ConfirmationFailure::Reverted,
                ..
            } => SideEffect::Committed,
            SubmitError::Confirmation { .. } => SideEffect::Unknown,
            SubmitError::EventNotFound { .. } => SideEffect::Committed,
        }
    }

    /// Transaction hash, once the transaction has been handed to the network.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            SubmitError::Confirmation { tx_hash, .. } | SubmitError::EventNotFound { tx_hash, .. } => {
                Some(*tx_hash)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Simulation(_) => "simulation",
            SubmitError::Submission(_) => "submission",
            SubmitError::Confirmation { .. } => "confirmation",
            SubmitError::EventNotFound { .. } => "event_not_found",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rpc url: {0}")]
    RpcUrl(String),

    #[error("invalid contract address: {0}")]
    ContractAddress(String),

    #[error("invalid private key: {0}")]
    PrivateKey(String),

    #[error("config file error: {0}")]
    File(String),
}
