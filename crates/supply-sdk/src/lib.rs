pub mod abi;
pub mod catalog;
pub mod chain;
pub mod config;
pub mod contract;
pub mod draft;
pub mod error;
pub mod evm;
pub mod submit;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod validation;

// Core types
pub use catalog::{DocumentType, DocumentTypeEntry, catalog};
pub use chain::{ContractReader, DecodedEvent, LogEntry, PreparedCall, Receipt, TransactionSender};
pub use config::ChainConfig;
pub use contract::{ContractId, ContractInput, Parties};
pub use draft::{ContractDraft, DateInput};
pub use error::{
    ConfigError, ConfirmationFailure, DecodeError, Field, RpcError, SideEffect, SubmitError,
    ValidationErrors,
};
pub use evm::{EvmClient, EvmSigner};
pub use submit::{create_contract_on_chain, submit_contract};
pub use validation::{UnitPrice, ValidatedContract, validate, validate_now};

// Re-export alloy for app-layer use
pub use alloy;
