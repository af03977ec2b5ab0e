//! Boundary to the external RPC / wallet library.
//!
//! [`ContractReader`] covers the read side (dry-run, receipt lookup, log
//! decoding) and [`TransactionSender`] the signing identity. The submission
//! flow only talks to these traits, so it runs unchanged against a live node
//! or a scripted mock.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, TxHash};

use crate::contract::{ContractId, ContractInput};
use crate::error::{DecodeError, RpcError};

/// A raw log as found in a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` if execution reverted.
    pub success: bool,
    pub logs: Vec<LogEntry>,
}

/// A simulated call, ready to be signed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub from: Address,
    pub to: Address,
    pub calldata: Bytes,
    pub gas_limit: Option<u64>,
}

/// Events of the contract interface this crate understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    ContractCreated { contract_id: ContractId },
}

pub trait ContractReader {
    /// Dry-run `createContract(input)` as `from`.
    fn simulate_create(
        &self,
        input: &ContractInput,
        from: Address,
    ) -> impl Future<Output = Result<PreparedCall, RpcError>> + Send;

    /// Wait until `tx_hash` is included in a block, for at most `timeout`.
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> impl Future<Output = Result<Receipt, RpcError>> + Send;

    fn decode_log(&self, log: &LogEntry) -> Result<DecodedEvent, DecodeError> {
        crate::abi::decode_log(log)
    }
}

/// An account able to authorize transactions.
pub trait TransactionSender {
    fn address(&self) -> Address;

    /// Sign and broadcast. Resolves once the node accepted the transaction.
    fn send(
        &self,
        call: PreparedCall,
    ) -> impl Future<Output = Result<TxHash, RpcError>> + Send;
}
