//! Scripted chain backend and fixtures for exercising the submission flow
//! without a node.

use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, TxHash, U256};
use alloy::sol_types::SolEvent;
use chrono::NaiveDate;

use crate::abi::SellingAgreement;
use crate::chain::{
    ContractReader, DecodedEvent, LogEntry, PreparedCall, Receipt, TransactionSender,
};
use crate::contract::{ContractInput, Parties};
use crate::draft::{ContractDraft, DateInput};
use crate::error::{DecodeError, RpcError};
use crate::validation;

pub const MOCK_TX_HASH: TxHash = B256::repeat_byte(0x7e);
pub const MOCK_SENDER: Address = Address::repeat_byte(0x5e);
pub const MOCK_CONTRACT: Address = Address::repeat_byte(0xc0);

/// Capability calls in the order the mock observed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Simulate,
    Send,
    WaitForReceipt,
    Decode,
}

enum ReceiptScript {
    Mined { success: bool, logs: Vec<LogEntry> },
    Timeout,
    Error(String),
}

/// In-memory stand-in for both the RPC endpoint and the signing identity.
pub struct MockChain {
    calls: Mutex<Vec<Call>>,
    simulate_revert: Option<String>,
    send_error: Option<String>,
    receipt: ReceiptScript,
    sent: Mutex<Vec<PreparedCall>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            simulate_revert: None,
            send_error: None,
            receipt: ReceiptScript::Mined {
                success: true,
                logs: Vec::new(),
            },
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockChain {
    /// Mines successfully with the given receipt logs.
    pub fn with_logs(logs: Vec<LogEntry>) -> Self {
        Self {
            receipt: ReceiptScript::Mined {
                success: true,
                logs,
            },
            ..Default::default()
        }
    }

    pub fn reverting_simulation(reason: &str) -> Self {
        Self {
            simulate_revert: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_send(message: &str) -> Self {
        Self {
            send_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn reverting_on_chain() -> Self {
        Self {
            receipt: ReceiptScript::Mined {
                success: false,
                logs: Vec::new(),
            },
            ..Default::default()
        }
    }

    pub fn never_mined() -> Self {
        Self {
            receipt: ReceiptScript::Timeout,
            ..Default::default()
        }
    }

    pub fn receipt_error(message: &str) -> Self {
        Self {
            receipt: ReceiptScript::Error(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<PreparedCall> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ContractReader for MockChain {
    async fn simulate_create(
        &self,
        input: &ContractInput,
        from: Address,
    ) -> Result<PreparedCall, RpcError> {
        self.record(Call::Simulate);
        if let Some(reason) = &self.simulate_revert {
            return Err(RpcError::Revert(reason.clone()));
        }
        Ok(PreparedCall {
            from,
            to: MOCK_CONTRACT,
            calldata: Bytes::from(crate::abi::create_contract_calldata(input)),
            gas_limit: Some(250_000),
        })
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        _timeout: Duration,
    ) -> Result<Receipt, RpcError> {
        self.record(Call::WaitForReceipt);
        match &self.receipt {
            ReceiptScript::Mined { success, logs } => Ok(Receipt {
                tx_hash,
                block_number: Some(1),
                success: *success,
                logs: logs.clone(),
            }),
            ReceiptScript::Timeout => Err(RpcError::Timeout),
            ReceiptScript::Error(e) => Err(RpcError::Transport(e.clone())),
        }
    }

    fn decode_log(&self, log: &LogEntry) -> Result<DecodedEvent, DecodeError> {
        self.record(Call::Decode);
        crate::abi::decode_log(log)
    }
}

impl TransactionSender for MockChain {
    fn address(&self) -> Address {
        MOCK_SENDER
    }

    async fn send(&self, call: PreparedCall) -> Result<TxHash, RpcError> {
        self.record(Call::Send);
        if let Some(e) = &self.send_error {
            return Err(RpcError::Transport(e.clone()));
        }
        self.sent.lock().unwrap().push(call);
        Ok(MOCK_TX_HASH)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A `ContractCreated(contractId)` log emitted by the mock contract.
pub fn contract_created_log(contract_id: u64) -> LogEntry {
    let data = SellingAgreement::ContractCreated {
        contractId: U256::from(contract_id),
    }
    .encode_log_data();
    LogEntry {
        address: MOCK_CONTRACT,
        topics: data.topics().to_vec(),
        data: data.data.clone(),
    }
}

/// A log that does not belong to the contract interface.
pub fn unrelated_log(seed: u8) -> LogEntry {
    LogEntry {
        address: Address::repeat_byte(seed),
        topics: vec![B256::repeat_byte(seed), B256::repeat_byte(seed.wrapping_add(1))],
        data: Bytes::from(vec![seed; 64]),
    }
}

pub fn test_parties() -> Parties {
    Parties {
        warehouse_receiver: Address::repeat_byte(0x0a),
        seller: Address::repeat_byte(0x0b),
    }
}

/// Draft that passes validation on `today`.
pub fn sample_draft(today: NaiveDate) -> ContractDraft {
    ContractDraft {
        unit: Some(10.0),
        unit_price: Some(0.01),
        date: today.succ_opt().map(DateInput::Date),
        description: Some("Green coffee, 60kg bags".to_string()),
        lot: Some("LOT-2030-07".to_string()),
        documents: Some(vec![1]),
        ..Default::default()
    }
}

pub fn sample_contract_input() -> ContractInput {
    let today = NaiveDate::from_ymd_opt(2030, 6, 15).expect("valid date");
    let validated = validation::validate(&sample_draft(today), today).expect("valid draft");
    ContractInput::new(validated, test_parties())
}
