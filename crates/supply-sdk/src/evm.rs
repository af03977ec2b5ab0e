//! JSON-RPC implementation of the chain boundary on top of `alloy`.

use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError as TransportError, TransportErrorKind};

use crate::abi;
use crate::chain::{ContractReader, LogEntry, PreparedCall, Receipt, TransactionSender};
use crate::config::ChainConfig;
use crate::contract::ContractInput;
use crate::error::{ConfigError, RpcError};

/// Read-side client bound to one `SellingAgreement` deployment.
pub struct EvmClient {
    provider: DynProvider,
    contract: Address,
    poll_interval: Duration,
}

impl EvmClient {
    pub fn new(config: &ChainConfig) -> Result<Self, ConfigError> {
        let provider = ProviderBuilder::new().connect_http(config.rpc_url()?);
        Ok(Self::with_provider(
            provider,
            config.contract_address,
            config.poll_interval(),
        ))
    }

    /// Bind to an already-connected provider.
    pub fn with_provider(
        provider: impl Provider + 'static,
        contract: Address,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider: provider.erased(),
            contract,
            poll_interval,
        }
    }
}

impl ContractReader for EvmClient {
    async fn simulate_create(
        &self,
        input: &ContractInput,
        from: Address,
    ) -> Result<PreparedCall, RpcError> {
        let calldata = Bytes::from(abi::create_contract_calldata(input));
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.contract)
            .with_input(calldata.clone());

        self.provider.call(tx.clone()).await.map_err(call_error)?;
        let gas_limit = self.provider.estimate_gas(tx).await.map_err(call_error)?;

        Ok(PreparedCall {
            from,
            to: self.contract,
            calldata,
            gas_limit: Some(gas_limit),
        })
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Receipt, RpcError> {
        let poll = async {
            let mut ticker = tokio::time::interval(self.poll_interval);
            loop {
                ticker.tick().await;
                match self.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return to_receipt(receipt),
                    Ok(None) => {}
                    Err(e) => log::warn!("receipt poll for {tx_hash} failed: {e}"),
                }
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| RpcError::Timeout)
    }
}

/// A local private key wrapped in a signing HTTP provider.
pub struct EvmSigner {
    provider: DynProvider,
    address: Address,
}

impl EvmSigner {
    pub fn new(signer: PrivateKeySigner, config: &ChainConfig) -> Result<Self, ConfigError> {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(config.rpc_url()?)
            .erased();
        Ok(Self { provider, address })
    }

    pub fn from_private_key(key: &str, config: &ChainConfig) -> Result<Self, ConfigError> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| ConfigError::PrivateKey(format!("{e}")))?;
        Self::new(signer, config)
    }
}

impl TransactionSender for EvmSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send(&self, call: PreparedCall) -> Result<TxHash, RpcError> {
        let mut tx = TransactionRequest::default()
            .with_from(call.from)
            .with_to(call.to)
            .with_input(call.calldata);
        if let Some(gas) = call.gas_limit {
            tx = tx.with_gas_limit(gas);
        }
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(*pending.tx_hash())
    }
}

/// Node error responses (reverts, failed estimation) keep their message and
/// any revert data; everything else is a transport failure.
fn call_error(e: TransportError<TransportErrorKind>) -> RpcError {
    let Some(payload) = e.as_error_resp() else {
        return RpcError::Transport(e.to_string());
    };
    match payload.data.as_ref().map(|d| d.get().trim_matches('"')) {
        Some(data) if !data.is_empty() && data != "null" => {
            RpcError::Revert(format!("{} (data: {data})", payload.message))
        }
        _ => RpcError::Revert(payload.message.to_string()),
    }
}

fn to_receipt(receipt: TransactionReceipt) -> Receipt {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| LogEntry {
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
        })
        .collect();
    Receipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        success: receipt.status(),
        logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, U256, address, b256};
    use alloy::providers::mock::Asserter;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::sol_types::SolEvent;
    use serde_json::json;
    use serde_json::value::RawValue;

    use crate::abi::SellingAgreement;
    use crate::chain::DecodedEvent;
    use crate::contract::ContractId;
    use crate::testing::sample_contract_input;

    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const FROM: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const TX: TxHash = b256!("1111111111111111111111111111111111111111111111111111111111111111");

    fn mocked_client(asserter: &Asserter, poll_interval: Duration) -> EvmClient {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        EvmClient::with_provider(provider, CONTRACT, poll_interval)
    }

    fn revert_payload(message: &'static str, data: Option<&str>) -> ErrorPayload {
        ErrorPayload {
            code: 3,
            message: message.into(),
            data: data.map(|d| RawValue::from_string(format!("\"{d}\"")).unwrap()),
        }
    }

    fn receipt_json(status: &str, logs: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x3d090",
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "logs": logs,
            "transactionHash": TX,
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0x22),
            "blockNumber": "0x7",
            "gasUsed": "0x3d090",
            "effectiveGasPrice": "0x3b9aca00",
            "from": FROM,
            "to": CONTRACT,
            "contractAddress": null
        })
    }

    fn log_json(address: Address, topics: Vec<B256>, data: &str) -> serde_json::Value {
        json!({
            "address": address,
            "topics": topics,
            "data": data,
            "blockHash": B256::repeat_byte(0x22),
            "blockNumber": "0x7",
            "transactionHash": TX,
            "transactionIndex": "0x0",
            "logIndex": "0x0",
            "removed": false
        })
    }

    #[tokio::test]
    async fn simulation_returns_gas_estimate() {
        let asserter = Asserter::new();
        asserter.push_success(&"0x0000000000000000000000000000000000000000000000000000000000000001");
        asserter.push_success(&"0x3d090");
        let client = mocked_client(&asserter, Duration::from_millis(5));

        let prepared = client
            .simulate_create(&sample_contract_input(), FROM)
            .await
            .unwrap();
        assert_eq!(prepared.from, FROM);
        assert_eq!(prepared.to, CONTRACT);
        assert_eq!(prepared.gas_limit, Some(250_000));
        assert_eq!(
            prepared.calldata.to_vec(),
            abi::create_contract_calldata(&sample_contract_input())
        );
    }

    #[tokio::test]
    async fn node_error_response_is_a_revert_with_its_message() {
        let asserter = Asserter::new();
        asserter.push_failure(revert_payload("execution reverted: contract paused", None));
        let client = mocked_client(&asserter, Duration::from_millis(5));

        let err = client
            .simulate_create(&sample_contract_input(), FROM)
            .await
            .unwrap_err();
        match err {
            RpcError::Revert(msg) => assert_eq!(msg, "execution reverted: contract paused"),
            other => panic!("expected Revert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn custom_error_revert_keeps_its_data() {
        let asserter = Asserter::new();
        asserter.push_failure(revert_payload("execution reverted", Some("0x1f2a2005")));
        let client = mocked_client(&asserter, Duration::from_millis(5));

        let err = client
            .simulate_create(&sample_contract_input(), FROM)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "execution reverted (data: 0x1f2a2005)");
    }

    #[tokio::test]
    async fn receipt_logs_become_log_entries() {
        let asserter = Asserter::new();
        let id_topic = B256::from(U256::from(42));
        let logs = json!([
            log_json(FROM, vec![B256::repeat_byte(0xaa)], "0x01"),
            log_json(CONTRACT, vec![SellingAgreement::ContractCreated::SIGNATURE_HASH, id_topic], "0x"),
        ]);
        // Not mined yet on the first poll.
        asserter.push_success(&serde_json::Value::Null);
        asserter.push_success(&receipt_json("0x1", logs));
        let client = mocked_client(&asserter, Duration::from_millis(5));

        let receipt = client
            .wait_for_receipt(TX, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(receipt.tx_hash, TX);
        assert_eq!(receipt.block_number, Some(7));
        assert!(receipt.success);
        assert_eq!(receipt.logs.len(), 2);
        assert_eq!(receipt.logs[0].address, FROM);
        assert_eq!(receipt.logs[0].data.to_vec(), vec![0x01]);
        assert_eq!(
            receipt.logs[1].topics,
            vec![SellingAgreement::ContractCreated::SIGNATURE_HASH, id_topic]
        );
        assert_eq!(
            client.decode_log(&receipt.logs[1]).unwrap(),
            DecodedEvent::ContractCreated {
                contract_id: ContractId::from(42)
            }
        );
    }

    #[tokio::test]
    async fn reverted_receipt_reports_failure() {
        let asserter = Asserter::new();
        asserter.push_success(&receipt_json("0x0", json!([])));
        let client = mocked_client(&asserter, Duration::from_millis(5));

        let receipt = client
            .wait_for_receipt(TX, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!receipt.success);
        assert!(receipt.logs.is_empty());
    }

    #[tokio::test]
    async fn unmined_transaction_times_out() {
        let asserter = Asserter::new();
        for _ in 0..200 {
            asserter.push_success(&serde_json::Value::Null);
        }
        let client = mocked_client(&asserter, Duration::from_millis(5));

        let err = client
            .wait_for_receipt(TX, Duration::from_millis(60))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Timeout));
    }
}
