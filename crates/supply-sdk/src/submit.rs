//! On-chain `createContract` submission.
//!
//! Simulate, sign and send, await the receipt, then pull the contract id out
//! of the first `ContractCreated` log. Nothing is retried. Chain state can
//! change between the simulation and the send, so a call that simulated
//! cleanly may still revert once mined; that case surfaces as
//! [`ConfirmationFailure::Reverted`].

use std::time::Duration;

use crate::chain::{ContractReader, DecodedEvent, Receipt, TransactionSender};
use crate::contract::{ContractId, ContractInput};
use crate::error::{ConfirmationFailure, RpcError, SubmitError};

/// Create the agreement on-chain and return its id.
///
/// The signer is always explicit. Callers that retry after
/// [`SubmitError::Submission`] or a confirmation failure risk a duplicate
/// record and must check the chain first (see [`SubmitError::outcome`]).
pub async fn create_contract_on_chain<R, S>(
    reader: &R,
    signer: &S,
    input: &ContractInput,
    timeout: Duration,
) -> Result<ContractId, SubmitError>
where
    R: ContractReader,
    S: TransactionSender,
{
    let from = signer.address();

    log::debug!("simulating createContract from {from}");
    let prepared = reader
        .simulate_create(input, from)
        .await
        .map_err(|e| SubmitError::Simulation(e.to_string()))?;

    let tx_hash = signer
        .send(prepared)
        .await
        .map_err(|e| SubmitError::Submission(e.to_string()))?;
    log::info!("createContract sent: {tx_hash}");

    let receipt = reader
        .wait_for_receipt(tx_hash, timeout)
        .await
        .map_err(|e| SubmitError::Confirmation {
            tx_hash,
            failure: match e {
                RpcError::Timeout => ConfirmationFailure::Timeout,
                other => ConfirmationFailure::Rpc(other.to_string()),
            },
        })?;
    if !receipt.success {
        log::warn!("createContract {tx_hash} reverted after successful simulation");
        return Err(SubmitError::Confirmation {
            tx_hash,
            failure: ConfirmationFailure::Reverted,
        });
    }

    match find_contract_id(reader, &receipt) {
        Some(id) => {
            log::info!(
                "contract {id} created in block {:?} ({tx_hash})",
                receipt.block_number
            );
            Ok(id)
        }
        None => {
            log::error!(
                "no ContractCreated event in {} log(s) of {tx_hash}; check the contract address and ABI",
                receipt.logs.len()
            );
            Err(SubmitError::EventNotFound {
                tx_hash,
                logs_scanned: receipt.logs.len(),
            })
        }
    }
}

/// First log that decodes as `ContractCreated`. Undecodable logs are skipped.
fn find_contract_id<R: ContractReader>(reader: &R, receipt: &Receipt) -> Option<ContractId> {
    receipt.logs.iter().find_map(|log| match reader.decode_log(log) {
        Ok(DecodedEvent::ContractCreated { contract_id }) => Some(contract_id),
        Err(e) => {
            log::trace!("skipping log from {}: {e}", log.address);
            None
        }
    })
}

/// Run [`create_contract_on_chain`] and hand the outcome to one of two
/// continuations. Returns whatever the chosen continuation returns.
pub async fn submit_contract<R, S, T>(
    reader: &R,
    signer: &S,
    input: &ContractInput,
    timeout: Duration,
    on_success: impl FnOnce(ContractId) -> T,
    on_error: impl FnOnce(SubmitError) -> T,
) -> T
where
    R: ContractReader,
    S: TransactionSender,
{
    match create_contract_on_chain(reader, signer, input, timeout).await {
        Ok(id) => on_success(id),
        Err(e) => on_error(e),
    }
}
