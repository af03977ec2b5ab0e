//! `SellingAgreement` contract interface.

use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

use crate::chain::{DecodedEvent, LogEntry};
use crate::contract::{ContractId, ContractInput};
use crate::error::DecodeError;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface SellingAgreement {
        struct ContractInput {
            string description;
            uint32 units;
            string lote;
            uint256 unitPrice;
            uint256 maxDeliveryDate;
            uint32 minDaysValidity;
            uint32 locationDelivery;
            uint8[] requiredDocuments;
            address warehouseReceiver;
            address seller;
        }

        event ContractCreated(uint256 indexed contractId);

        function createContract(ContractInput calldata input) external returns (uint256 contractId);
    }
}

/// ABI-encoded calldata for `createContract(input)`.
pub fn create_contract_calldata(input: &ContractInput) -> Vec<u8> {
    SellingAgreement::createContractCall {
        input: input.to_abi(),
    }
    .abi_encode()
}

/// Decode a raw log against the contract interface.
pub fn decode_log(log: &LogEntry) -> Result<DecodedEvent, DecodeError> {
    let topic0 = log.topics.first().ok_or(DecodeError::Anonymous)?;
    if *topic0 != SellingAgreement::ContractCreated::SIGNATURE_HASH {
        return Err(DecodeError::UnknownEvent(topic0.to_string()));
    }
    let event = SellingAgreement::ContractCreated::decode_raw_log(
        log.topics.iter().copied(),
        log.data.as_ref(),
    )
    .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    Ok(DecodedEvent::ContractCreated {
        contract_id: ContractId::new(event.contractId),
    })
}
