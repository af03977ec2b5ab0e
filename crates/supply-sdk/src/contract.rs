use alloy::primitives::{Address, U256};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::abi::SellingAgreement;
use crate::catalog::DocumentType;
use crate::validation::ValidatedContract;

/// Identifier assigned by the `SellingAgreement` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(U256);

impl ContractId {
    pub fn new(id: U256) -> Self {
        Self(id)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for ContractId {
    fn from(id: u64) -> Self {
        Self(U256::from(id))
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Decimal string: ids can exceed what a JS number holds exactly.
impl Serialize for ContractId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Counterparties of the agreement. Always supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parties {
    pub warehouse_receiver: Address,
    pub seller: Address,
}

/// Contract arguments in the chain's encoding, ready for `createContract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInput {
    pub description: String,
    pub units: u32,
    pub lot: String,
    /// Hundredths of the currency unit.
    pub unit_price: U256,
    /// Unix seconds at 00:00 UTC of the delivery day.
    pub max_delivery_date: U256,
    pub min_days_validity: u32,
    pub location_delivery: u32,
    pub required_documents: Vec<u8>,
    pub warehouse_receiver: Address,
    pub seller: Address,
}

impl ContractInput {
    pub fn new(validated: ValidatedContract, parties: Parties) -> Self {
        Self {
            description: validated.description,
            units: validated.units,
            lot: validated.lot,
            unit_price: U256::from(validated.unit_price.cents()),
            max_delivery_date: U256::from(day_start_unix(validated.delivery_date)),
            min_days_validity: validated.min_days_validity,
            location_delivery: validated.location_delivery,
            required_documents: validated.documents.iter().map(|d| d.code()).collect(),
            warehouse_receiver: parties.warehouse_receiver,
            seller: parties.seller,
        }
    }

    pub fn documents(&self) -> impl Iterator<Item = DocumentType> + '_ {
        self.required_documents
            .iter()
            .filter_map(|c| DocumentType::from_code(i64::from(*c)))
    }

    pub fn to_abi(&self) -> SellingAgreement::ContractInput {
        SellingAgreement::ContractInput {
            description: self.description.clone(),
            units: self.units,
            lote: self.lot.clone(),
            unitPrice: self.unit_price,
            maxDeliveryDate: self.max_delivery_date,
            minDaysValidity: self.min_days_validity,
            locationDelivery: self.location_delivery,
            requiredDocuments: self.required_documents.clone(),
            warehouseReceiver: self.warehouse_receiver,
            seller: self.seller,
        }
    }
}

fn day_start_unix(date: NaiveDate) -> u64 {
    let secs = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    u64::try_from(secs).unwrap_or(0)
}
