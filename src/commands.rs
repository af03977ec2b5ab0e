use std::sync::Mutex;

use serde::Serialize;
use supply_sdk::alloy::primitives::Address;
use supply_sdk::{
    ChainConfig, ConfigError, ContractDraft, ContractId, ContractInput, DocumentTypeEntry,
    EvmClient, EvmSigner, Parties, SideEffect, SubmitError, ValidatedContract, ValidationErrors,
};
use tauri::{AppHandle, Emitter, State};

use crate::state::{AppState, AppStateManager, StateError};
use crate::users::UserSummary;

pub const CONTRACT_CREATED_EVENT: &str = "contract_created";
pub const CONTRACT_FAILED_EVENT: &str = "contract_failed";
pub const APP_STATE_UPDATED_EVENT: &str = "app_state_updated";

// ============================================================================
// Error payload
// ============================================================================

/// Error returned to the webview. `kind` lets the UI pick between inline
/// field messages and a blocking alert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effect: Option<SideEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl CommandError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            side_effect: None,
            tx_hash: None,
        }
    }
}

impl From<ValidationErrors> for CommandError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            fields: Some(errors.clone()),
            ..Self::new("validation", errors.to_string())
        }
    }
}

impl From<SubmitError> for CommandError {
    fn from(e: SubmitError) -> Self {
        Self {
            side_effect: Some(e.outcome()),
            tx_hash: e.tx_hash().map(|h| h.to_string()),
            ..Self::new(e.kind(), e.to_string())
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        Self::new("config", e.to_string())
    }
}

impl From<StateError> for CommandError {
    fn from(e: StateError) -> Self {
        Self::new("state", e.to_string())
    }
}

fn lock_failed() -> CommandError {
    CommandError::new("state", "state lock failed")
}

fn parse_address(label: &str, value: &str) -> Result<Address, CommandError> {
    value
        .trim()
        .parse()
        .map_err(|e| CommandError::new("invalid_address", format!("invalid {label} address: {e}")))
}

/// Counterparty addresses as typed by the caller.
pub fn parse_parties(warehouse_receiver: &str, seller: &str) -> Result<Parties, CommandError> {
    Ok(Parties {
        warehouse_receiver: parse_address("warehouse receiver", warehouse_receiver)?,
        seller: parse_address("seller", seller)?,
    })
}

fn emit_state(app: &AppHandle, state: &AppState) {
    let _ = app.emit(APP_STATE_UPDATED_EVENT, state);
}

// ============================================================================
// Form commands
// ============================================================================

#[tauri::command]
pub fn list_document_types() -> Vec<DocumentTypeEntry> {
    supply_sdk::catalog()
}

#[tauri::command]
pub fn new_contract_draft() -> ContractDraft {
    ContractDraft::with_defaults(chrono::Local::now().date_naive())
}

#[tauri::command]
pub fn add_draft_document(mut draft: ContractDraft, code: i64) -> ContractDraft {
    draft.add_document(code);
    draft
}

#[tauri::command]
pub fn remove_draft_document(mut draft: ContractDraft, code: i64) -> ContractDraft {
    draft.remove_document(code);
    draft
}

#[tauri::command]
pub fn validate_contract_draft(draft: ContractDraft) -> Result<ValidatedContract, CommandError> {
    Ok(supply_sdk::validate_now(&draft)?)
}

// ============================================================================
// User commands
// ============================================================================

#[tauri::command]
pub fn get_app_state(state: State<'_, Mutex<AppStateManager>>) -> Result<AppState, CommandError> {
    let mgr = state.lock().map_err(|_| lock_failed())?;
    Ok(mgr.snapshot())
}

#[tauri::command]
pub fn list_users(state: State<'_, Mutex<AppStateManager>>) -> Result<Vec<UserSummary>, CommandError> {
    let mgr = state.lock().map_err(|_| lock_failed())?;
    Ok(mgr.users())
}

#[tauri::command]
pub fn get_current_user(
    state: State<'_, Mutex<AppStateManager>>,
) -> Result<Option<UserSummary>, CommandError> {
    let mgr = state.lock().map_err(|_| lock_failed())?;
    Ok(mgr.current_user().map(|u| u.summary()))
}

#[tauri::command]
pub fn set_current_user(
    id: u32,
    state: State<'_, Mutex<AppStateManager>>,
    app: AppHandle,
) -> Result<UserSummary, CommandError> {
    let mut mgr = state.lock().map_err(|_| lock_failed())?;
    let summary = mgr.select_user(id)?;
    log::info!("current user: {} ({})", summary.name, summary.address);
    emit_state(&app, &mgr.snapshot());
    Ok(summary)
}

// ============================================================================
// Chain commands
// ============================================================================

#[tauri::command]
pub fn get_chain_config(state: State<'_, Mutex<AppStateManager>>) -> Result<ChainConfig, CommandError> {
    let mgr = state.lock().map_err(|_| lock_failed())?;
    Ok(mgr.chain_config().clone())
}

#[tauri::command]
pub fn set_chain_config(
    config: ChainConfig,
    state: State<'_, Mutex<AppStateManager>>,
    app: AppHandle,
) -> Result<AppState, CommandError> {
    let mut mgr = state.lock().map_err(|_| lock_failed())?;
    let snapshot = mgr.set_chain_config(config)?;
    emit_state(&app, &snapshot);
    Ok(snapshot)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCreated {
    pub contract_id: ContractId,
    pub submitted_by: String,
    pub input: ContractInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractFailed<'a> {
    error: &'a CommandError,
}

/// Validate the draft and create it on-chain as the currently selected user.
///
/// The draft is rejected before any RPC traffic if validation fails. The
/// outcome is also broadcast as a `contract_created` / `contract_failed` event.
#[tauri::command]
pub async fn create_contract_onchain(
    draft: ContractDraft,
    warehouse_receiver: String,
    seller: String,
    state: State<'_, Mutex<AppStateManager>>,
    app: AppHandle,
) -> Result<ContractCreated, CommandError> {
    let validated = supply_sdk::validate_now(&draft)?;
    let parties = parse_parties(&warehouse_receiver, &seller)?;
    let input = ContractInput::new(validated, parties);

    let (signer_key, config) = {
        let mgr = state.lock().map_err(|_| lock_failed())?;
        let user = mgr.require_current_user()?;
        (user.signer().clone(), mgr.chain_config().clone())
    };

    let client = EvmClient::new(&config)?;
    let signer = EvmSigner::new(signer_key, &config)?;
    let submitted_by = supply_sdk::TransactionSender::address(&signer).to_checksum(None);
    log::info!(
        "creating contract as {submitted_by} on {} ({} units at {})",
        config.rpc_url,
        input.units,
        input.unit_price
    );

    supply_sdk::submit_contract(
        &client,
        &signer,
        &input,
        config.confirmation_timeout(),
        |contract_id| {
            let created = ContractCreated {
                contract_id,
                submitted_by,
                input: input.clone(),
            };
            let _ = app.emit(CONTRACT_CREATED_EVENT, &created);
            Ok(created)
        },
        |e| {
            log::error!("contract submission failed: {e}");
            let error = CommandError::from(e);
            let _ = app.emit(CONTRACT_FAILED_EVENT, ContractFailed { error: &error });
            Err(error)
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use supply_sdk::testing::{MOCK_TX_HASH, sample_draft};
    use supply_sdk::{ConfirmationFailure, Field, validate};

    #[test]
    fn validation_error_payload_carries_fields() {
        let today = chrono::NaiveDate::from_ymd_opt(2030, 6, 15).unwrap();
        let draft = ContractDraft {
            unit_price: Some(0.001),
            ..sample_draft(today)
        };
        let errs = validate(&draft, today).unwrap_err();
        let payload = serde_json::to_value(CommandError::from(errs)).unwrap();
        assert_eq!(payload["kind"], "validation");
        assert_eq!(
            payload["fields"][Field::UnitPrice.as_str()],
            supply_sdk::validation::MSG_PRICE_DECIMALS
        );
        assert!(payload.get("sideEffect").is_none());
    }

    #[test]
    fn wrong_typed_form_values_come_back_as_fields() {
        let draft: ContractDraft = serde_json::from_value(serde_json::json!({
            "unit": "ten",
            "unitPrice": 2.5,
            "date": "2999-01-01",
            "documents": [2, "bill"],
        }))
        .unwrap();
        let err = validate_contract_draft(draft).unwrap_err();
        assert_eq!(err.kind, "validation");
        let fields = err.fields.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get(Field::Unit), Some(supply_sdk::validation::MSG_NOT_A_NUMBER));
        assert_eq!(
            fields.get(Field::Documents),
            Some(supply_sdk::validation::MSG_INVALID_DOCUMENT)
        );
    }

    #[test]
    fn submit_error_payload_is_inspectable() {
        let err = SubmitError::Confirmation {
            tx_hash: MOCK_TX_HASH,
            failure: ConfirmationFailure::Timeout,
        };
        let payload = serde_json::to_value(CommandError::from(err)).unwrap();
        assert_eq!(payload["kind"], "confirmation");
        assert_eq!(payload["sideEffect"], "unknown");
        assert_eq!(payload["txHash"], MOCK_TX_HASH.to_string());

        let sim = CommandError::from(SubmitError::Simulation("paused".into()));
        assert_eq!(sim.kind, "simulation");
        assert_eq!(sim.side_effect, Some(SideEffect::None));
        assert!(sim.tx_hash.is_none());
    }

    #[test]
    fn parties_must_be_addresses() {
        let ok = parse_parties(
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            " 0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC ",
        )
        .unwrap();
        assert_eq!(ok.seller.to_checksum(None), "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

        let err = parse_parties("warehouse", "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC").unwrap_err();
        assert_eq!(err.kind, "invalid_address");
        assert!(err.message.contains("warehouse receiver"));
    }

    #[test]
    fn draft_document_commands() {
        let draft = add_draft_document(ContractDraft::default(), 2);
        let draft = add_draft_document(draft, 2);
        let draft = remove_draft_document(draft, 4);
        assert_eq!(draft.documents(), &[2]);
        assert_eq!(list_document_types().len(), 4);
    }
}
