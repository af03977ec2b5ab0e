//! Client-side rules for the create-contract form.
//!
//! Every field is checked independently so a single pass reports all
//! problems. Within a field only the first failing rule is reported.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::catalog::DocumentType;
use crate::draft::ContractDraft;
use crate::error::{Field, ValidationErrors};

pub const MSG_NOT_A_NUMBER: &str = "Must be a number.";
pub const MSG_NOT_INTEGER: &str = "Must be a whole number.";
pub const MSG_NEGATIVE: &str = "Must be 0 or a positive value.";
pub const MSG_UNIT_TOO_LARGE: &str = "Exceeds the maximum number of units.";
pub const MSG_PRICE_MINIMUM: &str = "Price must be at least 0.01.";
pub const MSG_PRICE_DECIMALS: &str = "Price cannot have more than two decimal places.";
pub const MSG_PRICE_TOO_LARGE: &str = "Price exceeds the supported maximum.";
pub const MSG_INVALID_DATE: &str = "Must be a valid date.";
pub const MSG_DATE_NOT_FUTURE: &str = "Date must be later than today.";
pub const MSG_INVALID_DOCUMENT: &str = "Document codes must be whole numbers.";

/// Price in hundredths of the currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitPrice {
    cents: u64,
}

impl UnitPrice {
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn cents(self) -> u64 {
        self.cents
    }
}

impl std::fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// A draft that passed every rule, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedContract {
    pub units: u32,
    pub unit_price: UnitPrice,
    pub delivery_date: NaiveDate,
    pub description: String,
    pub lot: String,
    pub documents: Vec<DocumentType>,
    pub min_days_validity: u32,
    pub location_delivery: u32,
}

/// Validate against the local calendar day.
pub fn validate_now(draft: &ContractDraft) -> Result<ValidatedContract, ValidationErrors> {
    validate(draft, Local::now().date_naive())
}

pub fn validate(
    draft: &ContractDraft,
    today: NaiveDate,
) -> Result<ValidatedContract, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let units = check_unit(draft.unit).map_err(|m| errors.add(Field::Unit, m)).ok();
    let unit_price = check_unit_price(draft.unit_price)
        .map_err(|m| errors.add(Field::UnitPrice, m))
        .ok();
    let delivery_date = check_date(draft, today)
        .map_err(|m| errors.add(Field::Date, m))
        .ok();
    let documents = check_documents(draft)
        .map_err(|m| errors.add(Field::Documents, m))
        .ok();

    match (units, unit_price, delivery_date, documents) {
        (Some(units), Some(unit_price), Some(delivery_date), Some(documents))
            if errors.is_empty() =>
        {
            Ok(ValidatedContract {
                units,
                unit_price,
                delivery_date,
                description: draft.description.clone().unwrap_or_default(),
                lot: draft.lot.clone().unwrap_or_default(),
                documents,
                min_days_validity: draft.min_days_validity.unwrap_or(0),
                location_delivery: draft.location_delivery.unwrap_or(0),
            })
        }
        _ => Err(errors),
    }
}

fn check_unit(unit: Option<f64>) -> Result<u32, String> {
    let value = unit
        .filter(|v| v.is_finite())
        .ok_or(MSG_NOT_A_NUMBER)?;
    if value.fract() != 0.0 {
        return Err(MSG_NOT_INTEGER.into());
    }
    if value < 0.0 {
        return Err(MSG_NEGATIVE.into());
    }
    if value > f64::from(u32::MAX) {
        return Err(MSG_UNIT_TOO_LARGE.into());
    }
    Ok(value as u32)
}

fn check_unit_price(price: Option<f64>) -> Result<UnitPrice, String> {
    let value = price
        .filter(|v| v.is_finite())
        .ok_or(MSG_NOT_A_NUMBER)?;
    // Shortest round-trip rendering, never exponent notation.
    let rendered = value.to_string();
    let (whole, frac) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    if frac.len() > 2 {
        return Err(MSG_PRICE_DECIMALS.into());
    }
    if value < 0.01 {
        return Err(MSG_PRICE_MINIMUM.into());
    }
    let whole: u64 = whole.parse().map_err(|_| MSG_PRICE_TOO_LARGE)?;
    let frac: u64 = format!("{frac:0<2}").parse().map_err(|_| MSG_PRICE_TOO_LARGE)?;
    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or(MSG_PRICE_TOO_LARGE)?;
    Ok(UnitPrice::from_cents(cents))
}

fn check_date(draft: &ContractDraft, today: NaiveDate) -> Result<NaiveDate, String> {
    let date = draft
        .date
        .as_ref()
        .and_then(|d| d.to_local_date())
        .ok_or(MSG_INVALID_DATE)?;
    if date <= today {
        return Err(MSG_DATE_NOT_FUTURE.into());
    }
    Ok(date)
}

fn check_documents(draft: &ContractDraft) -> Result<Vec<DocumentType>, String> {
    if !draft.rejected_documents.is_empty() {
        return Err(MSG_INVALID_DOCUMENT.into());
    }
    let codes = draft.documents();
    let mut documents = Vec::with_capacity(codes.len());
    for &code in codes {
        let doc = DocumentType::from_code(code)
            .ok_or_else(|| format!("Unknown document type: {code}."))?;
        if !documents.contains(&doc) {
            documents.push(doc);
        }
    }
    Ok(documents)
}
