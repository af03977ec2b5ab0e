use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Date as entered in the form: a `YYYY-MM-DD` string, an RFC 3339
/// date-time, a millisecond timestamp, or an already-parsed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Timestamp(i64),
    Date(NaiveDate),
    Text(String),
}

impl DateInput {
    /// Coerce to a calendar day in the local timezone. `None` if unparseable.
    pub fn to_local_date(&self) -> Option<NaiveDate> {
        match self {
            DateInput::Date(d) => Some(*d),
            DateInput::Timestamp(ms) => {
                let utc = DateTime::from_timestamp_millis(*ms)?;
                Some(utc.with_timezone(&Local).date_naive())
            }
            DateInput::Text(s) => parse_date_text(s.trim()),
        }
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    // <input type="datetime-local"> value
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(dt.date());
    }
    None
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

/// Unvalidated contract data as held by the create-contract form.
///
/// Deserialization never fails on a wrong-typed unit, price, date or
/// document code. A non-numeric unit or price becomes `NaN`, an unusable
/// date becomes unparseable text, and non-integer document codes land in
/// `rejected_documents`, so validation reports them per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDraft")]
pub struct ContractDraft {
    pub unit: Option<f64>,
    pub unit_price: Option<f64>,
    pub date: Option<DateInput>,
    pub description: Option<String>,
    pub lot: Option<String>,
    pub documents: Option<Vec<i64>>,
    pub min_days_validity: Option<u32>,
    pub location_delivery: Option<u32>,
    /// Document entries that were not integer codes, as received.
    #[serde(skip)]
    pub rejected_documents: Vec<String>,
}

/// Wire shape of [`ContractDraft`] before type coercion.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawDraft {
    unit: Option<Value>,
    unit_price: Option<Value>,
    date: Option<Value>,
    description: Option<String>,
    #[serde(alias = "lote")]
    lot: Option<String>,
    documents: Option<Value>,
    min_days_validity: Option<u32>,
    location_delivery: Option<u32>,
}

impl From<RawDraft> for ContractDraft {
    fn from(raw: RawDraft) -> Self {
        let mut rejected_documents = Vec::new();
        let documents = raw.documents.map(|value| match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| {
                    let code = item.as_i64();
                    if code.is_none() {
                        rejected_documents.push(item.to_string());
                    }
                    code
                })
                .collect(),
            other => {
                rejected_documents.push(other.to_string());
                Vec::new()
            }
        });
        Self {
            unit: raw.unit.map(lenient_number),
            unit_price: raw.unit_price.map(lenient_number),
            date: raw.date.map(lenient_date),
            description: raw.description,
            lot: raw.lot,
            documents,
            min_days_validity: raw.min_days_validity,
            location_delivery: raw.location_delivery,
            rejected_documents,
        }
    }
}

fn lenient_number(value: Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn lenient_date(value: Value) -> DateInput {
    match serde_json::from_value(value.clone()) {
        Ok(date) => date,
        Err(_) => DateInput::Text(value.to_string()),
    }
}

impl ContractDraft {
    /// Initial form values. The date starts at `today`, which does not pass
    /// validation until the user picks a later day.
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self {
            unit: Some(0.0),
            unit_price: Some(0.01),
            date: Some(DateInput::Date(today)),
            description: Some(String::new()),
            lot: Some(String::new()),
            documents: Some(Vec::new()),
            min_days_validity: None,
            location_delivery: None,
            rejected_documents: Vec::new(),
        }
    }

    pub fn documents(&self) -> &[i64] {
        self.documents.as_deref().unwrap_or(&[])
    }

    /// Append a document code unless it is already selected.
    /// Returns whether the list changed.
    pub fn add_document(&mut self, code: i64) -> bool {
        let docs = self.documents.get_or_insert_with(Vec::new);
        if docs.contains(&code) {
            return false;
        }
        docs.push(code);
        true
    }

    /// Remove a document code. Returns whether the list changed.
    pub fn remove_document(&mut self, code: i64) -> bool {
        let Some(docs) = self.documents.as_mut() else {
            return false;
        };
        let before = docs.len();
        docs.retain(|c| *c != code);
        docs.len() != before
    }
}
