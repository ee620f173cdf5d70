use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::services::search_service::{FieldAccessor, Searchable};

/// Server-assigned transaction identifier.
pub type TransactionId = i64;

/// Display format for transaction timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

/// A transaction as stored by the server (`GET /transactions/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub category_name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub datetime: DateTime<Utc>,
}

impl TransactionRecord {
    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS` in the given zone.
    pub fn display_datetime_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.datetime.with_timezone(tz).format(DATETIME_FORMAT).to_string()
    }

    /// Timestamp rendered in the machine's local zone.
    pub fn display_datetime(&self) -> String {
        self.display_datetime_in(&chrono::Local)
    }

    /// The editable part of this record, e.g. to prefill the edit dialog.
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            category_name: self.category_name.clone(),
            kind: self.kind,
            amount: self.amount,
            datetime: None,
        }
    }
}

fn category_field(t: &TransactionRecord) -> String {
    t.category_name.clone()
}

fn type_field(t: &TransactionRecord) -> String {
    t.kind.to_string()
}

fn amount_field(t: &TransactionRecord) -> String {
    t.amount.to_string()
}

/// Category, type and amount are searchable.
const SEARCH_FIELDS: &[FieldAccessor<TransactionRecord>] = &[category_field, type_field, amount_field];

impl Searchable for TransactionRecord {
    fn search_fields() -> &'static [FieldAccessor<Self>] {
        SEARCH_FIELDS
    }
}

/// Request body for create (`POST`) and full replace (`PUT`): a record minus its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub category_name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    /// Left to the server when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    pub fn new(category_name: impl Into<String>, kind: TransactionType, amount: Decimal) -> Self {
        Self {
            category_name: category_name.into(),
            kind,
            amount,
            datetime: None,
        }
    }

    /// Local required-field checks. A draft that fails never reaches the network.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.category_name.trim().is_empty() {
            return Err(CoreError::Validation("Please enter category".into()));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(CoreError::Validation("Amount must not be negative".into()));
        }
        Ok(())
    }
}

/// Raw values of the add/edit transaction form, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    pub category_name: String,
    pub kind: TransactionType,
    pub amount: String,
}

impl TransactionForm {
    pub fn new(category_name: impl Into<String>, kind: TransactionType, amount: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
            kind,
            amount: amount.into(),
        }
    }

    /// Parse and validate the form into a draft ready to submit.
    pub fn to_draft(&self) -> Result<TransactionDraft, CoreError> {
        let amount = self.amount.trim();
        if amount.is_empty() {
            return Err(CoreError::Validation("Please enter amount".into()));
        }
        let amount = Decimal::from_str(amount)
            .map_err(|_| CoreError::Validation(format!("Amount '{amount}' is not a number")))?;

        let draft = TransactionDraft::new(self.category_name.trim(), self.kind, amount);
        draft.validate()?;
        Ok(draft)
    }
}

impl From<&TransactionRecord> for TransactionForm {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            category_name: record.category_name.clone(),
            kind: record.kind,
            amount: record.amount.to_string(),
        }
    }
}
