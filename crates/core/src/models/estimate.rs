use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::Month;
use crate::services::search_service::{FieldAccessor, Searchable};

/// Estimated income/expense for one month (`GET /budget/`). Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEstimateRecord {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
}

impl BudgetEstimateRecord {
    /// Month name, or the raw number if the server sent something outside 1..=12.
    pub fn month_label(&self) -> String {
        Month::from_number(self.month)
            .map(|m| m.label().to_string())
            .unwrap_or_else(|| self.month.to_string())
    }
}

fn year_field(e: &BudgetEstimateRecord) -> String {
    e.year.to_string()
}

fn month_field(e: &BudgetEstimateRecord) -> String {
    e.month_label()
}

fn income_field(e: &BudgetEstimateRecord) -> String {
    e.income.to_string()
}

fn expense_field(e: &BudgetEstimateRecord) -> String {
    e.expense.to_string()
}

// Only fields the estimate record actually carries.
const SEARCH_FIELDS: &[FieldAccessor<BudgetEstimateRecord>] =
    &[year_field, month_field, income_field, expense_field];

impl Searchable for BudgetEstimateRecord {
    fn search_fields() -> &'static [FieldAccessor<Self>] {
        SEARCH_FIELDS
    }
}
