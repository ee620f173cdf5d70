use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw totals returned by `GET /summary/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

/// How a month's spending compares to its income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    /// Expense exceeds income.
    OverBudget,
    /// Expense is below income.
    RemainingBalance,
    /// Expense equals income exactly.
    OnBudget,
    /// The last summary fetch failed.
    Error,
}

impl BudgetStatus {
    pub fn from_totals(income: Decimal, expense: Decimal) -> Self {
        match expense.cmp(&income) {
            std::cmp::Ordering::Greater => BudgetStatus::OverBudget,
            std::cmp::Ordering::Less => BudgetStatus::RemainingBalance,
            std::cmp::Ordering::Equal => BudgetStatus::OnBudget,
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetStatus::OverBudget => write!(f, "Over Budget"),
            BudgetStatus::RemainingBalance => write!(f, "Remaining Balance"),
            BudgetStatus::OnBudget => write!(f, "On Budget"),
            BudgetStatus::Error => write!(f, "Error Fetching Data"),
        }
    }
}

/// Derived view of one month's totals. Never persisted; rebuilt on every
/// successful summary fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryView {
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub status: BudgetStatus,
}

impl SummaryView {
    pub fn new(income_total: Decimal, expense_total: Decimal) -> Self {
        Self {
            income_total,
            expense_total,
            status: BudgetStatus::from_totals(income_total, expense_total),
        }
    }

    /// Magnitude of the gap between expense and income.
    pub fn difference(&self) -> Decimal {
        (self.expense_total - self.income_total).abs()
    }

    /// Caption for [`SummaryView::difference`].
    pub fn difference_label(&self) -> &'static str {
        match self.status {
            BudgetStatus::OverBudget => "Debt",
            BudgetStatus::RemainingBalance => "Balance",
            BudgetStatus::OnBudget | BudgetStatus::Error => "No Difference",
        }
    }
}

impl From<SummaryTotals> for SummaryView {
    fn from(totals: SummaryTotals) -> Self {
        SummaryView::new(totals.income, totals.expense)
    }
}
