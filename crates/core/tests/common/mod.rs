#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tokio::sync::oneshot;

use budget_tracker_core::api::traits::BudgetApi;
use budget_tracker_core::errors::CoreError;
use budget_tracker_core::models::estimate::BudgetEstimateRecord;
use budget_tracker_core::models::session::{TOKEN_KEY, USERNAME_KEY};
use budget_tracker_core::models::summary::SummaryTotals;
use budget_tracker_core::models::transaction::{
    TransactionDraft, TransactionId, TransactionRecord, TransactionType,
};
use budget_tracker_core::services::session_service::SessionStore;
use budget_tracker_core::storage::store::MemoryStore;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct-horse";
pub const TOKEN: &str = "tok-alice-1";

// ═══════════════════════════════════════════════════════════════════
// Scripted failures
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Failure {
    Unauthorized,
    NotFound,
    Server,
    ServerDetail(&'static str),
    Network,
}

impl Failure {
    fn to_error(&self) -> CoreError {
        match self {
            Failure::Unauthorized => CoreError::Auth("Invalid token.".into()),
            Failure::NotFound => CoreError::NotFound("No Transaction matches the given query.".into()),
            Failure::Server => CoreError::Api {
                status: 500,
                detail: None,
            },
            Failure::ServerDetail(detail) => CoreError::Api {
                status: 400,
                detail: Some(detail.to_string()),
            },
            Failure::Network => CoreError::Network("connection refused".into()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// In-memory budget server
// ═══════════════════════════════════════════════════════════════════

/// In-memory stand-in for the budget API.
///
/// Every call is recorded (label first, before any gate), can be held back
/// by a oneshot gate keyed on that label, and can be scripted to fail per
/// endpoint.
pub struct MockApi {
    calls: Mutex<Vec<String>>,
    years: Mutex<Vec<i32>>,
    months: Mutex<HashMap<i32, Vec<u32>>>,
    summaries: Mutex<HashMap<(i32, u32), SummaryTotals>>,
    transactions: Mutex<Vec<TransactionRecord>>,
    estimates: Mutex<Vec<BudgetEstimateRecord>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    next_id: AtomicI64,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            years: Mutex::new(Vec::new()),
            months: Mutex::new(HashMap::new()),
            summaries: Mutex::new(HashMap::new()),
            transactions: Mutex::new(Vec::new()),
            estimates: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(100),
        }
    }

    pub fn with_years(self, years: &[i32]) -> Self {
        *self.years.lock().unwrap() = years.to_vec();
        self
    }

    pub fn with_months(self, year: i32, months: &[u32]) -> Self {
        self.months.lock().unwrap().insert(year, months.to_vec());
        self
    }

    pub fn with_summary(self, year: i32, month: u32, income: &str, expense: &str) -> Self {
        self.summaries.lock().unwrap().insert(
            (year, month),
            SummaryTotals {
                income: dec(income),
                expense: dec(expense),
            },
        );
        self
    }

    pub fn with_transactions(self, records: Vec<TransactionRecord>) -> Self {
        *self.transactions.lock().unwrap() = records;
        self
    }

    pub fn with_estimates(self, records: Vec<BudgetEstimateRecord>) -> Self {
        *self.estimates.lock().unwrap() = records;
        self
    }

    /// Make `endpoint` fail until [`MockApi::recover`] is called.
    pub fn fail(&self, endpoint: &'static str, failure: Failure) {
        self.failures.lock().unwrap().insert(endpoint, failure);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.failures.lock().unwrap().remove(endpoint);
    }

    /// Hold the next call labelled `label` until the returned sender fires.
    pub fn gate(&self, label: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(label.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose label starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.transactions.lock().unwrap().clone()
    }

    /// Yield until a call labelled `label` has been recorded.
    pub async fn wait_for_call(&self, label: &str) {
        for _ in 0..10_000 {
            if self.calls.lock().unwrap().iter().any(|c| c == label) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("call '{label}' never arrived; saw {:?}", self.calls());
    }

    async fn enter(&self, label: String, endpoint: &str, token: Option<&str>) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(label.clone());
        let gate = self.gates.lock().unwrap().remove(&label);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(token) = token {
            if token != TOKEN {
                return Err(CoreError::Auth("Invalid token.".into()));
            }
        }
        let failure = self.failures.lock().unwrap().get(endpoint).cloned();
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BudgetApi for MockApi {
    async fn login(&self, username: &str, password: &str) -> Result<String, CoreError> {
        self.enter(format!("login {username}"), "login", None).await?;
        if username == USERNAME && password == PASSWORD {
            Ok(TOKEN.to_string())
        } else {
            Err(CoreError::InvalidCredentials)
        }
    }

    async fn logout(&self, token: &str) -> Result<(), CoreError> {
        self.enter("logout".into(), "logout", Some(token)).await
    }

    async fn summary(&self, token: &str, year: i32, month: u32) -> Result<SummaryTotals, CoreError> {
        self.enter(format!("summary {year}-{month}"), "summary", Some(token))
            .await?;
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .get(&(year, month))
            .copied()
            .unwrap_or(SummaryTotals {
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
            }))
    }

    async fn available_years(&self, token: &str) -> Result<Vec<i32>, CoreError> {
        self.enter("years".into(), "years", Some(token)).await?;
        Ok(self.years.lock().unwrap().clone())
    }

    async fn available_months(&self, token: &str, year: i32) -> Result<Vec<u32>, CoreError> {
        self.enter(format!("months {year}"), "months", Some(token)).await?;
        Ok(self.months.lock().unwrap().get(&year).cloned().unwrap_or_default())
    }

    async fn list_transactions(&self, token: &str) -> Result<Vec<TransactionRecord>, CoreError> {
        self.enter("list_transactions".into(), "list_transactions", Some(token))
            .await?;
        Ok(self.transactions())
    }

    async fn create_transaction(&self, token: &str, draft: &TransactionDraft) -> Result<(), CoreError> {
        self.enter("create_transaction".into(), "create", Some(token))
            .await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.transactions.lock().unwrap().push(TransactionRecord {
            id,
            category_name: draft.category_name.clone(),
            kind: draft.kind,
            amount: draft.amount,
            datetime: draft.datetime.unwrap_or_else(fixed_time),
        });
        Ok(())
    }

    async fn update_transaction(
        &self,
        token: &str,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<(), CoreError> {
        self.enter(format!("update_transaction {id}"), "update", Some(token))
            .await?;
        let mut records = self.transactions.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Failure::NotFound.to_error())?;
        record.category_name = draft.category_name.clone();
        record.kind = draft.kind;
        record.amount = draft.amount;
        Ok(())
    }

    async fn delete_transaction(&self, token: &str, id: TransactionId) -> Result<(), CoreError> {
        self.enter(format!("delete_transaction {id}"), "delete", Some(token))
            .await?;
        let mut records = self.transactions.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(Failure::NotFound.to_error());
        }
        Ok(())
    }

    async fn list_budget_estimates(&self, token: &str) -> Result<Vec<BudgetEstimateRecord>, CoreError> {
        self.enter("list_budget_estimates".into(), "estimates", Some(token))
            .await?;
        Ok(self.estimates.lock().unwrap().clone())
    }
}

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap()
}

pub fn record(id: TransactionId, category: &str, kind: TransactionType, amount: &str) -> TransactionRecord {
    TransactionRecord {
        id,
        category_name: category.to_string(),
        kind,
        amount: dec(amount),
        datetime: fixed_time(),
    }
}

pub fn estimate(year: i32, month: u32, income: &str, expense: &str) -> BudgetEstimateRecord {
    BudgetEstimateRecord {
        year,
        month,
        income: dec(income),
        expense: dec(expense),
    }
}

pub fn sample_transactions() -> Vec<TransactionRecord> {
    vec![
        record(1, "Groceries", TransactionType::Expense, "54.20"),
        record(2, "Salary", TransactionType::Income, "3200.00"),
        record(3, "Rent", TransactionType::Expense, "1200.00"),
        record(4, "Freelance", TransactionType::Income, "450.00"),
    ]
}

/// A session store that already holds the valid token.
pub fn signed_in(api: &Arc<MockApi>) -> Arc<SessionStore> {
    let storage = MemoryStore::with_entries(&[(TOKEN_KEY, TOKEN), (USERNAME_KEY, USERNAME)]);
    Arc::new(SessionStore::restore(api.clone(), Box::new(storage)).unwrap())
}

pub fn signed_out(api: &Arc<MockApi>) -> Arc<SessionStore> {
    Arc::new(SessionStore::restore(api.clone(), Box::new(MemoryStore::new())).unwrap())
}

/// Let every other future on this task run until it blocks again.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
