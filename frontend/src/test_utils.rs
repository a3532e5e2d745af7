//! In-memory stand-in for the ledger backend

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Map;
use shared::{NewTransaction, Transaction, TransactionId, TransactionKind};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::api::LedgerApi;

/// A call the fake received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Add(TransactionKind),
    List(TransactionKind),
    Delete(TransactionKind, TransactionId),
}

#[derive(Default)]
pub struct FakeLedgerApi {
    incomes: RefCell<Vec<Transaction>>,
    expenses: RefCell<Vec<Transaction>>,
    add_error: RefCell<Option<ApiError>>,
    list_error: RefCell<Option<ApiError>>,
    calls: RefCell<Vec<FakeCall>>,
    clock: Cell<i64>,
}

impl FakeLedgerApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incomes(self, incomes: Vec<Transaction>) -> Self {
        self.set_incomes(incomes);
        self
    }

    pub fn with_expenses(self, expenses: Vec<Transaction>) -> Self {
        *self.expenses.borrow_mut() = expenses;
        self
    }

    /// Change what the backend holds without going through the store
    pub fn set_incomes(&self, incomes: Vec<Transaction>) {
        *self.incomes.borrow_mut() = incomes;
    }

    pub fn fail_add_with(&self, error: ApiError) {
        *self.add_error.borrow_mut() = Some(error);
    }

    pub fn fail_list(&self, fail: bool) {
        *self.list_error.borrow_mut() = fail.then(|| ApiError::Network("connection refused".to_string()));
    }

    pub fn fail_list_with(&self, error: ApiError) {
        *self.list_error.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.borrow().clone()
    }

    fn collection(&self, kind: TransactionKind) -> &RefCell<Vec<Transaction>> {
        match kind {
            TransactionKind::Income => &self.incomes,
            TransactionKind::Expense => &self.expenses,
        }
    }

    fn tick(&self) -> DateTime<Utc> {
        let minutes = self.clock.get() + 1;
        self.clock.set(minutes);
        at(0) + Duration::minutes(minutes)
    }
}

#[async_trait(?Send)]
impl LedgerApi for FakeLedgerApi {
    async fn add(&self, kind: TransactionKind, record: &NewTransaction) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(FakeCall::Add(kind));
        if let Some(error) = self.add_error.borrow().clone() {
            return Err(error);
        }

        let stored = Transaction {
            id: TransactionId::new(Uuid::new_v4().to_string()),
            amount: record.amount,
            created_at: Some(self.tick()),
            title: Some(record.title.clone()),
            category: Some(record.category.clone()),
            description: Some(record.description.clone()),
            extra: record.extra.clone(),
        };
        self.collection(kind).borrow_mut().push(stored);
        Ok(())
    }

    async fn list(&self, kind: TransactionKind) -> Result<Vec<Transaction>, ApiError> {
        self.calls.borrow_mut().push(FakeCall::List(kind));
        if let Some(error) = self.list_error.borrow().clone() {
            return Err(error);
        }
        Ok(self.collection(kind).borrow().clone())
    }

    async fn delete(&self, kind: TransactionKind, id: &TransactionId) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(FakeCall::Delete(kind, id.clone()));

        let mut collection = self.collection(kind).borrow_mut();
        match collection.iter().position(|tx| &tx.id == id) {
            Some(index) => {
                collection.remove(index);
                Ok(())
            }
            None => Err(ApiError::Rejected {
                status: 404,
                message: Some(format!("{} not found", kind)),
            }),
        }
    }
}

/// Backend whose list responses are held until the test releases them.
///
/// Each `list` call takes the next gate in the order the gates were opened
/// and answers with whatever snapshot is sent through it.
#[derive(Default)]
pub struct GatedLedgerApi {
    gates: RefCell<VecDeque<oneshot::Receiver<Vec<Transaction>>>>,
}

impl GatedLedgerApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_gate(&self) -> oneshot::Sender<Vec<Transaction>> {
        let (sender, receiver) = oneshot::channel();
        self.gates.borrow_mut().push_back(receiver);
        sender
    }

    /// Gates not yet picked up by a `list` call
    pub fn unclaimed_gates(&self) -> usize {
        self.gates.borrow().len()
    }
}

#[async_trait(?Send)]
impl LedgerApi for GatedLedgerApi {
    async fn add(&self, _kind: TransactionKind, _record: &NewTransaction) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list(&self, _kind: TransactionKind) -> Result<Vec<Transaction>, ApiError> {
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(gate) => gate.await.map_err(|_| ApiError::Network("gate closed".to_string())),
            None => Err(ApiError::Network("no gate opened".to_string())),
        }
    }

    async fn delete(&self, _kind: TransactionKind, _id: &TransactionId) -> Result<(), ApiError> {
        Ok(())
    }
}

/// A fixed timestamp `hour` hours into 2025-01-01 (UTC)
pub fn at(hour: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
}

pub fn transaction(id: &str, amount: f64, created_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: TransactionId::from(id),
        amount,
        created_at: Some(created_at),
        title: Some(format!("Transaction {}", id)),
        category: Some("other".to_string()),
        description: None,
        extra: Map::new(),
    }
}

pub fn new_record(title: &str, amount: f64) -> NewTransaction {
    NewTransaction::new(title, amount, "other", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
}
