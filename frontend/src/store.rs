//! # Ledger store
//!
//! Holds the incomes and expenses last fetched from the backend and derives
//! totals and recent history from them.
//!
//! Collections are only ever replaced by a successful fetch; mutations go to
//! the backend and then re-fetch the affected collection. Every operation
//! catches its own failure and records it in one shared error slot, so the
//! latest failure wins. State lives behind `Rc<RefCell<..>>` and no borrow is
//! held across an `.await`: overlapping calls interleave freely and whichever
//! fetch completes last decides the collection.

use log::{debug, warn};
use shared::{recent_history, total_amount, HistoryEntry, NewTransaction, Transaction, TransactionId, TransactionKind, HISTORY_LEN};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::services::api::LedgerApi;

/// Snapshot of everything the store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub incomes: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
    pub last_error: Option<String>,
}

impl LedgerState {
    pub fn collection(&self, kind: TransactionKind) -> &[Transaction] {
        match kind {
            TransactionKind::Income => &self.incomes,
            TransactionKind::Expense => &self.expenses,
        }
    }

    fn collection_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Income => &mut self.incomes,
            TransactionKind::Expense => &mut self.expenses,
        }
    }

    pub fn total_income(&self) -> f64 {
        total_amount(&self.incomes)
    }

    pub fn total_expenses(&self) -> f64 {
        total_amount(&self.expenses)
    }

    pub fn total_balance(&self) -> f64 {
        self.total_income() - self.total_expenses()
    }

    /// The three most recent transactions across both collections
    pub fn transaction_history(&self) -> Vec<HistoryEntry> {
        recent_history(&self.incomes, &self.expenses, HISTORY_LEN)
    }
}

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Keeps a change listener registered until dropped
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

struct Inner<A> {
    api: A,
    state: RefCell<LedgerState>,
    listeners: Rc<RefCell<Listeners>>,
}

/// Shared handle to the ledger. Clones point at the same state.
pub struct LedgerStore<A> {
    inner: Rc<Inner<A>>,
}

impl<A> Clone for LedgerStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> PartialEq for LedgerStore<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A: LedgerApi> LedgerStore<A> {
    /// Create a store with empty collections and no error
    pub fn new(api: A) -> Self {
        Self {
            inner: Rc::new(Inner {
                api,
                state: RefCell::new(LedgerState::default()),
                listeners: Rc::new(RefCell::new(Listeners::default())),
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub async fn add_income(&self, record: &NewTransaction) {
        self.add(TransactionKind::Income, record).await
    }

    pub async fn add_expense(&self, record: &NewTransaction) {
        self.add(TransactionKind::Expense, record).await
    }

    pub async fn get_incomes(&self) {
        self.fetch(TransactionKind::Income).await
    }

    pub async fn get_expenses(&self) {
        self.fetch(TransactionKind::Expense).await
    }

    pub async fn delete_income(&self, id: &TransactionId) {
        self.delete(TransactionKind::Income, id).await
    }

    pub async fn delete_expense(&self, id: &TransactionId) {
        self.delete(TransactionKind::Expense, id).await
    }

    async fn add(&self, kind: TransactionKind, record: &NewTransaction) {
        match self.inner.api.add(kind, record).await {
            Ok(()) => {
                debug!("Added {} '{}'", kind, record.title);
                self.fetch(kind).await;
            }
            Err(e) => {
                warn!("Failed to add {}: {}", kind, e);
                let message = e
                    .backend_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Error adding {}", kind));
                self.set_error(Some(message));
            }
        }
    }

    async fn fetch(&self, kind: TransactionKind) {
        match self.inner.api.list(kind).await {
            Ok(transactions) => {
                debug!("Fetched {} {} records", transactions.len(), kind);
                self.update(|state| *state.collection_mut(kind) = transactions);
            }
            Err(e) => {
                warn!("Failed to fetch {}s: {}", kind, e);
                self.set_error(Some(format!("Failed to fetch {}s", kind)));
            }
        }
    }

    async fn delete(&self, kind: TransactionKind, id: &TransactionId) {
        match self.inner.api.delete(kind, id).await {
            Ok(()) => {
                debug!("Deleted {} {}", kind, id);
                self.fetch(kind).await;
            }
            Err(e) => {
                warn!("Failed to delete {} {}: {}", kind, id, e);
                self.set_error(Some(format!("Failed to delete {}", kind)));
            }
        }
    }
}

impl<A> LedgerStore<A> {
    pub fn state(&self) -> LedgerState {
        self.inner.state.borrow().clone()
    }

    pub fn incomes(&self) -> Vec<Transaction> {
        self.inner.state.borrow().collection(TransactionKind::Income).to_vec()
    }

    pub fn expenses(&self) -> Vec<Transaction> {
        self.inner.state.borrow().collection(TransactionKind::Expense).to_vec()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().last_error.clone()
    }

    /// Replace or clear the shared error slot
    pub fn set_error(&self, error: Option<String>) {
        self.update(|state| state.last_error = error);
    }

    pub fn total_income(&self) -> f64 {
        self.inner.state.borrow().total_income()
    }

    pub fn total_expenses(&self) -> f64 {
        self.inner.state.borrow().total_expenses()
    }

    pub fn total_balance(&self) -> f64 {
        self.inner.state.borrow().total_balance()
    }

    pub fn transaction_history(&self) -> Vec<HistoryEntry> {
        self.inner.state.borrow().transaction_history()
    }

    /// Register a listener called after every state change
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut listeners = self.inner.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));

        Subscription {
            id,
            listeners: Rc::downgrade(&self.inner.listeners),
        }
    }

    fn update(&self, f: impl FnOnce(&mut LedgerState)) {
        f(&mut *self.inner.state.borrow_mut());
        self.notify();
    }

    fn notify(&self) {
        // Listeners may read the store or drop their subscription
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener();
        }
    }
}
