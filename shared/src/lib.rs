use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Number of entries shown in the recent history view
pub const HISTORY_LEN: usize = 3;

/// Backend-assigned transaction identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An income or expense record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireTransaction")]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: f64,
    /// When the backend stored the record (RFC 3339). Records without one
    /// sort after every dated record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any other fields the backend sends, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Transaction as it arrives on the wire. Document databases send the id as
/// `_id`, sometimes alongside an `id` virtual; either one is accepted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransaction {
    #[serde(default, rename = "_id")]
    document_id: Option<TransactionId>,
    #[serde(default)]
    id: Option<TransactionId>,
    amount: f64,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<WireTransaction> for Transaction {
    type Error = String;

    fn try_from(wire: WireTransaction) -> Result<Self, Self::Error> {
        let id = wire
            .document_id
            .or(wire.id)
            .ok_or_else(|| "missing field `_id` or `id`".to_string())?;

        Ok(Self {
            id,
            amount: wire.amount,
            created_at: wire.created_at,
            title: wire.title,
            category: wire.category,
            description: wire.description,
            extra: wire.extra,
        })
    }
}

/// Record submitted when creating an income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    /// Date the money moved, as picked by the user (YYYY-MM-DD)
    pub date: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewTransaction {
    pub fn new(title: impl Into<String>, amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            amount,
            category: category.into(),
            description: String::new(),
            date,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Which collection a transaction belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// A transaction tagged with the collection it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: TransactionKind,
    pub transaction: Transaction,
}

/// Error payload the backend sends with a failed request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Sum of `amount` over the given transactions, 0 when empty
pub fn total_amount(transactions: &[Transaction]) -> f64 {
    transactions.iter().fold(0.0, |acc, tx| acc + tx.amount)
}

/// Merge incomes and expenses, most recent first, keeping at most `limit` entries.
///
/// The sort is stable: on equal `created_at` incomes come before expenses and
/// each collection keeps its own order.
pub fn recent_history(incomes: &[Transaction], expenses: &[Transaction], limit: usize) -> Vec<HistoryEntry> {
    let mut merged: Vec<(TransactionKind, &Transaction)> = incomes
        .iter()
        .map(|tx| (TransactionKind::Income, tx))
        .chain(expenses.iter().map(|tx| (TransactionKind::Expense, tx)))
        .collect();

    merged.sort_by(|(_, a), (_, b)| b.created_at.cmp(&a.created_at));

    merged
        .into_iter()
        .take(limit)
        .map(|(kind, tx)| HistoryEntry {
            kind,
            transaction: tx.clone(),
        })
        .collect()
}
