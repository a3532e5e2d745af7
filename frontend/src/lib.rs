//! Client-side ledger for the personal finance web app.
//!
//! [`store::LedgerStore`] keeps incomes and expenses in sync with the backend
//! and derives totals from them; [`hooks::use_ledger`] exposes it to Yew
//! components.

pub mod config;
pub mod error;
pub mod hooks;
pub mod services;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use config::AppConfig;
pub use error::ApiError;
pub use hooks::use_ledger::{use_ledger, LedgerProvider, UseLedgerActions, UseLedgerResult};
pub use services::api::{ApiClient, LedgerApi};
pub use store::{LedgerState, LedgerStore, Subscription};
