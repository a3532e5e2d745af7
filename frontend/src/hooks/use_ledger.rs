use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use shared::{HistoryEntry, NewTransaction, Transaction, TransactionId};

use crate::config::AppConfig;
use crate::services::api::ApiClient;
use crate::services::logging;
use crate::store::LedgerStore;

/// The store as provided to components
pub type AppLedgerStore = LedgerStore<ApiClient>;

#[derive(Properties, PartialEq)]
pub struct LedgerProviderProps {
    #[prop_or_default]
    pub children: Children,
}

/// Owns the app's single ledger store and loads both collections on mount.
/// Also installs the console logger unless the app already set one.
#[function_component(LedgerProvider)]
pub fn ledger_provider(props: &LedgerProviderProps) -> Html {
    let store = use_memo((), |_| {
        logging::init(logging::default_level());
        LedgerStore::new(ApiClient::new(&AppConfig::from_env()))
    });

    use_effect_with((), {
        let store = (*store).clone();
        move |_| {
            spawn_local(async move {
                store.get_incomes().await;
                store.get_expenses().await;
            });
            || ()
        }
    });

    html! {
        <ContextProvider<AppLedgerStore> context={(*store).clone()}>
            { for props.children.iter() }
        </ContextProvider<AppLedgerStore>>
    }
}

#[derive(Clone, PartialEq)]
pub struct LedgerViewState {
    pub incomes: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
    pub error: Option<String>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_balance: f64,
    pub history: Vec<HistoryEntry>,
}

#[derive(Clone, PartialEq)]
pub struct UseLedgerActions {
    pub add_income: Callback<NewTransaction>,
    pub add_expense: Callback<NewTransaction>,
    pub get_incomes: Callback<()>,
    pub get_expenses: Callback<()>,
    pub delete_income: Callback<TransactionId>,
    pub delete_expense: Callback<TransactionId>,
    pub set_error: Callback<Option<String>>,
}

pub struct UseLedgerResult {
    pub state: LedgerViewState,
    pub actions: UseLedgerActions,
}

/// Read the ledger and get callbacks for every operation.
///
/// Re-renders the calling component whenever the store changes. Must be
/// used below a `LedgerProvider`.
#[hook]
pub fn use_ledger() -> UseLedgerResult {
    let store = use_context::<AppLedgerStore>().expect("use_ledger called outside of LedgerProvider");
    let force_update = use_force_update();

    use_effect_with(store.clone(), move |store| {
        let subscription = store.subscribe(move || force_update.force_update());
        move || drop(subscription)
    });

    let add_income = use_callback(store.clone(), |record: NewTransaction, store| {
        let store = store.clone();
        spawn_local(async move { store.add_income(&record).await });
    });

    let add_expense = use_callback(store.clone(), |record: NewTransaction, store| {
        let store = store.clone();
        spawn_local(async move { store.add_expense(&record).await });
    });

    let get_incomes = use_callback(store.clone(), |_: (), store| {
        let store = store.clone();
        spawn_local(async move { store.get_incomes().await });
    });

    let get_expenses = use_callback(store.clone(), |_: (), store| {
        let store = store.clone();
        spawn_local(async move { store.get_expenses().await });
    });

    let delete_income = use_callback(store.clone(), |id: TransactionId, store| {
        let store = store.clone();
        spawn_local(async move { store.delete_income(&id).await });
    });

    let delete_expense = use_callback(store.clone(), |id: TransactionId, store| {
        let store = store.clone();
        spawn_local(async move { store.delete_expense(&id).await });
    });

    let set_error = use_callback(store.clone(), |error: Option<String>, store| {
        store.set_error(error);
    });

    let snapshot = store.state();
    let state = LedgerViewState {
        total_income: snapshot.total_income(),
        total_expenses: snapshot.total_expenses(),
        total_balance: snapshot.total_balance(),
        history: snapshot.transaction_history(),
        incomes: snapshot.incomes,
        expenses: snapshot.expenses,
        error: snapshot.last_error,
    };

    let actions = UseLedgerActions {
        add_income,
        add_expense,
        get_incomes,
        get_expenses,
        delete_income,
        delete_expense,
        set_error,
    };

    UseLedgerResult { state, actions }
}
