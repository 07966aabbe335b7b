//! Transaction view-model.
//!
//! [`TransactionsState`] is the client-side copy of the store plus the form
//! draft and the sort settings. Every update takes the state by value and
//! returns the next one; the store is only reached through
//! [`TransactionStore`].

use api_types::transaction::{TransactionId, TransactionView};
use chrono::{DateTime, Local};

use crate::client::{ClientError, TransactionStore};

use super::draft::Draft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Date,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    Newest,
    Oldest,
}

impl DateOrder {
    fn flip(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Newest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::Oldest => "Oldest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryOrder {
    #[default]
    AToZ,
    ZToA,
}

impl CategoryOrder {
    fn flip(self) -> Self {
        match self {
            Self::AToZ => Self::ZToA,
            Self::ZToA => Self::AToZ,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AToZ => "A-Z",
            Self::ZToA => "Z-A",
        }
    }
}

/// Active sort mode plus the remembered direction of both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub mode: SortMode,
    pub date: DateOrder,
    pub category: CategoryOrder,
}

impl SortState {
    /// Switches to date sorting and flips the date direction.
    pub fn toggle_date(self) -> Self {
        Self {
            mode: SortMode::Date,
            date: self.date.flip(),
            ..self
        }
    }

    /// Switches to category sorting and flips the category direction.
    pub fn toggle_category(self) -> Self {
        Self {
            mode: SortMode::Category,
            category: self.category.flip(),
            ..self
        }
    }

    pub fn label(self) -> String {
        match self.mode {
            SortMode::Date => format!("Date ({})", self.date.label()),
            SortMode::Category => format!("Category ({})", self.category.label()),
        }
    }
}

#[derive(Debug, Default)]
pub struct TransactionsState {
    /// Last list fetched from the store, in store order.
    pub items: Vec<TransactionView>,
    pub draft: Draft,
    pub sort: SortState,
    /// Index into [`sorted_view`], not into `items`.
    pub selected: usize,
    pub error: Option<String>,
    /// Success message for the last completed operation.
    pub notice: Option<String>,
    /// `None` until the first successful load.
    pub last_refresh: Option<DateTime<Local>>,
    /// Outcome of the last store call made by the current update, `None` if
    /// the update never reached the store.
    pub store_ok: Option<bool>,
}

impl TransactionsState {
    pub fn is_loaded(&self) -> bool {
        self.last_refresh.is_some()
    }

    pub fn sorted(&self) -> Vec<&TransactionView> {
        sorted_view(&self.items, self.sort)
    }

    pub fn total(&self) -> f64 {
        total(&self.items)
    }

    pub fn selected_id(&self) -> Option<TransactionId> {
        self.sorted().get(self.selected).map(|tx| tx.id)
    }

    pub fn select_next(mut self) -> Self {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
        self
    }

    pub fn select_prev(mut self) -> Self {
        self.selected = self.selected.saturating_sub(1);
        self
    }

    pub fn toggle_date_sort(mut self) -> Self {
        self.sort = self.sort.toggle_date();
        self
    }

    pub fn toggle_category_sort(mut self) -> Self {
        self.sort = self.sort.toggle_category();
        self
    }

    fn clamp_selection(mut self) -> Self {
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
        self
    }

    fn begin(mut self) -> Self {
        self.notice = None;
        self.store_ok = None;
        self
    }

    fn succeed(mut self) -> Self {
        self.error = None;
        self.store_ok = Some(true);
        self
    }

    fn fail(mut self, action: &str, err: &ClientError) -> Self {
        tracing::warn!("{action} failed: {err}");
        self.error = Some(message_for_error(action, err));
        // An unreadable body still means the store answered.
        self.store_ok = Some(!matches!(err, ClientError::Decode(_)));
        self
    }
}

/// Ordered view over `items`. Sorting is stable, so ties keep store order.
pub fn sorted_view(items: &[TransactionView], sort: SortState) -> Vec<&TransactionView> {
    let mut view: Vec<&TransactionView> = items.iter().collect();
    match (sort.mode, sort.date, sort.category) {
        (SortMode::Date, DateOrder::Newest, _) => view.sort_by(|a, b| b.date.cmp(&a.date)),
        (SortMode::Date, DateOrder::Oldest, _) => view.sort_by(|a, b| a.date.cmp(&b.date)),
        (SortMode::Category, _, CategoryOrder::AToZ) => {
            view.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()))
        }
        (SortMode::Category, _, CategoryOrder::ZToA) => {
            view.sort_by(|a, b| b.category.as_str().cmp(a.category.as_str()))
        }
    }
    view
}

/// Sum of all amounts; records without a usable amount count as zero.
pub fn total(items: &[TransactionView]) -> f64 {
    items.iter().map(|tx| tx.amount.unwrap_or(0.0)).sum()
}

/// Amounts are shown as whole numbers; stored values keep their precision.
pub fn round_for_display(amount: f64) -> i64 {
    amount.round() as i64
}

/// Replaces the cached list with the store's.
pub async fn load<S: TransactionStore>(store: &S, state: TransactionsState) -> TransactionsState {
    let mut state = state;
    match store.list().await {
        Ok(items) => {
            tracing::debug!(count = items.len(), "transactions loaded");
            state.items = items;
            state.last_refresh = Some(Local::now());
            state.succeed().clamp_selection()
        }
        Err(err) => state.fail("loading transactions", &err),
    }
}

/// Validates the draft, creates the transaction and reloads the list.
///
/// On any failure the draft is left as typed.
pub async fn submit<S: TransactionStore>(store: &S, state: TransactionsState) -> TransactionsState {
    let mut state = state.begin();
    let payload = match state.draft.validate() {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!("draft rejected: {err}");
            state.error = Some(err.to_string());
            return state;
        }
    };

    match store.create(&payload).await {
        Ok(created) => {
            tracing::info!(id = %created.id, category = created.category.as_str(), "transaction created");
            state.draft = Draft::default();
            state.notice = Some("Transaction saved.".to_string());
            load(store, state.succeed()).await
        }
        Err(err) => state.fail("saving transaction", &err),
    }
}

/// Deletes one transaction and drops it from the cache once the store agrees.
pub async fn delete<S: TransactionStore>(
    store: &S,
    state: TransactionsState,
    id: TransactionId,
) -> TransactionsState {
    let mut state = state.begin();
    match store.delete(id).await {
        Ok(_) => {
            tracing::info!(%id, "transaction deleted");
            if let Some(pos) = state.items.iter().position(|tx| tx.id == id) {
                state.items.remove(pos);
            }
            state.notice = Some("Transaction deleted.".to_string());
            state.succeed().clamp_selection()
        }
        Err(err) => state.fail("deleting transaction", &err),
    }
}

/// Deletes the row under the selection, if any.
pub async fn delete_selected<S: TransactionStore>(
    store: &S,
    state: TransactionsState,
) -> TransactionsState {
    match state.selected_id() {
        Some(id) => delete(store, state, id).await,
        None => state.begin(),
    }
}

pub async fn delete_all<S: TransactionStore>(
    store: &S,
    state: TransactionsState,
) -> TransactionsState {
    let mut state = state.begin();
    match store.delete_all().await {
        Ok(count) => {
            tracing::info!(count, "all transactions deleted");
            state.items.clear();
            state.selected = 0;
            state.notice = Some(match count {
                1 => "Deleted 1 transaction.".to_string(),
                n => format!("Deleted {n} transactions."),
            });
            state.succeed()
        }
        Err(err) => state.fail("deleting all transactions", &err),
    }
}

pub fn message_for_error(action: &str, err: &ClientError) -> String {
    match err {
        ClientError::NotFound => format!("Error {action}: transaction not found."),
        ClientError::Validation(message) => format!("Error {action}: rejected by store: {message}"),
        ClientError::Server(message) => format!("Error {action}: store error: {message}"),
        ClientError::Transport(err) => format!("Error {action}: store unreachable: {err}"),
        ClientError::Decode(message) => {
            format!("Error {action}: unreadable store answer: {message}")
        }
    }
}
