pub mod draft;
pub mod transactions;

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};

use crate::{
    client::{Client, TransactionStore},
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

use self::transactions::TransactionsState;

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Amount,
    Category,
    Description,
    Date,
    Table,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Self::Amount,
        Self::Category,
        Self::Description,
        Self::Date,
        Self::Table,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_form(self) -> bool {
        self != Self::Table
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Category => "Category",
            Self::Description => "Description",
            Self::Date => "Date",
            Self::Table => "Transactions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreOp {
    Load,
    Submit,
    DeleteSelected,
    DeleteAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub focus: Focus,
    pub transactions: TransactionsState,
    /// Set while waiting for the `y` that confirms "delete all".
    pub confirm_delete_all: bool,
    pub toast: Option<ToastState>,
    pub base_url: String,
    pub connected: bool,
}

impl AppState {
    fn new(base_url: String) -> Self {
        Self {
            focus: Focus::Amount,
            transactions: TransactionsState::default(),
            confirm_delete_all: false,
            toast: None,
            base_url,
            connected: false,
        }
    }
}

pub struct App<S = Client> {
    store: S,
    pub state: AppState,
    should_quit: bool,
}

impl App<Client> {
    pub fn connect(base_url: &str) -> Result<Self> {
        let client = Client::new(base_url)?;
        let base_url = client.base_url().to_string();
        Ok(Self::new(client, base_url))
    }

    pub async fn run(&mut self) -> Result<()> {
        match self.store.ping().await {
            Ok(()) => self.state.connected = true,
            Err(err) => tracing::warn!("store health check failed: {err}"),
        }
        self.reload().await;

        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }
}

impl<S: TransactionStore> App<S> {
    pub fn new(store: S, base_url: String) -> Self {
        Self {
            store,
            state: AppState::new(base_url),
            should_quit: false,
        }
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.expire_toast(Instant::now());
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        self.handle_action(map_key(key)).await;
    }

    async fn handle_action(&mut self, action: AppAction) {
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        if self.state.confirm_delete_all {
            self.state.confirm_delete_all = false;
            if action == AppAction::Input('y') {
                self.update(StoreOp::DeleteAll).await;
            }
            return;
        }

        match action {
            AppAction::Quit => self.should_quit = true,
            AppAction::Cancel => {
                if self.state.focus.is_form() {
                    self.state.focus = Focus::Table;
                } else {
                    self.should_quit = true;
                }
            }
            AppAction::NextField => self.state.focus = self.state.focus.next(),
            AppAction::PrevField => self.state.focus = self.state.focus.prev(),
            AppAction::Submit => {
                if self.state.focus.is_form() {
                    self.update(StoreOp::Submit).await;
                }
            }
            AppAction::Backspace => {
                if let Some(field) = self.active_text_mut() {
                    field.pop();
                }
            }
            AppAction::Up => match self.state.focus {
                Focus::Table => self.map_transactions(TransactionsState::select_prev),
                focus => self.state.focus = focus.prev(),
            },
            AppAction::Down => match self.state.focus {
                Focus::Table => self.map_transactions(TransactionsState::select_next),
                focus => self.state.focus = focus.next(),
            },
            AppAction::Left => {
                if self.state.focus == Focus::Category {
                    self.state.transactions.draft.prev_category();
                }
            }
            AppAction::Right => {
                if self.state.focus == Focus::Category {
                    self.state.transactions.draft.next_category();
                }
            }
            AppAction::Input(ch) => self.handle_input(ch).await,
            AppAction::None => {}
        }
    }

    async fn handle_input(&mut self, ch: char) {
        let form = &mut self.state.transactions.draft;
        match self.state.focus {
            Focus::Amount => {
                if draft::accepts_amount_char(&form.amount, ch) {
                    form.amount.push(ch);
                }
            }
            Focus::Category => {
                if ch == ' ' {
                    form.next_category();
                }
            }
            Focus::Description => form.description.push(ch),
            Focus::Date => {
                if draft::accepts_date_char(ch) {
                    form.date.push(ch);
                }
            }
            Focus::Table => self.handle_table_command(ch).await,
        }
    }

    async fn handle_table_command(&mut self, ch: char) {
        match ch {
            'q' => self.should_quit = true,
            'j' => self.map_transactions(TransactionsState::select_next),
            'k' => self.map_transactions(TransactionsState::select_prev),
            's' => self.map_transactions(TransactionsState::toggle_date_sort),
            'c' => self.map_transactions(TransactionsState::toggle_category_sort),
            'r' => self.reload().await,
            'd' => self.update(StoreOp::DeleteSelected).await,
            'D' => {
                if self.state.transactions.items.len() >= 2 {
                    self.state.confirm_delete_all = true;
                }
            }
            'a' => self.state.focus = Focus::Amount,
            _ => {}
        }
    }

    fn active_text_mut(&mut self) -> Option<&mut String> {
        let draft = &mut self.state.transactions.draft;
        match self.state.focus {
            Focus::Amount => Some(&mut draft.amount),
            Focus::Description => Some(&mut draft.description),
            Focus::Date => Some(&mut draft.date),
            Focus::Category | Focus::Table => None,
        }
    }

    async fn reload(&mut self) {
        self.update(StoreOp::Load).await;
    }

    fn map_transactions(&mut self, f: impl FnOnce(TransactionsState) -> TransactionsState) {
        let state = std::mem::take(&mut self.state.transactions);
        self.state.transactions = f(state);
    }

    /// Runs one store-backed update and turns its outcome into a toast.
    async fn update(&mut self, op: StoreOp) {
        let state = std::mem::take(&mut self.state.transactions);
        let mut state = match op {
            StoreOp::Load => transactions::load(&self.store, state).await,
            StoreOp::Submit => transactions::submit(&self.store, state).await,
            StoreOp::DeleteSelected => transactions::delete_selected(&self.store, state).await,
            StoreOp::DeleteAll => transactions::delete_all(&self.store, state).await,
        };

        if let Some(ok) = state.store_ok {
            self.state.connected = ok;
        }
        let notice = state.notice.take();
        if let Some(message) = &state.error {
            self.show_toast(message.clone(), ToastLevel::Error);
        } else if let Some(message) = notice {
            self.show_toast(message, ToastLevel::Success);
        }
        self.state.transactions = state;
    }

    fn show_toast(&mut self, message: String, level: ToastLevel) {
        self.state.toast = Some(ToastState {
            message,
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self, now: Instant) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.state.toast = None;
        }
    }
}
