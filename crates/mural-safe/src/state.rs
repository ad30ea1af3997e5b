//! Application state types

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use alloy::primitives::{Address, B256, U256};

use mural_safe_core::{
    AddOwnerForm, CommandResult, CreateSafeForm, HistoryEntry, OnboardingPhase, PortError,
    RemoveOwnerForm, SafeInfo, SafeRecord, SendEthForm, TxReceipt, WalletConnection,
};

pub type TaskResult = Result<CommandResult, PortError>;

/// Hand-off point for a single background result, polled once per frame.
pub struct AsyncSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
    pending: bool,
}

impl<T> Default for AsyncSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            pending: false,
        }
    }
}

impl<T> AsyncSlot<T> {
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Marks the slot busy and returns the handle a worker fills in.
    pub fn begin(&mut self) -> SlotSender<T> {
        self.pending = true;
        SlotSender(Arc::clone(&self.inner))
    }

    pub fn take(&mut self) -> Option<T> {
        let value = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if value.is_some() {
            self.pending = false;
        }
        value
    }
}

pub struct SlotSender<T>(Arc<Mutex<Option<T>>>);

impl<T> SlotSender<T> {
    pub fn fill(self, value: T) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

/// Rate limit for background polling. Fires at most once per interval.
pub struct SyncTimer {
    interval: Duration,
    last: Option<Instant>,
}

impl SyncTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true and restarts the interval if enough time has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        let due = self
            .last
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }
}

/// Wallet connection shared by every page.
#[derive(Default)]
pub struct Session {
    pub connection: Option<WalletConnection>,
    pub onboarding: OnboardingPhase,
    pub connect: AsyncSlot<TaskResult>,
    pub sync: AsyncSlot<TaskResult>,
    pub error: Option<String>,
}

impl Session {
    pub fn active_account(&self) -> Option<Address> {
        self.connection.as_ref().and_then(|c| c.active_account())
    }

    pub fn accounts(&self) -> &[Address] {
        self.connection
            .as_ref()
            .map(|c| c.accounts.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct WalletPageState {
    /// Account the balance and history below belong to.
    pub shown_account: Option<Address>,
    pub balance: Option<U256>,
    pub history: Option<Vec<HistoryEntry>>,
    pub send_form: SendEthForm,
    pub last_tx: Option<B256>,
    pub error: Option<String>,
    pub balance_task: AsyncSlot<TaskResult>,
    pub history_task: AsyncSlot<TaskResult>,
    pub send_task: AsyncSlot<TaskResult>,
}

impl WalletPageState {
    pub fn reset_for(&mut self, account: Option<Address>) {
        self.shown_account = account;
        self.balance = None;
        self.history = None;
        self.last_tx = None;
        self.error = None;
    }
}

#[derive(Default)]
pub struct SafesPageState {
    pub form: CreateSafeForm,
    pub safes: Vec<SafeRecord>,
    pub loaded: bool,
    pub last_deployed: Option<Address>,
    pub error: Option<String>,
    pub list_task: AsyncSlot<TaskResult>,
    pub create_task: AsyncSlot<TaskResult>,
    pub forget_task: AsyncSlot<TaskResult>,
}

pub struct SafeDetailsState {
    pub safe: Address,
    pub info: Option<SafeInfo>,
    pub add_form: AddOwnerForm,
    pub remove_form: RemoveOwnerForm,
    pub last_receipt: Option<TxReceipt>,
    pub error: Option<String>,
    pub load_task: AsyncSlot<TaskResult>,
    pub change_task: AsyncSlot<TaskResult>,
}

impl SafeDetailsState {
    pub fn new(safe: Address) -> Self {
        Self {
            safe,
            info: None,
            add_form: AddOwnerForm::default(),
            remove_form: RemoveOwnerForm::default(),
            last_receipt: None,
            error: None,
            load_task: AsyncSlot::default(),
            change_task: AsyncSlot::default(),
        }
    }
}

/// User-facing text for a failed command.
pub fn describe_error(err: &PortError) -> String {
    match err {
        PortError::WrongNetwork { expected, actual } => format!(
            "Wallet is on chain {actual}; switch it to chain {expected} and try again"
        ),
        other => other.to_string(),
    }
}
