//! Main application state and update loop

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use mural_safe_adapters::AdapterConfig;
use mural_safe_core::{ConsoleCommand, Network, OnboardingAction, Route};

use crate::bridge::ConsoleBridge;
use crate::navbar::{self, NavbarState};
use crate::pages::{self, PageAction};
use crate::state::{
    describe_error, SafeDetailsState, SafesPageState, Session, SlotSender, SyncTimer,
    TaskResult, WalletPageState,
};

/// How often the wallet is asked for account/chain changes.
const WALLET_SYNC_INTERVAL: Duration = Duration::from_secs(2);

/// Runs console commands off the UI thread and wakes the UI when done.
pub struct Tasks<'a> {
    bridge: &'a ConsoleBridge,
    runtime: &'a tokio::runtime::Handle,
    ctx: &'a egui::Context,
}

impl Tasks<'_> {
    pub fn run(&self, sender: SlotSender<TaskResult>, command: ConsoleCommand) {
        debug!(?command, "dispatching command");
        let bridge = self.bridge.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn_blocking(move || {
            let result = bridge.run(command);
            if let Err(e) = &result {
                warn!(error = %e, "command failed");
            }
            sender.fill(result);
            ctx.request_repaint();
        });
    }

    pub fn network(&self) -> &Network {
        self.bridge.network()
    }

    pub fn provider_available(&self) -> bool {
        self.bridge.provider_available()
    }
}

pub struct App {
    route: Route,
    config: AdapterConfig,
    bridge: ConsoleBridge,
    runtime: tokio::runtime::Runtime,
    navbar: NavbarState,
    session: Session,
    wallet: WalletPageState,
    safes: SafesPageState,
    details: Option<SafeDetailsState>,
    sync_timer: SyncTimer,
    started: bool,
}

impl App {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AdapterConfig,
        bridge: ConsoleBridge,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        Self {
            route: Route::default(),
            config,
            bridge,
            runtime,
            navbar: NavbarState::default(),
            session: Session::default(),
            wallet: WalletPageState::default(),
            safes: SafesPageState::default(),
            details: None,
            sync_timer: SyncTimer::new(WALLET_SYNC_INTERVAL),
            started: false,
        }
    }

    fn navigate(&mut self, route: Route, tasks: &Tasks<'_>) {
        if route == self.route {
            return;
        }
        info!(path = %route.path(), "navigate");
        self.route = route;
        match route {
            Route::Wallet => {}
            Route::Safes => {
                if !self.safes.list_task.is_pending() {
                    tasks.run(self.safes.list_task.begin(), ConsoleCommand::ListSafes);
                }
            }
            Route::SafeDetails(safe) => {
                let mut details = SafeDetailsState::new(safe);
                tasks.run(details.load_task.begin(), ConsoleCommand::LoadSafe { safe });
                self.details = Some(details);
            }
        }
    }

    fn handle_action(&mut self, action: PageAction, tasks: &Tasks<'_>) {
        match action {
            PageAction::Navigate(route) => self.navigate(route, tasks),
            PageAction::Onboard(OnboardingAction::StartOnboarding) => {
                self.session.onboarding = self
                    .session
                    .onboarding
                    .on_click(OnboardingAction::StartOnboarding);
                crate::ui::open_url_new_tab(&self.config.onboarding_url);
            }
            PageAction::Onboard(OnboardingAction::RequestAccounts) => {
                if !self.session.connect.is_pending() {
                    tasks.run(self.session.connect.begin(), ConsoleCommand::ConnectWallet);
                }
            }
            PageAction::Onboard(OnboardingAction::Nothing) => {}
        }
    }

    fn poll_session(&mut self) {
        for result in [self.session.connect.take(), self.session.sync.take()]
            .into_iter()
            .flatten()
        {
            match result {
                Ok(res) => {
                    if let Some(connection) = res.connection {
                        self.session.onboarding = self
                            .session
                            .onboarding
                            .on_accounts(connection.available, &connection.accounts);
                        if connection.events_seen > 0 {
                            debug!(events = connection.events_seen, "wallet state changed");
                        }
                        self.session.connection = Some(connection);
                        self.session.error = None;
                    }
                }
                Err(e) => self.session.error = Some(describe_error(&e)),
            }
        }
    }

    /// Reloads balance and history whenever the active account changes.
    fn follow_active_account(&mut self, tasks: &Tasks<'_>) {
        let active = self.session.active_account();
        if active == self.wallet.shown_account {
            return;
        }
        self.wallet.reset_for(active);
        if let Some(account) = active {
            info!(%account, "active account changed");
            tasks.run(
                self.wallet.balance_task.begin(),
                ConsoleCommand::RefreshBalance { account },
            );
            tasks.run(
                self.wallet.history_task.begin(),
                ConsoleCommand::LoadHistory { account },
            );
        }
    }

    fn sync_wallet(&mut self, tasks: &Tasks<'_>) {
        if !tasks.provider_available() {
            return;
        }
        if self.session.connection.is_none()
            || self.session.sync.is_pending()
            || self.session.connect.is_pending()
        {
            return;
        }
        if self.sync_timer.fire(Instant::now()) {
            tasks.run(self.session.sync.begin(), ConsoleCommand::SyncWallet);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let bridge = self.bridge.clone();
        let runtime = self.runtime.handle().clone();
        let tasks = Tasks {
            bridge: &bridge,
            runtime: &runtime,
            ctx,
        };

        if !self.started {
            self.started = true;
            // Mirrors a browser dapp asking for accounts on load.
            if tasks.provider_available() {
                tasks.run(self.session.connect.begin(), ConsoleCommand::ConnectWallet);
            }
        }

        self.poll_session();
        self.follow_active_account(&tasks);
        pages::wallet::poll(&mut self.wallet);
        pages::safes::poll(&mut self.safes);
        if let Some(details) = &mut self.details {
            pages::safe_details::poll(details);
        }

        let network_label = format!(
            "{} ({}) · wallet: {}",
            bridge.network().name,
            bridge.network().chain_id,
            bridge.provider_mode()
        );
        let mut actions = Vec::new();
        if let Some(route) = navbar::render(ctx, &mut self.navbar, self.route, &network_label) {
            actions.push(PageAction::Navigate(route));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                let action = match self.route {
                    Route::Wallet => {
                        pages::wallet::render(ui, &mut self.wallet, &self.session, &tasks)
                    }
                    Route::Safes => {
                        pages::safes::render(ui, &mut self.safes, &self.session, &tasks)
                    }
                    Route::SafeDetails(_) => match &mut self.details {
                        Some(details) => {
                            pages::safe_details::render(ui, details, &self.session, &tasks)
                        }
                        None => None,
                    },
                };
                actions.extend(action);
                ui.add_space(10.0);
                ui.separator();
                ui.label(
                    egui::RichText::new(format!(
                        "store: {} · build {}",
                        bridge.store_location(),
                        &env!("GIT_HASH")[..env!("GIT_HASH").len().min(8)]
                    ))
                    .weak()
                    .small(),
                );
            });
        });

        for action in actions {
            self.handle_action(action, &tasks);
        }

        self.sync_wallet(&tasks);
        ctx.request_repaint_after(WALLET_SYNC_INTERVAL);
    }
}
