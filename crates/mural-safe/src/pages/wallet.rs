//! Wallet page: connection button, balance, ETH transfer and history.

use std::time::{SystemTime, UNIX_EPOCH};

use mural_safe_core::{
    format_ether, relative_time, ConsoleCommand, HistoryEntry, Network, OnboardingButton,
    OnboardingPhase,
};
use mural_safe_adapters::WALLET_RPC_URL_ENV;

use super::PageAction;
use crate::app::Tasks;
use crate::state::{describe_error, Session, WalletPageState};
use crate::ui;

/// Applies finished background work to the page.
pub fn poll(page: &mut WalletPageState) {
    if let Some(result) = page.balance_task.take() {
        match result {
            Ok(res) => page.balance = res.balance.or(page.balance),
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
    if let Some(result) = page.history_task.take() {
        match result {
            Ok(res) => page.history = res.history,
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
    if let Some(result) = page.send_task.take() {
        match result {
            Ok(res) => {
                page.last_tx = res.tx_hash;
                if res.balance.is_some() {
                    page.balance = res.balance;
                }
                page.send_form = Default::default();
                page.error = None;
            }
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
}

pub fn render(
    ui: &mut egui::Ui,
    page: &mut WalletPageState,
    session: &Session,
    tasks: &Tasks<'_>,
) -> Option<PageAction> {
    let mut action = None;
    ui::styled_heading(ui, "Wallet");
    ui.add_space(8.0);

    let button = OnboardingButton::derive(tasks.provider_available(), session.accounts());
    ui.horizontal(|ui| {
        if ui::primary_button_enabled(ui, button.label, button.enabled).clicked() {
            action = Some(PageAction::Onboard(button.action));
        }
        if session.connect.is_pending() {
            ui.spinner();
        }
    });
    if session.onboarding == OnboardingPhase::InProgress {
        ui::warning_message(ui, &onboarding_hint());
    }
    if let Some(error) = &session.error {
        ui::error_message(ui, error);
    }
    if let Some(connection) = &session.connection {
        if connection.chain_mismatch() {
            ui::warning_message(
                ui,
                &format!(
                    "Wallet is on chain {}, this app expects chain {}.",
                    connection
                        .chain_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "unknown".to_owned()),
                    connection.expected_chain_id
                ),
            );
        }
    }

    let Some(account) = session.active_account() else {
        ui.add_space(10.0);
        ui.label("Connect a wallet to see its balance and history.");
        return action;
    };
    let network = tasks.network();

    ui::section_header(ui, "Account");
    ui::card(ui, |ui| {
        ui::address_row(ui, network, &account);
        ui.horizontal(|ui| {
            ui.label("Balance:");
            match page.balance {
                Some(balance) => {
                    ui.label(egui::RichText::new(format!("{} ETH", format_ether(balance))).strong());
                }
                None if page.balance_task.is_pending() => ui::loading_spinner(ui, "Loading..."),
                None => {
                    ui.label("-");
                }
            }
            if ui.small_button("⟳").on_hover_text("Refresh").clicked()
                && !page.balance_task.is_pending()
            {
                tasks.run(
                    page.balance_task.begin(),
                    ConsoleCommand::RefreshBalance { account },
                );
            }
        });
    });

    ui::section_header(ui, "Send ETH");
    ui::address_input(ui, &mut page.send_form.to, "To Address");
    ui::number_input(ui, &mut page.send_form.amount, "Amount");
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let busy = page.send_task.is_pending();
        if ui::primary_button_enabled(ui, "Send ETH", !busy).clicked() {
            page.error = None;
            page.last_tx = None;
            tasks.run(
                page.send_task.begin(),
                ConsoleCommand::SendEth {
                    from: account,
                    form: page.send_form.clone(),
                },
            );
        }
        if busy {
            ui::loading_spinner(ui, "Waiting for wallet...");
        }
    });
    if let Some(hash) = page.last_tx {
        ui::success_message(ui, "Transaction submitted");
        ui::tx_link(ui, network, &hash, &hash.to_string());
    }
    if let Some(error) = &page.error {
        ui::error_message(ui, error);
    }

    ui::section_header(ui, "History");
    ui.horizontal(|ui| {
        if ui::secondary_button(ui, "Reload").clicked() && !page.history_task.is_pending() {
            tasks.run(
                page.history_task.begin(),
                ConsoleCommand::LoadHistory { account },
            );
        }
        if page.history_task.is_pending() {
            ui.spinner();
        }
    });
    match &page.history {
        Some(entries) if entries.is_empty() => {
            ui.label("No transactions yet.");
        }
        Some(entries) => {
            let now = now_secs();
            for entry in entries {
                history_card(ui, network, entry, now);
                ui.add_space(6.0);
            }
        }
        None => {}
    }

    action
}

fn history_card(ui: &mut egui::Ui, network: &Network, entry: &HistoryEntry, now: u64) {
    ui::card(ui, |ui| {
        egui::Grid::new(("history", entry.hash))
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Hash:");
                ui.label(egui::RichText::new(entry.hash.to_string()).monospace());
                ui.end_row();
                ui.label("From:");
                ui.label(egui::RichText::new(entry.from.to_string()).monospace());
                ui.end_row();
                ui.label("To:");
                ui.label(
                    egui::RichText::new(
                        entry
                            .to
                            .map(|to| to.to_string())
                            .unwrap_or_else(|| "contract creation".to_owned()),
                    )
                    .monospace(),
                );
                ui.end_row();
                ui.label("Amount:");
                ui.label(format!("{} ETH", format_ether(entry.value)));
                ui.end_row();
                if let Some(timestamp) = entry.timestamp {
                    ui.label("When:");
                    ui.label(timestamp_text(now, timestamp));
                    ui.end_row();
                }
            });
        if entry.is_error {
            ui::warning_message(ui, "Transaction failed");
        }
        ui::tx_link(ui, network, &entry.hash, "View on Etherscan");
    });
}

fn onboarding_hint() -> String {
    format!("Finish installing the wallet, then restart with {WALLET_RPC_URL_ENV} pointing at it.")
}

/// Unix seconds followed by a relative suffix, e.g. `1700000000 (2 days ago)`.
fn timestamp_text(now: u64, timestamp: u64) -> String {
    format!("{timestamp} ({})", relative_time(now, timestamp))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
