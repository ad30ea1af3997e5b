//! Details for one safe plus the owner add/remove forms.

use mural_safe_core::{format_ether, ConsoleCommand, Route, SafeInfo};

use super::PageAction;
use crate::app::Tasks;
use crate::state::{describe_error, SafeDetailsState, Session};
use crate::ui;

pub fn poll(page: &mut SafeDetailsState) {
    if let Some(result) = page.load_task.take() {
        match result {
            Ok(res) => page.info = res.safe_info.or(page.info.take()),
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
    if let Some(result) = page.change_task.take() {
        match result {
            Ok(res) => {
                page.last_receipt = res.receipt;
                if res.safe_info.is_some() {
                    page.info = res.safe_info;
                }
                page.add_form = Default::default();
                page.remove_form = Default::default();
                page.error = None;
            }
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
}

pub fn render(
    ui: &mut egui::Ui,
    page: &mut SafeDetailsState,
    session: &Session,
    tasks: &Tasks<'_>,
) -> Option<PageAction> {
    let mut action = None;
    let network = tasks.network();

    if ui.link("← Safes").clicked() {
        action = Some(PageAction::Navigate(Route::Safes));
    }
    ui::styled_heading(ui, "Safe Details");
    ui::address_row(ui, network, &page.safe);

    match &page.info {
        Some(info) => info_grid(ui, info),
        None if page.load_task.is_pending() => ui::loading_spinner(ui, "Loading safe..."),
        None => {}
    }
    if ui::secondary_button(ui, "Reload").clicked() && !page.load_task.is_pending() {
        tasks.run(
            page.load_task.begin(),
            ConsoleCommand::LoadSafe { safe: page.safe },
        );
    }

    let executor = session.active_account();
    let busy = page.change_task.is_pending();
    let ready = page.info.is_some() && !busy;

    ui::section_header(ui, "Add Owner");
    ui::number_input(
        ui,
        &mut page.add_form.threshold,
        "New Threshold (Optional). If not provided, the current threshold will be increased by one.",
    );
    ui::address_input(ui, &mut page.add_form.owner_address, "Owner Addresses (ex 0x<address>)");
    if ui::primary_button_enabled(ui, "Add owner", ready).clicked() {
        match executor {
            Some(executor) => tasks.run(
                page.change_task.begin(),
                ConsoleCommand::AddOwner {
                    executor,
                    safe: page.safe,
                    form: page.add_form.clone(),
                },
            ),
            None => page.error = Some("Connect a wallet first".to_owned()),
        }
    }

    ui::section_header(ui, "Remove Owner");
    ui::number_input(
        ui,
        &mut page.remove_form.threshold,
        "New Threshold (Optional). If not provided, the current threshold will be decreased by one.",
    );
    ui::address_input(
        ui,
        &mut page.remove_form.owner_address,
        "Owner Addresses (ex 0x<address>)",
    );
    if ui::primary_button_enabled(ui, "Remove owner", ready).clicked() {
        match executor {
            Some(executor) => tasks.run(
                page.change_task.begin(),
                ConsoleCommand::RemoveOwner {
                    executor,
                    safe: page.safe,
                    form: page.remove_form.clone(),
                },
            ),
            None => page.error = Some("Connect a wallet first".to_owned()),
        }
    }

    ui.add_space(8.0);
    if busy {
        ui::loading_spinner(ui, "Executing safe transaction...");
    }
    if let Some(receipt) = &page.last_receipt {
        ui::success_message(
            ui,
            &format!(
                "Executed in block {}",
                receipt
                    .block_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_owned())
            ),
        );
        ui::tx_link(ui, network, &receipt.tx_hash, &receipt.tx_hash.to_string());
    }
    if let Some(error) = &page.error {
        ui::error_message(ui, error);
    }

    action
}

fn info_grid(ui: &mut egui::Ui, info: &SafeInfo) {
    ui::card(ui, |ui| {
        egui::Grid::new("safe_info")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Balance:");
                ui.label(format!("{} ETH", format_ether(info.balance)));
                ui.end_row();
                ui.label("Threshold:");
                ui.label(format!("{} of {}", info.threshold, info.owners.len()));
                ui.end_row();
                ui.label("Nonce:");
                ui.label(info.nonce.to_string());
                ui.end_row();
                ui.label("Version:");
                ui.label(info.version.as_str());
                ui.end_row();
            });
        ui.add_space(6.0);
        ui.label(egui::RichText::new("Owners").strong());
        for owner in &info.owners {
            ui.label(egui::RichText::new(owner.to_string()).monospace());
        }
    });
}
