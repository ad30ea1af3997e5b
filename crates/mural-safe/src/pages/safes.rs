//! Safes page: deploy a new multisig and list the ones this app knows about.

use mural_safe_core::{ConsoleCommand, Route};

use super::PageAction;
use crate::app::Tasks;
use crate::state::{describe_error, SafesPageState, Session};
use crate::ui;

pub fn poll(page: &mut SafesPageState) {
    if let Some(result) = page.list_task.take() {
        match result {
            Ok(res) => {
                if let Some(safes) = res.safes {
                    page.safes = safes;
                }
                page.loaded = true;
            }
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
    if let Some(result) = page.create_task.take() {
        match result {
            Ok(res) => {
                page.last_deployed = res.deployed_safe;
                if let Some(safes) = res.safes {
                    page.safes = safes;
                }
                page.form = Default::default();
                page.error = None;
            }
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
    if let Some(result) = page.forget_task.take() {
        match result {
            Ok(res) => {
                if let Some(safes) = res.safes {
                    page.safes = safes;
                }
            }
            Err(e) => page.error = Some(describe_error(&e)),
        }
    }
}

pub fn render(
    ui: &mut egui::Ui,
    page: &mut SafesPageState,
    session: &Session,
    tasks: &Tasks<'_>,
) -> Option<PageAction> {
    let mut action = None;
    if !page.loaded && !page.list_task.is_pending() && page.error.is_none() {
        tasks.run(page.list_task.begin(), ConsoleCommand::ListSafes);
    }

    ui::styled_heading(ui, "Multi Sig Wallets");
    ui::section_header(ui, "Create");

    let deployer = session.active_account();
    ui::number_input(ui, &mut page.form.threshold, "Threshold");
    ui.add(
        egui::TextEdit::multiline(&mut page.form.owners)
            .hint_text("List of approver addresses (ex 0x<address>,0x<address>,0x<address>)")
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .font(egui::TextStyle::Monospace),
    );
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let busy = page.create_task.is_pending();
        let clicked = ui::primary_button_enabled(ui, "Create Multi Sig Wallet", !busy)
            .on_disabled_hover_text("Deployment in progress")
            .clicked();
        if clicked {
            page.error = None;
            page.last_deployed = None;
            match deployer {
                Some(deployer) => tasks.run(
                    page.create_task.begin(),
                    ConsoleCommand::CreateSafe {
                        deployer,
                        form: page.form.clone(),
                    },
                ),
                None => page.error = Some("Connect a wallet first".to_owned()),
            }
        }
        if busy {
            ui::loading_spinner(ui, "Deploying...");
        }
    });
    if let Some(address) = page.last_deployed {
        ui::success_message(ui, "Safe deployed");
        ui::address_row(ui, tasks.network(), &address);
    }
    if let Some(error) = &page.error {
        ui::error_message(ui, error);
    }

    ui::section_header(ui, "Available Safes");
    if page.list_task.is_pending() && !page.loaded {
        ui::loading_spinner(ui, "Loading...");
    } else if page.safes.is_empty() {
        ui.label("No safes yet. Deploy one above.");
    }

    let mut forget = None;
    for record in &page.safes {
        ui::card(ui, |ui| {
            ui.label("Safe Address:");
            ui::address_row(ui, tasks.network(), &record.address);
            ui.horizontal(|ui| {
                if ui::secondary_button(ui, "See Details").clicked() {
                    action = Some(PageAction::Navigate(Route::SafeDetails(record.address)));
                }
                if ui
                    .add_enabled(!page.forget_task.is_pending(), egui::Button::new("Forget"))
                    .on_hover_text("Remove from this list; the contract is untouched")
                    .clicked()
                {
                    forget = Some(record.address);
                }
            });
        });
        ui.add_space(6.0);
    }
    if let Some(safe) = forget {
        tasks.run(page.forget_task.begin(), ConsoleCommand::ForgetSafe { safe });
    }

    action
}
