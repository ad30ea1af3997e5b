//! Top navigation bar: route links plus an editable location field.

use mural_safe_core::{is_selected, Route, NAV_ROUTES};

#[derive(Default)]
pub struct NavbarState {
    /// Contents of the location field while the user edits it.
    pub location: String,
    pub editing: bool,
    pub error: Option<String>,
}

/// Renders the navbar and returns the route the user asked for, if any.
pub fn render(
    ctx: &egui::Context,
    state: &mut NavbarState,
    current: Route,
    network_label: &str,
) -> Option<Route> {
    let current_path = current.path();
    let mut target = None;

    egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("Mural Safe").size(22.0).strong());
            ui.add_space(20.0);
            ui.separator();
            ui.add_space(10.0);

            for entry in NAV_ROUTES {
                let selected = is_selected(entry.href, &current_path);
                if ui.selectable_label(selected, entry.label).clicked() {
                    match Route::parse(entry.href) {
                        Ok(route) => target = Some(route),
                        Err(e) => state.error = Some(e.to_string()),
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(network_label).weak());
            });
        });

        ui.horizontal(|ui| {
            if !state.editing {
                state.location = current_path.clone();
            }
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.location)
                    .desired_width(f32::INFINITY)
                    .font(egui::TextStyle::Monospace),
            );
            if response.gained_focus() {
                state.editing = true;
            }
            if response.lost_focus() {
                state.editing = false;
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    match Route::parse(&state.location) {
                        Ok(route) => {
                            state.error = None;
                            target = Some(route);
                        }
                        Err(e) => state.error = Some(e.to_string()),
                    }
                }
            }
        });
        if let Some(error) = &state.error {
            crate::ui::error_message(ui, error);
        }
        ui.add_space(4.0);
    });

    target
}
