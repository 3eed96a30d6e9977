use client_core::{FormPhase, Settings, Slice};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{domain::FormField, error::FormError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiError, UiEvent};
use crate::controller::orchestration::{dispatch_all, dispatch_backend_command};
use crate::controller::reducer::{AppView, Screen, StatusBannerSeverity};
use crate::ui::map::{show_map, MapViewport};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(52, 203, 121);
const MAP_HEIGHT: f32 = 320.0;

pub struct CollectPointApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    screen: Screen,
    map: MapViewport,
    default_zoom: u8,
    map_moved_by_user: bool,
}

impl CollectPointApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &Settings,
    ) -> Self {
        let fallback = settings.fallback_center();
        Self {
            cmd_tx,
            ui_rx,
            screen: Screen::new(fallback),
            map: MapViewport::new(fallback, settings.map_zoom),
            default_zoom: settings.map_zoom,
            map_moved_by_user: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.screen.apply_event(event);
        }
    }

    fn open_create_point(&mut self) {
        let cmds = self.screen.open_create_point();
        dispatch_all(&self.cmd_tx, cmds, &mut self.screen.status);
        self.map = MapViewport::new(self.screen.form.initial_center(), self.default_zoom);
        self.map_moved_by_user = false;
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.screen.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
                StatusBannerSeverity::Success => (
                    egui::Color32::from_rgb(34, 92, 62),
                    egui::Stroke::new(1.0, ACCENT),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.screen.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    /// Inline error for a failed slice. Returns true when Retry was clicked.
    fn slice_error(ui: &mut egui::Ui, err: &FormError) -> bool {
        let err = UiError::from_form_error(err);
        let mut retry = false;
        ui.horizontal_wrapped(|ui| {
            ui.colored_label(
                egui::Color32::from_rgb(220, 110, 110),
                format!("{}: {}", err_label(err.category()), err.message()),
            );
            if err.is_retryable() && ui.small_button("Retry").clicked() {
                retry = true;
            }
        });
        retry
    }

    fn show_home(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            ui.add_space((avail.y * 0.18).clamp(18.0, 120.0));
            ui.vertical_centered(|ui| {
                ui.set_width(avail.x.clamp(420.0, 560.0));
                self.show_status_banner(ui);
                ui.heading(egui::RichText::new("Ecoleta").size(34.0).color(ACCENT));
                ui.add_space(6.0);
                ui.label("Your marketplace for waste collection.");
                ui.weak("Help people find collection points efficiently.");
                ui.add_space(24.0);

                let btn = egui::Button::new(
                    egui::RichText::new("Register a collect point").strong().size(16.0),
                )
                .fill(ACCENT)
                .min_size(egui::vec2(ui.available_width(), 44.0));
                if ui.add(btn).clicked() {
                    self.open_create_point();
                }

                ui.add_space(16.0);
                ui.horizontal_wrapped(|ui| {
                    ui.small("Status:");
                    ui.small(egui::RichText::new(&self.screen.status).weak());
                });
            });
        });
    }

    fn show_create_point(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("create_point_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Ecoleta").strong().color(ACCENT));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Back to home").clicked() {
                        self.screen.back_home();
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("create_point_status").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.screen.status).weak());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_max_width(720.0);
                ui.heading("Adding a collect point");
                ui.add_space(8.0);
                self.show_status_banner(ui);

                let editable = self.screen.form.is_submittable();
                ui.add_enabled_ui(editable, |ui| {
                    self.show_main_data(ui);
                    ui.add_space(12.0);
                    self.show_address(ui);
                    ui.add_space(12.0);
                    self.show_items(ui);
                });

                ui.add_space(16.0);
                let label = if *self.screen.form.phase() == FormPhase::Submitting {
                    "Saving..."
                } else {
                    "Save collect point"
                };
                let btn = egui::Button::new(egui::RichText::new(label).strong().size(16.0))
                    .fill(ACCENT)
                    .min_size(egui::vec2(260.0, 44.0));
                if ui.add_enabled(editable, btn).clicked() {
                    if let Some(cmd) = self.screen.submit() {
                        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.screen.status);
                    }
                }
            });
        });
    }

    fn fieldset(ui: &mut egui::Ui, title: &str, hint: Option<&str>, add: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::NONE
            .fill(ui.visuals().faint_bg_color)
            .corner_radius(12.0)
            .inner_margin(egui::Margin::symmetric(16, 14))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(20.0));
                    if let Some(hint) = hint {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.weak(hint);
                        });
                    }
                });
                ui.add_space(8.0);
                add(ui);
            });
    }

    fn show_main_data(&mut self, ui: &mut egui::Ui) {
        let form = &mut self.screen.form;
        Self::fieldset(ui, "Main Data", None, |ui| {
            for field in FormField::ALL {
                ui.label(egui::RichText::new(field.label()).strong());
                let mut buf = form.data().get(field).to_string();
                let edit = egui::TextEdit::singleline(&mut buf)
                    .id_salt(field.key())
                    .desired_width(f32::INFINITY);
                if ui.add_sized([ui.available_width(), 30.0], edit).changed() {
                    form.set_field(field, buf);
                }
                ui.add_space(4.0);
            }
        });
    }

    fn show_address(&mut self, ui: &mut egui::Ui) {
        if !self.map_moved_by_user {
            self.map.center = self.screen.form.initial_center();
        }

        let mut clicked = None;
        let mut panned = false;
        let mut retry = false;
        let mut state_choice: Option<Option<String>> = None;
        let mut city_choice: Option<Option<String>> = None;

        let map = &mut self.map;
        let form = &self.screen.form;
        Self::fieldset(ui, "Address", Some("Select address on the map"), |ui| {
            if let Slice::Failed(err) = form.location() {
                retry |= Self::slice_error(ui, err);
            }

            ui.horizontal(|ui| {
                if ui.small_button("+").clicked() {
                    map.zoom_in();
                }
                if ui.small_button("-").clicked() {
                    map.zoom_out();
                }
                let position = form.selected_position();
                ui.weak(format!(
                    "Selected: {:.6}, {:.6}",
                    position.latitude, position.longitude
                ));
            });
            let response = show_map(ui, map, form.selected_position(), MAP_HEIGHT);
            clicked = response.clicked;
            panned = response.panned;

            ui.add_space(8.0);
            ui.columns(2, |columns| {
                let ui = &mut columns[0];
                ui.label(egui::RichText::new("State").strong());
                let selected_text = form
                    .selected_state()
                    .and_then(|initials| {
                        form.states()
                            .ready()
                            .and_then(|states| states.iter().find(|s| s.initials == initials))
                            .map(|s| s.label())
                    })
                    .or_else(|| form.selected_state().map(str::to_string))
                    .unwrap_or_else(|| "Select a state".to_string());
                egui::ComboBox::from_id_salt("state")
                    .selected_text(selected_text)
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(form.selected_state().is_none(), "Select a state")
                            .clicked()
                        {
                            state_choice = Some(None);
                        }
                        for state in form.states().ready().into_iter().flatten() {
                            let selected = form.selected_state() == Some(state.initials.as_str());
                            if ui.selectable_label(selected, state.label()).clicked() {
                                state_choice = Some(Some(state.initials.clone()));
                            }
                        }
                    });
                match form.states() {
                    Slice::Loading => {
                        ui.weak("Loading states...");
                    }
                    Slice::Failed(err) => retry |= Self::slice_error(ui, err),
                    _ => {}
                }

                let ui = &mut columns[1];
                ui.label(egui::RichText::new("City").strong());
                egui::ComboBox::from_id_salt("city")
                    .selected_text(form.selected_city().unwrap_or("Select a city"))
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(form.selected_city().is_none(), "Select a city")
                            .clicked()
                        {
                            city_choice = Some(None);
                        }
                        for city in form.cities().ready().into_iter().flatten() {
                            let selected = form.selected_city() == Some(city.as_str());
                            if ui.selectable_label(selected, city.as_str()).clicked() {
                                city_choice = Some(Some(city.clone()));
                            }
                        }
                    });
                match form.cities() {
                    Slice::Loading => {
                        ui.weak("Loading cities...");
                    }
                    Slice::Failed(err) => retry |= Self::slice_error(ui, err),
                    _ => {}
                }
            });
        });

        if panned {
            self.map_moved_by_user = true;
        }
        if let Some(position) = clicked {
            self.screen.form.set_map_position(position);
        }
        if let Some(state) = state_choice {
            if let Some(cmd) = self.screen.select_state(state) {
                dispatch_backend_command(&self.cmd_tx, cmd, &mut self.screen.status);
            }
        }
        if let Some(city) = city_choice {
            self.screen.form.select_city(city);
        }
        if retry {
            self.retry_failed();
        }
    }

    fn show_items(&mut self, ui: &mut egui::Ui) {
        let mut toggled = None;
        let mut retry = false;
        let form = &self.screen.form;
        Self::fieldset(ui, "Collected items", Some("Select one or more items below"), |ui| {
            match form.items() {
                Slice::Loading => {
                    ui.weak("Loading items...");
                }
                Slice::Failed(err) => retry |= Self::slice_error(ui, err),
                _ => {}
            }

            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(10.0, 10.0);
                for item in form.selectable_items() {
                    let selected = form.is_item_selected(item.id);
                    let text = egui::RichText::new(&item.title).size(15.0);
                    let btn = egui::Button::new(text)
                        .selected(selected)
                        .min_size(egui::vec2(150.0, 56.0))
                        .stroke(if selected {
                            egui::Stroke::new(2.0, ACCENT)
                        } else {
                            egui::Stroke::NONE
                        });
                    if ui.add(btn).on_hover_text(item.image_url.as_str()).clicked() {
                        toggled = Some(item.id);
                    }
                }
            });
        });

        if let Some(id) = toggled {
            self.screen.form.toggle_item(id);
        }
        if retry {
            self.retry_failed();
        }
    }

    fn retry_failed(&mut self) {
        let cmds = self.screen.retry_failed();
        dispatch_all(&self.cmd_tx, cmds, &mut self.screen.status);
    }
}

impl eframe::App for CollectPointApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        match self.screen.view {
            AppView::Home => self.show_home(ctx),
            AppView::CreatePoint => self.show_create_point(ctx),
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
