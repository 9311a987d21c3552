use std::fs::{self, File};
use std::io::BufWriter;
use std::sync::Arc;

use chrono::Utc;
use eframe::{App, CreationContext, Frame};
use egui::{epaint::Shadow, Color32, FontFamily, FontId, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use rfd::FileDialog;
use strum::IntoEnumIterator;
use tracing::{info, warn};
use valora_pricing::{
    config::AppConfig,
    estimation::Estimator,
    export::{self, ExportError, ExportSummary},
    i18n::{Labels, Language},
    request::{RequestSlot, RequestStatus},
    speech::{SpeechClip, Speaker},
    storage::FileStorage,
    ConfirmationToken, EstimatePayload, MaterialItem, MaterialPatch, PricingError, Step,
    Transition, Workspace,
};

const ACCENT: Color32 = Color32::from_rgb(79, 70, 229);
const DANGER: Color32 = Color32::from_rgb(244, 63, 94);
const SLATE_50: Color32 = Color32::from_rgb(248, 250, 252);
const SLATE_200: Color32 = Color32::from_rgb(226, 232, 240);
const SLATE_800: Color32 = Color32::from_rgb(30, 41, 59);

fn apply_theme(ctx: &egui::Context) {
    let mut style = egui::Style {
        visuals: egui::Visuals::light(),
        ..Default::default()
    };
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.visuals.panel_fill = Color32::from_rgb(241, 245, 249);
    style.visuals.window_fill = Color32::WHITE;
    style.visuals.override_text_color = Some(SLATE_800);
    style.visuals.widgets.active.bg_fill = ACCENT;
    style.visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(79, 70, 229, 90);
    ctx.set_style(style);
}

enum PendingConfirm {
    Reset(ConfirmationToken),
    Overwrite { name: String, token: ConfirmationToken },
}

enum ExportKind {
    Pdf,
    Csv,
}

pub struct ValoraApp {
    workspace: Workspace<FileStorage>,
    estimator: Option<Arc<dyn Estimator>>,
    speaker: Option<Arc<dyn Speaker>>,
    estimate: RequestSlot<EstimatePayload>,
    speech: RequestSlot<SpeechClip>,
    language: Language,
    ai_input: String,
    save_name: String,
    status: String,
    quote_seed: u64,
    show_save: bool,
    show_projects: bool,
    show_help: bool,
    show_interstitial: bool,
    pending_confirm: Option<PendingConfirm>,
}

impl ValoraApp {
    pub fn new(cc: &CreationContext<'_>, config: AppConfig, storage: FileStorage) -> Self {
        apply_theme(&cc.egui_ctx);
        cc.egui_ctx.set_zoom_factor(config.ui_scale);

        let client = valora_pricing::gemini::GeminiClient::new(
            config.api_key.clone(),
            config.estimate_model.clone(),
            config.speech_model.clone(),
            config.voice.clone(),
        )
        .map(Arc::new)
        .map_err(|e| warn!(error = %e, "estimation client unavailable"))
        .ok();
        if client.as_ref().is_some_and(|c| !c.has_api_key()) {
            info!("no API key configured; AI estimates and narration are disabled");
        }

        Self {
            workspace: Workspace::open(storage),
            estimator: client.clone().map(|c| c as Arc<dyn Estimator>),
            speaker: client.map(|c| c as Arc<dyn Speaker>),
            estimate: RequestSlot::new("estimate", PricingError::EstimationUnavailable),
            speech: RequestSlot::new("speech", PricingError::SpeechUnavailable),
            language: config.language,
            ai_input: String::new(),
            save_name: String::new(),
            status: "Ready".to_string(),
            quote_seed: Utc::now().timestamp_subsec_nanos() as u64,
            show_save: false,
            show_projects: false,
            show_help: false,
            show_interstitial: false,
            pending_confirm: None,
        }
    }

    fn labels(&self) -> &'static Labels {
        self.language.labels()
    }

    /// Right-to-left languages hug the right edge.
    fn text_layout(&self) -> egui::Layout {
        let align = if self.language.is_rtl() {
            egui::Align::Max
        } else {
            egui::Align::Min
        };
        egui::Layout::top_down(align)
    }

    fn surface_panel() -> egui::Frame {
        egui::Frame::default()
            .fill(Color32::WHITE)
            .stroke(egui::Stroke::new(1.0, SLATE_200))
            .rounding(egui::Rounding::same(14.0))
            .inner_margin(egui::Margin::symmetric(16.0, 10.0))
            .outer_margin(egui::Margin::same(4.0))
            .shadow(Shadow {
                offset: egui::vec2(0.0, 2.0),
                blur: 10.0,
                spread: 0.0,
                color: Color32::from_black_alpha(18),
            })
    }

    fn card_frame() -> egui::Frame {
        egui::Frame::default()
            .fill(SLATE_50)
            .stroke(egui::Stroke::new(1.0, SLATE_200))
            .rounding(egui::Rounding::same(10.0))
            .inner_margin(egui::Margin::same(10.0))
    }

    fn on_transition(&mut self, transition: Option<Transition>) {
        if let Some(t) = transition {
            if t.show_interstitial {
                self.show_interstitial = true;
            }
            self.quote_seed = self.quote_seed.wrapping_add(1);
        }
    }

    fn poll_requests(&mut self) {
        match self.estimate.poll() {
            RequestStatus::Succeeded(payload) => {
                self.workspace.apply_estimate(Ok(payload));
                self.ai_input.clear();
                self.status = "Suggestion ready".to_string();
            }
            RequestStatus::Failed(e) => {
                self.status = e.to_string();
                self.workspace.apply_estimate(Err(e));
            }
            RequestStatus::Idle | RequestStatus::Pending => {}
        }

        match self.speech.poll() {
            RequestStatus::Succeeded(clip) => {
                self.status = format!("Narration ready ({:.1} s)", clip.duration_secs());
            }
            RequestStatus::Failed(e) => self.status = e.to_string(),
            RequestStatus::Idle | RequestStatus::Pending => {}
        }
    }

    fn start_estimate(&mut self) {
        let description = self.ai_input.trim().to_string();
        let Some(estimator) = self.estimator.clone() else {
            self.status = "AI estimates are unavailable".to_string();
            return;
        };
        if description.is_empty() {
            return;
        }
        if self.estimate.start(move || estimator.estimate(&description)) {
            self.workspace.begin_estimate();
        }
    }

    fn start_speech(&mut self, quote: &'static str) {
        let Some(speaker) = self.speaker.clone() else {
            return;
        };
        let language = self.language;
        self.speech.start(move || speaker.speak(quote, language));
    }

    fn request_reset(&mut self) {
        if let Some(token) = self.workspace.reset_all(None).token() {
            self.pending_confirm = Some(PendingConfirm::Reset(token.clone()));
        }
    }

    fn try_save(&mut self, confirm: Option<&ConfirmationToken>) {
        let name = self.save_name.clone();
        match self.workspace.save_project(&name, confirm) {
            Ok(_) => {
                self.status = format!("Saved {}", name.trim());
                self.show_save = false;
                self.save_name.clear();
            }
            Err(PricingError::DuplicateName { name, token }) => {
                self.pending_confirm = Some(PendingConfirm::Overwrite { name, token });
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn export(&mut self, kind: ExportKind) {
        let now = Utc::now();
        let (filter, ext) = match kind {
            ExportKind::Pdf => ("PDF", "pdf"),
            ExportKind::Csv => ("Spreadsheet (CSV)", "csv"),
        };
        let Some(path) = FileDialog::new()
            .add_filter(filter, &[ext])
            .set_file_name(export::file_name(ext, now))
            .save_file()
        else {
            return;
        };

        let summary = ExportSummary::new(self.workspace.state());
        let result = match kind {
            ExportKind::Pdf => export::render_pdf(&summary, now)
                .and_then(|bytes| fs::write(&path, bytes).map_err(ExportError::from)),
            ExportKind::Csv => File::create(&path)
                .map_err(ExportError::from)
                .and_then(|file| export::write_csv(&summary, BufWriter::new(file))),
        };
        self.status = match result {
            Ok(()) => {
                info!(path = %path.display(), "exported");
                format!("Exported {}", path.display())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "export failed");
                format!("Export failed: {e}")
            }
        };
    }

    fn titlebar(&mut self, ui: &mut Ui) {
        let t = self.labels();
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(t.title)
                    .font(FontId::new(22.0, FontFamily::Proportional))
                    .color(ACCENT),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .button(RichText::new(format!("⟲ {}", t.reset)).color(DANGER))
                    .clicked()
                {
                    self.request_reset();
                }
                if ui.button(self.language.toggled().code()).clicked() {
                    self.language = self.language.toggled();
                }
                ui.menu_button(format!("📂 {}", t.saved_projects), |ui| {
                    if ui.button(t.saved_projects).clicked() {
                        self.show_projects = true;
                        ui.close_menu();
                    }
                    if ui.button(t.save_project).clicked() {
                        self.show_save = true;
                        ui.close_menu();
                    }
                });
                if ui.button(t.how_to_use).clicked() {
                    self.show_help = true;
                }
            });
        });
    }

    fn quote_banner(&mut self, ui: &mut Ui) {
        let t = self.labels();
        let quote = t.quote(self.workspace.navigator().current(), self.quote_seed);
        ui.horizontal(|ui| {
            let speaking = self.speech.is_pending();
            let can_speak = self.speaker.is_some() && !speaking;
            if ui
                .add_enabled(can_speak, egui::Button::new(if speaking { "…" } else { "🔊" }))
                .clicked()
            {
                self.start_speech(quote);
            }
            ui.label(RichText::new(format!("\"{quote}\"")).italics().weak());
        });
    }

    fn step_header(&mut self, ui: &mut Ui) {
        let t = self.labels();
        let current = self.workspace.navigator().current();
        let mut jump = None;
        ui.horizontal(|ui| {
            for step in Step::iter() {
                let text = RichText::new(format!("{}. {}", step.index() + 1, t.step_title(step)));
                let text = if step == current {
                    text.strong().color(ACCENT)
                } else {
                    text
                };
                if ui.selectable_label(step == current, text).clicked() && step != current {
                    jump = Some(step);
                }
            }
        });
        if let Some(step) = jump {
            let transition = self.workspace.navigator_mut().goto(step);
            self.on_transition(Some(transition));
        }
        Self::card_frame().show(ui, |ui| {
            ui.with_layout(self.text_layout(), |ui| {
                ui.label(RichText::new(t.instructions(current)).small());
            });
        });
    }

    fn materials_view(&mut self, ui: &mut Ui) {
        let t = self.labels();
        ui.horizontal(|ui| {
            ui.heading(t.materials);
            if ui.button(format!("+ {}", t.add_material)).clicked() {
                self.workspace.edit(|s| s.add_material());
            }
        });

        self.ai_box(ui);
        ui.add_space(8.0);

        let items: Vec<MaterialItem> = self.workspace.state().materials().to_vec();
        if items.is_empty() {
            ui.label(RichText::new(t.no_materials).italics().weak());
            return;
        }
        let (edits, removed) = Self::material_table(ui, "materials", t, &items);
        for (id, patch) in edits {
            self.workspace.edit(|s| s.update_material(&id, &patch));
        }
        if let Some(id) = removed {
            self.workspace.edit(|s| s.remove_material(&id));
        }
    }

    /// Editable grid of line items. Returns the edits and at most one removal.
    fn material_table(
        ui: &mut Ui,
        id_source: &str,
        t: &Labels,
        items: &[MaterialItem],
    ) -> (Vec<(String, MaterialPatch)>, Option<String>) {
        let mut edits = Vec::new();
        let mut removed = None;
        ui.push_id(id_source, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::remainder().at_least(160.0))
                .column(Column::exact(70.0))
                .column(Column::exact(90.0))
                .column(Column::exact(90.0))
                .column(Column::exact(30.0))
                .header(20.0, |mut header| {
                    for title in [t.material_name, t.qty, t.unit_price, t.total_cost, ""] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for item in items {
                        body.row(26.0, |mut row| {
                            let mut patch = MaterialPatch::default();
                            row.col(|ui| {
                                let mut name = item.name.clone();
                                if ui
                                    .add(egui::TextEdit::singleline(&mut name).hint_text(t.material_name))
                                    .changed()
                                {
                                    patch.name = Some(name);
                                }
                            });
                            row.col(|ui| {
                                let mut qty = item.quantity;
                                if ui.add(egui::DragValue::new(&mut qty).speed(0.1)).changed() {
                                    patch.quantity = Some(qty);
                                }
                            });
                            row.col(|ui| {
                                let mut price = item.unit_price;
                                if ui
                                    .add(egui::DragValue::new(&mut price).speed(0.5).prefix("$"))
                                    .changed()
                                {
                                    patch.unit_price = Some(price);
                                }
                            });
                            row.col(|ui| {
                                ui.label(export::money(item.line_total()));
                            });
                            row.col(|ui| {
                                if ui.button("🗑").clicked() {
                                    removed = Some(item.id.clone());
                                }
                            });
                            if patch != MaterialPatch::default() {
                                edits.push((item.id.clone(), patch));
                            }
                        });
                    }
                });
        });
        (edits, removed)
    }

    fn ai_box(&mut self, ui: &mut Ui) {
        let t = self.labels();
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new(format!("✨ {}", t.ai_help)).strong());
            ui.horizontal(|ui| {
                let loading = self.estimate.is_pending();
                let width = ui.available_width() - 110.0;
                let response = ui.add_enabled(
                    !loading,
                    egui::TextEdit::singleline(&mut self.ai_input)
                        .hint_text(t.ai_placeholder)
                        .desired_width(width),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let label = if loading { t.ai_loading } else { "🪄" };
                let can_run = !loading && !self.ai_input.trim().is_empty();
                if ui.add_enabled(can_run, egui::Button::new(label)).clicked()
                    || (submitted && can_run)
                {
                    self.start_estimate();
                }
            });

            if let Some(note) = self.workspace.suggestions().note() {
                let mut parts = Vec::new();
                if let Some(margin) = note.margin {
                    parts.push(format!("{}: {margin}%", t.margin));
                }
                if let Some(tax) = note.tax {
                    parts.push(format!("{}: {tax}%", t.tax));
                }
                if let Some(hours) = note.labor_hours {
                    parts.push(format!("{}: {hours}", t.hours));
                }
                ui.label(RichText::new(parts.join("  ·  ")).color(ACCENT));
                ui.label(RichText::new(&note.context).small().weak());
            }

            if !self.workspace.suggestions().can_accept() {
                return;
            }
            let pending = self.workspace.suggestions().pending().to_vec();
            let (edits, removed) = Self::material_table(ui, "pending", t, &pending);
            let tray = self.workspace.suggestions_mut();
            for (id, patch) in edits {
                tray.update_item(&id, &patch);
            }
            if let Some(id) = removed {
                tray.remove_item(&id);
            }
            ui.horizontal(|ui| {
                if ui.button(RichText::new(t.add_to_project).strong()).clicked() {
                    if let Some(added) = self.workspace.accept_suggestions() {
                        self.status = format!("Added {added} suggested materials");
                    }
                }
                if ui.button("✕").clicked() {
                    self.workspace.dismiss_suggestions();
                }
            });
        });
    }

    fn labor_view(&mut self, ui: &mut Ui) {
        let t = self.labels();
        ui.heading(t.labor);
        let state = self.workspace.state();
        let (mut rate, mut hours, mut fixed) =
            (state.labor_rate(), state.labor_hours(), state.fixed_labor());

        egui::Grid::new("labor_grid")
            .num_columns(2)
            .spacing([24.0, 12.0])
            .show(ui, |ui| {
                ui.label(t.hourly_rate);
                if ui
                    .add(egui::DragValue::new(&mut rate).speed(0.5).prefix("$"))
                    .changed()
                {
                    self.workspace.edit(|s| s.set_labor_rate(rate));
                }
                ui.end_row();
                ui.label(t.hours);
                if ui.add(egui::DragValue::new(&mut hours).speed(0.25)).changed() {
                    self.workspace.edit(|s| s.set_labor_hours(hours));
                }
                ui.end_row();
                ui.label(t.fixed_cost);
                if ui
                    .add(egui::DragValue::new(&mut fixed).speed(1.0).prefix("$"))
                    .changed()
                {
                    self.workspace.edit(|s| s.set_fixed_labor(fixed));
                }
                ui.end_row();
            });
        ui.separator();
        ui.label(format!(
            "{}: {}",
            t.labor,
            export::money(self.workspace.totals().labor_total)
        ));
    }

    fn margin_view(&mut self, ui: &mut Ui) {
        let t = self.labels();
        ui.heading(t.profit_tax);
        let mut margin = self.workspace.state().profit_margin();
        let mut tax = self.workspace.state().tax_rate();

        if ui
            .add(egui::Slider::new(&mut margin, 0.0..=100.0).step_by(1.0).suffix("%").text(t.margin))
            .changed()
        {
            self.workspace.edit(|s| s.set_profit_margin(margin));
        }
        if ui
            .add(egui::Slider::new(&mut tax, 0.0..=100.0).step_by(0.5).suffix("%").text(t.tax))
            .changed()
        {
            self.workspace.edit(|s| s.set_tax_rate(tax));
        }
    }

    fn summary_view(&mut self, ui: &mut Ui) {
        let t = self.labels();
        ui.heading(t.summary);
        let state = self.workspace.state();
        let totals = state.totals();

        Self::card_frame().show(ui, |ui| {
            egui::Grid::new("summary_grid").num_columns(2).show(ui, |ui| {
                let rows = [
                    (t.materials.to_string(), totals.materials_total),
                    (t.labor.to_string(), totals.labor_total),
                    (t.total_cost.to_string(), totals.subtotal),
                    (format!("{} ({}%)", t.margin, state.profit_margin()), totals.profit_amount),
                    (format!("{} ({}%)", t.tax, state.tax_rate()), totals.tax_amount),
                ];
                for (label, value) in rows {
                    ui.label(label);
                    ui.label(export::money(value));
                    ui.end_row();
                }
            });
        });

        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(t.selling_price).weak());
            ui.label(
                RichText::new(export::money(totals.final_price))
                    .font(FontId::new(44.0, FontFamily::Proportional))
                    .strong()
                    .color(ACCENT),
            );
        });
        ui.add_space(10.0);

        ui.columns(3, |columns| {
            if columns[0].button(format!("📄 {}", t.export_pdf)).clicked() {
                self.export(ExportKind::Pdf);
            }
            if columns[1].button(format!("📊 {}", t.export_csv)).clicked() {
                self.export(ExportKind::Csv);
            }
            if columns[2].button(format!("💾 {}", t.save_project)).clicked() {
                self.show_save = true;
            }
        });
    }

    fn navigation(&mut self, ui: &mut Ui) {
        let t = self.labels();
        let current = self.workspace.navigator().current();
        ui.horizontal(|ui| {
            if current != Step::Materials && ui.button(format!("◀ {}", t.prev)).clicked() {
                let transition = self.workspace.navigator_mut().back();
                self.on_transition(transition);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if current != Step::Summary
                    && ui
                        .button(RichText::new(format!("{} ▶", t.next)).strong())
                        .clicked()
                {
                    let transition = self.workspace.navigator_mut().next();
                    self.on_transition(transition);
                }
            });
        });
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        let t = self.labels();

        if self.show_help {
            let layout = self.text_layout();
            egui::Window::new(t.how_to_use)
                .open(&mut self.show_help)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.with_layout(layout, |ui| {
                        ui.label(t.description);
                        ui.separator();
                        for step in Step::iter() {
                            ui.label(RichText::new(t.step_title(step)).strong());
                            ui.label(t.instructions(step));
                        }
                    });
                });
        }

        if self.show_interstitial {
            egui::Window::new(t.summary)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(
                        RichText::new(export::money(self.workspace.totals().final_price))
                            .font(FontId::new(28.0, FontFamily::Proportional))
                            .color(ACCENT),
                    );
                    if ui.button(t.next).clicked() {
                        self.show_interstitial = false;
                    }
                });
        }

        if self.show_save {
            let mut open = true;
            let mut save = false;
            egui::Window::new(t.save_project)
                .open(&mut open)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.label(t.project_name);
                    let response = ui.text_edit_singleline(&mut self.save_name);
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    let can_save = !self.save_name.trim().is_empty();
                    if ui.add_enabled(can_save, egui::Button::new(t.save)).clicked()
                        || (submitted && can_save)
                    {
                        save = true;
                    }
                });
            if save {
                self.try_save(None);
            }
            self.show_save &= open;
        }

        if self.show_projects {
            let mut open = true;
            let mut load = None;
            let mut delete = None;
            egui::Window::new(t.saved_projects)
                .open(&mut open)
                .collapsible(false)
                .show(ctx, |ui| {
                    if self.workspace.projects().is_empty() {
                        ui.label(RichText::new(t.no_projects).weak());
                    }
                    egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                        for project in self.workspace.projects().iter() {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(RichText::new(&project.name).strong());
                                    ui.small(project.date.format("%Y-%m-%d").to_string());
                                });
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.button(RichText::new("🗑").color(DANGER)).clicked() {
                                            delete = Some(project.id.clone());
                                        }
                                        if ui.button(t.load).clicked() {
                                            load = Some(project.id.clone());
                                        }
                                    },
                                );
                            });
                            ui.separator();
                        }
                    });
                });
            if let Some(id) = load {
                match self.workspace.load_project(&id) {
                    Ok(()) => {
                        self.status = "Project loaded".to_string();
                        open = false;
                    }
                    Err(e) => self.status = e.to_string(),
                }
            }
            if let Some(id) = delete {
                self.workspace.delete_project(&id);
            }
            self.show_projects &= open;
        }

        if let Some(pending) = &self.pending_confirm {
            let message = match pending {
                PendingConfirm::Reset(_) => t.reset_confirm.to_string(),
                PendingConfirm::Overwrite { name, .. } => format!("{}\n\n{name}", t.overwrite),
            };
            let mut decision = None;
            egui::Window::new(t.confirm)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.horizontal(|ui| {
                        if ui.button(RichText::new(t.confirm).color(DANGER)).clicked() {
                            decision = Some(true);
                        }
                        if ui.button(t.cancel).clicked() {
                            decision = Some(false);
                        }
                    });
                });

            match (decision, self.pending_confirm.take()) {
                (Some(true), Some(PendingConfirm::Reset(token))) => {
                    if self.workspace.reset_all(Some(&token)).is_applied() {
                        self.ai_input.clear();
                        self.status = "All data reset".to_string();
                    }
                }
                (Some(true), Some(PendingConfirm::Overwrite { token, .. })) => {
                    self.try_save(Some(&token));
                }
                (None, still_open) => self.pending_confirm = still_open,
                _ => {}
            }
        }
    }
}

impl App for ValoraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_requests();

        egui::TopBottomPanel::top("titlebar")
            .frame(Self::surface_panel())
            .show(ctx, |ui| self.titlebar(ui));

        egui::TopBottomPanel::bottom("status")
            .frame(Self::surface_panel())
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(self.status.as_str());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(export::money(self.workspace.totals().final_price))
                                .strong()
                                .color(ACCENT),
                        );
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(Self::surface_panel().inner_margin(egui::Margin::same(18.0)))
            .show(ctx, |ui| {
                self.quote_banner(ui);
                self.step_header(ui);
                ui.separator();
                let step = self.workspace.navigator().current();
                egui::ScrollArea::vertical()
                    .max_height(ui.available_height() - 48.0)
                    .show(ui, |ui| match step {
                        Step::Materials => self.materials_view(ui),
                        Step::Labor => self.labor_view(ui),
                        Step::Margin => self.margin_view(ui),
                        Step::Summary => self.summary_view(ui),
                    });
                ui.separator();
                self.navigation(ui);
            });

        self.dialogs(ctx);
        if self.estimate.is_pending() || self.speech.is_pending() {
            ctx.request_repaint();
        }
    }
}
