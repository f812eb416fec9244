//! egui surface: request form, history list, and response panel.

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use request_core::{HttpTransport, RequestRecord, RequestSession, ResponseView};
use shared::domain::Method;

use crate::Args;

const POLL_INTERVAL: Duration = Duration::from_millis(150);
const TIPS: &str = "Ctrl+Enter (Cmd+Enter on macOS) sends the request from any field. \
Provide headers as one `Name: value` per line. \
Response bodies that parse as JSON are shown re-indented.";

pub struct WorkbenchApp {
    session: RequestSession,
    method: Method,
    url: String,
    headers_text: String,
    body_text: String,
    status_line: String,
    elapsed: String,
    response_headers: String,
    response_body: String,
    status_note: String,
    selected: Option<usize>,
    confirm_clear: bool,
}

impl WorkbenchApp {
    pub fn new(args: &Args) -> Self {
        let transport = HttpTransport::with_timeout(Duration::from_secs(args.timeout_secs));
        Self {
            session: RequestSession::with_transport(Arc::new(transport)),
            method: Method::Get,
            url: args.url.clone().unwrap_or_default(),
            headers_text: String::new(),
            body_text: String::new(),
            status_line: "-".to_string(),
            elapsed: "-".to_string(),
            response_headers: String::new(),
            response_body: String::new(),
            status_note: "Ready".to_string(),
            selected: None,
            confirm_clear: false,
        }
    }

    fn send_current(&mut self) {
        match self
            .session
            .submit(self.method, &self.url, &self.headers_text, &self.body_text)
        {
            Ok(submission) => {
                self.status_line = "Pending...".to_string();
                self.elapsed = "-".to_string();
                self.response_headers.clear();
                self.response_body.clear();
                self.status_note = if submission.warnings.is_empty() {
                    format!("{} {} queued", self.method, self.url.trim())
                } else {
                    submission
                        .warnings
                        .iter()
                        .map(|warning| warning.to_string())
                        .collect::<Vec<_>>()
                        .join("; ")
                };
            }
            Err(err) => {
                tracing::warn!("submit rejected: {err}");
                self.status_note = err.to_string();
            }
        }
    }

    fn apply_response(&mut self, view: ResponseView) {
        self.status_line = view.status_line;
        self.elapsed = view.elapsed;
        self.response_headers = view.headers;
        self.response_body = view.body;
    }

    /// Loads a history entry back into the request form.
    fn load_entry(&mut self, index: usize) {
        let Ok(record) = self.session.history().get(index) else {
            return;
        };
        self.method = record.method;
        self.url = record.url.clone();
        self.headers_text = header_lines(record);
        self.body_text = record.body.clone();
        self.selected = Some(index);
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.selected.take() else {
            self.status_note = "Select a history entry first".to_string();
            return;
        };
        match self.session.delete(index) {
            Ok(()) => self.status_note = "History entry deleted".to_string(),
            Err(err) => self.status_note = err.to_string(),
        }
    }

    fn history_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("history_panel")
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("History");
                ui.separator();
                let len = self.session.history().len();
                let mut load = None;
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        // newest first; the store itself is oldest first
                        for display_row in 0..len {
                            let index = len - 1 - display_row;
                            let Ok(record) = self.session.history().get(index) else {
                                continue;
                            };
                            let is_selected = self.selected == Some(index);
                            if ui
                                .selectable_label(is_selected, history_row_label(record))
                                .clicked()
                            {
                                load = Some(index);
                            }
                        }
                    });
                if let Some(index) = load {
                    self.load_entry(index);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Load").clicked() {
                        if let Some(index) = self.selected {
                            self.load_entry(index);
                        }
                    }
                    if ui.button("Delete").clicked() {
                        self.delete_selected();
                    }
                    if ui.button("Clear").clicked() && !self.session.history().is_empty() {
                        self.confirm_clear = true;
                    }
                });
            });
    }

    fn central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Request");
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("method_select")
                    .selected_text(self.method.as_str())
                    .show_ui(ui, |ui| {
                        for method in Method::ALL {
                            ui.selectable_value(&mut self.method, method, method.as_str());
                        }
                    });
                ui.label("URL:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.url)
                        .hint_text("https://localhost:8080/api")
                        .desired_width(f32::INFINITY),
                );
            });
            ui.columns(2, |columns| {
                columns[0].label("Headers (Name: value per line)");
                columns[0].add(
                    egui::TextEdit::multiline(&mut self.headers_text)
                        .desired_rows(5)
                        .desired_width(f32::INFINITY),
                );
                columns[1].label("Body");
                columns[1].add(
                    egui::TextEdit::multiline(&mut self.body_text)
                        .desired_rows(5)
                        .desired_width(f32::INFINITY),
                );
            });
            if ui.button("Send").clicked() {
                self.send_current();
            }

            ui.separator();
            ui.heading("Response");
            ui.horizontal(|ui| {
                ui.label("Status:");
                ui.monospace(&self.status_line);
                ui.separator();
                ui.label("Elapsed:");
                ui.monospace(&self.elapsed);
            });
            ui.label("Headers");
            egui::ScrollArea::vertical()
                .id_salt("response_headers")
                .max_height(160.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    ui.monospace(&self.response_headers);
                });
            ui.label("Body");
            egui::ScrollArea::vertical()
                .id_salt("response_body")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.response_body.as_str())
                            .desired_width(f32::INFINITY),
                    );
                });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(&self.status_note);
            ui.small(TIPS);
        });
    }

    fn confirm_clear_dialog(&mut self, ctx: &egui::Context) {
        if !self.confirm_clear {
            return;
        }
        egui::Window::new("Clear history")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Remove all saved requests?");
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.session.clear();
                        self.selected = None;
                        self.status_note = "History cleared".to_string();
                        self.confirm_clear = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_clear = false;
                    }
                });
            });
    }
}

impl eframe::App for WorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drain completed exchanges first so this frame renders fresh state.
        let report = self.session.poll();
        if let Some(view) = report.latest_response {
            self.apply_response(view);
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Enter)) {
            self.send_current();
        }

        self.history_panel(ctx);
        self.status_bar(ctx);
        self.central_panel(ctx);
        self.confirm_clear_dialog(ctx);

        // Poll cadence: completions must surface without user input.
        ctx.request_repaint_after(POLL_INTERVAL);
    }
}

fn header_lines(record: &RequestRecord) -> String {
    record
        .headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn history_row_label(record: &RequestRecord) -> String {
    format!(
        "{} {}",
        record.submitted_at.format("%H:%M:%S"),
        record.display_label()
    )
}
