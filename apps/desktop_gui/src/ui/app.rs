use client_core::{
    ClassificationError, ClientSettings, Level, LevelState, LoadError, LoadRequest, LoadResponse,
    SelectionController, SubmitTicket,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use flowchart::{DisplayList, DrawingSurface, FlowchartRenderer};
use serde_json::Value;
use shared::domain::ClassificationResult;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::canvas::paint_display_list;

const SELECTOR_WIDTH: f32 = 260.0;
const RESULT_COLOR: egui::Color32 = egui::Color32::from_rgb(0x00, 0x5A, 0x9E);
const BANNER_COLOR: egui::Color32 = egui::Color32::from_rgb(0xD3, 0x2F, 0x2F);

#[derive(Debug, Clone)]
struct StatusBanner {
    category: UiErrorCategory,
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Load => "Load",
        UiErrorCategory::Classification => "Classification",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

/// Shows one dependent selector. Returns the newly picked value, if any.
fn selector(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    state: &LevelState,
    current: &str,
) -> Option<String> {
    let mut picked = None;
    ui.label(label);
    let selected_text = if current.is_empty() {
        state.placeholder()
    } else {
        current
    };
    ui.add_enabled_ui(state.is_interactive(), |ui| {
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected_text)
            .width(SELECTOR_WIDTH)
            .show_ui(ui, |ui| {
                let Some(options) = state.options() else {
                    return;
                };
                let mut chosen = current.to_string();
                for (value, text) in options.entries() {
                    ui.selectable_value(&mut chosen, value.to_string(), text);
                }
                if chosen != current {
                    picked = Some(chosen);
                }
            });
    });
    ui.end_row();
    picked
}

pub struct ClassifierApp {
    controller: SelectionController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    amount: String,
    result_label: String,
    flowchart: FlowchartRenderer<DisplayList>,
    // steps of the latest render, replayed when the canvas width changes
    last_steps: Option<Value>,
    has_diagram: bool,
    feedback_url: String,
    status: String,
    banner: Option<StatusBanner>,
}

impl ClassifierApp {
    pub fn new(
        settings: &ClientSettings,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        Self {
            controller: SelectionController::new(settings.project_types.clone()),
            cmd_tx,
            ui_rx,
            amount: String::new(),
            result_label: String::new(),
            flowchart: FlowchartRenderer::new(DisplayList::new(0.0)),
            last_steps: None,
            has_diagram: false,
            feedback_url: settings.feedback_url.clone(),
            status: format!("Classifier service: {}", settings.server_url),
            banner: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => self.show_error(err),
                UiEvent::OptionsLoaded(response) => self.apply_load(response),
                UiEvent::Classified { ticket, result } => {
                    self.apply_classification(ticket, result);
                }
            }
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::warn!(context = ?err.context(), "{}", err.message());
        self.status = format!("{} error: {}", err_label(err.category()), err.message());
        self.banner = Some(StatusBanner {
            category: err.category(),
            message: err.message().to_string(),
        });
    }

    fn select(&mut self, level: Level, value: &str) {
        let result = match level {
            Level::ProjectType => self.controller.change_project_type(value),
            Level::ProjectPhase => self.controller.change_project_phase(value),
            Level::DocumentName => self.controller.change_document_name(value).map(|()| None),
        };
        match result {
            Ok(Some(request)) => self.queue_load(request),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("ignoring selection: {err}");
                self.status = err.to_string();
            }
        }
    }

    fn queue_load(&mut self, request: LoadRequest) {
        let ticket = request.ticket();
        let cmd = BackendCommand::LoadOptions(request);
        if !dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            let result = Err(LoadError::Transport(self.status.clone()));
            self.apply_load(LoadResponse { ticket, result });
        }
    }

    fn apply_load(&mut self, response: LoadResponse) {
        let LoadResponse { ticket, result } = response;
        let failure = result.as_ref().err().cloned();
        let applied = match ticket.level {
            Level::ProjectPhase => self.controller.apply_phases(ticket, result),
            Level::DocumentName => self.controller.apply_documents(ticket, result),
            Level::ProjectType => false,
        };
        if let (true, Some(err)) = (applied, failure) {
            self.show_error(UiError::load(&err));
        }
    }

    fn submit(&mut self) {
        let submission = match self.controller.submit() {
            Ok(submission) => submission,
            Err(err) => {
                self.show_error(UiError::validation(&err));
                return;
            }
        };
        let ticket = submission.ticket;
        self.banner = None;
        self.status = "Classifying...".to_string();
        let cmd = BackendCommand::Classify(submission);
        if !dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            let message = self.status.clone();
            self.apply_classification(ticket, Err(ClassificationError::Transport(message)));
        }
    }

    fn apply_classification(
        &mut self,
        ticket: SubmitTicket,
        result: Result<ClassificationResult, ClassificationError>,
    ) {
        let Some(outcome) = self.controller.apply_classification(ticket, result) else {
            return;
        };
        match &outcome.error {
            Some(err) => self.show_error(UiError::classification(err)),
            None => {
                self.banner = None;
                self.status = "Classification complete".to_string();
            }
        }
        self.result_label = outcome.result_label;
        self.show_steps(outcome.steps);
    }

    fn show_steps(&mut self, steps: Option<Value>) {
        let summary = self.flowchart.render(steps.as_ref());
        tracing::debug!(
            boxes = summary.boxes,
            skipped = summary.skipped.len(),
            height = summary.height,
            "flowchart rendered"
        );
        self.last_steps = steps;
        self.has_diagram = true;
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let mut picks = Vec::new();
        egui::Grid::new("classification_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                let selection = self.controller.selection();
                for (level, id, label, current) in [
                    (
                        Level::ProjectType,
                        "project_type",
                        "Project type",
                        &selection.project_type,
                    ),
                    (
                        Level::ProjectPhase,
                        "project_phase",
                        "Project phase",
                        &selection.project_phase,
                    ),
                    (
                        Level::DocumentName,
                        "document_name",
                        "Document",
                        &selection.document_name,
                    ),
                ] {
                    if let Some(value) =
                        selector(ui, id, label, self.controller.level(level), current)
                    {
                        picks.push((level, value));
                    }
                }
            });
        for (level, value) in picks {
            self.select(level, &value);
        }

        let mut submit_requested = false;
        egui::Grid::new("amount_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Amount");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.amount)
                        .hint_text("contract amount")
                        .desired_width(SELECTOR_WIDTH),
                );
                if response.changed() {
                    self.controller.set_amount(self.amount.clone());
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit_requested = true;
                }
                ui.end_row();
            });

        ui.add_space(6.0);
        if ui.button("Classify").clicked() {
            submit_requested = true;
        }
        if submit_requested {
            self.submit();
        }
    }

    fn show_result(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = &self.banner {
            ui.colored_label(
                BANNER_COLOR,
                format!("{}: {}", err_label(banner.category), banner.message),
            );
        }
        ui.horizontal(|ui| {
            ui.label("Result:");
            ui.label(
                egui::RichText::new(&self.result_label)
                    .strong()
                    .color(RESULT_COLOR),
            );
        });
        ui.separator();

        let width = ui.available_width();
        if (self.flowchart.surface().width() - width).abs() > 0.5 {
            self.flowchart.surface_mut().set_width(width);
            if self.has_diagram {
                let steps = self.last_steps.take();
                self.show_steps(steps);
            }
        }
        if self.has_diagram {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| paint_display_list(ui, self.flowchart.surface()));
        }
    }
}

impl eframe::App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.hyperlink_to("Send feedback", &self.feedback_url);
                });
            });
        });
        egui::TopBottomPanel::top("classification_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            self.show_form(ui);
            ui.add_space(8.0);
        });
        egui::CentralPanel::default().show(ctx, |ui| self.show_result(ui));

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use client_core::LoadTicket;
    use crossbeam_channel::bounded;
    use serde_json::json;

    use super::*;

    fn app(capacity: usize) -> (ClassifierApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(capacity);
        let (ui_tx, ui_rx) = bounded(16);
        let app = ClassifierApp::new(&ClientSettings::default(), cmd_tx, ui_rx);
        (app, cmd_rx, ui_tx)
    }

    #[test]
    fn picking_a_type_queues_a_phase_load_and_applies_the_reply() {
        let (mut app, cmd_rx, ui_tx) = app(4);
        app.select(Level::ProjectType, "Construction");

        let ticket = load_ticket(&cmd_rx);
        ui_tx
            .try_send(UiEvent::OptionsLoaded(LoadResponse {
                ticket,
                result: Ok(vec!["Design".to_string()]),
            }))
            .expect("event");
        app.process_ui_events();

        let phases = app.controller.level(Level::ProjectPhase);
        assert!(phases.is_interactive());
        assert!(phases.options().expect("options").contains("Design"));
    }

    #[test]
    fn unreachable_worker_degrades_the_selector_to_load_error() {
        let (mut app, cmd_rx, _ui_tx) = app(4);
        drop(cmd_rx);
        app.select(Level::ProjectType, "Construction");

        assert_eq!(
            app.controller.level(Level::ProjectPhase).placeholder(),
            "load error"
        );
        let banner = app.banner.as_ref().expect("banner");
        assert_eq!(banner.category, UiErrorCategory::Transport);
    }

    #[test]
    fn stale_phase_reply_is_ignored() {
        let (mut app, _cmd_rx, ui_tx) = app(4);
        app.select(Level::ProjectType, "Construction");
        app.select(Level::ProjectType, "Procurement");

        ui_tx
            .try_send(UiEvent::OptionsLoaded(LoadResponse {
                ticket: LoadTicket {
                    level: Level::ProjectPhase,
                    epoch: 1,
                },
                result: Err(LoadError::Rejected(None)),
            }))
            .expect("event");
        app.process_ui_events();

        assert_eq!(
            app.controller.level(Level::ProjectPhase),
            &LevelState::Loading
        );
        assert!(app.banner.is_none());
    }

    #[test]
    fn incomplete_form_blocks_submission() {
        let (mut app, cmd_rx, _ui_tx) = app(4);
        app.submit();

        assert!(cmd_rx.try_recv().is_err());
        let banner = app.banner.as_ref().expect("banner");
        assert_eq!(banner.category, UiErrorCategory::Validation);
        assert!(!app.has_diagram);
    }

    fn load_ticket(cmd_rx: &Receiver<BackendCommand>) -> LoadTicket {
        match cmd_rx.try_recv().expect("queued load") {
            BackendCommand::LoadOptions(request) => request.ticket(),
            BackendCommand::Classify(_) => panic!("expected an option load"),
        }
    }

    /// Fills in every field and submits, returning the queued ticket.
    fn submitted(app: &mut ClassifierApp, cmd_rx: &Receiver<BackendCommand>) -> SubmitTicket {
        app.select(Level::ProjectType, "Construction");
        app.apply_load(LoadResponse {
            ticket: load_ticket(cmd_rx),
            result: Ok(vec!["Design".to_string()]),
        });
        app.select(Level::ProjectPhase, "Design");
        app.apply_load(LoadResponse {
            ticket: load_ticket(cmd_rx),
            result: Ok(vec!["Contract".to_string()]),
        });
        app.select(Level::DocumentName, "Contract");
        app.amount = "1000".to_string();
        app.controller.set_amount(app.amount.clone());
        app.submit();
        match cmd_rx.try_recv().expect("queued classification") {
            BackendCommand::Classify(submission) => submission.ticket,
            BackendCommand::LoadOptions(_) => panic!("expected a classification"),
        }
    }

    #[test]
    fn malformed_option_reply_is_reported_as_a_load_failure() {
        let (mut app, cmd_rx, _ui_tx) = app(4);
        app.select(Level::ProjectType, "Construction");
        app.apply_load(LoadResponse {
            ticket: load_ticket(&cmd_rx),
            result: Err(LoadError::Malformed(
                "response is missing `phases`".to_string(),
            )),
        });

        assert_eq!(
            app.controller.level(Level::ProjectPhase).placeholder(),
            "load failed"
        );
        let banner = app.banner.as_ref().expect("banner");
        assert_eq!(banner.category, UiErrorCategory::Load);
    }

    #[test]
    fn reply_without_a_submission_is_ignored() {
        let (mut app, _cmd_rx, _ui_tx) = app(4);
        app.apply_classification(
            SubmitTicket { epoch: 0 },
            Ok(ClassificationResult {
                result_level: "Level 2".to_string(),
                steps: None,
            }),
        );
        assert!(app.result_label.is_empty());
        assert!(!app.has_diagram);
    }

    #[test]
    fn classification_reply_updates_result_and_diagram() {
        let (mut app, cmd_rx, ui_tx) = app(4);
        let ticket = submitted(&mut app, &cmd_rx);
        ui_tx
            .try_send(UiEvent::Classified {
                ticket,
                result: Ok(ClassificationResult {
                    result_level: "Level 2".to_string(),
                    steps: Some(json!([["Engineer", "Review"], ["Manager", "Approve"]])),
                }),
            })
            .expect("event");
        app.process_ui_events();

        assert_eq!(app.result_label, "Level 2");
        assert!(app.has_diagram);
        assert_eq!(app.flowchart.surface().rect_count(), 2);

        let ticket = submitted(&mut app, &cmd_rx);
        app.apply_classification(
            ticket,
            Err(ClassificationError::Transport("refused".to_string())),
        );
        assert_eq!(app.result_label, "query error");
        assert_eq!(app.flowchart.surface().rect_count(), 0);
        assert_eq!(
            app.flowchart.surface().texts(),
            vec![flowchart::EMPTY_MESSAGE]
        );
    }
}
