use ps_core::config::{MAX_YEARS, MIN_YEARS};
use ps_export::{ExportController, JobStatus, StartExportRequest};

pub struct ExportView {
    symbols_text: String,
    years: u32,
    controller: Option<ExportController>,
    error: Option<String>,
}

impl ExportView {
    pub fn new(controller: Option<ExportController>, years: u32) -> Self {
        Self {
            symbols_text: String::new(),
            years,
            controller,
            error: None,
        }
    }

    pub fn set_symbols(&mut self, symbols: &[String]) {
        self.symbols_text = symbols.join(", ");
    }

    /// Apply pending poll results. Call once per frame.
    pub fn update(&mut self) -> bool {
        self.controller.as_mut().is_some_and(ExportController::update)
    }

    pub fn is_active(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(ExportController::is_active)
    }

    pub fn poll_interval(&self) -> Option<std::time::Duration> {
        self.controller.as_ref().map(ExportController::poll_interval)
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading("Coinbase export");
        ui.separator();

        let Some(controller) = self.controller.as_mut() else {
            ui.colored_label(egui::Color32::RED, "Export unavailable: no API client");
            return;
        };
        let active = controller.is_active();

        ui.label("Symbols:");
        ui.add_enabled(
            !active,
            egui::TextEdit::multiline(&mut self.symbols_text)
                .desired_rows(3)
                .hint_text("BTC, ETH, SOL"),
        );
        ui.horizontal(|ui| {
            ui.label("Years:");
            ui.add_enabled(
                !active,
                egui::DragValue::new(&mut self.years).range(MIN_YEARS..=MAX_YEARS),
            );
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!active, egui::Button::new("Start export"))
                .clicked()
            {
                let symbols = self
                    .symbols_text
                    .split(|c: char| c == ',' || c.is_whitespace());
                self.error = StartExportRequest::new(symbols, self.years)
                    .and_then(|request| controller.start(request))
                    .err()
                    .map(|e| e.to_string());
            }
            if ui
                .add_enabled(
                    active && !controller.stop_requested(),
                    egui::Button::new("Stop"),
                )
                .clicked()
            {
                self.error = controller.stop().err().map(|e| e.to_string());
            }
        });

        if let Some(error) = &self.error {
            ui.colored_label(egui::Color32::RED, error);
        }
        if let Some(error) = controller.last_error() {
            ui.colored_label(egui::Color32::RED, error);
        }

        let Some(job) = controller.job() else {
            return;
        };
        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Status:");
            ui.strong(job.status.label());
            if active {
                ui.spinner();
            }
            if controller.stop_requested() && active {
                ui.weak("stop requested");
            }
        });
        if let Some(job_id) = &job.job_id {
            ui.weak(format!("Job {job_id}"));
        }
        ui.add(egui::ProgressBar::new(job.fraction()).text(job.summary()));

        match job.status {
            JobStatus::Done => {
                if let Some(filename) = &job.filename {
                    ui.label(format!("File: {filename}"));
                }
            }
            JobStatus::Failed => {
                let reason = job.fail_reason.as_deref().unwrap_or("unknown error");
                ui.colored_label(egui::Color32::RED, format!("Failed: {reason}"));
            }
            _ => {}
        }
    }
}
