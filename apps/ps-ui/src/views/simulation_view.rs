use egui_extras::{Column, TableBuilder};

use ps_api::{
    Direction, DynamicSavingsRequest, DynamicSavingsResult, FilterRequest, FilterResponse,
    SavingsRequest, SavingsResult,
};

pub enum SimulationAction {
    Filter(FilterRequest),
    Savings(SavingsRequest),
    Dynamic(DynamicSavingsRequest),
}

pub enum SimulationOutcome {
    Filter(FilterResponse),
    Savings {
        request: SavingsRequest,
        result: SavingsResult,
    },
    Dynamic(DynamicSavingsResult),
}

pub struct SimulationView {
    filter: FilterRequest,
    symbol: String,
    years: f64,
    monthly_usd: f64,
    threshold_pct: f64,
    adjust_pct: f64,
    ma_days: u32,
    filter_result: Option<FilterResponse>,
    savings_result: Option<(SavingsRequest, SavingsResult)>,
    dynamic_result: Option<DynamicSavingsResult>,
    error: Option<String>,
}

impl Default for SimulationView {
    fn default() -> Self {
        Self {
            filter: FilterRequest::default(),
            symbol: "BTC".into(),
            years: 5.0,
            monthly_usd: 100.0,
            threshold_pct: 10.0,
            adjust_pct: 50.0,
            ma_days: 200,
            filter_result: None,
            savings_result: None,
            dynamic_result: None,
            error: None,
        }
    }
}

impl SimulationView {
    pub fn apply(&mut self, outcome: Result<SimulationOutcome, String>) {
        match outcome {
            Ok(SimulationOutcome::Filter(response)) => self.filter_result = Some(response),
            Ok(SimulationOutcome::Savings { request, result }) => {
                self.savings_result = Some((request, result))
            }
            Ok(SimulationOutcome::Dynamic(result)) => self.dynamic_result = Some(result),
            Err(e) => {
                self.error = Some(e);
                return;
            }
        }
        self.error = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui, busy: bool) -> Option<SimulationAction> {
        let mut action = None;

        ui.heading("Filter exported coins");
        ui.horizontal(|ui| {
            ui.label("Over");
            ui.add(
                egui::DragValue::new(&mut self.filter.years)
                    .range(0.25..=15.0)
                    .speed(0.25)
                    .suffix(" y"),
            );
            egui::ComboBox::from_id_salt("filter_direction")
                .selected_text(self.filter.direction.label())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.filter.direction, Direction::Rose, "rose");
                    ui.selectable_value(&mut self.filter.direction, Direction::Fell, "fell");
                });
            ui.label("by at least");
            ui.add(
                egui::DragValue::new(&mut self.filter.percent)
                    .range(0.0..=10_000.0)
                    .suffix(" %"),
            );
            if ui.add_enabled(!busy, egui::Button::new("Filter")).clicked() {
                action = Some(SimulationAction::Filter(self.filter.clone()));
            }
        });
        if let Some(result) = &self.filter_result {
            if let Some(csv) = &result.csv_used {
                ui.weak(format!("Source: {csv}"));
            }
            ui.label(format!("{} match(es)", result.count));
            show_filter_table(ui, result);
        }

        ui.separator();
        ui.heading("Savings plan");
        ui.horizontal(|ui| {
            ui.label("Symbol:");
            ui.add(egui::TextEdit::singleline(&mut self.symbol).desired_width(80.0));
            ui.label("Years:");
            ui.add(
                egui::DragValue::new(&mut self.years)
                    .range(0.25..=15.0)
                    .speed(0.25),
            );
            ui.label("Monthly:");
            ui.add(
                egui::DragValue::new(&mut self.monthly_usd)
                    .range(1.0..=1_000_000.0)
                    .suffix(" USD"),
            );
        });
        ui.horizontal(|ui| {
            ui.label("Threshold:");
            ui.add(
                egui::DragValue::new(&mut self.threshold_pct)
                    .range(0.0..=100.0)
                    .suffix(" %"),
            );
            ui.label("Adjust:");
            ui.add(
                egui::DragValue::new(&mut self.adjust_pct)
                    .range(0.0..=100.0)
                    .suffix(" %"),
            );
            ui.label("MA:");
            ui.add(
                egui::DragValue::new(&mut self.ma_days)
                    .range(2..=1000)
                    .suffix(" d"),
            );
        });

        let symbol = self.symbol.trim().to_uppercase();
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!busy && !symbol.is_empty(), |ui| {
                if ui.button("Simulate fixed").clicked() {
                    action = Some(SimulationAction::Savings(SavingsRequest {
                        symbol: symbol.clone(),
                        years: self.years,
                        monthly_usd: self.monthly_usd,
                    }));
                }
                if ui.button("Simulate dynamic").clicked() {
                    action = Some(SimulationAction::Dynamic(DynamicSavingsRequest {
                        symbol: symbol.clone(),
                        years: self.years,
                        monthly_usd: self.monthly_usd,
                        threshold_pct: self.threshold_pct,
                        adjust_pct: self.adjust_pct,
                        ma_days: self.ma_days,
                    }));
                }
            });
            if busy {
                ui.spinner();
            }
        });

        if let Some((request, result)) = &self.savings_result {
            let cash = result
                .cash_only_usd
                .unwrap_or_else(|| request.cash_only_usd());
            ui.label(format!(
                "{}: invested {:.2} USD vs cash only {:.2} USD",
                request.symbol, result.result_usd, cash
            ));
        }
        if let Some(result) = &self.dynamic_result {
            ui.label(format!(
                "Dynamic: invested {:.2} USD + cash {:.2} USD = {:.2} USD",
                result.result_usd, result.cash_buffer_usd, result.total_value_usd
            ));
        }
        if let Some(error) = &self.error {
            ui.colored_label(egui::Color32::RED, error);
        }

        action
    }
}

fn show_filter_table(ui: &mut egui::Ui, result: &FilterResponse) {
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(220.0)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(80.0).at_least(60.0))
        .column(Column::initial(110.0).at_least(80.0))
        .column(Column::initial(110.0).at_least(80.0))
        .column(Column::initial(80.0).at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Symbol", "Start", "End", "Change", "Period"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for hit in &result.results {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.monospace(&hit.symbol);
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.4}", hit.start_price));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.4}", hit.end_price));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:+.2}%", hit.change_percent));
                    });
                    row.col(|ui| {
                        ui.label(&hit.period);
                    });
                });
            }
        });
}
