use std::sync::Arc;
use std::time::Duration;

use ps_api::{ApiResult, CoinList, DashboardClient};
use ps_core::{DashboardConfig, PriceSeries, Real};
use ps_export::ExportController;

use crate::fetch_worker::{FetchWorker, poll_slot};
use crate::views::{
    ChartView, CoinsAction, CoinsView, ExportView, SimulationAction, SimulationOutcome,
    SimulationView,
};

const PENDING_REPAINT: Duration = Duration::from_millis(100);

pub struct PriceScopeApp {
    config: DashboardConfig,
    client: Option<Arc<DashboardClient>>,
    active_view: ViewTab,
    years: u32,
    chart_view: ChartView,
    coins_view: CoinsView,
    export_view: ExportView,
    simulation_view: SimulationView,
    history_fetch: Option<FetchWorker<HistoryLoad>>,
    coins_fetch: Option<FetchWorker<CoinList>>,
    simulation_fetch: Option<FetchWorker<SimulationOutcome>>,
    status_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewTab {
    Chart,
    Coins,
    Simulations,
}

enum HistoryLoad {
    Btc {
        series: PriceSeries,
        spot: Option<Real>,
    },
    Csv {
        symbol: String,
        series: Option<PriceSeries>,
    },
}

impl PriceScopeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        config_error: Option<String>,
    ) -> Self {
        let (client, client_error) = match DashboardClient::new(&config) {
            Ok(client) => (Some(Arc::new(client)), None),
            Err(e) => {
                tracing::error!(error = %e, "could not create API client");
                (None, Some(e.to_string()))
            }
        };
        let controller = client
            .clone()
            .map(|c| ExportController::from_config(c, &config));

        let mut app = Self {
            years: config.default_years,
            export_view: ExportView::new(controller, config.default_years),
            config,
            client,
            active_view: ViewTab::Chart,
            chart_view: ChartView::default(),
            coins_view: CoinsView::default(),
            simulation_view: SimulationView::default(),
            history_fetch: None,
            coins_fetch: None,
            simulation_fetch: None,
            status_error: config_error.or(client_error),
        };
        app.load_btc_history();
        app.load_coins();
        app
    }

    fn load_btc_history(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let years = self.years;
        self.history_fetch = Some(FetchWorker::start(move || {
            let series = client.btc_history(years)?;
            let spot = match client.btc_price() {
                Ok(quote) => Some(quote.price_usd),
                Err(e) => {
                    tracing::warn!(error = %e, "spot price unavailable, showing last close");
                    None
                }
            };
            Ok(HistoryLoad::Btc { series, spot })
        }));
    }

    fn load_csv_history(&mut self, symbol: String) {
        let Some(client) = self.client.clone() else {
            return;
        };
        self.history_fetch = Some(FetchWorker::start(move || {
            let series = client.csv_history(&symbol)?;
            Ok(HistoryLoad::Csv { symbol, series })
        }));
    }

    fn load_coins(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let limit = self.config.coin_limit;
        self.coins_fetch = Some(FetchWorker::start(move || client.coins(limit)));
    }

    fn run_simulation(&mut self, action: SimulationAction) {
        let Some(client) = self.client.clone() else {
            return;
        };
        self.simulation_fetch = Some(FetchWorker::start(move || -> ApiResult<_> {
            Ok(match action {
                SimulationAction::Filter(request) => {
                    SimulationOutcome::Filter(client.filter(&request)?)
                }
                SimulationAction::Savings(request) => {
                    let result = client.simulate_savings(&request)?;
                    SimulationOutcome::Savings { request, result }
                }
                SimulationAction::Dynamic(request) => {
                    SimulationOutcome::Dynamic(client.simulate_savings_dynamic(&request)?)
                }
            })
        }));
    }

    fn poll_workers(&mut self) {
        if let Some(result) = poll_slot(&mut self.history_fetch) {
            match result {
                Ok(HistoryLoad::Btc { series, spot }) => {
                    self.status_error = None;
                    self.chart_view.set_series(Some(series), spot);
                }
                Ok(HistoryLoad::Csv { symbol, series }) => {
                    self.coins_view.set_csv_available(&symbol, series.is_some());
                    match series {
                        Some(series) => {
                            self.status_error = None;
                            self.chart_view.set_series(Some(series), None);
                            self.active_view = ViewTab::Chart;
                        }
                        None => {
                            self.status_error =
                                Some(format!("No CSV history for {symbol}; export it first"));
                        }
                    }
                }
                Err(e) => self.status_error = Some(e),
            }
        }

        if let Some(result) = poll_slot(&mut self.coins_fetch) {
            match result {
                Ok(list) => self.coins_view.set_coins(list.coins),
                Err(e) => self.status_error = Some(e),
            }
        }

        if let Some(result) = poll_slot(&mut self.simulation_fetch) {
            self.simulation_view.apply(result);
        }
    }

    fn any_fetch_pending(&self) -> bool {
        self.history_fetch.is_some() || self.coins_fetch.is_some() || self.simulation_fetch.is_some()
    }
}

impl eframe::App for PriceScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_workers();
        self.export_view.update();

        if self.export_view.is_active() {
            let interval = self.export_view.poll_interval().unwrap_or(PENDING_REPAINT);
            ctx.request_repaint_after(interval);
        }
        if self.any_fetch_pending() {
            ctx.request_repaint_after(PENDING_REPAINT);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("PriceScope");
                ui.separator();
                ui.weak(&self.config.api_base_url);
                if let Some(error) = &self.status_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, error);
                }
            });
        });

        egui::SidePanel::right("export_panel")
            .default_width(320.0)
            .show(ctx, |ui| {
                self.export_view.show(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.active_view, ViewTab::Chart, "Chart");
                ui.selectable_value(&mut self.active_view, ViewTab::Coins, "Coins");
                ui.selectable_value(&mut self.active_view, ViewTab::Simulations, "Simulations");
            });

            ui.separator();

            match self.active_view {
                ViewTab::Chart => {
                    let loading = self.history_fetch.is_some();
                    let actions = self.chart_view.show(ui, &mut self.years, loading);
                    if actions.reload_btc {
                        self.load_btc_history();
                    }
                }
                ViewTab::Coins => {
                    let loading = self.coins_fetch.is_some();
                    match self.coins_view.show(ui, loading) {
                        Some(CoinsAction::Refresh) => self.load_coins(),
                        Some(CoinsAction::LoadHistory(symbol)) => self.load_csv_history(symbol),
                        Some(CoinsAction::UseForExport(symbols)) => {
                            self.export_view.set_symbols(&symbols)
                        }
                        None => {}
                    }
                }
                ViewTab::Simulations => {
                    let busy = self.simulation_fetch.is_some();
                    if let Some(action) = self.simulation_view.show(ui, busy) {
                        self.run_simulation(action);
                    }
                }
            }
        });
    }
}
