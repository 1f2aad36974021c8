use egui_plot::{Legend, Line, Plot, PlotPoints, PlotTransform};

use ps_annotate::{
    AxisScale, DrawingSession, OverlayRenderer, PixelPoint, PointerEvent, RenderReport,
    ViewportTransform,
};
use ps_core::config::{MAX_YEARS, MIN_YEARS};
use ps_core::{PriceSeries, Real};

use crate::format::usd;
use crate::overlay_canvas::PainterCanvas;

/// Trailing window in daily samples.
const DEFAULT_MA_WINDOW: usize = 200;
const MAX_MA_WINDOW: usize = 1000;

pub struct ChartView {
    series: Option<PriceSeries>,
    current_price: Option<Real>,
    session: DrawingSession,
    renderer: OverlayRenderer,
    show_ma: bool,
    ma_window: usize,
    last_report: RenderReport,
}

#[derive(Default)]
pub struct ChartActions {
    pub reload_btc: bool,
}

impl Default for ChartView {
    fn default() -> Self {
        Self {
            series: None,
            current_price: None,
            session: DrawingSession::new(),
            renderer: OverlayRenderer::default(),
            show_ma: false,
            ma_window: DEFAULT_MA_WINDOW,
            last_report: RenderReport::default(),
        }
    }
}

impl ChartView {
    /// Swap in a new dataset. Drawing mode turns off and all lines go.
    /// Without a `spot` quote the last close stands in as the current price.
    pub fn set_series(&mut self, series: Option<PriceSeries>, spot: Option<Real>) {
        let has_data = series.as_ref().is_some_and(|s| !s.is_empty());
        self.session.replace_dataset(has_data);
        self.show_ma = false;
        self.current_price = spot
            .filter(|p| p.is_finite())
            .or_else(|| series.as_ref().and_then(PriceSeries::last_value));
        self.series = series;
    }

    pub fn current_price(&self) -> Option<Real> {
        self.current_price
    }

    pub fn show(&mut self, ui: &mut egui::Ui, years: &mut u32, loading: bool) -> ChartActions {
        let mut actions = ChartActions::default();

        ui.horizontal(|ui| {
            match &self.series {
                Some(series) => ui.heading(&series.name),
                None => ui.heading("Chart"),
            };
            if let Some(price) = self.current_price {
                ui.label(format!("Current price: {}", usd(price)));
            }
            ui.separator();
            ui.add(
                egui::DragValue::new(years)
                    .range(MIN_YEARS..=MAX_YEARS)
                    .suffix(" y"),
            );
            if ui
                .add_enabled(!loading, egui::Button::new("Load BTC"))
                .clicked()
            {
                actions.reload_btc = true;
            }
            if loading {
                ui.spinner();
            }

            ui.separator();
            let drawing = self.session.drawing_enabled();
            let toggle = ui
                .add_enabled(
                    self.session.dataset_loaded(),
                    egui::SelectableLabel::new(drawing, "✏ Draw lines"),
                )
                .on_disabled_hover_text("Load a dataset first");
            if toggle.clicked() {
                self.session.toggle_drawing();
            }
            if ui
                .add_enabled(
                    !self.session.store().is_empty(),
                    egui::Button::new("Clear lines"),
                )
                .clicked()
            {
                self.session.clear_annotations();
            }

            ui.separator();
            ui.add_enabled_ui(self.series.is_some(), |ui| {
                ui.checkbox(&mut self.show_ma, "Moving average");
                ui.add(
                    egui::DragValue::new(&mut self.ma_window)
                        .range(2..=MAX_MA_WINDOW)
                        .suffix(" d"),
                );
            });
        });
        ui.separator();

        let Some(series) = self.series.as_ref() else {
            ui.label("No data loaded. Load BTC history or pick a coin with CSV data.");
            return actions;
        };

        let price_points: PlotPoints = series.points().into();
        let ma_points: Option<PlotPoints> = self.show_ma.then(|| {
            series
                .moving_average(self.ma_window)
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| [i as f64, v]))
                .collect::<Vec<_>>()
                .into()
        });

        let axis_series = series.clone();
        let hover_series = series.clone();
        let drawing = self.session.drawing_enabled();
        let ma_name = format!("MA {}", self.ma_window);

        let plot_response = Plot::new("price_chart")
            .legend(Legend::default())
            .allow_drag(!drawing)
            .allow_zoom(!drawing)
            .allow_scroll(!drawing)
            .allow_boxed_zoom(!drawing)
            .y_axis_label("USD")
            .x_axis_formatter(move |mark, _range| {
                if (mark.value - mark.value.round()).abs() > 1e-6 {
                    return String::new();
                }
                axis_series
                    .label_at(mark.value)
                    .map(str::to_owned)
                    .unwrap_or_default()
            })
            .label_formatter(move |_name, point| match hover_series.label_at(point.x) {
                Some(label) => format!("{label}\n{:.2} USD", point.y),
                None => String::new(),
            })
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(price_points).name(&series.name));
                if let Some(points) = ma_points {
                    plot_ui.line(Line::new(points).name(&ma_name));
                }
            });

        let viewport = viewport_from(&plot_response.transform);

        if drawing {
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.session.reset();
            }
            for event in pointer_events(ui, &plot_response.response) {
                match event {
                    Some(event) => {
                        self.session.handle(event, &viewport);
                    }
                    // Release position unknown: abandon the drag.
                    None => self.session.reset(),
                }
            }
        }

        let painter = ui.painter_at(*plot_response.transform.frame());
        let mut canvas = PainterCanvas::new(&painter);
        self.last_report = self
            .renderer
            .render(self.session.store(), &viewport, &mut canvas);

        ui.horizontal(|ui| {
            ui.label(format!("Lines: {}", self.session.store().len()));
            if self.last_report.skipped > 0 {
                ui.weak(format!("({} not drawn)", self.last_report.skipped));
            }
            if drawing {
                ui.weak("Drag on the chart to draw; Esc cancels.");
            }
        });

        actions
    }
}

/// Data bounds and screen frame of the current plot. Screen y grows
/// downwards, so the y axis maps its minimum to the frame bottom.
fn viewport_from(transform: &PlotTransform) -> ViewportTransform {
    let frame = transform.frame();
    let bounds = transform.bounds();
    let [x_min, y_min] = bounds.min();
    let [x_max, y_max] = bounds.max();
    ViewportTransform::new(
        AxisScale::new(x_min, x_max, frame.left() as f64, frame.right() as f64),
        AxisScale::new(y_min, y_max, frame.bottom() as f64, frame.top() as f64),
    )
}

/// Translate this frame's drag on the plot into pointer events.
/// `None` marks a release whose position egui did not report.
fn pointer_events(ui: &egui::Ui, response: &egui::Response) -> Vec<Option<PointerEvent>> {
    let mut events = Vec::new();
    if response.drag_started() {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or(response.interact_pointer_pos());
        if let Some(pos) = origin {
            events.push(Some(PointerEvent::Down(to_pixel(pos))));
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.push(Some(PointerEvent::Move(to_pixel(pos))));
        }
    }
    if response.drag_stopped() {
        let release = ui
            .input(|i| i.pointer.interact_pos())
            .or(response.hover_pos());
        events.push(release.map(|pos| PointerEvent::Up(to_pixel(pos))));
    }
    events
}

fn to_pixel(pos: egui::Pos2) -> PixelPoint {
    PixelPoint::new(pos.x as f64, pos.y as f64)
}
