pub mod chart_view;
pub mod coins_view;
pub mod export_view;
pub mod simulation_view;

pub use chart_view::{ChartActions, ChartView};
pub use coins_view::{CoinsAction, CoinsView};
pub use export_view::ExportView;
pub use simulation_view::{SimulationAction, SimulationOutcome, SimulationView};
