use std::cmp::Ordering;
use std::collections::HashSet;

use egui_extras::{Column, TableBuilder};

use ps_api::Coin;
use ps_core::Real;

use crate::format::{usd, usd_compact};

/// Searchable, sortable market-cap table. The visible rows, in their shown
/// order, are what an export would cover.
#[derive(Default)]
pub struct CoinsView {
    search: String,
    coins: Vec<Coin>,
    sort: CoinSort,
    missing_csv: HashSet<String>,
    selected: Option<String>,
}

pub enum CoinsAction {
    Refresh,
    LoadHistory(String),
    UseForExport(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Symbol,
    Name,
    Price,
    #[default]
    MarketCap,
}

impl SortKey {
    fn is_numeric(&self) -> bool {
        matches!(self, SortKey::Price | SortKey::MarketCap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoinSort {
    pub key: SortKey,
    pub dir: SortDir,
}

impl CoinSort {
    /// Same column flips the direction; a new column starts descending for
    /// numbers and ascending for text.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.dir = match self.dir {
                SortDir::Asc => SortDir::Desc,
                SortDir::Desc => SortDir::Asc,
            };
        } else {
            self.key = key;
            self.dir = if key.is_numeric() {
                SortDir::Desc
            } else {
                SortDir::Asc
            };
        }
    }

    fn indicator(&self, key: SortKey) -> &'static str {
        match (self.key == key, self.dir) {
            (false, _) => "",
            (true, SortDir::Asc) => " ▲",
            (true, SortDir::Desc) => " ▼",
        }
    }

    /// Missing numbers sort last in either direction.
    fn compare(&self, a: &Coin, b: &Coin) -> Ordering {
        let ordering = match self.key {
            SortKey::Symbol => return self.directed(compare_text(&a.symbol, &b.symbol)),
            SortKey::Name => {
                return self.directed(compare_text(
                    a.name.as_deref().unwrap_or(""),
                    b.name.as_deref().unwrap_or(""),
                ));
            }
            SortKey::Price => (number(a.current_price), number(b.current_price)),
            SortKey::MarketCap => (number(a.market_cap), number(b.market_cap)),
        };
        match ordering {
            (Some(x), Some(y)) => self.directed(x.total_cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    }
}

fn number(value: Option<Real>) -> Option<Real> {
    value.filter(|v| v.is_finite())
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl CoinsView {
    pub fn set_coins(&mut self, coins: Vec<Coin>) {
        self.coins = coins;
    }

    /// Record whether the last export CSV had rows for `symbol`.
    pub fn set_csv_available(&mut self, symbol: &str, available: bool) {
        if available {
            self.missing_csv.remove(symbol);
        } else {
            self.missing_csv.insert(symbol.to_string());
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, loading: bool) -> Option<CoinsAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.heading("Coins");
            ui.separator();
            ui.label("Search:");
            ui.text_edit_singleline(&mut self.search);
            if ui
                .add_enabled(!loading, egui::Button::new("Refresh"))
                .clicked()
            {
                action = Some(CoinsAction::Refresh);
            }
            if loading {
                ui.spinner();
            }
            let visible = visible_symbols(&self.coins, &self.search, self.sort);
            ui.weak(format!("{} / {}", visible.len(), self.coins.len()));
            if ui
                .add_enabled(!visible.is_empty(), egui::Button::new("Export these"))
                .on_hover_text("Use the listed symbols, in this order, for the next export")
                .clicked()
            {
                action = Some(CoinsAction::UseForExport(visible));
            }
        });
        ui.separator();

        if self.coins.is_empty() {
            ui.label("No coins loaded");
            return action;
        }

        let rows = sorted_rows(&self.coins, &self.search, self.sort);
        let sort = self.sort;
        let mut clicked: Option<String> = None;
        let mut sort_clicked: Option<SortKey> = None;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .sense(egui::Sense::click())
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(50.0))
            .column(Column::initial(80.0).at_least(60.0))
            .column(Column::initial(180.0).at_least(100.0))
            .column(Column::initial(120.0).at_least(90.0))
            .column(Column::initial(110.0).at_least(80.0))
            .column(Column::initial(80.0).at_least(60.0))
            .column(Column::remainder())
            .header(22.0, |mut header| {
                let columns = [
                    ("#", None),
                    ("Symbol", Some(SortKey::Symbol)),
                    ("Name", Some(SortKey::Name)),
                    ("Price", Some(SortKey::Price)),
                    ("Market cap", Some(SortKey::MarketCap)),
                    ("24h", None),
                    ("CSV", None),
                ];
                for (title, key) in columns {
                    header.col(|ui| match key {
                        Some(key) => {
                            let text = format!("{title}{}", sort.indicator(key));
                            let label = egui::Label::new(egui::RichText::new(text).strong())
                                .sense(egui::Sense::click());
                            if ui.add(label).on_hover_text("Sort").clicked() {
                                sort_clicked = Some(key);
                            }
                        }
                        None => {
                            ui.strong(title);
                        }
                    });
                }
            })
            .body(|body| {
                body.rows(22.0, rows.len(), |mut row| {
                    let coin = rows[row.index()];
                    let symbol = coin.symbol.to_uppercase();
                    row.set_selected(self.selected.as_deref() == Some(symbol.as_str()));

                    row.col(|ui| {
                        ui.label(
                            coin.market_cap_rank
                                .map(|r| r.to_string())
                                .unwrap_or_default(),
                        );
                    });
                    row.col(|ui| {
                        ui.monospace(&symbol);
                    });
                    row.col(|ui| {
                        ui.label(coin.name.as_deref().unwrap_or("-"));
                    });
                    row.col(|ui| {
                        ui.label(coin.current_price.map(usd).unwrap_or_else(|| "-".into()));
                    });
                    row.col(|ui| {
                        ui.label(
                            coin.market_cap
                                .map(usd_compact)
                                .unwrap_or_else(|| "-".into()),
                        );
                    });
                    row.col(|ui| match coin.price_change_percentage_24h {
                        Some(p) => {
                            let color = if p >= 0.0 {
                                egui::Color32::from_rgb(0, 180, 0)
                            } else {
                                egui::Color32::from_rgb(200, 0, 0)
                            };
                            ui.colored_label(color, format!("{p:+.2}%"));
                        }
                        None => {
                            ui.label("-");
                        }
                    });
                    row.col(|ui| {
                        if self.missing_csv.contains(&symbol) {
                            ui.colored_label(egui::Color32::from_rgb(200, 120, 0), "missing")
                                .on_hover_text("Not in the last export; run an export first");
                        }
                    });

                    if row.response().clicked() {
                        clicked = Some(symbol);
                    }
                });
            });

        if let Some(key) = sort_clicked {
            self.sort.toggle(key);
        }
        if let Some(symbol) = clicked {
            self.selected = Some(symbol.clone());
            action = Some(CoinsAction::LoadHistory(symbol));
        }
        action
    }
}

fn sorted_rows<'a>(coins: &'a [Coin], search: &str, sort: CoinSort) -> Vec<&'a Coin> {
    let mut rows: Vec<&Coin> = coins.iter().filter(|c| c.matches(search)).collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

fn visible_symbols(coins: &[Coin], search: &str, sort: CoinSort) -> Vec<String> {
    sorted_rows(coins, search, sort)
        .into_iter()
        .map(|c| c.symbol.to_uppercase())
        .collect()
}
