//! Request and response payloads.

use serde::{Deserialize, Serialize};

use ps_core::{PriceSeries, PsResult, Real};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub current_price: Option<Real>,
    #[serde(default)]
    pub market_cap: Option<Real>,
    #[serde(default)]
    pub total_volume: Option<Real>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<Real>,
}

impl Coin {
    /// Case-insensitive match on symbol or name.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.symbol.to_lowercase().contains(&q)
            || self
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&q))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinList {
    #[serde(default)]
    pub vs_currency: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotPrice {
    #[serde(default)]
    pub source: String,
    pub symbol: String,
    pub price_usd: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPayload {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<Real>,
    #[serde(default)]
    pub years: Option<u32>,
}

impl HistoryPayload {
    pub fn into_series(self, name: impl Into<String>) -> PsResult<PriceSeries> {
        PriceSeries::new(name, self.labels, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvHistoryPayload {
    pub symbol: String,
    pub available: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<Real>,
}

impl CsvHistoryPayload {
    /// `None` when the export CSV has no rows for the symbol.
    pub fn into_series(self) -> PsResult<Option<PriceSeries>> {
        if !self.available || self.data.is_empty() {
            return Ok(None);
        }
        PriceSeries::new(self.symbol, self.labels, self.data).map(Some)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "gestiegen")]
    Rose,
    #[serde(rename = "gefallen")]
    Fell,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Rose => "rose",
            Direction::Fell => "fell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub years: Real,
    pub percent: Real,
    pub direction: Direction,
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            years: 3.0,
            percent: 20.0,
            direction: Direction::Rose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterHit {
    pub symbol: String,
    pub start_price: Real,
    pub end_price: Real,
    pub change_percent: Real,
    #[serde(default)]
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResponse {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub results: Vec<FilterHit>,
    #[serde(default)]
    pub csv_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRequest {
    pub symbol: String,
    pub years: Real,
    pub monthly_usd: Real,
}

impl SavingsRequest {
    /// Amount paid in without investing: one contribution per month.
    pub fn cash_only_usd(&self) -> Real {
        self.monthly_usd * (self.years * 12.0).round()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsResult {
    pub result_usd: Real,
    #[serde(default)]
    pub cash_only_usd: Option<Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicSavingsRequest {
    pub symbol: String,
    pub years: Real,
    pub monthly_usd: Real,
    pub threshold_pct: Real,
    pub adjust_pct: Real,
    pub ma_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicSavingsResult {
    pub result_usd: Real,
    #[serde(default)]
    pub cash_buffer_usd: Real,
    #[serde(default)]
    pub total_value_usd: Real,
}
