//! Blocking client over the dashboard REST API.

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use ps_core::config::clamp_years;
use ps_core::{DashboardConfig, PriceSeries};
use ps_export::{ExportBackend, ExportResult, JobId, JobSnapshot, StartExportRequest, StartExportResponse};

use crate::error::{ApiError, ApiResult};
use crate::types::{
    CoinList, CsvHistoryPayload, DynamicSavingsRequest, DynamicSavingsResult, FilterRequest,
    FilterResponse, HistoryPayload, SavingsRequest, SavingsResult, SpotPrice,
};

#[derive(Debug, Clone)]
pub struct DashboardClient {
    base_url: Url,
    http: Client,
}

impl DashboardClient {
    pub fn new(config: &DashboardConfig) -> ApiResult<Self> {
        config.validate()?;
        let base_url = parse_base_url(&config.api_base_url)?;
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` below the base url, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    pub fn coins(&self, limit: u32) -> ApiResult<CoinList> {
        let mut url = self.endpoint("api/coins")?;
        url.query_pairs_mut()
            .append_pair("quote", "USD")
            .append_pair("limit", &limit.to_string());
        self.send(self.http.get(url))
    }

    pub fn btc_price(&self) -> ApiResult<SpotPrice> {
        self.send(self.http.get(self.endpoint("api/btc/price")?))
    }

    pub fn btc_history(&self, years: u32) -> ApiResult<PriceSeries> {
        let mut url = self.endpoint("api/btc/history")?;
        url.query_pairs_mut()
            .append_pair("years", &clamp_years(years).to_string());
        let payload: HistoryPayload = self.send(self.http.get(url))?;
        Ok(payload.into_series("BTC")?)
    }

    /// History from the latest export CSV; `None` if the symbol is missing.
    pub fn csv_history(&self, symbol: &str) -> ApiResult<Option<PriceSeries>> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ApiError::Payload("empty symbol".into()));
        }
        let url = self.endpoint(&format!("api/csv/history/{symbol}"))?;
        let payload: CsvHistoryPayload = self.send(self.http.get(url))?;
        Ok(payload.into_series()?)
    }

    pub fn filter(&self, request: &FilterRequest) -> ApiResult<FilterResponse> {
        self.post_json("api/filter/coinbase", request)
    }

    pub fn simulate_savings(&self, request: &SavingsRequest) -> ApiResult<SavingsResult> {
        let mut result: SavingsResult = self.post_json("api/simulate/savings", request)?;
        if result.cash_only_usd.is_none() {
            result.cash_only_usd = Some(request.cash_only_usd());
        }
        Ok(result)
    }

    pub fn simulate_savings_dynamic(
        &self,
        request: &DynamicSavingsRequest,
    ) -> ApiResult<DynamicSavingsResult> {
        self.post_json("api/simulate/savings_dynamic", request)
    }

    pub fn start_coinbase_export(&self, request: &StartExportRequest) -> ApiResult<JobId> {
        let response: StartExportResponse =
            self.post_json("api/export/coinbase/start", request)?;
        if response.job_id.trim().is_empty() {
            return Err(ApiError::Payload("start response carried no job id".into()));
        }
        Ok(response.job_id)
    }

    pub fn coinbase_export_status(&self, job_id: &str) -> ApiResult<JobSnapshot> {
        let url = self.endpoint(&format!("api/export/coinbase/status/{job_id}"))?;
        self.send(self.http.get(url))
    }

    pub fn stop_coinbase_export(&self) -> ApiResult<()> {
        let url = self.endpoint("api/export/coinbase/stop")?;
        let _: serde_json::Value = self.send(self.http.post(url))?;
        Ok(())
    }

    fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(self.http.post(url).json(body))
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: error_detail(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl ExportBackend for DashboardClient {
    fn start_export(&self, request: &StartExportRequest) -> ExportResult<JobId> {
        Ok(self.start_coinbase_export(request)?)
    }

    fn job_status(&self, job_id: &str) -> ExportResult<JobSnapshot> {
        Ok(self.coinbase_export_status(job_id)?)
    }

    fn stop_export(&self) -> ExportResult<()> {
        Ok(self.stop_coinbase_export()?)
    }
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Pull `detail` out of an error body when the server sent one.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
        .unwrap_or_else(|| body.trim().to_string())
}
