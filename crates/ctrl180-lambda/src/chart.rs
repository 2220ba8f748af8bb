//! Chart image fetch.
//!
//! One attempt, bounded by the configured timeout and size cap. Every
//! failure mode ends in a [`ChartOutcome`] instead of an error: a missing
//! chart never fails the report.

use std::sync::Arc;
use std::time::Duration;

use ctrl180_export::chart::{ChartImage, ImageKind};

/// Longest failure reason echoed in the `X-CTRL-CHART` header.
const MAX_REASON_LEN: usize = 80;

#[derive(Debug, Clone)]
pub struct FetchedChart {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blocking source of chart bytes.
pub trait ChartFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedChart, String>;
}

pub struct HttpChartFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpChartFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, max_bytes }
    }
}

impl ChartFetcher for HttpChartFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedChart, String> {
        let mut response = self.agent.get(url).call().map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()
            .map_err(|e| e.to_string())?;

        Ok(FetchedChart {
            bytes,
            content_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    /// The payload named no chart.
    None,
    Embedded,
    /// Nothing usable to embed; the reason is only logged.
    Skipped(String),
    Failed(String),
}

impl ChartOutcome {
    pub fn header_value(&self) -> String {
        match self {
            ChartOutcome::None => "none".to_string(),
            ChartOutcome::Embedded => "embedded".to_string(),
            ChartOutcome::Skipped(_) => "skipped".to_string(),
            ChartOutcome::Failed(reason) => format!("failed:{}", header_safe(reason)),
        }
    }
}

/// Fetch and decode the chart, if the payload named one.
pub async fn load_chart(
    fetcher: Arc<dyn ChartFetcher>,
    url: Option<&str>,
) -> (Option<ChartImage>, ChartOutcome) {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return (None, ChartOutcome::None);
    };

    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        tracing::warn!(url, "chart url is not http(s), skipping");
        return (None, ChartOutcome::Skipped("unsupported scheme".to_string()));
    }

    let owned = url.to_string();
    let joined = tokio::task::spawn_blocking(move || fetch_and_decode(fetcher.as_ref(), &owned)).await;

    let (image, outcome) = match joined {
        Ok(result) => result,
        Err(e) => (None, ChartOutcome::Failed(format!("fetch task: {e}"))),
    };
    match &outcome {
        ChartOutcome::Failed(reason) => tracing::warn!(url, reason = %reason, "chart fetch failed"),
        ChartOutcome::Skipped(reason) => tracing::warn!(url, reason = %reason, "chart skipped"),
        _ => tracing::debug!(url, "chart fetched"),
    }
    (image, outcome)
}

fn fetch_and_decode(fetcher: &dyn ChartFetcher, url: &str) -> (Option<ChartImage>, ChartOutcome) {
    let fetched = match fetcher.fetch(url) {
        Ok(fetched) => fetched,
        Err(reason) => return (None, ChartOutcome::Failed(reason)),
    };
    if fetched.bytes.is_empty() {
        return (None, ChartOutcome::Failed("empty body".to_string()));
    }

    let Some(kind) = ImageKind::detect(url, &fetched.content_type) else {
        return (
            None,
            ChartOutcome::Skipped(format!("not an image ({})", fetched.content_type)),
        );
    };

    match ChartImage::decode(&fetched.bytes, kind) {
        Ok(image) => (Some(image), ChartOutcome::Embedded),
        Err(e) => (None, ChartOutcome::Failed(e.to_string())),
    }
}

fn header_safe(reason: &str) -> String {
    reason
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .take(MAX_REASON_LEN)
        .collect()
}
