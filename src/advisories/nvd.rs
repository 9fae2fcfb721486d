//! Client for the NVD CVE API 2.0.
//!
//! Configuration comes from [`NvdConfig`]; an API key is optional and only
//! raises the rate limit NVD applies.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{clamp_window, newest_first, AdvisorySource};
use crate::config::NvdConfig;
use crate::error::ExternalServiceError;
use crate::models::Advisory;

const DETAIL_URL: &str = "https://nvd.nist.gov/vuln/detail/";
const NO_SUMMARY: &str = "No English summary available.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvePage {
    #[serde(default)]
    results_per_page: usize,
    #[serde(default)]
    start_index: usize,
    #[serde(default)]
    total_results: usize,
    #[serde(default)]
    vulnerabilities: Vec<VulnerabilityItem>,
}

#[derive(Debug, Deserialize)]
struct VulnerabilityItem {
    cve: CveRecord,
}

#[derive(Debug, Deserialize)]
struct CveRecord {
    id: String,
    published: Option<String>,
    #[serde(default)]
    descriptions: Vec<LangString>,
    #[serde(default)]
    metrics: CveMetrics,
}

#[derive(Debug, Deserialize)]
struct LangString {
    lang: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct CveMetrics {
    #[serde(rename = "cvssMetricV31", default)]
    cvss_v31: Vec<CvssMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssMetric {
    cvss_data: CvssData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssData {
    base_score: Option<f64>,
    base_severity: Option<String>,
    vector_string: Option<String>,
}

impl From<CveRecord> for Advisory {
    fn from(record: CveRecord) -> Self {
        let description = record
            .descriptions
            .into_iter()
            .find(|d| d.lang == "en")
            .map(|d| d.value)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        let cvss = record.metrics.cvss_v31.into_iter().next().map(|m| m.cvss_data);
        let (severity_score, severity, vector) = match cvss {
            Some(data) => (data.base_score, data.base_severity, data.vector_string),
            None => (None, None, None),
        };

        Advisory {
            url: format!("{}{}", DETAIL_URL, record.id),
            identifier: record.id,
            description,
            published: record.published.as_deref().and_then(parse_published),
            severity_score,
            severity,
            vector,
        }
    }
}

/// NVD timestamps usually carry no offset and are UTC.
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn format_nvd_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Paginated reader over the NVD CVE API.
#[derive(Debug, Clone)]
pub struct NvdClient {
    base_url: String,
    api_key: Option<String>,
    results_per_page: usize,
    max_pages: usize,
    client: Client,
}

impl NvdClient {
    pub fn from_config(config: &NvdConfig) -> Result<Self, ExternalServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            results_per_page: config.results_per_page.max(1),
            max_pages: config.max_pages.max(1),
            client,
        })
    }

    async fn fetch_page(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        start_index: usize,
    ) -> Result<CvePage, ExternalServiceError> {
        let mut request = self.client.get(&self.base_url).query(&[
            ("pubStartDate", format_nvd_date(start)),
            ("pubEndDate", format_nvd_date(end)),
            ("resultsPerPage", self.results_per_page.to_string()),
            ("startIndex", start_index.to_string()),
        ]);
        if let Some(ref key) = self.api_key {
            request = request.header("apiKey", key);
        }

        let response = request
            .send()
            .await
            .map_err(ExternalServiceError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => {
                    ExternalServiceError::RateLimited(body)
                }
                _ => ExternalServiceError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| ExternalServiceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AdvisorySource for NvdClient {
    /// NVD lists a window oldest first. When the window holds more than the
    /// page budget, the first page only supplies `totalResults` and reading
    /// resumes at the tail, where the newest records are.
    async fn recent(
        &self,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<Advisory>, ExternalServiceError> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(clamp_window(window_days)));

        let mut advisories = Vec::new();
        let mut start_index = 0;
        let mut pages = 0;
        while pages < self.max_pages {
            let page = self.fetch_page(start, end, start_index).await?;
            let received = page.vulnerabilities.len();
            tracing::debug!(
                start_index = page.start_index,
                received,
                total = page.total_results,
                "fetched NVD page"
            );

            // NVD caps the page size below what may have been asked for
            let served = match page.results_per_page {
                0 => self.results_per_page,
                n => n.min(self.results_per_page),
            };
            let budget = served * self.max_pages;
            if start_index == 0 && page.total_results > budget {
                start_index = page.total_results - budget;
                tracing::debug!(
                    total = page.total_results,
                    skip_to = start_index,
                    "window exceeds page budget, reading the newest pages"
                );
                continue;
            }

            pages += 1;
            advisories.extend(page.vulnerabilities.into_iter().map(|v| Advisory::from(v.cve)));

            start_index = page.start_index + page.results_per_page.max(received);
            if received == 0 || start_index >= page.total_results {
                break;
            }
        }

        Ok(newest_first(advisories, limit))
    }
}
