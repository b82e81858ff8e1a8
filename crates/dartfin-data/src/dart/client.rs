//! DART OpenAPI client with rate limiting.

use super::config::DartConfig;
use super::corp_code::CorpCodeList;
use super::filings::{CompanyOverview, FilingEntry, FilingListResponse};
use super::statements::{AccountListResponse, AccountRow, FsDivision};
use crate::error::{DataError, Result};
use crate::provider::DetailType;
use chrono::NaiveDate;
use log::debug;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Status code for a successful call
const STATUS_OK: &str = "000";

/// Status code for "no data matched the query"
const STATUS_NO_DATA: &str = "013";

/// Largest page size `list.json` accepts
const LIST_PAGE_SIZE: u32 = 100;

/// Status envelope shared by every DART JSON response.
pub(crate) trait DartResponse {
    fn status(&self) -> &str;
    fn message(&self) -> &str;
}

/// Check a response status.
///
/// Returns `Ok(true)` when the payload carries data, `Ok(false)` for DART's
/// explicit "no data" status, and an error for anything else.
pub(crate) fn check_status<R: DartResponse>(response: &R) -> Result<bool> {
    match response.status() {
        STATUS_OK => Ok(true),
        STATUS_NO_DATA => Ok(false),
        status => Err(DataError::DartApi {
            status: status.to_string(),
            message: response.message().to_string(),
        }),
    }
}

/// Rate limiter to keep request spacing above the configured interval
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: std::time::Duration,
}

impl RateLimiter {
    const fn new(min_interval: std::time::Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// DART OpenAPI client with rate limiting
pub struct DartClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    config: DartConfig,
}

impl DartClient {
    /// Create a client from injected configuration.
    ///
    /// # Errors
    /// Returns [`DataError::MissingApiKey`] for a blank key and
    /// [`DataError::Network`] if the HTTP client cannot be built.
    pub fn new(config: DartConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DataError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.min_interval))),
            config,
        })
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to fetch {}: HTTP {}",
                endpoint,
                response.status()
            )));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.get(endpoint, params).await?.text().await?;
        serde_json::from_str(&body).map_err(DataError::Serialization)
    }

    /// Download and parse the full corp-code list (`corpCode.xml`).
    ///
    /// The endpoint serves a zip archive; errors come back as a bare XML document.
    pub async fn corp_codes(&self) -> Result<CorpCodeList> {
        let bytes = self.get("corpCode.xml", &[]).await?.bytes().await?;
        CorpCodeList::from_archive(&bytes)
    }

    /// Company overview (`company.json`), used for the market segment.
    pub async fn company_overview(&self, corp_code: &str) -> Result<CompanyOverview> {
        let overview: CompanyOverview = self
            .get_json("company.json", &[("corp_code", corp_code)])
            .await?;
        check_status(&overview)?;
        Ok(overview)
    }

    /// Search periodic reports of one detail type (`list.json`), following pagination.
    ///
    /// Entries come back newest first.
    pub async fn list_filings(
        &self,
        corp_code: &str,
        start: NaiveDate,
        end: NaiveDate,
        detail_type: DetailType,
    ) -> Result<Vec<FilingEntry>> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let bgn_de = start.format("%Y%m%d").to_string();
        let end_de = end.format("%Y%m%d").to_string();
        let page_count = LIST_PAGE_SIZE.to_string();

        let mut entries = Vec::new();
        let mut page_no = 1u32;
        loop {
            let page = page_no.to_string();
            let response: FilingListResponse = self
                .get_json(
                    "list.json",
                    &[
                        ("corp_code", corp_code),
                        ("bgn_de", &bgn_de),
                        ("end_de", &end_de),
                        ("pblntf_detail_ty", detail_type.code()),
                        ("page_no", &page),
                        ("page_count", &page_count),
                    ],
                )
                .await?;

            if !check_status(&response)? {
                break;
            }

            let total_page = response.total_page;
            entries.extend(response.list);

            if page_no >= total_page {
                break;
            }
            page_no += 1;
        }

        debug!(
            "{} {} filings for {} between {} and {}",
            entries.len(),
            detail_type,
            corp_code,
            start,
            end
        );
        Ok(entries)
    }

    /// Full statement rows of one report (`fnlttSinglAcntAll.json`).
    ///
    /// Returns an empty vector when DART has no statements for the combination.
    pub async fn single_company_accounts(
        &self,
        corp_code: &str,
        business_year: i32,
        reprt_code: &str,
        fs_div: FsDivision,
    ) -> Result<Vec<AccountRow>> {
        let year = business_year.to_string();
        let response: AccountListResponse = self
            .get_json(
                "fnlttSinglAcntAll.json",
                &[
                    ("corp_code", corp_code),
                    ("bsns_year", &year),
                    ("reprt_code", reprt_code),
                    ("fs_div", fs_div.code()),
                ],
            )
            .await?;

        if check_status(&response)? {
            Ok(response.list)
        } else {
            Ok(Vec::new())
        }
    }
}

impl std::fmt::Debug for DartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}
