//! HTTP source
//!
//! Issues the prepared request once, or repeatedly with an increasing page
//! counter until the source answers with an empty body, accumulating raw
//! records in page-arrival order. No retry or backoff: any request failure
//! aborts the run.

mod filter;
mod payload;

pub use filter::{apply_filters, API_KEY_PARAM};
pub use payload::{is_falsy, ResponseBody, WRAPPER_KEYS};

use reqwest::Client;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, RecordBatch};

/// Literal token in the URL replaced by the 1-based page counter
pub const PAGE_PLACEHOLDER: &str = "PAGE_NUMBER";

/// The HTTP source: one prepared request shape, fetched once or per page
pub struct Source<'a> {
    client: &'a Client,
    config: &'a PipelineConfig,
}

impl<'a> Source<'a> {
    /// Create a source over a shared HTTP client
    pub fn new(client: &'a Client, config: &'a PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Run the fetch loop against the final (filter-applied) URL.
    ///
    /// Records come back in page-arrival order. An empty batch is the
    /// normal "no new records" outcome, not an error.
    pub async fn fetch(&self, url: &str) -> Result<RecordBatch> {
        info!(method = ?self.config.method, "performing source request");
        if self.config.paginated {
            self.fetch_paginated(url).await
        } else {
            self.fetch_single(url).await
        }
    }

    async fn fetch_single(&self, url: &str) -> Result<RecordBatch> {
        let body = self.request_page(url).await?;
        if is_falsy(&body) {
            return Ok(Vec::new());
        }
        ResponseBody::classify(body)?.into_records()
    }

    async fn fetch_paginated(&self, url: &str) -> Result<RecordBatch> {
        let mut records = Vec::new();
        let mut page: u32 = 1;
        loop {
            let page_url = url.replace(PAGE_PLACEHOLDER, &page.to_string());
            let body = self.request_page(&page_url).await?;
            if is_falsy(&body) {
                debug!(page, "empty page, stopping pagination");
                break;
            }
            let page_records = ResponseBody::classify(body)?.into_records()?;
            info!(page, count = page_records.len(), url = %page_url, "pulled page");
            records.extend(page_records);
            page += 1;
        }
        Ok(records)
    }

    /// Issue one request and parse the JSON body.
    async fn request_page(&self, url: &str) -> Result<JsonValue> {
        let mut request = self.client.request(self.config.method.into(), url);
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        if let Some(body) = &self.config.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
