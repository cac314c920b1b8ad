//! Blocking client for collections served by PostgREST.
//!
//! Pagination uses item ranges (`Range-Unit: items`, `Range: a-b`), counts
//! are read from the `Content-Range` header of a `0-0` request made with
//! `Prefer: count=exact`, and single records are requested as objects.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::error::{HarvestError, Result};
use crate::filters::FilterSpec;
use crate::storage::HarvesterConfig;

use super::{RawRecord, RemoteCollectionClient};

const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

/// PostgREST-backed [`RemoteCollectionClient`].
pub struct PostgRestClient {
    api_base_url: String,
    http_client: Client,
}

impl PostgRestClient {
    /// Create a client for the API rooted at `api_base_url`.
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self> {
        Url::parse(api_base_url)
            .map_err(|e| HarvestError::Transport(format!("invalid API url '{api_base_url}': {e}")))?;
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarvestError::Transport(e.to_string()))?;
        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create a client from the harvester configuration.
    pub fn from_config(config: &HarvesterConfig) -> Result<Self> {
        Self::new(
            &config.api_base_url(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base_url, endpoint.trim_start_matches('/'))
    }

    fn get(&self, endpoint: &str, filter: &FilterSpec) -> (String, RequestBuilder) {
        let url = self.url(endpoint);
        let params: Vec<(&str, &str)> = filter.iter().collect();
        let request = self.http_client.get(&url).query(&params);
        (url, request)
    }
}

/// Total carried by a `Content-Range` header such as `0-0/42`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

impl RemoteCollectionClient for PostgRestClient {
    fn check_availability(&self) -> bool {
        match self.http_client.get(&self.api_base_url).send() {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                error!(url = %self.api_base_url, error = %e, "availability check failed");
                false
            }
        }
    }

    fn total_count(&self, endpoint: &str, filter: &FilterSpec) -> u64 {
        let (url, request) = self.get(endpoint, filter);
        debug!(url = %url, "counting remote records");
        let response = match request
            .header("Range-Unit", "items")
            .header("Range", "0-0")
            .header("Prefer", "count=exact")
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "count request failed");
                return 0;
            }
        };

        if response.status() != StatusCode::PARTIAL_CONTENT {
            error!(
                url = %url,
                status = %response.status(),
                "invalid response when determining number of total records"
            );
            return 0;
        }

        let total = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total);
        match total {
            Some(total) => total,
            None => {
                error!(url = %url, "missing or unreadable Content-Range header");
                0
            }
        }
    }

    fn page(&self, endpoint: &str, offset: u64, limit: u64, filter: &FilterSpec) -> Vec<RawRecord> {
        if limit == 0 {
            return Vec::new();
        }
        let (url, request) = self.get(endpoint, filter);
        let range = format!("{}-{}", offset, offset + limit - 1);
        debug!(url = %url, range = %range, "fetching page");
        let response = match request
            .header("Range-Unit", "items")
            .header("Range", range)
            .header("Accept", "application/json")
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "page request failed");
                return Vec::new();
            }
        };

        if response.status() != StatusCode::OK {
            error!(url = %url, status = %response.status(), "received invalid page response");
            return Vec::new();
        }

        match response.json::<Vec<Value>>() {
            Ok(values) => values
                .into_iter()
                .filter_map(|value| match value {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            Err(e) => {
                error!(url = %url, error = %e, "page response is not a JSON array");
                Vec::new()
            }
        }
    }

    fn fetch_by_id(&self, endpoint: &str, id: &str, id_field: &str) -> Option<RawRecord> {
        let url = self.url(endpoint);
        let response = match self
            .http_client
            .get(&url)
            .query(&[(id_field, format!("eq.{id}"))])
            .header("Accept", SINGLE_OBJECT_MEDIA_TYPE)
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, id_field, id, error = %e, "record request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            error!(
                url = %url,
                id_field,
                id,
                status = %response.status(),
                "could not retrieve resource"
            );
            return None;
        }

        match response.json::<Value>() {
            Ok(Value::Object(record)) => Some(record),
            Ok(_) => {
                error!(url = %url, id, "record response is not a JSON object");
                None
            }
            Err(e) => {
                error!(url = %url, id, error = %e, "record response is not valid JSON");
                None
            }
        }
    }
}
