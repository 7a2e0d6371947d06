//! HTTP client for the Regulations.gov v4 API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::Query,
    types::{DetailResponse, ListResponse, ResourceKind},
    Error,
};

/// Request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error code the API places in the body of a quota-exceeded response.
const OVER_RATE_LIMIT: &str = "OVER_RATE_LIMIT";

/// HTTP client for the Regulations.gov v4 API.
///
/// Holds the opaque API key and attaches it as the `X-Api-Key` header on
/// every request. The key is never logged.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    /// Base URL for the API. Defaults to `https://api.regulations.gov/v4`.
    base_api_url: String,
}

impl Client {
    /// Creates a new client pointing at the production API.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_base_url("https://api.regulations.gov/v4", api_key)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_api_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        tracing::debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .header("accept", "application/vnd.api+json, application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || (!status.is_success() && body.contains(OVER_RATE_LIMIT))
        {
            return Err(Error::QuotaExceeded);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::debug!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::Parse {
                message: e.to_string(),
                body: snippet,
            }
        })
    }

    /// Fetches one page of a list endpoint.
    pub async fn list<A, Q>(&self, query: &Q) -> Result<ListResponse<A>, Error>
    where
        A: DeserializeOwned,
        Q: Query,
    {
        let url = self.get_url(Q::KIND.path())?;
        self.get(query.add_to_url(&url)).await
    }

    /// Fetches a single item from a detail endpoint, optionally side-loading
    /// related resources (`include=attachments`).
    pub async fn detail<A>(
        &self,
        kind: ResourceKind,
        id: &str,
        include: Option<&str>,
    ) -> Result<DetailResponse<A>, Error>
    where
        A: DeserializeOwned,
    {
        let mut url = self.get_url(kind.path())?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("cannot append {} to {}", id, kind.path())))?
            .pop_if_empty()
            .push(id);
        if let Some(include) = include {
            url.query_pairs_mut().append_pair("include", include);
        }
        self.get(url).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
