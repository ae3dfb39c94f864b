// GitHub API HTTP client.
// Handles authentication, rate limit tracking, pagination, and response status mapping.

use reqwest::{
    Client, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{MetricsError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Page size used for list endpoints (GitHub maximum).
pub const PER_PAGE: u32 = 100;

/// GitHub API client with authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Create a client against a different API root (GitHub Enterprise).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| MetricsError::Other(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("scope-metrics"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(MetricsError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: RateLimit::default(),
        })
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// Build an API URL from raw path segments, percent-encoding each one.
    pub fn url_for<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = Url::parse(&self.base_url).map_err(|e| MetricsError::Other(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| MetricsError::Other(format!("invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request to the GitHub API.
    pub async fn get(&mut self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let request = self.client.get(&url);
        self.send(request).await
    }

    /// Make a GET request to an already-built URL.
    pub async fn get_url(&mut self, url: Url) -> Result<Response> {
        let request = self.client.get(url);
        self.send(request).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let request = self.client.get(&url).query(params);
        self.send(request).await
    }

    /// Read every page of a list endpoint, stopping at the first short page.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        collect_pages(async |page: u32| -> Result<Vec<T>> {
            let mut query: Vec<(&str, String)> = params.to_vec();
            query.push(("per_page", PER_PAGE.to_string()));
            query.push(("page", page.to_string()));

            let response = self.get_with_params(endpoint, &query).await?;
            let batch: Vec<T> = response.json().await?;
            debug!(endpoint, page, fetched = batch.len(), "fetched page");
            Ok(batch)
        })
        .await
    }

    async fn send(&mut self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(MetricsError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        if let Some(limit) = response
            .headers()
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
        {
            self.rate_limit.limit = limit;
        }

        if let Some(remaining) = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
        {
            self.rate_limit.remaining = remaining;
        }

        if let Some(reset) = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
        {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(MetricsError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(MetricsError::NotFound(url))
            }
            StatusCode::FORBIDDEN => {
                if self.rate_limit.remaining == 0 {
                    let reset_at =
                        chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
                            .map(|dt| dt.format("%H:%M:%S").to_string())
                            .unwrap_or_else(|| "unknown".to_string());
                    warn!(reset_at = %reset_at, "GitHub rate limit exhausted");
                    Err(MetricsError::RateLimited { reset_at })
                } else {
                    Err(MetricsError::Other(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    )))
                }
            }
            status => Err(MetricsError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

/// Request pages `1, 2, ...` until one comes back with fewer than
/// [`PER_PAGE`] items. A full final page costs one extra empty request.
pub(crate) async fn collect_pages<T, F>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: AsyncFnMut(u32) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        let batch = fetch_page(page).await?;
        let fetched = batch.len();
        items.extend(batch);

        if fetched < PER_PAGE as usize {
            return Ok(items);
        }
        page += 1;
    }
}
