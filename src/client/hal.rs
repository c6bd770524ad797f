//! HAL (French open archive) search client implementation.

use chrono::Datelike;
use reqwest::Response;
use std::time::Duration;
use url::Url;

use crate::client::HalError;
use crate::config::ClientConfig;
use crate::models::{date_range_filter, Format, QueryParams, SearchParams};
use crate::utils::HttpClient;

/// Client for the HAL search API
///
/// Holds the resolved endpoint and a pooled HTTP client. Cloning shares the
/// pool.
#[derive(Debug, Clone)]
pub struct HalClient {
    config: ClientConfig,
    endpoint: Url,
    http: HttpClient,
}

impl HalClient {
    /// Create a client from a configuration.
    ///
    /// Fails when both portal and collection are set, when the base URL does
    /// not parse, or when the timeout is not a positive number of seconds.
    pub fn new(config: ClientConfig) -> Result<Self, HalError> {
        config.validate()?;

        let endpoint = resolve_endpoint(
            &config.base_url,
            config.portal.as_deref(),
            config.collection.as_deref(),
        )?;
        let http = HttpClient::with_settings(&config.user_agent, config.timeout()?)?;

        tracing::debug!(endpoint = %endpoint, "Created HAL client");

        Ok(Self {
            config,
            endpoint,
            http,
        })
    }

    pub fn builder() -> HalClientBuilder {
        HalClientBuilder::default()
    }

    /// URL every search request is sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_format(&self) -> Format {
        self.config.default_format
    }

    /// Build the query string for `params` using the current calendar year
    pub fn build_query(&self, params: &SearchParams) -> Result<QueryParams, HalError> {
        self.build_query_for_year(params, chrono::Local::now().year())
    }

    /// Build the query string for `params`, filling a missing `after` bound
    /// with `current_year`
    pub fn build_query_for_year(
        &self,
        params: &SearchParams,
        current_year: i32,
    ) -> Result<QueryParams, HalError> {
        if params.query.trim().is_empty() {
            return Err(HalError::InvalidRequest("query must not be empty".to_string()));
        }

        let mut query = QueryParams::new();
        query.push("q", &params.query);
        query.push("wt", params.format.unwrap_or(self.config.default_format));

        if let Some(fields) = params.include_fields.as_ref().filter(|f| !f.is_empty()) {
            query.push("fl", fields.join(","));
        }

        if let Some(sort_by) = params.sort_by.as_deref().filter(|s| !s.is_empty()) {
            let order = params.sort_order.unwrap_or_default();
            query.push("sort", format!("{} {}", sort_by, order));
        }

        if let Some(filter) = date_range_filter(params.before, params.after, current_year) {
            query.push("fq", filter);
        }

        query.push("rows", params.rows);
        query.push("start", params.offset);

        Ok(query)
    }

    /// Send one search request and return the raw response.
    ///
    /// Parameters are validated before anything goes on the wire. A non-2xx
    /// status becomes [`HalError::HttpStatus`] with the response body;
    /// transport failures are returned as [`HalError::Network`] and never
    /// retried.
    pub async fn search(&self, params: &SearchParams) -> Result<Response, HalError> {
        let query = self.build_query(params)?;
        tracing::debug!(?query, "HAL query parameters");

        let client = self.http.client();
        let request = client.get(self.endpoint.clone()).query(&query).build()?;

        tracing::info!(url = %request.url(), "Sending HAL search request");

        let response = client.execute(request).await.map_err(|e| {
            tracing::warn!(error = %e, "HAL search request failed");
            HalError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read HAL error response body");
                String::new()
            });
            tracing::warn!(status = status.as_u16(), "HAL API returned an error status");
            return Err(HalError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

/// Join the optional portal or collection segment onto the base URL.
///
/// The result always ends with `/`, so requests go to `<base>/<segment>/`.
pub fn resolve_endpoint(
    base_url: &str,
    portal: Option<&str>,
    collection: Option<&str>,
) -> Result<Url, HalError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| HalError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

    if base.cannot_be_a_base() {
        return Err(HalError::Config(format!(
            "Base URL '{}' cannot carry a path",
            base_url
        )));
    }

    let segment = [portal, collection]
        .into_iter()
        .flatten()
        .map(|s| s.trim().trim_matches('/'))
        .find(|s| !s.is_empty());

    if let Some(segment @ ("." | "..")) = segment {
        return Err(HalError::Config(format!(
            "Invalid path segment '{}'",
            segment
        )));
    }

    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop_if_empty();
        if let Some(segment) = segment {
            segments.push(segment);
        }
        segments.push("");
    }

    Ok(base)
}

/// Builder for [`HalClient`]
#[derive(Debug, Clone, Default)]
pub struct HalClientBuilder {
    config: ClientConfig,
}

impl HalClientBuilder {
    /// Start from an existing configuration
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn portal(mut self, portal: impl Into<String>) -> Self {
        self.config.portal = Some(portal.into());
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.config.collection = Some(collection.into());
        self
    }

    pub fn default_format(mut self, format: Format) -> Self {
        self.config.default_format = format;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HalClient, HalError> {
        HalClient::new(self.config)
    }
}
