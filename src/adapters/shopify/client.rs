//! Shopify Admin REST API client
//!
//! A thin `reqwest` wrapper that authenticates every request with the static
//! access token and maps transport and status failures onto [`ShopifyError`].
//! Requests are issued one at a time with no retry.

use super::models::{next_page_link, parse_orders_body, ShopIdentity, ShopResponse};
use crate::config::{SecretString, ShopifyConfig};
use crate::domain::{Order, PipelineError, Result, ShopifyError};
use reqwest::header::{CONTENT_TYPE, LINK, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Header carrying the Admin API access token
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Shopify Admin API client
///
/// # Example
///
/// ```no_run
/// use orderflow::adapters::shopify::ShopifyClient;
/// use orderflow::config::ShopifyConfig;
///
/// # async fn example() -> orderflow::domain::Result<()> {
/// let config = ShopifyConfig::default();
/// let client = ShopifyClient::new(&config)?;
/// let shop = client.current_shop().await?;
/// println!("Connected to {}", shop.name);
/// # Ok(())
/// # }
/// ```
pub struct ShopifyClient {
    /// `{scheme}://{store}/admin/api/{version}/`
    base_url: Url,

    client: Client,

    access_token: SecretString,

    page_size: u32,

    max_pages: u32,

    order_status: Option<String>,
}

impl ShopifyClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the store URL cannot be parsed or the HTTP client
    /// cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let base_url = admin_base_url(&config.store_url, &config.api_version)?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ShopifyError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            access_token: config.api_key.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            order_status: config.order_status.clone(),
        })
    }

    /// Admin API base URL this client talks to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Fetch the identity of the store behind the access token
    ///
    /// This is an authenticated metadata call, so it checks reachability and
    /// credentials at the same time.
    pub async fn current_shop(&self) -> Result<ShopIdentity> {
        let url = self.endpoint("shop.json")?;
        let response = self.get(url).await?;
        let body = read_body(response).await?;

        let parsed: ShopResponse = serde_json::from_str(&body).map_err(|e| {
            ShopifyError::InvalidResponse(format!("shop body could not be parsed: {e}"))
        })?;

        tracing::debug!(
            shop_id = parsed.shop.id,
            shop_name = %parsed.shop.name,
            "Fetched store identity"
        );

        Ok(parsed.shop)
    }

    /// Fetch orders, following `Link: rel="next"` pages up to `max_pages`
    pub async fn fetch_orders(&self) -> Result<Vec<Order>> {
        let mut url = self.orders_url()?;
        let mut orders = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self.get(url).await?;
            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_link);

            let body = read_body(response).await?;
            let page_orders = parse_orders_body(&body)?;

            tracing::debug!(page, count = page_orders.len(), "Fetched orders page");
            orders.extend(page_orders);

            let Some(next) = next else {
                break;
            };

            if page >= self.max_pages {
                tracing::warn!(
                    max_pages = self.max_pages,
                    fetched = orders.len(),
                    "Page limit reached, remaining orders were not fetched"
                );
                break;
            }

            url = Url::parse(&next).map_err(|e| {
                ShopifyError::InvalidResponse(format!("Invalid next page link '{next}': {e}"))
            })?;
            page += 1;
        }

        tracing::info!(count = orders.len(), pages = page, "Fetched orders");
        Ok(orders)
    }

    fn endpoint(&self, resource: &str) -> Result<Url> {
        self.base_url.join(resource).map_err(|e| {
            ShopifyError::ConnectionFailed(format!("Invalid endpoint '{resource}': {e}")).into()
        })
    }

    fn orders_url(&self) -> Result<Url> {
        let mut url = self.endpoint("orders.json")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.page_size.to_string());
            if let Some(status) = &self.order_status {
                query.append_pair("status", status);
            }
        }
        Ok(url)
    }

    /// Authenticated GET with status mapping
    async fn get(&self, url: Url) -> Result<Response> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, self.access_token.expose_secret().as_ref())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let message = response.text().await.unwrap_or_default();

        Err(map_status_error(status, message, retry_after).into())
    }
}

/// Build `{scheme}://{store}/admin/api/{version}/`
///
/// A store given without a scheme is reached over HTTPS.
pub fn admin_base_url(store_url: &str, api_version: &str) -> Result<Url> {
    let invalid = |reason: &str| -> PipelineError {
        ShopifyError::ConnectionFailed(format!("Invalid store URL '{store_url}': {reason}")).into()
    };

    let trimmed = store_url.trim();
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme @ ("http" | "https"), rest)) => (scheme, rest),
        Some((scheme, _)) => return Err(invalid(&format!("unsupported scheme '{scheme}'"))),
        None => ("https", trimmed),
    };
    let host = rest.trim_matches('/');
    if host.is_empty() {
        return Err(invalid("no host"));
    }

    let mut url = Url::parse(&format!("{scheme}://{host}")).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("no host"));
    }
    url.set_path(&format!("admin/api/{api_version}/"));
    url.set_query(None);
    Ok(url)
}

async fn read_body(response: Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| ShopifyError::InvalidResponse(format!("Failed to read body: {e}")).into())
}

fn map_transport_error(err: reqwest::Error) -> ShopifyError {
    if err.is_timeout() {
        ShopifyError::Timeout(err.to_string())
    } else {
        ShopifyError::ConnectionFailed(err.to_string())
    }
}

fn map_status_error(status: StatusCode, message: String, retry_after: Option<String>) -> ShopifyError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ShopifyError::AuthenticationFailed(format!("{status}: {message}"))
        }
        StatusCode::TOO_MANY_REQUESTS => ShopifyError::RateLimited(
            retry_after.map_or_else(|| status.to_string(), |s| format!("retry after {s}s")),
        ),
        s if s.is_server_error() => ShopifyError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => ShopifyError::ClientError {
            status: s.as_u16(),
            message,
        },
    }
}
