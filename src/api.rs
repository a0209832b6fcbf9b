use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::tmdb::MovieCategory;

// At compile time, set TMDB_API_KEY env var to embed a key, otherwise users must provide one in config
const EMBEDDED_API_KEY: Option<&str> = option_env!("TMDB_API_KEY");

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org";

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("invalid URL")]
    InvalidUrl,
    #[error("request failed ({status}): {}", .message.as_deref().unwrap_or("unknown error"))]
    RequestFailed { status: u16, message: Option<String> },
    #[error("failed to decode response: {0}")]
    DecodingFailed(#[from] serde_json::Error),
    #[error("no data received")]
    NoData,
    #[error("unknown error: {0}")]
    Unknown(#[from] reqwest::Error),
}

/// Catalog API routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    MovieList { category: MovieCategory, page: u32 },
    MovieDetail { id: u64 },
    MovieCredits { id: u64 },
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::MovieList { .. } => "/3/discover/movie".to_string(),
            Endpoint::MovieDetail { id } => format!("/3/movie/{}", id),
            Endpoint::MovieCredits { id } => format!("/3/movie/{}/credits", id),
        }
    }

    /// Query parameters besides the API key
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::MovieList { category, page } => vec![
                ("sort_by", category.sort_by().to_string()),
                ("page", page.to_string()),
            ],
            Endpoint::MovieDetail { .. } | Endpoint::MovieCredits { .. } => Vec::new(),
        }
    }
}

pub struct ApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the public API. Uses custom key if provided, otherwise tries embedded key.
    /// Returns None if no API key is available.
    pub fn new(custom_api_key: Option<&str>) -> Option<Self> {
        Self::with_base_url(custom_api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing or proxies)
    pub fn with_base_url(custom_api_key: Option<&str>, base_url: &str) -> Option<Self> {
        let api_key = custom_api_key
            .filter(|k| !k.is_empty())
            .map(String::from)
            .or_else(|| EMBEDDED_API_KEY.map(String::from))?;

        Some(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, NetworkError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint.path()))
            .map_err(|_| NetworkError::InvalidUrl)?;
        if url.cannot_be_a_base() {
            return Err(NetworkError::InvalidUrl);
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (name, value) in endpoint.query() {
                pairs.append_pair(name, &value);
            }
        }

        Ok(url)
    }

    /// GET an endpoint and decode the JSON body into `T`
    pub async fn request<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, NetworkError> {
        let url = self.url_for(&endpoint)?;

        debug!(path = %endpoint.path(), "requesting catalog API");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).trim().to_string();
            warn!(status = status.as_u16(), path = %endpoint.path(), "catalog request failed");
            return Err(NetworkError::RequestFailed {
                status: status.as_u16(),
                message: (!message.is_empty()).then_some(message),
            });
        }

        if body.is_empty() {
            return Err(NetworkError::NoData);
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, path = %endpoint.path(), "failed to decode catalog response");
            NetworkError::DecodingFailed(e)
        })
    }
}
