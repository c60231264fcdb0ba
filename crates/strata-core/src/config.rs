//! Endpoint configuration and protocol constants

use std::time::Duration;

/// Edge length, in pixels, of a map tile served by the tile endpoint
pub const TILE_SIZE: u32 = 256;

/// API endpoint used when none was configured
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Tile endpoint used when none was configured
pub const DEFAULT_TILE_BASE_URL: &str = "http://127.0.0.1:8080";

/// Timeout applied to a blocking catalog request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints handed to the transport on initialization
///
/// An empty config means "no new configuration": a ready client stays
/// ready and the transport keeps what it already has.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Base URL of the algorithm/computation API
    pub api_base_url: Option<String>,
    /// Base URL of the tile server
    pub tile_base_url: Option<String>,
}

impl EndpointConfig {
    pub fn new() -> Self {
        EndpointConfig::default()
    }

    /// Set the API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the tile base URL
    pub fn with_tile_base_url(mut self, url: impl Into<String>) -> Self {
        self.tile_base_url = Some(url.into());
        self
    }

    /// True when neither endpoint is set
    pub fn is_empty(&self) -> bool {
        self.api_base_url.is_none() && self.tile_base_url.is_none()
    }
}

/// Options for blocking HTTP requests
#[derive(Clone, Debug)]
pub struct HttpOptions {
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        HttpOptions {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
