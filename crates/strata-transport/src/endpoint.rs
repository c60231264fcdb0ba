//! Endpoint transport implementation

use parking_lot::RwLock;

use strata_core::{HttpOptions, DEFAULT_API_BASE_URL, DEFAULT_TILE_BASE_URL};

/// Lifecycle contract the bootstrap needs from a transport
pub trait Transport: Send + Sync {
    /// Apply endpoint configuration. `None` keeps the current endpoint.
    fn configure(&self, api_base_url: Option<&str>, tile_base_url: Option<&str>);

    /// Forget all configuration
    fn reset(&self);
}

#[derive(Clone, Debug)]
struct Endpoints {
    api_base_url: String,
    tile_base_url: String,
    configured: bool,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            tile_base_url: DEFAULT_TILE_BASE_URL.to_string(),
            configured: false,
        }
    }
}

/// Transport that tracks configured endpoints and fetches over HTTP
pub struct EndpointTransport {
    endpoints: RwLock<Endpoints>,
    pub(crate) options: HttpOptions,
}

impl EndpointTransport {
    pub fn new() -> Self {
        Self::with_options(HttpOptions::default())
    }

    pub fn with_options(options: HttpOptions) -> Self {
        EndpointTransport {
            endpoints: RwLock::new(Endpoints::default()),
            options,
        }
    }

    /// Current API base URL
    pub fn api_base_url(&self) -> String {
        self.endpoints.read().api_base_url.clone()
    }

    /// Current tile base URL
    pub fn tile_base_url(&self) -> String {
        self.endpoints.read().tile_base_url.clone()
    }

    /// Has `configure` run since creation or the last reset?
    pub fn is_configured(&self) -> bool {
        self.endpoints.read().configured
    }

    /// URL of the algorithm catalog
    pub fn algorithms_url(&self) -> String {
        format!("{}/algorithms", self.api_base_url().trim_end_matches('/'))
    }
}

impl Default for EndpointTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for EndpointTransport {
    fn configure(&self, api_base_url: Option<&str>, tile_base_url: Option<&str>) {
        let mut endpoints = self.endpoints.write();
        // Before the first configuration an omitted endpoint means the default.
        if !endpoints.configured {
            *endpoints = Endpoints::default();
        }
        if let Some(url) = api_base_url {
            endpoints.api_base_url = url.to_string();
        }
        if let Some(url) = tile_base_url {
            endpoints.tile_base_url = url.to_string();
        }
        endpoints.configured = true;
        tracing::debug!(
            api = %endpoints.api_base_url,
            tiles = %endpoints.tile_base_url,
            "transport configured"
        );
    }

    fn reset(&self) {
        *self.endpoints.write() = Endpoints::default();
    }
}
