//! Blocking HTTP fetch of the algorithm catalog

use strata_core::{parse_catalog, SignatureMap, StrataError, StrataResult};

use crate::EndpointTransport;

impl EndpointTransport {
    /// Fetch the algorithm catalog from the configured API endpoint
    pub fn get_algorithms(&self) -> StrataResult<SignatureMap> {
        let url = self.algorithms_url();
        let body = self.get(&url)?;
        let catalog = parse_catalog(&body)?;
        tracing::debug!(url = %url, algorithms = catalog.len(), "catalog fetched");
        Ok(catalog)
    }

    /// GET a URL and return the body.
    ///
    /// Error statuses still return their body when it parses as an error
    /// envelope, so the server's message reaches the caller.
    fn get(&self, url: &str) -> StrataResult<String> {
        let agent = ureq::AgentBuilder::new()
            .timeout(self.options.timeout)
            .build();

        match agent.get(url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| StrataError::TransportError(e.to_string())),
            Err(ureq::Error::Status(code, response)) => {
                tracing::warn!(url = %url, status = code, "catalog request rejected");
                let body = response
                    .into_string()
                    .map_err(|e| StrataError::TransportError(e.to_string()))?;
                match parse_catalog(&body) {
                    Err(err @ StrataError::LoadFailure(_)) => Err(err),
                    _ => Err(StrataError::TransportError(format!(
                        "HTTP {} from {}",
                        code, url
                    ))),
                }
            }
            Err(e) => {
                tracing::warn!(url = %url, "catalog request failed: {}", e);
                Err(StrataError::TransportError(e.to_string()))
            }
        }
    }
}
