//! Where catalog signatures come from

use std::sync::Arc;

use strata_core::{parse_catalog, SignatureMap, StrataResult};
use strata_transport::EndpointTransport;

/// Source of the full signature catalog
pub trait SignatureSource: Send + Sync {
    /// Fetch the catalog; may block
    fn fetch(&self) -> StrataResult<SignatureMap>;
}

/// Fixed catalog held in memory
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    signatures: SignatureMap,
}

impl StaticSource {
    pub fn new(signatures: SignatureMap) -> Self {
        StaticSource { signatures }
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> StrataResult<Self> {
        Ok(StaticSource::new(parse_catalog(json)?))
    }
}

impl SignatureSource for StaticSource {
    fn fetch(&self) -> StrataResult<SignatureMap> {
        Ok(self.signatures.clone())
    }
}

/// Catalog fetched through the endpoint transport
#[derive(Clone)]
pub struct TransportSource {
    transport: Arc<EndpointTransport>,
}

impl TransportSource {
    pub fn new(transport: Arc<EndpointTransport>) -> Self {
        TransportSource { transport }
    }
}

impl SignatureSource for TransportSource {
    fn fetch(&self) -> StrataResult<SignatureMap> {
        self.transport.get_algorithms()
    }
}
