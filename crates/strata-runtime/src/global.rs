//! Process-wide default client
//!
//! The free functions forward to one lazily built client that talks to the
//! service over [`EndpointTransport`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use strata_core::{EndpointConfig, InitState, StrataResult, Value};
use strata_registry::{Catalog, TransportSource};
use strata_transport::EndpointTransport;

use crate::{AlgorithmsNamespace, Client, ErrorCallback, SuccessCallback};

static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();

/// The process-wide client
pub fn default_client() -> &'static Client {
    DEFAULT_CLIENT.get_or_init(|| {
        let transport = Arc::new(EndpointTransport::new());
        let catalog = Catalog::new(TransportSource::new(Arc::clone(&transport)));
        Client::builder(transport, Arc::new(catalog)).build()
    })
}

pub fn initialize(
    endpoints: Option<EndpointConfig>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
) -> StrataResult<()> {
    default_client().initialize(endpoints, on_success, on_error)
}

pub fn reset() {
    default_client().reset()
}

pub fn ready() -> InitState {
    default_client().ready()
}

pub fn call(name: &str, args: Vec<Value>) -> StrataResult<Value> {
    default_client().call(name, args)
}

pub fn apply(name: &str, args: BTreeMap<String, Value>) -> StrataResult<Value> {
    default_client().apply(name, args)
}

/// Namespace of unbound algorithms on the default client
pub fn algorithms() -> Arc<AlgorithmsNamespace> {
    default_client().algorithms()
}
