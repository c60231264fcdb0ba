//! Controllable collaborators for lifecycle tests

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use strata_core::{
    Expression, ProxyKind, ProxyType, Signature, SignatureMap, StrataError, StrataResult, Value,
};
use strata_registry::{Catalog, FunctionRegistry, LoadCallback};
use strata_runtime::{standard_classes, Client, ErrorCallback, ProxyClass, SuccessCallback};
use strata_transport::Transport;

use crate::fixture_source;

// ============================================================================
// MANUAL REGISTRY
// ============================================================================

/// Function registry whose async loads resolve only when the test says so
pub struct ManualRegistry {
    catalog: Catalog,
    pending: Mutex<VecDeque<LoadCallback>>,
    sync_failure: Mutex<Option<StrataError>>,
    sync_loads: AtomicUsize,
    async_loads: AtomicUsize,
}

impl ManualRegistry {
    pub fn new() -> Self {
        ManualRegistry {
            catalog: Catalog::new(fixture_source()),
            pending: Mutex::new(VecDeque::new()),
            sync_failure: Mutex::new(None),
            sync_loads: AtomicUsize::new(0),
            async_loads: AtomicUsize::new(0),
        }
    }

    /// Make synchronous loads fail with `err` (or succeed again with `None`)
    pub fn fail_sync_loads(&self, err: Option<StrataError>) {
        *self.sync_failure.lock() = err;
    }

    /// Async loads waiting to be resolved
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Resolve the oldest async load successfully
    pub fn complete_next(&self) -> bool {
        let Some(done) = self.pending.lock().pop_front() else {
            return false;
        };
        done(self.catalog.load_signatures());
        true
    }

    /// Resolve the oldest async load with `err`
    pub fn fail_next(&self, err: StrataError) -> bool {
        let Some(done) = self.pending.lock().pop_front() else {
            return false;
        };
        done(Err(err));
        true
    }

    pub fn sync_loads(&self) -> usize {
        self.sync_loads.load(Ordering::SeqCst)
    }

    pub fn async_loads(&self) -> usize {
        self.async_loads.load(Ordering::SeqCst)
    }
}

impl Default for ManualRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry for ManualRegistry {
    fn load_signatures(&self) -> StrataResult<()> {
        self.sync_loads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.sync_failure.lock().clone() {
            return Err(err);
        }
        self.catalog.load_signatures()
    }

    fn load_signatures_async(&self, done: LoadCallback) {
        self.async_loads.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().push_back(done);
    }

    fn reset(&self) {
        self.catalog.reset()
    }

    fn all_signatures(&self) -> SignatureMap {
        self.catalog.all_signatures()
    }

    fn unbound_signatures(&self) -> SignatureMap {
        self.catalog.unbound_signatures()
    }

    fn signature(&self, name: &str) -> Option<Signature> {
        self.catalog.signature(name)
    }

    fn build_call(&self, name: &str, args: Vec<Value>) -> StrataResult<Expression> {
        self.catalog.build_call(name, args)
    }

    fn build_call_named(
        &self,
        name: &str,
        args: BTreeMap<String, Value>,
    ) -> StrataResult<Expression> {
        self.catalog.build_call_named(name, args)
    }

    fn import_api(&self, target: &mut ProxyType, prefix: &str) {
        self.catalog.import_api(target, prefix)
    }

    fn clear_api(&self, target: &mut ProxyType) {
        self.catalog.clear_api(target)
    }
}

// ============================================================================
// RECORDING TRANSPORT
// ============================================================================

/// Transport that records what it was told
#[derive(Default)]
pub struct RecordingTransport {
    configurations: Mutex<Vec<(Option<String>, Option<String>)>>,
    resets: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `configure` call, oldest first
    pub fn configurations(&self) -> Vec<(Option<String>, Option<String>)> {
        self.configurations.lock().clone()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn configure(&self, api_base_url: Option<&str>, tile_base_url: Option<&str>) {
        self.configurations.lock().push((
            api_base_url.map(str::to_owned),
            tile_base_url.map(str::to_owned),
        ));
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// FAILING CLASS
// ============================================================================

/// Hand-written class whose initialize hook fails
pub struct FailingClass {
    kind: ProxyKind,
    error: StrataError,
    calls: AtomicUsize,
}

impl FailingClass {
    pub fn new(kind: ProxyKind, error: StrataError) -> Self {
        FailingClass {
            kind,
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProxyClass for FailingClass {
    fn kind(&self) -> ProxyKind {
        self.kind
    }

    fn initialize(
        &self,
        _functions: &dyn FunctionRegistry,
        _descriptor: &mut ProxyType,
    ) -> StrataResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

// ============================================================================
// SLOW CLASS
// ============================================================================

/// Hand-written class whose initialize hook takes `delay` to bind its API
pub struct SlowClass {
    kind: ProxyKind,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    overlaps: AtomicUsize,
}

impl SlowClass {
    pub fn new(kind: ProxyKind, delay: Duration) -> Self {
        SlowClass {
            kind,
            delay,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hook runs that started while another was still running
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}

impl ProxyClass for SlowClass {
    fn kind(&self) -> ProxyKind {
        self.kind
    }

    fn initialize(
        &self,
        functions: &dyn FunctionRegistry,
        descriptor: &mut ProxyType,
    ) -> StrataResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        std::thread::sleep(self.delay);
        functions.import_api(descriptor, self.name());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// CALLBACK LOG
// ============================================================================

/// Records callback invocations in order
#[derive(Clone, Default)]
pub struct CallbackLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl CallbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Success callback logging `label`
    pub fn success(&self, label: &str) -> SuccessCallback {
        let events = Arc::clone(&self.events);
        let label = label.to_string();
        Box::new(move || events.lock().push(label))
    }

    /// Error callback logging `label: error`
    pub fn error(&self, label: &str) -> ErrorCallback {
        let events = Arc::clone(&self.events);
        let label = label.to_string();
        Box::new(move |err: &StrataError| events.lock().push(format!("{}: {}", label, err)))
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// A client wired to the manual registry and recording transport
pub struct Harness {
    pub client: Client,
    pub registry: Arc<ManualRegistry>,
    pub transport: Arc<RecordingTransport>,
    pub log: CallbackLog,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_classes(standard_classes())
    }

    pub fn with_classes(classes: Vec<Arc<dyn ProxyClass>>) -> Self {
        let registry = Arc::new(ManualRegistry::new());
        let transport = Arc::new(RecordingTransport::new());
        let client = Client::builder(transport.clone(), registry.clone())
            .classes(classes)
            .build();
        Harness {
            client,
            registry,
            transport,
            log: CallbackLog::new(),
        }
    }

    /// Start an async bootstrap whose callbacks log under `label`
    pub fn initialize_async(&self, label: &str) -> StrataResult<()> {
        self.client.initialize(
            None,
            Some(self.log.success(label)),
            Some(self.log.error(label)),
        )
    }

    /// Run a synchronous bootstrap
    pub fn initialize_sync(&self) -> StrataResult<()> {
        self.client.initialize(None, None, None)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
