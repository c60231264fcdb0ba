//! Strata Client - initialization controller
//!
//! A bootstrap runs in stages:
//! 1. Configure transport endpoints
//! 2. Load the signature catalog (inline or on the async runtime)
//! 3. Run hand-written class hooks
//! 4. Generate classes from the catalog
//! 5. Bind unbound algorithms into the namespace
//! 6. Resolve queued callbacks

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use strata_core::{EndpointConfig, InitState, ProxyType, StrataError, StrataResult, Value};
use strata_registry::FunctionRegistry;
use strata_transport::Transport;

use crate::{
    standard_classes, AlgorithmsNamespace, ClassGenerator, ProxyClass, TypeClassifier,
    TypeRegistry, UnboundMethodBinder,
};

/// Called once a bootstrap succeeds
pub type SuccessCallback = Box<dyn FnOnce() + Send + 'static>;

/// Called with the triggering error once a bootstrap fails
pub type ErrorCallback = Box<dyn FnOnce(&StrataError) + Send + 'static>;

/// Bootstrap counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootstrapStats {
    /// Bootstraps started (coalesced requests are not counted)
    pub attempts: u64,
    /// Transitions to Ready
    pub resolutions: u64,
    /// Transitions from Loading to NotReady
    pub failures: u64,
    /// Completions ignored because the controller was no longer loading
    pub stale_completions: u64,
}

#[derive(Default)]
struct ControllerState {
    state: InitState,
    /// Bumped by every started attempt and by reset; completions carry the
    /// generation they were started under
    generation: u64,
    success_callbacks: VecDeque<SuccessCallback>,
    error_callbacks: VecDeque<ErrorCallback>,
    stats: BootstrapStats,
}

/// Everything a client owns
pub(crate) struct Context {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) functions: Arc<dyn FunctionRegistry>,
    pub(crate) classes: Vec<Arc<dyn ProxyClass>>,
    pub(crate) types: RwLock<TypeRegistry>,
    pub(crate) classifier: RwLock<TypeClassifier>,
    pub(crate) algorithms: Arc<AlgorithmsNamespace>,
    controller: Mutex<ControllerState>,
    /// Held while hooks run or the client is torn down
    resolving: Mutex<()>,
}

impl Context {
    /// Publish the registered type names to the classifier
    pub(crate) fn refresh_classifier(&self) {
        let names = self.types.read().names();
        self.classifier.write().register_classes(names);
    }

    /// Copy of a registered descriptor
    pub(crate) fn descriptor(&self, name: &str) -> Option<ProxyType> {
        self.types.read().get(name).cloned()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    functions: Arc<dyn FunctionRegistry>,
    classes: Option<Vec<Arc<dyn ProxyClass>>>,
}

impl ClientBuilder {
    /// Hand-written classes, in hook order. Defaults to [`standard_classes`].
    pub fn classes(mut self, classes: Vec<Arc<dyn ProxyClass>>) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn build(self) -> Client {
        let classes = self.classes.unwrap_or_else(standard_classes);

        let mut types = TypeRegistry::new();
        for class in &classes {
            types.register_hand_written(ProxyType::hand_written(class.kind()));
        }

        let context = Context {
            transport: self.transport,
            functions: self.functions,
            classes,
            types: RwLock::new(types),
            classifier: RwLock::new(TypeClassifier::new()),
            algorithms: Arc::new(AlgorithmsNamespace::new()),
            controller: Mutex::new(ControllerState::default()),
            resolving: Mutex::new(()),
        };
        context.refresh_classifier();

        Client {
            inner: Arc::new(context),
        }
    }
}

/// Strata client - owns the bootstrap state, type registry, and namespace
///
/// Cloning is cheap; clones share one context.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<Context>,
}

impl Client {
    pub fn builder(
        transport: Arc<dyn Transport>,
        functions: Arc<dyn FunctionRegistry>,
    ) -> ClientBuilder {
        ClientBuilder {
            transport,
            functions,
            classes: None,
        }
    }

    /// Bring the client to Ready.
    ///
    /// Without callbacks the bootstrap runs inline and its error, if any,
    /// is returned. With `on_success` it runs on the async runtime and the
    /// callbacks report the outcome; concurrent async requests share one
    /// bootstrap. `on_error` without `on_success` is a usage error.
    pub fn initialize(
        &self,
        endpoints: Option<EndpointConfig>,
        on_success: Option<SuccessCallback>,
        on_error: Option<ErrorCallback>,
    ) -> StrataResult<()> {
        let endpoints = endpoints.filter(|config| !config.is_empty());

        if endpoints.is_none() && self.ready().is_ready() {
            if let Some(callback) = on_success {
                callback();
            }
            return Ok(());
        }

        if on_success.is_none() && on_error.is_some() {
            return Err(StrataError::InvalidUsage(
                "an error callback requires a success callback".into(),
            ));
        }
        let asynchronous = on_success.is_some();

        let generation = {
            let mut controller = self.inner.controller.lock();
            if asynchronous {
                controller.success_callbacks.extend(on_success);
                controller.error_callbacks.extend(on_error);
                if controller.state.is_loading() {
                    tracing::debug!("bootstrap in flight, callbacks queued");
                    return Ok(());
                }
            }
            controller.state = InitState::Loading;
            controller.generation += 1;
            controller.stats.attempts += 1;
            controller.generation
        };

        let (api, tiles) = match &endpoints {
            Some(config) => (config.api_base_url.as_deref(), config.tile_base_url.as_deref()),
            None => (None, None),
        };
        tracing::info!(asynchronous, api = ?api, tiles = ?tiles, "bootstrap started");
        self.inner.transport.configure(api, tiles);

        if asynchronous {
            let client = self.clone();
            self.inner
                .functions
                .load_signatures_async(Box::new(move |result| match result {
                    Ok(()) => {
                        // Failures already reached the queued error callbacks.
                        let _ = client.handle_load_success(generation);
                    }
                    Err(err) => client.handle_load_failure(generation, err),
                }));
            return Ok(());
        }

        match self.inner.functions.load_signatures() {
            Ok(()) => self.handle_load_success(generation),
            Err(err) => {
                self.handle_load_failure(generation, err.clone());
                Err(err)
            }
        }
    }

    /// Initialize and wait for the outcome
    pub async fn bootstrap(&self, endpoints: Option<EndpointConfig>) -> StrataResult<()> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let on_success_tx = Arc::new(Mutex::new(Some(tx)));
        let on_error_tx = Arc::clone(&on_success_tx);

        self.initialize(
            endpoints,
            Some(Box::new(move || {
                if let Some(tx) = on_success_tx.lock().take() {
                    let _ = tx.send(Ok(()));
                }
            })),
            Some(Box::new(move |err: &StrataError| {
                if let Some(tx) = on_error_tx.lock().take() {
                    let _ = tx.send(Err(err.clone()));
                }
            })),
        )?;

        rx.await.map_err(|_| StrataError::Abandoned)?
    }

    /// Tear down to NotReady
    ///
    /// Callbacks still queued by an in-flight async attempt are released:
    /// error callbacks receive [`StrataError::Abandoned`], success callbacks
    /// are dropped.
    pub fn reset(&self) {
        let resolving = self.inner.resolving.lock();
        let abandoned = {
            let mut controller = self.inner.controller.lock();
            controller.state = InitState::NotReady;
            controller.generation += 1;
            controller.success_callbacks.clear();
            std::mem::take(&mut controller.error_callbacks)
        };

        self.inner.transport.reset();
        self.inner.functions.reset();
        for class in &self.inner.classes {
            if let Some(mut descriptor) = self.inner.descriptor(class.name()) {
                class.reset(self.inner.functions.as_ref(), &mut descriptor);
                self.inner.types.write().register_hand_written(descriptor);
            }
        }
        let removed = ClassGenerator::undo(&self.inner);
        self.inner.algorithms.clear();

        drop(resolving);
        tracing::info!(
            generated_removed = removed.len(),
            abandoned = abandoned.len(),
            "client reset"
        );

        let err = StrataError::Abandoned;
        for callback in abandoned {
            callback(&err);
        }
    }

    /// Current bootstrap state
    pub fn ready(&self) -> InitState {
        self.inner.controller.lock().state
    }

    /// Shared namespace of unbound algorithms
    pub fn algorithms(&self) -> Arc<AlgorithmsNamespace> {
        Arc::clone(&self.inner.algorithms)
    }

    /// Names of the generated classes, in generation order
    pub fn generated_classes(&self) -> Vec<String> {
        self.inner.types.read().generated_names().to_vec()
    }

    /// Descriptor of a registered type
    pub fn type_descriptor(&self, name: &str) -> Option<ProxyType> {
        self.inner.descriptor(name)
    }

    /// Is `value` an instance of the registered type `type_name`?
    pub fn is_instance(&self, value: &Value, type_name: &str) -> bool {
        self.inner.classifier.read().is_instance(value, type_name)
    }

    pub fn functions(&self) -> &Arc<dyn FunctionRegistry> {
        &self.inner.functions
    }

    pub fn stats(&self) -> BootstrapStats {
        self.inner.controller.lock().stats.clone()
    }

    /// Is `generation` still the attempt the controller is waiting on?
    fn is_current(controller: &ControllerState, generation: u64) -> bool {
        controller.state.is_loading() && controller.generation == generation
    }

    fn handle_load_success(&self, generation: u64) -> StrataResult<()> {
        // One resolution at a time; a newer attempt waits here for an older one.
        let resolving = self.inner.resolving.lock();
        if !Self::is_current(&self.inner.controller.lock(), generation) {
            drop(resolving);
            self.note_stale("success");
            return Ok(());
        }

        if let Err(err) = self.run_hooks() {
            drop(resolving);
            self.handle_load_failure(generation, err.clone());
            return Err(err);
        }

        {
            let mut controller = self.inner.controller.lock();
            if !Self::is_current(&controller, generation) {
                // Superseded while the hooks ran; the newer attempt resolves.
                drop(controller);
                drop(resolving);
                self.note_stale("success");
                return Ok(());
            }
            controller.state = InitState::Ready;
            controller.error_callbacks.clear();
            controller.stats.resolutions += 1;
        }
        drop(resolving);
        tracing::info!("bootstrap ready");

        while let Some(callback) = self.next_success_callback() {
            callback();
        }
        Ok(())
    }

    fn handle_load_failure(&self, generation: u64, err: StrataError) {
        {
            let mut controller = self.inner.controller.lock();
            if !Self::is_current(&controller, generation) {
                drop(controller);
                self.note_stale("failure");
                return;
            }
            controller.state = InitState::NotReady;
            controller.success_callbacks.clear();
            controller.stats.failures += 1;
        }
        tracing::warn!(error = %err, "bootstrap failed");

        while let Some(callback) = self.next_error_callback() {
            callback(&err);
        }
    }

    fn run_hooks(&self) -> StrataResult<()> {
        let functions = self.inner.functions.as_ref();
        for class in &self.inner.classes {
            let Some(mut descriptor) = self.inner.descriptor(class.name()) else {
                continue;
            };
            class
                .initialize(functions, &mut descriptor)
                .map_err(|e| StrataError::hook_failure(class.name(), e))?;
            self.inner.types.write().register_hand_written(descriptor);
        }

        let generated = ClassGenerator::run(&self.inner);
        tracing::debug!(count = generated.len(), names = ?generated, "classes generated");

        let bound = UnboundMethodBinder::run(functions, &self.inner.algorithms);
        tracing::debug!(count = bound, "unbound algorithms bound");
        Ok(())
    }

    fn note_stale(&self, outcome: &str) {
        self.inner.controller.lock().stats.stale_completions += 1;
        tracing::debug!(outcome, "stale bootstrap completion ignored");
    }

    // Each pop releases the lock before the callback runs.
    fn next_success_callback(&self) -> Option<SuccessCallback> {
        self.inner.controller.lock().success_callbacks.pop_front()
    }

    fn next_error_callback(&self) -> Option<ErrorCallback> {
        self.inner.controller.lock().error_callbacks.pop_front()
    }
}
