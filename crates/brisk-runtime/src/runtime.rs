//! Runtime
//!
//! A [`Runtime`] owns the document and everything the markers share: the
//! marker registry, the identifier index, per-element state, listeners,
//! timers and the request dispatcher. Handlers, listeners and request
//! continuations all receive `&mut Runtime`; there is no global state.

use crate::events::ListenerMap;
use crate::index::IdentifierIndex;
use crate::registry::{Handler, MarkerRegistry};
use crate::scheduler::{Scheduler, Task, TimerId, WatchKind};
use crate::scope::RuntimeScope;
use crate::state::{ElementState, StateTable};
use crate::watch::MutationWatch;
use crate::{cogs, markers, BindError, MarkerNames, RuntimeConfig};
use brisk_config::{FuncRef, Options, Value};
use brisk_dom::{Document, Event, EventType, NodeId};
use brisk_net::{
    Completion, DispatchGate, Dispatcher, HttpTransport, Method, Negotiation, NetError, Request,
    Response, Ticket, Transport, TransportConfig, Url,
};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Host function callable from configuration text
pub type Delegate = Rc<dyn Fn(&mut Runtime, &[Value]) -> anyhow::Result<Value>>;

type Continuation = Box<dyn FnOnce(&mut Runtime, Result<Response, NetError>)>;

/// Something hosts may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Click on an anchor with an href; `url` is set when the href is absolute
    AnchorClick {
        element: NodeId,
        href: String,
        url: Option<Url>,
    },
    /// An ajax marker's request finished
    AjaxEnd { element: NodeId, url: String },
    /// A marker handler failed and its attribute now holds `message`
    HandlerFailed {
        element: NodeId,
        marker: String,
        message: String,
    },
}

/// Builder for [`Runtime`]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            transport: None,
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `transport` instead of the default HTTP client
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Install the debug, phone-mask and text-input markers
    pub fn cogs(mut self, enabled: bool) -> Self {
        self.config.cogs = enabled;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn build(self, document: Document) -> Result<Runtime, BindError> {
        let RuntimeBuilder { config, transport } = self;
        let config = RuntimeConfig {
            markers: config.markers.normalized(),
            ..config
        };

        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(TransportConfig::default())?),
        };
        let base_url = match config.base_url.as_deref() {
            Some(text) => Some(
                Url::parse(text).map_err(|e| NetError::InvalidUrl(format!("{text}: {e}")))?,
            ),
            None => None,
        };

        let markers = &config.markers;
        let registry = MarkerRegistry::new(&markers.id, &markers.call, &markers.debug);
        let dispatcher = Dispatcher::new(transport, DispatchGate::new(config.max_in_flight));

        let mut rt = Runtime {
            document,
            registry,
            ids: IdentifierIndex::new(),
            states: StateTable::default(),
            delegates: HashMap::new(),
            listeners: ListenerMap::default(),
            scheduler: Scheduler::new(),
            watch: MutationWatch::new(config.mutation_debounce_ms),
            dispatcher,
            pending: HashMap::new(),
            notices: Vec::new(),
            diagnostics: Vec::new(),
            debug: config.debug,
            binding: false,
            started: false,
            base_url,
            now: 0,
            config,
        };

        markers::install(&mut rt)?;
        if rt.config.cogs {
            cogs::install(&mut rt)?;
        }
        tracing::debug!("brisk runtime {} ready: {:?}", crate::VERSION, rt.registry);
        Ok(rt)
    }
}

/// Behavior-binding runtime over one document
pub struct Runtime {
    pub(crate) document: Document,
    pub(crate) config: RuntimeConfig,
    pub(crate) registry: MarkerRegistry,
    pub(crate) ids: IdentifierIndex,
    pub(crate) states: StateTable,
    delegates: HashMap<String, Delegate>,
    pub(crate) listeners: ListenerMap,
    pub(crate) scheduler: Scheduler,
    pub(crate) watch: MutationWatch,
    dispatcher: Dispatcher,
    pending: HashMap<Ticket, Continuation>,
    notices: Vec<Notice>,
    diagnostics: Vec<String>,
    pub(crate) debug: bool,
    /// A bind pass is running
    pub(crate) binding: bool,
    started: bool,
    base_url: Option<Url>,
    /// Milliseconds since creation on the runtime's own clock
    now: u64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("registry", &self.registry)
            .field("ids", &self.ids)
            .field("states", &self.states.len())
            .field("timers", &self.scheduler.len())
            .field("dispatcher", &self.dispatcher)
            .field("now", &self.now)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Runtime with default configuration and the HTTP transport
    pub fn new(document: Document) -> Result<Self, BindError> {
        RuntimeBuilder::new().build(document)
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Marker attribute names in use
    pub fn markers(&self) -> &MarkerNames {
        &self.config.markers
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Current time on the runtime clock
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Non-fatal problems reported so far
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub(crate) fn report(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Element assigned `name` with the identifier marker
    pub fn element_by_id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name.trim())
    }

    pub fn identifiers(&self) -> &IdentifierIndex {
        &self.ids
    }

    pub fn state(&self, element: NodeId) -> Option<&ElementState> {
        self.states.get(element)
    }

    pub(crate) fn state_mut(&mut self, element: NodeId) -> &mut ElementState {
        self.states.entry(element)
    }

    /// Set the processed flag `key` on `element`; true only the first time
    pub fn first_time(&mut self, element: NodeId, key: &str) -> bool {
        self.states.entry(element).mark(key)
    }

    /// Run `hook` before a down-rebind discards `element`'s state
    pub fn on_teardown<F>(&mut self, element: NodeId, hook: F)
    where
        F: FnOnce(&mut Runtime, NodeId) + 'static,
    {
        self.states.entry(element).teardown.push(Box::new(hook));
    }

    /// Add an event listener on `element`
    pub fn listen<F>(&mut self, element: NodeId, event_type: EventType, listener: F)
    where
        F: Fn(&mut Runtime, &mut Event) -> Result<(), BindError> + 'static,
    {
        self.listeners.add(element, event_type, Rc::new(listener));
    }

    // ------------------------------------------------------------------
    // Markers and delegates
    // ------------------------------------------------------------------

    /// Register a marker handler; existing registrations are never replaced
    pub fn register_marker<H: Handler + 'static>(&mut self, name: &str, handler: H) -> Result<(), BindError> {
        self.registry.register(name, Rc::new(handler))
    }

    /// Register a marker handler written as a function of the element
    pub fn register_marker_fn<F>(&mut self, name: &str, handler: F) -> Result<(), BindError>
    where
        F: Fn(&mut Runtime, NodeId) -> Result<(), BindError> + 'static,
    {
        self.register_marker(name, handler)
    }

    pub fn unregister_marker(&mut self, name: &str) -> Result<(), BindError> {
        self.registry.unregister(name)
    }

    /// Make `f` callable by name from configuration text
    pub fn register_delegate<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&mut Runtime, &[Value]) -> anyhow::Result<Value> + 'static,
    {
        self.delegates.insert(name.to_string(), Rc::new(f));
    }

    pub fn has_delegate(&self, name: &str) -> bool {
        self.delegates.contains_key(name)
    }

    /// Invoke a registered delegate
    pub fn call_delegate(&mut self, name: &str, args: &[Value]) -> Result<Value, BindError> {
        let delegate = self
            .delegates
            .get(name)
            .cloned()
            .ok_or_else(|| BindError::UnknownDelegate(name.to_string()))?;
        delegate(self, args).map_err(|err| BindError::Delegate {
            name: name.to_string(),
            message: format!("{err:#}"),
        })
    }

    pub fn call_func(&mut self, func: &FuncRef, args: &[Value]) -> Result<Value, BindError> {
        self.call_delegate(func.name(), args)
    }

    pub(crate) fn scope(&mut self, element: NodeId, marker: &str) -> RuntimeScope<'_> {
        RuntimeScope::new(self, element, marker)
    }

    /// Parse the `marker` attribute of `element` into options
    pub fn parse_options(&mut self, element: NodeId, marker: &str) -> Result<Options, BindError> {
        let text = self
            .document
            .get_attribute(element, marker)
            .unwrap_or_default()
            .to_string();
        let parsed = brisk_config::parse(&text, &mut self.scope(element, marker))?;
        if !text.trim().is_empty() && parsed.is_empty() {
            return Err(BindError::Unparsed);
        }
        Ok(parsed.into_options())
    }

    // ------------------------------------------------------------------
    // Network
    // ------------------------------------------------------------------

    /// Send `request`; `then` runs on this thread once it completes
    pub fn submit<F>(&mut self, request: Request, then: F) -> Ticket
    where
        F: FnOnce(&mut Runtime, Result<Response, NetError>) + 'static,
    {
        let request = self.resolve(request);
        let ticket = self.dispatcher.submit(request);
        self.pending.insert(ticket, Box::new(then));
        ticket
    }

    /// Send `data` as JSON (or as query parameters for GET)
    pub fn ajax<F>(
        &mut self,
        method: Method,
        url: &str,
        data: Option<serde_json::Value>,
        then: F,
    ) -> Result<Ticket, BindError>
    where
        F: FnOnce(&mut Runtime, Result<Response, NetError>) + 'static,
    {
        let payload = data.unwrap_or(serde_json::Value::Null);
        let request = Request::new(method, url).with_payload(&payload, &Negotiation::default(), None)?;
        Ok(self.submit(request, then))
    }

    /// Requests submitted whose continuation has not run yet
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub fn gate(&self) -> &DispatchGate {
        self.dispatcher.gate()
    }

    fn resolve(&self, mut request: Request) -> Request {
        if let Some(base) = &self.base_url {
            match base.join(&request.url) {
                Ok(url) => request.url = url.into(),
                Err(err) => tracing::warn!("cannot resolve {} against {}: {}", request.url, base, err),
            }
        }
        request
    }

    fn complete(&mut self, completion: Completion) {
        match self.pending.remove(&completion.ticket) {
            Some(then) => then(self, completion.result),
            None => tracing::debug!("completion for unknown {:?}", completion.ticket),
        }
    }

    // ------------------------------------------------------------------
    // Timers and the event loop
    // ------------------------------------------------------------------

    /// Run `f` once after `delay_ms`
    pub fn set_timeout<F>(&mut self, delay_ms: u64, f: F) -> TimerId
    where
        F: Fn(&mut Runtime) + 'static,
    {
        self.schedule(Task::Callback(Rc::new(f)), delay_ms)
    }

    /// Run `f` every `period_ms`
    pub fn set_interval<F>(&mut self, period_ms: u64, f: F) -> TimerId
    where
        F: Fn(&mut Runtime) + 'static,
    {
        self.scheduler
            .set_interval(Task::Callback(Rc::new(f)), period_ms, self.now)
    }

    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        self.scheduler.clear(id)
    }

    pub(crate) fn schedule(&mut self, task: Task, delay_ms: u64) -> TimerId {
        self.scheduler.set_timeout(task, delay_ms, self.now)
    }

    pub(crate) fn schedule_every(&mut self, task: Task, period_ms: u64) -> TimerId {
        self.scheduler.set_interval(task, period_ms, self.now)
    }

    /// Document ready: bind the body and start watching it for mutations
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        let body = self.document.body();
        let root = if body.is_valid() { body } else { NodeId::ROOT };
        self.bind(root, false);
        // The first pass covered everything recorded so far
        self.document.take_records();
        self.watch.watch(root);
        self.started = true;
        tracing::debug!("watching {} for mutations", root);
    }

    /// Run finished requests, due timers and pending mutation re-scans;
    /// returns how many units of work ran
    pub fn tick(&mut self) -> usize {
        let mut ran = 0;
        while let Some(completion) = self.dispatcher.try_next() {
            self.complete(completion);
            ran += 1;
        }
        self.flush_mutations();
        while let Some((_, task)) = self.scheduler.pop_due(self.now) {
            self.run_task(task);
            self.flush_mutations();
            ran += 1;
        }
        ran
    }

    /// Move the clock forward, firing timers in due order
    pub fn advance(&mut self, ms: u64) {
        let target = self.now + ms;
        loop {
            self.tick();
            match self.scheduler.next_due() {
                Some(due) if due <= target => self.now = due.max(self.now),
                _ => break,
            }
        }
        self.now = target;
        self.tick();
    }

    /// Wait for every outstanding request and run its continuation
    pub async fn settle(&mut self) {
        self.tick();
        while let Some(completion) = self.dispatcher.next().await {
            self.complete(completion);
            self.tick();
        }
    }

    fn flush_mutations(&mut self) {
        if !self.started {
            return;
        }
        let records = self.document.take_records();
        if records.is_empty() {
            return;
        }
        let now = self.now;
        let relevant = self.watch.observe(&self.document, records, &mut self.scheduler, now);
        if relevant > 0 {
            tracing::debug!("{} mutations, re-scan scheduled", relevant);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Bind { roots, down } => {
                for root in roots {
                    self.bind(root, down);
                }
            }
            Task::Watch(WatchKind::Insert) => {
                for target in self.watch.take_inserts(&self.document) {
                    self.bind(target, false);
                }
            }
            Task::Watch(WatchKind::Remove) => {
                let removed = self.watch.take_removed();
                self.teardown(&removed);
                let root = self.watch.root().unwrap_or(NodeId::ROOT);
                self.bind(root, true);
            }
            Task::LoadView(element) => markers::view::load(self, element),
            Task::Callback(f) => f(self),
        }
    }
}
