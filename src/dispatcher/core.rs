//! Dispatcher core module - the request pipeline.

use crate::binder::{BindingError, BoundRequest, RawRequest, RequestBinder};
use crate::ids::RequestId;
use crate::response::{encode_response, EncodeError, EncodedResponse, Response, ResponseSink};
use crate::router::RouteMatcher;
use crate::runtime_config::RuntimeConfig;
use crate::schema::RequestSchema;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

/// Endpoint business logic.
///
/// Receives the matched route and the bound request and returns the response
/// to encode. Errors are not interpreted by the dispatcher; they come back
/// unchanged as [`DispatchError::Handler`].
pub trait Handler<R>: Send + Sync {
    /// Type a JSON body is decoded into
    type Body: DeserializeOwned;
    /// Response body type
    type Output: Serialize;

    fn handle(
        &self,
        route: R,
        request: BoundRequest<Self::Body>,
    ) -> anyhow::Result<Response<Self::Output>>;
}

/// [`Handler`] backed by a closure; see [`handler_fn`].
pub struct HandlerFn<F, B, O> {
    f: F,
    _types: PhantomData<fn() -> (B, O)>,
}

/// Wrap a closure or function as a [`Handler`].
///
/// ```rust
/// use brrtbind::binder::BoundRequest;
/// use brrtbind::dispatcher::handler_fn;
/// use brrtbind::response::Response;
/// use brrtbind::router::PathParams;
///
/// let handler = handler_fn(|route: PathParams, _req: BoundRequest<()>| {
///     Ok(Response::ok(format!("user {}", route.get("id").unwrap_or("?"))))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<R, B, O, F>(f: F) -> HandlerFn<F, B, O>
where
    F: Fn(R, BoundRequest<B>) -> anyhow::Result<Response<O>> + Send + Sync,
{
    HandlerFn {
        f,
        _types: PhantomData,
    }
}

impl<R, B, O, F> Handler<R> for HandlerFn<F, B, O>
where
    F: Fn(R, BoundRequest<B>) -> anyhow::Result<Response<O>> + Send + Sync,
    B: DeserializeOwned,
    O: Serialize,
{
    type Body = B;
    type Output = O;

    fn handle(&self, route: R, request: BoundRequest<B>) -> anyhow::Result<Response<O>> {
        (self.f)(route, request)
    }
}

/// How a dispatched request ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No route matched; a 404 was written
    NotFound,
    /// Binding failed; a 400 (or 413) diagnostic was written
    Invalid(BindingError),
    /// The handler's response was written
    Responded { status: u16 },
    /// The client went away before the response could be written
    Aborted,
}

/// Failures the dispatcher does not turn into a response itself.
#[derive(Debug)]
pub enum DispatchError {
    /// The handler failed; propagated unchanged
    Handler(anyhow::Error),
    /// The handler's response could not be encoded; nothing was written
    Encode(EncodeError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Handler(e) => write!(f, "handler failed: {e}"),
            DispatchError::Encode(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Handler(e) => Some(&**e),
            DispatchError::Encode(e) => Some(e),
        }
    }
}

/// Per-request settings shared by every stage that writes to the sink.
struct DispatchContext<'a> {
    request_id: RequestId,
    echo_header: Option<&'a str>,
}

impl DispatchContext<'_> {
    /// Write `encoded` unless the client has gone away. Returns `false` when aborted.
    fn write(&self, mut encoded: EncodedResponse, sink: &mut dyn ResponseSink) -> bool {
        if sink.is_closed() {
            warn!(
                request_id = %self.request_id,
                status = encoded.status,
                "Client disconnected, dropping response"
            );
            return false;
        }
        if let Some(header) = self.echo_header {
            if encoded.get_header(header).is_none() {
                encoded.set_header(header, self.request_id.to_string());
            }
        }
        encoded.write_to(sink);
        true
    }

    fn not_found(&self, raw: &RawRequest, sink: &mut dyn ResponseSink) -> DispatchOutcome {
        warn!(method = %raw.method, path = %raw.path, "No route matched");
        if self.write(EncodedResponse::plain_text(404, "Not Found"), sink) {
            DispatchOutcome::NotFound
        } else {
            DispatchOutcome::Aborted
        }
    }
}

/// Type-erased endpoint as stored by the [`Dispatcher`].
pub trait EndpointService: Send + Sync {
    fn name(&self) -> &str;

    /// Method filter; `None` serves every method.
    fn method(&self) -> Option<&Method>;

    /// Human-readable route description for listings.
    fn route_description(&self) -> String;

    /// Run the pipeline if this endpoint serves `raw`; `None` if it does not.
    fn serve(
        &self,
        raw: &RawRequest,
        sink: &mut dyn ResponseSink,
        request_id: RequestId,
        echo_header: Option<&str>,
    ) -> Option<Result<DispatchOutcome, DispatchError>>;

    /// Adopt dispatcher-wide settings at registration time.
    fn apply_config(&mut self, _config: &RuntimeConfig) {}
}

/// One route matcher, one schema, one handler.
pub struct Endpoint<M, H> {
    name: String,
    method: Option<Method>,
    matcher: M,
    schema: Arc<RequestSchema>,
    handler: H,
    binder: Option<RequestBinder>,
}

impl<M, H> Endpoint<M, H>
where
    M: RouteMatcher,
    H: Handler<M::Route>,
{
    pub fn new(
        name: impl Into<String>,
        matcher: M,
        schema: impl Into<Arc<RequestSchema>>,
        handler: H,
    ) -> Self {
        Self {
            name: name.into(),
            method: None,
            matcher,
            schema: schema.into(),
            handler,
            binder: None,
        }
    }

    /// Only serve requests with this method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Bind with `binder` instead of one derived from the dispatcher's
    /// [`RuntimeConfig`].
    #[must_use]
    pub fn with_binder(mut self, binder: RequestBinder) -> Self {
        self.binder = Some(binder);
        self
    }

    #[must_use]
    pub fn schema(&self) -> &RequestSchema {
        &self.schema
    }

    #[must_use]
    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Run the full pipeline for a single endpoint, answering 404 when the
    /// route does not match.
    pub fn dispatch(
        &self,
        raw: &RawRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<DispatchOutcome, DispatchError> {
        let ctx = DispatchContext {
            request_id: RequestId::new(),
            echo_header: None,
        };
        let span = info_span!("request", request_id = %ctx.request_id, method = %raw.method, path = %raw.path);
        let _enter = span.enter();
        match self.try_serve(raw, sink, &ctx) {
            Some(result) => result,
            None => Ok(ctx.not_found(raw, sink)),
        }
    }

    fn try_serve(
        &self,
        raw: &RawRequest,
        sink: &mut dyn ResponseSink,
        ctx: &DispatchContext<'_>,
    ) -> Option<Result<DispatchOutcome, DispatchError>> {
        if self.method.as_ref().is_some_and(|m| *m != raw.method) {
            return None;
        }
        let route = self.matcher.parse(&raw.path).ok()?;
        info!(endpoint = %self.name, method = %raw.method, path = %raw.path, "Route matched");
        Some(self.run(route, raw, sink, ctx))
    }

    fn run(
        &self,
        route: M::Route,
        raw: &RawRequest,
        sink: &mut dyn ResponseSink,
        ctx: &DispatchContext<'_>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let binder = self.binder.unwrap_or_default();
        let bound = match binder.bind::<H::Body>(&self.schema, raw) {
            Ok(bound) => bound,
            Err(err) => {
                let encoded = EncodedResponse::json(err.status(), &err.to_json());
                return Ok(if ctx.write(encoded, sink) {
                    DispatchOutcome::Invalid(err)
                } else {
                    DispatchOutcome::Aborted
                });
            }
        };

        let start = Instant::now();
        let response = self.handler.handle(route, bound).map_err(|e| {
            error!(endpoint = %self.name, error = %e, "Handler failed");
            DispatchError::Handler(e)
        })?;
        debug!(
            endpoint = %self.name,
            status = response.status,
            latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "Handler completed"
        );

        // Encoding only starts once the client is known to still be there.
        if sink.is_closed() {
            warn!(endpoint = %self.name, "Client disconnected before response was encoded");
            return Ok(DispatchOutcome::Aborted);
        }
        let encoded = encode_response(response).map_err(|e| {
            error!(endpoint = %self.name, error = %e, "Response encoding failed");
            DispatchError::Encode(e)
        })?;
        let status = encoded.status;
        Ok(if ctx.write(encoded, sink) {
            DispatchOutcome::Responded { status }
        } else {
            DispatchOutcome::Aborted
        })
    }
}

impl<M, H> EndpointService for Endpoint<M, H>
where
    M: RouteMatcher,
    H: Handler<M::Route>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    fn route_description(&self) -> String {
        let method = self
            .method
            .as_ref()
            .map(Method::as_str)
            .unwrap_or("*");
        format!("{method} {}", self.matcher.describe())
    }

    fn serve(
        &self,
        raw: &RawRequest,
        sink: &mut dyn ResponseSink,
        request_id: RequestId,
        echo_header: Option<&str>,
    ) -> Option<Result<DispatchOutcome, DispatchError>> {
        let ctx = DispatchContext {
            request_id,
            echo_header,
        };
        self.try_serve(raw, sink, &ctx)
    }

    fn apply_config(&mut self, config: &RuntimeConfig) {
        self.binder.get_or_insert_with(|| RequestBinder::from_config(config));
    }
}

/// Ordered collection of endpoints sharing one request pipeline.
///
/// Endpoints are tried in registration order; the first whose method filter
/// and route matcher accept the request handles it. Holds no per-request
/// state, so one dispatcher can serve concurrent requests through `&self`.
#[derive(Clone, Default)]
pub struct Dispatcher {
    endpoints: Vec<Arc<dyn EndpointService>>,
    config: RuntimeConfig,
}

impl Dispatcher {
    /// Create an empty dispatcher with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            endpoints: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Register an endpoint.
    ///
    /// An endpoint with the same name is replaced in place, keeping its
    /// position in the match order. Endpoints without an explicit binder
    /// take the body size limit from the dispatcher's [`RuntimeConfig`].
    pub fn register<E: EndpointService + 'static>(&mut self, mut endpoint: E) {
        endpoint.apply_config(&self.config);
        let endpoint: Arc<dyn EndpointService> = Arc::new(endpoint);
        let name = endpoint.name().to_string();

        if let Some(slot) = self.endpoints.iter_mut().find(|e| e.name() == name) {
            *slot = endpoint;
            warn!(
                endpoint = %name,
                total_endpoints = self.endpoints.len(),
                "Replaced existing endpoint"
            );
            return;
        }

        self.endpoints.push(endpoint);
        info!(
            endpoint = %name,
            total_endpoints = self.endpoints.len(),
            "Endpoint registered successfully"
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Registered endpoints in match order.
    pub fn endpoints(&self) -> impl Iterator<Item = &dyn EndpointService> {
        self.endpoints.iter().map(|e| e.as_ref())
    }

    /// Route, bind, handle and encode one request.
    pub fn dispatch(
        &self,
        raw: &RawRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<DispatchOutcome, DispatchError> {
        let ctx = DispatchContext {
            request_id: RequestId::from_request(raw, &self.config.request_id_header),
            echo_header: self
                .config
                .echo_request_id
                .then_some(self.config.request_id_header.as_str()),
        };
        let span = info_span!("request", request_id = %ctx.request_id, method = %raw.method, path = %raw.path);
        let _enter = span.enter();

        for endpoint in &self.endpoints {
            if let Some(result) = endpoint.serve(raw, sink, ctx.request_id, ctx.echo_header) {
                return result;
            }
        }
        Ok(ctx.not_found(raw, sink))
    }
}
