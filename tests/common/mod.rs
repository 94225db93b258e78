#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo, middleware, routing::get};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use tracked_redirect::api::handlers::{health_handler, redirect_handler};
use tracked_redirect::api::middleware::message_context;
use tracked_redirect::application::services::{
    OpenEventRegistrar, RedirectResolver, RedirectService,
};
use tracked_redirect::domain::duplicate_window::DuplicateWindowPolicy;
use tracked_redirect::domain::entities::{
    ContactIdentifier, EmailOpenMessage, MessageItem, RegistrationResult,
};
use tracked_redirect::domain::repositories::{EmailEventStorage, MessageRepository, StoreError};
use tracked_redirect::error::AppError;
use tracked_redirect::infrastructure::event_store::InMemoryEventStorage;
use tracked_redirect::infrastructure::redirect_steps::{ForwardQueryStep, ParseTargetStep};
use tracked_redirect::infrastructure::robots::UserAgentRobotFilter;
use tracked_redirect::infrastructure::telemetry::QueueTelemetrySink;
use tracked_redirect::infrastructure::tracking::CookieTrackerProvider;
use tracked_redirect::state::{AppState, TrackingSettings};
use uuid::Uuid;

pub const NOT_FOUND_URL: &str = "/not-found";

/// Message repository backed by a map.
pub struct InMemoryMessageRepository {
    messages: Mutex<HashMap<Uuid, MessageItem>>,
    healthy: bool,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            healthy: true,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            healthy: false,
        }
    }

    pub fn insert(&self, item: MessageItem) {
        self.messages.lock().unwrap().insert(item.id, item);
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageItem>, AppError> {
        Ok(self.messages.lock().unwrap().get(&id).cloned())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

/// Event store that is always down.
pub struct FailingEventStorage;

#[async_trait]
impl EmailEventStorage for FailingEventStorage {
    async fn register_email_opened(
        &self,
        _message_id: Uuid,
        _instance_id: Uuid,
        _contact: &ContactIdentifier,
        _duplicate_window: Duration,
    ) -> Result<RegistrationResult, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Options for [`create_test_state`].
pub struct TestOptions {
    pub enabled: bool,
    pub window: DuplicateWindowPolicy,
    pub storage: Arc<dyn EmailEventStorage>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub trackers: Arc<CookieTrackerProvider>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            window: DuplicateWindowPolicy::default(),
            storage: Arc::new(InMemoryEventStorage::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
            trackers: Arc::new(CookieTrackerProvider::new("exm_analytics")),
        }
    }
}

pub fn create_test_state(options: TestOptions) -> (AppState, mpsc::Receiver<EmailOpenMessage>) {
    let (open_tx, open_rx) = mpsc::channel(1000);
    let open_sink = QueueTelemetrySink::new(open_tx);

    let registrar = OpenEventRegistrar::new(
        options.storage.clone(),
        Arc::new(open_sink.clone()),
        options.window,
    );

    let resolver = RedirectResolver::default()
        .with_step(Arc::new(ParseTargetStep))
        .with_step(Arc::new(ForwardQueryStep::new(["utm_"])));

    let redirect_service = RedirectService::new(
        registrar,
        resolver,
        Arc::new(UserAgentRobotFilter::with_defaults().unwrap()),
        NOT_FOUND_URL.to_string(),
    );

    let state = AppState {
        redirect_service: Arc::new(redirect_service),
        message_repository: options.messages,
        event_storage: options.storage,
        tracker_provider: options.trackers,
        open_sink,
        settings: Arc::new(TrackingSettings {
            enabled: options.enabled,
            ..TrackingSettings::default()
        }),
    };

    (state, open_rx)
}

/// Router with the same route layout as the service, plus a fixed peer address.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/redirect", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            message_context::layer,
        ))
        .route("/health", get(health_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state)
}

pub fn create_test_message(messages: &InMemoryMessageRepository) -> Uuid {
    let id = Uuid::new_v4();
    messages.insert(MessageItem::new(
        id,
        "Spring newsletter".to_string(),
        "en".to_string(),
    ));
    id
}

/// Collects everything queued so far.
pub fn drain(rx: &mut mpsc::Receiver<EmailOpenMessage>) -> Vec<EmailOpenMessage> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
