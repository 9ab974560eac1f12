//! Read-only tower middleware exposing a verified Django session to handlers.

use std::{
    future::Future,
    ops::Deref,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::{CookieManager, Cookies};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    clock::{Clock, SystemClock},
    config::DjangoSessionConfig,
    decoder::SessionDecoder,
    signing::Secret,
    value::Session,
};

/// Decoded session data, inserted into the request extensions when the cookie verifies.
///
/// Requests without a cookie, or with one that fails verification, carry no `DjangoSession`.
#[derive(Debug, Clone, PartialEq)]
pub struct DjangoSession(Session);

impl DjangoSession {
    pub fn into_inner(self) -> Session {
        self.0
    }
}

impl Deref for DjangoSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct DjangoSessionLayer<K: Clock = SystemClock> {
    decoder: SessionDecoder<K>,
}

impl DjangoSessionLayer<SystemClock> {
    #[must_use]
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self {
            decoder: SessionDecoder::new(secret),
        }
    }
}

impl<K: Clock> DjangoSessionLayer<K> {
    #[must_use]
    pub fn with_config(mut self, config: DjangoSessionConfig) -> Self {
        self.decoder = self.decoder.with_config(config);
        self
    }

    #[must_use]
    pub fn with_fallback_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Secret>,
    {
        self.decoder = self.decoder.with_fallback_secrets(secrets);
        self
    }

    #[must_use]
    pub fn with_clock<K2: Clock>(self, clock: K2) -> DjangoSessionLayer<K2> {
        DjangoSessionLayer {
            decoder: self.decoder.with_clock(clock),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DjangoSessionManager<S, K: Clock> {
    inner: S,
    decoder: Arc<SessionDecoder<K>>,
}

impl<S, K: Clock> Layer<S> for DjangoSessionLayer<K> {
    type Service = CookieManager<DjangoSessionManager<S, K>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(DjangoSessionManager {
            inner,
            decoder: Arc::new(self.decoder.clone()),
        })
    }
}

impl<ReqBody, ResBody, S, K> Service<Request<ReqBody>> for DjangoSessionManager<S, K>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
    K: Clock,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let decoder = Arc::clone(&self.decoder);

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(cookies) = req.extensions().get::<Cookies>().cloned() else {
                let mut res = Response::default();
                *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                return Ok(res);
            };

            if let Some(cookie) = cookies.get(decoder.config().name()) {
                match decoder.decode(cookie.value()) {
                    Ok(session) => {
                        tracing::debug!(keys = session.len(), "django session decoded");
                        req.extensions_mut().insert(DjangoSession(session));
                    }
                    Err(err) => {
                        tracing::warn!(err = %err, "django session decode failed");
                    }
                }
            }

            inner.call(req).await
        })
    }
}
