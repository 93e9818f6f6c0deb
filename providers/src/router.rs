//! Direct-then-proxy reply routing.
//!
//! 1. With a client key configured, call Gemini directly, once.
//! 2. On any failure, call the proxy once.
//! 3. If that fails too, answer with the degraded reply of the last failure.

use std::future::Future;

use tracing::Instrument;
use uuid::Uuid;

use vibe_types::{Reply, ReplyRequest, ReplyService};

use crate::failure::ReplyFailure;
use crate::gemini::GeminiClient;
use crate::proxy::ProxyClient;

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Proxy,
}

impl Route {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Route::Direct => "direct",
            Route::Proxy => "proxy",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplyRouter {
    direct: Option<GeminiClient>,
    proxy: Option<ProxyClient>,
}

impl ReplyRouter {
    #[must_use]
    pub fn new(direct: Option<GeminiClient>, proxy: Option<ProxyClient>) -> Self {
        Self { direct, proxy }
    }

    #[must_use]
    pub fn has_direct(&self) -> bool {
        self.direct.is_some()
    }

    #[must_use]
    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Try each configured route in order; report the last failure.
    pub async fn route(&self, request: &ReplyRequest) -> Result<(Route, Reply), ReplyFailure> {
        let mut last_failure = ReplyFailure::NotConfigured;

        if let Some(direct) = &self.direct {
            match direct.generate(request).await {
                Ok(reply) => return Ok((Route::Direct, reply)),
                Err(failure) => {
                    tracing::warn!(
                        kind = failure.kind(),
                        error = %failure,
                        "Direct Gemini call failed, falling back to proxy"
                    );
                    last_failure = failure;
                }
            }
        }

        if let Some(proxy) = &self.proxy {
            return match proxy.generate(request).await {
                Ok(reply) => Ok((Route::Proxy, reply)),
                Err(failure) => {
                    tracing::error!(kind = failure.kind(), error = %failure, "Proxy call failed");
                    Err(failure)
                }
            };
        }

        Err(last_failure)
    }
}

impl ReplyService for ReplyRouter {
    fn get_reply(&self, request: &ReplyRequest) -> impl Future<Output = Reply> + Send {
        let span = tracing::info_span!("reply", request_id = %Uuid::new_v4());
        async move {
            match self.route(request).await {
                Ok((route, reply)) => {
                    tracing::info!(
                        route = route.as_str(),
                        score = reply.feedback.score.wire_value(),
                        "Reply received"
                    );
                    reply
                }
                Err(failure) => failure.degraded_reply(),
            }
        }
        .instrument(span)
    }
}
