use super::{BoxAnySend, Next, PipelineBehavior, RequestMeta};
use crate::{context::AppContext, error::AppResult};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{Instrument, info, info_span};

/// 记录请求的开始与结束
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

impl LoggingBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineBehavior for LoggingBehavior {
    fn name(&self) -> &str {
        "logging"
    }

    async fn handle(
        &self,
        ctx: &AppContext,
        meta: &RequestMeta,
        request: BoxAnySend,
        next: Next<'_>,
    ) -> AppResult<BoxAnySend> {
        let span = info_span!(
            "request",
            name = meta.name(),
            kind = %meta.kind(),
            correlation_id = ctx.correlation_id(),
            actor_id = ctx.actor_id(),
        );

        async move {
            info!("handling request");
            let started = Instant::now();
            let result = next.run(ctx, meta, request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => info!(elapsed_ms, "request handled"),
                Err(err) => info!(elapsed_ms, error = %err, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
