use super::{BoxAnySend, Next, PipelineBehavior, RequestMeta};
use crate::{context::AppContext, error::AppResult};
use async_trait::async_trait;
use tracing::error;

/// 以 error 级别记录失败的请求，错误原样返回
#[derive(Debug, Clone, Copy, Default)]
pub struct UnhandledErrorBehavior;

impl UnhandledErrorBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineBehavior for UnhandledErrorBehavior {
    fn name(&self) -> &str {
        "unhandled_error"
    }

    async fn handle(
        &self,
        ctx: &AppContext,
        meta: &RequestMeta,
        request: BoxAnySend,
        next: Next<'_>,
    ) -> AppResult<BoxAnySend> {
        next.run(ctx, meta, request).await.inspect_err(|err| {
            error!(
                name = meta.name(),
                kind = %meta.kind(),
                correlation_id = ctx.correlation_id(),
                error = %err,
                "request failed"
            );
        })
    }
}
