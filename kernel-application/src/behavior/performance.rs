use super::{BoxAnySend, Next, PipelineBehavior, RequestMeta};
use crate::{config::PerformanceConfig, context::AppContext, error::AppResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// 耗时超过阈值的请求记为慢请求
#[derive(Debug, Default)]
pub struct PerformanceBehavior {
    config: PerformanceConfig,
    slow_requests: AtomicU64,
}

impl PerformanceBehavior {
    pub fn new(config: PerformanceConfig) -> Self {
        Self {
            config,
            slow_requests: AtomicU64::new(0),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.config.threshold()
    }

    /// 已记录的慢请求数
    pub fn slow_requests(&self) -> u64 {
        self.slow_requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PipelineBehavior for PerformanceBehavior {
    fn name(&self) -> &str {
        "performance"
    }

    async fn handle(
        &self,
        ctx: &AppContext,
        meta: &RequestMeta,
        request: BoxAnySend,
        next: Next<'_>,
    ) -> AppResult<BoxAnySend> {
        let started = Instant::now();
        let result = next.run(ctx, meta, request).await;
        let elapsed = started.elapsed();

        if elapsed > self.threshold() {
            self.slow_requests.fetch_add(1, Ordering::Relaxed);
            warn!(
                name = meta.name(),
                kind = %meta.kind(),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.config.threshold_ms,
                correlation_id = ctx.correlation_id(),
                "long running request"
            );
        }
        result
    }
}
