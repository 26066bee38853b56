//! 内存版事件总线（InMemoryEventBus）
//!
//! 基于 `tokio::sync::broadcast` 实现的轻量事件总线，满足 `EventPublisher` 协议：
//! - `publish`：克隆并广播事件；
//! - `subscribe`：返回 `'static` 生命周期事件流，便于在 `tokio::spawn` 中使用；
//! - 典型用途：测试环境、示例与本地开发。
//!
//! 注意：若无订阅者时发送将被忽略；订阅者消费过慢时会收到滞后错误。

use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::EventPublisher;
use crate::persist::SerializedEvent;
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

/// 简单的内存事件总线实现
#[derive(Clone)]
pub struct InMemoryEventBus {
    tx: broadcast::Sender<SerializedEvent>,
}

impl InMemoryEventBus {
    /// 创建一个内存总线，`capacity` 为广播缓冲区容量
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 订阅此后发布的事件
    pub fn subscribe(&self) -> BoxStream<'static, Result<SerializedEvent>> {
        let rx = self.tx.subscribe();
        let stream = BroadcastStream::new(rx)
            .map(|r| r.map_err(|e| DomainError::event_publish(e.to_string())));
        Box::pin(stream)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        // 若当前无订阅者，broadcast 的 send 会返回错误，这里视为非致命并忽略
        if self.tx.send(event.clone()).is_err() {
            trace!(event_id = event.event_id(), "no subscriber for event");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(n: usize) -> SerializedEvent {
        SerializedEvent::builder()
            .event_id(format!("evt-{n}"))
            .event_type("CounterEvent.Incremented".to_string())
            .event_version(1)
            .aggregate_id("counter-1".to_string())
            .aggregate_type("counter".to_string())
            .aggregate_version(n)
            .occurred_at(Utc::now())
            .payload(serde_json::json!({ "by": n }))
            .context(serde_json::json!({}))
            .build()
    }

    #[tokio::test]
    async fn publish_without_subscriber_is_ok() {
        let bus = InMemoryEventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(&event(1)).await.unwrap();
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_publish_order() {
        let bus = InMemoryEventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish_batch(&[event(1), event(2), event(3)])
            .await
            .unwrap();

        for stream in [&mut first, &mut second] {
            for n in 1..=3 {
                let got = stream.next().await.unwrap().unwrap();
                assert_eq!(got.event_id(), format!("evt-{n}"));
                assert_eq!(got.aggregate_version(), n);
            }
        }
    }

    #[tokio::test]
    async fn slow_subscriber_sees_lag_error() {
        let bus = InMemoryEventBus::new(2);
        let mut stream = bus.subscribe();

        for n in 1..=4 {
            bus.publish(&event(n)).await.unwrap();
        }

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(DomainError::EventPublish { .. })));
        let next = stream.next().await.unwrap().unwrap();
        assert_eq!(next.event_id(), "evt-3");
    }
}
