//! 事件发布（EventPublisher）协议
//!
//! 工作单元在保存时通过该接口把取出的领域事件交给进程内分发器或消息总线。
//!
use crate::{error::DomainResult as Result, persist::SerializedEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件发布器
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &SerializedEvent) -> Result<()>;

    /// 按顺序逐条发布，遇到第一个错误即停止
    async fn publish_batch(&self, events: &[SerializedEvent]) -> Result<()> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T> EventPublisher for Arc<T>
where
    T: EventPublisher + ?Sized,
{
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        (**self).publish(event).await
    }

    async fn publish_batch(&self, events: &[SerializedEvent]) -> Result<()> {
        (**self).publish_batch(events).await
    }
}
