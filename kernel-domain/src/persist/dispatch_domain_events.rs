//! 领域事件分发拦截器
//!
//! 保存时遍历被跟踪的聚合（按跟踪顺序），取出各自的待发布事件（聚合内按产生顺序），
//! 以本次提交的版本标记后交给 `EventPublisher`。
//!
//! 不做逐条重试、不落 Outbox：第一条发布失败即以错误结束本次保存。
//!
use crate::{
    error::DomainResult as Result,
    eventing::EventPublisher,
    persist::{SaveChangesContext, SaveChangesInterceptor},
};
use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// 事件发布时机
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchTiming {
    /// 写入前发布：发布失败则不写入
    #[default]
    BeforeSave,
    /// 写入后发布：发布失败时数据已提交
    AfterSave,
}

#[derive(Builder)]
pub struct DispatchDomainEventsInterceptor {
    publisher: Arc<dyn EventPublisher>,
    #[builder(default)]
    timing: DispatchTiming,
}

impl DispatchDomainEventsInterceptor {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            publisher,
            timing: DispatchTiming::default(),
        }
    }

    pub fn timing(&self) -> DispatchTiming {
        self.timing
    }
}

#[async_trait]
impl SaveChangesInterceptor for DispatchDomainEventsInterceptor {
    fn name(&self) -> &str {
        "dispatch_domain_events"
    }

    async fn saving_changes(&self, ctx: &mut SaveChangesContext) -> Result<()> {
        let context = ctx.event_context().clone();

        // 全部序列化成功后才清空，任一失败时所有聚合保持原样
        let mut events = Vec::new();
        for entry in ctx.entries() {
            if entry.has_pending_events() {
                events.extend(entry.serialize_events(&context)?);
            }
        }
        for entry in ctx.entries_mut() {
            entry.clear_events();
        }

        if events.is_empty() {
            return Ok(());
        }

        match self.timing {
            DispatchTiming::BeforeSave => {
                debug!(count = events.len(), "publishing domain events before save");
                self.publisher.publish_batch(&events).await
            }
            DispatchTiming::AfterSave => {
                ctx.defer_events(events);
                Ok(())
            }
        }
    }

    async fn saved_changes(&self, ctx: &mut SaveChangesContext) -> Result<()> {
        if self.timing != DispatchTiming::AfterSave {
            return Ok(());
        }

        let events = ctx.take_pending_events();
        if events.is_empty() {
            return Ok(());
        }

        debug!(
            count = events.len(),
            rows = ctx.affected_rows(),
            "publishing domain events after save"
        );
        self.publisher.publish_batch(&events).await
    }
}
