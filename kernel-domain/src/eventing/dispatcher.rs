//! 进程内事件分发器（InProcessEventDispatcher）
//!
//! 按事件类型把事件同步分发给已注册的处理器：
//! 先调用订阅该类型的处理器，再调用订阅全部事件的处理器，组内保持注册顺序。
//! 任一处理器失败即返回 `DomainError::EventHandler`，后续处理器不再执行。
//!
use super::{EventHandler, EventPublisher, HandledEventType};
use crate::error::{DomainError, DomainResult as Result};
use crate::persist::SerializedEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Default)]
struct HandlerRegistry {
    handlers: Vec<(HandledEventType, Arc<dyn EventHandler>)>,
}

impl HandlerRegistry {
    fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push((handler.handled_event_type(), handler));
    }

    /// 订阅该类型的处理器在前，订阅全部事件的处理器在后
    fn matching(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        let (all, typed): (Vec<_>, Vec<_>) = self
            .handlers
            .iter()
            .filter(|(handled, _)| handled.handles(event_type))
            .partition(|(handled, _)| matches!(handled, HandledEventType::All));

        typed
            .into_iter()
            .chain(all)
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// 进程内分发器
#[derive(Clone, Default)]
pub struct InProcessEventDispatcher {
    registry: HandlerRegistry,
}

impl InProcessEventDispatcher {
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        let mut dispatcher = Self::default();
        for h in handlers {
            dispatcher.register(h);
        }
        dispatcher
    }

    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.registry.register(handler);
    }

    /// 链式注册
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.register(handler);
        self
    }

    /// 已注册的处理器数量（订阅多个类型的处理器只计一次）
    pub fn handler_count(&self) -> usize {
        self.registry.len()
    }
}

#[async_trait]
impl EventPublisher for InProcessEventDispatcher {
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        let handlers = self.registry.matching(event.event_type());
        if handlers.is_empty() {
            debug!(
                event_id = event.event_id(),
                event_type = event.event_type(),
                "no handler registered for event"
            );
            return Ok(());
        }

        for h in handlers {
            debug!(
                handler = h.handler_name(),
                event_id = event.event_id(),
                event_type = event.event_type(),
                "dispatching event"
            );
            h.handle(event)
                .await
                .map_err(|err| DomainError::EventHandler {
                    handler: h.handler_name().to_string(),
                    reason: err.to_string(),
                })?;
        }

        Ok(())
    }
}
