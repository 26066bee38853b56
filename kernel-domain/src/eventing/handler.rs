//! 事件处理器（EventHandler）
//!
//! 定义消费某类/多类/全部事件的处理逻辑与元信息（名称、订阅类型）。
//!
use crate::persist::SerializedEvent;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub enum HandledEventType {
    One(String),
    Many(Vec<String>),
    All,
}

impl HandledEventType {
    /// 是否订阅了给定事件类型
    pub fn handles(&self, event_type: &str) -> bool {
        match self {
            Self::One(t) => t == event_type,
            Self::Many(ts) => ts.iter().any(|t| t == event_type),
            Self::All => true,
        }
    }
}

/// 事件处理器：处理某一类型的事件
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志与错误信息）
    fn handler_name(&self) -> &str;
    /// 返回该处理器支持的事件类型
    fn handled_event_type(&self) -> HandledEventType;
    /// 处理事件
    async fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::HandledEventType;

    #[test]
    fn handled_event_type_matching() {
        let one = HandledEventType::One("OrderEvent.Placed".into());
        assert!(one.handles("OrderEvent.Placed"));
        assert!(!one.handles("OrderEvent.Shipped"));

        let many = HandledEventType::Many(vec!["A".into(), "B".into()]);
        assert!(many.handles("B"));
        assert!(!many.handles("C"));

        assert!(HandledEventType::All.handles("anything"));
    }
}
