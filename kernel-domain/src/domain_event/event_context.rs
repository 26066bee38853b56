use bon::Builder;
use serde::{Deserialize, Serialize};

/// 事件的业务上下文：链路追踪与触发主体
///
/// 一次 `save_changes` 共享同一个上下文，其中取出的每个事件都会携带它。
#[derive(Builder, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// 关联ID（同一业务操作内保持不变）
    correlation_id: Option<String>,
    /// 因果ID（直接触发本次操作的消息/事件）
    causation_id: Option<String>,
    /// 触发事件的主体类型（如用户、系统等）
    actor_type: Option<String>,
    /// 触发事件的主体ID
    actor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<serde_json::Value>,
}

impl EventContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn extensions(&self) -> Option<&serde_json::Value> {
        self.extensions.as_ref()
    }

    /// 派生一个由 `message_id` 直接触发的子上下文：
    /// 保留关联ID与主体，因果ID指向触发消息
    pub fn caused_by(&self, message_id: impl Into<String>) -> Self {
        Self {
            causation_id: Some(message_id.into()),
            ..self.clone()
        }
    }
}
