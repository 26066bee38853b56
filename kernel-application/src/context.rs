use bon::Builder;
use kernel_domain::domain_event::EventContext;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，例如：
/// - 事件上下文（`EventContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等，保存变更时原样传给取出的领域事件；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等（如 API 层重复提交保护）。
///
/// 典型用法：
/// ```rust
/// use kernel_application::context::AppContext;
/// use kernel_domain::domain_event::EventContext;
///
/// let ctx = AppContext::builder()
///     .event(
///         EventContext::builder()
///             .correlation_id("cor-123".into())
///             .actor_type("user".into())
///             .actor_id("u-1".into())
///             .build(),
///     )
///     .idempotency_key("idem-xyz".into())
///     .build();
///
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// assert_eq!(ctx.actor_id(), Some("u-1"));
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct AppContext {
    /// 事件上下文（链路追踪、审计主体、操作因果）
    #[builder(default)]
    pub event: EventContext,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    pub idempotency_key: Option<String>,
}

impl AppContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.event.correlation_id()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.event.actor_id()
    }
}
