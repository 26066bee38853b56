//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及将事件与元数据/上下文
//! 封装后的 `EventEnvelope`。事件在聚合内累积，保存时被统一取出并发布。

mod domain_event_trait;
mod event_context;
mod event_envelope;
mod field_changed;
mod metadata;

pub use domain_event_trait::DomainEvent;
pub use event_context::EventContext;
pub use event_envelope::EventEnvelope;
pub use field_changed::FieldChanged;
pub use metadata::Metadata;
