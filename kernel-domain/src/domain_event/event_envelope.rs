use crate::aggregate_root::AggregateRoot;
use crate::value_object::Version;

use super::event_context::EventContext;
use super::metadata::Metadata;

/// 事件信封，包含事件载荷、元数据与业务上下文
#[derive(Debug, Clone)]
pub struct EventEnvelope<A>
where
    A: AggregateRoot,
{
    pub metadata: Metadata,
    pub payload: A::Event,
    pub context: EventContext,
}

impl<A> EventEnvelope<A>
where
    A: AggregateRoot,
{
    /// 以当前时间封装一条事件，`aggregate_version` 为事件随之提交的版本
    pub fn new(
        aggregate_id: &A::Id,
        aggregate_version: Version,
        payload: A::Event,
        context: EventContext,
    ) -> Self {
        let metadata = Metadata::builder()
            .aggregate_id(aggregate_id.to_string())
            .aggregate_type(A::TYPE.to_string())
            .aggregate_version(aggregate_version)
            .build();

        Self {
            metadata,
            payload,
            context,
        }
    }
}
