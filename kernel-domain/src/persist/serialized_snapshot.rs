use crate::{
    aggregate_root::AggregateRoot,
    error::{DomainError, DomainResult as Result},
};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 聚合的存储行：类型 + 标识 + 版本 + 聚合状态 JSON
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedSnapshot {
    aggregate_id: String,
    aggregate_type: String,
    aggregate_version: usize,
    payload: Value,
}

impl SerializedSnapshot {
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 将存储行反序列化为聚合实例
    pub fn to_aggregate<A>(&self) -> Result<A>
    where
        A: AggregateRoot,
    {
        if A::TYPE != self.aggregate_type {
            return Err(DomainError::TypeMismatch {
                expected: A::TYPE.to_string(),
                found: self.aggregate_type.clone(),
            });
        }

        let aggregate = serde_json::from_value(self.payload.clone())?;
        Ok(aggregate)
    }

    /// 从聚合实例创建存储行（待发布事件不会进入 payload）
    pub fn from_aggregate<A>(aggregate: &A) -> Result<Self>
    where
        A: AggregateRoot,
    {
        Ok(Self {
            aggregate_id: aggregate.id().to_string(),
            aggregate_type: A::TYPE.to_string(),
            aggregate_version: aggregate.version().value(),
            payload: serde_json::to_value(aggregate)?,
        })
    }
}
