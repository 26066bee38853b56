//! 工作单元（UnitOfWork）
//!
//! 仓储只记录变更，`save_changes` 时由工作单元一次性写入并触发拦截器。
//!
use crate::{domain_event::EventContext, error::DomainResult as Result};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 以空上下文保存，返回写入行数
    async fn save_changes(&self) -> Result<usize> {
        self.save_changes_with(EventContext::default()).await
    }

    /// 保存全部被跟踪的变更；取出的事件都携带 `context`
    async fn save_changes_with(&self, context: EventContext) -> Result<usize>;

    async fn begin_transaction(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    /// 回滚到 `begin_transaction` 时的状态，并丢弃未保存的变更
    async fn rollback(&self) -> Result<()>;
}

#[async_trait]
impl<T> UnitOfWork for Arc<T>
where
    T: UnitOfWork + ?Sized,
{
    async fn save_changes(&self) -> Result<usize> {
        (**self).save_changes().await
    }

    async fn save_changes_with(&self, context: EventContext) -> Result<usize> {
        (**self).save_changes_with(context).await
    }

    async fn begin_transaction(&self) -> Result<()> {
        (**self).begin_transaction().await
    }

    async fn commit(&self) -> Result<()> {
        (**self).commit().await
    }

    async fn rollback(&self) -> Result<()> {
        (**self).rollback().await
    }
}
