//! 保存拦截器（SaveChangesInterceptor）
//!
//! 工作单元保存时的扩展点：
//! - `saving_changes`：写入前调用，可修改被跟踪的聚合，返回错误将中止保存；
//! - `saved_changes`：写入成功后调用，此时数据已提交；
//! - `save_changes_failed`：写入前中止时调用，仅用于观测。
//!
//! 拦截器按注册顺序依次执行。
//!
use crate::{
    domain_event::EventContext,
    error::{DomainError, DomainResult as Result},
    persist::{SerializedEvent, TrackedEntry},
};
use async_trait::async_trait;

/// 一次保存过程的上下文
#[derive(Debug)]
pub struct SaveChangesContext {
    entries: Vec<TrackedEntry>,
    event_context: EventContext,
    pending_events: Vec<SerializedEvent>,
    affected_rows: usize,
}

impl SaveChangesContext {
    pub fn new(entries: Vec<TrackedEntry>, event_context: EventContext) -> Self {
        Self {
            entries,
            event_context,
            pending_events: Vec::new(),
            affected_rows: 0,
        }
    }

    /// 被跟踪的聚合（按跟踪顺序）
    pub fn entries(&self) -> &[TrackedEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [TrackedEntry] {
        &mut self.entries
    }

    pub fn event_context(&self) -> &EventContext {
        &self.event_context
    }

    /// 暂存到写入之后再处理的事件
    pub fn defer_events(&mut self, events: Vec<SerializedEvent>) {
        self.pending_events.extend(events);
    }

    pub fn pending_events(&self) -> &[SerializedEvent] {
        &self.pending_events
    }

    pub fn take_pending_events(&mut self) -> Vec<SerializedEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// 写入的行数；`saved_changes` 之前为 0
    pub fn affected_rows(&self) -> usize {
        self.affected_rows
    }

    pub(crate) fn set_affected_rows(&mut self, rows: usize) {
        self.affected_rows = rows;
    }

    pub(crate) fn into_entries(self) -> Vec<TrackedEntry> {
        self.entries
    }
}

/// 保存拦截器
#[async_trait]
pub trait SaveChangesInterceptor: Send + Sync {
    /// 拦截器名称（用于日志），默认为类型名
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn saving_changes(&self, _ctx: &mut SaveChangesContext) -> Result<()> {
        Ok(())
    }

    async fn saved_changes(&self, _ctx: &mut SaveChangesContext) -> Result<()> {
        Ok(())
    }

    async fn save_changes_failed(&self, _ctx: &SaveChangesContext, _error: &DomainError) {}
}
