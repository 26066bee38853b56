//! 变更跟踪（ChangeTracker）
//!
//! 记录本次工作单元中新增/修改/删除的聚合。聚合以类型擦除的
//! `TrackedAggregate` 保存，使不同类型的聚合可以放在同一个有序集合中，
//! 拦截器据此遍历聚合、取出领域事件并写入审计信息。
//!
use crate::{
    aggregate_root::{AggregateRoot, AuditInfo},
    domain_event::{EventContext, EventEnvelope},
    entity::Entity,
    error::DomainResult,
    persist::{SerializedEvent, SerializedSnapshot},
    value_object::Version,
};
use std::any::Any;

/// 跟踪状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
    Unchanged,
}

/// 类型擦除后的聚合，对所有 `AggregateRoot` 自动实现
pub trait TrackedAggregate: Send + Sync {
    fn aggregate_type(&self) -> &'static str;

    fn aggregate_id(&self) -> String;

    fn current_version(&self) -> Version;

    fn assign_version(&mut self, version: Version);

    fn has_pending(&self) -> bool;

    /// 以给定版本封装全部待发布事件，不清空
    fn serialize_events(
        &self,
        version: Version,
        context: &EventContext,
    ) -> DomainResult<Vec<SerializedEvent>>;

    fn clear_events(&mut self);

    /// 序列化后清空；序列化失败时事件保留在聚合中
    fn drain_events(
        &mut self,
        version: Version,
        context: &EventContext,
    ) -> DomainResult<Vec<SerializedEvent>> {
        let events = self.serialize_events(version, context)?;
        self.clear_events();
        Ok(events)
    }

    fn audit_info(&self) -> Option<&AuditInfo>;

    fn audit_info_mut(&mut self) -> Option<&mut AuditInfo>;

    fn to_snapshot(&self) -> DomainResult<SerializedSnapshot>;

    fn as_any(&self) -> &dyn Any;
}

impl<A> TrackedAggregate for A
where
    A: AggregateRoot,
{
    fn aggregate_type(&self) -> &'static str {
        A::TYPE
    }

    fn aggregate_id(&self) -> String {
        self.id().to_string()
    }

    fn current_version(&self) -> Version {
        Entity::version(self)
    }

    fn assign_version(&mut self, version: Version) {
        AggregateRoot::set_version(self, version);
    }

    fn has_pending(&self) -> bool {
        AggregateRoot::has_pending_events(self)
    }

    fn serialize_events(
        &self,
        version: Version,
        context: &EventContext,
    ) -> DomainResult<Vec<SerializedEvent>> {
        self.domain_events()
            .iter()
            .map(|event| {
                let envelope =
                    EventEnvelope::<A>::new(self.id(), version, event.clone(), context.clone());
                SerializedEvent::try_from(&envelope).map_err(crate::error::DomainError::from)
            })
            .collect()
    }

    fn clear_events(&mut self) {
        self.clear_domain_events();
    }

    fn audit_info(&self) -> Option<&AuditInfo> {
        AggregateRoot::audit(self)
    }

    fn audit_info_mut(&mut self) -> Option<&mut AuditInfo> {
        AggregateRoot::audit_mut(self)
    }

    fn to_snapshot(&self) -> DomainResult<SerializedSnapshot> {
        SerializedSnapshot::from_aggregate(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 一条跟踪记录
pub struct TrackedEntry {
    aggregate: Box<dyn TrackedAggregate>,
    state: EntityState,
    original_version: Version,
}

impl TrackedEntry {
    pub fn new<A>(aggregate: A, state: EntityState) -> Self
    where
        A: AggregateRoot,
    {
        let original_version = Entity::version(&aggregate);
        Self {
            aggregate: Box::new(aggregate),
            state,
            original_version,
        }
    }

    pub fn aggregate_type(&self) -> &'static str {
        self.aggregate.aggregate_type()
    }

    pub fn aggregate_id(&self) -> String {
        self.aggregate.aggregate_id()
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// 跟踪时（即从存储加载时）的版本，用于乐观并发校验
    pub fn original_version(&self) -> Version {
        self.original_version
    }

    /// 保存成功后聚合的版本：新增固定为 1，修改递增，其余不变
    pub fn committed_version(&self) -> Version {
        match self.state {
            EntityState::Added => Version::new().next(),
            EntityState::Modified => self.original_version.next(),
            EntityState::Deleted | EntityState::Unchanged => self.original_version,
        }
    }

    pub fn aggregate(&self) -> &dyn TrackedAggregate {
        self.aggregate.as_ref()
    }

    pub fn aggregate_mut(&mut self) -> &mut dyn TrackedAggregate {
        self.aggregate.as_mut()
    }

    pub fn has_pending_events(&self) -> bool {
        self.aggregate.has_pending()
    }

    /// 取出事件，并以本次提交的版本标记
    pub fn drain_events(&mut self, context: &EventContext) -> DomainResult<Vec<SerializedEvent>> {
        let version = self.committed_version();
        self.aggregate.drain_events(version, context)
    }

    /// 以本次提交的版本序列化事件，聚合中的事件保持不变
    pub fn serialize_events(&self, context: &EventContext) -> DomainResult<Vec<SerializedEvent>> {
        self.aggregate
            .serialize_events(self.committed_version(), context)
    }

    pub fn clear_events(&mut self) {
        self.aggregate.clear_events();
    }

    /// 还原为具体聚合类型
    pub fn downcast_ref<A>(&self) -> Option<&A>
    where
        A: AggregateRoot,
    {
        self.aggregate.as_any().downcast_ref::<A>()
    }

    fn same_key(&self, other: &TrackedEntry) -> bool {
        self.aggregate_type() == other.aggregate_type()
            && self.aggregate_id() == other.aggregate_id()
    }
}

impl std::fmt::Debug for TrackedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedEntry")
            .field("aggregate_type", &self.aggregate_type())
            .field("aggregate_id", &self.aggregate_id())
            .field("state", &self.state)
            .field("original_version", &self.original_version)
            .finish()
    }
}

/// 按跟踪顺序保存的变更集合，同一聚合（类型 + 标识）只保留一条
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Vec<TrackedEntry>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 跟踪聚合；同一聚合再次跟踪时替换原记录并保留其位置：
    /// - 新增后修改仍为新增；
    /// - 新增后删除则直接移除（从未写入存储）；
    /// - 其余情况以新状态为准，原始版本保持首次跟踪时的值。
    pub fn track(&mut self, entry: TrackedEntry) {
        let Some(pos) = self.entries.iter().position(|e| e.same_key(&entry)) else {
            self.entries.push(entry);
            return;
        };

        let (existing_state, original_version) = {
            let existing = &self.entries[pos];
            (existing.state, existing.original_version)
        };
        let state = match (existing_state, entry.state) {
            (EntityState::Added, EntityState::Deleted) => {
                self.entries.remove(pos);
                return;
            }
            (EntityState::Added, _) => EntityState::Added,
            (_, next) => next,
        };

        self.entries[pos] = TrackedEntry {
            aggregate: entry.aggregate,
            state,
            original_version,
        };
    }

    pub fn entries(&self) -> &[TrackedEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [TrackedEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否有需要写入的变更
    pub fn has_changes(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.state != EntityState::Unchanged || e.has_pending_events())
    }

    /// 取出全部记录，跟踪器置空
    pub fn take(&mut self) -> Vec<TrackedEntry> {
        std::mem::take(&mut self.entries)
    }

    /// 放回取出的记录；期间新跟踪的记录按规则合并在其后
    pub fn restore(&mut self, entries: Vec<TrackedEntry>) {
        let newer = std::mem::replace(&mut self.entries, entries);
        for entry in newer {
            self.track(entry);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
