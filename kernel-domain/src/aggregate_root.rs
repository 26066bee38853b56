//! 聚合根（Aggregate Root）
//!
//! 聚合根是一致性边界：业务方法修改状态的同时记录领域事件，
//! 事件暂存在 `DomainEvents` 中，直到工作单元保存时被取出并发布。
//!
use crate::domain_event::DomainEvent;
use crate::entity::Entity;
use crate::value_object::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::slice::Iter;

/// 聚合内待发布的领域事件，按记录顺序排列
///
/// 该列表不属于聚合状态：不参与序列化，也不会被写入存储。
#[derive(Debug, Clone)]
pub struct DomainEvents<E> {
    events: Vec<E>,
}

impl<E> Default for DomainEvents<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> DomainEvents<E>
where
    E: DomainEvent,
{
    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    /// 按事件ID移除，返回是否存在
    pub fn remove(&mut self, event_id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.event_id() != event_id);
        before != self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 取出全部事件并清空
    pub fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    pub fn as_slice(&self) -> &[E] {
        &self.events
    }

    pub fn iter(&self) -> Iter<'_, E> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a, E> IntoIterator for &'a DomainEvents<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// 审计信息：创建/最后修改的时间与操作者
///
/// 由 `AuditableEntityInterceptor` 在保存前写入，业务代码只读。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    created_at: Option<DateTime<Utc>>,
    created_by: Option<String>,
    last_modified_at: Option<DateTime<Utc>>,
    last_modified_by: Option<String>,
}

impl AuditInfo {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        self.last_modified_at
    }

    pub fn last_modified_by(&self) -> Option<&str> {
        self.last_modified_by.as_deref()
    }

    /// 新建时创建与最后修改信息相同
    pub fn mark_created(&mut self, at: DateTime<Utc>, by: Option<&str>) {
        self.created_at = Some(at);
        self.created_by = by.map(str::to_string);
        self.mark_modified(at, by);
    }

    pub fn mark_modified(&mut self, at: DateTime<Utc>, by: Option<&str>) {
        self.last_modified_at = Some(at);
        self.last_modified_by = by.map(str::to_string);
    }
}

/// 聚合根接口
///
/// 通常由 `#[aggregate_root(event = ...)]` 宏实现存取方法，
/// 业务代码只需在方法中调用 `add_domain_event`。
pub trait AggregateRoot:
    Entity + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 聚合类型的稳定名称（同时作为存储表名）
    const TYPE: &'static str;

    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;

    fn domain_events(&self) -> &DomainEvents<Self::Event>;

    fn domain_events_mut(&mut self) -> &mut DomainEvents<Self::Event>;

    /// 由工作单元在提交时写入新版本
    fn set_version(&mut self, version: Version);

    fn audit(&self) -> Option<&AuditInfo> {
        None
    }

    fn audit_mut(&mut self) -> Option<&mut AuditInfo> {
        None
    }

    /// 记录一条待发布事件
    fn add_domain_event(&mut self, event: Self::Event) {
        self.domain_events_mut().push(event);
    }

    fn remove_domain_event(&mut self, event_id: &str) -> bool {
        self.domain_events_mut().remove(event_id)
    }

    fn clear_domain_events(&mut self) {
        self.domain_events_mut().clear();
    }

    /// 取出并清空全部待发布事件
    fn take_domain_events(&mut self) -> Vec<Self::Event> {
        self.domain_events_mut().take()
    }

    fn has_pending_events(&self) -> bool {
        !self.domain_events().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_macros::{aggregate_root, domain_event};

    #[domain_event]
    enum TicketEvent {
        Opened { title: String },
        Closed,
    }

    #[aggregate_root(event = TicketEvent, type_name = "ticket", auditable)]
    struct Ticket {
        title: String,
        closed: bool,
    }

    impl Ticket {
        fn open(id: &str, title: &str) -> Self {
            let mut ticket = <Self as Entity>::new(id.to_string(), Version::new());
            ticket.title = title.to_string();
            ticket.add_domain_event(TicketEvent::Opened {
                id: ulid::Ulid::new().to_string(),
                title: title.to_string(),
            });
            ticket
        }

        fn close(&mut self) {
            self.closed = true;
            self.add_domain_event(TicketEvent::Closed {
                id: ulid::Ulid::new().to_string(),
            });
        }
    }

    #[test]
    fn events_accumulate_in_order_until_taken() {
        let mut ticket = Ticket::open("t-1", "printer on fire");
        ticket.close();

        assert!(ticket.has_pending_events());
        let types: Vec<&str> = ticket.domain_events().iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["TicketEvent.Opened", "TicketEvent.Closed"]);

        let taken = ticket.take_domain_events();
        assert_eq!(taken.len(), 2);
        assert!(!ticket.has_pending_events());
    }

    #[test]
    fn remove_and_clear_pending_events() {
        let mut ticket = Ticket::open("t-2", "typo");
        let opened_id = ticket.domain_events().as_slice()[0].event_id().to_string();

        assert!(!ticket.remove_domain_event("missing"));
        assert!(ticket.remove_domain_event(&opened_id));
        assert!(ticket.domain_events().is_empty());

        ticket.close();
        ticket.clear_domain_events();
        assert!(!ticket.has_pending_events());
    }

    #[test]
    fn pending_events_are_not_serialized() {
        let ticket = Ticket::open("t-3", "slow build");
        let json = serde_json::to_value(&ticket).unwrap();

        assert!(json.get("domain_events").is_none());
        assert_eq!(json["title"], "slow build");

        let restored: Ticket = serde_json::from_value(json).unwrap();
        assert!(restored.domain_events().is_empty());
        assert_eq!(Ticket::TYPE, "ticket");
    }

    #[test]
    fn audit_info_marks_creation_and_modification() {
        let mut ticket = Ticket::open("t-4", "audit me");
        let created = Utc::now();
        ticket
            .audit_mut()
            .expect("auditable")
            .mark_created(created, Some("u-1"));

        let audit = ticket.audit().unwrap();
        assert_eq!(audit.created_by(), Some("u-1"));
        assert_eq!(audit.last_modified_at(), Some(created));

        let later = created + chrono::Duration::seconds(5);
        ticket.audit_mut().unwrap().mark_modified(later, None);
        let audit = ticket.audit().unwrap();
        assert_eq!(audit.created_at(), Some(created));
        assert_eq!(audit.last_modified_at(), Some(later));
        assert_eq!(audit.last_modified_by(), None);
    }
}
