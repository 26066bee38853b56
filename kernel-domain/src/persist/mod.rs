//! 持久化（persist）
//!
//! 以“变更跟踪 + 保存拦截器”的方式组织聚合的持久化：
//! - 仓储（`Repository`）只登记新增/修改/删除，由工作单元（`UnitOfWork`）统一保存；
//! - 保存时按顺序执行 `SaveChangesInterceptor`，领域事件由
//!   `DispatchDomainEventsInterceptor` 取出并发布，审计信息由 `AuditableEntityInterceptor` 写入；
//! - 存储行为 `SerializedSnapshot`，发布的事件为 `SerializedEvent`。
//!
//! 内置 `InMemoryDbContext`/`InMemoryRepository` 便于测试；真实存储实现同样的 trait 即可接入。
//!
mod auditable;
mod change_tracker;
mod dispatch_domain_events;
mod in_memory;
mod interceptor;
mod repository;
mod serialized_event;
mod serialized_snapshot;
mod unit_of_work;

pub use auditable::{
    AnonymousUser, AuditableEntityInterceptor, Clock, CurrentUser, FixedClock, StaticUser,
    SystemClock,
};
pub use change_tracker::{ChangeTracker, EntityState, TrackedAggregate, TrackedEntry};
pub use dispatch_domain_events::{DispatchDomainEventsInterceptor, DispatchTiming};
pub use in_memory::{InMemoryDbContext, InMemoryRepository};
pub use interceptor::{SaveChangesContext, SaveChangesInterceptor};
pub use repository::{ReadRepository, Repository};
pub use serialized_event::{SerializedEvent, deserialize_events, serialize_events};
pub use serialized_snapshot::SerializedSnapshot;
pub use unit_of_work::UnitOfWork;
