//! 共享内核领域层（kernel-domain）
//!
//! 提供 DDD 的通用基础抽象，以及模仿 ORM "保存变更" 管线的持久化胶水：
//! - 实体（`entity`）、聚合根（`aggregate_root`）与值对象（`value_object`）
//! - 领域事件（`domain_event`）及其发布（`eventing`）
//! - 变更跟踪、保存拦截器、仓储与工作单元（`persist`）
//! - 规约（`specification`）与分页（`pagination`）
//!
//! 聚合在业务操作中累积待发布事件；调用 `UnitOfWork::save_changes` 时，
//! `DispatchDomainEventsInterceptor` 在写入前（或写入后）取出全部待发布事件
//! 并交给 `EventPublisher` 分发。
//!
//! 典型用法：
//! 1. 使用 `#[aggregate_root]` 定义聚合、`#[domain_event]` 定义事件；
//! 2. 构建 `InMemoryDbContext` 并注册拦截器；
//! 3. 通过 `InMemoryRepository` 增删改聚合，最后 `save_changes` 一次提交。
//!
pub mod aggregate_root;
pub mod domain_event;
pub mod domain_service;
pub mod entity;
pub mod error;
pub mod eventing;
pub mod pagination;
pub mod persist;
pub mod specification;
pub mod value_object;

pub use kernel_macros::{aggregate_root, domain_event, entity, entity_id, value_object};

// 允许在本 crate 内部通过 ::kernel_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::kernel_domain 路径。
extern crate self as kernel_domain;
