//! 应用层（CQRS）
//!
//! 命令/查询及其处理器、进程内中介者 `Mediator`，以及包裹处理器调用的管道行为
//! （日志、校验、性能、未处理错误）。
//!
pub mod behavior;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod mediator;
pub mod outcome;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod validation;

pub use config::{PerformanceConfig, PipelineConfig};
pub use mediator::Mediator;
pub use outcome::Outcome;
