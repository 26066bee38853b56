//! 事件子系统（eventing）
//!
//! 领域事件在工作单元保存时被取出后交给 `EventPublisher`：
//! - `InProcessEventDispatcher`：进程内按类型同步分发给 `EventHandler`；
//! - `InMemoryEventBus`：基于广播通道的发布/订阅，便于测试与本地开发。
//!
//! 该模块仅定义协议与进程内实现，可对接任意消息系统。
//!
pub mod bus_inmemory;
pub mod dispatcher;
pub mod handler;
pub mod publisher;

pub use bus_inmemory::InMemoryEventBus;
pub use dispatcher::InProcessEventDispatcher;
pub use handler::{EventHandler, HandledEventType};
pub use publisher::EventPublisher;
