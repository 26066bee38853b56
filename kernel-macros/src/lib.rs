//! 共享内核过程宏（kernel-macros）
//!
//! 为 `kernel-domain` 中的基础抽象生成样板代码：
//! - `#[entity]`：注入 `id`/`version` 字段并实现 `Entity`
//! - `#[aggregate_root]`：在实体基础上注入待发布领域事件列表并实现 `AggregateRoot`
//! - `#[entity_id]`：为单字段元组结构体生成标识类型的常用实现
//! - `#[value_object]`：以结构相等派生值对象
//! - `#[domain_event]`：为事件枚举注入 `id` 字段并实现 `DomainEvent`
//!
//! 生成代码统一引用 `::kernel_domain` 路径。
//!
mod aggregate_root;
mod domain_event;
mod entity;
mod entity_id;
mod utils;
mod value_object;

use proc_macro::TokenStream;

/// 实体宏
///
/// - 若缺失则追加字段：`id: IdType`, `version: Version`，并置于字段最前
/// - 自动实现 `::kernel_domain::entity::Entity`
/// - 参数：`#[entity(id = IdType, debug = true|false)]`，`id` 默认 `String`
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 聚合根宏
///
/// 在 `#[entity]` 的基础上追加 `domain_events` 字段（不参与序列化），
/// 并实现 `::kernel_domain::aggregate_root::AggregateRoot`。
///
/// 参数：
/// - `event = EventType`（必填）
/// - `id = IdType`（默认 `String`）
/// - `type_name = "order"`（默认结构体名）
/// - `auditable`：追加 `audit: AuditInfo` 字段，供审计拦截器写入
/// - `debug = false`：不派生 Debug
#[proc_macro_attribute]
pub fn aggregate_root(attr: TokenStream, item: TokenStream) -> TokenStream {
    aggregate_root::expand(attr, item)
}

/// 实体 ID 宏
///
/// 仅支持单字段 tuple struct（如 `struct OrderId(Uuid);`），生成 `new/value`、
/// `Display`、`FromStr`、`AsRef` 与双向 `From`。
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 值对象宏
///
/// 合并/追加派生：Clone, (Debug 可控), Serialize, Deserialize, PartialEq, Eq；
/// 相等性按全部字段逐一比较。
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}

/// 领域事件宏
///
/// - 支持具名字段变体与单元变体（单元变体会被改写为 `Variant { id }`）
/// - 确保每个变体具备字段 `id: IdType`
/// - 枚举级参数：`#[domain_event(id = IdType, version = N)]`
/// - 变体可覆写：`#[event(event_type = "...", event_version = N)]`
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
