//! 实体（Entity）基础抽象
//!
//! 实体以标识区分彼此：两个实体即使所有属性相同，只要标识不同即为不同实体。
//! 版本号用于持久化时的乐观并发控制。
//!
use crate::value_object::Version;
use std::{fmt::Display, str::FromStr};

/// 具备唯一标识与版本的实体抽象
pub trait Entity: Send + Sync {
    /// 实体标识类型，要求可解析、可显示与可克隆
    type Id: FromStr + Clone + Display + Send + Sync;

    /// 使用给定标识与版本创建实体
    fn new(id: Self::Id, version: Version) -> Self;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 获取当前版本（用于乐观锁与并发控制）
    fn version(&self) -> Version;

    /// 按标识比较是否为同一实体
    fn same_identity_as(&self, other: &Self) -> bool
    where
        Self: Sized,
        Self::Id: PartialEq,
    {
        self.id() == other.id()
    }
}
