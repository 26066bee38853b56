use serde::{Deserialize, Serialize};

/// 字段变更封装，包含旧值与新值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChanged<T> {
    pub old: T,
    pub new: T,
}

impl<T> FieldChanged<T> {
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }
}

impl<T> FieldChanged<T>
where
    T: PartialEq,
{
    /// 仅当新旧值不同时返回变更，便于在聚合方法中跳过无效事件
    pub fn detect(old: T, new: T) -> Option<Self> {
        (old != new).then(|| Self::new(old, new))
    }

    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}
