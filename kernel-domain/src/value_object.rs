//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//! 相等性按组成部分逐一比较：`#[value_object]` 宏为所有字段派生 `PartialEq/Eq`。
//!

use std::fmt;

use kernel_macros::value_object;

/// 值对象抽象
pub trait ValueObject: Clone + PartialEq {
    /// 业务校验失败时的错误类型
    type Error;

    /// 校验值对象的不变量
    fn validate(&self) -> Result<(), Self::Error>;

    /// 校验通过后返回自身，便于在构造函数末尾链式使用
    fn validated(self) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

/// 版本号（用于乐观锁和并发控制）
///
/// 新建的聚合版本为 0；每次成功提交后由工作单元递增。
///
/// # 示例
///
/// ```
/// use kernel_domain::value_object::Version;
///
/// let v1 = Version::new();
/// assert!(v1.is_new());
///
/// let v2 = v1.next();
/// assert_eq!(v2.value(), 1);
/// assert!(v2 > v1);
/// ```
#[value_object(default)]
#[derive(Copy, PartialOrd, Ord, Hash)]
pub struct Version(usize);

impl Version {
    /// 创建初始版本（版本号为 0）
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_value(value: usize) -> Self {
        Self(value)
    }

    /// 获取下一个版本号
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn value(&self) -> usize {
        self.0
    }

    /// 是否为从未持久化的初始版本
    pub fn is_new(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for Version {
    fn from(value: usize) -> Self {
        Self::from_value(value)
    }
}

impl From<Version> for usize {
    fn from(version: Version) -> Self {
        version.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;

    #[value_object]
    struct Money {
        amount: i64,
        currency: String,
    }

    impl ValueObject for Money {
        type Error = DomainError;

        fn validate(&self) -> Result<(), Self::Error> {
            if self.amount < 0 {
                return Err(DomainError::invalid_value("amount must be >= 0"));
            }
            if self.currency.len() != 3 {
                return Err(DomainError::invalid_value("currency must be an ISO-4217 code"));
            }
            Ok(())
        }
    }

    fn money(amount: i64, currency: &str) -> Money {
        Money {
            amount,
            currency: currency.to_string(),
        }
    }

    #[test]
    fn value_objects_compare_by_components() {
        assert_eq!(money(10, "EUR"), money(10, "EUR"));
        assert_ne!(money(10, "EUR"), money(10, "USD"));
        assert_ne!(money(10, "EUR"), money(11, "EUR"));
    }

    #[test]
    fn validated_rejects_broken_invariants() {
        assert!(money(5, "CNY").validated().is_ok());

        let err = money(-1, "CNY").validated().unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { .. }));

        let err = money(1, "YUAN").validated().unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { .. }));
    }

    #[test]
    fn version_starts_new_and_increments() {
        let v0 = Version::new();
        assert!(v0.is_new());
        assert_eq!(v0, Version::default());

        let v3 = v0.next().next().next();
        assert_eq!(v3.value(), 3);
        assert!(!v3.is_new());
        assert!(v3 > v0);
    }

    #[test]
    fn version_display_and_conversions() {
        assert_eq!(Version::from_value(5).to_string(), "v5");

        let v: Version = 42.into();
        let raw: usize = v.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn version_serializes_as_plain_number() {
        let v = Version::from_value(7);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "7");

        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
