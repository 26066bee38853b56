//! 领域服务（Domain Service）
//!
//! 封装不属于单个聚合的领域逻辑，通常依赖多个聚合或外部服务，
//! 以纯接口方式定义输入/输出与错误并支持异步执行。
//!
use async_trait::async_trait;

/// 领域服务：封装不属于单个聚合的领域逻辑
#[async_trait]
pub trait DomainService: Send + Sync {
    type Input: Send;
    type Output;
    type Error;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;

    /// 两个账户之间转账的额度校验
    struct TransferPolicy {
        daily_limit: u64,
    }

    #[async_trait]
    impl DomainService for TransferPolicy {
        type Input = (u64, u64);
        type Output = u64;
        type Error = DomainError;

        async fn execute(&self, input: Self::Input) -> Result<u64, DomainError> {
            let (balance, amount) = input;
            if amount > self.daily_limit {
                return Err(DomainError::invalid_value("daily limit exceeded"));
            }
            balance
                .checked_sub(amount)
                .ok_or_else(|| DomainError::invalid_state("insufficient balance"))
        }
    }

    #[tokio::test]
    async fn domain_service_returns_output_or_domain_error() {
        let policy = TransferPolicy { daily_limit: 500 };

        assert_eq!(policy.execute((1_000, 200)).await.unwrap(), 800);
        assert!(matches!(
            policy.execute((1_000, 800)).await,
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            policy.execute((100, 200)).await,
            Err(DomainError::InvalidState { .. })
        ));
    }
}
