//! 管道配置
//!
//! 可从配置文件反序列化，缺省字段取默认值：
//!
//! ```rust
//! use kernel_application::config::PipelineConfig;
//!
//! let config: PipelineConfig =
//!     serde_json::from_str(r#"{ "logging": false, "performance": { "threshold_ms": 200 } }"#)
//!         .unwrap();
//!
//! assert!(!config.logging);
//! assert!(config.validation);
//! assert_eq!(config.performance.unwrap().threshold_ms, 200);
//! ```
//!
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 慢请求阈值（毫秒）
pub const DEFAULT_SLOW_REQUEST_THRESHOLD_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub threshold_ms: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            threshold_ms: DEFAULT_SLOW_REQUEST_THRESHOLD_MS,
        }
    }
}

impl PerformanceConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }
}

/// `Mediator::with_default_pipeline` 安装哪些内置行为
///
/// 安装顺序（由外到内）：未处理错误、日志、校验、性能。
/// `performance` 为 `null` 时不安装性能行为。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub unhandled_errors: bool,
    pub logging: bool,
    pub validation: bool,
    pub performance: Option<PerformanceConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            unhandled_errors: true,
            logging: true,
            validation: true,
            performance: Some(PerformanceConfig::default()),
        }
    }
}
