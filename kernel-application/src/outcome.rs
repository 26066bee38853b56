use crate::error::AppResult;
use serde::{Deserialize, Serialize};

/// 面向接口层的执行结果信封：`{ succeeded, data, errors }`
///
/// 校验失败展开为 `field: message` 形式的多条错误，其它错误各占一条。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Self {
            succeeded: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            succeeded: false,
            data: None,
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        Outcome {
            succeeded: self.succeeded,
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}

impl<T> From<AppResult<T>> for Outcome<T> {
    fn from(result: AppResult<T>) -> Self {
        match result {
            Ok(data) => Outcome::success(data),
            Err(err) => Outcome::failure(err.messages()),
        }
    }
}
