//! 请求校验
//!
//! `RequestValidator<R>` 描述针对某类请求的一条或一组校验规则，失败时返回按字段归集的
//! `ValidationErrors`。已派生 `validator::Validate` 的请求可直接使用 `ValidateDerive`。
//!
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// 按字段归集的校验失败信息（字段 -> 消息列表）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅含一条消息
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// 合并另一组失败信息，同字段的消息按先后追加
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 消息总数
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// 无失败时为 `Ok(())`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// 展开为 `field: message` 形式
    pub fn to_messages(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_messages().join("; "))
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = ValidationErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// 请求校验器
pub trait RequestValidator<R>: Send + Sync {
    fn validate(&self, request: &R) -> Result<(), ValidationErrors>;
}

impl<R, F> RequestValidator<R> for F
where
    F: Fn(&R) -> Result<(), ValidationErrors> + Send + Sync,
{
    fn validate(&self, request: &R) -> Result<(), ValidationErrors> {
        self(request)
    }
}

/// 以 `validator::Validate` 的派生规则校验请求
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateDerive;

impl<R> RequestValidator<R> for ValidateDerive
where
    R: Validate,
{
    fn validate(&self, request: &R) -> Result<(), ValidationErrors> {
        Validate::validate(request).map_err(ValidationErrors::from)
    }
}
