use super::{BoxAnySend, Next, PipelineBehavior, RequestMeta};
use crate::{
    context::AppContext,
    error::{AppError, AppResult},
    validation::{RequestValidator, ValidateDerive, ValidationErrors},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

type ErasedValidator =
    Arc<dyn Fn(&(dyn Any + Send)) -> Result<(), ValidationErrors> + Send + Sync>;

/// 在调用处理器前执行该请求类型的全部校验器
///
/// 所有失败合并后以 `AppError::Validation` 返回，处理器不会被调用。
#[derive(Default)]
pub struct ValidationBehavior {
    validators: DashMap<TypeId, Vec<ErasedValidator>>,
}

impl ValidationBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为请求类型 `R` 追加一个校验器
    pub fn add_validator<R, V>(&self, validator: V)
    where
        R: 'static,
        V: RequestValidator<R> + 'static,
    {
        let f: ErasedValidator = Arc::new(move |request: &(dyn Any + Send)| {
            match request.downcast_ref::<R>() {
                Some(request) => validator.validate(request),
                None => Ok(()),
            }
        });
        self.validators.entry(TypeId::of::<R>()).or_default().push(f);
    }

    /// 以 `validator::Validate` 的派生规则校验请求类型 `R`
    pub fn add_derived<R>(&self)
    where
        R: Validate + 'static,
    {
        self.add_validator::<R, _>(ValidateDerive);
    }

    pub fn with_validator<R, V>(self, validator: V) -> Self
    where
        R: 'static,
        V: RequestValidator<R> + 'static,
    {
        self.add_validator::<R, V>(validator);
        self
    }

    pub fn with_derived<R>(self) -> Self
    where
        R: Validate + 'static,
    {
        self.add_derived::<R>();
        self
    }

    pub fn validator_count<R: 'static>(&self) -> usize {
        self.validators
            .get(&TypeId::of::<R>())
            .map(|v| v.len())
            .unwrap_or(0)
    }

    fn validate(&self, type_id: TypeId, request: &(dyn Any + Send)) -> Result<(), ValidationErrors> {
        let validators = match self.validators.get(&type_id) {
            Some(v) => v.clone(),
            None => return Ok(()),
        };

        let mut errors = ValidationErrors::new();
        for validator in validators {
            if let Err(e) = validator(request) {
                errors.merge(e);
            }
        }
        errors.into_result()
    }
}

#[async_trait]
impl PipelineBehavior for ValidationBehavior {
    fn name(&self) -> &str {
        "validation"
    }

    async fn handle(
        &self,
        ctx: &AppContext,
        meta: &RequestMeta,
        request: BoxAnySend,
        next: Next<'_>,
    ) -> AppResult<BoxAnySend> {
        if let Err(errors) = self.validate(meta.type_id(), &*request) {
            debug!(name = meta.name(), failures = errors.len(), "request rejected");
            return Err(AppError::Validation(errors));
        }
        next.run(ctx, meta, request).await
    }
}
