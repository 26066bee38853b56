use crate::{
    behavior::{
        BoxAnySend, HandlerFn, LoggingBehavior, Next, PerformanceBehavior, PipelineBehavior,
        RequestMeta, UnhandledErrorBehavior, ValidationBehavior,
    },
    command::Command,
    command_bus::CommandBus,
    command_handler::CommandHandler,
    config::PipelineConfig,
    context::AppContext,
    error::{AppError, AppResult},
    query::Query,
    query_bus::QueryBus,
    query_handler::QueryHandler,
};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::any::{TypeId, type_name};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
struct Registration {
    meta: RequestMeta,
    handler: HandlerFn,
}

/// 进程内中介者
///
/// - 通过 TypeId 为每个命令/查询注册唯一的处理器；
/// - 运行时以类型擦除（Any）方式调度，并在调用端还原结果类型；
/// - 调用处理器前依次经过管道行为（先注册者在最外层）。
pub struct Mediator {
    handlers: DashMap<TypeId, Registration>,
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
}

impl Default for Mediator {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
            behaviors: Vec::new(),
        }
    }
}

impl Mediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置安装内置行为
    ///
    /// `validation` 中的校验器可以在安装后继续注册。
    pub fn with_default_pipeline(
        config: &PipelineConfig,
        validation: Arc<ValidationBehavior>,
    ) -> Self {
        let mut mediator = Self::new();
        if config.unhandled_errors {
            mediator.add_behavior(Arc::new(UnhandledErrorBehavior::new()));
        }
        if config.logging {
            mediator.add_behavior(Arc::new(LoggingBehavior::new()));
        }
        if config.validation {
            mediator.add_behavior(validation);
        }
        if let Some(performance) = config.performance {
            mediator.add_behavior(Arc::new(PerformanceBehavior::new(performance)));
        }
        mediator
    }

    /// 追加管道行为（位于已注册行为之内）
    pub fn add_behavior(&mut self, behavior: Arc<dyn PipelineBehavior>) {
        debug!(behavior = behavior.name(), "pipeline behavior added");
        self.behaviors.push(behavior);
    }

    pub fn with_behavior(mut self, behavior: Arc<dyn PipelineBehavior>) -> Self {
        self.add_behavior(behavior);
        self
    }

    pub fn behaviors(&self) -> Vec<&str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// 注册命令处理器
    pub fn register_command<C, H>(&self, handler: Arc<H>) -> AppResult<()>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let f: HandlerFn = Arc::new(move |boxed_cmd, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                // 键与闭包同一泛型 C，正常情况下 downcast 不会失败
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => {
                        let out = handler.handle(ctx, *cmd).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: type_name::<C>(),
                        found: "unknown",
                    }),
                }
            })
        });

        self.insert(RequestMeta::command::<C>(), f)
            .map_err(|_| AppError::AlreadyRegisteredCommand { command: C::NAME })
    }

    /// 注册查询处理器
    pub fn register_query<Q, H>(&self, handler: Arc<H>) -> AppResult<()>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let f: HandlerFn = Arc::new(move |boxed_q, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                match boxed_q.downcast::<Q>() {
                    Ok(q) => {
                        let dto = handler.handle(ctx, *q).await?;
                        Ok(Box::new(dto) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: type_name::<Q>(),
                        found: "unknown",
                    }),
                }
            })
        });

        self.insert(RequestMeta::query::<Q>(), f)
            .map_err(|_| AppError::AlreadyRegisteredQuery { query: Q::NAME })
    }

    /// 已注册的请求名称（按名称排序）
    pub fn registered(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.iter().map(|e| e.value().meta.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn is_registered<R: 'static>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    fn insert(&self, meta: RequestMeta, handler: HandlerFn) -> Result<(), RequestMeta> {
        match self.handlers.entry(meta.type_id()) {
            Entry::Occupied(_) => Err(meta),
            Entry::Vacant(slot) => {
                debug!(name = meta.name(), kind = %meta.kind(), "handler registered");
                slot.insert(Registration { meta, handler });
                Ok(())
            }
        }
    }

    async fn send(
        &self,
        ctx: &AppContext,
        type_id: TypeId,
        name: &'static str,
        request: BoxAnySend,
    ) -> AppResult<BoxAnySend> {
        let Some(registration) = self.handlers.get(&type_id).map(|r| r.clone()) else {
            return Err(AppError::HandlerNotFound(name));
        };

        Next::new(&self.behaviors, &registration.handler)
            .run(ctx, &registration.meta, request)
            .await
    }
}

#[async_trait]
impl CommandBus for Mediator {
    async fn dispatch<C>(&self, ctx: &AppContext, cmd: C) -> AppResult<C::Output>
    where
        C: Command,
    {
        let out = self
            .send(ctx, TypeId::of::<C>(), C::NAME, Box::new(cmd))
            .await?;

        match out.downcast::<C::Output>() {
            Ok(output) => Ok(*output),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<C::Output>(),
                found: "unknown",
            }),
        }
    }
}

#[async_trait]
impl QueryBus for Mediator {
    async fn dispatch<Q>(&self, ctx: &AppContext, q: Q) -> AppResult<Q::Dto>
    where
        Q: Query,
    {
        let out = self
            .send(ctx, TypeId::of::<Q>(), Q::NAME, Box::new(q))
            .await?;

        match out.downcast::<Q::Dto>() {
            Ok(dto) => Ok(*dto),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<Q::Dto>(),
                found: "unknown",
            }),
        }
    }
}
