//! 管道行为（Pipeline Behavior）
//!
//! 中介者在调用处理器前，按注册顺序依次经过各个行为（先注册者在最外层）。
//! 行为看到的是类型擦除后的请求，可以在调用 `next` 前后做横切处理，也可以不调用 `next` 直接短路返回。
//!
mod logging;
mod performance;
mod unhandled_error;
mod validation;

pub use logging::LoggingBehavior;
pub use performance::PerformanceBehavior;
pub use unhandled_error::UnhandledErrorBehavior;
pub use validation::ValidationBehavior;

use crate::{command::Command, context::AppContext, error::AppResult, query::Query};
use async_trait::async_trait;
use serde::Serialize;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxAnySend = Box<dyn Any + Send>;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = AppResult<BoxAnySend>> + Send + 'a>>;

pub(crate) type HandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> HandlerFuture<'a> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Command,
    Query,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Command => f.write_str("command"),
            RequestKind::Query => f.write_str("query"),
        }
    }
}

/// 请求的描述信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMeta {
    name: &'static str,
    kind: RequestKind,
    type_id: TypeId,
    type_name: &'static str,
}

impl RequestMeta {
    pub fn command<C: Command>() -> Self {
        Self {
            name: C::NAME,
            kind: RequestKind::Command,
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
        }
    }

    pub fn query<Q: Query>() -> Self {
        Self {
            name: Q::NAME,
            kind: RequestKind::Query,
            type_id: TypeId::of::<Q>(),
            type_name: type_name::<Q>(),
        }
    }

    /// 请求的稳定名称（`Command::NAME` / `Query::NAME`）
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// 管道中的下一环：其余行为，最后是处理器本身
pub struct Next<'a> {
    behaviors: &'a [Arc<dyn PipelineBehavior>],
    handler: &'a HandlerFn,
}

impl<'a> Next<'a> {
    pub(crate) fn new(behaviors: &'a [Arc<dyn PipelineBehavior>], handler: &'a HandlerFn) -> Self {
        Self { behaviors, handler }
    }

    pub async fn run(
        self,
        ctx: &AppContext,
        meta: &RequestMeta,
        request: BoxAnySend,
    ) -> AppResult<BoxAnySend> {
        match self.behaviors.split_first() {
            Some((behavior, rest)) => {
                behavior
                    .handle(ctx, meta, request, Next::new(rest, self.handler))
                    .await
            }
            None => (self.handler)(request, ctx).await,
        }
    }
}

#[async_trait]
pub trait PipelineBehavior: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(
        &self,
        ctx: &AppContext,
        meta: &RequestMeta,
        request: BoxAnySend,
        next: Next<'_>,
    ) -> AppResult<BoxAnySend>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    struct Ping;

    impl Command for Ping {
        const NAME: &'static str = "ping";
        type Output = u32;
    }

    struct Trace {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        short_circuit: bool,
    }

    #[async_trait]
    impl PipelineBehavior for Trace {
        fn name(&self) -> &str {
            self.label
        }

        async fn handle(
            &self,
            ctx: &AppContext,
            meta: &RequestMeta,
            request: BoxAnySend,
            next: Next<'_>,
        ) -> AppResult<BoxAnySend> {
            self.log.lock().unwrap().push(format!("{}:before", self.label));
            if self.short_circuit {
                return Err(AppError::Authorization(self.label.to_string()));
            }
            let out = next.run(ctx, meta, request).await;
            self.log.lock().unwrap().push(format!("{}:after", self.label));
            out
        }
    }

    fn handler(log: Arc<Mutex<Vec<String>>>) -> HandlerFn {
        Arc::new(move |request, _ctx| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push("handler".into());
                let n = request.downcast::<u32>().map(|n| *n).unwrap_or_default();
                Ok(Box::new(n + 1) as BoxAnySend)
            })
        })
    }

    #[tokio::test]
    async fn behaviors_wrap_the_handler_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let behaviors: Vec<Arc<dyn PipelineBehavior>> = vec![
            Arc::new(Trace {
                label: "outer",
                log: log.clone(),
                short_circuit: false,
            }),
            Arc::new(Trace {
                label: "inner",
                log: log.clone(),
                short_circuit: false,
            }),
        ];
        let f = handler(log.clone());
        let meta = RequestMeta::command::<Ping>();

        let out = Next::new(&behaviors, &f)
            .run(&AppContext::default(), &meta, Box::new(41u32))
            .await
            .unwrap();
        assert_eq!(*out.downcast::<u32>().unwrap(), 42);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "outer:before",
                "inner:before",
                "handler",
                "inner:after",
                "outer:after"
            ]
        );
    }

    #[tokio::test]
    async fn behavior_can_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let behaviors: Vec<Arc<dyn PipelineBehavior>> = vec![Arc::new(Trace {
            label: "guard",
            log: log.clone(),
            short_circuit: true,
        })];
        let f = handler(log.clone());
        let meta = RequestMeta::command::<Ping>();

        let err = Next::new(&behaviors, &f)
            .run(&AppContext::default(), &meta, Box::new(1u32))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
        assert_eq!(*log.lock().unwrap(), vec!["guard:before"]);
    }

    #[test]
    fn request_meta_describes_the_request() {
        let meta = RequestMeta::command::<Ping>();
        assert_eq!(meta.name(), "ping");
        assert_eq!(meta.kind(), RequestKind::Command);
        assert_eq!(meta.type_id(), TypeId::of::<Ping>());
        assert!(meta.type_name().ends_with("Ping"));
        assert_eq!(meta.kind().to_string(), "command");
    }
}
