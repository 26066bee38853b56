use async_trait::async_trait;
use dashmap::DashMap;
use kernel_application::behavior::ValidationBehavior;
use kernel_application::command::Command;
use kernel_application::command_bus::CommandBus;
use kernel_application::command_handler::CommandHandler;
use kernel_application::context::AppContext;
use kernel_application::dto::Dto;
use kernel_application::error::{AppError, AppResult};
use kernel_application::query::Query;
use kernel_application::query_bus::QueryBus;
use kernel_application::query_handler::QueryHandler;
use kernel_application::{Mediator, Outcome, PipelineConfig};
use kernel_domain::domain_event::EventContext;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Validate)]
struct CreateUser {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    username: String,
    #[validate(email(message = "invalid email format"))]
    email: String,
}

impl Command for CreateUser {
    const NAME: &'static str = "user.create";
    type Output = u32;
}

#[derive(Debug)]
struct GetUser {
    id: u32,
}

#[derive(Debug, Serialize)]
struct UserDto {
    id: u32,
    username: String,
    email: String,
}

impl Dto for UserDto {}

impl Query for GetUser {
    const NAME: &'static str = "user.get";
    type Dto = UserDto;
}

#[derive(Default)]
struct UserStore {
    users: DashMap<u32, (String, String)>,
}

#[async_trait]
impl CommandHandler<CreateUser> for UserStore {
    async fn handle(&self, _ctx: &AppContext, cmd: CreateUser) -> AppResult<u32> {
        let id = self.users.len() as u32 + 1;
        self.users.insert(id, (cmd.username, cmd.email));
        Ok(id)
    }
}

#[async_trait]
impl QueryHandler<GetUser> for UserStore {
    async fn handle(&self, _ctx: &AppContext, q: GetUser) -> AppResult<UserDto> {
        let user = self
            .users
            .get(&q.id)
            .ok_or_else(|| AppError::NotFound(format!("user#{}", q.id)))?;
        let (username, email) = user.value().clone();
        Ok(UserDto {
            id: q.id,
            username,
            email,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config: PipelineConfig =
        serde_json::from_str(r#"{ "performance": { "threshold_ms": 100 } }"#)?;
    let validation = Arc::new(ValidationBehavior::new().with_derived::<CreateUser>());
    let mediator = Mediator::with_default_pipeline(&config, validation);

    let store = Arc::new(UserStore::default());
    mediator.register_command::<CreateUser, _>(store.clone())?;
    mediator.register_query::<GetUser, _>(store)?;

    let ctx = AppContext::builder()
        .event(
            EventContext::builder()
                .correlation_id("cor-1".into())
                .actor_type("user".into())
                .actor_id("u-admin".into())
                .build(),
        )
        .idempotency_key("idem-1".into())
        .build();

    let id = CommandBus::dispatch(
        &mediator,
        &ctx,
        CreateUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
        },
    )
    .await?;

    let user: Outcome<UserDto> = QueryBus::dispatch(&mediator, &ctx, GetUser { id })
        .await
        .into();
    println!("{}", serde_json::to_string_pretty(&user)?);

    let rejected: Outcome<u32> = CommandBus::dispatch(
        &mediator,
        &ctx,
        CreateUser {
            username: "al".into(),
            email: "not-an-email".into(),
        },
    )
    .await
    .into();
    println!("{}", serde_json::to_string_pretty(&rejected)?);

    let missing: Outcome<UserDto> = QueryBus::dispatch(&mediator, &ctx, GetUser { id: 42 })
        .await
        .into();
    println!("{}", serde_json::to_string_pretty(&missing)?);

    Ok(())
}
