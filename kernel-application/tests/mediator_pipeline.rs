use anyhow::Result as AnyResult;
use async_trait::async_trait;
use kernel_application::behavior::{PerformanceBehavior, ValidationBehavior};
use kernel_application::command::Command;
use kernel_application::command_bus::CommandBus;
use kernel_application::command_handler::CommandHandler;
use kernel_application::context::AppContext;
use kernel_application::dto::Dto;
use kernel_application::error::{AppError, AppResult};
use kernel_application::query::Query;
use kernel_application::query_bus::QueryBus;
use kernel_application::query_handler::QueryHandler;
use kernel_application::{Mediator, Outcome, PerformanceConfig, PipelineConfig};
use kernel_domain::aggregate_root::AggregateRoot;
use kernel_domain::domain_event::EventContext;
use kernel_domain::entity::Entity;
use kernel_domain::eventing::{EventHandler, HandledEventType, InProcessEventDispatcher};
use kernel_domain::pagination::{PageRequest, PaginatedList};
use kernel_domain::persist::{
    AuditableEntityInterceptor, DispatchDomainEventsInterceptor, InMemoryDbContext,
    InMemoryRepository, ReadRepository, Repository, SaveChangesInterceptor, SerializedEvent,
    UnitOfWork,
};
use kernel_domain::specification::QuerySpecification;
use kernel_domain::value_object::Version;
use kernel_domain::{aggregate_root, domain_event};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use validator::Validate;

#[domain_event]
enum ProductEvent {
    Created { name: String, price: u64 },
    Renamed { from: String, to: String },
}

#[aggregate_root(event = ProductEvent, type_name = "product", auditable)]
struct Product {
    name: String,
    price: u64,
}

#[derive(Debug, Serialize, PartialEq)]
struct ProductDto {
    id: String,
    name: String,
    price: u64,
    version: usize,
    created_by: Option<String>,
}

impl Dto for ProductDto {}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            created_by: p.audit().and_then(|a| a.created_by()).map(str::to_string),
            version: p.version().value(),
            id: p.id().clone(),
            name: p.name,
            price: p.price,
        }
    }
}

#[derive(Debug, Validate)]
struct CreateProduct {
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[validate(range(min = 1, message = "price must be positive"))]
    price: u64,
}

impl Command for CreateProduct {
    const NAME: &'static str = "product.create";
    type Output = String;
}

struct RenameProduct {
    id: String,
    name: String,
}

impl Command for RenameProduct {
    const NAME: &'static str = "product.rename";
    type Output = ();
}

struct GetProduct {
    id: String,
}

impl Query for GetProduct {
    const NAME: &'static str = "product.get";
    type Dto = Option<ProductDto>;
}

struct ListProducts {
    page: PageRequest,
}

impl Query for ListProducts {
    const NAME: &'static str = "product.list";
    type Dto = PaginatedList<ProductDto>;
}

struct ProductHandlers {
    uow: Arc<InMemoryDbContext>,
    products: InMemoryRepository<Product>,
}

#[async_trait]
impl CommandHandler<CreateProduct> for ProductHandlers {
    async fn handle(&self, ctx: &AppContext, cmd: CreateProduct) -> AppResult<String> {
        let id = ulid::Ulid::new().to_string();
        let mut product = Product::new(id.clone(), Version::new());
        product.name = cmd.name.clone();
        product.price = cmd.price;
        product.add_domain_event(ProductEvent::Created {
            id: ulid::Ulid::new().to_string(),
            name: cmd.name,
            price: cmd.price,
        });

        self.products.add(product).await?;
        self.uow.save_changes_with(ctx.event.clone()).await?;
        Ok(id)
    }
}

#[async_trait]
impl CommandHandler<RenameProduct> for ProductHandlers {
    async fn handle(&self, ctx: &AppContext, cmd: RenameProduct) -> AppResult<()> {
        let mut product = self
            .products
            .get_by_id(&cmd.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product#{}", cmd.id)))?;

        let from = std::mem::replace(&mut product.name, cmd.name.clone());
        product.add_domain_event(ProductEvent::Renamed {
            id: ulid::Ulid::new().to_string(),
            from,
            to: cmd.name,
        });

        self.products.update(product).await?;
        self.uow.save_changes_with(ctx.event.clone()).await?;
        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetProduct> for ProductHandlers {
    async fn handle(&self, _ctx: &AppContext, q: GetProduct) -> AppResult<Option<ProductDto>> {
        Ok(self.products.get_by_id(&q.id).await?.map(ProductDto::from))
    }
}

#[async_trait]
impl QueryHandler<ListProducts> for ProductHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: ListProducts,
    ) -> AppResult<PaginatedList<ProductDto>> {
        let spec = QuerySpecification::all().order_by(|p: &Product| p.name.clone());
        let page = self.products.page(&spec, q.page).await?;
        Ok(page.map(ProductDto::from))
    }
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<SerializedEvent>>>,
}

#[async_trait]
impl EventHandler for Recorder {
    fn handler_name(&self) -> &str {
        "recorder"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::All
    }

    async fn handle(&self, event: &SerializedEvent) -> AnyResult<()> {
        self.seen.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct App {
    mediator: Mediator,
    uow: Arc<InMemoryDbContext>,
    events: Recorder,
}

fn app() -> App {
    let events = Recorder::default();
    let handlers: Vec<Arc<dyn EventHandler>> = vec![Arc::new(events.clone())];
    let interceptors: Vec<Arc<dyn SaveChangesInterceptor>> = vec![
        Arc::new(AuditableEntityInterceptor::default()),
        Arc::new(DispatchDomainEventsInterceptor::new(Arc::new(
            InProcessEventDispatcher::new(handlers),
        ))),
    ];
    let uow = Arc::new(InMemoryDbContext::new(interceptors));
    let handlers = Arc::new(ProductHandlers {
        uow: uow.clone(),
        products: InMemoryRepository::new(uow.clone()),
    });

    let validation = Arc::new(ValidationBehavior::new().with_derived::<CreateProduct>());
    validation.add_validator::<RenameProduct, _>(|cmd: &RenameProduct| {
        if cmd.name.trim().is_empty() {
            Err(kernel_application::validation::ValidationErrors::single(
                "name",
                "name is required",
            ))
        } else {
            Ok(())
        }
    });

    let mediator = Mediator::with_default_pipeline(&PipelineConfig::default(), validation);
    mediator
        .register_command::<CreateProduct, _>(handlers.clone())
        .unwrap();
    mediator
        .register_command::<RenameProduct, _>(handlers.clone())
        .unwrap();
    mediator.register_query::<GetProduct, _>(handlers.clone()).unwrap();
    mediator.register_query::<ListProducts, _>(handlers).unwrap();

    App {
        mediator,
        uow,
        events,
    }
}

fn ctx(correlation_id: &str) -> AppContext {
    AppContext::builder()
        .event(
            EventContext::builder()
                .correlation_id(correlation_id.to_string())
                .actor_id("u-1".to_string())
                .build(),
        )
        .build()
}

#[tokio::test]
async fn command_and_query_flow_through_the_pipeline() -> AppResult<()> {
    let app = app();

    let id = CommandBus::dispatch(
        &app.mediator,
        &ctx("cor-1"),
        CreateProduct {
            name: "keyboard".into(),
            price: 120,
        },
    )
    .await?;

    let dto = QueryBus::dispatch(&app.mediator, &ctx("cor-2"), GetProduct { id: id.clone() })
        .await?
        .expect("product stored");
    assert_eq!(dto.name, "keyboard");
    assert_eq!(dto.version, 1);
    assert_eq!(dto.created_by.as_deref(), Some("u-1"));

    CommandBus::dispatch(
        &app.mediator,
        &ctx("cor-3"),
        RenameProduct {
            id: id.clone(),
            name: "mechanical keyboard".into(),
        },
    )
    .await?;

    let seen = app.events.seen.lock().unwrap().clone();
    let summary: Vec<(&str, usize, Option<&str>)> = seen
        .iter()
        .map(|e| (e.event_type(), e.aggregate_version(), e.correlation_id()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ProductEvent.Created", 1, Some("cor-1")),
            ("ProductEvent.Renamed", 2, Some("cor-3")),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn invalid_command_reports_every_failure_and_skips_the_handler() {
    let app = app();

    let err = CommandBus::dispatch(
        &app.mediator,
        &ctx("cor-1"),
        CreateProduct {
            name: String::new(),
            price: 0,
        },
    )
    .await
    .unwrap_err();

    let AppError::Validation(errors) = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(errors.messages("name"), ["name is required"]);
    assert_eq!(errors.messages("price"), ["price must be positive"]);
    assert!(app.uow.rows::<Product>().await.unwrap().is_empty());
    assert!(app.events.seen.lock().unwrap().is_empty());

    let outcome = Outcome::from(Err::<String, _>(err));
    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.errors,
        vec!["name: name is required", "price: price must be positive"]
    );
}

#[tokio::test]
async fn missing_aggregate_surfaces_as_not_found() {
    let app = app();

    let result = CommandBus::dispatch(
        &app.mediator,
        &ctx("cor-1"),
        RenameProduct {
            id: "ghost".into(),
            name: "anything".into(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(ref what)) if what == "product#ghost"));

    let outcome: Outcome<()> = result.into();
    assert_eq!(outcome.errors, vec!["not found: product#ghost"]);
}

#[tokio::test]
async fn list_query_returns_a_page_of_dtos() -> AppResult<()> {
    let app = app();
    for (name, price) in [("mouse", 20), ("desk", 300), ("lamp", 45)] {
        CommandBus::dispatch(
            &app.mediator,
            &ctx("seed"),
            CreateProduct {
                name: name.into(),
                price,
            },
        )
        .await?;
    }

    let page = QueryBus::dispatch(
        &app.mediator,
        &AppContext::default(),
        ListProducts {
            page: PageRequest::new(1, 2)?,
        },
    )
    .await?;

    let names: Vec<&str> = page.items().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["desk", "lamp"]);
    assert_eq!(page.total_count(), 3);
    assert_eq!(page.total_pages(), 2);
    assert!(page.has_next_page());
    assert!(!page.has_previous_page());
    Ok(())
}

struct Sleep(u64);

impl Command for Sleep {
    const NAME: &'static str = "sleep";
    type Output = ();
}

struct SleepHandler;

#[async_trait]
impl CommandHandler<Sleep> for SleepHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: Sleep) -> AppResult<()> {
        tokio::time::sleep(Duration::from_millis(cmd.0)).await;
        Ok(())
    }
}

#[tokio::test]
async fn slow_requests_are_counted_above_the_threshold() -> AppResult<()> {
    let performance = Arc::new(PerformanceBehavior::new(PerformanceConfig {
        threshold_ms: 20,
    }));
    let mediator = Mediator::new().with_behavior(performance.clone());
    mediator.register_command::<Sleep, _>(Arc::new(SleepHandler))?;

    let ctx = AppContext::default();
    CommandBus::dispatch(&mediator, &ctx, Sleep(0)).await?;
    assert_eq!(performance.slow_requests(), 0);

    CommandBus::dispatch(&mediator, &ctx, Sleep(60)).await?;
    assert_eq!(performance.slow_requests(), 1);
    Ok(())
}
