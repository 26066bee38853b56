//! 订单生命周期示例
//!
//! 演示：聚合记录领域事件 -> 仓储登记变更 -> 工作单元保存时由拦截器写入审计信息并分发事件。
//!
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use kernel_domain::aggregate_root::AggregateRoot;
use kernel_domain::domain_event::EventContext;
use kernel_domain::entity::Entity;
use kernel_domain::eventing::{EventHandler, HandledEventType, InProcessEventDispatcher};
use kernel_domain::pagination::PageRequest;
use kernel_domain::persist::{
    AuditableEntityInterceptor, DispatchDomainEventsInterceptor, InMemoryDbContext,
    InMemoryRepository, ReadRepository, Repository, SaveChangesInterceptor, SerializedEvent,
    UnitOfWork,
};
use kernel_domain::specification::{QuerySpecification, spec_fn};
use kernel_domain::value_object::Version;
use kernel_domain::{aggregate_root, domain_event, entity_id};
use std::sync::Arc;
use tracing::info;

#[entity_id]
struct OrderId(String);

#[domain_event]
enum OrderEvent {
    Placed { customer: String, total: u64 },
    Paid { amount: u64 },
    #[event(event_type = "order.shipped")]
    Shipped,
}

#[aggregate_root(event = OrderEvent, id = OrderId, type_name = "order", auditable)]
struct Order {
    customer: String,
    total: u64,
    paid: bool,
    shipped: bool,
}

impl Order {
    fn place(id: &str, customer: &str, total: u64) -> Self {
        let mut order = Order::new(OrderId::new(id.to_string()), Version::new());
        order.customer = customer.to_string();
        order.total = total;
        order.add_domain_event(OrderEvent::Placed {
            id: ulid::Ulid::new().to_string(),
            customer: customer.to_string(),
            total,
        });
        order
    }

    fn pay(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.paid, "order already paid");
        self.paid = true;
        self.add_domain_event(OrderEvent::Paid {
            id: ulid::Ulid::new().to_string(),
            amount: self.total,
        });
        Ok(())
    }

    fn ship(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(self.paid, "order not paid");
        self.shipped = true;
        self.add_domain_event(OrderEvent::Shipped {
            id: ulid::Ulid::new().to_string(),
        });
        Ok(())
    }
}

struct NotificationHandler;

#[async_trait]
impl EventHandler for NotificationHandler {
    fn handler_name(&self) -> &str {
        "notification"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::All
    }

    async fn handle(&self, event: &SerializedEvent) -> AnyResult<()> {
        info!(
            event_type = event.event_type(),
            aggregate_id = event.aggregate_id(),
            version = event.aggregate_version(),
            "notify"
        );
        Ok(())
    }
}

struct ShippingHandler;

#[async_trait]
impl EventHandler for ShippingHandler {
    fn handler_name(&self) -> &str {
        "shipping"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One("order.shipped".to_string())
    }

    async fn handle(&self, event: &SerializedEvent) -> AnyResult<()> {
        let payload: OrderEvent = event.decode()?;
        info!(?payload, "prepare shipment");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kernel_domain=debug".into()),
        )
        .init();

    let handlers: Vec<Arc<dyn EventHandler>> =
        vec![Arc::new(NotificationHandler), Arc::new(ShippingHandler)];
    let dispatcher = InProcessEventDispatcher::new(handlers);
    let interceptors: Vec<Arc<dyn SaveChangesInterceptor>> = vec![
        Arc::new(AuditableEntityInterceptor::default()),
        Arc::new(DispatchDomainEventsInterceptor::new(Arc::new(dispatcher))),
    ];
    let ctx = Arc::new(InMemoryDbContext::new(interceptors));
    let orders = InMemoryRepository::<Order>::new(ctx.clone());

    orders.add(Order::place("o-1", "alice", 120)).await?;
    orders.add(Order::place("o-2", "bob", 80)).await?;
    orders.add(Order::place("o-3", "alice", 45)).await?;
    let context = EventContext::builder()
        .correlation_id("checkout-1".to_string())
        .actor_id("alice".to_string())
        .build();
    let rows = ctx.save_changes_with(context).await?;
    info!(rows, "orders placed");

    let id = OrderId::new("o-1".to_string());
    if let Some(mut order) = orders.get_by_id(&id).await? {
        order.pay()?;
        order.ship()?;
        orders.update(order).await?;
    }
    ctx.save_changes().await?;

    let alice = QuerySpecification::new(spec_fn(|o: &Order| o.customer == "alice"))
        .order_by_desc(|o: &Order| o.total);
    for order in orders.list(&alice).await? {
        info!(
            id = %order.id(),
            total = order.total,
            shipped = order.shipped,
            version = order.version().value(),
            created_by = order.audit().and_then(|a| a.created_by()),
            "alice's order"
        );
    }

    let page = orders
        .page(&QuerySpecification::all(), PageRequest::new(1, 2)?)
        .await?;
    info!(
        total = page.total_count(),
        pages = page.total_pages(),
        has_next = page.has_next_page(),
        "first page"
    );

    Ok(())
}
