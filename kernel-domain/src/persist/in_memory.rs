//! 内存版数据上下文与仓储
//!
//! `InMemoryDbContext` 以 `聚合类型 -> (标识 -> 存储行)` 的表结构保存已提交的数据，
//! 并持有变更跟踪器与拦截器列表，实现 `UnitOfWork`：
//!
//! 1. 取出被跟踪的变更，依次执行拦截器的 `saving_changes`；
//! 2. 校验全部变更（主键冲突、乐观并发），全部通过后一次性写入；
//! 3. 依次执行拦截器的 `saved_changes`，清空跟踪器。
//!
//! 第 1、2 步失败时数据不变，变更放回跟踪器，调用方可以重试或丢弃。
//!
use crate::{
    aggregate_root::AggregateRoot,
    domain_event::EventContext,
    error::{DomainError, DomainResult as Result},
    pagination::{PageRequest, PaginatedList},
    persist::{
        ChangeTracker, EntityState, ReadRepository, Repository, SaveChangesContext,
        SaveChangesInterceptor, SerializedSnapshot, TrackedEntry, UnitOfWork,
    },
    specification::QuerySpecification,
};
use async_trait::async_trait;
use bon::Builder;
use std::{
    collections::{BTreeMap, HashMap},
    marker::PhantomData,
    sync::Arc,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

type Table = BTreeMap<String, SerializedSnapshot>;
type Tables = HashMap<String, Table>;

#[derive(Builder)]
pub struct InMemoryDbContext {
    #[builder(default)]
    interceptors: Vec<Arc<dyn SaveChangesInterceptor>>,
    #[builder(skip)]
    tables: RwLock<Tables>,
    #[builder(skip)]
    tracker: Mutex<ChangeTracker>,
    #[builder(skip)]
    transaction: Mutex<Option<Tables>>,
}

impl Default for InMemoryDbContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl InMemoryDbContext {
    pub fn new(interceptors: Vec<Arc<dyn SaveChangesInterceptor>>) -> Self {
        Self::builder().interceptors(interceptors).build()
    }

    /// 登记聚合变更
    pub async fn track<A>(&self, aggregate: A, state: EntityState)
    where
        A: AggregateRoot,
    {
        self.tracker
            .lock()
            .await
            .track(TrackedEntry::new(aggregate, state));
    }

    /// 以未修改状态登记：不写入，但保存时仍会取出其事件
    pub async fn attach<A>(&self, aggregate: A)
    where
        A: AggregateRoot,
    {
        self.track(aggregate, EntityState::Unchanged).await;
    }

    pub async fn has_changes(&self) -> bool {
        self.tracker.lock().await.has_changes()
    }

    /// 丢弃全部未保存的变更
    pub async fn discard_changes(&self) {
        self.tracker.lock().await.clear();
    }

    pub async fn in_transaction(&self) -> bool {
        self.transaction.lock().await.is_some()
    }

    /// 读取已提交的聚合
    pub async fn find<A>(&self, id: &str) -> Result<Option<A>>
    where
        A: AggregateRoot,
    {
        let tables = self.tables.read().await;
        tables
            .get(A::TYPE)
            .and_then(|table| table.get(id))
            .map(|row| row.to_aggregate::<A>())
            .transpose()
    }

    /// 读取某类型的全部已提交聚合（按标识排序）
    pub async fn rows<A>(&self) -> Result<Vec<A>>
    where
        A: AggregateRoot,
    {
        let tables = self.tables.read().await;
        tables
            .get(A::TYPE)
            .map(|table| {
                table
                    .values()
                    .map(|row| row.to_aggregate::<A>())
                    .collect::<Result<Vec<_>>>()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// 已提交的存储行版本
    pub async fn stored_version(&self, aggregate_type: &str, id: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables
            .get(aggregate_type)
            .and_then(|table| table.get(id))
            .map(|row| row.aggregate_version())
    }

    async fn run_saving(&self, ctx: &mut SaveChangesContext) -> Result<()> {
        for interceptor in &self.interceptors {
            interceptor.saving_changes(ctx).await.inspect_err(|err| {
                warn!(interceptor = interceptor.name(), error = %err, "saving_changes failed");
            })?;
        }
        Ok(())
    }

    async fn run_saved(&self, ctx: &mut SaveChangesContext) -> Result<()> {
        for interceptor in &self.interceptors {
            interceptor.saved_changes(ctx).await.inspect_err(|err| {
                warn!(interceptor = interceptor.name(), error = %err, "saved_changes failed");
            })?;
        }
        Ok(())
    }

    /// 校验并一次性写入；任一校验失败时不做任何修改
    async fn write(&self, entries: &mut [TrackedEntry]) -> Result<usize> {
        let mut tables = self.tables.write().await;

        for entry in entries.iter() {
            check(&tables, entry)?;
        }

        let mut writes: Vec<(&'static str, String, Option<SerializedSnapshot>)> = Vec::new();
        for entry in entries.iter_mut() {
            let (ty, id) = (entry.aggregate_type(), entry.aggregate_id());
            match entry.state() {
                EntityState::Unchanged => {}
                EntityState::Deleted => writes.push((ty, id, None)),
                EntityState::Added | EntityState::Modified => {
                    let committed = entry.committed_version();
                    let original = entry.original_version();
                    let aggregate = entry.aggregate_mut();
                    aggregate.assign_version(committed);
                    let snapshot = aggregate.to_snapshot();
                    aggregate.assign_version(original);
                    writes.push((ty, id, Some(snapshot?)));
                }
            }
        }

        let affected = writes.len();
        for (ty, id, row) in writes {
            let table = tables.entry(ty.to_string()).or_default();
            match row {
                Some(row) => {
                    table.insert(id, row);
                }
                None => {
                    table.remove(&id);
                }
            }
        }

        Ok(affected)
    }
}

fn check(tables: &Tables, entry: &TrackedEntry) -> Result<()> {
    let aggregate_type = entry.aggregate_type();
    let aggregate_id = entry.aggregate_id();
    let stored = tables
        .get(aggregate_type)
        .and_then(|table| table.get(&aggregate_id));

    match entry.state() {
        EntityState::Unchanged => Ok(()),
        EntityState::Added => match stored {
            Some(_) => Err(DomainError::Conflict {
                aggregate_type: aggregate_type.to_string(),
                aggregate_id,
            }),
            None => Ok(()),
        },
        EntityState::Modified | EntityState::Deleted => {
            let Some(row) = stored else {
                return Err(DomainError::not_found(format!(
                    "{aggregate_type}#{aggregate_id}"
                )));
            };
            let expected = entry.original_version().value();
            if row.aggregate_version() != expected {
                return Err(DomainError::VersionConflict {
                    aggregate_type: aggregate_type.to_string(),
                    aggregate_id,
                    expected,
                    actual: row.aggregate_version(),
                });
            }
            Ok(())
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryDbContext {
    async fn save_changes_with(&self, context: EventContext) -> Result<usize> {
        let entries = self.tracker.lock().await.take();
        let mut ctx = SaveChangesContext::new(entries, context);

        debug!(
            entries = ctx.entries().len(),
            correlation_id = ctx.event_context().correlation_id(),
            "saving changes"
        );

        let written = match self.run_saving(&mut ctx).await {
            Ok(()) => self.write(ctx.entries_mut()).await,
            Err(err) => Err(err),
        };

        let affected = match written {
            Ok(affected) => affected,
            Err(err) => {
                for interceptor in &self.interceptors {
                    interceptor.save_changes_failed(&ctx, &err).await;
                }
                self.tracker.lock().await.restore(ctx.into_entries());
                return Err(err);
            }
        };

        // 数据已提交：无论后续拦截器结果如何，这批变更都不再保留
        ctx.set_affected_rows(affected);
        let result = self.run_saved(&mut ctx).await;

        debug!(affected, "changes saved");
        result.map(|()| affected)
    }

    async fn begin_transaction(&self) -> Result<()> {
        let mut tx = self.transaction.lock().await;
        if tx.is_some() {
            return Err(DomainError::invalid_state("transaction already active"));
        }
        *tx = Some(self.tables.read().await.clone());
        debug!("transaction started");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut tx = self.transaction.lock().await;
        if tx.take().is_none() {
            return Err(DomainError::invalid_state("no active transaction"));
        }
        debug!("transaction committed");
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut tx = self.transaction.lock().await;
        let Some(snapshot) = tx.take() else {
            return Err(DomainError::invalid_state("no active transaction"));
        };
        *self.tables.write().await = snapshot;
        self.tracker.lock().await.clear();
        debug!("transaction rolled back");
        Ok(())
    }
}

/// 基于 `InMemoryDbContext` 的通用仓储
pub struct InMemoryRepository<A> {
    context: Arc<InMemoryDbContext>,
    _marker: PhantomData<fn() -> A>,
}

impl<A> Clone for InMemoryRepository<A> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            _marker: PhantomData,
        }
    }
}

impl<A> InMemoryRepository<A>
where
    A: AggregateRoot,
{
    pub fn new(context: Arc<InMemoryDbContext>) -> Self {
        Self {
            context,
            _marker: PhantomData,
        }
    }

    pub fn context(&self) -> &Arc<InMemoryDbContext> {
        &self.context
    }
}

#[async_trait]
impl<A> ReadRepository<A> for InMemoryRepository<A>
where
    A: AggregateRoot,
{
    async fn get_by_id(&self, id: &A::Id) -> Result<Option<A>> {
        self.context.find::<A>(&id.to_string()).await
    }

    async fn list(&self, spec: &QuerySpecification<A>) -> Result<Vec<A>> {
        let rows = self.context.rows::<A>().await?;
        Ok(spec.evaluate(rows))
    }

    async fn count(&self, spec: &QuerySpecification<A>) -> Result<usize> {
        let rows = self.context.rows::<A>().await?;
        Ok(spec.count(&rows))
    }

    async fn page(
        &self,
        spec: &QuerySpecification<A>,
        page: PageRequest,
    ) -> Result<PaginatedList<A>> {
        let rows = self.context.rows::<A>().await?;
        Ok(PaginatedList::create(spec.filter_and_sort(rows), page))
    }
}

#[async_trait]
impl<A> Repository<A> for InMemoryRepository<A>
where
    A: AggregateRoot,
{
    async fn add(&self, aggregate: A) -> Result<()> {
        self.context.track(aggregate, EntityState::Added).await;
        Ok(())
    }

    async fn update(&self, aggregate: A) -> Result<()> {
        self.context.track(aggregate, EntityState::Modified).await;
        Ok(())
    }

    async fn delete(&self, aggregate: A) -> Result<()> {
        self.context.track(aggregate, EntityState::Deleted).await;
        Ok(())
    }

    async fn delete_by_id(&self, id: &A::Id) -> Result<bool> {
        match self.get_by_id(id).await? {
            Some(aggregate) => {
                self.delete(aggregate).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
