//! 通用仓储（Repository）
//!
//! 读接口只看到已提交的数据；写接口只登记变更，
//! 真正的写入发生在 `UnitOfWork::save_changes`。
//!
use crate::{
    aggregate_root::AggregateRoot,
    error::DomainResult as Result,
    pagination::{PageRequest, PaginatedList},
    specification::QuerySpecification,
};
use async_trait::async_trait;

#[async_trait]
pub trait ReadRepository<A>: Send + Sync
where
    A: AggregateRoot,
{
    async fn get_by_id(&self, id: &A::Id) -> Result<Option<A>>;

    /// 按查询规约过滤、排序、分页
    async fn list(&self, spec: &QuerySpecification<A>) -> Result<Vec<A>>;

    async fn list_all(&self) -> Result<Vec<A>> {
        let spec = QuerySpecification::all();
        self.list(&spec).await
    }

    /// 第一条满足规约的聚合（遵循规约中的排序）
    async fn first_or_default(&self, spec: &QuerySpecification<A>) -> Result<Option<A>> {
        Ok(self.list(spec).await?.into_iter().next())
    }

    /// 满足过滤条件的数量（忽略分页）
    async fn count(&self, spec: &QuerySpecification<A>) -> Result<usize>;

    async fn any(&self, spec: &QuerySpecification<A>) -> Result<bool> {
        Ok(self.count(spec).await? > 0)
    }

    /// 以页请求取数据；规约中的跳过/截取被忽略
    async fn page(&self, spec: &QuerySpecification<A>, page: PageRequest)
    -> Result<PaginatedList<A>>;
}

#[async_trait]
pub trait Repository<A>: ReadRepository<A>
where
    A: AggregateRoot,
{
    async fn add(&self, aggregate: A) -> Result<()>;

    async fn add_range(&self, aggregates: Vec<A>) -> Result<()> {
        for aggregate in aggregates {
            self.add(aggregate).await?;
        }
        Ok(())
    }

    async fn update(&self, aggregate: A) -> Result<()>;

    async fn delete(&self, aggregate: A) -> Result<()>;

    /// 按标识登记删除；聚合不存在时返回 `false`
    async fn delete_by_id(&self, id: &A::Id) -> Result<bool>;
}
