//! 规约模式（Specification）
//!
//! 将业务规则封装为可组合的谓词（AND/OR/NOT），并通过 `QuerySpecification`
//! 附加排序与分页，供仓储查询使用。
//!
use crate::pagination::PageRequest;
use std::cmp::Ordering;

/// 规约模式的核心 trait
///
/// 用于封装业务规则，使其可复用、可组合和可测试
pub trait Specification<T>: Send + Sync {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 与另一个规约进行 AND 组合
    fn and<S>(self, other: S) -> AndSpecification<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        AndSpecification::new(Box::new(self), Box::new(other))
    }

    /// 与另一个规约进行 OR 组合
    fn or<S>(self, other: S) -> OrSpecification<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        OrSpecification::new(Box::new(self), Box::new(other))
    }

    /// 对规约进行 NOT 操作
    fn not(self) -> NotSpecification<T>
    where
        Self: Sized + 'static,
    {
        NotSpecification::new(Box::new(self))
    }
}

/// 为 Box<dyn Specification<T>> 实现 Specification trait
/// 使得可以直接使用 Box 类型的规约
impl<T> Specification<T> for Box<dyn Specification<T>> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.as_ref().is_satisfied_by(candidate)
    }
}

/// AND 组合规约
///
/// 当两个规约都满足时，组合规约才满足
pub struct AndSpecification<T> {
    left: Box<dyn Specification<T>>,
    right: Box<dyn Specification<T>>,
}

impl<T> AndSpecification<T> {
    pub fn new(left: Box<dyn Specification<T>>, right: Box<dyn Specification<T>>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for AndSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// OR 组合规约
///
/// 当任意一个规约满足时，组合规约就满足
pub struct OrSpecification<T> {
    left: Box<dyn Specification<T>>,
    right: Box<dyn Specification<T>>,
}

impl<T> OrSpecification<T> {
    pub fn new(left: Box<dyn Specification<T>>, right: Box<dyn Specification<T>>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for OrSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) || self.right.is_satisfied_by(candidate)
    }
}

/// NOT 规约
///
/// 当内部规约不满足时，NOT 规约才满足
pub struct NotSpecification<T> {
    inner: Box<dyn Specification<T>>,
}

impl<T> NotSpecification<T> {
    pub fn new(inner: Box<dyn Specification<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Specification<T> for NotSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}

/// 恒为真的规约（不做过滤）
pub struct AnySpecification;

impl<T> Specification<T> for AnySpecification {
    fn is_satisfied_by(&self, _candidate: &T) -> bool {
        true
    }
}

/// 由闭包构成的规约
pub struct PredicateSpecification<F> {
    predicate: F,
}

impl<F> PredicateSpecification<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<T, F> Specification<T> for PredicateSpecification<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }
}

/// 以闭包快速构造规约
///
/// ```
/// use kernel_domain::specification::{Specification, spec_fn};
///
/// let even = spec_fn(|n: &i32| n % 2 == 0);
/// let positive = spec_fn(|n: &i32| *n > 0);
/// let spec = even.and(positive);
///
/// assert!(spec.is_satisfied_by(&4));
/// assert!(!spec.is_satisfied_by(&-4));
/// ```
pub fn spec_fn<T, F>(predicate: F) -> PredicateSpecification<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    PredicateSpecification::new(predicate)
}

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// 查询规约：过滤条件 + 排序键 + 分页
///
/// 排序键按添加顺序依次比较（稳定、多键）；
/// `evaluate` 的执行顺序为 过滤 → 排序 → 跳过/截取。
pub struct QuerySpecification<T> {
    criteria: Option<Box<dyn Specification<T>>>,
    order: Vec<Comparator<T>>,
    skip: Option<usize>,
    take: Option<usize>,
}

impl<T> Default for QuerySpecification<T> {
    fn default() -> Self {
        Self {
            criteria: None,
            order: Vec::new(),
            skip: None,
            take: None,
        }
    }
}

impl<T: 'static> QuerySpecification<T> {
    /// 不带过滤条件的查询
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<S>(criteria: S) -> Self
    where
        S: Specification<T> + 'static,
    {
        Self::default().filter(criteria)
    }

    /// 追加过滤条件，已有条件时以 AND 组合
    pub fn filter<S>(mut self, criteria: S) -> Self
    where
        S: Specification<T> + 'static,
    {
        self.criteria = Some(match self.criteria.take() {
            Some(existing) => Box::new(AndSpecification::new(existing, Box::new(criteria))),
            None => Box::new(criteria),
        });
        self
    }

    /// 按键升序
    pub fn order_by<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.order.push(Box::new(move |a, b| key(a).cmp(&key(b))));
        self
    }

    /// 按键降序
    pub fn order_by_desc<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.order.push(Box::new(move |a, b| key(b).cmp(&key(a))));
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// 以页请求设置跳过/截取
    pub fn paginate(self, page: PageRequest) -> Self {
        self.skip(page.offset()).take(page.page_size())
    }
}

impl<T> QuerySpecification<T> {
    pub fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.criteria
            .as_ref()
            .is_none_or(|c| c.is_satisfied_by(candidate))
    }

    pub fn is_ordered(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }

    /// 去掉分页，保留过滤与排序
    pub fn without_paging(mut self) -> Self {
        self.skip = None;
        self.take = None;
        self
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.order
            .iter()
            .map(|cmp| cmp(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// 过滤并排序，不分页
    pub fn filter_and_sort<I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut matched: Vec<T> = items
            .into_iter()
            .filter(|item| self.is_satisfied_by(item))
            .collect();

        if self.is_ordered() {
            matched.sort_by(|a, b| self.compare(a, b));
        }

        matched
    }

    /// 过滤、排序后分页
    pub fn evaluate<I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        self.filter_and_sort(items)
            .into_iter()
            .skip(self.skip.unwrap_or(0))
            .take(self.take.unwrap_or(usize::MAX))
            .collect()
    }

    /// 满足条件的数量（忽略分页）
    pub fn count<'a, I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        items
            .into_iter()
            .filter(|item| self.is_satisfied_by(item))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysTrueSpec;
    impl Specification<i32> for AlwaysTrueSpec {
        fn is_satisfied_by(&self, _: &i32) -> bool {
            true
        }
    }

    struct AlwaysFalseSpec;
    impl Specification<i32> for AlwaysFalseSpec {
        fn is_satisfied_by(&self, _: &i32) -> bool {
            false
        }
    }

    #[test]
    fn test_and_specification() {
        let spec = AlwaysTrueSpec.and(AlwaysTrueSpec);
        assert!(spec.is_satisfied_by(&42));

        let spec = AlwaysTrueSpec.and(AlwaysFalseSpec);
        assert!(!spec.is_satisfied_by(&42));

        let spec = AlwaysFalseSpec.and(AlwaysFalseSpec);
        assert!(!spec.is_satisfied_by(&42));
    }

    #[test]
    fn test_or_specification() {
        let spec = AlwaysTrueSpec.or(AlwaysTrueSpec);
        assert!(spec.is_satisfied_by(&42));

        let spec = AlwaysTrueSpec.or(AlwaysFalseSpec);
        assert!(spec.is_satisfied_by(&42));

        let spec = AlwaysFalseSpec.or(AlwaysFalseSpec);
        assert!(!spec.is_satisfied_by(&42));
    }

    #[test]
    fn test_not_specification() {
        let spec = AlwaysTrueSpec.not();
        assert!(!spec.is_satisfied_by(&42));

        let spec = AlwaysFalseSpec.not();
        assert!(spec.is_satisfied_by(&42));
    }

    #[test]
    fn test_nested_composition_with_closures() {
        let in_range = spec_fn(|n: &i32| (10..=20).contains(n));
        let odd = spec_fn(|n: &i32| n % 2 != 0);
        let spec = in_range.and(odd.not()).or(spec_fn(|n: &i32| *n == 99));

        assert!(spec.is_satisfied_by(&12));
        assert!(!spec.is_satisfied_by(&13));
        assert!(!spec.is_satisfied_by(&22));
        assert!(spec.is_satisfied_by(&99));
        assert!(Specification::<i32>::is_satisfied_by(&AnySpecification, &-1));
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        group: u8,
        score: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "a", group: 2, score: 10 },
            Row { name: "b", group: 1, score: 30 },
            Row { name: "c", group: 2, score: 30 },
            Row { name: "d", group: 1, score: 10 },
            Row { name: "e", group: 3, score: 5 },
        ]
    }

    #[test]
    fn query_filters_sorts_by_multiple_keys_and_pages() {
        let query = QuerySpecification::new(spec_fn(|r: &Row| r.score >= 10))
            .order_by(|r: &Row| r.group)
            .order_by_desc(|r: &Row| r.score)
            .skip(1)
            .take(2);

        let names: Vec<_> = query.evaluate(rows()).into_iter().map(|r| r.name).collect();
        // 排序结果：b(1,30) d(1,10) c(2,30) a(2,10)
        assert_eq!(names, vec!["d", "c"]);

        let data = rows();
        assert_eq!(query.count(&data), 4);
    }

    #[test]
    fn query_sort_is_stable_for_equal_keys() {
        let query = QuerySpecification::all().order_by(|r: &Row| r.score);
        let names: Vec<_> = query.evaluate(rows()).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["e", "a", "d", "b", "c"]);
    }

    #[test]
    fn filters_accumulate_with_and() {
        let query = QuerySpecification::all()
            .filter(spec_fn(|r: &Row| r.group == 2))
            .filter(spec_fn(|r: &Row| r.score > 10));

        let found = query.evaluate(rows());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "c");
    }

    #[test]
    fn paginate_uses_page_offset() {
        let page = PageRequest::new(2, 2).unwrap();
        let query = QuerySpecification::all()
            .order_by(|r: &Row| r.name)
            .paginate(page);

        assert!(query.is_paged());
        let names: Vec<_> = query.evaluate(rows()).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["c", "d"]);

        let unpaged = query.without_paging();
        assert_eq!(unpaged.evaluate(rows()).len(), 5);
    }
}
