//! 分页（Pagination）
//!
//! `PageRequest` 描述请求的页（页码从 1 开始），
//! `PaginatedList` 为一页数据及总数信息。
//!
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// 单页允许的最大条数，超出部分会被截断
pub const MAX_PAGE_SIZE: usize = 100;

/// 分页请求
///
/// 反序列化同样经过 `PageRequest::new` 的校验与截断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page_number: usize,
    page_size: usize,
}

impl PageRequest {
    /// 页码与每页条数都必须大于 0；每页条数上限为 `MAX_PAGE_SIZE`
    pub fn new(page_number: usize, page_size: usize) -> DomainResult<Self> {
        if page_number == 0 {
            return Err(DomainError::invalid_value("page_number must be >= 1"));
        }
        if page_size == 0 {
            return Err(DomainError::invalid_value("page_size must be >= 1"));
        }

        Ok(Self {
            page_number,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    /// 第一页
    pub fn first(page_size: usize) -> DomainResult<Self> {
        Self::new(1, page_size)
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 需要跳过的条数
    pub fn offset(&self) -> usize {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

#[derive(Deserialize)]
struct RawPageRequest {
    #[serde(default = "default_page_number")]
    page_number: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
}

fn default_page_number() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = DomainError;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(raw.page_number, raw.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    items: Vec<T>,
    page_number: usize,
    page_size: usize,
    total_count: usize,
    total_pages: usize,
}

impl<T> PaginatedList<T> {
    /// 以已取出的一页数据与总数构造
    pub fn new(items: Vec<T>, total_count: usize, page: PageRequest) -> Self {
        Self {
            items,
            page_number: page.page_number(),
            page_size: page.page_size(),
            total_count,
            total_pages: total_count.div_ceil(page.page_size()),
        }
    }

    /// 从已排序的完整数据源中截取一页
    pub fn create<I>(source: I, page: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let all: Vec<T> = source.into_iter().collect();
        let total_count = all.len();
        let items = all
            .into_iter()
            .skip(page.offset())
            .take(page.page_size())
            .collect();

        Self::new(items, total_count, page)
    }

    /// 空页
    pub fn empty(page: PageRequest) -> Self {
        Self::new(Vec::new(), 0, page)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// 转换每一项，分页信息保持不变
    pub fn map<U, F>(self, f: F) -> PaginatedList<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_rejects_zero_and_caps_size() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            PageRequest::new(1, 0),
            Err(DomainError::InvalidValue { .. })
        ));

        let page = PageRequest::new(3, 500).unwrap();
        assert_eq!(page.page_size(), MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn deserialize_goes_through_validation() {
        assert!(serde_json::from_str::<PageRequest>(r#"{"page_number":0,"page_size":5}"#).is_err());
        assert!(serde_json::from_str::<PageRequest>(r#"{"page_size":0}"#).is_err());

        let capped: PageRequest = serde_json::from_str(r#"{"page_size":500}"#).unwrap();
        assert_eq!(capped.page_number(), 1);
        assert_eq!(capped.page_size(), MAX_PAGE_SIZE);

        let page: PageRequest = serde_json::from_str(r#"{"page_number":2,"page_size":3}"#).unwrap();
        assert_eq!(page, PageRequest::new(2, 3).unwrap());
        assert_eq!(serde_json::from_str::<PageRequest>("{}").unwrap(), PageRequest::default());
    }

    #[test]
    fn create_slices_source_and_counts_pages() {
        let page = PageRequest::new(2, 3).unwrap();
        let list = PaginatedList::create(1..=10, page);

        assert_eq!(list.items(), &[4, 5, 6]);
        assert_eq!(list.total_count(), 10);
        assert_eq!(list.total_pages(), 4);
        assert!(list.has_previous_page());
        assert!(list.has_next_page());
    }

    #[test]
    fn last_and_out_of_range_pages() {
        let last = PaginatedList::create(1..=10, PageRequest::new(4, 3).unwrap());
        assert_eq!(last.items(), &[10]);
        assert!(!last.has_next_page());

        let beyond = PaginatedList::create(1..=10, PageRequest::new(9, 3).unwrap());
        assert!(beyond.items().is_empty());
        assert_eq!(beyond.total_count(), 10);

        let empty: PaginatedList<i32> = PaginatedList::empty(PageRequest::default());
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_previous_page());
        assert!(!empty.has_next_page());
    }

    #[test]
    fn map_keeps_page_info_and_serializes() {
        let list = PaginatedList::create(vec![1, 2, 3], PageRequest::first(2).unwrap())
            .map(|n| format!("#{n}"));

        assert_eq!(list.items(), &["#1".to_string(), "#2".to_string()]);
        assert_eq!(list.total_pages(), 2);

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["total_count"], 3);
        assert_eq!(json["page_number"], 1);
        assert_eq!(json["items"][1], "#2");
    }
}
