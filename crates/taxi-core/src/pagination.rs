//! # Pagination
//!
//! Splits an ordered collection into fixed-size pages and selects one.
//!
//! Page selection never fails:
//!
//! - a missing or non-numeric page parameter selects page 1,
//! - `last` selects the last page,
//! - numbers below 1 clamp to page 1 and numbers past the end clamp to the
//!   last page.
//!
//! An empty collection still has one (empty) page.

use serde::Serialize;
use utoipa::ToSchema;

/// Records per page on every list view.
pub const PAGE_SIZE: usize = 5;

/// A requested page, as read from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// A 1-based page number. May be out of range; it is clamped on use.
    Number(i64),
    /// The last page, whatever its number.
    Last,
}

impl PageRequest {
    /// Interpret a raw `page` parameter.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("last") => Self::Last,
            Some(value) => value.parse().map(Self::Number).unwrap_or_default(),
            None => Self::default(),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::Number(1)
    }
}

/// An ordered collection ready to be split into pages.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    per_page: usize,
}

impl<T> Paginator<T> {
    /// Paginate `items` at `per_page` records per page (at least 1).
    pub fn new(items: Vec<T>, per_page: usize) -> Self {
        Self {
            items,
            per_page: per_page.max(1),
        }
    }

    /// Total number of records across all pages.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Number of pages; never less than 1.
    pub fn num_pages(&self) -> usize {
        self.count().div_ceil(self.per_page).max(1)
    }

    /// The valid 1-based page number a request resolves to.
    pub fn resolve(&self, request: PageRequest) -> usize {
        let last = self.num_pages();
        match request {
            PageRequest::Last => last,
            PageRequest::Number(n) if n < 1 => 1,
            PageRequest::Number(n) => usize::try_from(n).map_or(last, |n| n.min(last)),
        }
    }

    /// Consume the paginator and return the requested page.
    pub fn page(self, request: PageRequest) -> Page<T> {
        let number = self.resolve(request);
        let num_pages = self.num_pages();
        let count = self.count();
        let per_page = self.per_page;
        let start = (number - 1) * per_page;
        let object_list = self.items.into_iter().skip(start).take(per_page).collect();
        Page {
            object_list,
            number,
            num_pages,
            count,
            per_page,
        }
    }
}

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Records on this page, in collection order.
    pub object_list: Vec<T>,
    /// 1-based page number.
    pub number: usize,
    pub num_pages: usize,
    /// Total records across all pages.
    pub count: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Whether the collection spans more than one page.
    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    /// 1-based index of the first record on this page, 0 when empty.
    pub fn start_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last record on this page, 0 when empty.
    pub fn end_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.object_list.len() - 1
        }
    }

    /// Transform the records on this page, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }

    /// Serializable pagination metadata for this page.
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            start_index: self.start_index(),
            end_index: self.end_index(),
        }
    }
}

/// Pagination metadata returned alongside every list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub start_index: usize,
    pub end_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: u32) -> Vec<u32> {
        (1..=n).collect()
    }

    #[test]
    fn first_page_of_eight() {
        let page = Paginator::new(records(8), PAGE_SIZE).page(PageRequest::default());
        assert_eq!(page.object_list, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.num_pages, 2);
        assert!(page.has_other_pages());
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn second_page_holds_the_rest() {
        let page = Paginator::new(records(8), PAGE_SIZE).page(PageRequest::Number(2));
        assert_eq!(page.object_list, vec![6, 7, 8]);
        assert_eq!((page.start_index(), page.end_index()), (6, 8));
        assert!(page.has_other_pages());
        assert!(!page.has_next());
    }

    #[test]
    fn out_of_range_clamps() {
        let paginator = Paginator::new(records(8), PAGE_SIZE);
        assert_eq!(paginator.resolve(PageRequest::Number(0)), 1);
        assert_eq!(paginator.resolve(PageRequest::Number(-4)), 1);
        assert_eq!(paginator.resolve(PageRequest::Number(99)), 2);
        assert_eq!(paginator.resolve(PageRequest::Number(i64::MAX)), 2);
        assert_eq!(paginator.resolve(PageRequest::Last), 2);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let page = Paginator::new(Vec::<u32>::new(), PAGE_SIZE).page(PageRequest::Number(3));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.object_list.is_empty());
        assert!(!page.has_other_pages());
        assert_eq!((page.start_index(), page.end_index()), (0, 0));
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_page() {
        let paginator = Paginator::new(records(10), PAGE_SIZE);
        assert_eq!(paginator.num_pages(), 2);
        let page = paginator.page(PageRequest::Last);
        assert_eq!(page.object_list, vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn single_page_is_not_paginated() {
        let page = Paginator::new(records(5), PAGE_SIZE).page(PageRequest::default());
        assert_eq!(page.object_list.len(), 5);
        assert!(!page.has_other_pages());
    }

    #[test]
    fn zero_per_page_is_treated_as_one() {
        let paginator = Paginator::new(records(3), 0);
        assert_eq!(paginator.num_pages(), 3);
    }

    #[test]
    fn parse_page_parameter() {
        assert_eq!(PageRequest::parse(None), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("2")), PageRequest::Number(2));
        assert_eq!(PageRequest::parse(Some(" 3 ")), PageRequest::Number(3));
        assert_eq!(PageRequest::parse(Some("last")), PageRequest::Last);
        assert_eq!(PageRequest::parse(Some("abc")), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("")), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("-2")), PageRequest::Number(-2));
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Paginator::new(records(8), PAGE_SIZE)
            .page(PageRequest::Number(2))
            .map(|n| n * 10);
        assert_eq!(page.object_list, vec![60, 70, 80]);
        let meta = page.meta();
        assert_eq!(meta.number, 2);
        assert_eq!(meta.count, 8);
        assert_eq!(meta.per_page, PAGE_SIZE);
    }
}
