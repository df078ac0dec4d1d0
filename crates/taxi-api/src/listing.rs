//! # List Queries
//!
//! The list endpoints share one pipeline: take the whole collection in id
//! order, keep the records whose search field contains the query (ignoring
//! case), then cut out the requested page of [`PAGE_SIZE`] records.
//!
//! Each entity searches one field and reads the query from the parameter of
//! the same name: `name` for manufacturers, `model` for cars, `username` for
//! drivers. The page comes from `page`.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use taxi_core::{filter_by_search, Page, PageMeta, PageRequest, Paginator, Searchable, PAGE_SIZE};

use crate::error::AppError;

/// Raw query parameters of a list request.
#[derive(Debug, Clone, Default)]
pub struct ListParams(HashMap<String, String>);

impl ListParams {
    /// The requested page.
    pub fn page(&self) -> PageRequest {
        PageRequest::parse(self.0.get("page").map(String::as_str))
    }

    /// The search input for `T`, as submitted. Empty when absent.
    pub fn search<T: Searchable>(&self) -> &str {
        self.0.get(T::SEARCH_FIELD).map_or("", String::as_str)
    }
}

impl From<HashMap<String, String>> for ListParams {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ListParams {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;
        Ok(Self(params))
    }
}

/// Filter `records` by the search input and select the requested page.
pub fn list_page<T: Searchable>(records: Vec<T>, params: &ListParams) -> Page<T> {
    let matching = filter_by_search(records, Some(params.search::<T>()));
    Paginator::new(matching, PAGE_SIZE).page(params.page())
}

/// The parts every list response carries besides its records.
pub struct ListContext<T> {
    pub records: Vec<T>,
    pub is_paginated: bool,
    pub page_obj: PageMeta,
}

impl<T> From<Page<T>> for ListContext<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            is_paginated: page.has_other_pages(),
            page_obj: page.meta(),
            records: page.object_list,
        }
    }
}
