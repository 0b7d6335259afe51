//! Paged list responses.
//!
//! A [`ListResponse`] renders one page of a collection as a JSON array and
//! reports the paging state in headers:
//! - `num_found`: items in the whole collection
//! - `num_returned`: items on this page
//! - `next` / `previous`: links to the neighbouring pages, when they exist
//!
//! When facets were requested the body becomes
//! `{"facets": {...}, "results": [...]}`.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use url::form_urlencoded;

use crate::params::{PageParams, QueryParams, PAGE_PARAM};
use crate::search::Facets;

pub const NUM_FOUND_HEADER: &str = "num_found";
pub const NUM_RETURNED_HEADER: &str = "num_returned";
pub const NEXT_HEADER: &str = "next";
pub const PREVIOUS_HEADER: &str = "previous";

/// One page cut from a collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub found: usize,
    pub params: PageParams,
}

impl<T> Page<T> {
    /// Cuts the page selected by `params` out of `items`.
    pub fn cut(items: Vec<T>, params: PageParams) -> Self {
        let found = items.len();
        let items = items
            .into_iter()
            .skip(params.offset())
            .take(params.limit)
            .collect();
        Page {
            items,
            found,
            params,
        }
    }

    pub fn has_next(&self) -> bool {
        self.params.offset() + self.items.len() < self.found
    }

    pub fn has_previous(&self) -> bool {
        self.params.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            found: self.found,
            params: self.params,
        }
    }
}

/// A rendered page plus what is needed to link its neighbours.
#[derive(Debug)]
pub struct ListResponse<T> {
    page: Page<T>,
    path: String,
    query: QueryParams,
    facets: Option<Facets>,
}

#[derive(Serialize)]
struct FacetedBody<'a, T> {
    facets: &'a Facets,
    results: &'a [T],
}

impl<T: Serialize> ListResponse<T> {
    /// `path` and `query` describe the request so page links can reuse every
    /// other parameter.
    pub fn new(page: Page<T>, path: impl Into<String>, query: QueryParams) -> Self {
        ListResponse {
            page,
            path: path.into(),
            query,
            facets: None,
        }
    }

    pub fn with_facets(mut self, facets: Option<Facets>) -> Self {
        self.facets = facets;
        self
    }

    fn page_link(&self, page: usize) -> String {
        let mut keys: Vec<&String> = self.query.keys().filter(|k| *k != PAGE_PARAM).collect();
        keys.sort();
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for key in keys {
            serializer.append_pair(key, &self.query[key]);
        }
        serializer.append_pair(PAGE_PARAM, &page.to_string());
        format!("{}?{}", self.path, serializer.finish())
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let mut set = |name: &'static str, value: String| {
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(HeaderName::from_static(name), value);
            }
        };
        set(NUM_FOUND_HEADER, self.page.found.to_string());
        set(NUM_RETURNED_HEADER, self.page.items.len().to_string());
        if self.page.has_next() {
            set(NEXT_HEADER, self.page_link(self.page.params.page + 1));
        }
        if self.page.has_previous() {
            set(PREVIOUS_HEADER, self.page_link(self.page.params.page - 1));
        }
        headers
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        let headers = self.headers();
        match &self.facets {
            Some(facets) => (
                headers,
                Json(FacetedBody {
                    facets,
                    results: &self.page.items,
                }),
            )
                .into_response(),
            None => (headers, Json(&self.page.items)).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: usize, limit: usize) -> PageParams {
        PageParams { page, limit }
    }

    #[test]
    fn cut_selects_the_requested_slice() {
        let page = Page::cut((1..=7).collect::<Vec<_>>(), params(2, 3));
        assert_eq!(page.items, [4, 5, 6]);
        assert_eq!(page.found, 7);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = Page::cut((1..=7).collect::<Vec<_>>(), params(3, 3));
        assert_eq!(last.items, [7]);
        assert!(!last.has_next());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::cut(vec![1, 2], params(5, 10));
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn headers_carry_counts_and_links() {
        let query: QueryParams = [("limit", "2"), ("page", "2"), ("q", "a b")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let response = ListResponse::new(Page::cut(vec![1, 2, 3, 4, 5], params(2, 2)), "/sources", query);
        let headers = response.headers();
        assert_eq!(headers[NUM_FOUND_HEADER], "5");
        assert_eq!(headers[NUM_RETURNED_HEADER], "2");
        assert_eq!(headers[NEXT_HEADER], "/sources?limit=2&q=a+b&page=3");
        assert_eq!(headers[PREVIOUS_HEADER], "/sources?limit=2&q=a+b&page=1");
    }

    #[test]
    fn single_page_has_no_links() {
        let response = ListResponse::new(Page::cut(vec![1], params(1, 25)), "/sources", QueryParams::new());
        let headers = response.headers();
        assert!(headers.get(NEXT_HEADER).is_none());
        assert!(headers.get(PREVIOUS_HEADER).is_none());
    }
}
