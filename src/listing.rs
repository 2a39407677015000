//! Listing helpers
//!
//! Stateless pagination and sorting shared by every list page. Request
//! parameters arrive as raw `(key, value)` pairs and are parsed into
//! [`ListParams`]; malformed values are a [`ValidationError`]. Filtering
//! and ordering are forwarded to the API, paging happens here.

use crate::error::ValidationError;
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort direction of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ValidationError::invalid("direction", s)),
        }
    }
}

/// Paging, filtering and ordering requested by a list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// 1-based page number
    pub page: usize,
    pub keyword: Option<String>,
    pub order_by: Option<String>,
    pub direction: Option<SortDirection>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            keyword: None,
            order_by: None,
            direction: None,
        }
    }
}

impl ListParams {
    /// Parse `page`, `keyword`, `order_by` and `direction` out of request
    /// parameters.
    ///
    /// Unknown keys are ignored and empty values count as absent. A page
    /// below 1 is clamped to 1; a page that is not a number is rejected.
    pub fn from_query<K, V, I>(pairs: I) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = ListParams::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "page" => {
                    let page: i64 = value
                        .parse()
                        .map_err(|_| ValidationError::invalid("page", value))?;
                    params.page = usize::try_from(page.max(1)).unwrap_or(1);
                }
                "keyword" => params.keyword = Some(value.to_string()),
                "order_by" => params.order_by = Some(value.to_string()),
                "direction" => params.direction = Some(value.parse()?),
                _ => {}
            }
        }

        Ok(params)
    }

    /// Query parameters forwarded to the API. The page is not among them.
    pub fn api_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(keyword) = &self.keyword {
            query.push(("keyword", keyword.clone()));
        }
        if let Some(order_by) = &self.order_by {
            query.push(("order_by", order_by.clone()));
        }
        if let Some(direction) = self.direction {
            query.push(("direction", direction.as_str().to_string()));
        }
        query
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Requested page, at least 1
    pub page: usize,
    /// Number of pages, `ceil(total / step)`
    pub pages: usize,
    /// Number of items before slicing
    pub total: usize,
}

/// Slice `items` to `page` with `step` items per page.
///
/// A page past the end yields no items. A zero step is treated as one.
pub fn paginate<T>(items: Vec<T>, page: usize, step: usize) -> Paginated<T> {
    let step = step.max(1);
    let page = page.max(1);
    let total = items.len();
    let pages = total.div_ceil(step);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(step))
        .take(step)
        .collect();

    Paginated {
        items,
        page,
        pages,
        total,
    }
}

/// Stable sort on a projected key. Items with equal keys keep their order.
pub fn sort_stable_by_key<T, K, F>(items: &mut [T], direction: SortDirection, mut key: F)
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.sort_by(|a, b| direction.apply(key(a).cmp(&key(b))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 20, 0)]
    #[case(1, 20, 1)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(45, 10, 5)]
    fn test_page_count(#[case] total: usize, #[case] step: usize, #[case] pages: usize) {
        let items: Vec<usize> = (0..total).collect();
        assert_eq!(paginate(items, 1, step).pages, pages);
    }

    #[test]
    fn test_paginate_slices() {
        let items: Vec<u32> = (1..=25).collect();
        let second = paginate(items.clone(), 2, 10);
        assert_eq!(second.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(second.total, 25);

        let last = paginate(items.clone(), 3, 10);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);

        let past = paginate(items, 9, 10);
        assert!(past.items.is_empty());
        assert_eq!(past.page, 9);
    }

    #[test]
    fn test_paginate_clamps_page_and_step() {
        let page = paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec![1]);
        assert_eq!(page.pages, 3);
    }

    #[test]
    fn test_list_params_parse() {
        let params = ListParams::from_query([
            ("page", "3"),
            ("order_by", "name"),
            ("direction", "DESC"),
            ("keyword", "ada"),
            ("filter_by_account", "ignored"),
        ])
        .unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.order_by.as_deref(), Some("name"));
        assert_eq!(params.direction, Some(SortDirection::Desc));
        assert_eq!(
            params.api_query(),
            vec![
                ("keyword", "ada".to_string()),
                ("order_by", "name".to_string()),
                ("direction", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_params_send_nothing_upstream() {
        let params = ListParams::from_query([("page", "4")]).unwrap();
        assert!(params.api_query().is_empty());
    }

    #[rstest]
    #[case("0", 1)]
    #[case("-4", 1)]
    #[case("", 1)]
    #[case(" 2 ", 2)]
    fn test_list_params_page_clamped(#[case] raw: &str, #[case] expected: usize) {
        let params = ListParams::from_query([("page", raw)]).unwrap();
        assert_eq!(params.page, expected);
    }

    #[rstest]
    #[case("page", "two")]
    #[case("direction", "sideways")]
    fn test_list_params_rejects(#[case] key: &str, #[case] value: &str) {
        let err = ListParams::from_query([(key, value)]).unwrap_err();
        assert_eq!(err, ValidationError::invalid(key, value));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut items = vec![("b", 1), ("a", 2), ("b", 3), ("a", 4)];
        sort_stable_by_key(&mut items, SortDirection::Asc, |(name, _)| *name);
        assert_eq!(items, vec![("a", 2), ("a", 4), ("b", 1), ("b", 3)]);

        sort_stable_by_key(&mut items, SortDirection::Desc, |(name, _)| *name);
        assert_eq!(items, vec![("b", 1), ("b", 3), ("a", 2), ("a", 4)]);
    }
}
