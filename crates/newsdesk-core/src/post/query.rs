//! Post list filters and per-call query overrides.

use serde::{Deserialize, Serialize};

use super::{CategoryId, PostStatus};
use crate::user::UserId;

pub const DEFAULT_ORDERING: &str = "-created_at";

/// Filters persisted by the posts store between fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilters {
    pub search: String,
    pub category: Option<CategoryId>,
    pub author: Option<UserId>,
    pub status: Option<PostStatus>,
    pub ordering: String,
}

impl Default for PostFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            author: None,
            status: Some(PostStatus::Published),
            ordering: DEFAULT_ORDERING.to_string(),
        }
    }
}

/// Call-site parameters; every `Some` overrides the persisted filter.
///
/// The id and status filters are optional themselves, so their overrides
/// nest: `None` keeps the persisted value, `Some(None)` clears it and
/// `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub search: Option<String>,
    pub category: Option<Option<CategoryId>>,
    pub author: Option<Option<UserId>>,
    pub status: Option<Option<PostStatus>>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PostQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}

impl PostFilters {
    /// Applies the overrides of `query` on top of these filters.
    pub fn merge(&mut self, query: &PostQuery) {
        if let Some(search) = &query.search {
            self.search = search.clone();
        }
        if let Some(category) = query.category {
            self.category = category;
        }
        if let Some(author) = query.author {
            self.author = author;
        }
        if let Some(status) = query.status {
            self.status = status;
        }
        if let Some(ordering) = &query.ordering {
            self.ordering = ordering.clone();
        }
    }

    /// Query-string pairs with empty values dropped.
    pub fn to_query_pairs(&self, page: u32, page_size: u32) -> Vec<(String, String)> {
        let candidates = [
            ("search", Some(self.search.clone())),
            ("category", self.category.map(|id| id.to_string())),
            ("author", self.author.map(|id| id.to_string())),
            ("status", self.status.map(|status| status.to_string())),
            ("ordering", Some(self.ordering.clone())),
            ("page", Some(page.to_string())),
            ("page_size", Some(page_size.to_string())),
        ];

        candidates
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (key.to_string(), v))
            })
            .collect()
    }
}
