//! Query string construction for both catalog endpoints.

use crate::filter::FilterState;

/// The only sort value `/top/manga` understands as a `filter` parameter.
pub const TOP_POPULARITY_FILTER: &str = "bypopularity";

/// Which listing a feed reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// `/top/manga`, ranked listing
    Top,
    /// `/manga`, search with filters
    Browse,
}

impl FeedKind {
    /// Endpoint path below the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            FeedKind::Top => "/top/manga",
            FeedKind::Browse => "/manga",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Top => "top",
            FeedKind::Browse => "browse",
        }
    }
}

/// Build the query string (including the leading `?`) for one page.
///
/// Filter parameters come first in a fixed order, followed by `page` and
/// `limit`. Empty filters are left out and every value is percent-encoded.
pub fn build_query(kind: FeedKind, filters: &FilterState, page_size: u32) -> String {
    let mut params: Vec<(&str, &str)> = Vec::new();

    match kind {
        FeedKind::Top => {
            // Any other selection falls back to the API's default ordering.
            if filters.order_by == TOP_POPULARITY_FILTER {
                params.push(("filter", TOP_POPULARITY_FILTER));
            }
        }
        FeedKind::Browse => {
            params.extend(
                filters
                    .entries()
                    .into_iter()
                    .filter(|(_, value)| !value.is_empty()),
            );
        }
    }

    let mut query = String::from("?");
    for (key, value) in params {
        query.push_str(key);
        query.push('=');
        query.push_str(&urlencoding::encode(value));
        query.push('&');
    }
    query.push_str(&format!("page={}&limit={}", filters.page, page_size));

    query
}

/// Full request URL for one page of a feed
pub fn build_url(base_url: &str, kind: FeedKind, filters: &FilterState, page_size: u32) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        kind.path(),
        build_query(kind, filters, page_size)
    )
}
