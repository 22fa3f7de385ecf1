//! Pagination driver for list endpoints
//!
//! [`paginate_all`] walks every page of a listing through a caller-supplied async
//! fetcher. It knows nothing about HTTP: the fetcher receives a [`PageParams`]
//! and returns the raw JSON page, so the driver can be exercised with plain
//! closures in tests.

use std::future::Future;

use serde_json::Value;

pub const DEFAULT_MAX_PAGES: usize = 20;
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Response field carrying the cursor for the next page
pub const NEXT_CURSOR_FIELD: &str = "next_starting_after";

/// Parameters for a single page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub starting_after: Option<String>,
    pub offset: Option<u64>,
}

impl PageParams {
    /// Render the set parameters as query-string pairs
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = &self.starting_after {
            query.push(("starting_after", cursor.clone()));
        }
        if let Some(offset) = self.offset {
            query.push(("skip", offset.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginateOptions {
    pub max_pages: usize,
    pub default_limit: u32,
    /// Advance with a numeric offset instead of the response cursor
    pub use_offset_pagination: bool,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            default_limit: DEFAULT_PAGE_LIMIT,
            use_offset_pagination: false,
        }
    }
}

/// The page shapes the upstream API returns
#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    Items {
        items: Vec<Value>,
        next_cursor: Option<String>,
    },
    Data {
        data: Vec<Value>,
        next_cursor: Option<String>,
    },
    Bare(Vec<Value>),
    Unrecognized,
}

impl PageResponse {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => PageResponse::Bare(items),
            Value::Object(mut map) => {
                let next_cursor = map.get(NEXT_CURSOR_FIELD).and_then(cursor_string);
                if let Some(Value::Array(items)) = map.remove("items") {
                    PageResponse::Items { items, next_cursor }
                } else if let Some(Value::Array(data)) = map.remove("data") {
                    PageResponse::Data { data, next_cursor }
                } else {
                    PageResponse::Unrecognized
                }
            }
            _ => PageResponse::Unrecognized,
        }
    }

    /// Items and cursor, or `None` for an unrecognized shape
    pub fn into_parts(self) -> Option<(Vec<Value>, Option<String>)> {
        match self {
            PageResponse::Items { items, next_cursor } => Some((items, next_cursor)),
            PageResponse::Data { data, next_cursor } => Some((data, next_cursor)),
            PageResponse::Bare(items) => Some((items, None)),
            PageResponse::Unrecognized => None,
        }
    }
}

fn cursor_string(value: &Value) -> Option<String> {
    match value {
        Value::String(cursor) if !cursor.is_empty() => Some(cursor.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Fetch pages sequentially until the data runs out or `max_pages` is reached
///
/// Offset mode stops on a short page; cursor mode stops when a page has no
/// cursor or no items. An unrecognized page shape ends the walk without error.
/// Errors from `fetch` are returned as-is.
pub async fn paginate_all<F, Fut, E>(
    mut fetch: F,
    initial: PageParams,
    options: &PaginateOptions,
) -> Result<Vec<Value>, E>
where
    F: FnMut(PageParams) -> Fut,
    Fut: Future<Output = Result<Value, E>>,
{
    let mut params = initial;
    let limit = params.limit.unwrap_or(options.default_limit);
    params.limit = Some(limit);

    if options.use_offset_pagination {
        params.starting_after = None;
        params.offset.get_or_insert(0);
    } else {
        params.offset = None;
    }

    let mut collected = Vec::new();

    for page in 1..=options.max_pages {
        let response = fetch(params.clone()).await?;

        let Some((items, next_cursor)) = PageResponse::from_value(response).into_parts() else {
            log::debug!("Page {page} has an unrecognized shape; treating it as the end of data");
            break;
        };

        let count = items.len();
        collected.extend(items);
        log::debug!("Fetched page {page} with {count} items ({} total)", collected.len());

        if options.use_offset_pagination {
            if count < limit as usize {
                return Ok(collected);
            }
            params.offset = Some(params.offset.unwrap_or(0) + count as u64);
        } else {
            match next_cursor {
                Some(cursor) if count > 0 => params.starting_after = Some(cursor),
                _ => return Ok(collected),
            }
        }

        if page == options.max_pages {
            log::warn!(
                "Stopped after {} pages; more results may be available",
                options.max_pages
            );
        }
    }

    Ok(collected)
}
