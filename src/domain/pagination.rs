//! Pagination and filter building for list endpoints.
//!
//! A [`ListQuery`] is the flat parameter bag received from the client. It is
//! normalized into [`ListOptions`] for the repositories, and the raw
//! [`Page`] they return is shaped into a [`Paginated`] envelope. Nothing in
//! here touches storage.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest offset SQL accepts (a signed 64-bit integer).
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

pub const PAGE_PARAM: &str = "page";
pub const SIZE_PARAM: &str = "size";
pub const SORT_PARAM: &str = "sortParam";
pub const SORT_ORDER_PARAM: &str = "sortOrder";

const PAGINATION_PARAMS: [&str; 4] = [PAGE_PARAM, SIZE_PARAM, SORT_PARAM, SORT_ORDER_PARAM];

/// Flat query parameters of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: BTreeMap<String, String>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Sets a parameter, replacing whatever the client sent for it.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Every parameter that is not a pagination or sort control.
    #[must_use]
    pub fn filters(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .filter(|(key, _)| !PAGINATION_PARAMS.contains(&key.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn to_options(&self) -> ListOptions {
        let page = parse_positive(self.get(PAGE_PARAM)).unwrap_or(DEFAULT_PAGE);
        let size = parse_positive(self.get(SIZE_PARAM))
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        let sort = self
            .get(SORT_PARAM)
            .filter(|field| !field.is_empty())
            .map(|field| Sort {
                field: field.to_string(),
                direction: self
                    .get(SORT_ORDER_PARAM)
                    .map(SortDirection::parse)
                    .unwrap_or_default(),
            });

        ListOptions {
            filters: self.filters(),
            page,
            size,
            sort,
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Anything other than `desc` (in any case) sorts ascending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Normalized options consumed by the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub filters: BTreeMap<String, String>,
    pub page: u64,
    pub size: u64,
    pub sort: Option<Sort>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl ListOptions {
    /// Rows to skip, saturating at `MAX_OFFSET`. Absurd page numbers land past
    /// the last row.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let skipped = self.page.saturating_sub(1).saturating_mul(self.limit());
        if skipped > MAX_OFFSET { MAX_OFFSET } else { skipped }
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        if self.size > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            self.size
        }
    }
}

/// How a filter value is compared against a stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Text,
    /// Exact match on a UUID reference.
    Id,
    Flag,
    Integer,
    /// `YYYY-MM-DD` prefix of a timestamp.
    Date,
}

impl FilterKind {
    /// Compares a stored value (in its string form) with a filter value.
    #[must_use]
    pub fn matches(self, stored: &str, wanted: &str) -> bool {
        match self {
            Self::Text => stored.to_lowercase().contains(&wanted.to_lowercase()),
            Self::Id => stored.eq_ignore_ascii_case(wanted.trim()),
            Self::Flag => match (stored.parse::<bool>(), wanted.trim().parse::<bool>()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            },
            Self::Integer => match (stored.parse::<i64>(), wanted.trim().parse::<i64>()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            },
            Self::Date => stored.starts_with(wanted.trim()),
        }
    }

    /// The filter value as it is echoed back in a list envelope.
    #[must_use]
    pub fn echo(self, value: &str) -> Value {
        match self {
            Self::Flag => value
                .trim()
                .parse::<bool>()
                .map_or_else(|_| Value::from(value), Value::from),
            Self::Integer => value
                .trim()
                .parse::<i64>()
                .map_or_else(|_| Value::from(value), Value::from),
            Self::Text | Self::Id | Self::Date => Value::from(value),
        }
    }
}

/// A field an entity exposes for filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FilterKind,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, kind: FilterKind) -> Self {
        Self { name, kind }
    }

    #[must_use]
    pub fn find<'a>(fields: &'a [Self], name: &str) -> Option<&'a Self> {
        fields.iter().find(|f| f.name == name)
    }
}

/// Raw result of a repository list call.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub count: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(data: Vec<T>, count: u64) -> Self {
        Self { data, count }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

/// Response envelope of every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub count: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "currentPage")]
    pub current_page: u64,
    /// Echo of the filters applied to the listing.
    #[serde(flatten)]
    pub filters: BTreeMap<String, Value>,
}

impl<T> Paginated<T> {
    /// Shapes a repository page. Filters on known fields are echoed with the
    /// JSON type of that field.
    #[must_use]
    pub fn from_page(options: &ListOptions, fields: &[FieldSpec], page: Page<T>) -> Self {
        let filters = options
            .filters
            .iter()
            .map(|(key, value)| {
                let echoed = FieldSpec::find(fields, key)
                    .map_or_else(|| Value::from(value.as_str()), |spec| spec.kind.echo(value));
                (key.clone(), echoed)
            })
            .collect();

        Self {
            total_pages: total_pages(page.count, options.limit()),
            current_page: options.page,
            count: page.count,
            data: page.data,
            filters,
        }
    }
}

#[must_use]
pub const fn total_pages(count: u64, size: u64) -> u64 {
    if size == 0 { 0 } else { count.div_ceil(size) }
}
