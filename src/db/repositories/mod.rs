//! Repository traits for the three stored entities.
//!
//! Services only ever see these traits. `SeaORM` implementations back the
//! running server; the in-memory ones back service tests.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    FieldSpec, FilterKind, ListOptions, Movie, MovieId, NewMovie, NewUserRecord, NewVote, Page,
    SortDirection, UserId, UserRecord, Vote, VoteId,
};

pub mod memory;
pub mod movie;
pub mod user;
pub mod vote;

pub use memory::{MemoryDatabase, MemoryMovieRepository, MemoryUserRepository, MemoryVoteRepository};
pub use movie::SeaOrmMovieRepository;
pub use user::SeaOrmUserRepository;
pub use vote::SeaOrmVoteRepository;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::UniqueViolation(detail),
            _ => Self::Database(err.to_string()),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new active account with a fresh id and timestamps.
    async fn create(&self, user: NewUserRecord) -> RepositoryResult<UserRecord>;

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<UserRecord>>;

    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>>;

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<UserRecord>>;

    /// Writes every field of an existing account and refreshes `updated_at`.
    async fn save(&self, user: &UserRecord) -> RepositoryResult<UserRecord>;
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create(&self, movie: NewMovie) -> RepositoryResult<Movie>;

    /// Loads the movie with its votes.
    async fn find_by_id(&self, id: MovieId) -> RepositoryResult<Option<Movie>>;

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<Movie>>;

    /// Writes the editable fields and refreshes `updated_at`. Votes are not
    /// touched.
    async fn save(&self, movie: &Movie) -> RepositoryResult<Movie>;

    /// Deletes the movie and, through the foreign key, its votes. Returns
    /// whether a row was removed.
    async fn remove(&self, id: MovieId) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn create(&self, vote: NewVote) -> RepositoryResult<Vote>;

    async fn find_by_id(&self, id: VoteId) -> RepositoryResult<Option<Vote>>;

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<Vote>>;

    async fn save(&self, vote: &Vote) -> RepositoryResult<Vote>;

    async fn remove(&self, id: VoteId) -> RepositoryResult<bool>;
}

/// Builds the filtered and ordered select for a list call. Filters and sort
/// fields outside `fields` are ignored, and rows always fall back to
/// insertion order.
pub(crate) fn list_select<E, F>(
    fields: &[FieldSpec],
    column: F,
    insertion_order: [E::Column; 2],
    options: &ListOptions,
) -> Select<E>
where
    E: EntityTrait,
    F: Fn(&str) -> Option<E::Column>,
{
    let mut condition = Condition::all();
    for (key, value) in &options.filters {
        let Some(spec) = FieldSpec::find(fields, key) else {
            continue;
        };
        if let Some(col) = column(spec.name) {
            condition = condition.add(filter_expr(col, spec.kind, value));
        }
    }

    let mut select = E::find().filter(condition);

    if let Some(sort) = &options.sort
        && let Some(spec) = FieldSpec::find(fields, &sort.field)
        && let Some(col) = column(spec.name)
    {
        select = select.order_by(col, order_for(sort.direction));
    }

    for col in insertion_order {
        select = select.order_by_asc(col);
    }

    select
}

/// Runs the count and the windowed fetch for a prepared select.
pub(crate) async fn fetch_page<E>(
    conn: &DatabaseConnection,
    select: Select<E>,
    options: &ListOptions,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let count = select.clone().count(conn).await?;
    let data = select
        .offset(options.offset())
        .limit(options.limit())
        .all(conn)
        .await?;

    Ok(Page::new(data, count))
}

/// A filter value that cannot be read for its kind matches nothing.
fn filter_expr<C: ColumnTrait>(column: C, kind: FilterKind, value: &str) -> SimpleExpr {
    let value = value.trim();
    let parsed = match kind {
        FilterKind::Text => {
            let pattern = format!("%{}%", escape_like(value));
            Some(column.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)))
        }
        FilterKind::Id => Uuid::parse_str(value).ok().map(|id| column.eq(id)),
        FilterKind::Flag => value.parse::<bool>().ok().map(|flag| column.eq(flag)),
        FilterKind::Integer => value.parse::<i64>().ok().map(|n| column.eq(n)),
        FilterKind::Date => day_bounds(value).map(|(start, end)| {
            column.gte(start).and(column.lt(end))
        }),
    };

    parsed.unwrap_or_else(|| Expr::val(1).eq(0))
}

const LIKE_ESCAPE: char = '\\';

/// Makes `%` and `_` in a client value match themselves.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn day_bounds(value: &str) -> Option<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> {
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let start = day.and_hms_opt(0, 0, 0)?.and_utc();
    let end = start.checked_add_days(Days::new(1))?;
    Some((start, end))
}

const fn order_for(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Ascending => Order::Asc,
        SortDirection::Descending => Order::Desc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_one_day() {
        let (start, end) = day_bounds("2024-02-28").unwrap();
        assert_eq!(start.to_rfc3339(), "2024-02-28T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert!(day_bounds("28/02/2024").is_none());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
    }

    #[test]
    fn other_database_errors_stay_generic() {
        let err = DbErr::Custom("plain failure".into());
        assert!(matches!(
            RepositoryError::from(err),
            RepositoryError::Database(_)
        ));
    }
}
