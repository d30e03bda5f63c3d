//! In-memory repositories.
//!
//! All three share one [`MemoryDatabase`] so that removing a movie drops its
//! votes, mirroring the foreign key cascade of the relational schema. Unique
//! constraints are not enforced here; callers rely on the service checks.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    MovieRepository, RepositoryError, RepositoryResult, UserRepository, VoteRepository,
};
use crate::domain::{
    FieldSpec, FilterKind, ListOptions, Movie, MovieId, NewMovie, NewUserRecord, NewVote, Page,
    UserId, UserRecord, Vote, VoteId,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    /// Stored without votes; they are attached on read.
    movies: Vec<Movie>,
    votes: Vec<Vote>,
}

impl Tables {
    fn with_votes(&self, movie: &Movie) -> Movie {
        Movie {
            votes: self
                .votes
                .iter()
                .filter(|v| v.movie_id == movie.id)
                .cloned()
                .collect(),
            ..movie.clone()
        }
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
}

impl MemoryDatabase {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn user_field(user: &UserRecord, name: &str) -> Option<String> {
    match name {
        "id" => Some(user.id.to_string()),
        "name" => Some(user.name.clone()),
        "email" => Some(user.email.clone()),
        "is_active" => Some(user.is_active.to_string()),
        "is_admin" => Some(user.is_admin.to_string()),
        "created_at" => Some(user.created_at.to_rfc3339()),
        "updated_at" => Some(user.updated_at.to_rfc3339()),
        _ => None,
    }
}

fn movie_field(movie: &Movie, name: &str) -> Option<String> {
    match name {
        "id" => Some(movie.id.to_string()),
        "director" => Some(movie.director.clone()),
        "name" => Some(movie.name.clone()),
        "genre" => Some(movie.genre.clone()),
        "actors" => Some(movie.actors.clone()),
        "created_at" => Some(movie.created_at.to_rfc3339()),
        "updated_at" => Some(movie.updated_at.to_rfc3339()),
        _ => None,
    }
}

fn vote_field(vote: &Vote, name: &str) -> Option<String> {
    match name {
        "id" => Some(vote.id.to_string()),
        "user_id" => Some(vote.user_id.to_string()),
        "movie_id" => Some(vote.movie_id.to_string()),
        "rating" => Some(vote.rating.value().to_string()),
        "created_at" => Some(vote.created_at.to_rfc3339()),
        "updated_at" => Some(vote.updated_at.to_rfc3339()),
        _ => None,
    }
}

fn compare(kind: FilterKind, a: Option<String>, b: Option<String>) -> Ordering {
    match kind {
        FilterKind::Integer => {
            let parse = |v: Option<String>| v.and_then(|s| s.parse::<i64>().ok());
            parse(a).cmp(&parse(b))
        }
        _ => a.cmp(&b),
    }
}

/// Filters, sorts and windows rows that are already in insertion order.
fn page_of<T, F>(rows: Vec<T>, fields: &[FieldSpec], value: F, options: &ListOptions) -> Page<T>
where
    F: Fn(&T, &str) -> Option<String>,
{
    let mut matching: Vec<T> = rows
        .into_iter()
        .filter(|row| {
            options.filters.iter().all(|(key, wanted)| {
                FieldSpec::find(fields, key).is_none_or(|spec| {
                    value(row, spec.name).is_some_and(|stored| spec.kind.matches(&stored, wanted))
                })
            })
        })
        .collect();

    if let Some(sort) = &options.sort
        && let Some(spec) = FieldSpec::find(fields, &sort.field)
    {
        matching.sort_by(|a, b| {
            let ordering = compare(spec.kind, value(a, spec.name), value(b, spec.name));
            if sort.direction.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }

    let count = matching.len() as u64;
    let offset = usize::try_from(options.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(options.limit()).unwrap_or(usize::MAX);
    let data = matching.into_iter().skip(offset).take(limit).collect();

    Page::new(data, count)
}

fn missing(entity: &str, id: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Database(format!("{entity} {id} does not exist"))
}

pub struct MemoryUserRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryUserRepository {
    #[must_use]
    pub const fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUserRecord) -> RepositoryResult<UserRecord> {
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };

        self.db.tables.write().await.users.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<UserRecord>> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<UserRecord>> {
        let rows = self.db.tables.read().await.users.clone();
        Ok(page_of(rows, UserRecord::FIELDS, user_field, options))
    }

    async fn save(&self, user: &UserRecord) -> RepositoryResult<UserRecord> {
        let mut tables = self.db.tables.write().await;
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| missing("user", user.id))?;

        *slot = UserRecord {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(slot.clone())
    }
}

pub struct MemoryMovieRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryMovieRepository {
    #[must_use]
    pub const fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieRepository for MemoryMovieRepository {
    async fn create(&self, movie: NewMovie) -> RepositoryResult<Movie> {
        let now = Utc::now();
        let movie = Movie {
            id: MovieId::new_v4(),
            director: movie.director,
            name: movie.name,
            genre: movie.genre,
            actors: movie.actors,
            created_at: now,
            updated_at: now,
            votes: Vec::new(),
        };

        self.db.tables.write().await.movies.push(movie.clone());
        Ok(movie)
    }

    async fn find_by_id(&self, id: MovieId) -> RepositoryResult<Option<Movie>> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .movies
            .iter()
            .find(|m| m.id == id)
            .map(|m| tables.with_votes(m)))
    }

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<Movie>> {
        let tables = self.db.tables.read().await;
        let rows = tables.movies.clone();
        Ok(page_of(rows, Movie::FIELDS, movie_field, options).map(|m| tables.with_votes(&m)))
    }

    async fn save(&self, movie: &Movie) -> RepositoryResult<Movie> {
        let mut tables = self.db.tables.write().await;
        let slot = tables
            .movies
            .iter_mut()
            .find(|m| m.id == movie.id)
            .ok_or_else(|| missing("movie", movie.id))?;

        *slot = Movie {
            updated_at: Utc::now(),
            votes: Vec::new(),
            ..movie.clone()
        };
        let saved = slot.clone();
        Ok(tables.with_votes(&saved))
    }

    async fn remove(&self, id: MovieId) -> RepositoryResult<bool> {
        let mut tables = self.db.tables.write().await;
        let before = tables.movies.len();
        tables.movies.retain(|m| m.id != id);
        let removed = tables.movies.len() != before;
        if removed {
            tables.votes.retain(|v| v.movie_id != id);
        }
        Ok(removed)
    }
}

pub struct MemoryVoteRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryVoteRepository {
    #[must_use]
    pub const fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn create(&self, vote: NewVote) -> RepositoryResult<Vote> {
        let now = Utc::now();
        let vote = Vote {
            id: VoteId::new_v4(),
            user_id: vote.user_id,
            movie_id: vote.movie_id,
            rating: vote.rating,
            created_at: now,
            updated_at: now,
        };

        self.db.tables.write().await.votes.push(vote.clone());
        Ok(vote)
    }

    async fn find_by_id(&self, id: VoteId) -> RepositoryResult<Option<Vote>> {
        let tables = self.db.tables.read().await;
        Ok(tables.votes.iter().find(|v| v.id == id).cloned())
    }

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<Vote>> {
        let rows = self.db.tables.read().await.votes.clone();
        Ok(page_of(rows, Vote::FIELDS, vote_field, options))
    }

    async fn save(&self, vote: &Vote) -> RepositoryResult<Vote> {
        let mut tables = self.db.tables.write().await;
        let slot = tables
            .votes
            .iter_mut()
            .find(|v| v.id == vote.id)
            .ok_or_else(|| missing("vote", vote.id))?;

        *slot = Vote {
            updated_at: Utc::now(),
            ..vote.clone()
        };
        Ok(slot.clone())
    }

    async fn remove(&self, id: VoteId) -> RepositoryResult<bool> {
        let mut tables = self.db.tables.write().await;
        let before = tables.votes.len();
        tables.votes.retain(|v| v.id != id);
        Ok(tables.votes.len() != before)
    }
}
