use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::MovieId;
use super::pagination::{FieldSpec, FilterKind};
use super::vote::Vote;

/// A movie together with the votes cast for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Movie {
    pub id: MovieId,
    pub director: String,
    pub name: String,
    pub genre: String,
    pub actors: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub votes: Vec<Vote>,
}

impl Movie {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FilterKind::Id),
        FieldSpec::new("director", FilterKind::Text),
        FieldSpec::new("name", FilterKind::Text),
        FieldSpec::new("genre", FilterKind::Text),
        FieldSpec::new("actors", FilterKind::Text),
        FieldSpec::new("created_at", FilterKind::Date),
        FieldSpec::new("updated_at", FilterKind::Date),
    ];

    /// Overlays the editable fields. Identity, timestamps and votes are
    /// carried over untouched.
    #[must_use]
    pub fn apply(&self, changes: &MovieChanges) -> Self {
        let mut next = self.clone();
        if let Some(director) = &changes.director {
            next.director.clone_from(director);
        }
        if let Some(name) = &changes.name {
            next.name.clone_from(name);
        }
        if let Some(genre) = &changes.genre {
            next.genre.clone_from(genre);
        }
        if let Some(actors) = &changes.actors {
            next.actors.clone_from(actors);
        }
        next
    }

    #[must_use]
    pub fn votes_average(&self) -> f64 {
        votes_average(&self.votes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub director: String,
    pub name: String,
    pub genre: String,
    pub actors: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieChanges {
    pub director: Option<String>,
    pub name: Option<String>,
    pub genre: Option<String>,
    pub actors: Option<String>,
}

/// Movie as returned to clients, with the derived average.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MovieView {
    #[serde(flatten)]
    pub movie: Movie,
    pub votes_average: f64,
}

impl From<Movie> for MovieView {
    fn from(movie: Movie) -> Self {
        let votes_average = movie.votes_average();
        Self {
            movie,
            votes_average,
        }
    }
}

/// Arithmetic mean of the ratings, `0.0` when there are none.
#[must_use]
pub fn votes_average(votes: &[Vote]) -> f64 {
    if votes.is_empty() {
        return 0.0;
    }
    let total: i64 = votes.iter().map(|v| i64::from(v.rating.value())).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = total as f64 / votes.len() as f64;
    average
}
