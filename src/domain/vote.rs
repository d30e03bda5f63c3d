use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pagination::{FieldSpec, FilterKind};
use super::{MovieId, UserId, VoteId};

/// A score from 0 to 4 inclusive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 4;

    #[must_use]
    pub const fn new(value: i32) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "rating must be between {} and {}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Vote {
    pub id: VoteId,
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FilterKind::Id),
        FieldSpec::new("user_id", FilterKind::Id),
        FieldSpec::new("movie_id", FilterKind::Id),
        FieldSpec::new("rating", FilterKind::Integer),
        FieldSpec::new("created_at", FilterKind::Date),
        FieldSpec::new("updated_at", FilterKind::Date),
    ];

    /// Returns the vote with the new rating applied. Ownership is checked by
    /// the caller.
    #[must_use]
    pub fn apply(&self, update: &VoteUpdate) -> Self {
        Self {
            rating: update.rating,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: Rating,
}

/// Rating change requested by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteUpdate {
    pub user_id: UserId,
    pub rating: Rating,
}
