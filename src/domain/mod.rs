//! Domain types for the rating API with strong typing.
//!
//! Entity identifiers are UUID newtypes so a `MovieId` can never be passed
//! where a `UserId` is expected.

pub mod movie;
pub mod pagination;
pub mod session;
pub mod user;
pub mod vote;

pub use movie::{Movie, MovieChanges, MovieView, NewMovie, votes_average};
pub use pagination::{
    FieldSpec, FilterKind, ListOptions, ListQuery, Page, Paginated, Sort, SortDirection,
};
pub use session::{Session, SessionUser};
pub use user::{NewUser, NewUserRecord, User, UserChanges, UserRecord};
pub use vote::{NewVote, Rating, Vote, VoteUpdate};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Unique identifier of a user account.
    UserId
);

entity_id!(
    /// Unique identifier of a movie.
    MovieId
);

entity_id!(
    /// Unique identifier of a vote.
    VoteId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_strings() {
        let id = MovieId::new_v4();
        let parsed: MovieId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn invalid_id_is_rejected() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&VoteId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
