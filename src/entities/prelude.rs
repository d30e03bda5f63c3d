pub use super::movies::Entity as Movies;
pub use super::users::Entity as Users;
pub use super::votes::Entity as Votes;
