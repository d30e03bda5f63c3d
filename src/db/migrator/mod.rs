use sea_orm_migration::prelude::*;

mod m20250301_create_users;
mod m20250301_create_movies;
mod m20250302_create_votes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_create_users::Migration),
            Box::new(m20250301_create_movies::Migration),
            Box::new(m20250302_create_votes::Migration),
        ]
    }
}
