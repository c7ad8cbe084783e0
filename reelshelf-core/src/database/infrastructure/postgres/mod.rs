pub mod repositories;

pub use repositories::{
    imports::PostgresImportRepository, lists::PostgresListsRepository,
    shares::PostgresShareRegistry, stats::PostgresStatsRepository,
    users::PostgresUsersRepository,
};
